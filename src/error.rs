//! Library error type
//!
//! Runtime hiccups inside the simulation (a spawn search that finds no
//! visible point, a stale object id) are not errors: they are logged and
//! the tick carries on. Errors are reserved for wiring and persistence.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    /// A required collaborator was never supplied before the game was built
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),

    /// A tuning value is outside its usable range
    #[error("invalid tuning value `{name}` = {value}: {reason}")]
    InvalidTuning {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias: a `Result` using [`GameError`]
pub type GameResult<T> = Result<T, GameError>;
