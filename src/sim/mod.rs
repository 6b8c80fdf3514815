//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order, subscription order)
//! - No rendering or platform dependencies

pub mod contact;
pub mod events;
pub mod field;
pub mod game;
pub mod player;
pub mod population;
pub mod session;
pub mod tick;
pub mod timer;
pub mod view;

pub use contact::{ContactEvent, ContactTracker};
pub use events::{EventHub, Signal, SubscriptionId};
pub use field::{FieldKind, FieldObject, ObjectId};
pub use game::{Game, GameBuilder, Hud, HudSnapshot, LogHud, World};
pub use player::{PickupEffect, PlayerAgent, PlayerPhase};
pub use population::{Anchor, FieldPopulation, PopulationReport, SpawnPolicy};
pub use session::{SessionPhase, SessionState};
pub use tick::{Frame, TickInput, Tickable};
pub use timer::{OneShotTimer, RepeatingTimer};
pub use view::{AlwaysVisible, ChaseCamera, NeverVisible, Viewport};
