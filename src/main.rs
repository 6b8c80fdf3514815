//! Void Runner headless runner
//!
//! Plays one seeded run at the fixed simulation step with a simple
//! autopilot, logs the HUD, and records the final score.
//!
//! Usage:
//!   RUST_LOG=info cargo run --release -- --seed 7 --seconds 120

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;

use void_runner::consts::SIM_DT;
use void_runner::sim::{ChaseCamera, Game, LogHud, PlayerAgent, TickInput, World};
use void_runner::{HighScores, Tuning};

#[derive(Parser)]
#[command(name = "void-runner")]
#[command(about = "Fly a seeded Void Runner session headlessly")]
struct Args {
    /// RNG seed for the run
    #[arg(long, default_value_t = 1)]
    seed: u64,
    /// Give up after this many seconds of game time
    #[arg(long, default_value_t = 300)]
    seconds: u32,
    /// JSON file overriding gameplay tuning
    #[arg(long)]
    tuning: Option<PathBuf>,
    /// JSON leaderboard to record the result in
    #[arg(long)]
    scores: Option<PathBuf>,
}

/// Wander, and veer away from the nearest asteroid ahead
fn autopilot(world: &World, time: f32) -> TickInput {
    let player: &PlayerAgent = &world.player;
    let mut horizontal = (time * 0.7).sin() * 0.5;
    let mut vertical = (time * 0.45).sin() * 0.3;

    let to_local = player.orientation.inverse();
    let threat = world
        .asteroids
        .objects()
        .map(|o| to_local * (o.position - player.position))
        .filter(|local| local.z > 0.0 && local.z < 60.0 && local.truncate().length() < 12.0)
        .min_by(|a, b| a.z.total_cmp(&b.z));

    if let Some(local) = threat {
        // Turn away from the side the asteroid is on
        horizontal = if local.x > 0.0 { 1.0 } else { -1.0 };
        vertical = if local.y > 0.0 { 1.0 } else { -1.0 };
    }

    TickInput {
        horizontal,
        vertical,
        ..Default::default()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path).with_context(|| format!("loading tuning {}", path.display()))?,
        None => Tuning::default(),
    };

    let mut game = Game::builder()
        .tuning(tuning)
        .seed(args.seed)
        .hud(LogHud::default())
        .build()
        .context("building game")?;

    let mut camera = ChaseCamera::default();
    game.start();

    let max_ticks = (args.seconds as f32 / SIM_DT) as u64;
    let mut ticks = 0u64;
    while !game.session().is_ended() && ticks < max_ticks {
        let input = autopilot(game.world(), ticks as f32 * SIM_DT);
        game.tick(&input, SIM_DT, &mut camera);
        ticks += 1;
    }

    let session = game.session();
    let player = game.player();
    println!();
    println!("=== RUN OVER ===");
    println!("  Seed:       {}", args.seed);
    println!("  Score:      {}", session.score());
    println!("  Time:       {}s", session.elapsed_seconds());
    println!("  Hull:       {:.0}%", player.hull_percent());
    println!("  Distance:   {:.0}", player.position.distance(Vec3::ZERO));
    println!("  Asteroids:  {} live", game.asteroids().len());

    if let Some(path) = &args.scores {
        let mut board = HighScores::load(path).with_context(|| format!("reading {}", path.display()))?;
        match board.add_score(session.score(), session.elapsed_seconds(), unix_now()) {
            Some(rank) => println!("  New high score! Rank #{rank}"),
            None => println!("  No leaderboard entry (top: {:?})", board.top_score()),
        }
        board.save(path).with_context(|| format!("writing {}", path.display()))?;
    }

    Ok(())
}
