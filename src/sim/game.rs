//! Top-level scheduler
//!
//! Owns every component, wires them to the event hub, and advances them in
//! a fixed order each step:
//! 1. Session timers and input toggles
//! 2. Player flight, then the viewport tracks the player's new pose
//! 3. Contacts between the player and the field
//! 4. Asteroid and powerup populations (anchored to the player's new pose)
//! 5. Signals requested during the step, published in request order

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::contact::{ContactEvent, ContactTracker};
use super::events::{EventHub, Signal, SubscriptionId};
use super::player::PlayerAgent;
use super::population::FieldPopulation;
use super::session::{SessionPhase, SessionState};
use super::tick::{Frame, TickInput, Tickable};
use super::view::Viewport;
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::{GameError, GameResult};
use crate::tuning::Tuning;

/// Values shown on the heads-up display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudSnapshot {
    pub score: u64,
    pub elapsed_seconds: u32,
    pub hull_percent: f32,
    pub phase: SessionPhase,
}

/// Display sink for the HUD values
pub trait Hud {
    fn show(&mut self, snapshot: &HudSnapshot);
}

/// Logs the HUD once per elapsed second and on phase changes
#[derive(Debug, Default)]
pub struct LogHud {
    last: Option<(u32, SessionPhase)>,
}

impl Hud for LogHud {
    fn show(&mut self, snapshot: &HudSnapshot) {
        let key = (snapshot.elapsed_seconds, snapshot.phase);
        if self.last != Some(key) {
            self.last = Some(key);
            log::info!(
                "[{:?}] {:>4}s  score {:>7}  hull {:>3.0}%",
                snapshot.phase,
                snapshot.elapsed_seconds,
                snapshot.score,
                snapshot.hull_percent
            );
        }
    }
}

/// Every component the hub notifies
#[derive(Debug, Clone)]
pub struct World {
    pub session: SessionState,
    pub player: PlayerAgent,
    pub asteroids: FieldPopulation,
    pub powerups: FieldPopulation,
}

impl World {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            session: SessionState::new(tuning),
            player: PlayerAgent::new(tuning),
            asteroids: FieldPopulation::asteroids(tuning),
            powerups: FieldPopulation::powerups(tuning),
        }
    }
}

const SIGNALS: [Signal; 4] = [Signal::Start, Signal::Pause, Signal::Resume, Signal::End];

/// Subscribe every component to every lifecycle signal
fn wire(hub: &mut EventHub<World>) {
    for signal in SIGNALS {
        hub.subscribe(signal, |w: &mut World, s| w.session.on_signal(s));
        hub.subscribe(signal, |w: &mut World, s| w.player.on_signal(s));
        hub.subscribe(signal, |w: &mut World, s| w.asteroids.on_signal(s));
        hub.subscribe(signal, |w: &mut World, s| w.powerups.on_signal(s));
    }
}

/// Collects collaborators and validates them before a game can start
#[derive(Default)]
pub struct GameBuilder {
    tuning: Option<Tuning>,
    seed: u64,
    hud: Option<Box<dyn Hud>>,
}

impl GameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = Some(tuning);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn hud(mut self, hud: impl Hud + 'static) -> Self {
        self.hud = Some(Box::new(hud));
        self
    }

    pub fn build(self) -> GameResult<Game> {
        let hud = self.hud.ok_or(GameError::MissingCollaborator("hud"))?;
        let tuning = self.tuning.unwrap_or_default();
        tuning.validate()?;
        Ok(Game::assemble(tuning, self.seed, hud))
    }
}

/// A complete run: components, hub, RNG and the fixed-step clock
pub struct Game {
    world: World,
    hub: EventHub<World>,
    contacts: ContactTracker,
    rng: Pcg32,
    hud: Box<dyn Hud>,
    tuning: Tuning,
    seed: u64,
    accumulator: f32,
    time_ticks: u64,
}

impl Game {
    pub fn builder() -> GameBuilder {
        GameBuilder::new()
    }

    fn assemble(tuning: Tuning, seed: u64, hud: Box<dyn Hud>) -> Self {
        let mut hub = EventHub::new();
        wire(&mut hub);
        log::info!("New game (seed {})", seed);
        Self {
            world: World::new(&tuning),
            hub,
            contacts: ContactTracker::new(),
            rng: Pcg32::seed_from_u64(seed),
            hud,
            tuning,
            seed,
            accumulator: 0.0,
            time_ticks: 0,
        }
    }

    /// Throw the whole run away and start over at the menu
    pub fn restart(&mut self, seed: u64) {
        let hud = std::mem::replace(&mut self.hud, Box::new(LogHud::default()));
        *self = Self::assemble(self.tuning.clone(), seed, hud);
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn session(&self) -> &SessionState {
        &self.world.session
    }

    pub fn player(&self) -> &PlayerAgent {
        &self.world.player
    }

    pub fn asteroids(&self) -> &FieldPopulation {
        &self.world.asteroids
    }

    pub fn powerups(&self) -> &FieldPopulation {
        &self.world.powerups
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// Add an outside observer for a lifecycle signal
    pub fn subscribe<F>(&mut self, signal: Signal, handler: F) -> SubscriptionId
    where
        F: FnMut(&mut World, Signal) + 'static,
    {
        self.hub.subscribe(signal, handler)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.hub.unsubscribe(id)
    }

    /// Publish a signal to every subscriber now
    pub fn publish(&mut self, signal: Signal) -> usize {
        self.hub.publish(signal, &mut self.world)
    }

    /// Leave the menu
    pub fn start(&mut self) {
        if self.world.session.phase() == SessionPhase::Menu {
            self.publish(Signal::Start);
        }
    }

    /// Flip between paused and running; ignored at the menu and after the end
    pub fn toggle_pause(&mut self) {
        if let Some(signal) = self.world.session.pause_toggle_request() {
            self.publish(signal);
        }
    }

    pub fn hud_snapshot(&self) -> HudSnapshot {
        HudSnapshot {
            score: self.world.session.score(),
            elapsed_seconds: self.world.session.elapsed_seconds(),
            hull_percent: self.world.player.hull_percent(),
            phase: self.world.session.phase(),
        }
    }

    /// Run one fixed step; returns the signals published at its end
    pub fn tick(&mut self, input: &TickInput, dt: f32, view: &mut dyn Viewport) -> Vec<Signal> {
        let input = input.sanitized();
        let elapsed_seconds = self.world.session.elapsed_seconds();
        self.time_ticks += 1;

        let mut requests = {
            let mut frame = Frame::new(
                &input,
                dt,
                elapsed_seconds,
                self.world.player.speed,
                self.world.player.anchor(),
                &*view,
                &mut self.rng,
            );
            self.world.session.update(&mut frame);
            self.world.player.update(&mut frame);
            frame.take_requests()
        };

        let anchor = self.world.player.anchor();
        view.track(&anchor);
        Self::resolve_contacts(&mut self.contacts, &mut self.world);

        let field_requests = {
            let mut frame = Frame::new(
                &input,
                dt,
                elapsed_seconds,
                self.world.player.speed,
                anchor,
                &*view,
                &mut self.rng,
            );
            self.world.asteroids.update(&mut frame);
            self.world.powerups.update(&mut frame);
            frame.take_requests()
        };
        for signal in field_requests {
            if !requests.contains(&signal) {
                requests.push(signal);
            }
        }

        for &signal in &requests {
            self.publish(signal);
        }

        let snapshot = self.hud_snapshot();
        self.hud.show(&snapshot);
        requests
    }

    /// Run as many fixed steps as `frame_dt` covers (capped), carrying the remainder
    pub fn advance(&mut self, input: &TickInput, frame_dt: f32, view: &mut dyn Viewport) -> u32 {
        self.accumulator += frame_dt.min(0.1);
        let mut input = input.clone();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.tick(&input, SIM_DT, view);
            self.accumulator -= SIM_DT;
            substeps += 1;

            // One-shot inputs only count once
            input.toggle_pause = false;
            input.start = false;
        }
        substeps
    }

    fn resolve_contacts(contacts: &mut ContactTracker, world: &mut World) {
        if !world.session.is_running() {
            return;
        }
        let World {
            session,
            player,
            asteroids,
            powerups,
        } = world;

        let events = contacts.update(player.position, player.radius(), &[&*asteroids, &*powerups]);
        for event in events {
            match event {
                ContactEvent::CollisionEnter { point, .. } => player.on_collision_enter(point),
                ContactEvent::CollisionExit { .. } => player.on_collision_exit(),
                ContactEvent::OverlapBegin { id, kind } => {
                    if let Some(effect) = player.on_overlap_begin(id, kind) {
                        session.apply_score_factor(effect.score_factor);
                    }
                }
                ContactEvent::OverlapEnd { id } => {
                    if player.on_overlap_end(id) {
                        powerups.destroy(id);
                    }
                }
            }
        }
    }
}
