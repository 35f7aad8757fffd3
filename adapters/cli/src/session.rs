//! Fixed-step game session that owns the world and every system.

use std::{rc::Rc, time::Duration};

use anyhow::{Context, Result};
use derivative_dash_core::{
    track_descriptor, Command, Event, PlayerAction, TrackCurve, SIMULATION_RATE_HZ,
};
use derivative_dash_system_analytics::{RunReport, SessionAnalytics};
use derivative_dash_system_answer::AnswerEvaluator;
use derivative_dash_system_effects::VisualEffects;
use derivative_dash_system_input::InputController;
use derivative_dash_world::{apply, query, World};

use crate::{autopilot::Autopilot, config::GameConfig};

/// Simulated time covered by one tick.
pub(crate) const SIMULATION_STEP: Duration =
    Duration::from_nanos(1_000_000_000 / SIMULATION_RATE_HZ as u64);
const MAX_FRAME_DELTA: Duration = Duration::from_millis(100);
const MAX_SUBSTEPS: u32 = 8;

/// What happened during one presented frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct FrameReport {
    pub(crate) menu_requested: bool,
}

/// One player's session: the world, the systems reacting to it and the
/// accumulator that decouples simulation from presentation.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    input: InputController,
    effects: VisualEffects,
    analytics: SessionAnalytics,
    autopilot: Option<Autopilot>,
    accumulator: Duration,
    unseen_events: Vec<Event>,
    seed: u64,
}

impl Session {
    pub(crate) fn new(config: &GameConfig) -> Result<Self> {
        let descriptor = track_descriptor(config.track).context("failed to select track")?;
        let track = TrackCurve::from_descriptor(*descriptor)
            .with_context(|| format!("track {} is malformed", descriptor.name))?;
        let seed = config.seed.unwrap_or_else(rand::random);
        log::info!(
            "starting session on {} ({}) with tolerance {} and effects seed {}",
            track.name(),
            track.formula_label(),
            config.tolerance,
            seed
        );

        Ok(Self {
            world: World::new(Rc::new(track), AnswerEvaluator::new(config.tolerance)),
            input: InputController::new(),
            effects: VisualEffects::new(seed),
            analytics: SessionAnalytics::new(),
            autopilot: config.autopilot.then_some(Autopilot),
            accumulator: Duration::ZERO,
            unseen_events: Vec::new(),
            seed,
        })
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    pub(crate) fn effects(&self) -> &VisualEffects {
        &self.effects
    }

    /// Report of the run in progress, or of the run that just finished.
    pub(crate) fn report(&self) -> &RunReport {
        self.analytics.current()
    }

    pub(crate) fn seed(&self) -> u64 {
        self.seed
    }

    /// Turns this frame's actions into commands, then drains the accumulator
    /// in fixed ticks. Held actions are replayed before every tick so speed
    /// ramps with simulated time rather than with the frame rate.
    pub(crate) fn frame(&mut self, frame_dt: Duration, actions: &[PlayerAction]) -> FrameReport {
        let mut actions = actions.to_vec();
        if let Some(autopilot) = &self.autopilot {
            autopilot.plan(&self.world, &mut actions);
        }
        let (held, pressed): (Vec<PlayerAction>, Vec<PlayerAction>) =
            actions.into_iter().partition(|action| action.is_held());

        let mut commands = Vec::new();
        let outcome = self
            .input
            .handle(&self.unseen_events, &pressed, &mut commands);
        self.unseen_events.clear();

        let mut events = Vec::new();
        for command in commands.iter().cloned() {
            apply(&mut self.world, command, &mut events);
        }
        let mut seen = 0;

        self.accumulator += frame_dt.min(MAX_FRAME_DELTA);
        let mut substeps = 0;
        while self.accumulator >= SIMULATION_STEP && substeps < MAX_SUBSTEPS {
            if !held.is_empty() {
                let first = commands.len();
                let _ = self.input.handle(&events[seen..], &held, &mut commands);
                seen = events.len();
                for command in commands[first..].iter().cloned() {
                    apply(&mut self.world, command, &mut events);
                }
            }
            apply(
                &mut self.world,
                Command::Tick {
                    dt: SIMULATION_STEP,
                },
                &mut events,
            );
            self.accumulator -= SIMULATION_STEP;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS {
            log::debug!("simulation fell behind; carrying {:?}", self.accumulator);
        }

        self.effects.handle(&events);
        self.analytics.handle(&events, &commands);
        self.unseen_events = events.split_off(seen);

        FrameReport {
            menu_requested: outcome.menu_requested,
        }
    }

    /// Plays one tick per frame until the run ends or `max_ticks` elapse.
    pub(crate) fn run_headless(&mut self, max_ticks: u64) -> &RunReport {
        while !query::phase(&self.world).is_terminal() && query::tick_index(&self.world) < max_ticks
        {
            let _ = self.frame(SIMULATION_STEP, &[]);
        }
        match query::outcome(&self.world) {
            Some(outcome) => log::info!(
                "run finished: {} with score {}",
                outcome.tag(),
                query::score(&self.world)
            ),
            None => log::warn!(
                "run abandoned after {} ticks in phase {:?}",
                query::tick_index(&self.world),
                query::phase(&self.world)
            ),
        }
        self.report()
    }
}
