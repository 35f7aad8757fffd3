#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative run state for Derivative Dash.
//!
//! The world owns the vehicle, the checkpoint bookkeeping, the pending answer
//! and the score. Every mutation arrives as a [`Command`] through [`apply`],
//! which reports what happened as [`Event`] values. Adapters read state
//! through the [`query`] module only.

mod vehicle;

use std::{rc::Rc, time::Duration};

use derivative_dash_core::{
    frame_units, is_answer_character, Camera, CheckpointIndex, Command, Event, MessageKind, Phase,
    RunMessage, RunOutcome, TrackCurve, Viewport, ANSWER_BUFFER_CAPACITY, CHECKPOINT_PROXIMITY,
    CHECKPOINT_REWARD, END_OF_TRACK_MARGIN, START_SPEED, WELCOME_BANNER,
};
use derivative_dash_system_answer::{AnswerEvaluator, Verdict};

use vehicle::Vehicle;

/// Represents the authoritative Derivative Dash run.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    track: Rc<TrackCurve>,
    evaluator: AnswerEvaluator,
    viewport: Viewport,
    vehicle: Vehicle,
    camera: Camera,
    phase: Phase,
    checkpoints_passed: usize,
    next_checkpoint: CheckpointIndex,
    pending_input: String,
    score: u32,
    message: Option<RunMessage>,
    clock: Duration,
    tick_index: u64,
}

impl World {
    /// Creates a world driving on `track`, judging answers with `evaluator`.
    #[must_use]
    pub fn new(track: Rc<TrackCurve>, evaluator: AnswerEvaluator) -> Self {
        Self::with_viewport(track, evaluator, Viewport::LOGICAL)
    }

    /// Creates a world whose camera frames the vehicle inside `viewport`.
    #[must_use]
    pub fn with_viewport(
        track: Rc<TrackCurve>,
        evaluator: AnswerEvaluator,
        viewport: Viewport,
    ) -> Self {
        let vehicle = Vehicle::spawn(&track);
        let camera = Camera::recompute(vehicle.position(), viewport);
        Self {
            banner: WELCOME_BANNER,
            track,
            evaluator,
            viewport,
            vehicle,
            camera,
            phase: Phase::Driving,
            checkpoints_passed: 0,
            next_checkpoint: CheckpointIndex::new(0),
            pending_input: String::new(),
            score: 0,
            message: None,
            clock: Duration::ZERO,
            tick_index: 0,
        }
    }

    fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.vehicle = Vehicle::spawn(&self.track);
        self.camera = Camera::recompute(self.vehicle.position(), self.viewport);
        self.checkpoints_passed = 0;
        self.next_checkpoint = CheckpointIndex::new(0);
        self.pending_input.clear();
        self.score = 0;
        self.message = None;
        self.transition(Phase::Driving, out_events);
        log::info!("run reset on track {}", self.track.name());
        out_events.push(Event::RunReset);
    }

    fn transition(&mut self, to: Phase, out_events: &mut Vec<Event>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        log::debug!("phase {from:?} -> {to:?}");
        out_events.push(Event::PhaseChanged { from, to });
    }

    fn post_message(&mut self, text: String, kind: MessageKind) {
        self.message = Some(RunMessage {
            text,
            kind,
            issued_at: self.clock,
        });
    }

    /// Position of the checkpoint the vehicle is heading towards, or `None`
    /// once every checkpoint has been cleared.
    fn next_checkpoint_position(&self) -> Option<f64> {
        let index = self.next_checkpoint.get();
        if index == self.track.checkpoint_count() {
            return None;
        }

        match self.track.checkpoint_position(index) {
            Ok(position) => Some(position),
            Err(error) => {
                log::error!("checkpoint bookkeeping is corrupt: {error}");
                debug_assert!(false, "checkpoint bookkeeping is corrupt: {error}");
                None
            }
        }
    }

    fn drive(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        // A vehicle still inside the proximity window of an unanswered
        // checkpoint parks again where it stands.
        self.detect_checkpoint_arrival(out_events);
        if self.phase != Phase::Driving {
            return;
        }

        let from = self.vehicle.position();
        if self.vehicle.advance(frame_units(dt), &self.track) {
            out_events.push(Event::VehicleMoved {
                from,
                to: self.vehicle.position(),
                speed: self.vehicle.speed(),
            });
        }
        self.camera = Camera::recompute(self.vehicle.position(), self.viewport);

        self.detect_checkpoint_arrival(out_events);
        if self.phase == Phase::Driving {
            self.detect_end_of_track(out_events);
        }
    }

    fn detect_checkpoint_arrival(&mut self, out_events: &mut Vec<Event>) {
        let Some(position) = self.next_checkpoint_position() else {
            return;
        };
        if self.vehicle.position().x < position - CHECKPOINT_PROXIMITY {
            return;
        }

        self.vehicle.park();
        self.pending_input.clear();
        self.post_message(
            format!("What is the derivative at x ~ {}?", position as i64),
            MessageKind::Prompt,
        );
        self.transition(Phase::AwaitingAnswer, out_events);
        log::info!(
            "checkpoint {} reached at x = {:.2}",
            self.next_checkpoint.get(),
            self.vehicle.position().x
        );
        out_events.push(Event::CheckpointReached {
            index: self.next_checkpoint,
            position,
        });
    }

    fn detect_end_of_track(&mut self, out_events: &mut Vec<Event>) {
        if !self
            .track
            .is_past_end(self.vehicle.position().x, END_OF_TRACK_MARGIN)
        {
            return;
        }

        let (_, x_max) = self.track.domain();
        self.vehicle
            .stop_at(x_max - END_OF_TRACK_MARGIN, &self.track);
        self.camera = Camera::recompute(self.vehicle.position(), self.viewport);

        let outcome = if self.checkpoints_passed == self.track.checkpoint_count() {
            self.post_message(
                format!("VICTORY! Score: {}", self.score),
                MessageKind::Victory,
            );
            RunOutcome::Victory
        } else {
            self.post_message(
                String::from("End of track! Some checkpoints were missed."),
                MessageKind::Failure,
            );
            RunOutcome::TrackEnded
        };
        self.finish(outcome, out_events);
    }

    fn finish(&mut self, outcome: RunOutcome, out_events: &mut Vec<Event>) {
        let terminal = match outcome {
            RunOutcome::Crashed => Phase::Crashed,
            RunOutcome::Victory => Phase::Victory,
            RunOutcome::TrackEnded => Phase::TrackEnded,
        };
        self.transition(terminal, out_events);
        log::info!("run finished: {} with score {}", outcome.tag(), self.score);
        out_events.push(Event::RunFinished {
            outcome,
            score: self.score,
        });
    }

    fn submit_answer(&mut self, out_events: &mut Vec<Event>) {
        let index = self.next_checkpoint;
        let raw_text = std::mem::take(&mut self.pending_input);
        let true_slope = self.track.slope(self.vehicle.position().x);

        match self.evaluator.evaluate(&raw_text, true_slope) {
            Verdict::Correct { answer, error } => {
                log::info!(
                    "checkpoint {} cleared: answered {answer}, slope {true_slope:.4}, error {error:.4}",
                    index.get()
                );
                self.score = self.score.saturating_add(CHECKPOINT_REWARD);
                self.checkpoints_passed += 1;
                self.next_checkpoint = index.next();
                self.vehicle.release(START_SPEED);
                self.post_message(String::from("Correct! Keep going!"), MessageKind::Success);
                self.transition(Phase::Driving, out_events);
                out_events.push(Event::AnswerAccepted {
                    index,
                    answer,
                    true_slope,
                    score: self.score,
                });
            }
            Verdict::Incorrect { answer, error } => {
                log::info!(
                    "checkpoint {} failed: answered {answer}, slope {true_slope:.4}, error {error:.4}",
                    index.get()
                );
                self.vehicle.crash();
                self.post_message(
                    format!("Wrong! The slope was {true_slope:.2}. You crashed!"),
                    MessageKind::Failure,
                );
                out_events.push(Event::AnswerRejected {
                    index,
                    answer,
                    true_slope,
                });
                out_events.push(Event::VehicleCrashed {
                    position: self.vehicle.position(),
                });
                self.finish(RunOutcome::Crashed, out_events);
            }
            Verdict::Unparsable(error) => {
                log::debug!("unparsable answer {raw_text:?}: {error}");
                self.post_message(String::from("Invalid number"), MessageKind::Info);
                out_events.push(Event::AnswerUnparsable { index });
                out_events.push(Event::AnswerBufferChanged { length: 0 });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });

            if world.phase == Phase::Driving {
                world.drive(dt, out_events);
            }
        }
        Command::AppendAnswerCharacter { character } => {
            if world.phase != Phase::AwaitingAnswer
                || !is_answer_character(character)
                || world.pending_input.chars().count() >= ANSWER_BUFFER_CAPACITY
            {
                return;
            }
            world.pending_input.push(character);
            out_events.push(Event::AnswerBufferChanged {
                length: world.pending_input.chars().count(),
            });
        }
        Command::EraseAnswerCharacter => {
            if world.phase != Phase::AwaitingAnswer {
                return;
            }
            if world.pending_input.pop().is_some() {
                out_events.push(Event::AnswerBufferChanged {
                    length: world.pending_input.chars().count(),
                });
            }
        }
        Command::CancelAnswer => {
            if world.phase != Phase::AwaitingAnswer {
                return;
            }
            world.pending_input.clear();
            world.vehicle.release(START_SPEED);
            world.post_message(String::from("Input cancelled"), MessageKind::Info);
            world.transition(Phase::Driving, out_events);
            out_events.push(Event::AnswerCancelled {
                index: world.next_checkpoint,
            });
        }
        Command::SubmitAnswer => {
            if world.phase == Phase::AwaitingAnswer {
                world.submit_answer(out_events);
            }
        }
        Command::AdjustSpeed { delta } => {
            if world.phase != Phase::Driving || !delta.is_finite() {
                return;
            }
            let changed = if delta >= 0.0 {
                world.vehicle.accelerate(delta)
            } else {
                world.vehicle.decelerate(-delta)
            };
            if changed {
                out_events.push(Event::SpeedChanged {
                    speed: world.vehicle.speed(),
                });
            }
        }
        Command::ResetRun => world.reset(out_events),
        Command::LoadTrack { track } => {
            world.track = track;
            world.reset(out_events);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use derivative_dash_core::{
        Camera, CheckpointIndex, Phase, RunMessage, RunOutcome, TrackCurve, VehicleSnapshot,
    };

    use super::World;

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Track the run is played on.
    #[must_use]
    pub fn track(world: &World) -> &TrackCurve {
        &world.track
    }

    /// Current phase of the run.
    #[must_use]
    pub fn phase(world: &World) -> Phase {
        world.phase
    }

    /// Terminal outcome, if the run has ended.
    #[must_use]
    pub fn outcome(world: &World) -> Option<RunOutcome> {
        world.phase.outcome()
    }

    /// Captures the vehicle's kinematic state.
    #[must_use]
    pub fn vehicle(world: &World) -> VehicleSnapshot {
        world.vehicle.snapshot()
    }

    /// Camera framing the vehicle after the most recent tick.
    #[must_use]
    pub fn camera(world: &World) -> Camera {
        world.camera
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of checkpoints answered correctly.
    #[must_use]
    pub fn checkpoints_passed(world: &World) -> usize {
        world.checkpoints_passed
    }

    /// Index and position of the next unanswered checkpoint, if any remains.
    #[must_use]
    pub fn next_checkpoint(world: &World) -> Option<(CheckpointIndex, f64)> {
        world
            .next_checkpoint_position()
            .map(|position| (world.next_checkpoint, position))
    }

    /// Text typed so far at the current checkpoint.
    #[must_use]
    pub fn pending_input(world: &World) -> &str {
        &world.pending_input
    }

    /// Most recent message, regardless of whether it already expired.
    #[must_use]
    pub fn message(world: &World) -> Option<&RunMessage> {
        world.message.as_ref()
    }

    /// Most recent message if it is still within its display lifetime.
    #[must_use]
    pub fn visible_message(world: &World) -> Option<&RunMessage> {
        world
            .message
            .as_ref()
            .filter(|message| message.is_visible_at(world.clock))
    }

    /// Analytic slope of the track under the vehicle.
    #[must_use]
    pub fn true_slope(world: &World) -> f64 {
        world.track.slope(world.vehicle.position().x)
    }

    /// Simulated time elapsed since the world was created.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Number of ticks processed since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Tolerance applied when judging answers.
    #[must_use]
    pub fn answer_tolerance(world: &World) -> f64 {
        world.evaluator.tolerance()
    }
}
