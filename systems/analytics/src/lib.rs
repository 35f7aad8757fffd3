#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic analytics system that tallies runs from world events.

mod metrics;

use std::time::Duration;

use derivative_dash_core::{Command, Event, RunOutcome};
use serde::{Deserialize, Serialize};

pub use metrics::{answer_accuracy_bps, average_driving_speed, checkpoint_completion_bps};

/// Serializable summary of a single run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Terminal outcome, or `None` while the run is still going.
    pub outcome: Option<RunOutcome>,
    /// Score at the time of the report.
    pub score: u32,
    /// Checkpoints answered correctly.
    pub checkpoints_passed: usize,
    /// Answers submitted by the player, including unparsable ones.
    pub answers_submitted: u32,
    /// Answers within tolerance.
    pub answers_accepted: u32,
    /// Answers outside tolerance.
    pub answers_rejected: u32,
    /// Submissions that were not numbers.
    pub answers_unparsable: u32,
    /// Times the player abandoned an answer.
    pub answers_cancelled: u32,
    /// Ticks observed since the run started.
    pub ticks: u64,
    /// Ticks in which the vehicle moved.
    pub ticks_driven: u64,
    /// Simulated seconds since the run started.
    pub elapsed_secs: f64,
    /// Horizontal distance covered by the vehicle.
    pub distance_travelled: f64,
    /// Highest speed reached.
    pub top_speed: f64,
}

/// Pure analytics system that follows the current run and keeps the last finished one.
#[derive(Debug, Default)]
pub struct SessionAnalytics {
    current: RunReport,
    elapsed: Duration,
    last_finished: Option<RunReport>,
}

impl SessionAnalytics {
    /// Creates a new analytics system with an empty tally.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Live report for the run in progress.
    #[must_use]
    pub fn current(&self) -> &RunReport {
        &self.current
    }

    /// Report of the most recent run that reached a terminal phase.
    #[must_use]
    pub fn last_finished(&self) -> Option<&RunReport> {
        self.last_finished.as_ref()
    }

    /// Consumes world events and the commands that produced them.
    ///
    /// Submissions are counted from `commands` so that attempts the world
    /// ignored still show up next to the verdicts reported in `events`.
    pub fn handle(&mut self, events: &[Event], commands: &[Command]) {
        for command in commands {
            if matches!(command, Command::SubmitAnswer) {
                self.current.answers_submitted = self.current.answers_submitted.saturating_add(1);
            }
        }

        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    self.current.ticks = self.current.ticks.saturating_add(1);
                    self.elapsed = self.elapsed.saturating_add(*dt);
                    self.current.elapsed_secs = self.elapsed.as_secs_f64();
                }
                Event::VehicleMoved { from, to, speed } => {
                    self.current.ticks_driven = self.current.ticks_driven.saturating_add(1);
                    self.current.distance_travelled += to.x - from.x;
                    self.current.top_speed = self.current.top_speed.max(*speed);
                }
                Event::SpeedChanged { speed } => {
                    self.current.top_speed = self.current.top_speed.max(*speed);
                }
                Event::AnswerAccepted { score, .. } => {
                    self.current.answers_accepted += 1;
                    self.current.checkpoints_passed += 1;
                    self.current.score = *score;
                }
                Event::AnswerRejected { .. } => self.current.answers_rejected += 1,
                Event::AnswerUnparsable { .. } => self.current.answers_unparsable += 1,
                Event::AnswerCancelled { .. } => self.current.answers_cancelled += 1,
                Event::RunFinished { outcome, score } => self.finish(*outcome, *score),
                Event::RunReset => {
                    self.current = RunReport::default();
                    self.elapsed = Duration::ZERO;
                }
                _ => {}
            }
        }
    }

    fn finish(&mut self, outcome: RunOutcome, score: u32) {
        self.current.outcome = Some(outcome);
        self.current.score = score;
        self.last_finished = Some(self.current.clone());
    }
}
