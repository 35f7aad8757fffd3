#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Derivative Dash engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.
//!
//! The mathematical track ([`TrackCurve`]) and the scrolling camera
//! ([`Camera`]) also live here because the world, the systems and the
//! rendering adapters all need the same definitions.

use std::{rc::Rc, time::Duration};

use serde::{Deserialize, Serialize};

pub mod camera;
pub mod track;

pub use camera::{Camera, Viewport};
pub use track::{track_descriptor, TrackCurve, TrackDescriptor, TrackError, TRACKS};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Derivative Dash";

/// Number of simulation ticks per second; one tick equals one frame unit of motion.
pub const SIMULATION_RATE_HZ: u32 = 60;

/// Distance past the start of the domain where every run begins.
pub const START_OFFSET: f64 = 50.0;

/// Speed assigned to the vehicle when a run starts or a checkpoint is cleared.
pub const START_SPEED: f64 = 2.0;

/// Lowest speed reachable through deceleration.
pub const MIN_SPEED: f64 = 1.0;

/// Highest speed reachable through acceleration.
pub const MAX_SPEED: f64 = 8.0;

/// Speed change applied per accelerate/decelerate action.
pub const SPEED_STEP: f64 = 0.1;

/// Distance before a checkpoint at which the vehicle stops for an answer.
pub const CHECKPOINT_PROXIMITY: f64 = 10.0;

/// Distance before the end of the domain at which a run is finished.
pub const END_OF_TRACK_MARGIN: f64 = 50.0;

/// Points awarded for every correctly answered checkpoint.
pub const CHECKPOINT_REWARD: u32 = 100;

/// Default maximum absolute error accepted for a correct answer.
pub const DEFAULT_ANSWER_TOLERANCE: f64 = 0.5;

/// Maximum number of characters held by the answer buffer.
pub const ANSWER_BUFFER_CAPACITY: usize = 10;

/// Duration a transient message stays visible.
pub const MESSAGE_LIFETIME: Duration = Duration::from_secs(5);

/// Converts an elapsed duration into frame units at [`SIMULATION_RATE_HZ`].
#[must_use]
pub fn frame_units(dt: Duration) -> f64 {
    dt.as_secs_f64() * f64::from(SIMULATION_RATE_HZ)
}

/// Reports whether a character may be typed into the answer buffer.
#[must_use]
pub const fn is_answer_character(character: char) -> bool {
    matches!(character, '0'..='9' | '.' | '-')
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Appends a character to the pending answer while a checkpoint awaits an answer.
    AppendAnswerCharacter {
        /// Character typed by the player.
        character: char,
    },
    /// Removes the last character of the pending answer.
    EraseAnswerCharacter,
    /// Abandons the pending answer and resumes driving.
    CancelAnswer,
    /// Submits the pending answer for evaluation.
    SubmitAnswer,
    /// Requests a change of the vehicle's speed while driving.
    AdjustSpeed {
        /// Signed speed delta; positive values accelerate.
        delta: f64,
    },
    /// Reinitializes the run on the current track.
    ResetRun,
    /// Reinitializes the run on a different track.
    LoadTrack {
        /// Track shared with the run after the reset.
        track: Rc<TrackCurve>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the vehicle moved along the track.
    VehicleMoved {
        /// Position occupied before the move.
        from: WorldPoint,
        /// Position occupied after the move.
        to: WorldPoint,
        /// Speed in world units per frame during the move.
        speed: f64,
    },
    /// Announces that the vehicle stopped at a checkpoint and awaits an answer.
    CheckpointReached {
        /// Checkpoint the vehicle stopped at.
        index: CheckpointIndex,
        /// World x-coordinate of the checkpoint.
        position: f64,
    },
    /// Confirms that a submitted answer was within tolerance.
    AnswerAccepted {
        /// Checkpoint that was cleared.
        index: CheckpointIndex,
        /// Value submitted by the player.
        answer: f64,
        /// Analytic slope the answer was compared against.
        true_slope: f64,
        /// Score after the reward was granted.
        score: u32,
    },
    /// Reports that a submitted answer was outside tolerance and crashed the vehicle.
    AnswerRejected {
        /// Checkpoint where the run ended.
        index: CheckpointIndex,
        /// Value submitted by the player.
        answer: f64,
        /// Analytic slope the answer was compared against.
        true_slope: f64,
    },
    /// Reports that the submitted text was not a number.
    AnswerUnparsable {
        /// Checkpoint still awaiting an answer.
        index: CheckpointIndex,
    },
    /// Reports that the player abandoned the pending answer.
    AnswerCancelled {
        /// Checkpoint that was awaiting an answer.
        index: CheckpointIndex,
    },
    /// Reports the new length of the pending answer after an edit.
    AnswerBufferChanged {
        /// Number of characters in the buffer.
        length: usize,
    },
    /// Confirms that the vehicle's speed changed on request.
    SpeedChanged {
        /// Speed after the adjustment.
        speed: f64,
    },
    /// Announces a phase transition of the run.
    PhaseChanged {
        /// Phase left by the transition.
        from: Phase,
        /// Phase entered by the transition.
        to: Phase,
    },
    /// Announces that the vehicle crashed.
    VehicleCrashed {
        /// Position of the vehicle at the moment of the crash.
        position: WorldPoint,
    },
    /// Announces that the run reached a terminal phase.
    RunFinished {
        /// Terminal outcome of the run.
        outcome: RunOutcome,
        /// Final score.
        score: u32,
    },
    /// Confirms that every run field was reinitialized.
    RunReset,
}

/// Discrete state of a game run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// The vehicle moves along the track.
    Driving,
    /// The vehicle is parked at a checkpoint waiting for the derivative.
    AwaitingAnswer,
    /// A wrong answer crashed the vehicle.
    Crashed,
    /// Every checkpoint was cleared and the end of the track was reached.
    Victory,
    /// The end of the track was reached with checkpoints outstanding.
    TrackEnded,
}

impl Phase {
    /// Returns `true` when the run can only be left through a reset.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Crashed | Self::Victory | Self::TrackEnded)
    }

    /// Terminal outcome associated with the phase, if any.
    #[must_use]
    pub const fn outcome(self) -> Option<RunOutcome> {
        match self {
            Self::Crashed => Some(RunOutcome::Crashed),
            Self::Victory => Some(RunOutcome::Victory),
            Self::TrackEnded => Some(RunOutcome::TrackEnded),
            Self::Driving | Self::AwaitingAnswer => None,
        }
    }
}

/// Terminal outcome tag reported when a run finishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    /// A wrong answer crashed the vehicle.
    Crashed,
    /// Every checkpoint was cleared.
    Victory,
    /// The track ended before every checkpoint was cleared.
    TrackEnded,
}

impl RunOutcome {
    /// Upper-case tag used by reports.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Crashed => "CRASHED",
            Self::Victory => "VICTORY",
            Self::TrackEnded => "TRACK_ENDED",
        }
    }
}

/// Zero-based index of a checkpoint along the track.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct CheckpointIndex(usize);

impl CheckpointIndex {
    /// Creates a new checkpoint index with the provided numeric value.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Index of the checkpoint that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Point expressed in world coordinates; larger `y` is higher on the track.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct WorldPoint {
    /// Horizontal world coordinate.
    pub x: f64,
    /// Vertical world coordinate.
    pub y: f64,
}

impl WorldPoint {
    /// Creates a new world point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Linearly interpolates towards `other` by `t` in `0.0..=1.0`.
    #[must_use]
    pub fn lerp(self, other: WorldPoint, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Category of a transient message, used by renderers to pick a tint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Question shown when the vehicle reaches a checkpoint.
    Prompt,
    /// Confirmation of a correct answer.
    Success,
    /// Crash or failed run.
    Failure,
    /// Neutral notice such as an invalid number or a cancelled answer.
    Info,
    /// Run completed with every checkpoint cleared.
    Victory,
}

/// Most recent message issued by the world.
#[derive(Clone, Debug, PartialEq)]
pub struct RunMessage {
    /// Text shown to the player.
    pub text: String,
    /// Category of the message.
    pub kind: MessageKind,
    /// Session clock reading at the moment the message was issued.
    pub issued_at: Duration,
}

impl RunMessage {
    /// Reports whether the message is still within its display window.
    #[must_use]
    pub fn is_visible_at(&self, now: Duration) -> bool {
        now.saturating_sub(self.issued_at) < MESSAGE_LIFETIME
    }
}

/// Immutable representation of the vehicle's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleSnapshot {
    /// Current position on the track.
    pub position: WorldPoint,
    /// Current speed in world units per frame.
    pub speed: f64,
    /// Upper speed limit.
    pub max_speed: f64,
    /// Whether the vehicle crashed.
    pub crashed: bool,
    /// Whether the vehicle is parked at a checkpoint.
    pub waiting: bool,
}

/// Player intentions gathered by adapters, independent of the input device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerAction {
    /// A printable character was typed.
    Character(char),
    /// Remove the last typed character.
    Backspace,
    /// Submit the typed answer.
    Submit,
    /// Cancel the answer, or leave a finished run.
    Cancel,
    /// Increase speed while driving.
    Accelerate,
    /// Decrease speed while driving.
    Decelerate,
    /// Restart a finished run.
    Restart,
}

impl PlayerAction {
    /// Whether the action is reported for as long as its key is held, and so
    /// applies once per simulation tick rather than once per frame.
    #[must_use]
    pub const fn is_held(self) -> bool {
        matches!(self, Self::Accelerate | Self::Decelerate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_phases_report_outcomes() {
        assert!(!Phase::Driving.is_terminal());
        assert!(!Phase::AwaitingAnswer.is_terminal());
        assert_eq!(Phase::Crashed.outcome(), Some(RunOutcome::Crashed));
        assert_eq!(Phase::Victory.outcome(), Some(RunOutcome::Victory));
        assert_eq!(Phase::TrackEnded.outcome(), Some(RunOutcome::TrackEnded));
        assert_eq!(Phase::AwaitingAnswer.outcome(), None);
    }

    #[test]
    fn only_speed_actions_are_held() {
        assert!(PlayerAction::Accelerate.is_held());
        assert!(PlayerAction::Decelerate.is_held());
        assert!(!PlayerAction::Submit.is_held());
        assert!(!PlayerAction::Character('1').is_held());
    }

    #[test]
    fn outcome_serializes_as_screaming_tag() {
        let json = serde_json::to_string(&RunOutcome::TrackEnded).expect("serialize");
        assert_eq!(json, "\"TRACK_ENDED\"");
        assert_eq!(RunOutcome::TrackEnded.tag(), "TRACK_ENDED");
    }

    #[test]
    fn answer_characters_are_digits_point_and_minus() {
        for character in "0123456789.-".chars() {
            assert!(is_answer_character(character));
        }
        for character in "+eE ,a".chars() {
            assert!(!is_answer_character(character));
        }
    }

    #[test]
    fn frame_units_scale_with_simulation_rate() {
        let one_tick = Duration::from_secs_f64(1.0 / 60.0);
        assert!((frame_units(one_tick) - 1.0).abs() < 1e-9);
        assert!((frame_units(Duration::from_millis(500)) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn messages_expire_after_lifetime() {
        let message = RunMessage {
            text: "hello".to_owned(),
            kind: MessageKind::Info,
            issued_at: Duration::from_secs(2),
        };
        assert!(message.is_visible_at(Duration::from_secs(2)));
        assert!(message.is_visible_at(Duration::from_millis(6_999)));
        assert!(!message.is_visible_at(Duration::from_secs(7)));
    }

    #[test]
    fn world_point_lerp_interpolates_both_axes() {
        let start = WorldPoint::new(0.0, 10.0);
        let end = WorldPoint::new(4.0, 16.0);
        assert_eq!(start.lerp(end, 0.5), WorldPoint::new(2.0, 13.0));
    }
}
