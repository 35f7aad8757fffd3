#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system translating player actions into world commands.

use derivative_dash_core::{
    is_answer_character, Command, Event, Phase, PlayerAction, ANSWER_BUFFER_CAPACITY, SPEED_STEP,
};

/// Side effects of a frame's input that concern the adapter rather than the world.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// The player left a finished run and the menu should be shown again.
    pub menu_requested: bool,
}

/// Input system that tracks the run phase from world events and gates actions on it.
#[derive(Clone, Debug)]
pub struct InputController {
    phase: Phase,
    buffer_length: usize,
    speed_step: f64,
}

impl Default for InputController {
    fn default() -> Self {
        Self::new()
    }
}

impl InputController {
    /// Creates a controller for a run that starts in the driving phase.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: Phase::Driving,
            buffer_length: 0,
            speed_step: SPEED_STEP,
        }
    }

    /// Phase the controller believes the run is in.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Consumes world events, then maps the given actions onto commands.
    ///
    /// Every reported acceleration adjusts the speed by one step, so callers
    /// report held keys once per simulation tick.
    pub fn handle(
        &mut self,
        events: &[Event],
        actions: &[PlayerAction],
        out: &mut Vec<Command>,
    ) -> InputOutcome {
        for event in events {
            match event {
                Event::PhaseChanged { to, .. } => {
                    self.phase = *to;
                    if *to == Phase::AwaitingAnswer {
                        self.buffer_length = 0;
                    }
                }
                Event::AnswerBufferChanged { length } => self.buffer_length = *length,
                Event::RunReset => {
                    self.phase = Phase::Driving;
                    self.buffer_length = 0;
                }
                _ => {}
            }
        }

        let mut outcome = InputOutcome::default();
        for action in actions {
            match self.phase {
                Phase::AwaitingAnswer => self.handle_answer_action(*action, out),
                Phase::Driving => match action {
                    PlayerAction::Accelerate => out.push(Command::AdjustSpeed {
                        delta: self.speed_step,
                    }),
                    PlayerAction::Decelerate => out.push(Command::AdjustSpeed {
                        delta: -self.speed_step,
                    }),
                    _ => {}
                },
                Phase::Crashed | Phase::Victory | Phase::TrackEnded => match action {
                    PlayerAction::Restart => out.push(Command::ResetRun),
                    PlayerAction::Cancel => {
                        out.push(Command::ResetRun);
                        outcome.menu_requested = true;
                    }
                    _ => {}
                },
            }
        }
        outcome
    }

    fn handle_answer_action(&mut self, action: PlayerAction, out: &mut Vec<Command>) {
        match action {
            PlayerAction::Character(character) => {
                if is_answer_character(character) && self.buffer_length < ANSWER_BUFFER_CAPACITY {
                    self.buffer_length += 1;
                    out.push(Command::AppendAnswerCharacter { character });
                }
            }
            PlayerAction::Backspace => {
                if self.buffer_length > 0 {
                    self.buffer_length -= 1;
                    out.push(Command::EraseAnswerCharacter);
                }
            }
            PlayerAction::Submit => {
                self.buffer_length = 0;
                out.push(Command::SubmitAnswer);
            }
            PlayerAction::Cancel => {
                self.buffer_length = 0;
                out.push(Command::CancelAnswer);
            }
            PlayerAction::Accelerate | PlayerAction::Decelerate | PlayerAction::Restart => {}
        }
    }
}
