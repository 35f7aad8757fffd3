//! Scripted player that answers every checkpoint with the exact slope.
//!
//! The autopilot only produces [`PlayerAction`]s, so its answers travel the
//! same input path as keyboard presses.

use derivative_dash_core::{Phase, PlayerAction, ANSWER_BUFFER_CAPACITY};
use derivative_dash_world::{query, World};

const MAX_DECIMALS: usize = 6;

/// Answers checkpoints on the player's behalf.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Autopilot;

impl Autopilot {
    /// Appends the keystrokes the autopilot would make this frame.
    pub(crate) fn plan(&self, world: &World, actions: &mut Vec<PlayerAction>) {
        if query::phase(world) != Phase::AwaitingAnswer || !query::pending_input(world).is_empty()
        {
            return;
        }

        let answer = format_answer(query::true_slope(world));
        actions.extend(answer.chars().map(PlayerAction::Character));
        actions.push(PlayerAction::Submit);
    }
}

/// Renders `slope` with as many decimals as fit in the answer buffer.
fn format_answer(slope: f64) -> String {
    (0..=MAX_DECIMALS)
        .rev()
        .map(|decimals| format!("{slope:.decimals$}"))
        .find(|text| text.len() <= ANSWER_BUFFER_CAPACITY)
        .unwrap_or_else(|| format!("{slope:.0}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use derivative_dash_core::{Command, TrackCurve, TRACKS};
    use derivative_dash_system_answer::AnswerEvaluator;
    use derivative_dash_world::apply;
    use std::{rc::Rc, time::Duration};

    #[test]
    fn answers_fit_the_buffer() {
        assert_eq!(format_answer(0.5), "0.500000");
        assert_eq!(format_answer(-1.234_567_89), "-1.234568");
        assert_eq!(format_answer(123.456), "123.456000");
        assert!(format_answer(-98_765.4321).len() <= ANSWER_BUFFER_CAPACITY);
    }

    #[test]
    fn stays_idle_while_driving() {
        let track = Rc::new(TrackCurve::from_descriptor(TRACKS[0]).expect("valid track"));
        let world = World::new(track, AnswerEvaluator::new(0.5));
        let mut actions = Vec::new();
        Autopilot.plan(&world, &mut actions);
        assert!(actions.is_empty());
    }

    #[test]
    fn types_slope_and_submits_at_checkpoint() {
        let track = Rc::new(TrackCurve::from_descriptor(TRACKS[0]).expect("valid track"));
        let mut world = World::new(track, AnswerEvaluator::new(0.5));
        let mut events = Vec::new();
        while query::phase(&world) != Phase::AwaitingAnswer {
            apply(
                &mut world,
                Command::Tick {
                    dt: Duration::from_millis(100),
                },
                &mut events,
            );
        }

        let mut actions = Vec::new();
        Autopilot.plan(&world, &mut actions);
        assert_eq!(actions.last(), Some(&PlayerAction::Submit));
        let typed: String = actions
            .iter()
            .filter_map(|action| match action {
                PlayerAction::Character(character) => Some(*character),
                _ => None,
            })
            .collect();
        let parsed: f64 = typed.parse().expect("autopilot types a number");
        assert!((parsed - query::true_slope(&world)).abs() < 1e-5);
    }
}
