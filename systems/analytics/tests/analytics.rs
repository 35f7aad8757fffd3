use std::{rc::Rc, time::Duration};

use derivative_dash_core::{Command, Event, Phase, RunOutcome, TrackCurve, TRACKS};
use derivative_dash_system_analytics::{
    answer_accuracy_bps, average_driving_speed, RunReport, SessionAnalytics,
};
use derivative_dash_system_answer::AnswerEvaluator;
use derivative_dash_world::{apply, query, World};

const FRAME: Duration = Duration::from_nanos(16_666_667);

struct Harness {
    world: World,
    analytics: SessionAnalytics,
}

impl Harness {
    fn new() -> Self {
        let track = TrackCurve::from_descriptor(TRACKS[0]).expect("valid track");
        Self {
            world: World::new(Rc::new(track), AnswerEvaluator::default()),
            analytics: SessionAnalytics::new(),
        }
    }

    fn run(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in &commands {
            apply(&mut self.world, command.clone(), &mut events);
        }
        self.analytics.handle(&events, &commands);
    }

    fn drive_to_next_stop(&mut self) {
        for _ in 0..10_000 {
            self.run(vec![Command::Tick { dt: FRAME }]);
            if query::phase(&self.world) != Phase::Driving {
                return;
            }
        }
        panic!("vehicle never stopped");
    }

    fn type_answer(&mut self, text: &str) {
        let mut commands: Vec<Command> = text
            .chars()
            .map(|character| Command::AppendAnswerCharacter { character })
            .collect();
        commands.push(Command::SubmitAnswer);
        self.run(commands);
    }
}

#[test]
fn report_tracks_driving_and_verdicts() {
    let mut harness = Harness::new();
    harness.drive_to_next_stop();

    harness.type_answer("x");
    harness.type_answer("");
    let slope = format!("{:.3}", query::true_slope(&harness.world));
    harness.type_answer(&slope);

    let report = harness.analytics.current();
    assert_eq!(report.outcome, None);
    assert_eq!(report.answers_submitted, 3);
    assert_eq!(
        report.answers_unparsable, 2,
        "the stray letter never reaches the buffer, so both early submissions are empty"
    );
    assert_eq!(report.answers_accepted, 1);
    assert_eq!(report.score, 100);
    assert_eq!(report.ticks, 70);
    assert_eq!(report.ticks_driven, 70);
    assert!((report.distance_travelled - 140.0).abs() < 1e-3);
    assert_eq!(report.top_speed, 2.0);
    assert_eq!(answer_accuracy_bps(report), Some(10_000));
    let speed = average_driving_speed(report).expect("vehicle moved");
    assert!((speed - 2.0).abs() < 1e-6);
}

#[test]
fn crash_archives_report_with_outcome() {
    let mut harness = Harness::new();
    harness.drive_to_next_stop();
    harness.type_answer("-40");

    let finished = harness
        .analytics
        .last_finished()
        .expect("crash finishes the run")
        .clone();
    assert_eq!(finished.outcome, Some(RunOutcome::Crashed));
    assert_eq!(finished.answers_rejected, 1);
    assert_eq!(answer_accuracy_bps(&finished), Some(0));

    harness.run(vec![Command::ResetRun]);
    assert_eq!(harness.analytics.current(), &RunReport::default());
}

#[test]
fn report_serializes_with_screaming_outcome_tag() {
    let mut analytics = SessionAnalytics::new();
    analytics.handle(
        &[Event::RunFinished {
            outcome: RunOutcome::TrackEnded,
            score: 300,
        }],
        &[],
    );

    let json = serde_json::to_value(analytics.current()).expect("serializable report");
    assert_eq!(json["outcome"], "TRACK_ENDED");
    assert_eq!(json["score"], 300);
}
