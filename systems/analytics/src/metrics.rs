//! Derived metrics computed from a finished or running [`RunReport`].

use crate::RunReport;

const BASIS_POINTS: u64 = 10_000;

/// Share of judged answers that were accepted, in basis points.
///
/// Unparsable submissions are not judged and do not count against the player.
/// Returns `None` before the first verdict.
#[must_use]
pub fn answer_accuracy_bps(report: &RunReport) -> Option<u32> {
    let judged = u64::from(report.answers_accepted) + u64::from(report.answers_rejected);
    if judged == 0 {
        return None;
    }
    let bps = u64::from(report.answers_accepted) * BASIS_POINTS / judged;
    Some(u32::try_from(bps).unwrap_or(u32::MAX))
}

/// Mean distance covered per driving tick, in world units per frame.
#[must_use]
pub fn average_driving_speed(report: &RunReport) -> Option<f64> {
    if report.ticks_driven == 0 {
        return None;
    }
    Some(report.distance_travelled / report.ticks_driven as f64)
}

/// Share of the track's checkpoints that were cleared, in basis points.
#[must_use]
pub fn checkpoint_completion_bps(report: &RunReport, checkpoint_count: usize) -> u32 {
    if checkpoint_count == 0 {
        return BASIS_POINTS as u32;
    }
    let passed = report.checkpoints_passed.min(checkpoint_count) as u64;
    (passed * BASIS_POINTS / checkpoint_count as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accuracy_ignores_unparsable_answers() {
        let report = RunReport {
            answers_accepted: 3,
            answers_rejected: 1,
            answers_unparsable: 5,
            ..RunReport::default()
        };
        assert_eq!(answer_accuracy_bps(&report), Some(7_500));
        assert_eq!(answer_accuracy_bps(&RunReport::default()), None);
    }

    #[test]
    fn average_speed_divides_distance_by_driving_ticks() {
        let report = RunReport {
            ticks_driven: 4,
            distance_travelled: 10.0,
            ..RunReport::default()
        };
        assert_eq!(average_driving_speed(&report), Some(2.5));
        assert_eq!(average_driving_speed(&RunReport::default()), None);
    }

    #[test]
    fn completion_handles_tracks_without_checkpoints() {
        let report = RunReport {
            checkpoints_passed: 1,
            ..RunReport::default()
        };
        assert_eq!(checkpoint_completion_bps(&report, 4), 2_500);
        assert_eq!(checkpoint_completion_bps(&report, 0), 10_000);
    }
}
