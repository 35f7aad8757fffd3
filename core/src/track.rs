//! Mathematical tracks and the registry of shipped track descriptors.

use thiserror::Error;

/// Static description of a track: a height function, its exact analytic
/// derivative, the playable domain and the number of checkpoints.
#[derive(Clone, Copy, Debug)]
pub struct TrackDescriptor {
    /// Human readable track name.
    pub name: &'static str,
    /// Display-only formula shown to the player.
    pub formula_label: &'static str,
    /// Height of the track as a function of the horizontal world coordinate.
    pub height: fn(f64) -> f64,
    /// Exact derivative of [`TrackDescriptor::height`].
    pub slope: fn(f64) -> f64,
    /// Closed playable interval `(x_min, x_max)`.
    pub domain: (f64, f64),
    /// Number of checkpoints distributed along the domain.
    pub checkpoint_count: usize,
}

fn sinusoid_height(x: f64) -> f64 {
    50.0 * (0.01 * x).sin() + 0.001 * x * x + 300.0
}

fn sinusoid_slope(x: f64) -> f64 {
    50.0 * 0.01 * (0.01 * x).cos() + 0.002 * x
}

/// Tracks shipped with the game, selected by index at session start.
pub const TRACKS: [TrackDescriptor; 1] = [TrackDescriptor {
    name: "Sinusoid",
    formula_label: "f(x) = 50*sin(0.01x) + 0.001x^2 + 300",
    height: sinusoid_height,
    slope: sinusoid_slope,
    domain: (0.0, 1000.0),
    checkpoint_count: 4,
}];

/// Looks up a shipped track descriptor by registry index.
pub fn track_descriptor(index: usize) -> Result<&'static TrackDescriptor, TrackError> {
    TRACKS.get(index).ok_or(TrackError::UnknownTrack {
        index,
        available: TRACKS.len(),
    })
}

/// Errors raised while building or querying a track.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum TrackError {
    /// The domain is empty, reversed or not finite.
    #[error("track domain ({x_min}, {x_max}) must be finite with x_min < x_max")]
    InvalidDomain {
        /// Lower bound that failed validation.
        x_min: f64,
        /// Upper bound that failed validation.
        x_max: f64,
    },
    /// A checkpoint index beyond the configured count was requested.
    #[error("checkpoint index {index} is out of range for {count} checkpoints")]
    CheckpointIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of checkpoints on the track.
        count: usize,
    },
    /// The registry holds no track at the requested index.
    #[error("unknown track index {index}; {available} track(s) available")]
    UnknownTrack {
        /// Requested registry index.
        index: usize,
        /// Number of tracks in the registry.
        available: usize,
    },
}

/// Immutable track instance with precomputed checkpoint positions.
#[derive(Clone, Debug)]
pub struct TrackCurve {
    descriptor: TrackDescriptor,
    checkpoints: Vec<f64>,
}

impl TrackCurve {
    /// Builds a track from its descriptor, computing checkpoint positions once.
    pub fn from_descriptor(descriptor: TrackDescriptor) -> Result<Self, TrackError> {
        let (x_min, x_max) = descriptor.domain;
        if !x_min.is_finite() || !x_max.is_finite() || x_min >= x_max {
            return Err(TrackError::InvalidDomain { x_min, x_max });
        }

        let checkpoints = checkpoint_positions(x_min, x_max, descriptor.checkpoint_count);
        Ok(Self {
            descriptor,
            checkpoints,
        })
    }

    /// Human readable track name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.descriptor.name
    }

    /// Display-only formula label.
    #[must_use]
    pub fn formula_label(&self) -> &'static str {
        self.descriptor.formula_label
    }

    /// Closed playable interval `(x_min, x_max)`.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        self.descriptor.domain
    }

    /// Height of the track at `x`.
    #[must_use]
    pub fn height(&self, x: f64) -> f64 {
        (self.descriptor.height)(x)
    }

    /// Analytic slope of the track at `x`.
    #[must_use]
    pub fn slope(&self, x: f64) -> f64 {
        (self.descriptor.slope)(x)
    }

    /// Number of checkpoints on the track.
    #[must_use]
    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// All checkpoint positions in increasing order.
    #[must_use]
    pub fn checkpoint_positions(&self) -> &[f64] {
        &self.checkpoints
    }

    /// Position of the checkpoint at `index`.
    pub fn checkpoint_position(&self, index: usize) -> Result<f64, TrackError> {
        self.checkpoints
            .get(index)
            .copied()
            .ok_or(TrackError::CheckpointIndexOutOfRange {
                index,
                count: self.checkpoints.len(),
            })
    }

    /// Returns `true` when `x` lies within `margin` of the end of the domain or beyond it.
    #[must_use]
    pub fn is_past_end(&self, x: f64, margin: f64) -> bool {
        x >= self.descriptor.domain.1 - margin
    }
}

fn checkpoint_positions(x_min: f64, x_max: f64, count: usize) -> Vec<f64> {
    let spacing = (x_max - x_min) / (count as f64 + 1.0);
    (0..count)
        .map(|index| x_min + (index as f64 + 1.0) * spacing)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn linear_descriptor(domain: (f64, f64), checkpoint_count: usize) -> TrackDescriptor {
        TrackDescriptor {
            name: "Line",
            formula_label: "f(x) = 2x",
            height: |x| 2.0 * x,
            slope: |_| 2.0,
            domain,
            checkpoint_count,
        }
    }

    #[test]
    fn default_track_places_four_checkpoints() {
        let track = TrackCurve::from_descriptor(TRACKS[0]).expect("valid track");
        assert_eq!(track.checkpoint_positions(), &[200.0, 400.0, 600.0, 800.0]);
        assert_eq!(track.name(), "Sinusoid");
    }

    #[test]
    fn default_track_slope_matches_height_derivative() {
        let track = TrackCurve::from_descriptor(TRACKS[0]).expect("valid track");
        let step = 1e-4;
        for x in [0.0, 137.0, 400.0, 812.5, 1000.0] {
            let numeric = (track.height(x + step) - track.height(x - step)) / (2.0 * step);
            assert!(
                (numeric - track.slope(x)).abs() < 1e-5,
                "slope mismatch at x = {x}"
            );
        }
    }

    #[test]
    fn default_track_values_match_formula() {
        let track = TrackCurve::from_descriptor(TRACKS[0]).expect("valid track");
        assert!((track.height(0.0) - 300.0).abs() < 1e-12);
        assert!((track.slope(0.0) - 0.5).abs() < 1e-12);
        let expected = 50.0 * 2.0_f64.sin() + 40.0 + 300.0;
        assert!((track.height(200.0) - expected).abs() < 1e-9);
    }

    #[test]
    fn zero_checkpoints_yield_empty_positions() {
        let track = TrackCurve::from_descriptor(linear_descriptor((0.0, 100.0), 0))
            .expect("valid track");
        assert!(track.checkpoint_positions().is_empty());
        assert_eq!(
            track.checkpoint_position(0),
            Err(TrackError::CheckpointIndexOutOfRange { index: 0, count: 0 })
        );
    }

    #[test]
    fn checkpoint_position_rejects_out_of_range_index() {
        let track = TrackCurve::from_descriptor(TRACKS[0]).expect("valid track");
        assert_eq!(track.checkpoint_position(3), Ok(800.0));
        assert_eq!(
            track.checkpoint_position(4),
            Err(TrackError::CheckpointIndexOutOfRange { index: 4, count: 4 })
        );
    }

    #[test]
    fn reversed_or_empty_domains_are_rejected() {
        assert!(matches!(
            TrackCurve::from_descriptor(linear_descriptor((10.0, 10.0), 2)),
            Err(TrackError::InvalidDomain { .. })
        ));
        assert!(matches!(
            TrackCurve::from_descriptor(linear_descriptor((10.0, -5.0), 2)),
            Err(TrackError::InvalidDomain { .. })
        ));
        assert!(matches!(
            TrackCurve::from_descriptor(linear_descriptor((0.0, f64::INFINITY), 2)),
            Err(TrackError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn is_past_end_is_inclusive_at_margin() {
        let track = TrackCurve::from_descriptor(TRACKS[0]).expect("valid track");
        assert!(!track.is_past_end(949.99, 50.0));
        assert!(track.is_past_end(950.0, 50.0));
        assert!(track.is_past_end(2_000.0, 50.0));
    }

    #[test]
    fn unknown_track_index_is_reported() {
        assert!(track_descriptor(0).is_ok());
        assert_eq!(
            track_descriptor(7).err(),
            Some(TrackError::UnknownTrack {
                index: 7,
                available: TRACKS.len()
            })
        );
    }

    proptest! {
        #[test]
        fn checkpoints_are_evenly_spaced_inside_domain(
            x_min in -10_000.0f64..10_000.0,
            length in 1.0f64..10_000.0,
            count in 0usize..64,
        ) {
            let x_max = x_min + length;
            let track = TrackCurve::from_descriptor(linear_descriptor((x_min, x_max), count))
                .expect("valid track");
            let positions = track.checkpoint_positions();
            prop_assert_eq!(positions.len(), count);

            let spacing = (x_max - x_min) / (count as f64 + 1.0);
            let epsilon = 1e-9 * length.max(x_min.abs());
            for (index, position) in positions.iter().enumerate() {
                prop_assert!(*position > x_min);
                prop_assert!(*position < x_max);
                let expected = x_min + (index as f64 + 1.0) * spacing;
                prop_assert!((position - expected).abs() <= epsilon);
            }
            for pair in positions.windows(2) {
                prop_assert!(pair[1] > pair[0]);
                prop_assert!((pair[1] - pair[0] - spacing).abs() <= epsilon.max(1e-9));
            }
        }
    }
}
