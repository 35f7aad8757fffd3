//! Layered game configuration: command line over TOML file over defaults.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::ValueEnum;
use derivative_dash_core::{track_descriptor, DEFAULT_ANSWER_TOLERANCE};
use serde::Deserialize;
use thiserror::Error;

/// Ticks a headless run may take before it is abandoned (ten minutes of play).
pub(crate) const DEFAULT_MAX_TICKS: u64 = 36_000;

/// Format used to print the run report of a headless session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum SummaryFormat {
    /// Human readable key/value lines.
    #[default]
    Text,
    /// A single JSON document.
    Json,
}

/// Keys accepted in the TOML configuration file.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) track: Option<usize>,
    pub(crate) tolerance: Option<f64>,
    pub(crate) seed: Option<u64>,
    pub(crate) vsync: Option<bool>,
    pub(crate) show_fps: Option<bool>,
    pub(crate) autopilot: Option<bool>,
    pub(crate) headless: Option<bool>,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) summary: Option<SummaryFormat>,
}

impl FileConfig {
    /// Reads and parses a TOML configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    fn parse(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

/// Values given on the command line; `None` defers to the file or the default.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct Overrides {
    pub(crate) track: Option<usize>,
    pub(crate) tolerance: Option<f64>,
    pub(crate) seed: Option<u64>,
    pub(crate) vsync: Option<bool>,
    pub(crate) show_fps: Option<bool>,
    pub(crate) autopilot: Option<bool>,
    pub(crate) headless: Option<bool>,
    pub(crate) max_ticks: Option<u64>,
    pub(crate) summary: Option<SummaryFormat>,
}

/// Fully resolved settings for one invocation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct GameConfig {
    pub(crate) track: usize,
    pub(crate) tolerance: f64,
    pub(crate) seed: Option<u64>,
    pub(crate) vsync: bool,
    pub(crate) show_fps: bool,
    pub(crate) autopilot: bool,
    pub(crate) headless: bool,
    pub(crate) max_ticks: u64,
    pub(crate) summary: SummaryFormat,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            track: 0,
            tolerance: DEFAULT_ANSWER_TOLERANCE,
            seed: None,
            vsync: true,
            show_fps: false,
            autopilot: false,
            headless: false,
            max_ticks: DEFAULT_MAX_TICKS,
            summary: SummaryFormat::Text,
        }
    }
}

/// Reasons a resolved configuration is rejected.
#[derive(Debug, Error, PartialEq)]
pub(crate) enum ConfigError {
    /// Answer tolerance must be a finite, strictly positive number.
    #[error("answer tolerance must be finite and positive (received {0})")]
    InvalidTolerance(f64),
    /// A headless run needs at least one tick to make progress.
    #[error("max ticks must be at least 1")]
    ZeroMaxTicks,
}

impl GameConfig {
    /// Merges the layers and validates the result.
    pub(crate) fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            track: overrides.track.or(file.track).unwrap_or(defaults.track),
            tolerance: overrides
                .tolerance
                .or(file.tolerance)
                .unwrap_or(defaults.tolerance),
            seed: overrides.seed.or(file.seed),
            vsync: overrides.vsync.or(file.vsync).unwrap_or(defaults.vsync),
            show_fps: overrides
                .show_fps
                .or(file.show_fps)
                .unwrap_or(defaults.show_fps),
            autopilot: overrides
                .autopilot
                .or(file.autopilot)
                .unwrap_or(defaults.autopilot),
            headless: overrides
                .headless
                .or(file.headless)
                .unwrap_or(defaults.headless),
            max_ticks: overrides
                .max_ticks
                .or(file.max_ticks)
                .unwrap_or(defaults.max_ticks),
            summary: overrides
                .summary
                .or(file.summary)
                .unwrap_or(defaults.summary),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance).into());
        }
        if self.max_ticks == 0 {
            return Err(ConfigError::ZeroMaxTicks.into());
        }
        let _ = track_descriptor(self.track).context("invalid track selection")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_configured() {
        let config = GameConfig::resolve(FileConfig::default(), Overrides::default())
            .expect("defaults are valid");
        assert_eq!(config, GameConfig::default());
        assert_eq!(config.tolerance, 0.5);
        assert!(config.vsync);
    }

    #[test]
    fn command_line_overrides_file_which_overrides_defaults() {
        let file = FileConfig::parse(
            r#"
            tolerance = 0.25
            seed = 7
            summary = "json"
            vsync = false
            "#,
        )
        .expect("valid toml");
        let overrides = Overrides {
            tolerance: Some(1.0),
            ..Overrides::default()
        };

        let config = GameConfig::resolve(file, overrides).expect("valid config");
        assert_eq!(config.tolerance, 1.0);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.summary, SummaryFormat::Json);
        assert!(!config.vsync);
        assert_eq!(config.max_ticks, DEFAULT_MAX_TICKS);
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        assert!(FileConfig::parse("speed = 3").is_err());
    }

    #[test]
    fn non_positive_or_non_finite_tolerance_is_rejected() {
        for tolerance in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            let overrides = Overrides {
                tolerance: Some(tolerance),
                ..Overrides::default()
            };
            let error = GameConfig::resolve(FileConfig::default(), overrides)
                .expect_err("tolerance must be rejected");
            assert!(error.downcast_ref::<ConfigError>().is_some());
        }
    }

    #[test]
    fn unknown_track_index_is_rejected() {
        let overrides = Overrides {
            track: Some(99),
            ..Overrides::default()
        };
        let error = GameConfig::resolve(FileConfig::default(), overrides)
            .expect_err("track 99 does not exist");
        assert!(format!("{error:#}").contains("invalid track selection"));
    }

    #[test]
    fn zero_max_ticks_is_rejected() {
        let file = FileConfig {
            max_ticks: Some(0),
            ..FileConfig::default()
        };
        assert!(GameConfig::resolve(file, Overrides::default()).is_err());
    }

    #[test]
    fn missing_config_file_reports_its_path() {
        let error = FileConfig::load(Path::new("/definitely/not/here.toml"))
            .expect_err("file does not exist");
        assert!(error.to_string().contains("/definitely/not/here.toml"));
    }
}
