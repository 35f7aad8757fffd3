#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots Derivative Dash.

mod app;
mod autopilot;
mod config;
mod scene;
mod session;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueHint};
use derivative_dash_core::{Viewport, WELCOME_BANNER};
use derivative_dash_rendering::{palette, Presentation, RenderingBackend, Scene};
use derivative_dash_rendering_macroquad::MacroquadBackend;
use derivative_dash_system_analytics::{
    answer_accuracy_bps, average_driving_speed, checkpoint_completion_bps, RunReport,
};
use derivative_dash_world::query;
use serde::Serialize;

use crate::{
    app::App,
    config::{FileConfig, GameConfig, Overrides, SummaryFormat},
    session::Session,
};

/// Drive along a curve and answer derivative questions at every checkpoint.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML file supplying defaults for any of the options below.
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Index of the track in the built-in registry.
    #[arg(long)]
    track: Option<usize>,

    /// Largest accepted distance between an answer and the true slope.
    #[arg(long)]
    tolerance: Option<f64>,

    /// Seed for the decorative particle effects.
    #[arg(long)]
    seed: Option<u64>,

    /// Synchronise presentation with the display refresh rate.
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "no_vsync")]
    vsync: bool,

    /// Present frames as fast as possible.
    #[arg(long, action = ArgAction::SetTrue, overrides_with = "vsync")]
    no_vsync: bool,

    /// Log a frame-time summary once per second.
    #[arg(long, action = ArgAction::SetTrue)]
    show_fps: bool,

    /// Answer every checkpoint automatically with the exact slope.
    #[arg(long, action = ArgAction::SetTrue)]
    autopilot: bool,

    /// Run without a window and print the run report.
    #[arg(long, action = ArgAction::SetTrue)]
    headless: bool,

    /// Ticks a headless run may take before it is abandoned.
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Format of the headless run report.
    #[arg(long, value_enum)]
    summary: Option<SummaryFormat>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        let vsync = if self.vsync {
            Some(true)
        } else if self.no_vsync {
            Some(false)
        } else {
            None
        };

        Overrides {
            track: self.track,
            tolerance: self.tolerance,
            seed: self.seed,
            vsync,
            show_fps: self.show_fps.then_some(true),
            autopilot: self.autopilot.then_some(true),
            headless: self.headless.then_some(true),
            max_ticks: self.max_ticks,
            summary: self.summary,
        }
    }
}

/// Run report of a headless session together with the settings that produced it.
#[derive(Debug, Serialize)]
struct HeadlessSummary<'a> {
    track: &'static str,
    tolerance: f64,
    seed: u64,
    #[serde(flatten)]
    report: &'a RunReport,
    answer_accuracy_bps: Option<u32>,
    checkpoint_completion_bps: u32,
    average_driving_speed: Option<f64>,
}

/// Entry point for the Derivative Dash command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = GameConfig::resolve(file, args.overrides())?;
    log::debug!("resolved configuration: {config:?}");

    let session = Session::new(&config)?;
    if config.headless {
        run_headless(session, &config)
    } else {
        run_windowed(session, &config)
    }
}

fn run_headless(mut session: Session, config: &GameConfig) -> Result<()> {
    let report = session.run_headless(config.max_ticks).clone();
    let track = query::track(session.world());
    let summary = HeadlessSummary {
        track: track.name(),
        tolerance: query::answer_tolerance(session.world()),
        seed: session.seed(),
        report: &report,
        answer_accuracy_bps: answer_accuracy_bps(&report),
        checkpoint_completion_bps: checkpoint_completion_bps(&report, track.checkpoint_count()),
        average_driving_speed: average_driving_speed(&report),
    };

    match config.summary {
        SummaryFormat::Json => {
            let json =
                serde_json::to_string_pretty(&summary).context("failed to encode run report")?;
            println!("{json}");
        }
        SummaryFormat::Text => print_text_summary(&summary),
    }
    Ok(())
}

fn print_text_summary(summary: &HeadlessSummary<'_>) {
    let report = summary.report;
    let outcome = report.outcome.map_or("UNFINISHED", |outcome| outcome.tag());
    println!("{WELCOME_BANNER}: {}", summary.track);
    println!("outcome: {outcome}");
    println!("score: {}", report.score);
    println!(
        "checkpoints: {} ({} bps)",
        report.checkpoints_passed, summary.checkpoint_completion_bps
    );
    println!(
        "answers: {} submitted, {} accepted, {} rejected, {} unparsable, {} cancelled",
        report.answers_submitted,
        report.answers_accepted,
        report.answers_rejected,
        report.answers_unparsable,
        report.answers_cancelled
    );
    if let Some(accuracy) = summary.answer_accuracy_bps {
        println!("accuracy: {accuracy} bps");
    }
    println!("ticks: {} ({:.2}s)", report.ticks, report.elapsed_secs);
    println!("distance: {:.1}", report.distance_travelled);
    println!("top speed: {:.2}", report.top_speed);
    if let Some(speed) = summary.average_driving_speed {
        println!("average speed: {speed:.2}");
    }
    println!("tolerance: {} seed: {}", summary.tolerance, summary.seed);
}

fn run_windowed(session: Session, config: &GameConfig) -> Result<()> {
    let mut app = App::new(session);
    let mut scene = Scene::new(
        Viewport::LOGICAL.width as f32,
        Viewport::LOGICAL.height as f32,
    )?;
    app.present(&mut scene);

    let presentation = Presentation::new(WELCOME_BANNER, palette::BACKGROUND, scene);
    let backend = MacroquadBackend::new()
        .with_vsync(config.vsync)
        .with_show_fps(config.show_fps);

    backend
        .run(presentation, move |frame_dt, input, scene| {
            app.frame(frame_dt, input, scene)
        })
        .context("rendering backend failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_flags_map_onto_tri_state_override() {
        let args = Args::parse_from(["derivative-dash"]);
        assert_eq!(args.overrides().vsync, None);

        let args = Args::parse_from(["derivative-dash", "--no-vsync"]);
        assert_eq!(args.overrides().vsync, Some(false));

        let args = Args::parse_from(["derivative-dash", "--no-vsync", "--vsync"]);
        assert_eq!(args.overrides().vsync, Some(true));
    }

    #[test]
    fn absent_switches_defer_to_config_file() {
        let args = Args::parse_from(["derivative-dash", "--summary", "json", "--track", "0"]);
        let overrides = args.overrides();
        assert_eq!(overrides.autopilot, None);
        assert_eq!(overrides.headless, None);
        assert_eq!(overrides.summary, Some(SummaryFormat::Json));
        assert_eq!(overrides.track, Some(0));
    }

    #[test]
    fn summary_serialises_flat_report() {
        let report = RunReport {
            score: 300,
            checkpoints_passed: 3,
            ..RunReport::default()
        };
        let summary = HeadlessSummary {
            track: "Sinusoid",
            tolerance: 0.5,
            seed: 1,
            report: &report,
            answer_accuracy_bps: None,
            checkpoint_completion_bps: 7_500,
            average_driving_speed: None,
        };
        let value = serde_json::to_value(&summary).expect("serialisable");
        assert_eq!(value["score"], 300);
        assert_eq!(value["checkpoint_completion_bps"], 7_500);
        assert_eq!(value["track"], "Sinusoid");
    }
}
