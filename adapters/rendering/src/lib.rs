#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Derivative Dash adapters.
//!
//! Everything in a [`Scene`] is already projected into screen pixels with the
//! y-axis pointing down. Backends draw what they are given and report what
//! the player pressed; they never see world coordinates.

use anyhow::Result as AnyResult;
use derivative_dash_core::{MessageKind, PlayerAction, RunOutcome};
use glam::Vec2;
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha replaced.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self {
            red: self.red,
            green: self.green,
            blue: self.blue,
            alpha,
        }
    }
}

/// Fixed palette shared by every backend.
pub mod palette {
    use super::Color;

    /// Frame clear color.
    pub const BACKGROUND: Color = Color::from_rgb_u8(14, 18, 32);
    /// Track polyline.
    pub const TRACK: Color = Color::from_rgb_u8(0, 200, 255);
    /// Vehicle body.
    pub const VEHICLE: Color = Color::from_rgb_u8(255, 200, 40);
    /// Vehicle body after a crash.
    pub const VEHICLE_CRASHED: Color = Color::from_rgb_u8(200, 40, 40);
    /// Vehicle trail.
    pub const TRAIL: Color = Color::new(1.0, 0.6, 0.1, 0.5);
    /// Exhaust particles.
    pub const EXHAUST: Color = Color::from_rgb_u8(180, 180, 190);
    /// Crash debris.
    pub const DEBRIS: Color = Color::from_rgb_u8(255, 120, 30);
    /// Regular HUD text.
    pub const TEXT: Color = Color::from_rgb_u8(235, 235, 245);
    /// Secondary HUD text.
    pub const TEXT_DIM: Color = Color::from_rgb_u8(140, 150, 170);
    /// Translucent backing behind overlays.
    pub const PANEL: Color = Color::new(0.0, 0.0, 0.0, 0.7);
}

/// Progress of a checkpoint relative to the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointStatus {
    /// Answered correctly.
    Passed,
    /// The checkpoint the vehicle is heading towards.
    Next,
    /// Further along the track.
    Upcoming,
}

impl CheckpointStatus {
    /// Classifies checkpoint `index` given how many have been passed.
    #[must_use]
    pub const fn classify(index: usize, passed: usize) -> Self {
        if index < passed {
            Self::Passed
        } else if index == passed {
            Self::Next
        } else {
            Self::Upcoming
        }
    }

    /// Marker color for the status.
    #[must_use]
    pub const fn color(self) -> Color {
        match self {
            Self::Passed => Color::from_rgb_u8(60, 220, 120),
            Self::Next => Color::from_rgb_u8(255, 220, 60),
            Self::Upcoming => Color::from_rgb_u8(120, 120, 140),
        }
    }
}

/// Tint used for a transient message of the given kind.
#[must_use]
pub const fn message_tint(kind: MessageKind) -> Color {
    match kind {
        MessageKind::Prompt => Color::from_rgb_u8(255, 220, 60),
        MessageKind::Success => Color::from_rgb_u8(60, 220, 120),
        MessageKind::Failure => Color::from_rgb_u8(240, 70, 70),
        MessageKind::Info => Color::from_rgb_u8(120, 180, 255),
        MessageKind::Victory => Color::from_rgb_u8(255, 215, 0),
    }
}

/// Menu navigation gathered by adapters while the menu is shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuInput {
    /// Move the highlight to the previous entry.
    pub previous: bool,
    /// Move the highlight to the next entry.
    pub next: bool,
    /// Activate the highlighted entry.
    pub confirm: bool,
    /// Leave the menu, which quits the game.
    pub back: bool,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FrameInput {
    /// Gameplay actions in the order they were pressed this frame.
    pub actions: Vec<PlayerAction>,
    /// Menu navigation pressed this frame.
    pub menu: MenuInput,
    /// The player asked to close the game.
    pub quit_requested: bool,
}

/// Instruction returned by the per-frame update closure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Close the window and return from [`RenderingBackend::run`].
    Exit,
}

/// Entries offered by the start menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuEntry {
    /// Begin a run.
    Start,
    /// Close the game.
    Quit,
}

impl MenuEntry {
    /// Entries in display order.
    pub const ALL: [MenuEntry; 2] = [MenuEntry::Start, MenuEntry::Quit];

    /// Label drawn for the entry.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Quit => "Quit",
        }
    }
}

/// Final choice made on the menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuDecision {
    /// Begin a run.
    Start,
    /// Close the game.
    Quit,
}

/// Collaborator that turns menu navigation into a start or quit decision.
pub trait MenuController {
    /// Processes one frame of navigation; returns a decision once one was made.
    fn update(&mut self, input: MenuInput) -> Option<MenuDecision>;

    /// Entry currently highlighted.
    fn selected(&self) -> MenuEntry;
}

/// Keyboard-driven menu with a wrapping highlight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MenuState {
    selected: usize,
}

impl MenuState {
    /// Creates a menu with the first entry highlighted.
    #[must_use]
    pub const fn new() -> Self {
        Self { selected: 0 }
    }
}

impl MenuController for MenuState {
    fn update(&mut self, input: MenuInput) -> Option<MenuDecision> {
        let count = MenuEntry::ALL.len();
        if input.previous {
            self.selected = (self.selected + count - 1) % count;
        }
        if input.next {
            self.selected = (self.selected + 1) % count;
        }
        if input.back {
            return Some(MenuDecision::Quit);
        }
        if !input.confirm {
            return None;
        }
        Some(match self.selected() {
            MenuEntry::Start => MenuDecision::Start,
            MenuEntry::Quit => MenuDecision::Quit,
        })
    }

    fn selected(&self) -> MenuEntry {
        MenuEntry::ALL[self.selected % MenuEntry::ALL.len()]
    }
}

/// Track drawn as a screen-space polyline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrackPresentation {
    /// Polyline vertices from left to right.
    pub points: Vec<Vec2>,
}

/// Checkpoint marker drawn on the track.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CheckpointPresentation {
    /// Screen position of the marker base.
    pub position: Vec2,
    /// World x-coordinate used as the marker label.
    pub world_x: f32,
    /// Progress classification.
    pub status: CheckpointStatus,
}

/// Pose of the vehicle on screen.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VehiclePresentation {
    /// Screen position of the contact point with the track.
    pub position: Vec2,
    /// Inclination in world space, `atan(slope)`, counter-clockwise positive.
    pub tilt: f32,
    /// Whether the vehicle crashed.
    pub crashed: bool,
}

impl VehiclePresentation {
    /// Default body extents in pixels.
    pub const BODY_SIZE: Vec2 = Vec2::new(40.0, 20.0);

    /// Corners of the body resting on the track, rotated by the tilt.
    ///
    /// The order is rear-bottom, front-bottom, front-top, rear-top. Because
    /// screen y points down, the world tilt is applied clockwise on screen.
    #[must_use]
    pub fn body_corners(&self, size: Vec2) -> [Vec2; 4] {
        let rotation = Vec2::from_angle(-self.tilt);
        let half_width = size.x / 2.0;
        [
            Vec2::new(-half_width, 0.0),
            Vec2::new(half_width, 0.0),
            Vec2::new(half_width, -size.y),
            Vec2::new(-half_width, -size.y),
        ]
        .map(|corner| self.position + rotation.rotate(corner))
    }
}

/// Decorative particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticlePresentation {
    /// Screen position.
    pub position: Vec2,
    /// Radius in pixels.
    pub radius: f32,
    /// Fill color, with alpha already faded by remaining life.
    pub color: Color,
}

/// Heads-up display contents.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HudPresentation {
    /// Track name.
    pub track_name: String,
    /// Display formula of the track.
    pub formula: String,
    /// Current score.
    pub score: u32,
    /// Checkpoints answered correctly.
    pub checkpoints_passed: usize,
    /// Checkpoints on the track.
    pub checkpoint_count: usize,
    /// Current vehicle speed.
    pub speed: f32,
    /// Upper speed limit.
    pub max_speed: f32,
}

/// Transient message banner.
#[derive(Clone, Debug, PartialEq)]
pub struct MessagePresentation {
    /// Text to show.
    pub text: String,
    /// Tint derived from the message kind.
    pub color: Color,
}

/// Answer box shown while a checkpoint awaits an answer.
#[derive(Clone, Debug, PartialEq)]
pub struct AnswerPromptPresentation {
    /// Text typed so far.
    pub pending_text: String,
    /// World x-coordinate of the checkpoint being answered.
    pub checkpoint_x: f32,
}

/// Panel shown once the run reached a terminal phase.
#[derive(Clone, Debug, PartialEq)]
pub struct GameOverPresentation {
    /// Terminal outcome.
    pub outcome: RunOutcome,
    /// Headline for the outcome.
    pub title: &'static str,
    /// Final score.
    pub score: u32,
}

impl GameOverPresentation {
    /// Builds the panel for `outcome` with the standard headline.
    #[must_use]
    pub const fn new(outcome: RunOutcome, score: u32) -> Self {
        let title = match outcome {
            RunOutcome::Crashed => "CRASHED!",
            RunOutcome::Victory => "VICTORY!",
            RunOutcome::TrackEnded => "END OF TRACK",
        };
        Self {
            outcome,
            title,
            score,
        }
    }

    /// Headline color.
    #[must_use]
    pub const fn color(&self) -> Color {
        match self.outcome {
            RunOutcome::Crashed | RunOutcome::TrackEnded => message_tint(MessageKind::Failure),
            RunOutcome::Victory => message_tint(MessageKind::Victory),
        }
    }
}

/// Start menu overlay.
#[derive(Clone, Debug, PartialEq)]
pub struct MenuPresentation {
    /// Game title.
    pub title: String,
    /// Formula of the selected track.
    pub subtitle: String,
    /// Entries with the highlighted one flagged.
    pub entries: Vec<(MenuEntry, bool)>,
}

impl MenuPresentation {
    /// Lays out every menu entry, highlighting `selected`.
    #[must_use]
    pub fn new<T, S>(title: T, subtitle: S, selected: MenuEntry) -> Self
    where
        T: Into<String>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            subtitle: subtitle.into(),
            entries: MenuEntry::ALL
                .iter()
                .map(|entry| (*entry, *entry == selected))
                .collect(),
        }
    }
}

/// Scene description combining the track, the vehicle and the overlays.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Logical render target size in pixels.
    pub viewport: Vec2,
    /// Track polyline.
    pub track: TrackPresentation,
    /// Checkpoint markers within view.
    pub checkpoints: Vec<CheckpointPresentation>,
    /// Vehicle pose.
    pub vehicle: VehiclePresentation,
    /// Trail points from oldest to newest.
    pub trail: Vec<Vec2>,
    /// Live particles.
    pub particles: Vec<ParticlePresentation>,
    /// Heads-up display.
    pub hud: HudPresentation,
    /// Transient message, if one is still visible.
    pub message: Option<MessagePresentation>,
    /// Answer box while a checkpoint awaits an answer.
    pub answer_prompt: Option<AnswerPromptPresentation>,
    /// Game-over panel in terminal phases.
    pub game_over: Option<GameOverPresentation>,
    /// Start menu while it is active.
    pub menu: Option<MenuPresentation>,
}

impl Scene {
    /// Creates an empty scene for a render target of `width` by `height` pixels.
    pub fn new(width: f32, height: f32) -> Result<Self, RenderingError> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(RenderingError::InvalidViewport { width, height });
        }

        Ok(Self {
            viewport: Vec2::new(width, height),
            track: TrackPresentation::default(),
            checkpoints: Vec::new(),
            vehicle: VehiclePresentation::default(),
            trail: Vec::new(),
            particles: Vec::new(),
            hud: HudPresentation::default(),
            message: None,
            answer_prompt: None,
            game_over: None,
            menu: None,
        })
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Derivative Dash scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the measured frame delta
    /// and the input captured by the adapter, and rewrites the scene before it
    /// is rendered. Returning [`FrameControl::Exit`] closes the window.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The render target must have a finite, positive size.
    InvalidViewport {
        /// Provided width.
        width: f32,
        /// Provided height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidViewport { width, height } => {
                write!(
                    f,
                    "viewport must be finite and positive (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
