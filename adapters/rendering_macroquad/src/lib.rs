#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Derivative Dash.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature.
//!
//! Scenes are authored against a fixed logical resolution. The adapter
//! letterboxes that logical canvas into whatever window size the platform
//! provides, so every position in the scene is scaled uniformly.

mod overlay;

use anyhow::Result;
use derivative_dash_core::PlayerAction;
use derivative_dash_rendering::{
    palette, Color, FrameControl, FrameInput, MenuInput, ParticlePresentation, Presentation,
    RenderingBackend, Scene, VehiclePresentation,
};
use glam::Vec2;
use macroquad::input::{get_char_pressed, is_key_down, is_key_pressed, KeyCode};
use macroquad::math::Vec2 as MacroquadVec2;
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

const TRACK_THICKNESS: f32 = 3.0;
const CHECKPOINT_POLE_HEIGHT: f32 = 40.0;
const CHECKPOINT_FLAG_RADIUS: f32 = 6.0;
const TRAIL_RADIUS: f32 = 3.0;
const WHEEL_RADIUS: f32 = 5.0;

/// Raw keyboard observations collected during a single frame.
#[doc(hidden)]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyObservations {
    /// Printable characters typed this frame, in order.
    pub typed: Vec<char>,
    /// `Enter` was pressed.
    pub submit: bool,
    /// `Backspace` was pressed.
    pub backspace: bool,
    /// `Escape` was pressed.
    pub escape: bool,
    /// `R` was pressed.
    pub restart: bool,
    /// `Q` was pressed.
    pub quit: bool,
    /// `Right` or `Up` is held.
    pub accelerate_held: bool,
    /// `Left` or `Down` is held.
    pub decelerate_held: bool,
    /// `Up` was pressed this frame.
    pub menu_previous: bool,
    /// `Down` was pressed this frame.
    pub menu_next: bool,
}

impl KeyObservations {
    fn poll() -> Self {
        let mut typed = Vec::new();
        while let Some(character) = get_char_pressed() {
            typed.push(character);
        }

        Self {
            typed,
            submit: is_key_pressed(KeyCode::Enter) || is_key_pressed(KeyCode::KpEnter),
            backspace: is_key_pressed(KeyCode::Backspace),
            escape: is_key_pressed(KeyCode::Escape),
            restart: is_key_pressed(KeyCode::R),
            quit: is_key_pressed(KeyCode::Q),
            accelerate_held: is_key_down(KeyCode::Right) || is_key_down(KeyCode::Up),
            decelerate_held: is_key_down(KeyCode::Left) || is_key_down(KeyCode::Down),
            menu_previous: is_key_pressed(KeyCode::Up),
            menu_next: is_key_pressed(KeyCode::Down),
        }
    }
}

/// Translates raw key observations into the adapter-neutral frame input.
///
/// `Q` only quits while no answer box is open, so it can never interrupt
/// typing. Control characters reported alongside `Enter` or `Backspace` are
/// dropped because those keys are already mapped to dedicated actions.
#[doc(hidden)]
#[must_use]
pub fn frame_input_from_observations(observations: &KeyObservations, answering: bool) -> FrameInput {
    let mut actions: Vec<PlayerAction> = observations
        .typed
        .iter()
        .filter(|character| !character.is_control())
        .map(|character| PlayerAction::Character(*character))
        .collect();

    let keyed = [
        (observations.backspace, PlayerAction::Backspace),
        (observations.submit, PlayerAction::Submit),
        (observations.escape, PlayerAction::Cancel),
        (observations.restart, PlayerAction::Restart),
        (observations.accelerate_held, PlayerAction::Accelerate),
        (observations.decelerate_held, PlayerAction::Decelerate),
    ];
    actions.extend(
        keyed
            .into_iter()
            .filter(|(active, _)| *active)
            .map(|(_, action)| action),
    );

    FrameInput {
        actions,
        menu: MenuInput {
            previous: observations.menu_previous,
            next: observations.menu_next,
            confirm: observations.submit,
            back: observations.escape,
        },
        quit_requested: observations.quit && !answering,
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let per_second = self.frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) -> FrameControl + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: scene.viewport.x.round() as i32,
            window_height: scene.viewport.y.round() as i32,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let observations = KeyObservations::poll();
                let frame_input =
                    frame_input_from_observations(&observations, scene.answer_prompt.is_some());

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let simulation_start = Instant::now();
                let control = update_scene(frame_dt, frame_input, &mut scene);
                let simulation = simulation_start.elapsed();
                if control == FrameControl::Exit {
                    break;
                }

                macroquad::window::clear_background(background);
                let metrics = SceneMetrics::fit(
                    scene.viewport,
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );

                let render_start = Instant::now();
                draw_scene(&scene, &metrics);
                let render = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation,
                    render,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_render,
                    }) = fps_metrics
                    {
                        log::info!(
                            "FPS: {:.2} (10s avg: {:.2}) | sim: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            trailing_ten_seconds,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Uniform scale and letterbox offset mapping logical pixels to the window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct SceneMetrics {
    scale: f32,
    offset: Vec2,
    logical: Vec2,
}

impl SceneMetrics {
    fn fit(logical: Vec2, screen_width: f32, screen_height: f32) -> Self {
        let scale = (screen_width / logical.x)
            .min(screen_height / logical.y)
            .max(0.0);
        let offset = Vec2::new(
            (screen_width - logical.x * scale) / 2.0,
            (screen_height - logical.y * scale) / 2.0,
        );
        Self {
            scale,
            offset,
            logical,
        }
    }

    fn project(&self, point: Vec2) -> Vec2 {
        self.offset + point * self.scale
    }

    pub(crate) fn to_screen(&self, point: Vec2) -> MacroquadVec2 {
        let projected = self.project(point);
        MacroquadVec2::new(projected.x, projected.y)
    }

    pub(crate) fn length(&self, logical_length: f32) -> f32 {
        logical_length * self.scale
    }

    pub(crate) fn logical_size(&self) -> Vec2 {
        self.logical
    }
}

fn draw_scene(scene: &Scene, metrics: &SceneMetrics) {
    draw_track(&scene.track.points, metrics);
    draw_checkpoints(scene, metrics);
    draw_trail(&scene.trail, metrics);
    draw_particles(&scene.particles, metrics);
    draw_vehicle(&scene.vehicle, metrics);

    overlay::draw_hud(&scene.hud, metrics);
    if let Some(message) = &scene.message {
        overlay::draw_message(message, metrics);
    }
    if let Some(prompt) = &scene.answer_prompt {
        overlay::draw_answer_prompt(prompt, metrics);
    }
    if let Some(game_over) = &scene.game_over {
        overlay::draw_game_over(game_over, metrics);
    }
    if let Some(menu) = &scene.menu {
        overlay::draw_menu(menu, metrics);
    }
}

fn draw_track(points: &[Vec2], metrics: &SceneMetrics) {
    let color = to_macroquad_color(palette::TRACK);
    let thickness = metrics.length(TRACK_THICKNESS);
    for segment in points.windows(2) {
        let start = metrics.to_screen(segment[0]);
        let end = metrics.to_screen(segment[1]);
        macroquad::shapes::draw_line(start.x, start.y, end.x, end.y, thickness, color);
    }
}

fn draw_checkpoints(scene: &Scene, metrics: &SceneMetrics) {
    for checkpoint in &scene.checkpoints {
        let color = to_macroquad_color(checkpoint.status.color());
        let base = metrics.to_screen(checkpoint.position);
        let top = metrics.to_screen(checkpoint.position - Vec2::new(0.0, CHECKPOINT_POLE_HEIGHT));
        macroquad::shapes::draw_line(base.x, base.y, top.x, top.y, metrics.length(2.0), color);
        macroquad::shapes::draw_circle(
            top.x,
            top.y,
            metrics.length(CHECKPOINT_FLAG_RADIUS),
            color,
        );
        draw_label(
            &format!("x={:.0}", checkpoint.world_x),
            metrics.to_screen(checkpoint.position + Vec2::new(-18.0, 22.0)),
            metrics.length(16.0),
            checkpoint.status.color(),
        );
    }
}

fn trail_alpha(index: usize, len: usize) -> f32 {
    if len == 0 {
        return 0.0;
    }
    palette::TRAIL.alpha * (index + 1) as f32 / len as f32
}

fn draw_trail(trail: &[Vec2], metrics: &SceneMetrics) {
    for (index, point) in trail.iter().enumerate() {
        let color = palette::TRAIL.with_alpha(trail_alpha(index, trail.len()));
        let center = metrics.to_screen(*point);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            metrics.length(TRAIL_RADIUS),
            to_macroquad_color(color),
        );
    }
}

fn draw_particles(particles: &[ParticlePresentation], metrics: &SceneMetrics) {
    for particle in particles {
        let center = metrics.to_screen(particle.position);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            metrics.length(particle.radius),
            to_macroquad_color(particle.color),
        );
    }
}

fn draw_vehicle(vehicle: &VehiclePresentation, metrics: &SceneMetrics) {
    let body_color = if vehicle.crashed {
        palette::VEHICLE_CRASHED
    } else {
        palette::VEHICLE
    };
    let body_color = to_macroquad_color(body_color);
    let [rear, front, front_top, rear_top] = vehicle
        .body_corners(VehiclePresentation::BODY_SIZE)
        .map(|corner| metrics.to_screen(corner));

    macroquad::shapes::draw_triangle(rear, front, front_top, body_color);
    macroquad::shapes::draw_triangle(rear, front_top, rear_top, body_color);

    let wheel_color = to_macroquad_color(palette::TEXT_DIM);
    for wheel in [rear, front] {
        macroquad::shapes::draw_circle(wheel.x, wheel.y, metrics.length(WHEEL_RADIUS), wheel_color);
    }
}

/// Draws `text` with its baseline starting at `baseline`.
pub(crate) fn draw_label(text: &str, baseline: MacroquadVec2, font_size: f32, color: Color) {
    let _ = macroquad::text::draw_text(
        text,
        baseline.x,
        baseline.y,
        font_size,
        to_macroquad_color(color),
    );
}

/// Width in window pixels that `text` occupies at `font_size`.
pub(crate) fn label_width(text: &str, font_size: f32) -> f32 {
    macroquad::text::measure_text(text, None, font_size.max(1.0).round() as u16, 1.0).width
}

/// Fills a logical rectangle.
pub(crate) fn draw_panel(top_left: Vec2, size: Vec2, color: Color, metrics: &SceneMetrics) {
    let origin = metrics.to_screen(top_left);
    macroquad::shapes::draw_rectangle(
        origin.x,
        origin.y,
        metrics.length(size.x),
        metrics.length(size.y),
        to_macroquad_color(color),
    );
}

pub(crate) fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
