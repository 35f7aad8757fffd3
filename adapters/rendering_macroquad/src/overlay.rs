//! Text overlays drawn on top of the track.
//!
//! Layout is expressed in logical pixels and converted through
//! [`SceneMetrics`], so overlays scale together with the rest of the scene.

use derivative_dash_rendering::{
    palette, AnswerPromptPresentation, Color, GameOverPresentation, HudPresentation,
    MenuPresentation, MessagePresentation,
};
use glam::Vec2;

use crate::{draw_label, draw_panel, label_width, SceneMetrics};

const HUD_ORIGIN: Vec2 = Vec2::new(20.0, 32.0);
const HUD_LINE_HEIGHT: f32 = 26.0;
const HUD_FONT: f32 = 22.0;
const MESSAGE_FONT: f32 = 30.0;
const TITLE_FONT: f32 = 64.0;
const BODY_FONT: f32 = 26.0;
const HINT_FONT: f32 = 20.0;

pub(crate) fn draw_hud(hud: &HudPresentation, metrics: &SceneMetrics) {
    let lines = [
        (format!("{}: {}", hud.track_name, hud.formula), palette::TEXT),
        (format!("Score: {}", hud.score), palette::TEXT),
        (
            format!(
                "Checkpoints: {}/{}",
                hud.checkpoints_passed, hud.checkpoint_count
            ),
            palette::TEXT,
        ),
        (
            format!("Speed: {:.1} / {:.1}", hud.speed, hud.max_speed),
            palette::TEXT_DIM,
        ),
    ];

    for (row, (text, color)) in lines.iter().enumerate() {
        let baseline = HUD_ORIGIN + Vec2::new(0.0, row as f32 * HUD_LINE_HEIGHT);
        draw_label(
            text,
            metrics.to_screen(baseline),
            metrics.length(HUD_FONT),
            *color,
        );
    }
}

pub(crate) fn draw_message(message: &MessagePresentation, metrics: &SceneMetrics) {
    let size = metrics.logical_size();
    draw_panel(
        Vec2::new(size.x * 0.2, 140.0),
        Vec2::new(size.x * 0.6, 44.0),
        palette::PANEL,
        metrics,
    );
    draw_centered(&message.text, 172.0, MESSAGE_FONT, message.color, metrics);
}

pub(crate) fn draw_answer_prompt(prompt: &AnswerPromptPresentation, metrics: &SceneMetrics) {
    let size = metrics.logical_size();
    let panel_size = Vec2::new(420.0, 130.0);
    let top_left = Vec2::new((size.x - panel_size.x) / 2.0, size.y - panel_size.y - 30.0);
    draw_panel(top_left, panel_size, palette::PANEL, metrics);

    let question = format!("Slope at x ~ {:.0}:", prompt.checkpoint_x);
    draw_centered(&question, top_left.y + 32.0, BODY_FONT, palette::TEXT, metrics);

    let field_size = Vec2::new(260.0, 36.0);
    let field_origin = Vec2::new((size.x - field_size.x) / 2.0, top_left.y + 46.0);
    draw_panel(
        field_origin,
        field_size,
        Color::from_rgb_u8(30, 36, 56),
        metrics,
    );
    let typed = format!("{}_", prompt.pending_text);
    draw_centered(&typed, field_origin.y + 27.0, BODY_FONT, palette::TEXT, metrics);

    draw_centered(
        "Enter to submit, Esc to cancel",
        top_left.y + panel_size.y - 12.0,
        HINT_FONT,
        palette::TEXT_DIM,
        metrics,
    );
}

pub(crate) fn draw_game_over(panel: &GameOverPresentation, metrics: &SceneMetrics) {
    let size = metrics.logical_size();
    draw_panel(Vec2::ZERO, size, palette::PANEL, metrics);
    draw_centered(panel.title, size.y * 0.4, TITLE_FONT, panel.color(), metrics);
    draw_centered(
        &format!("Final score: {}", panel.score),
        size.y * 0.4 + 50.0,
        BODY_FONT,
        palette::TEXT,
        metrics,
    );
    draw_centered(
        "R to restart, Esc for menu",
        size.y * 0.4 + 90.0,
        HINT_FONT,
        palette::TEXT_DIM,
        metrics,
    );
}

pub(crate) fn draw_menu(menu: &MenuPresentation, metrics: &SceneMetrics) {
    let size = metrics.logical_size();
    draw_panel(Vec2::ZERO, size, palette::BACKGROUND.with_alpha(0.92), metrics);
    draw_centered(&menu.title, size.y * 0.3, TITLE_FONT, palette::TRACK, metrics);
    draw_centered(
        &menu.subtitle,
        size.y * 0.3 + 44.0,
        BODY_FONT,
        palette::TEXT_DIM,
        metrics,
    );

    for (row, (entry, selected)) in menu.entries.iter().enumerate() {
        let (label, color) = if *selected {
            (format!("> {} <", entry.label()), palette::VEHICLE)
        } else {
            (entry.label().to_owned(), palette::TEXT)
        };
        let baseline = size.y * 0.55 + row as f32 * 48.0;
        draw_centered(&label, baseline, BODY_FONT + 6.0, color, metrics);
    }

    draw_centered(
        "Up/Down to choose, Enter to confirm",
        size.y - 40.0,
        HINT_FONT,
        palette::TEXT_DIM,
        metrics,
    );
}

fn draw_centered(text: &str, baseline_y: f32, font: f32, color: Color, metrics: &SceneMetrics) {
    let font_size = metrics.length(font);
    let width = label_width(text, font_size);
    let center = metrics.to_screen(Vec2::new(metrics.logical_size().x / 2.0, baseline_y));
    let mut baseline = center;
    baseline.x -= width / 2.0;
    draw_label(text, baseline, font_size, color);
}
