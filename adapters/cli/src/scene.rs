//! Projects the world and its decorative effects into the renderer's scene.

use derivative_dash_core::{Camera, Phase, TrackCurve, WorldPoint};
use derivative_dash_rendering::{
    message_tint, palette, AnswerPromptPresentation, CheckpointPresentation, CheckpointStatus,
    Color, GameOverPresentation, HudPresentation, MenuPresentation, MessagePresentation,
    ParticlePresentation, Scene, VehiclePresentation,
};
use derivative_dash_system_effects::{Particle, ParticleKind, VisualEffects};
use derivative_dash_world::{query, World};
use glam::Vec2;

const TRACK_SAMPLE_STEP: f64 = 5.0;
/// Checkpoint markers just outside the view are kept so poles slide in smoothly.
const CHECKPOINT_VIEW_MARGIN: f64 = 50.0;

/// Rewrites `scene` to show the current state of `world`.
pub(crate) fn populate(
    scene: &mut Scene,
    world: &World,
    effects: &VisualEffects,
    menu: Option<MenuPresentation>,
) {
    let camera = query::camera(world);
    let track = query::track(world);
    let vehicle = query::vehicle(world);

    sample_track(track, &camera, &mut scene.track.points);
    project_checkpoints(track, &camera, query::checkpoints_passed(world), scene);

    scene.vehicle = VehiclePresentation {
        position: project(&camera, vehicle.position),
        tilt: track.slope(vehicle.position.x).atan() as f32,
        crashed: vehicle.crashed,
    };

    scene.trail.clear();
    scene
        .trail
        .extend(effects.trail().map(|point| project(&camera, *point)));

    scene.particles.clear();
    scene
        .particles
        .extend(effects.particles().iter().map(|particle| ParticlePresentation {
            position: project(&camera, particle.position),
            radius: particle.size as f32,
            color: particle_color(particle),
        }));

    scene.hud = HudPresentation {
        track_name: track.name().to_owned(),
        formula: track.formula_label().to_owned(),
        score: query::score(world),
        checkpoints_passed: query::checkpoints_passed(world),
        checkpoint_count: track.checkpoint_count(),
        speed: vehicle.speed as f32,
        max_speed: vehicle.max_speed as f32,
    };

    scene.message = query::visible_message(world).map(|message| MessagePresentation {
        text: message.text.clone(),
        color: message_tint(message.kind),
    });

    scene.answer_prompt = (query::phase(world) == Phase::AwaitingAnswer).then(|| {
        let checkpoint_x = query::next_checkpoint(world)
            .map_or(vehicle.position.x, |(_, position)| position);
        AnswerPromptPresentation {
            pending_text: query::pending_input(world).to_owned(),
            checkpoint_x: checkpoint_x as f32,
        }
    });

    scene.game_over = query::outcome(world)
        .map(|outcome| GameOverPresentation::new(outcome, query::score(world)));
    scene.menu = menu;
}

fn project(camera: &Camera, point: WorldPoint) -> Vec2 {
    let (x, y) = camera.project(point);
    Vec2::new(x as f32, y as f32)
}

/// Samples the visible part of the track every few world units, always
/// including both ends of the sampled range.
fn sample_track(track: &TrackCurve, camera: &Camera, points: &mut Vec<Vec2>) {
    points.clear();
    let (x_min, x_max) = track.domain();
    let (left, right) = camera.visible_span();
    let start = left.max(x_min);
    let end = right.min(x_max);
    if start > end {
        return;
    }

    let samples = ((end - start) / TRACK_SAMPLE_STEP).floor() as usize;
    let mut last_x = start;
    for step in 0..=samples {
        last_x = start + step as f64 * TRACK_SAMPLE_STEP;
        points.push(project(camera, WorldPoint::new(last_x, track.height(last_x))));
    }
    if last_x < end {
        points.push(project(camera, WorldPoint::new(end, track.height(end))));
    }
}

fn project_checkpoints(track: &TrackCurve, camera: &Camera, passed: usize, scene: &mut Scene) {
    let (left, right) = camera.visible_span();
    scene.checkpoints.clear();
    scene.checkpoints.extend(
        track
            .checkpoint_positions()
            .iter()
            .enumerate()
            .filter(|(_, x)| {
                **x >= left - CHECKPOINT_VIEW_MARGIN && **x <= right + CHECKPOINT_VIEW_MARGIN
            })
            .map(|(index, x)| CheckpointPresentation {
                position: project(camera, WorldPoint::new(*x, track.height(*x))),
                world_x: *x as f32,
                status: CheckpointStatus::classify(index, passed),
            }),
    );
}

fn particle_color(particle: &Particle) -> Color {
    let base = match particle.kind {
        ParticleKind::Exhaust => palette::EXHAUST,
        ParticleKind::Debris => palette::DEBRIS,
    };
    base.with_alpha(particle.life.clamp(0.0, 1.0) as f32)
}
