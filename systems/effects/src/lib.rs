#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Decorative trail and particle effects derived from world events.
//!
//! The system only listens. It never emits commands, so nothing it does can
//! influence the run.

use std::collections::VecDeque;

use derivative_dash_core::{Event, WorldPoint, MAX_SPEED};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Number of trail points retained behind the vehicle.
pub const TRAIL_LENGTH: usize = 15;

const TRAIL_SUBDIVISIONS: u32 = 3;
const TRAIL_MIN_SPEED: f64 = 0.5;
const EXHAUST_RATE: f64 = 0.3;
const EXHAUST_OFFSET: f64 = 5.0;
const CRASH_PARTICLES: usize = 20;
const CRASH_SPREAD: f64 = 10.0;
const LIFE_DECAY: f64 = 0.05;
const SIZE_DECAY: f64 = 0.95;
const MIN_PARTICLE_SIZE: f64 = 0.5;

/// Origin of a particle, used by renderers to pick a colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleKind {
    /// Puff emitted behind a moving vehicle.
    Exhaust,
    /// Fragment thrown out by a crash.
    Debris,
}

/// Short-lived decorative particle in world coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current position.
    pub position: WorldPoint,
    /// Displacement applied every tick.
    pub velocity: (f64, f64),
    /// Radius in pixels.
    pub size: f64,
    /// Remaining life; the particle disappears once this reaches zero.
    pub life: f64,
    /// What spawned the particle.
    pub kind: ParticleKind,
}

impl Particle {
    fn age(&mut self) {
        self.position.x += self.velocity.0;
        self.position.y += self.velocity.1;
        self.life -= LIFE_DECAY;
        self.size *= SIZE_DECAY;
    }

    fn is_alive(&self) -> bool {
        self.life > 0.0 && self.size >= MIN_PARTICLE_SIZE
    }
}

/// Event-driven effects system owning the trail and the particle pool.
#[derive(Clone, Debug)]
pub struct VisualEffects {
    rng: ChaCha8Rng,
    trail: VecDeque<WorldPoint>,
    particles: Vec<Particle>,
}

impl VisualEffects {
    /// Creates an empty effects system whose randomness is derived from `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            trail: VecDeque::with_capacity(TRAIL_LENGTH),
            particles: Vec::new(),
        }
    }

    /// Trail points ordered from oldest to newest.
    pub fn trail(&self) -> impl Iterator<Item = &WorldPoint> {
        self.trail.iter()
    }

    /// Particles that are currently alive.
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Updates the effects from the events produced by the latest world step.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { .. } => self.age_particles(),
                Event::VehicleMoved { from, to, speed } => {
                    if *speed > TRAIL_MIN_SPEED {
                        self.extend_trail(*from, *to);
                    }
                    self.maybe_emit_exhaust(*to, *speed);
                }
                Event::VehicleCrashed { position } => self.burst(*position),
                Event::RunReset => {
                    self.trail.clear();
                    self.particles.clear();
                }
                _ => {}
            }
        }
    }

    fn age_particles(&mut self) {
        for particle in &mut self.particles {
            particle.age();
        }
        self.particles.retain(Particle::is_alive);
    }

    fn extend_trail(&mut self, from: WorldPoint, to: WorldPoint) {
        for step in 1..=TRAIL_SUBDIVISIONS {
            let t = f64::from(step) / f64::from(TRAIL_SUBDIVISIONS);
            self.trail.push_back(from.lerp(to, t));
        }
        while self.trail.len() > TRAIL_LENGTH {
            let _ = self.trail.pop_front();
        }
    }

    fn maybe_emit_exhaust(&mut self, at: WorldPoint, speed: f64) {
        let probability = (EXHAUST_RATE * speed / MAX_SPEED).clamp(0.0, 1.0);
        if !self.rng.gen_bool(probability) {
            return;
        }

        let particle = Particle {
            position: WorldPoint::new(at.x - EXHAUST_OFFSET, at.y),
            velocity: (
                -self.rng.gen_range(0.5..1.0) * speed,
                self.rng.gen_range(-0.5..0.5),
            ),
            size: self.rng.gen_range(2.0..4.0),
            life: self.rng.gen_range(0.5..1.5),
            kind: ParticleKind::Exhaust,
        };
        self.particles.push(particle);
    }

    fn burst(&mut self, at: WorldPoint) {
        for _ in 0..CRASH_PARTICLES {
            let particle = Particle {
                position: WorldPoint::new(
                    at.x + self.rng.gen_range(-CRASH_SPREAD..CRASH_SPREAD),
                    at.y + self.rng.gen_range(-CRASH_SPREAD..CRASH_SPREAD),
                ),
                velocity: (self.rng.gen_range(-2.0..2.0), self.rng.gen_range(-2.0..2.0)),
                size: self.rng.gen_range(3.0..7.0),
                life: self.rng.gen_range(1.0..2.0),
                kind: ParticleKind::Debris,
            };
            self.particles.push(particle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slow_moves_leave_no_trail() {
        let mut effects = VisualEffects::new(1);
        effects.handle(&[Event::VehicleMoved {
            from: WorldPoint::new(0.0, 0.0),
            to: WorldPoint::new(0.4, 0.0),
            speed: 0.4,
        }]);
        assert_eq!(effects.trail().count(), 0);
    }

    #[test]
    fn particles_die_when_life_runs_out() {
        let mut particle = Particle {
            position: WorldPoint::default(),
            velocity: (1.0, -1.0),
            size: 10.0,
            life: 0.08,
            kind: ParticleKind::Exhaust,
        };
        particle.age();
        assert!(particle.is_alive());
        assert_eq!(particle.position, WorldPoint::new(1.0, -1.0));
        particle.age();
        assert!(!particle.is_alive());
    }

    #[test]
    fn particles_die_when_shrunk_below_minimum() {
        let mut particle = Particle {
            position: WorldPoint::default(),
            velocity: (0.0, 0.0),
            size: 0.52,
            life: 10.0,
            kind: ParticleKind::Debris,
        };
        particle.age();
        assert!(!particle.is_alive());
    }
}
