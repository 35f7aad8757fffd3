//! Kinematic state of the car riding the track.

use derivative_dash_core::{
    TrackCurve, VehicleSnapshot, WorldPoint, MAX_SPEED, MIN_SPEED, START_OFFSET, START_SPEED,
};

/// Car glued to the track surface.
///
/// While parked at a checkpoint or after a crash the vehicle ignores
/// movement and speed requests, so a misbehaving caller cannot nudge it off
/// a checkpoint or revive it.
#[derive(Clone, Debug)]
pub(crate) struct Vehicle {
    position: WorldPoint,
    speed: f64,
    max_speed: f64,
    crashed: bool,
    waiting: bool,
}

impl Vehicle {
    /// Places a fresh vehicle just past the start of the track.
    pub(crate) fn spawn(track: &TrackCurve) -> Self {
        let (x_min, _) = track.domain();
        let x = x_min + START_OFFSET;
        Self {
            position: WorldPoint::new(x, track.height(x)),
            speed: START_SPEED,
            max_speed: MAX_SPEED,
            crashed: false,
            waiting: false,
        }
    }

    pub(crate) const fn position(&self) -> WorldPoint {
        self.position
    }

    pub(crate) const fn speed(&self) -> f64 {
        self.speed
    }

    /// Moves the vehicle forward by `speed * dt_ticks` and snaps it onto the
    /// track. Returns `true` when the vehicle actually moved.
    pub(crate) fn advance(&mut self, dt_ticks: f64, track: &TrackCurve) -> bool {
        if self.crashed || self.waiting {
            return false;
        }

        let distance = self.speed * dt_ticks;
        if distance <= 0.0 {
            return false;
        }

        let x = self.position.x + distance;
        self.position = WorldPoint::new(x, track.height(x));
        true
    }

    pub(crate) fn crash(&mut self) {
        self.crashed = true;
        self.speed = 0.0;
    }

    /// Raises the speed by `delta`; returns `true` when the speed changed.
    pub(crate) fn accelerate(&mut self, delta: f64) -> bool {
        self.retarget_speed(self.speed + delta)
    }

    /// Lowers the speed by `delta`; returns `true` when the speed changed.
    pub(crate) fn decelerate(&mut self, delta: f64) -> bool {
        self.retarget_speed(self.speed - delta)
    }

    fn retarget_speed(&mut self, requested: f64) -> bool {
        if self.crashed || self.waiting {
            return false;
        }

        let clamped = requested.clamp(MIN_SPEED, self.max_speed);
        if clamped == self.speed {
            return false;
        }
        self.speed = clamped;
        true
    }

    /// Stops the vehicle at a checkpoint until [`Vehicle::release`] is called.
    pub(crate) fn park(&mut self) {
        self.waiting = true;
        self.speed = 0.0;
    }

    pub(crate) fn release(&mut self, speed: f64) {
        if self.crashed {
            return;
        }
        self.waiting = false;
        self.speed = speed.clamp(MIN_SPEED, self.max_speed);
    }

    /// Pins the vehicle at `x` with zero speed once the run is over.
    pub(crate) fn stop_at(&mut self, x: f64, track: &TrackCurve) {
        self.position = WorldPoint::new(x, track.height(x));
        self.speed = 0.0;
        self.waiting = false;
    }

    pub(crate) fn snapshot(&self) -> VehicleSnapshot {
        VehicleSnapshot {
            position: self.position,
            speed: self.speed,
            max_speed: self.max_speed,
            crashed: self.crashed,
            waiting: self.waiting,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use derivative_dash_core::TRACKS;

    fn track() -> TrackCurve {
        TrackCurve::from_descriptor(TRACKS[0]).expect("valid track")
    }

    #[test]
    fn spawn_places_vehicle_on_track_surface() {
        let track = track();
        let vehicle = Vehicle::spawn(&track);
        assert_eq!(vehicle.position().x, 50.0);
        assert!((vehicle.position().y - track.height(50.0)).abs() < 1e-12);
        assert_eq!(vehicle.speed(), START_SPEED);
    }

    #[test]
    fn advance_follows_height_function() {
        let track = track();
        let mut vehicle = Vehicle::spawn(&track);
        assert!(vehicle.advance(1.5, &track));
        assert!((vehicle.position().x - 53.0).abs() < 1e-12);
        assert!((vehicle.position().y - track.height(53.0)).abs() < 1e-12);
    }

    #[test]
    fn speed_is_clamped_into_bounds() {
        let track = track();
        let mut vehicle = Vehicle::spawn(&track);
        assert!(vehicle.accelerate(100.0));
        assert_eq!(vehicle.speed(), MAX_SPEED);
        assert!(!vehicle.accelerate(0.1));
        assert!(vehicle.decelerate(100.0));
        assert_eq!(vehicle.speed(), MIN_SPEED);
        assert!(!vehicle.decelerate(0.1));
    }

    #[test]
    fn parked_vehicle_ignores_motion_and_speed_requests() {
        let track = track();
        let mut vehicle = Vehicle::spawn(&track);
        vehicle.park();
        let before = vehicle.position();
        assert!(!vehicle.advance(10.0, &track));
        assert!(!vehicle.accelerate(1.0));
        assert_eq!(vehicle.position(), before);
        assert_eq!(vehicle.speed(), 0.0);

        vehicle.release(START_SPEED);
        assert!(!vehicle.snapshot().waiting);
        assert_eq!(vehicle.speed(), START_SPEED);
    }

    #[test]
    fn crash_is_idempotent_and_final() {
        let track = track();
        let mut vehicle = Vehicle::spawn(&track);
        vehicle.crash();
        vehicle.crash();
        vehicle.release(START_SPEED);
        assert!(vehicle.snapshot().crashed);
        assert_eq!(vehicle.speed(), 0.0);
        assert!(!vehicle.advance(1.0, &track));
    }
}
