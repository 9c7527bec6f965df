//! Rotating actuators (flippers)
//!
//! A flipper eases its angle toward a target every tick. Changing the input
//! (press or release) opens a short active window in which bodies touching
//! the flipper receive a tangential impulse proportional to the surface
//! velocity at their contact radius. Release strokes hit too, with a lower
//! speed threshold and a boost, unless the flipper was cradling a resting
//! body when it was released.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, BodyRegistry, Capabilities};
use super::state::PhysicsEvent;
use super::timer::{CooldownMap, Countdown, Stopwatch};
use crate::consts::*;
use crate::{normalize_angle, polar_to_cartesian, sign};

/// Stable flipper handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ActuatorId(pub u32);

/// Discrete input for a flipper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActuatorCommand {
    Activate,
    Deactivate,
}

/// Contact region in flipper-local space (pivot at origin, +x along the arm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ContactShape {
    /// Segment from the pivot to `length` along the arm, inflated by `radius`
    Capsule { length: f32, radius: f32 },
    Circle { radius: f32 },
}

impl Default for ContactShape {
    fn default() -> Self {
        ContactShape::Capsule {
            length: 96.0,
            radius: 12.0,
        }
    }
}

impl ContactShape {
    /// Distance from the pivot to the far end of the shape
    pub fn reach(&self) -> f32 {
        match *self {
            ContactShape::Capsule { length, radius } => length + radius,
            ContactShape::Circle { radius } => radius,
        }
    }

    /// Signed distance from a local-space point to the shape surface
    pub fn distance(&self, local: Vec2) -> f32 {
        match *self {
            ContactShape::Capsule { length, radius } => {
                let along = local.x.clamp(0.0, length.max(0.0));
                (local - Vec2::new(along, 0.0)).length() - radius
            }
            ContactShape::Circle { radius } => local.length() - radius,
        }
    }
}

/// Feel constants shared by every flipper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FlipperTuning {
    /// Fraction of the remaining angle covered per second (eased approach)
    pub rotation_speed: f32,
    pub active_window: f32,
    pub hit_cooldown: f32,
    pub cradle_threshold: f32,
    pub rest_speed: f32,
    pub settle_tolerance: f32,
    pub settle_speed: f32,
    pub press_hit_speed: f32,
    pub release_hit_speed: f32,
    pub release_boost: f32,
    /// Velocity change at unit scale
    pub base_force: f32,
    /// Surface-velocity to impulse scale (the `k` in the impulse formula)
    pub surface_velocity_scale: f32,
    pub min_impulse_factor: f32,
    pub max_impulse_factor: f32,
}

impl Default for FlipperTuning {
    fn default() -> Self {
        Self {
            rotation_speed: 20.0,
            active_window: FLIPPER_ACTIVE_WINDOW,
            hit_cooldown: FLIPPER_HIT_COOLDOWN,
            cradle_threshold: FLIPPER_CRADLE_THRESHOLD,
            rest_speed: FLIPPER_REST_SPEED,
            settle_tolerance: FLIPPER_SETTLE_TOLERANCE,
            settle_speed: FLIPPER_SETTLE_SPEED,
            press_hit_speed: FLIPPER_PRESS_HIT_SPEED,
            release_hit_speed: FLIPPER_RELEASE_HIT_SPEED,
            release_boost: FLIPPER_RELEASE_BOOST,
            base_force: 120.0,
            surface_velocity_scale: 0.002,
            min_impulse_factor: 0.5,
            max_impulse_factor: 3.0,
        }
    }
}

/// Placement of a single flipper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlipperConfig {
    pub pivot: Vec2,
    pub rest_angle: f32,
    pub extended_angle: f32,
    /// Contact region; a default capsule is used when missing
    pub contact_shape: Option<ContactShape>,
}

/// Render-facing view of a flipper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipperSnapshot {
    pub id: ActuatorId,
    pub pivot: Vec2,
    /// Current angle normalized to [-π, π)
    pub angle: f32,
    pub tip: Vec2,
    pub angular_velocity: f32,
    pub active: bool,
}

/// A rotating actuator
#[derive(Debug, Clone)]
pub struct Flipper {
    pub id: ActuatorId,
    pivot: Vec2,
    rest_angle: f32,
    extended_angle: f32,
    current_angle: f32,
    target_angle: f32,
    angular_velocity: f32,
    active_window: Countdown,
    last_input_was_press: bool,
    settled: Stopwatch,
    was_cradling: bool,
    hit_cooldowns: CooldownMap<BodyId>,
    shape: ContactShape,
    tuning: FlipperTuning,
}

impl Flipper {
    pub fn new(id: ActuatorId, config: &FlipperConfig, tuning: FlipperTuning) -> Self {
        let shape = match config.contact_shape {
            Some(shape) => shape,
            None => {
                let fallback = ContactShape::default();
                log::warn!(
                    "Flipper {:?} has no contact shape, falling back to {:?}",
                    id,
                    fallback
                );
                fallback
            }
        };

        Self {
            id,
            pivot: config.pivot,
            rest_angle: config.rest_angle,
            extended_angle: config.extended_angle,
            current_angle: config.rest_angle,
            target_angle: config.rest_angle,
            angular_velocity: 0.0,
            active_window: Countdown::EXPIRED,
            last_input_was_press: false,
            settled: Stopwatch::default(),
            was_cradling: false,
            hit_cooldowns: CooldownMap::new(),
            shape,
            tuning,
        }
    }

    pub fn pivot(&self) -> Vec2 {
        self.pivot
    }

    pub fn shape(&self) -> ContactShape {
        self.shape
    }

    pub fn current_angle(&self) -> f32 {
        self.current_angle
    }

    pub fn target_angle(&self) -> f32 {
        self.target_angle
    }

    pub fn angular_velocity(&self) -> f32 {
        self.angular_velocity
    }

    pub fn active_window_remaining(&self) -> f32 {
        self.active_window.remaining()
    }

    pub fn settled_duration(&self) -> f32 {
        self.settled.elapsed()
    }

    pub fn was_cradling(&self) -> bool {
        self.was_cradling
    }

    pub fn last_input_was_press(&self) -> bool {
        self.last_input_was_press
    }

    pub fn is_on_cooldown(&self, body: BodyId) -> bool {
        self.hit_cooldowns.is_cooling(body)
    }

    /// Drop per-body state for a body that no longer exists
    pub fn forget_body(&mut self, body: BodyId) {
        self.hit_cooldowns.remove(body);
    }

    /// Transform a world point into flipper-local space
    pub fn to_local(&self, world: Vec2) -> Vec2 {
        let (sin, cos) = self.current_angle.sin_cos();
        let d = world - self.pivot;
        Vec2::new(d.x * cos + d.y * sin, -d.x * sin + d.y * cos)
    }

    /// Whether a circle of `radius` at `world` touches the contact region
    pub fn overlaps(&self, world: Vec2, radius: f32) -> bool {
        self.shape.distance(self.to_local(world)) < radius
    }

    /// Within the settle tolerance of the target angle
    pub fn is_at_target(&self) -> bool {
        (self.target_angle - self.current_angle).abs() < self.tuning.settle_tolerance
    }

    /// Press: swing toward the extended angle
    pub fn activate(&mut self, events: &mut Vec<PhysicsEvent>) {
        if self.was_cradling {
            self.was_cradling = false;
            events.push(PhysicsEvent::CradleBroken { actuator: self.id });
        }
        self.begin_stroke(self.extended_angle, true);
    }

    /// Release: swing back to rest. Cradle detection runs first, against the
    /// bodies overlapping the flipper right now.
    pub fn deactivate<'a>(&mut self, overlapping: impl IntoIterator<Item = &'a Body>) {
        self.was_cradling = self.detect_cradle(overlapping);
        if self.was_cradling {
            log::debug!("Flipper {:?} released while cradling", self.id);
        }
        self.begin_stroke(self.rest_angle, false);
    }

    fn begin_stroke(&mut self, target: f32, press: bool) {
        self.target_angle = target;
        self.hit_cooldowns.clear();
        self.active_window.start(self.tuning.active_window);
        self.last_input_was_press = press;
    }

    fn detect_cradle<'a>(&self, overlapping: impl IntoIterator<Item = &'a Body>) -> bool {
        if self.settled.elapsed() < self.tuning.cradle_threshold {
            return false;
        }
        let mut any_overlap = false;
        let mut any_resting = false;
        for body in overlapping {
            any_overlap = true;
            if body.speed() < self.tuning.rest_speed {
                any_resting = true;
            }
        }
        any_overlap && any_resting
    }

    /// Advance the angle and every countdown by one tick
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let previous = self.current_angle;
        let blend = (self.tuning.rotation_speed * dt).min(1.0);
        self.current_angle += (self.target_angle - self.current_angle) * blend;
        self.angular_velocity = (self.current_angle - previous) / dt;

        let still = self.is_at_target() && self.angular_velocity.abs() < self.tuning.settle_speed;
        self.settled.update(still, dt);

        self.active_window.tick(dt);
        self.hit_cooldowns.tick(dt);
    }

    /// True if a hit on `body` would be accepted this tick
    pub fn can_hit(&self, body: BodyId) -> bool {
        if !self.active_window.is_active() {
            return false;
        }
        let threshold = if self.last_input_was_press {
            self.tuning.press_hit_speed
        } else {
            self.tuning.release_hit_speed
        };
        if self.angular_velocity.abs() <= threshold {
            return false;
        }
        if self.is_at_target() {
            return false;
        }
        if self.hit_cooldowns.is_cooling(body) {
            return false;
        }
        // A released, resting body must not be flung
        !(!self.last_input_was_press && self.was_cradling)
    }

    /// Impulse magnitude for a contact at `contact_distance` from the pivot
    pub fn impulse_strength(&self, contact_distance: f32) -> f32 {
        let t = &self.tuning;
        let surface_velocity = contact_distance * self.angular_velocity;
        let impulse = (t.base_force * surface_velocity.abs() * t.surface_velocity_scale).clamp(
            t.base_force * t.min_impulse_factor,
            t.base_force * t.max_impulse_factor,
        );
        if self.last_input_was_press {
            impulse
        } else {
            impulse * t.release_boost
        }
    }

    /// Try to strike `body`. Returns the applied impulse strength.
    pub fn try_hit(&mut self, body: &mut Body, events: &mut Vec<PhysicsEvent>) -> Option<f32> {
        if !body.has(Capabilities::STRIKABLE) || !self.can_hit(body.id) {
            return None;
        }

        let r = body.position - self.pivot;
        let contact_distance = r.length();
        let tangent = r.perp().normalize_or_zero() * sign(self.angular_velocity);
        if tangent == Vec2::ZERO {
            return None;
        }

        let strength = self.impulse_strength(contact_distance);
        body.add_velocity(tangent * strength);
        self.hit_cooldowns.insert(body.id, self.tuning.hit_cooldown);

        log::trace!(
            "Flipper {:?} hit {:?} with {:.1} ({})",
            self.id,
            body.id,
            strength,
            if self.last_input_was_press { "press" } else { "release" }
        );
        events.push(PhysicsEvent::ImpulseApplied {
            actuator: self.id,
            body: body.id,
            strength,
        });
        Some(strength)
    }

    /// A body began touching the flipper this tick
    pub fn on_body_entered(
        &mut self,
        bodies: &mut BodyRegistry,
        body: BodyId,
        events: &mut Vec<PhysicsEvent>,
    ) -> Option<f32> {
        let body = bodies.get_mut(body)?;
        self.try_hit(body, events)
    }

    /// Strike every overlapping body that passes the hit checks
    pub fn hit_overlapping(
        &mut self,
        bodies: &mut BodyRegistry,
        overlapping: &[BodyId],
        events: &mut Vec<PhysicsEvent>,
    ) {
        for &id in overlapping {
            if let Some(body) = bodies.get_mut(id) {
                self.try_hit(body, events);
            }
        }
    }

    pub fn snapshot(&self) -> FlipperSnapshot {
        FlipperSnapshot {
            id: self.id,
            pivot: self.pivot,
            angle: normalize_angle(self.current_angle),
            tip: self.pivot + polar_to_cartesian(self.shape.reach(), self.current_angle),
            angular_velocity: self.angular_velocity,
            active: self.active_window.is_active(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    fn config() -> FlipperConfig {
        FlipperConfig {
            pivot: Vec2::ZERO,
            rest_angle: -0.5,
            extended_angle: 0.5,
            contact_shape: Some(ContactShape::Capsule {
                length: 100.0,
                radius: 10.0,
            }),
        }
    }

    fn flipper() -> Flipper {
        Flipper::new(ActuatorId(1), &config(), FlipperTuning::default())
    }

    fn run(flipper: &mut Flipper, seconds: f32) {
        let ticks = (seconds / SIM_DT).round() as u32;
        for _ in 0..ticks {
            flipper.update(SIM_DT);
        }
    }

    #[test]
    fn test_missing_shape_falls_back() {
        let cfg = FlipperConfig {
            contact_shape: None,
            ..config()
        };
        let f = Flipper::new(ActuatorId(2), &cfg, FlipperTuning::default());
        assert_eq!(f.shape(), ContactShape::default());
    }

    #[test]
    fn test_activate_opens_window() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        assert_eq!(f.target_angle(), 0.5);
        assert!(f.last_input_was_press());
        assert!((f.active_window_remaining() - FLIPPER_ACTIVE_WINDOW).abs() < 1e-6);
        assert!(events.is_empty());
    }

    #[test]
    fn test_angular_velocity_follows_target() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        f.update(SIM_DT);
        assert!(f.angular_velocity() > 0.0);
        assert!(f.current_angle() > -0.5 && f.current_angle() < 0.5);

        run(&mut f, 0.5);
        f.deactivate(std::iter::empty());
        f.update(SIM_DT);
        assert!(f.angular_velocity() < 0.0);
    }

    #[test]
    fn test_settles_at_target() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        run(&mut f, 1.0);
        assert!(f.is_at_target());
        assert!(f.settled_duration() >= FLIPPER_CRADLE_THRESHOLD);

        // A new stroke resets settle tracking on the next tick
        f.deactivate(std::iter::empty());
        f.update(SIM_DT);
        assert_eq!(f.settled_duration(), 0.0);
    }

    #[test]
    fn test_press_hit_applies_tangential_impulse() {
        let mut f = flipper();
        let mut events = Vec::new();
        // Body sitting above the arm at 60 units out
        let mut body = Body::new(BodyId(1), Vec2::new(60.0, 0.0), 1.0);
        f.activate(&mut events);
        f.update(SIM_DT);

        let strength = f.try_hit(&mut body, &mut events).expect("hit expected");
        let t = FlipperTuning::default();
        assert!(strength >= t.base_force * 0.5 && strength <= t.base_force * 3.0);
        // Counter-clockwise swing pushes a body on +x toward +y
        assert!(body.velocity.y > 0.0);
        assert!(body.velocity.x.abs() < 1e-3);
        assert!(matches!(
            events.last(),
            Some(PhysicsEvent::ImpulseApplied { body: BodyId(1), .. })
        ));
    }

    #[test]
    fn test_cooldown_blocks_second_hit() {
        let mut f = flipper();
        let mut events = Vec::new();
        let mut body = Body::new(BodyId(1), Vec2::new(60.0, 0.0), 1.0);
        f.activate(&mut events);
        f.update(SIM_DT);
        assert!(f.try_hit(&mut body, &mut events).is_some());
        f.update(SIM_DT);
        assert!(f.is_on_cooldown(BodyId(1)));
        assert!(f.try_hit(&mut body, &mut events).is_none());
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_release_boost_doubles_impulse() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        f.update(SIM_DT);
        let press = f.impulse_strength(1000.0);

        let mut g = flipper();
        g.deactivate(std::iter::empty());
        // Force identical angular speed, opposite direction
        g.angular_velocity = -f.angular_velocity;
        let release = g.impulse_strength(1000.0);
        assert!((release - press * FLIPPER_RELEASE_BOOST).abs() < 1e-3);
    }

    #[test]
    fn test_impulse_clamped() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        f.update(SIM_DT);
        let t = FlipperTuning::default();
        assert_eq!(f.impulse_strength(0.0), t.base_force * t.min_impulse_factor);
        assert_eq!(f.impulse_strength(1e9), t.base_force * t.max_impulse_factor);
    }

    #[test]
    fn test_window_expiry_stops_hits() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        run(&mut f, 0.4);
        assert_eq!(f.active_window_remaining(), 0.0);

        let mut body = Body::new(BodyId(1), Vec2::new(60.0, 0.0), 1.0);
        for _ in 0..60 {
            f.update(SIM_DT);
            assert!(f.try_hit(&mut body, &mut events).is_none());
        }
        assert!(events.is_empty());
    }

    #[test]
    fn test_cradle_suppresses_release_hit() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        // Swing up, then hold with a ball resting on the arm for 0.25s
        run(&mut f, 0.5);
        let mut body = Body::new(BodyId(1), Vec2::new(60.0, 40.0), 1.0);
        run(&mut f, 0.25);
        assert!(f.settled_duration() >= FLIPPER_CRADLE_THRESHOLD);

        f.deactivate([&body]);
        assert!(f.was_cradling());

        for _ in 0..40 {
            f.update(SIM_DT);
            assert!(f.try_hit(&mut body, &mut events).is_none());
        }
        assert_eq!(body.velocity, Vec2::ZERO);
    }

    #[test]
    fn test_fast_body_is_not_cradled() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        run(&mut f, 1.0);
        let mut body =
            Body::new(BodyId(1), Vec2::new(60.0, 40.0), 1.0)
                .with_velocity(Vec2::new(80.0, 0.0));
        f.deactivate([&body]);
        assert!(!f.was_cradling());
        f.update(SIM_DT);
        assert!(f.try_hit(&mut body, &mut events).is_some());
    }

    #[test]
    fn test_unsettled_release_is_not_cradled() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        f.update(SIM_DT);
        let body = Body::new(BodyId(1), Vec2::new(60.0, 0.0), 1.0);
        f.deactivate([&body]);
        assert!(!f.was_cradling());
    }

    #[test]
    fn test_press_breaks_cradle() {
        let mut f = flipper();
        let mut events = Vec::new();
        f.activate(&mut events);
        run(&mut f, 1.0);
        let body = Body::new(BodyId(1), Vec2::new(60.0, 40.0), 1.0);
        f.deactivate([&body]);
        assert!(f.was_cradling());

        f.activate(&mut events);
        assert!(!f.was_cradling());
        assert_eq!(
            events,
            vec![PhysicsEvent::CradleBroken {
                actuator: ActuatorId(1)
            }]
        );
    }

    #[test]
    fn test_unstrikable_body_ignored() {
        let mut f = flipper();
        let mut events = Vec::new();
        let mut body = Body::new(BodyId(1), Vec2::new(60.0, 0.0), 1.0)
            .with_capabilities(Capabilities::BUOYANT);
        f.activate(&mut events);
        f.update(SIM_DT);
        assert!(f.try_hit(&mut body, &mut events).is_none());
    }

    #[test]
    fn test_missing_body_is_noop() {
        let mut f = flipper();
        let mut events = Vec::new();
        let mut bodies = BodyRegistry::new();
        f.activate(&mut events);
        f.update(SIM_DT);
        assert!(f.on_body_entered(&mut bodies, BodyId(42), &mut events).is_none());
        f.hit_overlapping(&mut bodies, &[BodyId(42)], &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn test_overlap_and_snapshot() {
        let f = flipper();
        // At rest the arm points along -0.5 rad
        let on_arm = polar_to_cartesian(50.0, -0.5);
        assert!(f.overlaps(on_arm, 5.0));
        assert!(!f.overlaps(Vec2::new(-80.0, 0.0), 5.0));

        let snap = f.snapshot();
        assert!((snap.angle + 0.5).abs() < 1e-6);
        assert!((snap.tip.length() - 110.0).abs() < 1e-3);
        assert!(!snap.active);
    }
}
