//! Stamina-gated thrust for the player-controlled body

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyId, Capabilities};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExhaustionTuning {
    pub max: f32,
    pub cost_per_thrust: f32,
    pub min_threshold: f32,
    /// Recovery per second, always
    pub passive_recovery_rate: f32,
    /// Extra recovery per second while touching a surface
    pub surface_contact_bonus_rate: f32,
}

impl Default for ExhaustionTuning {
    fn default() -> Self {
        Self {
            max: 100.0,
            cost_per_thrust: 20.0,
            min_threshold: 20.0,
            passive_recovery_rate: 10.0,
            surface_contact_bonus_rate: 25.0,
        }
    }
}

/// Bounded stamina pool. `0 <= current <= max` always holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExhaustionGate {
    current: f32,
    tuning: ExhaustionTuning,
}

impl ExhaustionGate {
    /// A full gate
    pub fn new(tuning: ExhaustionTuning) -> Self {
        let tuning = ExhaustionTuning {
            max: tuning.max.max(0.0),
            ..tuning
        };
        Self {
            current: tuning.max,
            tuning,
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn max(&self) -> f32 {
        self.tuning.max
    }

    /// Stamina as a 0..=1 fraction (for the HUD)
    pub fn fraction(&self) -> f32 {
        if self.tuning.max > 0.0 {
            self.current / self.tuning.max
        } else {
            0.0
        }
    }

    /// Set stamina directly, clamped to the valid range
    pub fn set_current(&mut self, value: f32) {
        self.current = value.clamp(0.0, self.tuning.max);
    }

    /// Spend one thrust if enough stamina is left. A refusal changes nothing.
    /// With `cost_per_thrust <= min_threshold` the deduction is always exact.
    pub fn try_thrust(&mut self) -> bool {
        if self.current < self.tuning.min_threshold {
            return false;
        }
        self.current = (self.current - self.tuning.cost_per_thrust).max(0.0);
        true
    }

    pub fn recover(&mut self, dt: f32, touching_surface: bool) {
        let mut gain = self.tuning.passive_recovery_rate * dt;
        if touching_surface {
            gain += self.tuning.surface_contact_bonus_rate * dt;
        }
        self.current = (self.current + gain).clamp(0.0, self.tuning.max);
    }
}

/// Velocity change per thrust, by direction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrustTuning {
    pub horizontal: f32,
    /// Weaker: fights buoyancy
    pub upward: f32,
    /// Stronger: helped along by gravity
    pub downward: f32,
}

impl Default for ThrustTuning {
    fn default() -> Self {
        Self {
            horizontal: 180.0,
            upward: 120.0,
            downward: 240.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrustDirection {
    Left,
    Right,
    Up,
    Down,
}

impl ThrustDirection {
    /// Dominant axis of a requested direction (y-up). Ties go horizontal.
    pub fn from_vector(dir: Vec2) -> Option<ThrustDirection> {
        if !dir.is_finite() || dir == Vec2::ZERO {
            return None;
        }
        let dir = if dir.x.abs() >= dir.y.abs() {
            if dir.x > 0.0 {
                ThrustDirection::Right
            } else {
                ThrustDirection::Left
            }
        } else if dir.y > 0.0 {
            ThrustDirection::Up
        } else {
            ThrustDirection::Down
        };
        Some(dir)
    }
}

impl ThrustTuning {
    pub fn velocity_delta(&self, dir: ThrustDirection) -> Vec2 {
        match dir {
            ThrustDirection::Left => Vec2::new(-self.horizontal, 0.0),
            ThrustDirection::Right => Vec2::new(self.horizontal, 0.0),
            ThrustDirection::Up => Vec2::new(0.0, self.upward),
            ThrustDirection::Down => Vec2::new(0.0, -self.downward),
        }
    }
}

/// What happened to a thrust request
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThrustOutcome {
    /// No direction requested
    Idle,
    /// Upward thrust above the surface: no cost, no effect
    AboveSurface,
    /// Not enough stamina
    Exhausted,
    /// Body missing or not player-controlled
    NoBody,
    Granted(Vec2),
}

/// Couples the stamina gate with the body it steers
#[derive(Debug, Clone)]
pub struct ThrustController {
    pub body: BodyId,
    pub gate: ExhaustionGate,
    pub thrust: ThrustTuning,
}

impl ThrustController {
    pub fn new(body: BodyId, exhaustion: ExhaustionTuning, thrust: ThrustTuning) -> Self {
        Self {
            body,
            gate: ExhaustionGate::new(exhaustion),
            thrust,
        }
    }

    /// Evaluate a thrust request for `body`
    pub fn request(
        &mut self,
        body: Option<&mut Body>,
        direction: Vec2,
        above_surface: bool,
    ) -> ThrustOutcome {
        let Some(dir) = ThrustDirection::from_vector(direction) else {
            return ThrustOutcome::Idle;
        };
        let Some(body) = body.filter(|b| b.has(Capabilities::CONTROLLED)) else {
            return ThrustOutcome::NoBody;
        };
        if dir == ThrustDirection::Up && above_surface {
            return ThrustOutcome::AboveSurface;
        }
        if !self.gate.try_thrust() {
            return ThrustOutcome::Exhausted;
        }
        let delta = self.thrust.velocity_delta(dir);
        body.add_velocity(delta);
        ThrustOutcome::Granted(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> ThrustController {
        ThrustController::new(BodyId(1), ExhaustionTuning::default(), ThrustTuning::default())
    }

    fn controlled_body() -> Body {
        Body::new(BodyId(1), Vec2::ZERO, 1.0)
            .with_capabilities(Capabilities::BALL | Capabilities::CONTROLLED)
    }

    #[test]
    fn test_gate_starts_full() {
        let gate = ExhaustionGate::new(ExhaustionTuning::default());
        assert_eq!(gate.current(), gate.max());
        assert_eq!(gate.fraction(), 1.0);
    }

    #[test]
    fn test_try_thrust_deducts_cost() {
        let mut gate = ExhaustionGate::new(ExhaustionTuning::default());
        assert!(gate.try_thrust());
        assert_eq!(gate.current(), 80.0);
    }

    #[test]
    fn test_try_thrust_refused_below_threshold() {
        let mut gate = ExhaustionGate::new(ExhaustionTuning::default());
        gate.set_current(19.0);
        assert!(!gate.try_thrust());
        assert_eq!(gate.current(), 19.0);
    }

    #[test]
    fn test_try_thrust_at_threshold_empties_gate() {
        let mut gate = ExhaustionGate::new(ExhaustionTuning::default());
        gate.set_current(20.0);
        assert!(gate.try_thrust());
        assert_eq!(gate.current(), 0.0);
        assert!(!gate.try_thrust());
        assert_eq!(gate.current(), 0.0);
    }

    #[test]
    fn test_recover_with_surface_bonus() {
        let mut gate = ExhaustionGate::new(ExhaustionTuning::default());
        gate.set_current(0.0);
        gate.recover(1.0, false);
        assert_eq!(gate.current(), 10.0);
        gate.recover(1.0, true);
        assert_eq!(gate.current(), 45.0);
        gate.recover(10.0, true);
        assert_eq!(gate.current(), gate.max());
    }

    #[test]
    fn test_direction_mapping() {
        assert_eq!(
            ThrustDirection::from_vector(Vec2::new(1.0, 0.2)),
            Some(ThrustDirection::Right)
        );
        assert_eq!(
            ThrustDirection::from_vector(Vec2::new(-0.1, -1.0)),
            Some(ThrustDirection::Down)
        );
        assert_eq!(
            ThrustDirection::from_vector(Vec2::new(0.0, 0.5)),
            Some(ThrustDirection::Up)
        );
        assert_eq!(ThrustDirection::from_vector(Vec2::ZERO), None);
        assert_eq!(ThrustDirection::from_vector(Vec2::new(f32::NAN, 1.0)), None);

        let t = ThrustTuning::default();
        let up = t.velocity_delta(ThrustDirection::Up).y;
        let down = t.velocity_delta(ThrustDirection::Down).y;
        assert!(up < down.abs());
    }

    #[test]
    fn test_upward_thrust_rejected_above_surface() {
        let mut ctl = controller();
        let mut body = controlled_body();
        let outcome = ctl.request(Some(&mut body), Vec2::Y, true);
        assert_eq!(outcome, ThrustOutcome::AboveSurface);
        assert_eq!(ctl.gate.current(), ctl.gate.max());
        assert_eq!(body.velocity, Vec2::ZERO);

        // Sideways is still allowed in the air
        let outcome = ctl.request(Some(&mut body), Vec2::X, true);
        assert!(matches!(outcome, ThrustOutcome::Granted(_)));
    }

    #[test]
    fn test_granted_thrust_moves_body() {
        let mut ctl = controller();
        let mut body = controlled_body();
        let outcome = ctl.request(Some(&mut body), Vec2::NEG_Y, false);
        assert_eq!(outcome, ThrustOutcome::Granted(Vec2::new(0.0, -240.0)));
        assert_eq!(body.velocity, Vec2::new(0.0, -240.0));
    }

    #[test]
    fn test_exhausted_after_repeated_thrusts() {
        let mut ctl = controller();
        let mut body = controlled_body();
        for _ in 0..5 {
            let outcome = ctl.request(Some(&mut body), Vec2::X, false);
            assert!(matches!(outcome, ThrustOutcome::Granted(_)));
        }
        let before = body.velocity;
        let outcome = ctl.request(Some(&mut body), Vec2::X, false);
        assert_eq!(outcome, ThrustOutcome::Exhausted);
        assert_eq!(body.velocity, before);
    }

    #[test]
    fn test_uncontrolled_or_missing_body() {
        let mut ctl = controller();
        let mut plain = Body::new(BodyId(1), Vec2::ZERO, 1.0);
        let outcome = ctl.request(Some(&mut plain), Vec2::X, false);
        assert_eq!(outcome, ThrustOutcome::NoBody);
        assert_eq!(ctl.request(None, Vec2::X, false), ThrustOutcome::NoBody);
        assert_eq!(ctl.gate.current(), ctl.gate.max());
    }
}
