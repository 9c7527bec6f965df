//! Tide Flip - physics-feel core for an underwater pinball arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (buoyancy, flippers, slip walls, stamina)
//! - `tuning`: Data-driven feel constants

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Simulated gravity used by the open-air branch of the buoyancy field (units/s²)
    pub const GRAVITY: f32 = 980.0;
    /// Speed cap applied by the integrator at the end of each tick
    pub const MAX_BODY_SPEED: f32 = 900.0;

    /// Buoyancy zone boundaries (depth, units below the surface)
    pub const SPLASH_ZONE_TOP: f32 = -100.0;
    pub const SPLASH_FULL_DEPTH: f32 = -50.0;
    pub const SURFACE_RAMP_DEPTH: f32 = 10.0;
    pub const SHALLOW_DEPTH: f32 = 100.0;
    pub const MID_DEPTH: f32 = 400.0;

    /// Flipper window and cooldowns (seconds)
    pub const FLIPPER_ACTIVE_WINDOW: f32 = 0.3;
    pub const FLIPPER_HIT_COOLDOWN: f32 = 0.1;
    pub const FLIPPER_CRADLE_THRESHOLD: f32 = 0.2;
    /// Bodies slower than this count as resting for cradle detection
    pub const FLIPPER_REST_SPEED: f32 = 50.0;
    /// Angular distance under which the flipper counts as at its target
    pub const FLIPPER_SETTLE_TOLERANCE: f32 = 5.0 * std::f32::consts::PI / 180.0;
    /// Angular speed (rad/s) under which the flipper counts as still
    pub const FLIPPER_SETTLE_SPEED: f32 = 1.0;

    /// Feel-tuned, not physically derived: release strokes hit at a lower
    /// angular speed and twice as hard so upward shots beat buoyancy.
    pub const FLIPPER_PRESS_HIT_SPEED: f32 = 2.0;
    pub const FLIPPER_RELEASE_HIT_SPEED: f32 = 0.5;
    pub const FLIPPER_RELEASE_BOOST: f32 = 2.0;

    /// Wall contacts slower than this along the tangent are ignored
    pub const SLIP_MIN_SPEED: f32 = 10.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f32, theta: f32) -> Vec2 {
    Vec2::new(r * theta.cos(), r * theta.sin())
}

/// Sign of `v` as -1, 0 or 1 (unlike `f32::signum`, zero maps to zero)
#[inline]
pub fn sign(v: f32) -> f32 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}
