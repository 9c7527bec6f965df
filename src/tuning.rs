//! Data-driven feel tuning
//!
//! All hand-tuned constants live in one serializable struct so a level or a
//! designer can override them from JSON. Missing fields fall back to the
//! defaults in `consts` and the per-component `Default` impls.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::buoyancy::BuoyancyField;
use crate::sim::exhaustion::{ExhaustionTuning, ThrustTuning};
use crate::sim::flipper::FlipperTuning;

/// Why a tuning file could not be used
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Every feel constant in one place
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub buoyancy: BuoyancyField,
    pub flipper: FlipperTuning,
    /// Default slip-assist per tick for new walls
    pub slip_coefficient: f32,
    pub exhaustion: ExhaustionTuning,
    pub thrust: ThrustTuning,
    /// Gravity the integrator applies on top of the buoyancy field. Zero by
    /// default because the field already carries simulated gravity.
    pub solver_gravity: Vec2,
    pub max_speed: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            buoyancy: BuoyancyField::default(),
            flipper: FlipperTuning::default(),
            slip_coefficient: 2.0,
            exhaustion: ExhaustionTuning::default(),
            thrust: ThrustTuning::default(),
            solver_gravity: Vec2::ZERO,
            max_speed: MAX_BODY_SPEED,
        }
    }
}

fn invalid(msg: impl Into<String>) -> TuningError {
    TuningError::Invalid(msg.into())
}

fn in_unit_range(v: f32) -> bool {
    v > 0.0 && v <= 1.0
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.display());
        Ok(tuning)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        let b = &self.buoyancy;
        if !in_unit_range(b.water_drag) || !in_unit_range(b.air_drag) {
            return Err(invalid(format!(
                "drag must be in (0, 1], got water {} / air {}",
                b.water_drag, b.air_drag
            )));
        }
        if b.shallow_depth < SURFACE_RAMP_DEPTH || b.shallow_depth >= b.mid_depth {
            return Err(invalid(format!(
                "zones must satisfy {} <= shallow_depth < mid_depth, got {} / {}",
                SURFACE_RAMP_DEPTH, b.shallow_depth, b.mid_depth
            )));
        }
        if b.surface_ramp_force < 0.0 || b.gravity < 0.0 || b.splash_pull < 0.0 {
            return Err(invalid("gravity, splash pull and surface ramp must be non-negative"));
        }
        if b.floor_elevation >= b.surface_elevation {
            return Err(invalid("floor must lie below the surface"));
        }

        let f = &self.flipper;
        if f.rotation_speed <= 0.0 || f.active_window <= 0.0 || f.hit_cooldown < 0.0 {
            return Err(invalid("flipper speed and window must be positive"));
        }
        if f.min_impulse_factor > f.max_impulse_factor {
            return Err(invalid("flipper min impulse factor exceeds max"));
        }

        if self.slip_coefficient < 0.0 {
            return Err(invalid("slip coefficient must be non-negative"));
        }

        let e = &self.exhaustion;
        if e.max <= 0.0 || e.min_threshold < 0.0 || e.cost_per_thrust < 0.0 {
            return Err(invalid("exhaustion max must be positive, costs non-negative"));
        }
        if e.cost_per_thrust > e.min_threshold {
            return Err(invalid(format!(
                "cost_per_thrust ({}) must not exceed min_threshold ({})",
                e.cost_per_thrust, e.min_threshold
            )));
        }
        if e.min_threshold > e.max {
            return Err(invalid("exhaustion min_threshold exceeds max"));
        }
        if self.max_speed <= 0.0 {
            return Err(invalid("max speed must be positive"));
        }
        Ok(())
    }
}
