//! Depth-dependent buoyancy field
//!
//! Depth is measured downward from the water surface (negative = above water).
//! The returned force is the signed vertical force on a body, positive = up.
//! The field is the only vertical force bodies feel by default: above the
//! splash zone it returns plain simulated gravity.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Depth range governed by a single force formula
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuoyancyZone {
    /// Far above the surface: full simulated gravity
    OpenAir,
    /// Just above the surface: eased downward pull
    Splash,
    /// First few units under the surface: force ramps up from zero
    SurfaceRamp,
    Shallow,
    Mid,
    /// Quadratic push back toward mid-depth
    Deep,
}

/// Read-only buoyancy configuration shared by every body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuoyancyField {
    /// World y of the water surface
    pub surface_elevation: f32,
    /// World y of the column floor
    pub floor_elevation: f32,
    pub shallow_depth: f32,
    pub mid_depth: f32,
    /// Simulated gravity (acceleration) in open air
    pub gravity: f32,
    /// Downward acceleration reached at the bottom of the splash ease
    pub splash_pull: f32,
    /// Upward acceleration at the bottom of the surface ramp
    pub surface_ramp_force: f32,
    pub shallow_buoyancy: f32,
    pub mid_base: f32,
    pub mid_rate: f32,
    pub deep_base: f32,
    pub deep_curve: f32,
    /// Velocity multiplier per tick while submerged, in (0, 1]
    pub water_drag: f32,
    /// Velocity multiplier per tick while airborne, in (0, 1]
    pub air_drag: f32,
}

impl Default for BuoyancyField {
    fn default() -> Self {
        Self {
            surface_elevation: 0.0,
            floor_elevation: -1200.0,
            shallow_depth: SHALLOW_DEPTH,
            mid_depth: MID_DEPTH,
            gravity: GRAVITY,
            splash_pull: 600.0,
            surface_ramp_force: 80.0,
            shallow_buoyancy: 120.0,
            mid_base: 120.0,
            mid_rate: 0.5,
            // mid_base + (MID_DEPTH - SHALLOW_DEPTH) * mid_rate, so mid->deep is continuous
            deep_base: 270.0,
            deep_curve: 0.01,
            water_drag: 0.98,
            air_drag: 0.995,
        }
    }
}

impl BuoyancyField {
    /// Depth of a world-space elevation below the surface
    #[inline]
    pub fn depth_at(&self, elevation: f32) -> f32 {
        self.surface_elevation - elevation
    }

    /// Depth of the floor below the surface
    #[inline]
    pub fn column_depth(&self) -> f32 {
        self.surface_elevation - self.floor_elevation
    }

    /// True for finite depths at or below the surface
    #[inline]
    pub fn is_in_water(&self, depth: f32) -> bool {
        depth.is_finite() && depth >= 0.0
    }

    /// Which formula governs `depth`. Non-finite depths count as open air.
    pub fn zone(&self, depth: f32) -> BuoyancyZone {
        if !depth.is_finite() || depth <= SPLASH_ZONE_TOP {
            BuoyancyZone::OpenAir
        } else if depth < 0.0 {
            BuoyancyZone::Splash
        } else if depth < SURFACE_RAMP_DEPTH {
            BuoyancyZone::SurfaceRamp
        } else if depth < self.shallow_depth {
            BuoyancyZone::Shallow
        } else if depth < self.mid_depth {
            BuoyancyZone::Mid
        } else {
            BuoyancyZone::Deep
        }
    }

    /// Vertical acceleration at `depth` (force per unit mass)
    pub fn acceleration(&self, depth: f32) -> f32 {
        match self.zone(depth) {
            BuoyancyZone::OpenAir => -self.gravity,
            BuoyancyZone::Splash => {
                // 0 at the surface, full pull from SPLASH_FULL_DEPTH upward
                let t = (depth / SPLASH_FULL_DEPTH).min(1.0);
                -self.splash_pull * t
            }
            BuoyancyZone::SurfaceRamp => self.surface_ramp_force * (depth / SURFACE_RAMP_DEPTH),
            BuoyancyZone::Shallow => self.shallow_buoyancy,
            BuoyancyZone::Mid => self.mid_base + (depth - self.shallow_depth) * self.mid_rate,
            BuoyancyZone::Deep => {
                let over = depth - self.mid_depth;
                self.deep_base + over * over * self.deep_curve
            }
        }
    }

    /// Signed vertical force on a body of `mass` at `depth`
    #[inline]
    pub fn force(&self, depth: f32, mass: f32) -> f32 {
        self.acceleration(depth) * mass
    }

    /// Force as a world-space vector (y-up)
    #[inline]
    pub fn force_vector(&self, depth: f32, mass: f32) -> Vec2 {
        Vec2::new(0.0, self.force(depth, mass))
    }

    /// Per-tick velocity multiplier. Apply after force integration.
    #[inline]
    pub fn drag(&self, in_water: bool) -> f32 {
        if in_water { self.water_drag } else { self.air_drag }
    }
}
