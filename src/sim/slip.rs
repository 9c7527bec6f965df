//! Direction-dependent wall slip
//!
//! Walls only ever speed up motion that already agrees with where gravity and
//! buoyancy would carry the body. Motion against that drift gets nothing, so
//! a wall never pushes a body uphill.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::body::{Body, Capabilities};
use super::buoyancy::BuoyancyField;
use crate::consts::SLIP_MIN_SPEED;
use crate::{polar_to_cartesian, sign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WallId(pub u32);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WallSegment {
    pub id: WallId,
    tangent: Vec2,
    slip_coefficient: f32,
}

impl WallSegment {
    /// Wall whose surface runs along `orientation` (radians from +x)
    pub fn from_orientation(id: WallId, orientation: f32, slip_coefficient: f32) -> Self {
        Self::new(id, polar_to_cartesian(1.0, orientation), slip_coefficient)
    }

    /// Wall along `direction`. Degenerate directions fall back to +x.
    pub fn new(id: WallId, direction: Vec2, slip_coefficient: f32) -> Self {
        let tangent = direction.try_normalize().unwrap_or_else(|| {
            log::warn!(
                "Wall {:?} has degenerate direction {:?}, using +x",
                id,
                direction
            );
            Vec2::X
        });
        Self {
            id,
            tangent,
            slip_coefficient: slip_coefficient.max(0.0),
        }
    }

    #[inline]
    pub fn tangent(&self) -> Vec2 {
        self.tangent
    }

    #[inline]
    pub fn slip_coefficient(&self) -> f32 {
        self.slip_coefficient
    }

    /// Velocity change slip-assist would give `body`, or zero
    pub fn slip_delta(&self, body: &Body, field: &BuoyancyField, gravity: Vec2) -> Vec2 {
        if !body.has(Capabilities::SLIPPABLE) {
            return Vec2::ZERO;
        }
        let along = body.velocity.dot(self.tangent);
        if along.abs() <= SLIP_MIN_SPEED {
            return Vec2::ZERO;
        }

        let depth = field.depth_at(body.position.y);
        // Bodies the field never acts on only drift with solver gravity
        let buoyancy = if body.has(Capabilities::BUOYANT) {
            body.buoyancy.force(field, depth, body.mass())
        } else {
            0.0
        };
        let net = gravity * body.mass() + Vec2::new(0.0, buoyancy);
        let net_along = net.dot(self.tangent);

        let dir = sign(along);
        if dir != sign(net_along) {
            return Vec2::ZERO;
        }
        self.tangent * dir * self.slip_coefficient
    }

    /// Apply slip-assist to `body`, returning the velocity change
    pub fn apply(&self, body: &mut Body, field: &BuoyancyField, gravity: Vec2) -> Vec2 {
        let delta = self.slip_delta(body, field, gravity);
        body.add_velocity(delta);
        delta
    }
}
