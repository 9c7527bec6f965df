//! Movable bodies and the registry the core reads and writes each tick
//!
//! Bodies belong to the host's rigid-body solver; the registry mirrors the
//! fields the core needs. Behavior is picked by composition: capability tags
//! say which systems may touch a body and a `BuoyancyResponse` says how it
//! reacts to the water column.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::buoyancy::BuoyancyField;

/// Smallest mass a body may carry
pub const MIN_MASS: f32 = 1e-3;

/// Stable body handle (ordering drives deterministic iteration)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BodyId(pub u32);

bitflags::bitflags! {
    /// Capability tag set
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Capabilities: u8 {
        /// Feels the buoyancy field and drag
        const BUOYANT = 1 << 0;
        /// Can be struck by flippers
        const STRIKABLE = 1 << 1;
        /// Gets slip-assist along walls
        const SLIPPABLE = 1 << 2;
        /// Player-steered through the thrust gate
        const CONTROLLED = 1 << 3;

        /// Buoyant, strikable and slippable: a plain ball
        const BALL = Self::BUOYANT.bits() | Self::STRIKABLE.bits() | Self::SLIPPABLE.bits();
    }
}

/// How a body responds to the buoyancy field
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BuoyancyResponse {
    /// Full field force
    #[default]
    Full,
    /// Field force times a factor (light or heavy props)
    Scaled(f32),
    /// Always falls with open-air gravity, even underwater
    Sink,
    /// No vertical force at all (anchored pickups)
    Inert,
}

impl BuoyancyResponse {
    /// Vertical force this response produces at `depth`
    pub fn force(&self, field: &BuoyancyField, depth: f32, mass: f32) -> f32 {
        match *self {
            BuoyancyResponse::Full => field.force(depth, mass),
            BuoyancyResponse::Scaled(factor) => field.force(depth, mass) * factor,
            BuoyancyResponse::Sink => -field.gravity * mass,
            BuoyancyResponse::Inert => 0.0,
        }
    }
}

/// A body as seen by the physics core
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: BodyId,
    pub position: Vec2,
    pub velocity: Vec2,
    mass: f32,
    pub capabilities: Capabilities,
    pub buoyancy: BuoyancyResponse,
}

impl Body {
    pub fn new(id: BodyId, position: Vec2, mass: f32) -> Self {
        let mass = if mass.is_finite() && mass > MIN_MASS {
            mass
        } else {
            log::warn!(
                "Body {:?} given invalid mass {}, clamping to {}",
                id,
                mass,
                MIN_MASS
            );
            MIN_MASS
        };
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            mass,
            capabilities: Capabilities::BALL,
            buoyancy: BuoyancyResponse::Full,
        }
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_buoyancy(mut self, response: BuoyancyResponse) -> Self {
        self.buoyancy = response;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    #[inline]
    pub fn has(&self, capability: Capabilities) -> bool {
        self.capabilities.contains(capability)
    }

    /// Integrate a force over `dt` into velocity
    #[inline]
    pub fn apply_force(&mut self, force: Vec2, dt: f32) {
        self.velocity += force / self.mass * dt;
    }

    /// Additive velocity change
    #[inline]
    pub fn add_velocity(&mut self, delta: Vec2) {
        self.velocity += delta;
    }
}

/// Active bodies, keyed and iterated by id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyRegistry {
    bodies: BTreeMap<BodyId, Body>,
    next_id: u32,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new body id
    pub fn next_body_id(&mut self) -> BodyId {
        self.next_id += 1;
        BodyId(self.next_id)
    }

    /// Spawn a default ball-like body
    pub fn spawn(&mut self, position: Vec2, mass: f32) -> BodyId {
        let id = self.next_body_id();
        self.bodies.insert(id, Body::new(id, position, mass));
        id
    }

    /// Insert a pre-built body, replacing any body with the same id
    pub fn insert(&mut self, body: Body) {
        self.next_id = self.next_id.max(body.id.0);
        self.bodies.insert(body.id, body);
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        self.bodies.remove(&id)
    }

    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(&id)
    }

    pub fn get_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(&id)
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Body> {
        self.bodies.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Body> {
        self.bodies.values_mut()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
