//! Simulation context
//!
//! Everything a tick needs is held here and passed in explicitly: the shared
//! buoyancy field, the body registry, flippers, walls and the controlled
//! body's thrust gate. Nothing is looked up globally.

use std::collections::BTreeMap;

use glam::Vec2;

use super::body::{Body, BodyId, BodyRegistry, Capabilities};
use super::buoyancy::BuoyancyField;
use super::exhaustion::ThrustController;
use super::flipper::{ActuatorId, Flipper, FlipperConfig, FlipperSnapshot};
use super::slip::{WallId, WallSegment};
use crate::tuning::Tuning;

/// Notifications for the presentation layer. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PhysicsEvent {
    ImpulseApplied {
        actuator: ActuatorId,
        body: BodyId,
        strength: f32,
    },
    /// A flipper holding a released body was pressed again
    CradleBroken { actuator: ActuatorId },
    BodyDied { body: BodyId },
}

/// Complete simulation state (single-threaded, fixed timestep)
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub tuning: Tuning,
    pub bodies: BodyRegistry,
    pub flippers: BTreeMap<ActuatorId, Flipper>,
    pub walls: BTreeMap<WallId, WallSegment>,
    pub controller: Option<ThrustController>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) events: Vec<PhysicsEvent>,
    next_actuator: u32,
    next_wall: u32,
}

impl SimulationContext {
    pub fn new(tuning: Tuning) -> Self {
        log::info!(
            "Simulation context: surface at {}, floor at {}, zones {}/{}",
            tuning.buoyancy.surface_elevation,
            tuning.buoyancy.floor_elevation,
            tuning.buoyancy.shallow_depth,
            tuning.buoyancy.mid_depth
        );
        Self {
            tuning,
            bodies: BodyRegistry::new(),
            flippers: BTreeMap::new(),
            walls: BTreeMap::new(),
            controller: None,
            time_ticks: 0,
            events: Vec::new(),
            next_actuator: 0,
            next_wall: 0,
        }
    }

    #[inline]
    pub fn field(&self) -> &BuoyancyField {
        &self.tuning.buoyancy
    }

    pub fn add_flipper(&mut self, config: &FlipperConfig) -> ActuatorId {
        self.next_actuator += 1;
        let id = ActuatorId(self.next_actuator);
        self.flippers
            .insert(id, Flipper::new(id, config, self.tuning.flipper.clone()));
        id
    }

    /// Add a wall with the tuned default slip coefficient
    pub fn add_wall(&mut self, orientation: f32) -> WallId {
        let slip = self.tuning.slip_coefficient;
        self.add_wall_with_slip(orientation, slip)
    }

    pub fn add_wall_with_slip(&mut self, orientation: f32, slip_coefficient: f32) -> WallId {
        self.next_wall += 1;
        let id = WallId(self.next_wall);
        let wall = WallSegment::from_orientation(id, orientation, slip_coefficient);
        self.walls.insert(id, wall);
        id
    }

    pub fn spawn_body(&mut self, position: Vec2, mass: f32) -> BodyId {
        self.bodies.spawn(position, mass)
    }

    /// Remove a body and announce its death. Unknown ids are ignored.
    /// Killing the controlled body also drops its thrust controller.
    pub fn kill_body(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.remove(id)?;
        for flipper in self.flippers.values_mut() {
            flipper.forget_body(id);
        }
        if self.controller.as_ref().is_some_and(|c| c.body == id) {
            log::info!("Controlled body {:?} died, releasing thrust control", id);
            self.controller = None;
        }
        self.events.push(PhysicsEvent::BodyDied { body: id });
        Some(body)
    }

    /// Hand thrust control to `id`, tagging it as controlled
    pub fn set_controlled(&mut self, id: BodyId) -> bool {
        let Some(body) = self.bodies.get_mut(id) else {
            log::warn!("Cannot control missing body {:?}", id);
            return false;
        };
        body.capabilities |= Capabilities::CONTROLLED;
        self.controller = Some(ThrustController::new(
            id,
            self.tuning.exhaustion.clone(),
            self.tuning.thrust.clone(),
        ));
        true
    }

    /// True when `id` is above the water surface
    pub fn is_above_surface(&self, id: BodyId) -> bool {
        let field = self.field();
        self.bodies
            .get(id)
            .is_some_and(|b| !field.is_in_water(field.depth_at(b.position.y)))
    }

    pub fn events(&self) -> &[PhysicsEvent] {
        &self.events
    }

    /// Take every notification produced since the last drain
    pub fn drain_events(&mut self) -> Vec<PhysicsEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn flipper_snapshots(&self) -> Vec<FlipperSnapshot> {
        self.flippers.values().map(Flipper::snapshot).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kill_body_emits_event() {
        let mut ctx = SimulationContext::new(Tuning::default());
        let id = ctx.spawn_body(Vec2::ZERO, 1.0);
        assert!(ctx.kill_body(id).is_some());
        assert!(ctx.kill_body(id).is_none());
        assert_eq!(ctx.drain_events(), vec![PhysicsEvent::BodyDied { body: id }]);
        assert!(ctx.events().is_empty());
    }

    #[test]
    fn test_set_controlled_tags_body() {
        let mut ctx = SimulationContext::new(Tuning::default());
        let id = ctx.spawn_body(Vec2::ZERO, 1.0);
        assert!(ctx.set_controlled(id));
        assert!(ctx.bodies.get(id).is_some_and(|b| b.has(Capabilities::CONTROLLED)));
        assert!(!ctx.set_controlled(BodyId(99)));
        assert_eq!(ctx.controller.as_ref().map(|c| c.body), Some(id));
    }

    #[test]
    fn test_killing_controlled_body_drops_controller() {
        let mut ctx = SimulationContext::new(Tuning::default());
        let player = ctx.spawn_body(Vec2::ZERO, 1.0);
        let other = ctx.spawn_body(Vec2::ONE, 1.0);
        assert!(ctx.set_controlled(player));

        ctx.kill_body(other);
        assert_eq!(ctx.controller.as_ref().map(|c| c.body), Some(player));

        ctx.kill_body(player);
        assert!(ctx.controller.is_none());
        assert_eq!(
            ctx.drain_events(),
            vec![
                PhysicsEvent::BodyDied { body: other },
                PhysicsEvent::BodyDied { body: player }
            ]
        );
    }

    #[test]
    fn test_above_surface() {
        let mut ctx = SimulationContext::new(Tuning::default());
        let up = ctx.spawn_body(Vec2::new(0.0, 20.0), 1.0);
        let down = ctx.spawn_body(Vec2::new(0.0, -20.0), 1.0);
        assert!(ctx.is_above_surface(up));
        assert!(!ctx.is_above_surface(down));
        assert!(!ctx.is_above_surface(BodyId(99)));
    }

    #[test]
    fn test_ids_are_sequential() {
        let mut ctx = SimulationContext::new(Tuning::default());
        let config = FlipperConfig {
            pivot: Vec2::ZERO,
            rest_angle: 0.0,
            extended_angle: 1.0,
            contact_shape: None,
        };
        assert_eq!(ctx.add_flipper(&config), ActuatorId(1));
        assert_eq!(ctx.add_flipper(&config), ActuatorId(2));
        assert_eq!(ctx.add_wall(0.0), WallId(1));
        assert_eq!(
            ctx.walls[&WallId(1)].slip_coefficient(),
            ctx.tuning.slip_coefficient
        );
        assert_eq!(ctx.flipper_snapshots().len(), 2);
    }
}
