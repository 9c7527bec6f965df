//! Fixed timestep simulation tick
//!
//! Stages run in a fixed order every tick:
//! buoyancy + drag, thrust gate, flippers, wall slip, then integration.

use std::collections::BTreeMap;

use glam::Vec2;

use super::body::{BodyId, Capabilities};
use super::exhaustion::ThrustOutcome;
use super::flipper::{ActuatorCommand, ActuatorId};
use super::slip::WallId;
use super::state::SimulationContext;

/// Contact facts for one tick, supplied by the host's collision layer
#[derive(Debug, Clone, Default)]
pub struct ContactReport {
    /// Bodies currently overlapping each flipper
    pub flipper_overlaps: BTreeMap<ActuatorId, Vec<BodyId>>,
    /// Bodies that began overlapping each flipper this tick
    pub flipper_entered: BTreeMap<ActuatorId, Vec<BodyId>>,
    pub wall_contacts: Vec<(BodyId, WallId)>,
    /// Bodies resting on any surface (stamina bonus)
    pub surface_contacts: Vec<BodyId>,
}

impl ContactReport {
    pub fn overlapping(&self, flipper: ActuatorId) -> &[BodyId] {
        self.flipper_overlaps
            .get(&flipper)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn entered(&self, flipper: ActuatorId) -> &[BodyId] {
        self.flipper_entered
            .get(&flipper)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn touching_surface(&self, body: BodyId) -> bool {
        self.surface_contacts.contains(&body)
    }

    /// Record an overlap; `new_contact` also marks it as entered this tick
    pub fn add_flipper_overlap(&mut self, flipper: ActuatorId, body: BodyId, new_contact: bool) {
        self.flipper_overlaps.entry(flipper).or_default().push(body);
        if new_contact {
            self.flipper_entered.entry(flipper).or_default().push(body);
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Flipper presses/releases, applied in order
    pub actuator_commands: Vec<(ActuatorId, ActuatorCommand)>,
    /// Requested thrust direction for the controlled body
    pub thrust: Option<Vec2>,
    pub contacts: ContactReport,
}

/// Advance the simulation by one fixed timestep
pub fn tick(ctx: &mut SimulationContext, input: &TickInput, dt: f32) {
    apply_forces(ctx, input, dt);
    integrate(ctx, dt);
}

/// Every force and impulse stage, without moving bodies. Hosts that run
/// their own integrator call this and then step their solver.
pub fn apply_forces(ctx: &mut SimulationContext, input: &TickInput, dt: f32) -> ThrustOutcome {
    ctx.time_ticks += 1;

    apply_buoyancy(ctx, dt);
    let outcome = apply_thrust(ctx, input, dt);
    update_flippers(ctx, input, dt);
    apply_wall_slip(ctx, input);
    outcome
}

fn apply_buoyancy(ctx: &mut SimulationContext, dt: f32) {
    let field = &ctx.tuning.buoyancy;
    for body in ctx.bodies.iter_mut() {
        if !body.has(Capabilities::BUOYANT) {
            continue;
        }
        let depth = field.depth_at(body.position.y);
        let force = body.buoyancy.force(field, depth, body.mass());
        body.apply_force(Vec2::new(0.0, force), dt);
        // Drag is a velocity scale, applied after force integration
        body.velocity *= field.drag(field.is_in_water(depth));
    }
}

fn apply_thrust(ctx: &mut SimulationContext, input: &TickInput, dt: f32) -> ThrustOutcome {
    let above_surface = ctx
        .controller
        .as_ref()
        .is_some_and(|c| ctx.is_above_surface(c.body));
    let Some(controller) = ctx.controller.as_mut() else {
        return ThrustOutcome::Idle;
    };

    let outcome = match input.thrust {
        Some(direction) => {
            controller.request(ctx.bodies.get_mut(controller.body), direction, above_surface)
        }
        None => ThrustOutcome::Idle,
    };
    if outcome == ThrustOutcome::AboveSurface {
        log::debug!("Upward thrust rejected above the surface");
    }

    let touching = input.contacts.touching_surface(controller.body);
    controller.gate.recover(dt, touching);
    outcome
}

fn update_flippers(ctx: &mut SimulationContext, input: &TickInput, dt: f32) {
    for &(id, command) in &input.actuator_commands {
        let Some(flipper) = ctx.flippers.get_mut(&id) else {
            log::debug!("Ignoring {:?} for unknown flipper {:?}", command, id);
            continue;
        };
        match command {
            ActuatorCommand::Activate => flipper.activate(&mut ctx.events),
            ActuatorCommand::Deactivate => {
                let bodies = &ctx.bodies;
                let overlapping = input
                    .contacts
                    .overlapping(id)
                    .iter()
                    .filter_map(|&b| bodies.get(b));
                flipper.deactivate(overlapping);
            }
        }
    }

    for (&id, flipper) in ctx.flippers.iter_mut() {
        flipper.update(dt);
        for &body in input.contacts.entered(id) {
            flipper.on_body_entered(&mut ctx.bodies, body, &mut ctx.events);
        }
        let overlapping = input.contacts.overlapping(id);
        flipper.hit_overlapping(&mut ctx.bodies, overlapping, &mut ctx.events);
    }
}

fn apply_wall_slip(ctx: &mut SimulationContext, input: &TickInput) {
    let gravity = ctx.tuning.solver_gravity;
    for &(body_id, wall_id) in &input.contacts.wall_contacts {
        let (Some(wall), Some(body)) = (ctx.walls.get(&wall_id), ctx.bodies.get_mut(body_id))
        else {
            continue;
        };
        wall.apply(body, &ctx.tuning.buoyancy, gravity);
    }
}

/// Reference integrator: solver gravity, position update, speed clamp and
/// the column floor
pub fn integrate(ctx: &mut SimulationContext, dt: f32) {
    let gravity = ctx.tuning.solver_gravity;
    let max_speed = ctx.tuning.max_speed;
    let floor = ctx.tuning.buoyancy.floor_elevation;

    for body in ctx.bodies.iter_mut() {
        body.velocity += gravity * dt;
        body.velocity = body.velocity.clamp_length_max(max_speed);
        body.position += body.velocity * dt;

        if body.position.y < floor {
            body.position.y = floor;
            body.velocity.y = body.velocity.y.max(0.0);
        }
    }
}
