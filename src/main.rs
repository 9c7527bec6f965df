//! Tide Flip headless entry point
//!
//! Runs a short scripted scene natively and logs what the physics core
//! reports. Set `RUST_LOG=debug` (or `trace` for every impulse) to see more.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use tide_flip::Tuning;
use tide_flip::consts::*;
use tide_flip::sim::{
    ActuatorCommand, ContactReport, ContactShape, FlipperConfig, PhysicsEvent,
    SimulationContext, ThrustOutcome, TickInput, apply_forces, integrate,
};

/// Ball radius used for the demo's naive overlap checks
const BALL_RADIUS: f32 = 8.0;
const DEMO_SECONDS: f32 = 6.0;

fn load_tuning() -> Tuning {
    match std::env::args().nth(1) {
        Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
            log::warn!("{}, using default tuning", e);
            Tuning::default()
        }),
        None => Tuning::default(),
    }
}

fn main() {
    env_logger::init();
    log::info!("Tide Flip (headless) starting...");

    let mut ctx = SimulationContext::new(load_tuning());
    let mut rng = Pcg32::seed_from_u64(0x71de_f11b);

    let flipper = ctx.add_flipper(&FlipperConfig {
        pivot: Vec2::new(-60.0, -180.0),
        rest_angle: -0.45,
        extended_angle: 0.45,
        contact_shape: Some(ContactShape::Capsule {
            length: 110.0,
            radius: 10.0,
        }),
    });
    let slope = ctx.add_wall(-std::f32::consts::FRAC_PI_6);

    let player = ctx.spawn_body(Vec2::new(0.0, -120.0), 1.0);
    ctx.set_controlled(player);
    for _ in 0..4 {
        let x = rng.random_range(-40.0..80.0);
        let y = rng.random_range(-170.0..-60.0);
        let pos = Vec2::new(x, y);
        ctx.spawn_body(pos, rng.random_range(0.5..2.0));
    }

    let ticks = (DEMO_SECONDS / SIM_DT) as u32;
    let mut touching_prev: Vec<_> = Vec::new();
    for i in 0..ticks {
        // Naive contact layer for the demo: flipper capsule and one slope
        let mut contacts = ContactReport::default();
        let mut touching_now = Vec::new();
        if let Some(f) = ctx.flippers.get(&flipper) {
            for body in ctx.bodies.iter() {
                if f.overlaps(body.position, BALL_RADIUS) {
                    let new_contact = !touching_prev.contains(&body.id);
                    contacts.add_flipper_overlap(flipper, body.id, new_contact);
                    contacts.surface_contacts.push(body.id);
                    touching_now.push(body.id);
                }
            }
        }
        for body in ctx.bodies.iter() {
            if body.position.x > 80.0 {
                contacts.wall_contacts.push((body.id, slope));
            }
        }
        touching_prev = touching_now;

        // Press every second, release half a second later
        let t = i % 120;
        let actuator_commands = match t {
            0 => vec![(flipper, ActuatorCommand::Activate)],
            60 => vec![(flipper, ActuatorCommand::Deactivate)],
            _ => Vec::new(),
        };
        let thrust = match i % 90 {
            0 => Some(Vec2::NEG_Y),
            45 => Some(Vec2::new(rng.random_range(-1.0..1.0), 0.2)),
            _ => None,
        };

        let input = TickInput {
            actuator_commands,
            thrust,
            contacts,
        };
        match apply_forces(&mut ctx, &input, SIM_DT) {
            ThrustOutcome::Granted(dv) => log::debug!("Thrust granted: {:?}", dv),
            ThrustOutcome::Exhausted => log::info!("Too exhausted to swim"),
            _ => {}
        }
        integrate(&mut ctx, SIM_DT);

        for event in ctx.drain_events() {
            match event {
                PhysicsEvent::ImpulseApplied { body, strength, .. } => {
                    log::info!("Impulse {:.0} on {:?} at tick {}", strength, body, i)
                }
                PhysicsEvent::CradleBroken { actuator } => {
                    log::info!("{:?} broke its cradle", actuator)
                }
                PhysicsEvent::BodyDied { body } => log::info!("{:?} died", body),
            }
        }

        // Anything pushed through the floor is gone
        let floor = ctx.field().floor_elevation;
        let sunk: Vec<_> = ctx
            .bodies
            .iter()
            .filter(|b| b.id != player && b.position.y <= floor)
            .map(|b| b.id)
            .collect();
        for id in sunk {
            ctx.kill_body(id);
        }
    }

    for body in ctx.bodies.iter() {
        log::info!(
            "{:?}: pos ({:.1}, {:.1}) vel ({:.1}, {:.1}) depth {:.1}",
            body.id,
            body.position.x,
            body.position.y,
            body.velocity.x,
            body.velocity.y,
            ctx.field().depth_at(body.position.y)
        );
    }
    if let Some(ctl) = &ctx.controller {
        log::info!("Stamina left: {:.0}%", ctl.gate.fraction() * 100.0);
    }
    for snap in ctx.flipper_snapshots() {
        log::info!(
            "{:?} resting at {:.2} rad, tip {:?}",
            snap.id,
            snap.angle,
            snap.tip
        );
    }
    println!("Ran {} ticks, {} bodies remaining", ticks, ctx.bodies.len());
}
