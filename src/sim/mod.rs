//! Deterministic simulation module
//!
//! All physics-feel logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies
//! - Contacts come in from the host; nothing here does spatial queries

pub mod body;
pub mod buoyancy;
pub mod exhaustion;
pub mod flipper;
pub mod slip;
pub mod state;
pub mod tick;
pub mod timer;

pub use body::{Body, BodyId, BodyRegistry, BuoyancyResponse, Capabilities};
pub use buoyancy::{BuoyancyField, BuoyancyZone};
pub use exhaustion::{
    ExhaustionGate, ExhaustionTuning, ThrustController, ThrustDirection, ThrustOutcome,
    ThrustTuning,
};
pub use flipper::{
    ActuatorCommand, ActuatorId, ContactShape, Flipper, FlipperConfig, FlipperSnapshot,
    FlipperTuning,
};
pub use slip::{WallId, WallSegment};
pub use state::{PhysicsEvent, SimulationContext};
pub use tick::{ContactReport, TickInput, apply_forces, integrate, tick};
pub use timer::{CooldownMap, Countdown, Stopwatch};
