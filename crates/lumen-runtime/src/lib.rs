//! Lumen Runtime - wiring the components into one frame loop
//!
//! Provides the host-facing surface of Lumen:
//! - `Subsystem` - probes once, then runs monitor, quality, simulation, LOD
//!   and culling in a fixed order every frame
//! - `FrameClock` - wall time for the monitor, clamped time for the simulation
//! - `SubsystemEvent` / `EventBus` - tier changes and reallocations for the host
//! - `LumenSettings` - TOML configuration for every component
//! - `Stats` - serializable snapshot

mod clock;
mod event;
mod event_bus;
mod settings;
mod stats;
mod subsystem;

pub use clock::FrameClock;
pub use event::SubsystemEvent;
pub use event_bus::EventBus;
pub use settings::{HostSettings, LumenSettings};
pub use stats::Stats;
pub use subsystem::{FrameInputs, FrameReport, Subsystem};
