//! Lumen Particles - structure-of-arrays particle simulation
//!
//! Provides the per-frame simulation driven by the active performance config:
//! - Flat position/velocity/phase/size/color buffers
//! - Five precomputed target shapes blended by external weights
//! - Spring, pointer, wave, partner and jitter forces with damped integration
//! - A periodically rebuilt spatial hash for neighbor queries
//! - Fixed-capacity spark, chord and link pools drawn as Bézier curve buffers
//! - GPU instance packing for instanced draw calls

pub mod curve_buffer;
pub mod effects;
pub mod field;
pub mod instance;
pub mod pool;
pub mod rand;
pub mod settings;
pub mod shapes;
pub mod simulation;
pub mod spatial_hash;

pub use curve_buffer::CurveBuffer;
pub use effects::EffectStats;
pub use field::{ParticleField, ParticleView};
pub use instance::{pack_instances, ParticleInstance};
pub use pool::EffectPool;
pub use settings::{SimulationSettings, WaveSettings};
pub use shapes::{Shape, ShapeWeights, TargetShapes};
pub use simulation::{particle_count_for, partner_index, ParticleSimulation, MAX_SUBSTEPS};
pub use spatial_hash::SpatialHashGrid;
