//! Lumen Core - Foundational types for the Lumen performance subsystem
//!
//! This crate provides the core types that all other Lumen crates depend on:
//! - `ResourceId` - Unique handles for GPU-side resources
//! - `Viewport` - Drawable surface size and pixel ratio
//! - Quadratic Bézier and interpolation helpers
//! - Procedural orb and globe meshes
//! - Error types and Result alias
//!
//! Vector and matrix math comes from `glam` and is re-exported here so every
//! crate agrees on one set of types.

pub mod curve;
mod error;
mod id;
pub mod mesh;
mod types;

pub use error::{LumenError, Result};
pub use id::ResourceId;
pub use types::Viewport;

pub use glam::{Mat4, Quat, Vec3, Vec4};
