//! Pooled curve effects drawn between particles

mod chords;
mod links;
mod sparks;

pub use chords::{chord_brightness, chord_bulge, Chord, ChordEffects};
pub use links::{Link, LinkEffects};
pub use sparks::{Spark, SparkEffects};

use serde::Serialize;

/// Counters and live totals across the three effect pools
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EffectStats {
    pub live_sparks: usize,
    pub live_chords: usize,
    pub live_links: usize,
    pub sparks_spawned: u64,
    /// Spawn attempts that found no neighbor or no free slot
    pub sparks_skipped: u64,
    pub chords_spawned: u64,
    pub chords_skipped: u64,
    pub chords_snapped: u64,
    pub links_rebound: u64,
}
