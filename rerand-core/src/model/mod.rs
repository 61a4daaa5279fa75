//! Weighted random walk over a compiled pattern.
//!
//! Construction happens once and may fail; generation never does:
//! - Path counting per instruction, with cycle detection (`PathCounter`)
//! - Branch weights from counts or a fixed probability (`weight`)
//! - O(1) code point sampling with Walker's alias method (`RuneSampler`)
//! - The walk itself (`Generator`)

/// Public generator: construction entry points and the walk.
pub mod generator;

/// Construction options (mode, counting convention, parser flags).
pub mod options;

/// Memoized, cycle-aware count of matching completions per instruction.
pub mod path_count;

/// Branch weights and weighted boolean draws.
pub mod weight;

/// Alias-method sampler over character ranges.
pub mod alias;

/// Random source behind a mutex, locked per draw.
pub mod shared_rng;

/// Reusable output buffers.
///
/// Not exposed
mod pool;
