//! Random string generation from regular expressions.
//!
//! This crate generates strings matching a pattern, either:
//! - uniformly over every distinct matching string (combinatorial mode)
//! - with one fixed probability per branch (fixed-probability mode), which
//!   also supports unbounded repetition
//!
//! ```
//! use rerand_core::Generator;
//!
//! let generator = Generator::new("a[bc]d").unwrap();
//! let s = generator.generate();
//! assert!(s == "abd" || s == "acd");
//! ```

/// Compiled pattern automaton and the `regex-syntax` lowering.
pub mod program;

/// Path counting, branch weighting, sampling and the generator itself.
pub mod model;

/// Construction errors.
pub mod error;

pub use error::{CompileError, Error};
pub use model::alias::RuneSampler;
pub use model::generator::Generator;
pub use model::options::GeneratorOptions;
pub use model::shared_rng::SharedRng;
pub use program::compile::ParseFlags;
