use thiserror::Error;

/// Failure raised while turning pattern text into a `Program`.
///
/// All variants come from the pattern compiler and are handed back to the
/// caller unchanged.
#[derive(Debug, Error)]
pub enum CompileError {
	/// The pattern could not be parsed.
	#[error("rerand: failed to parse pattern: {0}")]
	Parse(#[from] regex_syntax::Error),

	/// The pattern parsed, but uses a construct that has no generation behavior
	/// (word boundaries, anchors in the middle of the pattern, ...).
	#[error("rerand: unsupported construct: {0}")]
	Unsupported(String),

	/// Repetition expands into more than `limit` instructions.
	#[error("rerand: pattern too large (more than {limit} instructions)")]
	TooLarge { limit: usize },
}

/// Errors returned while building a `Generator`.
///
/// Generation itself never fails: once a generator exists, every call to
/// `generate` produces a string.
#[derive(Debug, Error)]
pub enum Error {
	#[error(transparent)]
	Compile(#[from] CompileError),

	/// Path counting reached an instruction that was still being counted.
	///
	/// The pattern contains unbounded repetition, which cannot be weighted
	/// uniformly. Use a fixed branch probability or bound the repetition.
	#[error("rerand: counted too many repeat (cycle through instruction {inst})")]
	TooManyRepeat { inst: usize },

	/// Branch probability outside `[0, 1]`.
	#[error("rerand: probability must be between 0.0 and 1.0, got {0}")]
	InvalidProbability(f64),

	/// The supplied program breaks the automaton contract.
	#[error("rerand: malformed program at instruction {inst}: {reason}")]
	MalformedProgram { inst: usize, reason: String },

	/// No string matches the pattern.
	#[error("rerand: pattern matches no string")]
	EmptyLanguage,
}
