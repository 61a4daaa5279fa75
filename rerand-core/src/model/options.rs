use crate::error::Error;
use crate::program::compile::ParseFlags;
use super::weight::{FIXED_DENOMINATOR, Weighting};

/// Construction parameters of a `Generator`.
///
/// # Modes
/// - combinatorial (default): every distinct string is equally likely, the
///   pattern must not contain unbounded repetition
/// - fixed probability: every branch takes its primary link (the body of a
///   greedy repetition, the left side of an alternation) with the same
///   probability; unbounded repetition is allowed
///
/// `distinct_runes` only matters in combinatorial mode. When set, a class such
/// as `[a-z]` weighs as 26 strings instead of one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GeneratorOptions {
	/// Count every code point of a class as a distinct string.
	pub distinct_runes: bool,

	/// Flags used when the pattern text is parsed.
	pub flags: ParseFlags,

	/// Fixed branch probability, `None` for combinatorial mode.
	probability: Option<f64>,
}

impl GeneratorOptions {
	pub fn new() -> Self {
		Self::default()
	}

	/// Combinatorial mode where every code point of a class counts as a
	/// distinct string.
	pub fn distinct_runes() -> Self {
		Self { distinct_runes: true, ..Self::default() }
	}

	/// Returns the fixed branch probability, if any.
	pub fn probability(&self) -> Option<f64> {
		self.probability
	}

	/// Switches to fixed-probability mode.
	///
	/// `0.0` switches back to combinatorial mode.
	///
	/// # Errors
	/// Returns an error if the value is outside `[0.0, 1.0]` (or NaN).
	pub fn set_probability(&mut self, probability: f64) -> Result<(), Error> {
		if !(0.0..=1.0).contains(&probability) {
			return Err(Error::InvalidProbability(probability));
		}
		self.probability = if probability == 0.0 { None } else { Some(probability) };
		Ok(())
	}

	pub(crate) fn weighting(&self) -> Weighting {
		match self.probability {
			Some(p) => Weighting::Fixed {
				numerator: (p * FIXED_DENOMINATOR as f64).round() as u64,
			},
			None => Weighting::Combinatorial { distinct_runes: self.distinct_runes },
		}
	}
}
