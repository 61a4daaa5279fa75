use log::error;
use rand::Rng;

use crate::program::ClassRange;
use super::shared_rng::SharedRng;

/// Uniform sampler over every code point of a set of ranges.
///
/// A range is first picked with Walker's alias method, weighted by its width,
/// then a code point is drawn uniformly inside it. Both steps are O(1), the
/// table is built once in O(n).
///
/// ## Invariants
/// - `ranges` hold no surrogates, so every offset inside a range is a `char`
/// - `probs` and `aliases` are empty when there are fewer than two ranges
/// - every `probs[i] <= sum`
/// - range `i` keeps `probs[i]` of its own slot plus `sum - probs[j]` of every
///   other slot `j` aliased to it, which adds up to `width(i) * ranges.len()`
#[derive(Clone, Debug)]
pub struct RuneSampler {
	ranges: Vec<ClassRange>,
	aliases: Vec<usize>,
	probs: Vec<u64>,
	/// Total width of all ranges.
	sum: u64,
}

impl RuneSampler {
	/// Builds the sampler for `ranges`.
	///
	/// Needs at least one range. Ranges must be disjoint with `start <= end`;
	/// their order does not matter.
	pub fn new(ranges: &[ClassRange]) -> Self {
		let ranges: Vec<ClassRange> = ranges.iter().flat_map(|r| r.scalar_parts()).collect();
		if ranges.len() < 2 {
			let sum = ranges.first().map(ClassRange::width).unwrap_or_default();
			return Self { ranges, aliases: Vec::new(), probs: Vec::new(), sum };
		}

		let n = ranges.len() as u64;
		let mut aliases: Vec<usize> = (0..ranges.len()).collect();
		let mut probs: Vec<u64> = Vec::with_capacity(ranges.len());
		let mut sum = 0;
		for range in &ranges {
			let width = range.width();
			probs.push(width * n);
			sum += width;
		}

		// Walker's alias method: pair each light slot with a heavy one and let
		// the heavy slot donate its excess.
		let mut heavy: Vec<usize> = Vec::new();
		let mut light: Vec<usize> = Vec::new();
		for (i, &p) in probs.iter().enumerate() {
			if p > sum { heavy.push(i) } else { light.push(i) }
		}
		while let (Some(&j), Some(&k)) = (light.last(), heavy.last()) {
			light.pop();
			aliases[j] = k;
			probs[k] -= sum - probs[j];
			if probs[k] <= sum {
				heavy.pop();
				light.push(k);
			}
		}

		Self { ranges, aliases, probs, sum }
	}

	/// Number of code points the sampler can return.
	pub fn width(&self) -> u64 {
		self.sum
	}

	/// Draws one code point.
	///
	/// The range pick and the in-range pick are two separate draws on `rng`.
	///
	/// # Panics
	/// Only if a range holds surrogates, which `new` rules out.
	pub fn sample<R: Rng>(&self, rng: &SharedRng<R>) -> char {
		let range = match self.ranges.as_slice() {
			[only] if only.start == only.end => return only.start,
			[only] => *only,
			_ => self.ranges[rng.draw(|rng| self.pick_range(rng))],
		};
		if range.start == range.end {
			return range.start;
		}
		let offset = rng.draw(|rng| rng.random_range(0..range.width() as u32));
		let code = range.start as u32 + offset;
		match char::from_u32(code) {
			Some(ch) => ch,
			None => {
				error!("drew U+{:04X} from {:?}, which is not a scalar value", code, range);
				panic!("rerand: bad code point U+{:04X} drawn from {:?}", code, range);
			}
		}
	}

	fn pick_range<R: Rng>(&self, rng: &mut R) -> usize {
		let i = rng.random_range(0..self.probs.len());
		let v = rng.random_range(0..self.sum);
		if v < self.probs[i] { i } else { self.aliases[i] }
	}
}
