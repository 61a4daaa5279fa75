use log::{debug, warn};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};
use rand::Rng;

use crate::error::Error;
use crate::program::{Inst, Program};
use super::path_count::PathCounter;

/// Denominator used to express a fixed branch probability.
pub const FIXED_DENOMINATOR: u64 = 1 << 53;

/// How branch weights are derived.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Weighting {
	/// Weights proportional to path counts: every string is equally likely.
	Combinatorial { distinct_runes: bool },
	/// Every branch takes its primary link with `numerator / FIXED_DENOMINATOR`.
	Fixed { numerator: u64 },
}

/// Probability of taking the primary link of a `Split`.
///
/// `num <= den` and `den > 0`. Weights built from path counts are reduced
/// (`gcd(num, den) == 1`) and use `Big` only when `den` does not fit in a `u64`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchWeight {
	Small { num: u64, den: u64 },
	Big { num: BigUint, den: BigUint },
}

impl BranchWeight {
	/// Always take the primary link.
	pub const ALWAYS: BranchWeight = BranchWeight::Small { num: 1, den: 1 };
	/// Always take the alternate link.
	pub const NEVER: BranchWeight = BranchWeight::Small { num: 0, den: 1 };

	/// Builds `primary / (primary + alternate)` reduced by the gcd.
	///
	/// When both counts are zero the branch is dead and `NEVER` is returned.
	pub fn from_counts(primary: &BigUint, alternate: &BigUint) -> Self {
		let total = primary + alternate;
		if total.is_zero() {
			return Self::NEVER;
		}
		let gcd = primary.gcd(&total);
		let num = primary / &gcd;
		let den = total / &gcd;
		match (num.to_u64(), den.to_u64()) {
			(Some(num), Some(den)) => BranchWeight::Small { num, den },
			_ => BranchWeight::Big { num, den },
		}
	}

	/// Draws a weighted boolean, `true` meaning "take the primary link".
	pub fn decide<R: Rng>(&self, rng: &mut R) -> bool {
		match self {
			BranchWeight::Small { num, den } => {
				if *num == 0 {
					false
				} else if num >= den {
					true
				} else {
					rng.random_range(0..*den) < *num
				}
			}
			BranchWeight::Big { num, den } => random_below(den, rng) < *num,
		}
	}
}

/// Uniform `BigUint` in `[0, bound)` by rejection over 32-bit words.
///
/// `bound` must be non-zero.
pub fn random_below<R: Rng>(bound: &BigUint, rng: &mut R) -> BigUint {
	let bits = bound.bits();
	let words = bits.div_ceil(32) as usize;
	let spare = (words as u64 * 32 - bits) as u32;
	loop {
		let mut digits: Vec<u32> = (0..words).map(|_| rng.random()).collect();
		if let Some(top) = digits.last_mut() {
			*top &= u32::MAX >> spare;
		}
		let value = BigUint::new(digits);
		if value < *bound {
			return value;
		}
	}
}

/// Computes one weight per `Split` of `program` (`None` for other instructions).
///
/// `live` comes from `Program::validate`. In fixed mode a branch with a dead
/// link is forced onto the live one, so a walk never reaches a dead end.
///
/// # Errors
/// `Error::TooManyRepeat` in combinatorial mode when the program has a cycle,
/// and in fixed mode when a weight of 0 or 1 forces the walk around one.
pub fn compile_weights(program: &Program, weighting: Weighting, live: &[bool]) -> Result<Vec<Option<BranchWeight>>, Error> {
	match weighting {
		Weighting::Combinatorial { distinct_runes } => {
			let mut counter = PathCounter::new(program, distinct_runes);
			let mut weights = Vec::with_capacity(program.insts.len());
			for inst in &program.insts {
				let weight = match *inst {
					Inst::Split { primary, alternate } => {
						let primary = counter.count(primary)?;
						let alternate = counter.count(alternate)?;
						Some(BranchWeight::from_counts(&primary, &alternate))
					}
					_ => None,
				};
				weights.push(weight);
			}
			let total = counter.count(program.start)?;
			debug!("{} strings reachable from the start", total);
			Ok(weights)
		}
		Weighting::Fixed { numerator } => {
			let weight = BranchWeight::Small { num: numerator, den: FIXED_DENOMINATOR };
			if let Err(Error::TooManyRepeat { inst }) = PathCounter::new(program, false).count(program.start) {
				if numerator == 0 || numerator >= FIXED_DENOMINATOR {
					forced_walk(program, numerator != 0, live)?;
				} else {
					warn!("cycle through instruction {}: generation terminates only with probability 1", inst);
				}
			}
			let weights = program
				.insts
				.iter()
				.map(|inst| match *inst {
					Inst::Split { primary, alternate } => Some(match (live[primary], live[alternate]) {
						(true, false) => BranchWeight::ALWAYS,
						(false, _) => BranchWeight::NEVER,
						(true, true) => weight.clone(),
					}),
					_ => None,
				})
				.collect();
			Ok(weights)
		}
	}
}

/// Follows the only walk a fixed weight of 0 or 1 allows.
///
/// Every branch is decided in advance (`primary` tells which side, dead links
/// are never taken), so the walk either reaches `Match` or loops forever.
///
/// # Errors
/// `Error::TooManyRepeat` on the first instruction visited twice.
fn forced_walk(program: &Program, primary: bool, live: &[bool]) -> Result<(), Error> {
	let mut visited = vec![false; program.insts.len()];
	let mut pc = program.start;
	loop {
		if visited[pc] {
			return Err(Error::TooManyRepeat { inst: pc });
		}
		visited[pc] = true;
		pc = match program.insts[pc] {
			Inst::Match | Inst::Fail => return Ok(()),
			Inst::Split { primary: p, alternate: a } => {
				if (primary && live[p]) || !live[a] { p } else { a }
			}
			Inst::Nop { next }
			| Inst::Class { next, .. }
			| Inst::Char { next, .. }
			| Inst::AnyChar { next }
			| Inst::AnyCharNotNl { next }
			| Inst::Group { next } => next,
		};
	}
}
