use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::Error;
use crate::program::{ANY_CHAR_COUNT, ClassRange, Inst, Program};

/// Memo slot of one instruction.
#[derive(Clone, Debug)]
enum Slot {
	Unvisited,
	/// Successors are being counted. Reaching this slot again is a cycle.
	InProgress,
	Finalized(BigUint),
}

/// Counts, per instruction, the number of distinct finite completions that
/// end in an accept state.
///
/// # Rules
/// - `Match` counts 1, `Fail` counts 0
/// - `Split` adds both successors
/// - character instructions pass their successor's count through, multiplied
///   by the number of code points they can emit when `distinct_runes` is set
/// - `Nop` and `Group` pass through
///
/// Results are memoized across calls, so counting every branch of a program
/// costs one traversal overall.
///
/// The traversal keeps an explicit stack instead of recursing, so very long
/// programs do not exhaust the thread stack.
#[derive(Debug)]
pub struct PathCounter<'a> {
	program: &'a Program,
	distinct_runes: bool,
	slots: Vec<Slot>,
}

impl<'a> PathCounter<'a> {
	pub fn new(program: &'a Program, distinct_runes: bool) -> Self {
		Self {
			program,
			distinct_runes,
			slots: vec![Slot::Unvisited; program.insts.len()],
		}
	}

	/// Returns the number of completions from instruction `root`.
	///
	/// # Errors
	/// `Error::TooManyRepeat` if a cycle is reachable from `root`. The counter
	/// must not be reused after a failure.
	pub fn count(&mut self, root: usize) -> Result<BigUint, Error> {
		let mut stack = vec![root];

		while let Some(&inst) = stack.last() {
			match self.slots[inst] {
				Slot::Finalized(_) => {
					stack.pop();
				}
				Slot::Unvisited => {
					self.slots[inst] = Slot::InProgress;
					for next in self.program.insts[inst].successors() {
						match self.slots[next] {
							Slot::Finalized(_) => {}
							Slot::InProgress => return Err(Error::TooManyRepeat { inst: next }),
							Slot::Unvisited => stack.push(next),
						}
					}
				}
				Slot::InProgress => {
					// Everything pushed above this entry is finalized by now
					let count = self.combine(inst);
					self.slots[inst] = Slot::Finalized(count);
					stack.pop();
				}
			}
		}

		Ok(self.finalized(root))
	}

	fn combine(&self, inst: usize) -> BigUint {
		match &self.program.insts[inst] {
			Inst::Fail => BigUint::zero(),
			Inst::Match => BigUint::one(),
			Inst::Nop { next } | Inst::Char { next, .. } | Inst::Group { next } => self.finalized(*next),
			Inst::Class { ranges, next } => {
				let count = self.finalized(*next);
				if !self.distinct_runes {
					return count;
				}
				let width: u64 = ranges.iter().map(ClassRange::width).sum();
				count * width
			}
			Inst::AnyChar { next } => {
				let count = self.finalized(*next);
				if self.distinct_runes { count * ANY_CHAR_COUNT } else { count }
			}
			Inst::AnyCharNotNl { next } => {
				let count = self.finalized(*next);
				if self.distinct_runes { count * (ANY_CHAR_COUNT - 1) } else { count }
			}
			Inst::Split { primary, alternate } => self.finalized(*alternate) + self.finalized(*primary),
		}
	}

	fn finalized(&self, inst: usize) -> BigUint {
		match &self.slots[inst] {
			Slot::Finalized(count) => count.clone(),
			// Successors are always finalized before their predecessor
			_ => BigUint::zero(),
		}
	}
}
