//! Compiled pattern automaton.
//!
//! A `Program` is a flat list of instructions addressed by index, plus the
//! index execution starts from. Successor links form a DAG for bounded
//! patterns; unbounded repetition shows up as a cycle through a `Split`.
//!
//! Programs are normally produced by [`compile`], but any external compiler
//! can build one by hand or deserialize it with serde.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Lowering of `regex-syntax` HIR into a `Program`.
pub mod compile;

pub use compile::compile;

/// Largest code point produced for "any character" (private use planes excluded).
pub const MAX_RUNE: char = '\u{EFFFF}';

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;

/// Number of code points "any character" can produce.
pub const ANY_CHAR_COUNT: u64 = MAX_RUNE as u64 + 1 - (SURROGATE_END - SURROGATE_START + 1) as u64;

/// Inclusive range of code points.
///
/// `start <= end` is expected. Surrogates are never part of a range, even when
/// `start` and `end` lie on both sides of the surrogate block.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassRange {
	pub start: char,
	pub end: char,
}

impl ClassRange {
	pub const fn new(start: char, end: char) -> Self {
		Self { start, end }
	}

	/// Number of code points covered by the range.
	pub fn width(&self) -> u64 {
		let (lo, hi) = (self.start as u32, self.end as u32);
		if hi < lo {
			return 0;
		}
		let mut width = (hi - lo + 1) as u64;
		if lo < SURROGATE_START && hi > SURROGATE_END {
			width -= (SURROGATE_END - SURROGATE_START + 1) as u64;
		}
		width
	}

	/// Splits a range straddling the surrogate block into its two halves.
	///
	/// Every returned range maps to consecutive `u32` values that are all valid
	/// `char`s.
	pub fn scalar_parts(self) -> impl Iterator<Item = ClassRange> {
		let (lo, hi) = (self.start as u32, self.end as u32);
		let parts = if lo < SURROGATE_START && hi > SURROGATE_END {
			[
				Some(ClassRange::new(self.start, '\u{D7FF}')),
				Some(ClassRange::new('\u{E000}', self.end)),
			]
		} else {
			[Some(self), None]
		};
		parts.into_iter().flatten()
	}
}

/// Ranges sampled for "any character".
pub fn any_char_ranges() -> Vec<ClassRange> {
	vec![ClassRange::new('\0', MAX_RUNE)]
}

/// Ranges sampled for "any character except `\n`".
pub fn any_char_not_nl_ranges() -> Vec<ClassRange> {
	vec![ClassRange::new('\0', '\t'), ClassRange::new('\u{b}', MAX_RUNE)]
}

/// One automaton node.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum Inst {
	/// Dead end, no string goes through here.
	Fail,
	/// Structural pass-through. Never executed by the generator.
	Nop { next: usize },
	/// One code point out of a set of ranges.
	Class { ranges: Vec<ClassRange>, next: usize },
	/// One literal code point.
	Char { ch: char, next: usize },
	/// Any code point.
	AnyChar { next: usize },
	/// Any code point except `\n`.
	AnyCharNotNl { next: usize },
	/// Two mutually exclusive continuations.
	Split { primary: usize, alternate: usize },
	/// Group boundary, no effect on the output.
	Group { next: usize },
	/// Accept state.
	Match,
}

impl Inst {
	/// Successor indices, primary first.
	pub fn successors(&self) -> impl Iterator<Item = usize> {
		let links = match *self {
			Inst::Fail | Inst::Match => [None, None],
			Inst::Nop { next }
			| Inst::Class { next, .. }
			| Inst::Char { next, .. }
			| Inst::AnyChar { next }
			| Inst::AnyCharNotNl { next }
			| Inst::Group { next } => [Some(next), None],
			Inst::Split { primary, alternate } => [Some(primary), Some(alternate)],
		};
		links.into_iter().flatten()
	}
}

/// A compiled pattern.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Program {
	pub insts: Vec<Inst>,
	pub start: usize,
}

impl Program {
	/// Checks the automaton contract and returns, per instruction, whether an
	/// accept state is reachable from it.
	///
	/// # Errors
	/// - `MalformedProgram` when a link points outside the program, a class
	///   has no valid range, or a `Nop` can be reached on a live path.
	/// - `EmptyLanguage` when the start instruction cannot reach `Match`.
	pub fn validate(&self) -> Result<Vec<bool>, Error> {
		let len = self.insts.len();
		if self.start >= len {
			return Err(Error::MalformedProgram {
				inst: self.start,
				reason: format!("start index out of bounds ({} instructions)", len),
			});
		}

		let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); len];
		for (i, inst) in self.insts.iter().enumerate() {
			if let Inst::Class { ranges, .. } = inst {
				if ranges.is_empty() || ranges.iter().any(|r| r.start > r.end) {
					return Err(Error::MalformedProgram {
						inst: i,
						reason: "class without a valid range".to_owned(),
					});
				}
			}
			for next in inst.successors() {
				if next >= len {
					return Err(Error::MalformedProgram {
						inst: i,
						reason: format!("successor {} out of bounds", next),
					});
				}
				predecessors[next].push(i);
			}
		}

		// Backward sweep from accept states
		let mut live = vec![false; len];
		let mut queue: VecDeque<usize> = VecDeque::new();
		for (i, inst) in self.insts.iter().enumerate() {
			if *inst == Inst::Match {
				live[i] = true;
				queue.push_back(i);
			}
		}
		while let Some(i) = queue.pop_front() {
			for &p in &predecessors[i] {
				if !live[p] {
					live[p] = true;
					queue.push_back(p);
				}
			}
		}

		if !live[self.start] {
			return Err(Error::EmptyLanguage);
		}

		// Forward sweep over live links only
		let mut seen = vec![false; len];
		let mut stack = vec![self.start];
		seen[self.start] = true;
		while let Some(i) = stack.pop() {
			if let Inst::Nop { .. } = self.insts[i] {
				return Err(Error::MalformedProgram {
					inst: i,
					reason: "structural pass-through reachable from start".to_owned(),
				});
			}
			for next in self.insts[i].successors() {
				if live[next] && !seen[next] {
					seen[next] = true;
					stack.push(next);
				}
			}
		}

		Ok(live)
	}
}
