use regex_syntax::ParserBuilder;
use regex_syntax::hir::{Class, Hir, HirKind, Look, Repetition};

use crate::error::CompileError;
use super::{ClassRange, Inst, Program};

/// Index of the dead-end instruction every compiled program starts with.
const FAIL: usize = 0;
/// Index of the single accept instruction.
const MATCH: usize = 1;
/// Upper bound on program size. Bounded repetition is expanded by copying,
/// so nested counters multiply.
pub const MAX_INSTS: usize = 1 << 20;

/// Parser flags forwarded to `regex_syntax::ParserBuilder`.
///
/// Defaults match `regex-syntax`: Unicode mode on, everything else off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseFlags {
	/// `(?i)`
	pub case_insensitive: bool,
	/// `(?m)`
	pub multi_line: bool,
	/// `(?s)`
	pub dot_matches_new_line: bool,
	/// `(?U)`
	pub swap_greed: bool,
	/// `(?x)`
	pub ignore_whitespace: bool,
	/// `(?u)`
	pub unicode: bool,
}

impl Default for ParseFlags {
	fn default() -> Self {
		Self {
			case_insensitive: false,
			multi_line: false,
			dot_matches_new_line: false,
			swap_greed: false,
			ignore_whitespace: false,
			unicode: true,
		}
	}
}

/// Parses `pattern` and lowers it into a `Program`.
///
/// # Layout
/// - instruction 0 is a dead end, instruction 1 the only accept state
/// - the program is built back to front, each node compiled with its
///   continuation already known, so no placeholder links survive
///
/// # Errors
/// - `CompileError::Parse` for syntax errors
/// - `CompileError::Unsupported` for assertions that are not a leading start
///   anchor or a trailing end anchor
/// - `CompileError::TooLarge` when expansion needs more than `MAX_INSTS`
///   instructions
pub fn compile(pattern: &str, flags: &ParseFlags) -> Result<Program, CompileError> {
	let hir = ParserBuilder::new()
		.case_insensitive(flags.case_insensitive)
		.multi_line(flags.multi_line)
		.dot_matches_new_line(flags.dot_matches_new_line)
		.swap_greed(flags.swap_greed)
		.ignore_whitespace(flags.ignore_whitespace)
		.unicode(flags.unicode)
		.build()
		.parse(pattern)?;

	let mut compiler = Compiler { insts: vec![Inst::Fail, Inst::Match] };
	let start = compiler.node(&hir, MATCH, true, true)?;
	Ok(Program { insts: compiler.insts, start })
}

struct Compiler {
	insts: Vec<Inst>,
}

impl Compiler {
	fn push(&mut self, inst: Inst) -> Result<usize, CompileError> {
		if self.insts.len() >= MAX_INSTS {
			return Err(CompileError::TooLarge { limit: MAX_INSTS });
		}
		self.insts.push(inst);
		Ok(self.insts.len() - 1)
	}

	/// Compiles `hir` so that it continues into `next` and returns its entry.
	///
	/// `at_start` / `at_end` tell whether nothing can be emitted before / after
	/// this node, which is where anchors are allowed.
	fn node(&mut self, hir: &Hir, next: usize, at_start: bool, at_end: bool) -> Result<usize, CompileError> {
		match hir.kind() {
			HirKind::Empty => Ok(next),
			HirKind::Literal(literal) => {
				let text = std::str::from_utf8(&literal.0)
					.map_err(|_| CompileError::Unsupported("literal is not valid UTF-8".to_owned()))?;
				let mut entry = next;
				for ch in text.chars().rev() {
					entry = self.push(Inst::Char { ch, next: entry })?;
				}
				Ok(entry)
			}
			HirKind::Class(class) => self.class(class, next),
			HirKind::Look(look) => {
				if (at_start && is_start_anchor(look)) || (at_end && is_end_anchor(look)) {
					Ok(next)
				} else {
					Err(CompileError::Unsupported(format!("look-around assertion {:?}", look)))
				}
			}
			HirKind::Repetition(repetition) => self.repetition(repetition, next),
			HirKind::Capture(capture) => {
				let close = self.push(Inst::Group { next })?;
				let body = self.node(&capture.sub, close, at_start, at_end)?;
				self.push(Inst::Group { next: body })
			}
			HirKind::Concat(subs) => {
				let mut entry = next;
				for (i, sub) in subs.iter().enumerate().rev() {
					let sub_start = at_start && subs[..i].iter().all(is_look);
					let sub_end = at_end && subs[i + 1..].iter().all(is_look);
					entry = self.node(sub, entry, sub_start, sub_end)?;
				}
				Ok(entry)
			}
			HirKind::Alternation(subs) => {
				// a|b|c becomes split(a, split(b, c))
				let Some((last, rest)) = subs.split_last() else {
					return Ok(next);
				};
				let mut entry = self.node(last, next, at_start, at_end)?;
				for sub in rest.iter().rev() {
					let primary = self.node(sub, next, at_start, at_end)?;
					entry = self.push(Inst::Split { primary, alternate: entry })?;
				}
				Ok(entry)
			}
		}
	}

	fn class(&mut self, class: &Class, next: usize) -> Result<usize, CompileError> {
		let ranges: Vec<ClassRange> = match class {
			Class::Unicode(class) => class
				.ranges()
				.iter()
				.map(|r| ClassRange::new(r.start(), r.end()))
				.collect(),
			Class::Bytes(class) => {
				if class.ranges().iter().any(|r| !r.end().is_ascii()) {
					return Err(CompileError::Unsupported("non-ASCII byte class".to_owned()));
				}
				class
					.ranges()
					.iter()
					.map(|r| ClassRange::new(char::from(r.start()), char::from(r.end())))
					.collect()
			}
		};

		let inst = if ranges.is_empty() {
			return Ok(FAIL);
		} else if ranges.len() == 1 && ranges[0].start == ranges[0].end {
			Inst::Char { ch: ranges[0].start, next }
		} else if ranges == [ClassRange::new('\0', char::MAX)] {
			Inst::AnyChar { next }
		} else if ranges == [ClassRange::new('\0', '\t'), ClassRange::new('\u{b}', char::MAX)] {
			Inst::AnyCharNotNl { next }
		} else {
			Inst::Class { ranges, next }
		};
		self.push(inst)
	}

	/// `x{n,}` is `n` copies followed by a loop, `x{n,m}` is `n` copies followed
	/// by `m-n` nested optionals `(x(x)?)?`, which gives each string one path.
	fn repetition(&mut self, repetition: &Repetition, next: usize) -> Result<usize, CompileError> {
		let sub = &repetition.sub;
		let mut entry = match repetition.max {
			None => {
				let loop_split = self.push(Inst::Split { primary: FAIL, alternate: FAIL })?;
				let body = self.node(sub, loop_split, false, false)?;
				self.insts[loop_split] = split(repetition.greedy, body, next);
				loop_split
			}
			Some(max) => {
				let mut entry = next;
				for _ in repetition.min..max {
					let body = self.node(sub, entry, false, false)?;
					entry = self.push(split(repetition.greedy, body, next))?;
				}
				entry
			}
		};
		for _ in 0..repetition.min {
			entry = self.node(sub, entry, false, false)?;
		}
		Ok(entry)
	}

}

/// Greedy repetitions continue on the primary link, lazy ones exit on it.
fn split(greedy: bool, body: usize, exit: usize) -> Inst {
	if greedy {
		Inst::Split { primary: body, alternate: exit }
	} else {
		Inst::Split { primary: exit, alternate: body }
	}
}

fn is_look(hir: &Hir) -> bool {
	matches!(hir.kind(), HirKind::Look(_))
}

fn is_start_anchor(look: &Look) -> bool {
	matches!(look, Look::Start | Look::StartLF | Look::StartCRLF)
}

fn is_end_anchor(look: &Look) -> bool {
	matches!(look, Look::End | Look::EndLF | Look::EndCRLF)
}
