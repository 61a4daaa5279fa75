use std::fmt;

use log::{debug, error};
use rand::Rng;
use rand::rngs::StdRng;

use crate::error::Error;
use crate::program::{self, Inst, Program};
use super::alias::RuneSampler;
use super::options::GeneratorOptions;
use super::pool::BufferPool;
use super::shared_rng::SharedRng;
use super::weight::{self, BranchWeight, Weighting};

/// Executable form of one instruction.
///
/// Character classes and "any character" instructions share the same alias
/// sampler path.
#[derive(Debug)]
enum Step {
	Fail,
	Nop,
	Sample { sampler: RuneSampler, next: usize },
	Char { ch: char, next: usize },
	Split { weight: BranchWeight, primary: usize, alternate: usize },
	Group { next: usize },
	Match,
}

/// Random string generator for a regular expression.
///
/// # Responsibilities
/// - Compile the pattern (or take an already compiled `Program`)
/// - Check the automaton and weigh every branch once, at construction
/// - Walk the automaton on each call to `generate`
///
/// # Concurrency
/// `generate` takes `&self` and can be called from many threads at once. The
/// random source is the only shared mutable state; it is locked for each draw,
/// never for a whole generation.
///
/// # Termination
/// In combinatorial mode the automaton is acyclic and every generation stops.
/// In fixed-probability mode a pattern with unbounded repetition stops only
/// with probability 1: no length or time bound exists for a single call.
#[derive(Debug)]
pub struct Generator<R = StdRng> {
	pattern: String,
	program: Program,
	steps: Vec<Step>,
	rng: SharedRng<R>,
	buffers: BufferPool,
}

impl Generator<StdRng> {
	/// Creates a generator in combinatorial mode, a class counting as one string.
	///
	/// # Errors
	/// - `Error::Compile` if the pattern does not compile
	/// - `Error::TooManyRepeat` if the pattern has unbounded repetition
	pub fn new(pattern: &str) -> Result<Self, Error> {
		Self::with_options(pattern, &GeneratorOptions::new())
	}

	/// Creates a generator in combinatorial mode, every code point of a class
	/// counting as a distinct string.
	pub fn new_distinct_runes(pattern: &str) -> Result<Self, Error> {
		let options = GeneratorOptions::distinct_runes();
		Self::with_options(pattern, &options)
	}

	/// Creates a generator in fixed-probability mode.
	///
	/// Each branch takes its primary link with `probability`; with `0.0` the
	/// generator falls back to combinatorial mode.
	pub fn new_with_probability(pattern: &str, probability: f64) -> Result<Self, Error> {
		let mut options = GeneratorOptions::new();
		options.set_probability(probability)?;
		Self::with_options(pattern, &options)
	}

	/// Creates a generator seeded from the current time.
	pub fn with_options(pattern: &str, options: &GeneratorOptions) -> Result<Self, Error> {
		let program = program::compile(pattern, &options.flags)?;
		Self::build(pattern, program, options, SharedRng::from_time())
	}
}

impl<R: Rng> Generator<R> {
	/// Creates a generator drawing from `rng`.
	///
	/// A seeded `rng` makes single-threaded generation reproducible.
	pub fn with_rng(pattern: &str, options: &GeneratorOptions, rng: R) -> Result<Self, Error> {
		let program = program::compile(pattern, &options.flags)?;
		Self::build(pattern, program, options, SharedRng::new(rng))
	}

	/// Creates a generator from an automaton compiled elsewhere.
	///
	/// `pattern` is only kept for diagnostics. `options.flags` is ignored.
	///
	/// # Errors
	/// - `Error::MalformedProgram` / `Error::EmptyLanguage` if the automaton
	///   breaks its contract
	/// - `Error::TooManyRepeat` in combinatorial mode on a cyclic automaton
	pub fn from_program(pattern: &str, program: Program, options: &GeneratorOptions, rng: R) -> Result<Self, Error> {
		Self::build(pattern, program, options, SharedRng::new(rng))
	}

	fn build(pattern: &str, program: Program, options: &GeneratorOptions, rng: SharedRng<R>) -> Result<Self, Error> {
		let live = program.validate()?;
		let weighting = options.weighting();
		let weights = weight::compile_weights(&program, weighting, &live)?;

		let steps = program
			.insts
			.iter()
			.zip(weights)
			.map(|(inst, weight)| match (inst, weight) {
				(Inst::Fail, _) => Step::Fail,
				(Inst::Nop { .. }, _) => Step::Nop,
				(Inst::Class { ranges, next }, _) => Step::Sample { sampler: RuneSampler::new(ranges), next: *next },
				(Inst::Char { ch, next }, _) => Step::Char { ch: *ch, next: *next },
				(Inst::AnyChar { next }, _) => Step::Sample {
					sampler: RuneSampler::new(&program::any_char_ranges()),
					next: *next,
				},
				(Inst::AnyCharNotNl { next }, _) => Step::Sample {
					sampler: RuneSampler::new(&program::any_char_not_nl_ranges()),
					next: *next,
				},
				(Inst::Split { primary, alternate }, Some(weight)) => Step::Split {
					weight,
					primary: *primary,
					alternate: *alternate,
				},
				(Inst::Split { .. }, None) => {
					error!("{:?}: no weight computed for split {:?}", pattern, inst);
					panic!("rerand: unweighted split {:?}", inst);
				}
				(Inst::Group { next }, _) => Step::Group { next: *next },
				(Inst::Match, _) => Step::Match,
			})
			.collect();

		debug!(
			"compiled {:?}: {} instructions, {}",
			pattern,
			program.insts.len(),
			match weighting {
				Weighting::Combinatorial { distinct_runes: true } => "uniform over distinct code points",
				Weighting::Combinatorial { distinct_runes: false } => "uniform over class choices",
				Weighting::Fixed { .. } => "fixed branch probability",
			}
		);

		Ok(Self {
			pattern: pattern.to_owned(),
			program,
			steps,
			rng,
			buffers: BufferPool::default(),
		})
	}

	/// Returns the pattern text exactly as given at construction.
	pub fn pattern(&self) -> &str {
		&self.pattern
	}

	/// Returns the automaton being walked.
	pub fn program(&self) -> &Program {
		&self.program
	}

	/// Generates one string matching the pattern.
	///
	/// # Panics
	/// Only if the walk reaches a dead end or a structural pass-through, which
	/// construction-time validation rules out.
	pub fn generate(&self) -> String {
		let mut pc = self.program.start;
		let mut out = self.buffers.take();

		loop {
			match &self.steps[pc] {
				Step::Sample { sampler, next } => {
					out.push(sampler.sample(&self.rng));
					pc = *next;
				}
				Step::Char { ch, next } => {
					out.push(*ch);
					pc = *next;
				}
				Step::Split { weight, primary, alternate } => {
					pc = if self.rng.draw(|rng| weight.decide(rng)) { *primary } else { *alternate };
				}
				Step::Group { next } => pc = *next,
				Step::Match => {
					let result = out.as_str().to_owned();
					self.buffers.give(out);
					return result;
				}
				step @ (Step::Fail | Step::Nop) => {
					error!("{:?}: reached {:?} at instruction {}", self.pattern, step, pc);
					panic!("rerand: bad operation {:?} at instruction {}", step, pc);
				}
			}
		}
	}

	/// Endless iterator over generated strings.
	pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
		std::iter::repeat_with(move || self.generate())
	}
}

impl<R> fmt::Display for Generator<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.pattern)
	}
}
