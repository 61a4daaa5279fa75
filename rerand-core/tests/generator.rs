use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;

use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;

use rerand_core::program::{ClassRange, Inst, Program};
use rerand_core::{Error, Generator, GeneratorOptions};

fn seeded(pattern: &str, options: &GeneratorOptions, seed: u64) -> Generator {
	Generator::with_rng(pattern, options, StdRng::seed_from_u64(seed)).unwrap()
}

fn fixed(probability: f64) -> GeneratorOptions {
	let mut options = GeneratorOptions::new();
	options.set_probability(probability).unwrap();
	options
}

fn all_modes() -> Vec<GeneratorOptions> {
	vec![
		GeneratorOptions::new(),
		GeneratorOptions::distinct_runes(),
		fixed(0.5),
		fixed(0.9),
	]
}

fn histogram(generator: &Generator, draws: usize) -> HashMap<String, usize> {
	let mut counts = HashMap::new();
	for s in generator.iter().take(draws) {
		*counts.entry(s).or_insert(0) += 1;
	}
	counts
}

fn full_match(pattern: &str) -> Regex {
	Regex::new(&format!("^(?:{})$", pattern)).unwrap()
}

#[test]
fn small_language_is_uniform() {
	let generator = seeded("a[bc]d", &GeneratorOptions::new(), 1);
	let counts = histogram(&generator, 10_000);
	assert_eq!(counts.len(), 2);
	for s in ["abd", "acd"] {
		assert!((4_500..5_500).contains(&counts[s]), "{}: {}", s, counts[s]);
	}
}

#[test]
fn alternatives_of_different_length_are_uniform() {
	let generator = seeded("ab|cde|f(gg|hh)", &GeneratorOptions::new(), 2);
	let counts = histogram(&generator, 20_000);
	assert_eq!(counts.len(), 4);
	for (s, n) in &counts {
		assert!((4_500..5_500).contains(n), "{}: {}", s, n);
	}
}

#[test]
fn distinct_runes_weigh_classes_by_width() {
	// 26 strings on the left, one on the right
	let pattern = "[a-z]x|0y";
	let uniform = histogram(&seeded(pattern, &GeneratorOptions::new(), 3), 10_000);
	assert!((4_500..5_500).contains(&uniform["0y"]), "{}", uniform["0y"]);

	let options = GeneratorOptions::distinct_runes();
	let distinct = histogram(&seeded(pattern, &options, 3), 27_000);
	assert_eq!(distinct.len(), 27);
	for (s, n) in &distinct {
		assert!((700..1_300).contains(n), "{}: {}", s, n);
	}
}

#[test]
fn bounded_repetition_is_uniform_over_lengths() {
	let generator = seeded("x{0,3}", &GeneratorOptions::new(), 4);
	let counts = histogram(&generator, 20_000);
	assert_eq!(counts.len(), 4);
	for (s, n) in &counts {
		assert!((4_500..5_500).contains(n), "{:?}: {}", s, n);
	}
}

#[test]
fn unbounded_repetition_needs_fixed_probability() {
	for pattern in ["a*", "(ab)+c", "x{2,}"] {
		assert!(matches!(Generator::new(pattern), Err(Error::TooManyRepeat { .. })), "{}", pattern);
		assert!(matches!(Generator::new_distinct_runes(pattern), Err(Error::TooManyRepeat { .. })));
		assert!(Generator::new_with_probability(pattern, 0.5).is_ok());
	}
}

#[test]
fn certain_repetition_is_rejected() {
	// p = 1 never leaves a greedy loop, a p that rounds to 0 never leaves a lazy one
	assert!(matches!(Generator::new_with_probability("a*", 1.0), Err(Error::TooManyRepeat { .. })));
	assert!(matches!(Generator::new_with_probability("a*?", 1e-20), Err(Error::TooManyRepeat { .. })));

	let generator = seeded("a*?b", &fixed(1.0), 12);
	for s in generator.iter().take(100) {
		assert_eq!(s, "b");
	}
	let generator = seeded("(xy){0,3}", &fixed(1.0), 13);
	assert_eq!(generator.generate(), "xyxyxy");
}

#[test]
fn fixed_probability_terminates_with_varying_lengths() {
	let generator = seeded("a*", &fixed(0.5), 5);
	let mut lengths = HashSet::new();
	for s in generator.iter().take(10_000) {
		assert!(s.len() < 1_000);
		assert!(s.chars().all(|c| c == 'a'));
		lengths.insert(s.len());
	}
	assert!(lengths.len() > 5, "{:?}", lengths);
	assert!(lengths.contains(&0));
}

#[test]
fn fixed_probability_sets_the_continue_rate() {
	// Each repetition continues with p, so P(len == 0) is 1 - p
	let generator = seeded("a*", &fixed(0.25), 6);
	let empty = generator.iter().take(20_000).filter(String::is_empty).count();
	assert!((14_400..15_600).contains(&empty), "{}", empty);
}

#[test]
fn lazy_repetition_exits_on_the_primary_link() {
	let generator = seeded("a*?", &fixed(0.75), 7);
	let empty = generator.iter().take(20_000).filter(String::is_empty).count();
	assert!((14_400..15_600).contains(&empty), "{}", empty);
}

#[test]
fn generated_strings_match_the_pattern() {
	let patterns = [
		"a[bc]d",
		"ab|cde",
		r"\d{3}-\d{4}",
		"[a-zA-Z_][a-zA-Z0-9_]{0,7}",
		"(foo|bar)?baz{1,3}",
		r"[^\n]{5}",
		".{4}",
		"(?s).{4}",
		"(?i)hello",
		r"\w+@example\.(com|org)",
		"^anchored$",
		"[α-ω]{2}[😀-😂]",
		"",
		"(a|b)*c",
		"x+y?z*",
	];
	for pattern in patterns {
		let matcher = full_match(pattern);
		for (mode, options) in all_modes().iter().enumerate() {
			let generator = match Generator::with_rng(pattern, options, StdRng::seed_from_u64(mode as u64)) {
				Ok(generator) => generator,
				Err(Error::TooManyRepeat { .. }) if options.probability().is_none() => continue,
				Err(e) => panic!("{}: {}", pattern, e),
			};
			for s in generator.iter().take(200) {
				assert!(matcher.is_match(&s), "{:?} does not match {:?} (mode {})", s, pattern, mode);
			}
		}
	}
}

#[test]
fn concurrent_generation_on_one_instance() {
	let generator = Arc::new(seeded("[a-f]{8}-(x|yy|zzz)", &GeneratorOptions::new(), 8));
	let matcher = full_match(generator.pattern());

	let handles: Vec<_> = (0..16)
		.map(|_| {
			let generator = Arc::clone(&generator);
			thread::spawn(move || generator.iter().take(2_000).collect::<Vec<_>>())
		})
		.collect();

	let mut total = 0;
	for handle in handles {
		let strings = handle.join().unwrap();
		for s in &strings {
			assert!(matcher.is_match(s), "corrupted output {:?}", s);
		}
		total += strings.len();
	}
	assert_eq!(total, 32_000);
}

#[test]
fn concurrent_generation_with_cycles() {
	let generator = seeded("(ab|c)*d", &fixed(0.5), 9);
	let matcher = full_match(generator.pattern());
	thread::scope(|scope| {
		for _ in 0..8 {
			scope.spawn(|| {
				for s in generator.iter().take(1_000) {
					assert!(matcher.is_match(&s), "{:?}", s);
				}
			});
		}
	});
}

#[test]
fn pattern_accessor_is_verbatim() {
	for pattern in ["a[bc]d", "  spaced  ", r"(?x) a b # comment", "\\\\"] {
		let options = GeneratorOptions::new();
		let generator = Generator::with_options(pattern, &options).unwrap();
		assert_eq!(generator.pattern(), pattern);
		assert_eq!(format!("{}", generator), pattern);
	}
}

#[test]
fn externally_compiled_program_from_json() {
	let program = Program {
		insts: vec![
			Inst::Fail,
			Inst::Match,
			Inst::Class { ranges: vec![ClassRange::new('0', '1'), ClassRange::new('5', '5')], next: 1 },
			Inst::Char { ch: 'n', next: 2 },
		],
		start: 3,
	};
	let json = serde_json::to_string(&program).unwrap();
	let program: Program = serde_json::from_str(&json).unwrap();

	let generator = Generator::from_program("n[015]", program, &GeneratorOptions::new(), StdRng::seed_from_u64(10)).unwrap();
	let counts = histogram(&generator, 30_000);
	assert_eq!(counts.len(), 3);
	for s in ["n0", "n1", "n5"] {
		assert!((9_400..10_600).contains(&counts[s]), "{}: {}", s, counts[s]);
	}
}

#[test]
fn huge_languages_use_arbitrary_precision_weights() {
	// 26^20 strings on one side, one on the other: "b" is practically never drawn
	let options = GeneratorOptions::distinct_runes();
	let generator = seeded("[a-z]{20}|b", &options, 11);
	for s in generator.iter().take(1_000) {
		assert_eq!(s.len(), 20);
	}
}

/// Small regexes over a tiny alphabet, without unbounded repetition.
fn finite_regex() -> impl Strategy<Value = String> {
	let leaf = prop_oneof![
		"[a-c]",
		Just("[a-c]".to_owned()),
		Just("[^a-y]".to_owned()),
		Just(r"\d".to_owned()),
	];
	leaf.prop_recursive(4, 24, 3, |inner| {
		prop_oneof![
			(inner.clone(), inner.clone()).prop_map(|(l, r)| format!("{}{}", l, r)),
			(inner.clone(), inner.clone()).prop_map(|(l, r)| format!("(?:{})|(?:{})", l, r)),
			inner.clone().prop_map(|r| format!("(?:{})?", r)),
			(inner, 0u32..3, 0u32..3).prop_map(|(r, min, extra)| format!("(?:{}){{{},{}}}", r, min, min + extra)),
		]
	})
}

proptest! {
	#![proptest_config(ProptestConfig::with_cases(64))]

	#[test]
	fn finite_patterns_round_trip(pattern in finite_regex(), seed in any::<u64>()) {
		let matcher = full_match(&pattern);
		for options in all_modes() {
			let generator = Generator::with_rng(&pattern, &options, StdRng::seed_from_u64(seed)).unwrap();
			for s in generator.iter().take(20) {
				prop_assert!(matcher.is_match(&s), "{:?} does not match {:?}", s, pattern);
			}
		}
	}
}
