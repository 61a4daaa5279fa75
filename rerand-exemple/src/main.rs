use std::sync::Arc;
use std::thread;

use rerand_core::{Error, Generator, GeneratorOptions};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows how each pattern was compiled and weighted
    env_logger::init();

    // Combinatorial mode: every distinct string is equally likely
    // Here "abd" and "acd" each come out half of the time
    let generator = Generator::new("a[bc]d")?;
    for i in 0..5 {
        println!("{} #{}: {}", generator, i + 1, generator.generate());
    }

    // By default a class counts as a single choice: "[0-9]" and "xx" are
    // equally likely. With distinct runes, every digit weighs as much as "xx"
    let plain = Generator::new("[0-9]|xx")?;
    let distinct = Generator::new_distinct_runes("[0-9]|xx")?;
    let count_xx = |g: &Generator| g.iter().take(1_000).filter(|s| s == "xx").count();
    println!("'xx' drawn {} / 1000 times (class as one choice)", count_xx(&plain));
    println!("'xx' drawn {} / 1000 times (distinct runes)", count_xx(&distinct));

    // Unbounded repetition cannot be weighted uniformly
    match Generator::new("[a-z]+") {
        Ok(_) => println!("Should not happen"),
        Err(Error::TooManyRepeat { .. }) => println!("'[a-z]+' needs a fixed probability"),
        Err(e) => return Err(e.into()),
    }

    // Fixed probability: each repetition continues with 0.8
    // Case-insensitive parsing is set through the parser flags
    let mut options = GeneratorOptions::new();
    options.set_probability(0.8)?;
    options.flags.case_insensitive = true;
    let generator = Arc::new(Generator::with_options("[a-z]+@example\\.(com|org)", &options)?);

    // One shared generator, one worker per CPU
    let workers: Vec<_> = (0..num_cpus::get())
        .map(|worker| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || (worker, generator.generate()))
        })
        .collect();
    for handle in workers {
        let (worker, email) = handle.join().map_err(|_| "worker panicked")?;
        println!("worker {}: {}", worker, email);
    }

    // Invalid probabilities are rejected
    match options.set_probability(2.0) {
        Ok(_) => println!("Should not happen"),
        Err(_) => println!("Probability 2.0 is invalid, must be between 0.0 and 1.0"),
    }

    Ok(())
}
