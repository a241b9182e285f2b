//! Time construction and sampling of one sampler on a `.dist` file.
//!
//! ```text
//! cargo run --release --example dist -- aldr.flat path/to/file.dist
//! ```
//!
//! Samplers: `aldr.flat`, `fldr.flat`, `aldr.enc`, `fldr.enc`, `alias`.
//! Append `.osrng` to draw bits from the OS instead of the thread RNG.
//!
//! Prints `<sum>c <cold build s> <warm build s> <s per sample> <bits per
//! sample> <bytes>`.

use std::error::Error;
use std::time::Instant;

use exactdraw::{AliasTable, Depth, FlatTree, Flipper, LinkedTree, WeightError};
use log::info;
use rand::RngCore;

const SAMPLES: usize = 10_000_000;
const WARM_BUILDS: u32 = 1000;

/// Whitespace-separated: an unused integer, then `n`, then `n` weights.
fn parse_dist(text: &str) -> Result<Vec<u32>, Box<dyn Error>> {
    let mut fields = text.split_whitespace();
    fields.next().ok_or("missing header")?;
    let n: usize = fields.next().ok_or("missing length")?.parse()?;
    let weights = fields
        .take(n)
        .map(str::parse)
        .collect::<Result<Vec<u32>, _>>()?;
    if weights.len() != n {
        return Err(format!("expected {n} weights, found {}", weights.len()).into());
    }
    Ok(weights)
}

struct Report {
    sum: usize,
    cold: f64,
    warm: f64,
    per_sample: f64,
    bits: f64,
    bytes: usize,
}

fn run<S, R: RngCore>(
    weights: &[u32],
    build: impl Fn(&[u32]) -> Result<S, WeightError>,
    sample: impl Fn(&S, &mut Flipper<R>) -> usize,
    bytes: impl Fn(&S) -> usize,
    bits: &mut Flipper<R>,
) -> Result<Report, WeightError> {
    let start = Instant::now();
    let mut sampler = build(weights)?;
    let cold = start.elapsed().as_secs_f64();

    let start = Instant::now();
    for _ in 0..WARM_BUILDS {
        drop(sampler);
        sampler = build(weights)?;
    }
    let warm = start.elapsed().as_secs_f64() / f64::from(WARM_BUILDS);

    bits.reset_counters();
    let mut sum = 0usize;
    let start = Instant::now();
    for _ in 0..SAMPLES {
        sum = sum.wrapping_add(sample(&sampler, bits));
    }
    let per_sample = start.elapsed().as_secs_f64() / SAMPLES as f64;

    Ok(Report {
        sum,
        cold,
        warm,
        per_sample,
        bits: bits.bits_consumed() as f64 / SAMPLES as f64,
        bytes: bytes(&sampler),
    })
}

fn dispatch<R: RngCore>(
    name: &str,
    weights: &[u32],
    bits: &mut Flipper<R>,
) -> Result<Report, Box<dyn Error>> {
    let report = match name {
        "aldr.flat" | "fldr.flat" => {
            let depth = if name.starts_with('a') { Depth::Aldr } else { Depth::Fldr };
            run(
                weights,
                |w| FlatTree::new(w, depth),
                |s, b| s.sample_index(b),
                FlatTree::bytes,
                bits,
            )?
        }
        "aldr.enc" | "fldr.enc" => {
            let depth = if name.starts_with('a') { Depth::Aldr } else { Depth::Fldr };
            run(
                weights,
                |w| LinkedTree::new(w, depth),
                |s, b| s.sample_index(b),
                LinkedTree::bytes,
                bits,
            )?
        }
        "alias" => run(
            weights,
            AliasTable::new,
            |s, b| s.sample_index(b),
            AliasTable::bytes,
            bits,
        )?,
        other => return Err(format!("unknown sampler {other}").into()),
    };
    Ok(report)
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("usage: {} <sampler> <file.dist>", args[0]);
        std::process::exit(2);
    }
    let weights = parse_dist(&std::fs::read_to_string(&args[2])?)?;
    info!("loaded {} weights from {}", weights.len(), args[2]);

    let report = match args[1].strip_suffix(".osrng") {
        Some(name) => dispatch(name, &weights, &mut Flipper::os())?,
        None => dispatch(&args[1], &weights, &mut Flipper::from_thread_rng())?,
    };

    println!(
        "{}c {:.9} {:.12} {:.15} {:.8} {}",
        report.sum, report.cold, report.warm, report.per_sample, report.bits, report.bytes
    );
    Ok(())
}
