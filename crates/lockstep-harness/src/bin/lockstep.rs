//! Standalone seeded driver.
//!
//! Runs the same per-iteration core as the fuzzer front-end, but generates
//! inputs itself from a fixed-seed PRNG so a run is reproducible without an
//! engine or a corpus:
//!
//! ```text
//! lockstep -runs=100000 -max_len=224 [-measure_cycles] [FILTER]
//! ```

use anyhow::{Result, bail};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

use lockstep_harness::{DRIVER_SEED, RunnerArgs};
use lockstep_stubs::registry;
use lockstep_tsc::read_tsc;

fn main() -> Result<()> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    lockstep_harness::init_from_args(argv.iter());
    let args = RunnerArgs::parse(argv.iter().map(String::as_str))?;

    let descriptors: Vec<_> = registry::all()
        .iter()
        .copied()
        .filter(|d| args.matches(d.name))
        .collect();
    if descriptors.is_empty() {
        bail!(
            "no instruction matches {:?}; known: {}",
            args.filter.as_deref().unwrap_or(""),
            registry::all()
                .iter()
                .map(|d| d.name)
                .collect::<Vec<_>>()
                .join(", "),
        );
    }
    log::info!(
        "running {} inputs over {} instruction(s), {} bytes each",
        args.runs,
        descriptors.len(),
        args.max_len,
    );

    let mut rng = StdRng::seed_from_u64(DRIVER_SEED);
    let mut buf = vec![0u8; args.max_len];

    let start = read_tsc();
    let mut executed = 0u64;
    for _ in 0..args.runs {
        rng.fill_bytes(&mut buf);
        for descriptor in &descriptors {
            if lockstep_harness::test_one_input(descriptor, &buf) == 0 {
                executed += 1;
            }
        }
    }
    let elapsed = read_tsc().saturating_sub(start);

    log::info!("{executed} invocations completed in {elapsed} cycles");
    if args.measure_cycles {
        log::info!(
            "{} cycle-sample pairs collected; CSV follows on exit",
            lockstep_harness::recorded_cycle_pairs(),
        );
    }
    Ok(())
}
