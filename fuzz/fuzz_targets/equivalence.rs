//! libFuzzer front-end over the differential harness.
//!
//! The instruction under test is fixed for the whole campaign: set
//! `LOCKSTEP_INSTR` to a registered name (see `registry::all()`), or get
//! the first registered instruction by default. Pass `-measure_cycles` on
//! the command line to collect cycle samples instead of checking
//! equivalence.

#![no_main]

use std::sync::OnceLock;

use libfuzzer_sys::fuzz_target;
use lockstep_stubs::{TestDescriptor, registry};

static TARGET: OnceLock<&'static TestDescriptor> = OnceLock::new();

fn target() -> &'static TestDescriptor {
    TARGET.get_or_init(|| {
        lockstep_harness::init_from_args(std::env::args());
        let descriptor = match std::env::var("LOCKSTEP_INSTR") {
            Ok(name) => registry::find(&name).unwrap_or_else(|| {
                panic!(
                    "LOCKSTEP_INSTR={name:?} is not registered; known: {}",
                    registry::all()
                        .iter()
                        .map(|d| d.name)
                        .collect::<Vec<_>>()
                        .join(", "),
                )
            }),
            Err(_) => registry::all()[0],
        };
        log::info!("fuzzing instruction {}", descriptor.name);
        descriptor
    })
}

fuzz_target!(|data: &[u8]| {
    lockstep_harness::test_one_input(target(), data);
});
