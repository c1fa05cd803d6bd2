//! Differential equivalence harness.
//!
//! Drives an original/transformed stub pair in lockstep over one fuzzer
//! input: decode the buffer, stage the memory scratch slots, substitute
//! pointers for `MEM` operands, invoke both stubs under identical register,
//! flag, and vector state, then compare the two captures field by field.
//!
//! # Entry points
//!
//! - [`init_from_args`] — one-time setup; scans the argument list for
//!   `-measure_cycles` and initializes logging.
//! - [`test_one_input`] — one fuzzing iteration. Returns `0` when the input
//!   was executed, `-1` when it was too short to decode. In equivalence
//!   mode a divergence prints diagnostics and panics; in cycle-measurement
//!   mode both cycle counts are appended to the sample store instead, and a
//!   two-column CSV is emitted on stdout at process exit.
//!
//! The standalone `lockstep` binary wraps the same core in a seeded random
//! driver; fuzzing engines reach it through the `fuzz/` crate. Either way
//! the per-iteration flow is identical.
//!
//! # Concurrency
//!
//! None. The capture buffers and scratch slots are process-wide statics
//! written through RDI by stub assembly; everything here assumes the single
//! fuzzing thread and re-initializes those statics at each iteration.

pub mod args;
pub mod check;
#[cfg(target_arch = "x86_64")]
mod driver;
#[cfg(target_arch = "x86_64")]
mod invoke;
#[cfg(target_arch = "x86_64")]
mod state;
#[cfg(target_arch = "x86_64")]
mod timing;

pub use args::RunnerArgs;
pub use check::Verdict;
#[cfg(target_arch = "x86_64")]
pub use driver::{init_from_args, measure_cycles_enabled, recorded_cycle_pairs, test_one_input};

/// Seed for the standalone driver's PRNG. Fixed so runs are reproducible.
pub const DRIVER_SEED: u64 = 172_812;
