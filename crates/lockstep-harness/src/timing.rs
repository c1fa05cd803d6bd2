//! Cycle-sample storage for measurement mode.
//!
//! Samples arrive in pairs, one per variant per invocation, and are only
//! read back at process exit: the registered hook drains them to stdout as
//! a two-column CSV (`orig,transformed` header, one decimal line per
//! invocation). Storage is allocated lazily on the first recorded pair and
//! grows geometrically from an initial capacity sized for typical fuzzing
//! campaigns.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

/// Initial per-variant sample capacity.
const INITIAL_SAMPLE_CAPACITY: usize = 10_000;

/// Paired cycle samples; index `i` of both vectors belongs to invocation
/// `i`.
struct SamplePairs {
    orig: Vec<u64>,
    trans: Vec<u64>,
}

static SAMPLES: Mutex<Option<SamplePairs>> = Mutex::new(None);

/// Appends one pair of cycle counts, allocating the store and registering
/// the exit-time printer on first use.
pub(crate) fn record(orig_cycles: u64, trans_cycles: u64) {
    let mut guard = SAMPLES.lock().unwrap_or_else(PoisonError::into_inner);
    let samples = guard.get_or_insert_with(|| {
        // SAFETY: `emit_csv_at_exit` is a plain extern "C" fn with no
        // arguments; registering it with atexit is the documented use.
        let rc = unsafe { libc::atexit(emit_csv_at_exit) };
        assert_eq!(rc, 0, "could not register the cycle-sample printer");
        log::debug!("cycle-sample store allocated ({INITIAL_SAMPLE_CAPACITY} pairs)");
        SamplePairs {
            orig: Vec::with_capacity(INITIAL_SAMPLE_CAPACITY),
            trans: Vec::with_capacity(INITIAL_SAMPLE_CAPACITY),
        }
    });
    samples.orig.push(orig_cycles);
    samples.trans.push(trans_cycles);
}

/// Number of recorded pairs. Diagnostic accessor for the runner summary.
pub(crate) fn recorded_pairs() -> usize {
    SAMPLES
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .as_ref()
        .map_or(0, |s| s.orig.len())
}

extern "C" fn emit_csv_at_exit() {
    let guard = SAMPLES.lock().unwrap_or_else(PoisonError::into_inner);
    let Some(samples) = guard.as_ref() else {
        return;
    };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let _ = writeln!(out, "orig,transformed");
    for (orig, trans) in samples.orig.iter().zip(&samples.trans) {
        let _ = writeln!(out, "{orig},{trans}");
    }
    let _ = out.flush();
}
