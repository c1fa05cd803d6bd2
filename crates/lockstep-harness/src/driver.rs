//! Per-iteration orchestration.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use lockstep_abi::{InputState, NUM_GPR_ARGS, OutState};
use lockstep_stubs::TestDescriptor;

use crate::check::{self, Verdict};
use crate::invoke::invoke_stub;
use crate::state::{
    ORIG_MEMORY_ARGS, ORIGINAL_STATE, ScratchSlots, TRANS_MEMORY_ARGS, TRANSFORMED_STATE,
};
use crate::timing;

/// Whether mismatches are recorded as cycle samples instead of aborting.
static MEASURE_CYCLES: AtomicBool = AtomicBool::new(false);

/// One-time setup: scans the argument list for `-measure_cycles` and
/// initializes logging. Always returns 0 so fuzzing engines that forward
/// the value treat it as success.
pub fn init_from_args<I, S>(args: I) -> i32
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let _ = env_logger::try_init();
    let measure = args.into_iter().any(|arg| arg.as_ref() == "-measure_cycles");
    MEASURE_CYCLES.store(measure, Ordering::Relaxed);
    if measure {
        log::info!("cycle measurement enabled; mismatches will be recorded, not fatal");
    }
    0
}

/// True when `-measure_cycles` was seen by [`init_from_args`].
#[must_use]
pub fn measure_cycles_enabled() -> bool {
    MEASURE_CYCLES.load(Ordering::Relaxed)
}

/// Runs one fuzzing iteration of `descriptor` over `data`.
///
/// Returns `0` when the input was executed and `-1` when it was shorter
/// than [`lockstep_abi::INPUT_STATE_SIZE`] (the iteration has no other side
/// effects in that case). In equivalence mode a divergence prints the mismatching
/// state and the input that produced it, then panics; in cycle-measurement
/// mode both variants' cycle counts are appended to the sample store.
///
/// # Panics
///
/// Panics on divergence in equivalence mode, and if a capture buffer ever
/// loses its 16-byte alignment (a programmer error, checked every
/// iteration because the stub assembly depends on it).
pub fn test_one_input(descriptor: &TestDescriptor, data: &[u8]) -> i32 {
    let Some(input) = InputState::parse(data) else {
        return -1;
    };

    let original_state = ORIGINAL_STATE.get();
    let transformed_state = TRANSFORMED_STATE.get();
    assert_eq!(original_state as usize % 16, 0, "capture buffer misaligned");
    assert_eq!(transformed_state as usize % 16, 0, "capture buffer misaligned");

    let orig_scratch = ORIG_MEMORY_ARGS.get();
    let trans_scratch = TRANS_MEMORY_ARGS.get();

    // SAFETY: the statics are only touched from this single-threaded path
    // (see `SyncStateCell`); no references to them outlive this function.
    unsafe {
        original_state.write(OutState::ZERO);
        transformed_state.write(OutState::ZERO);
        (*orig_scratch).0 = input.scratch;
        (*trans_scratch).0 = input.scratch;
    }

    // Substitute scratch-slot addresses for MEM operand positions. The two
    // variants get disjoint slots with identical contents, so any observable
    // difference comes from the transformation alone.
    let mut orig_args = input.gprs;
    let mut trans_args = input.gprs;
    for pos in 0..NUM_GPR_ARGS {
        if descriptor.metadata.is_mem(pos) {
            // SAFETY: `pos` indexes a valid slot of the scratch statics.
            unsafe {
                orig_args[pos] = ScratchSlots::slot_addr(orig_scratch, pos);
                trans_args[pos] = ScratchSlots::slot_addr(trans_scratch, pos);
            }
        }
    }

    let lanes = input.vec_lanes;

    // SAFETY: capture buffers are valid and aligned (asserted above), MEM
    // positions hold scratch addresses, and `lanes` provides all eight
    // vector inputs. The same lane pointer and flag byte go to both
    // variants.
    unsafe {
        invoke_stub(
            descriptor.original,
            original_state,
            &orig_args,
            lanes.as_ptr(),
            input.lahf_in,
        );
        invoke_stub(
            descriptor.transformed,
            transformed_state,
            &trans_args,
            lanes.as_ptr(),
            input.lahf_in,
        );
    }

    if measure_cycles_enabled() {
        // Timing perturbs the captured state, so equivalence is not
        // re-checked here; divergence hunting is the other mode's job.
        let (orig_cycles, trans_cycles) =
            // SAFETY: single-threaded access as above.
            unsafe { ((*original_state).cyclecount, (*transformed_state).cyclecount) };
        timing::record(orig_cycles, trans_cycles);
        return 0;
    }

    // SAFETY: single-threaded access; MEM-position registers hold the
    // scratch addresses installed above.
    let verdict = unsafe {
        check::check_outstates_equivalent(
            &descriptor.metadata,
            &*original_state,
            &*transformed_state,
            input.lahf_in,
        )
    };

    if verdict == Verdict::Mismatch {
        // SAFETY: MEM positions of `orig_args` hold scratch addresses.
        unsafe { check::print_mismatch_instate(&descriptor.metadata, &orig_args) };
        let _ = std::io::stdout().flush();
        panic!(
            "transformed sequence for {} diverged from the original",
            descriptor.name
        );
    }

    0
}

/// Number of cycle-sample pairs recorded so far.
#[must_use]
pub fn recorded_cycle_pairs() -> usize {
    timing::recorded_pairs()
}
