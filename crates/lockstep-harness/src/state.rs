//! Process-wide capture and scratch state.
//!
//! The testing ABI makes stubs write through RDI into a caller-owned
//! buffer, and `MEM` operands receive pointers into per-variant scratch
//! slots. Both live here as statics: conceptually per-invocation, but
//! global because the stub assembly addresses them and because the fuzzer
//! loop reuses them across millions of iterations. The harness zeroes or
//! overwrites every byte before each stub call.

use core::cell::UnsafeCell;

use lockstep_abi::{INPUT_RECORD_SIZE, NUM_GPR_ARGS, OutState};

/// Wrapper to make `UnsafeCell<T>` usable in a `static`.
///
/// # Safety
///
/// Only the single thread running `test_one_input` may access the contents,
/// and each invocation fully re-initializes them before stub execution. No
/// concurrent access exists anywhere in the harness.
#[repr(transparent)]
pub(crate) struct SyncStateCell<T>(UnsafeCell<T>);

// SAFETY: See `SyncStateCell` doc comment — no concurrent access.
unsafe impl<T> Sync for SyncStateCell<T> {}

impl<T> SyncStateCell<T> {
    pub(crate) const fn new(value: T) -> Self {
        Self(UnsafeCell::new(value))
    }

    /// Returns a raw pointer to the inner value.
    pub(crate) const fn get(&self) -> *mut T {
        self.0.get()
    }
}

/// Memory scratch slots for one variant, one 16-byte record per GPR
/// argument position. 16-byte aligned like the input records they mirror.
#[repr(C, align(16))]
pub(crate) struct ScratchSlots(pub(crate) [[u8; INPUT_RECORD_SIZE]; NUM_GPR_ARGS]);

impl ScratchSlots {
    const fn zeroed() -> Self {
        Self([[0u8; INPUT_RECORD_SIZE]; NUM_GPR_ARGS])
    }

    /// Address of slot `pos`, for substitution into a `MEM` argument.
    ///
    /// # Safety
    ///
    /// `this` must point into one of the scratch statics below and `pos`
    /// must be a valid argument position.
    pub(crate) unsafe fn slot_addr(this: *mut Self, pos: usize) -> u64 {
        // SAFETY: in-bounds projection per the caller contract; no
        // reference is materialized.
        unsafe { (&raw mut (*this).0[pos]) as u64 }
    }
}

/// Capture buffer filled by the original stub.
pub(crate) static ORIGINAL_STATE: SyncStateCell<OutState> = SyncStateCell::new(OutState::ZERO);

/// Capture buffer filled by the transformed stub.
pub(crate) static TRANSFORMED_STATE: SyncStateCell<OutState> = SyncStateCell::new(OutState::ZERO);

/// Scratch slots handed to the original stub's `MEM` operands.
pub(crate) static ORIG_MEMORY_ARGS: SyncStateCell<ScratchSlots> =
    SyncStateCell::new(ScratchSlots::zeroed());

/// Scratch slots handed to the transformed stub's `MEM` operands. Disjoint
/// from the original's so the two variants can never observe each other's
/// stores.
pub(crate) static TRANS_MEMORY_ARGS: SyncStateCell<ScratchSlots> =
    SyncStateCell::new(ScratchSlots::zeroed());
