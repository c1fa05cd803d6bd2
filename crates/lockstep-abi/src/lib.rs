//! Testing-ABI data model for the lockstep differential instruction fuzzer.
//!
//! Lockstep executes an original x86-64 instruction and its candidate
//! replacement sequence against identical randomized inputs and compares the
//! resulting architectural state bit for bit. This crate holds the shared
//! vocabulary of that comparison; it performs no execution itself.
//!
//! # Architecture
//!
//! - [`FlagSet`] — the five LAHF-reachable EFLAGS bits, in AH encoding.
//! - [`OutState`] — the packed capture buffer each stub fills with its
//!   post-execution register state. Field offsets are load-bearing: the stub
//!   assembly in `lockstep-stubs` stores to them by literal displacement.
//! - [`OperandKind`] / [`TestMetadata`] — per-instruction operand typing and
//!   flag obligations, consumed by the equivalence checker.
//! - [`InputState`] — the parsed form of one fuzzer-provided byte buffer.

mod flags;
mod input;
mod metadata;
mod outstate;

pub use flags::{FlagSet, lahf_flag_bit};
pub use input::{
    INPUT_RECORD_SIZE, INPUT_STATE_SIZE, InputState, NUM_GPR_ARGS, NUM_VECTOR_LANES,
};
pub use metadata::{OperandKind, TestMetadata};
pub use outstate::{COMPARED_GPRS, Gpr, OutState, XmmPair};
