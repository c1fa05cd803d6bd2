//! Instruction stub pairs for differential equivalence testing.
//!
//! For every tested instruction this crate defines two naked callables with
//! the process-wide testing ABI:
//!
//! - `<insn>::original` executes the single untransformed instruction;
//! - `<insn>::transformed` executes the candidate replacement sequence.
//!
//! Both then run the shared state-capture epilogue, storing all sixteen
//! GPRs, the LAHF flag byte, and the low 128 bits of XMM0..XMM7 into the
//! caller-provided [`OutState`].
//!
//! # Testing ABI
//!
//! System V AMD64 calling convention, with RDI reserved:
//!
//! - RDI — pointer to the [`OutState`] capture buffer (never an operand).
//! - RSI, RDX, RCX, R8, R9 — GPR argument positions 0..4, in that order.
//! - YMM0..YMM7 — vector inputs, pre-broadcast by the caller.
//! - EFLAGS — SF/ZF/AF/PF/CF pre-loaded by the caller via SAHF.
//!
//! A stub may touch its own stack, the capture buffer, and (for `MEM`
//! operands) the 8 bytes its pointer argument addresses — nothing else.
//! Callee-saved registers are preserved; a transform needing scratch spills
//! and reloads it so the captured register state is unchanged.
//!
//! With the `timing` cargo feature, each stub brackets its tested sequence
//! with serialized TSC reads and stores the delta in
//! [`OutState::cyclecount`]. The bracket clobbers the pre-loaded flags and
//! several scratch registers, so captured state is only comparable in
//! non-timing builds.

use lockstep_abi::{OutState, TestMetadata};

#[cfg(target_arch = "x86_64")]
pub mod insn;
#[cfg(target_arch = "x86_64")]
pub mod registry;

/// A stub callable: capture buffer first, then the five GPR arguments.
pub type Stub = unsafe extern "sysv64" fn(*mut OutState, u64, u64, u64, u64, u64);

/// One tested instruction: its name, operand/flag metadata, and the two
/// stub callables the harness drives in lockstep.
pub struct TestDescriptor {
    /// Opcode-style name, e.g. `"ADD64rr"`.
    pub name: &'static str,
    /// Operand typing and flag obligations for the equivalence checker.
    pub metadata: TestMetadata,
    /// Executes the untransformed instruction.
    pub original: Stub,
    /// Executes the candidate replacement sequence.
    pub transformed: Stub,
}
