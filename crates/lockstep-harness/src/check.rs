//! Field-wise equivalence check between two captured states.
//!
//! Registers and vector halves are compared bit for bit, with one twist:
//! an argument register declared `MEM` holds a pointer, so the comparison
//! dereferences it and checks the 8 bytes it addresses — that is where the
//! instruction's observable effect lives. The address used is whatever the
//! register holds *after* execution, so a transform that leaves a different
//! pointer behind is exercised at that pointer. Flags are compared
//! selectively: only the listed flags, only when the per-instruction gate
//! asks for them, because x86 leaves many flags architecturally undefined.
//!
//! Mismatches print "expected" (original) vs. "given" (transformed) lines
//! on stdout so a fuzzer crash artifact carries the diagnosis with it.

use lockstep_abi::{COMPARED_GPRS, Gpr, NUM_GPR_ARGS, OutState, TestMetadata, lahf_flag_bit};

/// Outcome of one equivalence check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// All compared state agreed.
    Equivalent,
    /// At least one register, memory slot, vector half, or flag diverged.
    Mismatch,
}

/// Compares two captured states under the given metadata.
///
/// `original` supplies the expected values; `transformed` the given ones.
/// `lahf_in` is the flag state that was loaded before both runs; it only
/// feeds diagnostics.
///
/// # Safety
///
/// For every `MEM` operand position, both captures' corresponding argument
/// register must hold a pointer to 8 readable bytes. The harness guarantees
/// this by construction: the registers are loaded with scratch-slot
/// addresses, and a transform that leaves a different address behind is
/// caught by the dereference itself under the fuzzer's crash detection.
pub unsafe fn check_outstates_equivalent(
    metadata: &TestMetadata,
    original: &OutState,
    transformed: &OutState,
    lahf_in: u64,
) -> Verdict {
    let mut equivalent = true;

    for reg in COMPARED_GPRS {
        let is_mem = reg
            .operand_position()
            .is_some_and(|pos| metadata.is_mem(pos));
        if is_mem {
            // SAFETY: per the function contract both values address 8
            // readable bytes.
            let (expected, given) = unsafe {
                (
                    core::ptr::read_unaligned(original.gpr(reg) as *const u64),
                    core::ptr::read_unaligned(transformed.gpr(reg) as *const u64),
                )
            };
            if expected != given {
                equivalent = false;
                println!(
                    "Output states differed on memory pointed to by register {}: expected {expected}, given {given}",
                    reg.name(),
                );
            }
        } else {
            let (expected, given) = (original.gpr(reg), transformed.gpr(reg));
            if expected != given {
                equivalent = false;
                println!(
                    "Output states differed on register {}: expected {expected}, given {given}",
                    reg.name(),
                );
            }
        }
    }

    for (i, (expected, given)) in original.xmm.iter().zip(&transformed.xmm).enumerate() {
        if expected != given {
            equivalent = false;
            println!(
                "Output states differed on register xmm{i}: expected lo {} hi {}, given lo {} hi {}",
                expected.lo, expected.hi, given.lo, given.hi,
            );
        }
    }

    let orig_lahf = original.lahf_rax_res;
    let trans_lahf = transformed.lahf_rax_res;

    if metadata.must_preserve_flags {
        for flag in metadata.preserves.iter() {
            if lahf_flag_bit(orig_lahf, flag) != lahf_flag_bit(trans_lahf, flag) {
                equivalent = false;
                println!("transform did not preserve flag: LAHF_{}", flag.name());
            }
        }
    }

    if metadata.must_set_flags {
        for flag in metadata.sets.iter() {
            let expected = lahf_flag_bit(orig_lahf, flag);
            let given = lahf_flag_bit(trans_lahf, flag);
            if expected != given {
                equivalent = false;
                println!(
                    "transform did not set flag LAHF_{}. expected: {expected}, given {given}",
                    flag.name(),
                );
            }
        }
    }

    if equivalent {
        Verdict::Equivalent
    } else {
        log::debug!("input flags were {:#04x}", lahf_in & 0xFF);
        Verdict::Mismatch
    }
}

/// Prints the post-substitution input state that produced a mismatch.
///
/// # Safety
///
/// Same contract as [`check_outstates_equivalent`]: `MEM`-position entries
/// of `args` must address 8 readable bytes.
pub unsafe fn print_mismatch_instate(metadata: &TestMetadata, args: &[u64; NUM_GPR_ARGS]) {
    println!("In state causing mismatch:");
    let names = [Gpr::Rsi, Gpr::Rdx, Gpr::Rcx, Gpr::R8, Gpr::R9];
    for (pos, (reg, &value)) in names.iter().zip(args).enumerate() {
        if metadata.is_mem(pos) {
            // SAFETY: per the function contract.
            let pointee = unsafe { core::ptr::read_unaligned(value as *const u64) };
            println!("\t*{} -points-to-64-bits->: {pointee}", reg.name());
        } else {
            println!("\t{}: {value}", reg.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_abi::{FlagSet, OperandKind};

    fn reg_metadata(sets: FlagSet, must_set: bool) -> TestMetadata {
        TestMetadata {
            operand_types: [
                Some(OperandKind::Reg),
                Some(OperandKind::Reg),
                None,
                None,
                None,
            ],
            preserves: FlagSet::empty(),
            sets,
            must_preserve_flags: false,
            must_set_flags: must_set,
        }
    }

    fn check(metadata: &TestMetadata, a: &OutState, b: &OutState) -> Verdict {
        // SAFETY: no MEM positions in these fixtures unless the caller set
        // pointer values up, which the MEM tests below do.
        unsafe { check_outstates_equivalent(metadata, a, b, 0) }
    }

    #[test]
    fn identical_states_are_equivalent() {
        let state = OutState::ZERO;
        let metadata = reg_metadata(FlagSet::ARITH, true);
        assert_eq!(check(&metadata, &state, &state), Verdict::Equivalent);
    }

    #[test]
    fn register_divergence_is_reported() {
        // An add producing 12 against a subtract producing -2.
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        orig.rsi = 12;
        trans.rsi = 2u64.wrapping_neg();
        let metadata = reg_metadata(FlagSet::empty(), false);
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Mismatch);
    }

    #[test]
    fn clobbered_bystander_register_is_reported() {
        let orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        trans.rbx = 1;
        let metadata = reg_metadata(FlagSet::empty(), false);
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Mismatch);
    }

    #[test]
    fn rdi_divergence_is_ignored() {
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        orig.rdi = 0x1000;
        trans.rdi = 0x2000;
        let metadata = reg_metadata(FlagSet::empty(), false);
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Equivalent);
    }

    #[test]
    fn unlisted_flags_are_not_inspected() {
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        // ZF differs, but only CF is listed.
        orig.lahf_rax_res = 0x40;
        trans.lahf_rax_res = 0x00;
        let metadata = reg_metadata(FlagSet::CF, true);
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Equivalent);
    }

    #[test]
    fn missed_set_flag_is_reported() {
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        // ZF agrees, CF does not.
        orig.lahf_rax_res = 0x41;
        trans.lahf_rax_res = 0x40;
        let metadata = reg_metadata(
            FlagSet::ZF.union(FlagSet::CF).union(FlagSet::SF),
            true,
        );
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Mismatch);
    }

    #[test]
    fn flag_gates_disable_flag_checks() {
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        orig.lahf_rax_res = 0xD5;
        trans.lahf_rax_res = 0x00;
        let mut metadata = reg_metadata(FlagSet::ARITH, false);
        metadata.preserves = FlagSet::ARITH;
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Equivalent);
    }

    #[test]
    fn preserve_violation_is_reported() {
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        orig.lahf_rax_res = 0x80;
        trans.lahf_rax_res = 0x00;
        let metadata = TestMetadata {
            operand_types: [None; 5],
            preserves: FlagSet::SF,
            sets: FlagSet::empty(),
            must_preserve_flags: true,
            must_set_flags: false,
        };
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Mismatch);
    }

    #[test]
    fn xmm_divergence_is_reported() {
        let orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        trans.xmm[3].hi = 1;
        let metadata = reg_metadata(FlagSet::empty(), false);
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Mismatch);
    }

    #[test]
    fn mem_position_compares_pointee_not_pointer() {
        let orig_slot = 42u64;
        let trans_slot = 42u64;
        let mut orig = OutState::ZERO;
        let mut trans = OutState::ZERO;
        // Different addresses, same contents: equivalent.
        orig.rsi = &raw const orig_slot as u64;
        trans.rsi = &raw const trans_slot as u64;
        let metadata = TestMetadata {
            operand_types: [Some(OperandKind::Mem), None, None, None, None],
            preserves: FlagSet::empty(),
            sets: FlagSet::empty(),
            must_preserve_flags: false,
            must_set_flags: false,
        };
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Equivalent);

        // Same addresses, different contents: mismatch.
        let trans_slot = 43u64;
        trans.rsi = &raw const trans_slot as u64;
        assert_eq!(check(&metadata, &orig, &trans), Verdict::Mismatch);
    }
}
