//! Stub invocation with full input-state control.
//!
//! A stub expects more than the five GPR arguments the calling convention
//! covers: YMM0..YMM7 must hold the broadcast vector lanes and EFLAGS must
//! hold the loaded flag byte at the moment the stub's first instruction
//! executes. Ordinary codegen could clobber either between a separate
//! preload and the call, so the preload, the flag load, and the call live
//! in one assembly block.

use lockstep_abi::{NUM_GPR_ARGS, OutState};
use lockstep_stubs::Stub;

/// Invokes `stub` with the given GPR arguments, broadcast vector lanes, and
/// loaded flag state, capturing into `out`.
///
/// Both variants of a pair must enter the stub with identical register
/// state, so nothing variant- or codegen-dependent may leak in: the call
/// goes through the stack (a register holding the callee's own address
/// would differ between the variants), the register that carried the
/// address is zeroed, and every callee-saved register is pinned to zero for
/// the duration of the call.
///
/// Requires AVX2 for `vpbroadcastq`.
///
/// # Safety
///
/// - `out` must be a valid, 16-byte-aligned `OutState` the stub may write.
/// - Any `MEM`-position entry of `gprs` must already hold the address of an
///   8-byte-writable scratch slot.
/// - `lanes` must point to [`lockstep_abi::NUM_VECTOR_LANES`] readable
///   `u64`s.
pub(crate) unsafe fn invoke_stub(
    stub: Stub,
    out: *mut OutState,
    gprs: &[u64; NUM_GPR_ARGS],
    lanes: *const u64,
    lahf_in: u64,
) {
    // SAFETY: register and memory effects are bounded by the stub contract
    // the caller vouches for; every touched register is declared clobbered.
    unsafe {
        core::arch::asm!(
            // Broadcast the low 64 bits of each input lane across its
            // Y-register.
            "vpbroadcastq ymm0, qword ptr [r10]",
            "vpbroadcastq ymm1, qword ptr [r10 + 8]",
            "vpbroadcastq ymm2, qword ptr [r10 + 16]",
            "vpbroadcastq ymm3, qword ptr [r10 + 24]",
            "vpbroadcastq ymm4, qword ptr [r10 + 32]",
            "vpbroadcastq ymm5, qword ptr [r10 + 40]",
            "vpbroadcastq ymm6, qword ptr [r10 + 48]",
            "vpbroadcastq ymm7, qword ptr [r10 + 56]",
            // Park the stub address on the stack and scrub the register
            // that carried it. RBX and RBP cannot be asm operands, so they
            // are saved, zeroed, and restored in the template; R12-R15 are
            // pinned through the operand list below.
            "push rbx",
            "push rbp",
            "push {stub}",
            "xor {stub:e}, {stub:e}",
            "xor ebx, ebx",
            "xor ebp, ebp",
            // Load the input flag byte and apply it. SAHF reads AH (bits
            // 8-15 of RAX) while the byte arrives in the low 8 bits of
            // r11, so it is copied up into AH first ("mov ah, r11b" does
            // not encode: AH is unreachable under a REX prefix). SAHF must
            // be the last flag-writing instruction before the call.
            "mov rax, r11",
            "mov ah, al",
            "sahf",
            "call qword ptr [rsp]",
            "add rsp, 8",
            "pop rbp",
            "pop rbx",
            stub = in(reg) stub as usize,
            inout("rdi") out => _,
            inout("rsi") gprs[0] => _,
            inout("rdx") gprs[1] => _,
            inout("rcx") gprs[2] => _,
            inout("r8") gprs[3] => _,
            inout("r9") gprs[4] => _,
            inout("r10") lanes => _,
            inout("r11") lahf_in => _,
            inout("r12") 0usize => _,
            inout("r13") 0usize => _,
            inout("r14") 0usize => _,
            inout("r15") 0usize => _,
            out("rax") _,
            clobber_abi("sysv64"),
        );
    }
}
