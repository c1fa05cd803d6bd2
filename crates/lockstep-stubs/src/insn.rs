//! Naked stub definitions, one module per tested instruction.
//!
//! The `define_stub!` macro expands an instruction body (a list of assembly
//! lines) into a naked function ending in the shared state-capture epilogue:
//! GPR stores first (plain `mov`s, which leave EFLAGS untouched), then the
//! LAHF byte, then the XMM halves. RAX is stored before LAHF executes, so
//! the captured `rax` field is the post-instruction value even though LAHF
//! clobbers AH.
//!
//! The XMM halves are stored with `movq`/`movhps`, which carry no alignment
//! requirement; the capture buffer's 16-byte alignment is asserted by the
//! harness so the layout stays vector-store-safe regardless.
//!
//! In `timing` builds a serialized TSC bracket surrounds the body: START is
//! `CPUID; RDTSC` with the CPUID-clobbered argument registers saved around
//! it, STOP is `RDTSCP; CPUID`. The STOP-minus-START delta lands in the
//! `cyclecount` field. The bracket destroys the pre-loaded flag state and
//! scratch registers, which is why equivalence is not checked in timing
//! runs.

// ---------------------------------------------------------------------------
// Stub expansion macros
// ---------------------------------------------------------------------------

/// Expands one naked stub function around the given assembly body.
macro_rules! define_stub {
    ($(#[$meta:meta])* $fn_name:ident, [$($body:literal),* $(,)?]) => {
        $(#[$meta])*
        #[cfg(not(feature = "timing"))]
        #[unsafe(naked)]
        pub unsafe extern "sysv64" fn $fn_name(
            _out: *mut lockstep_abi::OutState,
            _a0: u64,
            _a1: u64,
            _a2: u64,
            _a3: u64,
            _a4: u64,
        ) {
            core::arch::naked_asm!(
                $($body,)*
                // State-capture epilogue. Stores only; EFLAGS reaches the
                // LAHF below exactly as the body left it.
                "mov [rdi + 0x00], rax",
                "mov [rdi + 0x08], rbx",
                "mov [rdi + 0x10], rcx",
                "mov [rdi + 0x18], rdx",
                "mov [rdi + 0x20], rsp",
                "mov [rdi + 0x28], rbp",
                "mov [rdi + 0x30], rsi",
                "mov [rdi + 0x38], rdi",
                "mov [rdi + 0x40], r8",
                "mov [rdi + 0x48], r9",
                "mov [rdi + 0x50], r10",
                "mov [rdi + 0x58], r11",
                "mov [rdi + 0x60], r12",
                "mov [rdi + 0x68], r13",
                "mov [rdi + 0x70], r14",
                "mov [rdi + 0x78], r15",
                "lahf",
                "movzx eax, ah",
                "mov [rdi + 0x80], rax",
                "movq [rdi + 0x88], xmm0",
                "movhps [rdi + 0x90], xmm0",
                "movq [rdi + 0x98], xmm1",
                "movhps [rdi + 0xa0], xmm1",
                "movq [rdi + 0xa8], xmm2",
                "movhps [rdi + 0xb0], xmm2",
                "movq [rdi + 0xb8], xmm3",
                "movhps [rdi + 0xc0], xmm3",
                "movq [rdi + 0xc8], xmm4",
                "movhps [rdi + 0xd0], xmm4",
                "movq [rdi + 0xd8], xmm5",
                "movhps [rdi + 0xe0], xmm5",
                "movq [rdi + 0xe8], xmm6",
                "movhps [rdi + 0xf0], xmm6",
                "movq [rdi + 0xf8], xmm7",
                "movhps [rdi + 0x100], xmm7",
                "ret",
            );
        }

        $(#[$meta])*
        #[cfg(feature = "timing")]
        #[unsafe(naked)]
        pub unsafe extern "sysv64" fn $fn_name(
            _out: *mut lockstep_abi::OutState,
            _a0: u64,
            _a1: u64,
            _a2: u64,
            _a3: u64,
            _a4: u64,
        ) {
            core::arch::naked_asm!(
                // START: CPUID serializes, RDTSC samples. CPUID clobbers
                // RAX/RBX/RCX/RDX; RCX and RDX carry arguments and RBX is
                // callee-saved, so all three are saved around it. The start
                // stamp is parked in the cyclecount slot.
                "push rbx",
                "push rcx",
                "push rdx",
                "mov eax, 0",
                "cpuid",
                "rdtsc",
                "shl rdx, 32",
                "or rax, rdx",
                "mov [rdi + 0x108], rax",
                "pop rdx",
                "pop rcx",
                "pop rbx",
                $($body,)*
                // STOP: RDTSCP samples after the body retires, the trailing
                // CPUID fences later instructions out of the bracket.
                "rdtscp",
                "shl rdx, 32",
                "or rax, rdx",
                "sub rax, [rdi + 0x108]",
                "mov [rdi + 0x108], rax",
                "push rbx",
                "mov eax, 0",
                "cpuid",
                "pop rbx",
                // State-capture epilogue. The bracket above already perturbed
                // flags and scratch registers; timing runs do not compare.
                "mov [rdi + 0x00], rax",
                "mov [rdi + 0x08], rbx",
                "mov [rdi + 0x10], rcx",
                "mov [rdi + 0x18], rdx",
                "mov [rdi + 0x20], rsp",
                "mov [rdi + 0x28], rbp",
                "mov [rdi + 0x30], rsi",
                "mov [rdi + 0x38], rdi",
                "mov [rdi + 0x40], r8",
                "mov [rdi + 0x48], r9",
                "mov [rdi + 0x50], r10",
                "mov [rdi + 0x58], r11",
                "mov [rdi + 0x60], r12",
                "mov [rdi + 0x68], r13",
                "mov [rdi + 0x70], r14",
                "mov [rdi + 0x78], r15",
                "lahf",
                "movzx eax, ah",
                "mov [rdi + 0x80], rax",
                "movq [rdi + 0x88], xmm0",
                "movhps [rdi + 0x90], xmm0",
                "movq [rdi + 0x98], xmm1",
                "movhps [rdi + 0xa0], xmm1",
                "movq [rdi + 0xa8], xmm2",
                "movhps [rdi + 0xb0], xmm2",
                "movq [rdi + 0xb8], xmm3",
                "movhps [rdi + 0xc0], xmm3",
                "movq [rdi + 0xc8], xmm4",
                "movhps [rdi + 0xd0], xmm4",
                "movq [rdi + 0xd8], xmm5",
                "movhps [rdi + 0xe0], xmm5",
                "movq [rdi + 0xe8], xmm6",
                "movhps [rdi + 0xf0], xmm6",
                "movq [rdi + 0xf8], xmm7",
                "movhps [rdi + 0x100], xmm7",
                "ret",
            );
        }
    };
}

/// Expands a module holding the original/transformed stub pair for one
/// instruction.
macro_rules! stub_pair {
    (
        $(#[$meta:meta])*
        $name:ident {
            original: [$($orig:literal),* $(,)?],
            transformed: [$($trans:literal),* $(,)?] $(,)?
        }
    ) => {
        $(#[$meta])*
        pub mod $name {
            define_stub!(
                /// Executes the untransformed instruction, then captures
                /// state.
                original,
                [$($orig),*]
            );
            define_stub!(
                /// Executes the candidate replacement sequence, then
                /// captures state.
                transformed,
                [$($trans),*]
            );
        }
    };
}

// ---------------------------------------------------------------------------
// Scalar arithmetic
// ---------------------------------------------------------------------------

stub_pair!(
    /// `ADD64rr` — 64-bit register add, `add rsi, rdx`.
    add64rr {
        original: ["add rsi, rdx"],
        transformed: [
            "push r11",
            "mov r11, rdx",
            "add rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `SUB64rr` — 64-bit register subtract, `sub rsi, rdx`.
    sub64rr {
        original: ["sub rsi, rdx"],
        transformed: [
            "push r11",
            "mov r11, rdx",
            "sub rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `IMUL64rr` — 64-bit signed multiply, `imul rsi, rdx`.
    imul64rr {
        original: ["imul rsi, rdx"],
        transformed: [
            "push r11",
            "mov r11, rsi",
            "imul r11, rdx",
            "mov rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `CMP64rr` — 64-bit compare, `cmp rsi, rdx`. The replacement computes
    /// the same flags with a discarded subtract.
    cmp64rr {
        original: ["cmp rsi, rdx"],
        transformed: [
            "push r11",
            "mov r11, rsi",
            "sub r11, rdx",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `LEA64r` — address computation, `lea rsi, [rdx + rcx]`. LEA leaves
    /// EFLAGS untouched, so the replacement's arithmetic is wrapped in
    /// `pushfq`/`popfq` to preserve the loaded flag state.
    lea64r {
        original: ["lea rsi, [rdx + rcx]"],
        transformed: [
            "pushfq",
            "push r11",
            "mov r11, rdx",
            "add r11, rcx",
            "mov rsi, r11",
            "pop r11",
            "popfq",
        ],
    }
);

// ---------------------------------------------------------------------------
// Scalar logic and shifts
// ---------------------------------------------------------------------------

stub_pair!(
    /// `AND64rr` — 64-bit bitwise and, `and rsi, rdx`.
    and64rr {
        original: ["and rsi, rdx"],
        transformed: [
            "push r11",
            "mov r11, rdx",
            "and rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `OR64rr` — 64-bit bitwise or, `or rsi, rdx`.
    or64rr {
        original: ["or rsi, rdx"],
        transformed: [
            "push r11",
            "mov r11, rdx",
            "or rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `XOR64rr` — the self-xor zeroing idiom, `xor rsi, rsi`, replaced by
    /// an immediate move. The move variant leaves EFLAGS alone while the
    /// xor rewrites it, so this pair carries no flag obligations.
    xor64rr {
        original: ["xor rsi, rsi"],
        transformed: ["mov rsi, 0"],
    }
);

stub_pair!(
    /// `SHL64ri` — 64-bit left shift by immediate, `shl rsi, 3`.
    shl64ri {
        original: ["shl rsi, 3"],
        transformed: [
            "push r11",
            "mov r11, rsi",
            "shl r11, 3",
            "mov rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `SHR64ri` — 64-bit right shift by immediate, `shr rsi, 1`.
    shr64ri {
        original: ["shr rsi, 1"],
        transformed: [
            "push r11",
            "mov r11, rsi",
            "shr r11, 1",
            "mov rsi, r11",
            "pop r11",
        ],
    }
);

// ---------------------------------------------------------------------------
// Memory operands
// ---------------------------------------------------------------------------

stub_pair!(
    /// `ADD64rm` — register += memory, `add rsi, [rdx]`. Position 1 is a
    /// pointer to an 8-byte scratch slot.
    add64rm {
        original: ["add rsi, qword ptr [rdx]"],
        transformed: [
            "push r11",
            "mov r11, qword ptr [rdx]",
            "add rsi, r11",
            "pop r11",
        ],
    }
);

stub_pair!(
    /// `ADD64mr` — memory += register, `add [rsi], rdx`. Position 0 is a
    /// pointer to an 8-byte scratch slot; the store through it is what the
    /// memory comparison observes.
    add64mr {
        original: ["add qword ptr [rsi], rdx"],
        transformed: [
            "push r11",
            "mov r11, qword ptr [rsi]",
            "add r11, rdx",
            "mov qword ptr [rsi], r11",
            "pop r11",
        ],
    }
);

// ---------------------------------------------------------------------------
// Vector
// ---------------------------------------------------------------------------

stub_pair!(
    /// `PXORrr` — legacy SSE xor, `pxor xmm0, xmm1`, replaced by its VEX
    /// encoding. Identical low-128-bit result; neither touches EFLAGS, so
    /// the loaded flag state must survive both.
    pxorrr {
        original: ["pxor xmm0, xmm1"],
        transformed: ["vpxor xmm0, xmm0, xmm1"],
    }
);

stub_pair!(
    /// `VPADDQrr` — packed 64-bit add, `vpaddq ymm0, ymm0, ymm1`, replaced
    /// by the commuted operand order.
    vpaddqrr {
        original: ["vpaddq ymm0, ymm0, ymm1"],
        transformed: ["vpaddq ymm0, ymm1, ymm0"],
    }
);
