//! The table of tested instructions.
//!
//! Each entry pairs a stub module from [`insn`](crate::insn) with the
//! operand typing and flag obligations the equivalence checker enforces.
//! Flag obligations follow the architecture: arithmetic ops define all five
//! observable flags, logic ops leave AF undefined, shifts leave AF
//! undefined, IMUL defines only CF among the observable set, and LEA and
//! the vector ops must preserve whatever flag state was loaded.

use lockstep_abi::{FlagSet, OperandKind, TestMetadata};

use crate::TestDescriptor;
use crate::insn;

const REG: Option<OperandKind> = Some(OperandKind::Reg);
const MEM: Option<OperandKind> = Some(OperandKind::Mem);

/// Flags a shift-by-immediate defines (AF is architecturally undefined).
const SHIFT_FLAGS: FlagSet = FlagSet::LOGIC;

/// `add rsi, rdx` vs. scratch spill/reload.
pub static ADD64RR: TestDescriptor = TestDescriptor {
    name: "ADD64rr",
    metadata: TestMetadata {
        operand_types: [REG, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::ARITH,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::add64rr::original,
    transformed: insn::add64rr::transformed,
};

/// `sub rsi, rdx` vs. scratch spill/reload.
pub static SUB64RR: TestDescriptor = TestDescriptor {
    name: "SUB64rr",
    metadata: TestMetadata {
        operand_types: [REG, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::ARITH,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::sub64rr::original,
    transformed: insn::sub64rr::transformed,
};

/// `and rsi, rdx` vs. scratch spill/reload.
pub static AND64RR: TestDescriptor = TestDescriptor {
    name: "AND64rr",
    metadata: TestMetadata {
        operand_types: [REG, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::LOGIC,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::and64rr::original,
    transformed: insn::and64rr::transformed,
};

/// `or rsi, rdx` vs. scratch spill/reload.
pub static OR64RR: TestDescriptor = TestDescriptor {
    name: "OR64rr",
    metadata: TestMetadata {
        operand_types: [REG, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::LOGIC,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::or64rr::original,
    transformed: insn::or64rr::transformed,
};

/// The `xor rsi, rsi` zeroing idiom vs. `mov rsi, 0`. The move does not
/// write EFLAGS, so no flag obligations apply.
pub static XOR64RR: TestDescriptor = TestDescriptor {
    name: "XOR64rr",
    metadata: TestMetadata {
        operand_types: [REG, None, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::empty(),
        must_preserve_flags: false,
        must_set_flags: false,
    },
    original: insn::xor64rr::original,
    transformed: insn::xor64rr::transformed,
};

/// `cmp rsi, rdx` vs. a discarded subtract.
pub static CMP64RR: TestDescriptor = TestDescriptor {
    name: "CMP64rr",
    metadata: TestMetadata {
        operand_types: [REG, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::ARITH,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::cmp64rr::original,
    transformed: insn::cmp64rr::transformed,
};

/// `shl rsi, 3` vs. scratch spill/reload.
pub static SHL64RI: TestDescriptor = TestDescriptor {
    name: "SHL64ri",
    metadata: TestMetadata {
        operand_types: [REG, None, None, None, None],
        preserves: FlagSet::empty(),
        sets: SHIFT_FLAGS,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::shl64ri::original,
    transformed: insn::shl64ri::transformed,
};

/// `shr rsi, 1` vs. scratch spill/reload.
pub static SHR64RI: TestDescriptor = TestDescriptor {
    name: "SHR64ri",
    metadata: TestMetadata {
        operand_types: [REG, None, None, None, None],
        preserves: FlagSet::empty(),
        sets: SHIFT_FLAGS,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::shr64ri::original,
    transformed: insn::shr64ri::transformed,
};

/// `imul rsi, rdx` vs. scratch spill/reload. Only CF is defined among the
/// observable flags.
pub static IMUL64RR: TestDescriptor = TestDescriptor {
    name: "IMUL64rr",
    metadata: TestMetadata {
        operand_types: [REG, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::CF,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::imul64rr::original,
    transformed: insn::imul64rr::transformed,
};

/// `lea rsi, [rdx + rcx]` vs. flag-saved arithmetic. LEA never writes
/// EFLAGS, so the loaded flag state must come back out unchanged.
pub static LEA64R: TestDescriptor = TestDescriptor {
    name: "LEA64r",
    metadata: TestMetadata {
        operand_types: [REG, REG, REG, None, None],
        preserves: FlagSet::ARITH,
        sets: FlagSet::empty(),
        must_preserve_flags: true,
        must_set_flags: false,
    },
    original: insn::lea64r::original,
    transformed: insn::lea64r::transformed,
};

/// `add rsi, [rdx]` — memory-source add; position 1 is a scratch pointer.
pub static ADD64RM: TestDescriptor = TestDescriptor {
    name: "ADD64rm",
    metadata: TestMetadata {
        operand_types: [REG, MEM, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::ARITH,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::add64rm::original,
    transformed: insn::add64rm::transformed,
};

/// `add [rsi], rdx` — memory-destination add; position 0 is a scratch
/// pointer and the stored sum is what the memory comparison observes.
pub static ADD64MR: TestDescriptor = TestDescriptor {
    name: "ADD64mr",
    metadata: TestMetadata {
        operand_types: [MEM, REG, None, None, None],
        preserves: FlagSet::empty(),
        sets: FlagSet::ARITH,
        must_preserve_flags: false,
        must_set_flags: true,
    },
    original: insn::add64mr::original,
    transformed: insn::add64mr::transformed,
};

/// `pxor xmm0, xmm1` vs. its VEX encoding. Vector ops never touch EFLAGS.
pub static PXORRR: TestDescriptor = TestDescriptor {
    name: "PXORrr",
    metadata: TestMetadata {
        operand_types: [None; 5],
        preserves: FlagSet::ARITH,
        sets: FlagSet::empty(),
        must_preserve_flags: true,
        must_set_flags: false,
    },
    original: insn::pxorrr::original,
    transformed: insn::pxorrr::transformed,
};

/// `vpaddq ymm0, ymm0, ymm1` vs. the commuted operand order.
pub static VPADDQRR: TestDescriptor = TestDescriptor {
    name: "VPADDQrr",
    metadata: TestMetadata {
        operand_types: [None; 5],
        preserves: FlagSet::ARITH,
        sets: FlagSet::empty(),
        must_preserve_flags: true,
        must_set_flags: false,
    },
    original: insn::vpaddqrr::original,
    transformed: insn::vpaddqrr::transformed,
};

/// Every registered instruction, in a stable order.
pub static ALL: [&TestDescriptor; 14] = [
    &ADD64RR, &SUB64RR, &AND64RR, &OR64RR, &XOR64RR, &CMP64RR, &SHL64RI,
    &SHR64RI, &IMUL64RR, &LEA64R, &ADD64RM, &ADD64MR, &PXORRR, &VPADDQRR,
];

/// Returns all registered instruction descriptors.
#[must_use]
pub fn all() -> &'static [&'static TestDescriptor] {
    &ALL
}

/// Looks up a descriptor by its exact name.
#[must_use]
pub fn find(name: &str) -> Option<&'static TestDescriptor> {
    ALL.iter().copied().find(|d| d.name == name)
}
