//! Post-execution CPU state capture buffer.
//!
//! Each stub's epilogue stores its observed architectural state here through
//! RDI, by literal byte displacement. The layout below is therefore a wire
//! format, not just a convenience struct: reordering fields breaks every stub.

/// Low/high 64-bit halves of one XMM register.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct XmmPair {
    /// Bits 0..64.
    pub lo: u64,
    /// Bits 64..128.
    pub hi: u64,
}

/// Captured CPU state after one stub invocation.
///
/// 16-byte aligned so the buffer address itself can never fault a vector
/// store. All fields are `u64`, so `repr(C)` introduces no padding; the
/// struct is exactly 272 bytes.
///
/// Offsets (hex), mirrored by the stub epilogue in `lockstep-stubs`:
///
/// | field          | offset | field          | offset |
/// |----------------|--------|----------------|--------|
/// | `rax`          | 0x00   | `r10`          | 0x50   |
/// | `rbx`          | 0x08   | `r11`          | 0x58   |
/// | `rcx`          | 0x10   | `r12`          | 0x60   |
/// | `rdx`          | 0x18   | `r13`          | 0x68   |
/// | `rsp`          | 0x20   | `r14`          | 0x70   |
/// | `rbp`          | 0x28   | `r15`          | 0x78   |
/// | `rsi`          | 0x30   | `lahf_rax_res` | 0x80   |
/// | `rdi`          | 0x38   | `xmm[0..8]`    | 0x88   |
/// | `r8`           | 0x40   | `cyclecount`   | 0x108  |
/// | `r9`           | 0x48   |                |        |
#[repr(C, align(16))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutState {
    /// RAX, captured before the LAHF store clobbers AH.
    pub rax: u64,
    /// RBX.
    pub rbx: u64,
    /// RCX.
    pub rcx: u64,
    /// RDX.
    pub rdx: u64,
    /// RSP at the capture point (after the stub's return address push).
    pub rsp: u64,
    /// RBP.
    pub rbp: u64,
    /// RSI — GPR argument position 0.
    pub rsi: u64,
    /// RDI — always the address of this buffer; never compared.
    pub rdi: u64,
    /// R8 — GPR argument position 3.
    pub r8: u64,
    /// R9 — GPR argument position 4.
    pub r9: u64,
    /// R10.
    pub r10: u64,
    /// R11.
    pub r11: u64,
    /// R12.
    pub r12: u64,
    /// R13.
    pub r13: u64,
    /// R14.
    pub r14: u64,
    /// R15.
    pub r15: u64,
    /// AH image from LAHF, zero-extended: the post-instruction SF, ZF, AF,
    /// PF, CF bits.
    pub lahf_rax_res: u64,
    /// Low 128 bits of XMM0..XMM7.
    pub xmm: [XmmPair; 8],
    /// STOP − START TSC delta around the tested sequence. Zero unless the
    /// stubs were built with the `timing` feature.
    pub cyclecount: u64,
}

impl OutState {
    /// An all-zero capture buffer.
    pub const ZERO: OutState = OutState {
        rax: 0,
        rbx: 0,
        rcx: 0,
        rdx: 0,
        rsp: 0,
        rbp: 0,
        rsi: 0,
        rdi: 0,
        r8: 0,
        r9: 0,
        r10: 0,
        r11: 0,
        r12: 0,
        r13: 0,
        r14: 0,
        r15: 0,
        lahf_rax_res: 0,
        xmm: [XmmPair { lo: 0, hi: 0 }; 8],
        cyclecount: 0,
    };

    /// Reads one general-purpose register field by name.
    #[must_use]
    pub fn gpr(&self, reg: Gpr) -> u64 {
        match reg {
            Gpr::Rax => self.rax,
            Gpr::Rbx => self.rbx,
            Gpr::Rcx => self.rcx,
            Gpr::Rdx => self.rdx,
            Gpr::Rsp => self.rsp,
            Gpr::Rbp => self.rbp,
            Gpr::Rsi => self.rsi,
            Gpr::Rdi => self.rdi,
            Gpr::R8 => self.r8,
            Gpr::R9 => self.r9,
            Gpr::R10 => self.r10,
            Gpr::R11 => self.r11,
            Gpr::R12 => self.r12,
            Gpr::R13 => self.r13,
            Gpr::R14 => self.r14,
            Gpr::R15 => self.r15,
        }
    }
}

/// A general-purpose register name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gpr {
    /// RAX.
    Rax,
    /// RBX.
    Rbx,
    /// RCX — GPR argument position 2.
    Rcx,
    /// RDX — GPR argument position 1.
    Rdx,
    /// RSP.
    Rsp,
    /// RBP.
    Rbp,
    /// RSI — GPR argument position 0.
    Rsi,
    /// RDI — the capture-buffer pointer.
    Rdi,
    /// R8 — GPR argument position 3.
    R8,
    /// R9 — GPR argument position 4.
    R9,
    /// R10.
    R10,
    /// R11.
    R11,
    /// R12.
    R12,
    /// R13.
    R13,
    /// R14.
    R14,
    /// R15.
    R15,
}

impl Gpr {
    /// Lower-case register name for diagnostics.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Rax => "rax",
            Self::Rbx => "rbx",
            Self::Rcx => "rcx",
            Self::Rdx => "rdx",
            Self::Rsp => "rsp",
            Self::Rbp => "rbp",
            Self::Rsi => "rsi",
            Self::Rdi => "rdi",
            Self::R8 => "r8",
            Self::R9 => "r9",
            Self::R10 => "r10",
            Self::R11 => "r11",
            Self::R12 => "r12",
            Self::R13 => "r13",
            Self::R14 => "r14",
            Self::R15 => "r15",
        }
    }

    /// The GPR-argument position this register carries, if any.
    ///
    /// Only the five argument registers can be declared `MEM` in a test's
    /// operand types; for every other register this is `None`.
    #[must_use]
    pub fn operand_position(self) -> Option<usize> {
        match self {
            Self::Rsi => Some(0),
            Self::Rdx => Some(1),
            Self::Rcx => Some(2),
            Self::R8 => Some(3),
            Self::R9 => Some(4),
            _ => None,
        }
    }
}

/// Every register the equivalence checker inspects, in capture order.
///
/// RDI is absent: it holds the caller's `OutState` pointer, which necessarily
/// differs between the two variants.
pub const COMPARED_GPRS: [Gpr; 15] = [
    Gpr::Rax,
    Gpr::Rbx,
    Gpr::Rcx,
    Gpr::Rdx,
    Gpr::Rsp,
    Gpr::Rbp,
    Gpr::Rsi,
    Gpr::R8,
    Gpr::R9,
    Gpr::R10,
    Gpr::R11,
    Gpr::R12,
    Gpr::R13,
    Gpr::R14,
    Gpr::R15,
];

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{align_of, offset_of, size_of};

    #[test]
    fn layout_matches_stub_displacements() {
        assert_eq!(offset_of!(OutState, rax), 0x00);
        assert_eq!(offset_of!(OutState, rbx), 0x08);
        assert_eq!(offset_of!(OutState, rcx), 0x10);
        assert_eq!(offset_of!(OutState, rdx), 0x18);
        assert_eq!(offset_of!(OutState, rsp), 0x20);
        assert_eq!(offset_of!(OutState, rbp), 0x28);
        assert_eq!(offset_of!(OutState, rsi), 0x30);
        assert_eq!(offset_of!(OutState, rdi), 0x38);
        assert_eq!(offset_of!(OutState, r8), 0x40);
        assert_eq!(offset_of!(OutState, r9), 0x48);
        assert_eq!(offset_of!(OutState, r10), 0x50);
        assert_eq!(offset_of!(OutState, r11), 0x58);
        assert_eq!(offset_of!(OutState, r12), 0x60);
        assert_eq!(offset_of!(OutState, r13), 0x68);
        assert_eq!(offset_of!(OutState, r14), 0x70);
        assert_eq!(offset_of!(OutState, r15), 0x78);
        assert_eq!(offset_of!(OutState, lahf_rax_res), 0x80);
        assert_eq!(offset_of!(OutState, xmm), 0x88);
        assert_eq!(offset_of!(OutState, cyclecount), 0x108);
    }

    #[test]
    fn size_and_alignment() {
        assert_eq!(size_of::<OutState>(), 272);
        assert_eq!(align_of::<OutState>(), 16);
        assert_eq!(size_of::<XmmPair>(), 16);
    }

    #[test]
    fn rdi_is_never_compared() {
        assert!(!COMPARED_GPRS.contains(&Gpr::Rdi));
        assert_eq!(COMPARED_GPRS.len(), 15);
    }

    #[test]
    fn operand_positions_cover_argument_registers() {
        assert_eq!(Gpr::Rsi.operand_position(), Some(0));
        assert_eq!(Gpr::Rdx.operand_position(), Some(1));
        assert_eq!(Gpr::Rcx.operand_position(), Some(2));
        assert_eq!(Gpr::R8.operand_position(), Some(3));
        assert_eq!(Gpr::R9.operand_position(), Some(4));
        assert_eq!(Gpr::Rax.operand_position(), None);
        assert_eq!(Gpr::Rdi.operand_position(), None);
    }
}
