//! The five LAHF-reachable EFLAGS bits.
//!
//! `LAHF` copies SF, ZF, AF, PF, and CF into AH; `SAHF` loads them back.
//! Everything lockstep knows about flags flows through that one byte, so the
//! set is represented directly in AH encoding. OF and DF are not reachable
//! this way and are deliberately absent.

use bitflags::bitflags;

bitflags! {
    /// A set of observable EFLAGS bits, in LAHF/SAHF AH encoding.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct FlagSet: u8 {
        /// Sign flag (AH bit 7).
        const SF = 0x80;
        /// Zero flag (AH bit 6).
        const ZF = 0x40;
        /// Auxiliary carry flag (AH bit 4).
        const AF = 0x10;
        /// Parity flag (AH bit 2).
        const PF = 0x04;
        /// Carry flag (AH bit 0).
        const CF = 0x01;
    }
}

impl FlagSet {
    /// The flags an arithmetic instruction (ADD, SUB, CMP, ...) defines.
    pub const ARITH: FlagSet = FlagSet::SF
        .union(FlagSet::ZF)
        .union(FlagSet::AF)
        .union(FlagSet::PF)
        .union(FlagSet::CF);

    /// The flags a logic instruction (AND, OR) defines. AF is architecturally
    /// undefined after these.
    pub const LOGIC: FlagSet = FlagSet::SF
        .union(FlagSet::ZF)
        .union(FlagSet::PF)
        .union(FlagSet::CF);

    /// Short name for a single-flag set, e.g. `"SF"`.
    ///
    /// # Panics
    ///
    /// Panics if `self` is not exactly one flag; callers iterate with
    /// [`FlagSet::iter`] which only yields single flags.
    pub fn name(self) -> &'static str {
        match self.bits() {
            0x80 => "SF",
            0x40 => "ZF",
            0x10 => "AF",
            0x04 => "PF",
            0x01 => "CF",
            _ => panic!("name() requires a single flag"),
        }
    }
}

/// Extracts one flag from a LAHF-format byte as 0 or 1.
///
/// The low 8 bits of `lahf` hold the AH image; higher bits are ignored.
#[must_use]
pub fn lahf_flag_bit(lahf: u64, flag: FlagSet) -> u64 {
    u64::from((lahf as u8) & flag.bits() != 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_match_lahf_encoding() {
        assert_eq!(FlagSet::SF.bits(), 0x80);
        assert_eq!(FlagSet::ZF.bits(), 0x40);
        assert_eq!(FlagSet::AF.bits(), 0x10);
        assert_eq!(FlagSet::PF.bits(), 0x04);
        assert_eq!(FlagSet::CF.bits(), 0x01);
    }

    #[test]
    fn extraction_is_zero_or_one() {
        // AH image with SF, AF, CF set; reserved bit 1 set as LAHF produces.
        let lahf = 0x93u64;
        assert_eq!(lahf_flag_bit(lahf, FlagSet::SF), 1);
        assert_eq!(lahf_flag_bit(lahf, FlagSet::ZF), 0);
        assert_eq!(lahf_flag_bit(lahf, FlagSet::AF), 1);
        assert_eq!(lahf_flag_bit(lahf, FlagSet::PF), 0);
        assert_eq!(lahf_flag_bit(lahf, FlagSet::CF), 1);
    }

    #[test]
    fn high_bits_ignored() {
        assert_eq!(lahf_flag_bit(0xFFFF_FF00, FlagSet::SF), 0);
    }

    #[test]
    fn iter_yields_named_flags() {
        let names: Vec<&str> = FlagSet::ARITH.iter().map(FlagSet::name).collect();
        assert_eq!(names, ["SF", "ZF", "AF", "PF", "CF"]);
    }
}
