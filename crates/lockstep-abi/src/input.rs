//! Fuzzer input buffer layout.
//!
//! The raw buffer is an array of 16-byte little-endian records:
//!
//! ```text
//! record 0..5   low half → GPR argument 0..4; full record → scratch slot 0..4
//! record 5      low half → LAHF input byte (bits 7,6,4,2,0 = SF,ZF,AF,PF,CF)
//! record 6..14  low half → vector lane, broadcast to YMM0..YMM7
//! ```

/// Bytes per input record (one 128-bit lane).
pub const INPUT_RECORD_SIZE: usize = 16;

/// Number of GPR argument positions in the testing ABI.
pub const NUM_GPR_ARGS: usize = 5;

/// Number of vector input lanes (YMM0..YMM7).
pub const NUM_VECTOR_LANES: usize = 8;

/// Minimum accepted input length: five GPR/scratch records, one flags record,
/// eight vector records.
pub const INPUT_STATE_SIZE: usize =
    (NUM_GPR_ARGS + 1 + NUM_VECTOR_LANES) * INPUT_RECORD_SIZE;

/// One fuzzer input, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputState {
    /// Values for RSI, RDX, RCX, R8, R9, in that order.
    pub gprs: [u64; NUM_GPR_ARGS],
    /// Flag state to load before the tested instruction: LAHF/SAHF AH
    /// format (bit 7 = SF, 6 = ZF, 4 = AF, 2 = PF, 0 = CF), in the low
    /// byte. SAHF itself reads AH (bits 8-15 of RAX), so the invoker
    /// copies this byte up into AH before applying it; the record's
    /// remaining bytes are carried but never loaded.
    pub lahf_in: u64,
    /// One lane per Y-register; the low 64 bits are broadcast across
    /// YMM0..YMM7 on stub entry.
    pub vec_lanes: [u64; NUM_VECTOR_LANES],
    /// Initial contents of the five memory scratch slots, one full record
    /// each. Slot `i` shares its low half with `gprs[i]`.
    pub scratch: [[u8; INPUT_RECORD_SIZE]; NUM_GPR_ARGS],
}

impl InputState {
    /// Decodes a fuzzer buffer, or `None` if it is shorter than
    /// [`INPUT_STATE_SIZE`].
    #[must_use]
    pub fn parse(data: &[u8]) -> Option<InputState> {
        if data.len() < INPUT_STATE_SIZE {
            return None;
        }

        let record_lo = |idx: usize| {
            let off = idx * INPUT_RECORD_SIZE;
            u64::from_le_bytes(data[off..off + 8].try_into().expect("8-byte slice"))
        };

        let mut gprs = [0u64; NUM_GPR_ARGS];
        let mut scratch = [[0u8; INPUT_RECORD_SIZE]; NUM_GPR_ARGS];
        for (i, slot) in scratch.iter_mut().enumerate() {
            let off = i * INPUT_RECORD_SIZE;
            slot.copy_from_slice(&data[off..off + INPUT_RECORD_SIZE]);
            gprs[i] = record_lo(i);
        }

        let lahf_in = record_lo(NUM_GPR_ARGS);

        let mut vec_lanes = [0u64; NUM_VECTOR_LANES];
        for (i, lane) in vec_lanes.iter_mut().enumerate() {
            *lane = record_lo(NUM_GPR_ARGS + 1 + i);
        }

        Some(InputState { gprs, lahf_in, vec_lanes, scratch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_buffer_is_rejected() {
        assert_eq!(InputState::parse(&[]), None);
        assert_eq!(InputState::parse(&[0u8; INPUT_STATE_SIZE - 1]), None);
    }

    #[test]
    fn exact_buffer_is_accepted() {
        assert!(InputState::parse(&[0u8; INPUT_STATE_SIZE]).is_some());
        assert!(InputState::parse(&[0u8; INPUT_STATE_SIZE + 32]).is_some());
    }

    #[test]
    fn field_mapping() {
        let mut data = [0u8; INPUT_STATE_SIZE];
        // GPR 0 low half, and the high half of its scratch record.
        data[0..8].copy_from_slice(&0x1122_3344_5566_7788u64.to_le_bytes());
        data[8..16].copy_from_slice(&0xAABB_CCDD_EEFF_0011u64.to_le_bytes());
        // GPR 4.
        data[64..72].copy_from_slice(&7u64.to_le_bytes());
        // Flags record.
        data[80..88].copy_from_slice(&0xC5u64.to_le_bytes());
        // Vector lane 0 and lane 7.
        data[96..104].copy_from_slice(&0xDEAD_BEEFu64.to_le_bytes());
        data[208..216].copy_from_slice(&42u64.to_le_bytes());

        let state = InputState::parse(&data).unwrap();
        assert_eq!(state.gprs[0], 0x1122_3344_5566_7788);
        assert_eq!(state.gprs[4], 7);
        assert_eq!(state.lahf_in, 0xC5);
        assert_eq!(state.vec_lanes[0], 0xDEAD_BEEF);
        assert_eq!(state.vec_lanes[7], 42);
        // Scratch slot 0 holds the whole first record.
        assert_eq!(state.scratch[0][..8], 0x1122_3344_5566_7788u64.to_le_bytes());
        assert_eq!(state.scratch[0][8..], 0xAABB_CCDD_EEFF_0011u64.to_le_bytes());
    }

    #[test]
    fn input_state_size() {
        assert_eq!(INPUT_STATE_SIZE, 224);
    }
}
