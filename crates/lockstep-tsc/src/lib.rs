//! Time Stamp Counter (TSC) reading primitives.
//!
//! Provides the serialized START/STOP read pair used for cycle-count
//! measurement, plus a plain `rdtsc` wrapper for coarse elapsed-time
//! reporting.
//!
//! The START read is `CPUID; RDTSC`: CPUID drains all prior in-flight
//! instructions so nothing from before the measured region retires inside
//! it. The STOP read is `RDTSCP; CPUID`: RDTSCP waits for prior instructions
//! to complete before sampling, and the trailing CPUID keeps later
//! instructions from reordering into the region. CPUID clobbers
//! RAX/RBX/RCX/RDX; RBX is reserved by Rust inline assembly, so it is
//! saved and restored around each CPUID with an exchange.

#![warn(missing_docs)]

/// Serialized TSC read for the start of a measured region.
///
/// Executes `CPUID; RDTSC` and returns `(EDX << 32) | EAX`.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn start_cycle_timer() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: CPUID and RDTSC are available on all x86_64 processors and
    // have no side effects beyond the declared register outputs. RBX is
    // restored by the exchange before the asm block ends.
    unsafe {
        core::arch::asm!(
            "mov {scratch}, rbx",
            "mov eax, 0",
            "cpuid",
            "xchg {scratch}, rbx",
            "rdtsc",
            scratch = out(reg) _,
            out("eax") lo,
            out("ecx") _,
            out("edx") hi,
            options(nomem, nostack, preserves_flags),
        );
    }
    (u64::from(hi) << 32) | u64::from(lo)
}

/// Serialized TSC read for the end of a measured region.
///
/// Executes `RDTSCP; CPUID` and returns `(EDX << 32) | EAX` from the RDTSCP.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn stop_cycle_timer() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: RDTSCP and CPUID have no side effects beyond the declared
    // register outputs. The RDTSCP result is moved to scratch registers
    // before the CPUID clobbers EAX/EDX; RBX is restored by the exchange.
    unsafe {
        core::arch::asm!(
            "rdtscp",
            "mov {lo:e}, eax",
            "mov {hi:e}, edx",
            "mov {scratch}, rbx",
            "mov eax, 0",
            "cpuid",
            "xchg {scratch}, rbx",
            lo = out(reg) lo,
            hi = out(reg) hi,
            scratch = out(reg) _,
            out("eax") _,
            out("ecx") _,
            out("edx") _,
            options(nomem, nostack, preserves_flags),
        );
    }
    (u64::from(hi) << 32) | u64::from(lo)
}

/// Reads the TSC using plain `RDTSC`.
///
/// Returns the 64-bit timestamp. Note: this is not serializing --
/// the CPU may reorder it relative to surrounding instructions. Suitable
/// for whole-run elapsed time, not per-sequence measurement.
#[cfg(target_arch = "x86_64")]
#[inline]
#[must_use]
pub fn read_tsc() -> u64 {
    let lo: u32;
    let hi: u32;
    // SAFETY: RDTSC is available on all x86_64 processors and has no side
    // effects.
    unsafe {
        core::arch::asm!(
            "rdtsc",
            out("eax") lo,
            out("edx") hi,
            options(nomem, nostack, preserves_flags),
        );
    }
    (u64::from(hi) << 32) | u64::from(lo)
}

#[cfg(all(test, target_arch = "x86_64"))]
mod tests {
    use super::*;

    #[test]
    fn stop_does_not_precede_start() {
        let start = start_cycle_timer();
        let stop = stop_cycle_timer();
        assert!(stop >= start);
    }

    #[test]
    fn tsc_advances() {
        let a = read_tsc();
        let mut x = 0u64;
        for i in 0..10_000u64 {
            x = std::hint::black_box(x.wrapping_add(i));
        }
        let b = read_tsc();
        assert!(b >= a, "TSC went backwards: {a} -> {b} (x={x})");
    }
}
