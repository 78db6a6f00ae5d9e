//! # Host FPU rounding adapter
//!
//! Guest FP instructions run on the host FPU, so the host control register has
//! to round and flush the way the guest FPSCR says. Each supported host
//! architecture provides one [`FpuControl`] implementation, chosen at build
//! time:
//!
//! | host          | register | round to zero | DN approximation        |
//! |---------------|----------|---------------|-------------------------|
//! | x86 / x86_64  | MXCSR    | RC = 11       | FTZ                     |
//! | arm           | FPSCR    | RMode = 11    | FZ (+ default NaN)      |
//! | aarch64       | FPCR     | RMode = 11    | FZ (+ default NaN)      |
//!
//! Flush-to-zero also zeroes denormal *results*, which SH-4 DN does not
//! strictly require. The approximation is kept as is.
//!
//! Control register writes are expensive, so the last applied
//! [`GuestRounding`] is remembered per thread and identical requests are
//! skipped. The FPU control register belongs to the thread, and so does the
//! cache: every thread running guest arithmetic starts with
//! [`force_resync`].

use std::cell::RefCell;

use tracing::debug;

use crate::cpu::fpscr::GuestRounding;

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod x86;
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub use x86::{NativeFpu, STICKY_FLAGS, encode};

#[cfg(target_arch = "arm")]
mod arm;
#[cfg(target_arch = "arm")]
pub use arm::{NativeFpu, STICKY_FLAGS, encode};

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "aarch64")]
pub use aarch64::{NativeFpu, STICKY_FLAGS, encode};

#[cfg(not(any(
    target_arch = "x86",
    target_arch = "x86_64",
    target_arch = "arm",
    target_arch = "aarch64"
)))]
compile_error!(
    "no host floating-point control register mapping for this target_arch (supported: x86, x86_64, arm, aarch64)"
);

/// Access to the host floating-point control register of the current thread.
///
/// The compiler assumes the default FP environment and may move float
/// operations across a write, so guest FP work must sit behind an
/// optimization barrier such as [`std::hint::black_box`].
pub trait FpuControl {
    /// Current raw value of the control register.
    fn read(&self) -> u64;

    /// Programs the control register for `rounding` and returns the raw value written.
    fn write(&mut self, rounding: GuestRounding) -> u64;
}

/// Memoizing front of an [`FpuControl`].
#[derive(Debug)]
pub struct HostRounding<C: FpuControl = NativeFpu> {
    control: C,
    /// `None` until the first write, and again after [`Self::invalidate`].
    last: Option<GuestRounding>,
    writes: u64,
}

impl<C: FpuControl> HostRounding<C> {
    pub const fn new(control: C) -> Self {
        Self {
            control,
            last: None,
            writes: 0,
        }
    }

    /// Writes `rounding` to the host unless it is already the applied one.
    /// Returns whether the control register was written.
    pub fn apply(&mut self, rounding: GuestRounding) -> bool {
        if self.last == Some(rounding) {
            return false;
        }

        self.last = Some(rounding);
        let value = self.control.write(rounding);
        self.writes += 1;
        debug!(
            round_mode = rounding.round_mode,
            denormals_as_zero = rounding.denormals_as_zero,
            "host fp control set to {value:#010x}"
        );
        true
    }

    /// Forgets the applied state so the next [`Self::apply`] always writes.
    pub const fn invalidate(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub const fn last_applied(&self) -> Option<GuestRounding> {
        self.last
    }

    /// Number of control register writes performed so far.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.writes
    }

    pub const fn control(&self) -> &C {
        &self.control
    }
}

thread_local! {
    static HOST_ROUNDING: RefCell<HostRounding> = const { RefCell::new(HostRounding::new(NativeFpu)) };
}

/// Makes the host FPU of the calling thread round and flush like `rounding`.
pub fn apply_host_rounding(rounding: GuestRounding) {
    HOST_ROUNDING.with_borrow_mut(|host| {
        host.apply(rounding);
    });
}

/// Marks the calling thread's host state as unknown. Needed whenever something
/// outside this crate may have touched the control register: thread start,
/// return from foreign code, state load.
pub fn force_resync() {
    HOST_ROUNDING.with_borrow_mut(HostRounding::invalidate);
}

/// Control register writes performed by the calling thread.
#[must_use]
pub fn host_write_count() -> u64 {
    HOST_ROUNDING.with_borrow(HostRounding::writes)
}

/// Guest rounding last written by the calling thread, if known.
#[must_use]
pub fn last_applied() -> Option<GuestRounding> {
    HOST_ROUNDING.with_borrow(HostRounding::last_applied)
}

/// Live value of the calling thread's control register.
#[must_use]
pub fn read_host_control() -> u64 {
    NativeFpu.read()
}

#[cfg(test)]
pub(crate) fn on_fresh_thread<T, F>(f: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    match std::thread::spawn(f).join() {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// `(1 + ulp) + ulp/2`: an exact tie between two neighbours, the lower one odd.
#[cfg(test)]
pub(crate) fn tie_sum() -> f32 {
    let a = std::hint::black_box(1.0_f32 + f32::EPSILON);
    let b = std::hint::black_box(f32::EPSILON / 2.0);
    std::hint::black_box(a + b)
}

#[cfg(test)]
pub(crate) fn subnormal_quotient() -> f32 {
    let a = std::hint::black_box(f32::MIN_POSITIVE);
    let b = std::hint::black_box(3.0_f32);
    std::hint::black_box(a / b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const NEAREST: f32 = 1.0 + 2.0 * f32::EPSILON;
    const TRUNCATED: f32 = 1.0 + f32::EPSILON;

    #[derive(Default)]
    struct Recording {
        written: Vec<GuestRounding>,
    }

    impl FpuControl for Recording {
        fn read(&self) -> u64 {
            self.written.len() as u64
        }

        fn write(&mut self, rounding: GuestRounding) -> u64 {
            self.written.push(rounding);
            u64::from(rounding.round_mode)
        }
    }

    #[test]
    fn identical_requests_write_once() {
        let mut host = HostRounding::new(Recording::default());
        let rtz = GuestRounding::new(1, false);

        assert!(host.apply(rtz));
        assert!(!host.apply(rtz));

        assert_eq!(host.writes(), 1);
        assert_eq!(host.control().written, vec![rtz]);
    }

    #[test]
    fn either_field_change_writes() {
        let mut host = HostRounding::new(Recording::default());
        host.apply(GuestRounding::new(0, false));
        host.apply(GuestRounding::new(0, true));
        host.apply(GuestRounding::new(1, true));
        host.apply(GuestRounding::new(1, true));

        assert_eq!(host.writes(), 3);
        assert_eq!(host.last_applied(), Some(GuestRounding::new(1, true)));
    }

    #[test]
    fn invalidate_forces_next_write() {
        let mut host = HostRounding::new(Recording::default());
        host.apply(GuestRounding::DEFAULT);
        host.invalidate();
        assert_eq!(host.last_applied(), None);

        assert!(host.apply(GuestRounding::DEFAULT));
        assert_eq!(host.writes(), 2);
    }

    #[test]
    fn thread_cache_starts_unknown() {
        let (count, last) = on_fresh_thread(|| (host_write_count(), last_applied()));
        assert_eq!(count, 0);
        assert_eq!(last, None);
    }

    #[test]
    fn thread_local_write_is_memoized() {
        let count = on_fresh_thread(|| {
            apply_host_rounding(GuestRounding::new(1, false));
            apply_host_rounding(GuestRounding::new(1, false));
            host_write_count()
        });
        assert_eq!(count, 1);
    }

    #[test]
    fn caches_are_per_thread() {
        let count = on_fresh_thread(|| {
            apply_host_rounding(GuestRounding::new(1, true));
            let other = on_fresh_thread(|| {
                apply_host_rounding(GuestRounding::new(1, true));
                host_write_count()
            });
            (host_write_count(), other)
        });
        assert_eq!(count, (1, 1));
    }

    #[test]
    fn written_value_matches_encoding() {
        let (written, expected) = on_fresh_thread(|| {
            let before = read_host_control();
            let rounding = GuestRounding::new(1, true);
            apply_host_rounding(rounding);
            (read_host_control(), encode(rounding, before))
        });
        assert_eq!(written & !STICKY_FLAGS, expected & !STICKY_FLAGS);
    }

    #[test]
    fn tie_rounding_follows_round_mode() {
        for round_mode in [0, 1] {
            for denormals_as_zero in [false, true] {
                let sum = on_fresh_thread(move || {
                    apply_host_rounding(GuestRounding::new(round_mode, denormals_as_zero));
                    tie_sum()
                });
                let expected = if round_mode == 1 { TRUNCATED } else { NEAREST };
                assert_eq!(
                    sum.to_bits(),
                    expected.to_bits(),
                    "RM={round_mode} DN={denormals_as_zero}"
                );
            }
        }
    }

    #[test]
    fn reserved_round_modes_round_to_nearest() {
        for round_mode in [2, 3] {
            let sum = on_fresh_thread(move || {
                apply_host_rounding(GuestRounding::new(round_mode, false));
                tie_sum()
            });
            assert_eq!(sum.to_bits(), NEAREST.to_bits());
        }
    }

    #[test]
    fn subnormal_results_survive_without_dn() {
        let q = on_fresh_thread(|| {
            apply_host_rounding(GuestRounding::DEFAULT);
            subnormal_quotient()
        });
        assert!(q.is_subnormal(), "{q:e}");
    }

    // DN is approximated with host flush-to-zero, which also flushes denormal
    // results. SH-4 hardware does the same for DN=1, but bit-exactness for
    // every operation is not guaranteed.
    #[test]
    fn dn_flushes_subnormal_results() {
        let q = on_fresh_thread(|| {
            apply_host_rounding(GuestRounding::new(0, true));
            subnormal_quotient()
        });
        assert_eq!(q.to_bits(), 0);
    }
}
