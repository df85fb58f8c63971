//! Integer helpers for ramp interval math
//!
//! Everything here is 64-bit unsigned arithmetic; there is deliberately no
//! floating point so the generated step schedules are identical on every
//! target, FPU or not.

pub(crate) const NSEC_PER_SEC: u64 = 1_000_000_000;

/// Largest `K` such that `2 * K * K` still fits in 64 bits
///
/// Pre-scaling the radicand by `K^2` gives the integer square root its
/// maximum usable precision before the final division by `K`.
const SQRT_SCALE: u64 = 3_037_000_499;

/// Integer square root, `isqrt(n) == floor(sqrt(n))`
///
/// Babylonian iteration; converges in well under 64 rounds for any input.
pub(crate) fn isqrt(n: u64) -> u64 {
    if n < 2 {
        return n;
    }
    let mut x = n;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + n / x) / 2;
    }
    x
}

/// Interval before the first step when ramping from rest, in nanoseconds
///
/// The classic approximation `c0 = f * sqrt(2 / rate)`, corrected by the
/// 0.676 factor that compensates the error of the step-indexed recurrence
/// against the ideal constant-acceleration schedule.
///
/// `rate` is in steps/s^2 and must be non-zero.
pub(crate) fn initial_interval(rate: u32) -> u64 {
    (NSEC_PER_SEC * 676 / 1000) * isqrt(2 * SQRT_SCALE * SQRT_SCALE / rate as u64) / SQRT_SCALE
}

/// Steps needed to change between rest and the speed implied by `interval_ns`
///
/// Closed form `steps = (f / interval)^2 / (2 * rate)`. Works for both
/// directions of the change: accelerating from rest up to that speed, or
/// decelerating from it back to rest. An interval of 0 means "at rest" and
/// needs no steps.
pub(crate) fn ramp_steps(interval_ns: u64, rate: u32) -> u64 {
    if interval_ns == 0 {
        return 0;
    }
    let speed = NSEC_PER_SEC / interval_ns;
    speed * speed / (2 * rate as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_isqrt_known_values() {
        assert_eq!(isqrt(0), 0);
        assert_eq!(isqrt(1), 1);
        assert_eq!(isqrt(4), 2);
        assert_eq!(isqrt(10), 3);
        assert_eq!(isqrt(15), 3);
        assert_eq!(isqrt(16), 4);
        assert_eq!(isqrt(2 * SQRT_SCALE * SQRT_SCALE), 4_294_967_294);
        assert_eq!(isqrt(u64::MAX), 4_294_967_295);
    }

    #[test]
    fn test_initial_interval_reference_values() {
        // c0 = 0.676e9 * sqrt(2 / rate), evaluated in fixed point
        assert_eq!(initial_interval(100), 95_600_836);
        assert_eq!(initial_interval(500), 42_753_993);
        assert_eq!(initial_interval(1000), 30_231_638);
        assert_eq!(initial_interval(2000), 21_376_996);
    }

    #[test]
    fn test_ramp_steps() {
        // 1 ms/step = 1000 steps/s; 1000^2 / (2 * 500) = 1000
        assert_eq!(ramp_steps(1_000_000, 500), 1000);
        // 0.5 ms/step = 2000 steps/s; 2000^2 / (2 * 1000) = 2000
        assert_eq!(ramp_steps(500_000, 1000), 2000);
        // at rest
        assert_eq!(ramp_steps(0, 500), 0);
        // too slow to need any ramp steps
        assert_eq!(ramp_steps(NSEC_PER_SEC, 1000), 0);
    }

    proptest! {
        #[test]
        fn prop_isqrt_bounds(n in any::<u64>()) {
            let root = isqrt(n);
            prop_assert!(root * root <= n);
            // (root + 1)^2 > n, guarding the squaring against overflow
            let above = root + 1;
            prop_assert!(above.checked_mul(above).map_or(true, |sq| sq > n));
        }

        #[test]
        fn prop_isqrt_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(isqrt(lo) <= isqrt(hi));
        }

        #[test]
        fn prop_initial_interval_decreases_with_rate(rate in 1u32..1_000_000) {
            // A harder acceleration never lengthens the first interval.
            prop_assert!(initial_interval(rate + 1) <= initial_interval(rate));
        }
    }
}
