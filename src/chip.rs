//! FAN5345 chip constants and the pulse-transition law.
//!
//! The FAN5345 has no registers and no read-back. Every low→high edge on its
//! control line moves the internal step counter down by one, and stepping
//! below the dimmest step rolls the counter back to the brightest one.

/// Number of brightness steps the chip recognizes (1 = dimmest, 32 = brightest).
pub const NUM_STEPS: u32 = 32;

/// Lowest step that still lights the backlight. Anything below is "off".
pub const MIN_STEP: u32 = 1;

/// Minimum low time of one pulse, in nanoseconds.
pub const PULSE_LOW_NS: u32 = 500;

/// Minimum high time of one pulse, in nanoseconds.
pub const PULSE_HIGH_NS: u32 = 500;

/// How long the line must stay low for the chip to shut down, in microseconds.
pub const SHUTDOWN_HOLD_US: u32 = 1_000;

/// Driver name used when the device is registered.
pub const DRIVER_NAME: &str = "fan5345-bl";

/// Device-tree compatible string matched by this driver.
pub const COMPATIBLE: &str = "fairchild,fan5345";

/// Step the chip lands on after one pulse from `level`.
///
/// `0` (disabled) behaves like the bottom of the cycle: the next pulse wakes
/// the chip at full brightness.
pub const fn next_level(level: u32) -> u32 {
    if level > MIN_STEP {
        level - 1
    } else {
        NUM_STEPS
    }
}

/// Number of pulses [`Fan5345::set_level`](crate::Fan5345::set_level) emits to
/// move the mirror from `from` to `to`.
///
/// A target of `0` is reached by shutting down, not by pulsing, so it costs
/// no pulses. Both arguments must be in `0..=NUM_STEPS`.
pub const fn pulses_between(from: u32, to: u32) -> u32 {
    if to < MIN_STEP || from == to {
        return 0;
    }
    if from > to {
        from - to
    } else {
        // Down to the bottom, one pulse to wrap, then down to the target.
        from.saturating_sub(MIN_STEP) + 1 + (NUM_STEPS - to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_level_decrements() {
        assert_eq!(next_level(32), 31);
        assert_eq!(next_level(2), 1);
    }

    #[test]
    fn test_next_level_wraps_at_bottom() {
        assert_eq!(next_level(1), NUM_STEPS);
        assert_eq!(next_level(0), NUM_STEPS);
    }

    #[test]
    fn test_pulses_between_matches_stepping() {
        for from in 0..=NUM_STEPS {
            for to in MIN_STEP..=NUM_STEPS {
                let mut level = from;
                let mut pulses = 0;
                while level != to {
                    level = next_level(level);
                    pulses += 1;
                }
                assert_eq!(pulses_between(from, to), pulses, "from={from} to={to}");
            }
        }
    }

    #[test]
    fn test_pulses_between_wraparound_law() {
        for t in 2..=NUM_STEPS {
            assert_eq!(pulses_between(1, t), NUM_STEPS - t + 1);
        }
        assert_eq!(pulses_between(0, 16), 17);
        assert_eq!(pulses_between(0, 32), 1);
    }

    #[test]
    fn test_pulses_between_zero_target() {
        assert_eq!(pulses_between(5, 0), 0);
        assert_eq!(pulses_between(0, 0), 0);
    }
}
