//! FAN5345 brightness synchronizer.

use crate::chip::{MIN_STEP, NUM_STEPS, PULSE_HIGH_NS, PULSE_LOW_NS, SHUTDOWN_HOLD_US, next_level};
use crate::error::BacklightError;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use log::{debug, trace};

/// Pulse-counting driver for one FAN5345.
///
/// The chip cannot be read back, so the driver keeps a mirror of the step it
/// believes the chip is on and emits the minimum number of pulses needed to
/// reach a requested step. The mirror starts at `0` (disabled), matching the
/// chip's power-on state.
///
/// Every operation takes `&mut self`, so calls on one handle never overlap.
///
/// # Example
///
/// ```
/// use embedded_hal_mock::eh1::delay::NoopDelay;
/// use fan5345::{Fan5345, Trace};
///
/// let trace = Trace::new();
/// let mut chip = Fan5345::new(trace.pin(), NoopDelay::new());
///
/// // From disabled, the first pulse wakes the chip at step 32.
/// assert_eq!(chip.set_level(32)?, 1);
/// assert_eq!(chip.cur_level(), 32);
/// # Ok::<(), fan5345::BacklightError>(())
/// ```
#[derive(Debug)]
pub struct Fan5345<P, D> {
    level_gpio: P,
    delay: D,
    cur_level: u32,
}

impl<P, D> Fan5345<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Take ownership of the control pin and a delay provider.
    ///
    /// The pin is not touched; the mirror assumes the chip is disabled.
    pub fn new(level_gpio: P, delay: D) -> Self {
        Self {
            level_gpio,
            delay,
            cur_level: 0,
        }
    }

    /// The step the driver believes the chip is on (`0` = disabled).
    pub fn cur_level(&self) -> u32 {
        self.cur_level
    }

    /// Shut the chip down.
    ///
    /// Drives the control line low and holds it for [`SHUTDOWN_HOLD_US`],
    /// long enough for the chip to treat it as a shutdown rather than a pulse.
    pub fn disable(&mut self) -> Result<(), BacklightError> {
        debug!("disabling backlight (was at step {})", self.cur_level);

        self.cur_level = 0;
        self.level_gpio.set_low().map_err(BacklightError::pin)?;
        // The line must stay low for 1ms to cause a shutdown.
        self.delay.delay_us(SHUTDOWN_HOLD_US);
        Ok(())
    }

    /// Converge the chip onto `brightness`, returning the number of pulses sent.
    ///
    /// `brightness` must already be clamped to `0..=NUM_STEPS`. A target below
    /// [`MIN_STEP`] always shuts the chip down first, even if the mirror is
    /// already `0`. Since the chip only counts down, going up by one step costs
    /// a full trip around the cycle.
    ///
    /// # Errors
    ///
    /// Returns [`BacklightError::Pin`] if a pin write fails. The mirror then
    /// reflects only the pulses that completed.
    pub fn set_level(&mut self, brightness: u32) -> Result<u32, BacklightError> {
        debug_assert!(brightness <= NUM_STEPS, "brightness {brightness} out of range");

        if brightness < MIN_STEP {
            self.disable()?;
        }

        let mut pulses = 0;
        while self.cur_level != brightness {
            self.pulse()?;
            pulses += 1;
        }

        debug!("backlight at step {} after {} pulses", self.cur_level, pulses);
        Ok(pulses)
    }

    /// Give back the pin and delay provider.
    pub fn release(self) -> (P, D) {
        (self.level_gpio, self.delay)
    }

    fn pulse(&mut self) -> Result<(), BacklightError> {
        self.level_gpio.set_low().map_err(BacklightError::pin)?;
        self.delay.delay_ns(PULSE_LOW_NS);
        self.level_gpio.set_high().map_err(BacklightError::pin)?;
        self.delay.delay_ns(PULSE_HIGH_NS);

        self.cur_level = next_level(self.cur_level);
        trace!("pulse -> step {}", self.cur_level);
        Ok(())
    }
}
