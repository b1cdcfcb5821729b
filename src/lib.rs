//! Driver for the Fairchild FAN5345 LED backlight driver.
//!
//! The FAN5345 is controlled over a single GPIO line by counting pulses. Each
//! low→high pulse moves the chip one step down its 32-step brightness range,
//! wrapping from the dimmest step back to the brightest; holding the line low
//! for a millisecond shuts it down. There is no way to read the chip back, so
//! this crate keeps a mirror of the step the chip should be on and emits the
//! shortest pulse train that reaches the requested step.
//!
//! The crate is built on `embedded-hal` 1.0: any [`OutputPin`] and [`DelayNs`]
//! will do. On Linux hosts, [`SysfsPins`] hands out `linux-embedded-hal` sysfs
//! pins and [`Delay`] is its sleeping delay.
//!
//! [`OutputPin`]: embedded_hal::digital::OutputPin
//! [`DelayNs`]: embedded_hal::delay::DelayNs
//!
//! # Example
//!
//! ```no_run
//! use fan5345::{BacklightDevice, Delay, Fan5345Backlight, Properties, SysfsPins};
//!
//! fn main() -> Result<(), fan5345::BacklightError> {
//!     // Map the "level" line onto GPIO 17
//!     let mut pins = SysfsPins::new().with_pin("level", 17);
//!
//!     // Attach with an initial brightness of 16 (of 32)
//!     let props = Properties::parse("default-level = <16>;");
//!     let mut bl = Fan5345Backlight::attach("lcd", &mut pins, &props, Delay)?;
//!
//!     // Go one step brighter (costs a trip around the cycle)
//!     bl.set_brightness(17)?;
//!
//!     // Leave the panel dark
//!     bl.detach()?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Testing
//!
//! Use [`Trace`] to record what the driver does to the line:
//!
//! ```
//! use fan5345::{Fan5345, Trace};
//!
//! let trace = Trace::new();
//! let mut chip = Fan5345::new(trace.pin(), trace.delay());
//! chip.set_level(16).unwrap();
//! assert_eq!(trace.pulse_count(), 17);
//! assert_eq!(trace.chip_level(), 16);
//! ```

#![warn(missing_docs)]

mod chip;
mod config;
mod controller;
mod device;
mod error;
mod mock;
mod state;
mod sysfs;

// Re-export public API
pub use chip::{
    COMPATIBLE, DRIVER_NAME, MIN_STEP, NUM_STEPS, PULSE_HIGH_NS, PULSE_LOW_NS, SHUTDOWN_HOLD_US,
    next_level, pulses_between,
};
pub use config::{
    COMPATIBLE_PROP, DEFAULT_LEVEL, Fan5345Config, LEVEL_GPIO, PinProvider, Properties,
    PropertySource, is_compatible,
};
pub use controller::Fan5345;
pub use device::{BacklightDevice, Fan5345Backlight};
pub use error::BacklightError;
pub use mock::{Event, Trace, TraceDelay, TracePin, TracePins};
pub use state::{BacklightOptions, BacklightProperties, BacklightType, PowerState};
pub use sysfs::{Delay, SysfsPins};
