//! Linux host GPIO and delay, via `linux-embedded-hal`.

use crate::config::PinProvider;
use crate::error::BacklightError;

use embedded_hal::digital::{ErrorKind, PinState};
use linux_embedded_hal::SysfsPin;
use log::debug;
use std::collections::BTreeMap;

/// Blocking host delay from `linux-embedded-hal`.
///
/// It sleeps the thread, so every hold lasts at least as long as requested
/// but may run long under load. For pulses the upper bound is the risk: a
/// low phase stretched toward [`SHUTDOWN_HOLD_US`](crate::SHUTDOWN_HOLD_US)
/// reads as a shutdown instead of a step, and the mirror goes out of sync
/// until the next `set_level(0)`.
pub use linux_embedded_hal::Delay;

/// Maps logical pin names onto sysfs GPIO numbers.
///
/// Requested lines are exported and switched to output at the requested
/// initial level.
///
/// # Example
///
/// ```no_run
/// use fan5345::{Delay, Fan5345Backlight, Properties, SysfsPins};
///
/// let mut pins = SysfsPins::new().with_pin("level", 17);
/// let props = Properties::new().with("default-level", "24");
/// let _bl = Fan5345Backlight::attach("lcd", &mut pins, &props, Delay)?;
/// # Ok::<(), fan5345::BacklightError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct SysfsPins {
    lines: BTreeMap<String, u64>,
}

impl SysfsPins {
    /// Create a provider with no lines bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a logical name to a GPIO number.
    pub fn with_pin(mut self, name: impl Into<String>, number: u64) -> Self {
        self.lines.insert(name.into(), number);
        self
    }

    /// GPIO number bound to `name`.
    pub fn line(&self, name: &str) -> Option<u64> {
        self.lines.get(name).copied()
    }
}

impl PinProvider for SysfsPins {
    type Pin = SysfsPin;

    fn request_output(
        &mut self,
        name: &'static str,
        initial: PinState,
    ) -> Result<SysfsPin, BacklightError> {
        let number = self.line(name).ok_or(BacklightError::PinRequest {
            name,
            kind: ErrorKind::Other,
        })?;

        debug!("exporting gpio{} as '{}'", number, name);
        let pin = SysfsPin::new(number);
        pin.export().map_err(|e| BacklightError::Gpio {
            number,
            reason: e.to_string(),
        })?;
        pin.into_output_pin(initial).map_err(|e| BacklightError::Gpio {
            number,
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_pin_binds_lines() {
        let pins = SysfsPins::new().with_pin("level", 17);
        assert_eq!(pins.line("level"), Some(17));
        assert_eq!(pins.line("enable"), None);
    }

    #[test]
    fn test_provider_unknown_name() {
        let mut pins = SysfsPins::new();

        let err = pins.request_output("level", PinState::Low).err().unwrap();
        assert!(matches!(err, BacklightError::PinRequest { name: "level", .. }));
    }
}
