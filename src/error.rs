//! Error types for the FAN5345 backlight driver.

use embedded_hal::digital::ErrorKind;

/// Errors that can occur when attaching or driving a FAN5345 backlight.
#[derive(Debug, thiserror::Error)]
pub enum BacklightError {
    /// The control GPIO could not be acquired at attach time.
    #[error("Failed to request GPIO '{name}': {kind}")]
    PinRequest {
        /// Logical name of the pin.
        name: &'static str,
        /// The underlying pin error.
        kind: ErrorKind,
    },

    /// A required configuration property was not present.
    #[error("Missing property '{0}'")]
    MissingProperty(&'static str),

    /// A configuration property was present but could not be parsed.
    #[error("Can't parse the {name} property (got '{value}')")]
    InvalidProperty {
        /// The property name.
        name: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A brightness above the device maximum was requested.
    #[error("Brightness {value} out of range (expected 0-{max})")]
    BrightnessOutOfRange {
        /// The rejected value.
        value: u32,
        /// Maximum allowed value.
        max: u32,
    },

    /// Writing the control GPIO failed while pulsing.
    #[error("GPIO write failed: {0}")]
    Pin(ErrorKind),

    /// A host GPIO line could not be exported or configured.
    #[error("Failed to set up gpio{number}: {reason}")]
    Gpio {
        /// The GPIO number.
        number: u64,
        /// What the GPIO layer reported.
        reason: String,
    },

    /// The device's compatible list does not name a FAN5345.
    #[error("Device is not compatible with {expected} (got '{found}')")]
    Incompatible {
        /// The compatible string this driver matches.
        expected: &'static str,
        /// The compatible list that was found.
        found: String,
    },
}

impl BacklightError {
    /// Wrap a pin error raised by an `embedded-hal` output.
    pub(crate) fn pin<E: embedded_hal::digital::Error>(err: E) -> Self {
        Self::Pin(err.kind())
    }
}
