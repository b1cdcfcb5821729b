//! Attach-time configuration.
//!
//! The driver needs two things from its platform: the control GPIO, looked up
//! by the logical name [`LEVEL_GPIO`], and the initial brightness, read from
//! the [`DEFAULT_LEVEL`] property. Both come through small traits so that a
//! device tree, a sysfs export or a test double can provide them.

use crate::chip::{COMPATIBLE, NUM_STEPS};
use crate::error::BacklightError;

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;
use std::collections::BTreeMap;

/// Logical name of the control GPIO.
pub const LEVEL_GPIO: &str = "level";

/// Name of the initial brightness property.
pub const DEFAULT_LEVEL: &str = "default-level";

/// Name of the property listing compatible device strings.
pub const COMPATIBLE_PROP: &str = "compatible";

/// Source of named device properties.
pub trait PropertySource {
    /// Raw value of a property, if present.
    fn property(&self, name: &str) -> Option<&str>;

    /// Read a single 32-bit cell.
    ///
    /// Accepts `16`, `0x10` and the cell form `<16>`.
    ///
    /// # Errors
    ///
    /// - [`BacklightError::MissingProperty`] if the property is absent
    /// - [`BacklightError::InvalidProperty`] if it is not one unsigned cell
    fn read_u32(&self, name: &'static str) -> Result<u32, BacklightError> {
        let raw = self
            .property(name)
            .ok_or(BacklightError::MissingProperty(name))?;
        parse_cell(raw).ok_or_else(|| BacklightError::InvalidProperty {
            name,
            value: raw.to_string(),
        })
    }
}

/// Source of output pins, looked up by logical name.
pub trait PinProvider {
    /// The pin type handed out.
    type Pin: OutputPin;

    /// Request an output pin and drive it to `initial`.
    fn request_output(
        &mut self,
        name: &'static str,
        initial: PinState,
    ) -> Result<Self::Pin, BacklightError>;
}

fn parse_cell(raw: &str) -> Option<u32> {
    let raw = raw.trim();
    let raw = match raw.strip_prefix('<') {
        Some(rest) => rest.strip_suffix('>')?.trim(),
        None => raw,
    };
    if raw.contains(char::is_whitespace) {
        return None;
    }
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => raw.parse().ok(),
    }
}

/// In-memory property table.
///
/// # Example
///
/// ```
/// use fan5345::{Properties, PropertySource};
///
/// let props = Properties::parse(r#"
///     compatible = "fairchild,fan5345";
///     default-level = <16>;
/// "#);
/// assert_eq!(props.read_u32("default-level")?, 16);
/// # Ok::<(), fan5345::BacklightError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    entries: BTreeMap<String, String>,
}

impl Properties {
    /// Create an empty property table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Add or replace a property in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    /// Parse device-tree style `name = value;` statements.
    ///
    /// Statements without a value become empty (boolean) properties, a single
    /// quoted string loses its quotes and `//` comments are ignored.
    pub fn parse(text: &str) -> Self {
        let mut props = Self::new();
        let stripped: String = text
            .lines()
            .map(|line| line.split("//").next().unwrap_or_default())
            .collect::<Vec<_>>()
            .join("\n");

        for statement in stripped.split(';') {
            let statement = statement.trim();
            if statement.is_empty() {
                continue;
            }
            let (name, value) = match statement.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => (statement, ""),
            };
            let value = match value.matches('"').count() {
                2 => value
                    .strip_prefix('"')
                    .and_then(|v| v.strip_suffix('"'))
                    .unwrap_or(value),
                _ => value,
            };
            props.insert(name, value);
        }
        props
    }
}

impl PropertySource for Properties {
    fn property(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }
}

/// Whether a property source describes a FAN5345.
pub fn is_compatible(source: &impl PropertySource) -> bool {
    source.property(COMPATIBLE_PROP).is_some_and(|list| {
        if list.contains('"') {
            // "a,b", "c,d": every other piece sits between quotes.
            list.split('"').skip(1).step_by(2).any(|s| s == COMPATIBLE)
        } else {
            list.trim() == COMPATIBLE
        }
    })
}

/// Attach-time settings for one FAN5345.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fan5345Config {
    /// Brightness applied right after attach (0..=NUM_STEPS).
    pub default_level: u32,
}

impl Fan5345Config {
    /// Read the configuration, clamping an out-of-range level.
    ///
    /// # Errors
    ///
    /// Fails if [`DEFAULT_LEVEL`] is missing or cannot be parsed.
    pub fn from_properties(source: &impl PropertySource) -> Result<Self, BacklightError> {
        let mut default_level = source.read_u32(DEFAULT_LEVEL)?;

        if default_level > NUM_STEPS {
            warn!(
                "FAN5345 level of {} is out of range. Setting to {}.",
                default_level, NUM_STEPS
            );
            default_level = NUM_STEPS;
        }

        Ok(Self { default_level })
    }
}
