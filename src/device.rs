//! Backlight device layer: attach, update and detach a FAN5345.

use crate::chip::{COMPATIBLE, DRIVER_NAME, NUM_STEPS};
use crate::config::{COMPATIBLE_PROP, Fan5345Config, LEVEL_GPIO, PinProvider, PropertySource, is_compatible};
use crate::controller::Fan5345;
use crate::error::BacklightError;
use crate::state::{BacklightOptions, BacklightProperties, PowerState};

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{OutputPin, PinState};
use log::{debug, error, info};

// =============================================================================
// Backlight Device Trait
// =============================================================================

/// The contract a brightness device offers to whatever owns it.
///
/// Implementors provide the two hardware callbacks, [`get_brightness`] and
/// [`update_status`]; the provided methods mirror the generic backlight
/// controls (brightness, power, suspend/resume) on top of them.
///
/// [`get_brightness`]: BacklightDevice::get_brightness
/// [`update_status`]: BacklightDevice::update_status
pub trait BacklightDevice {
    /// Current properties.
    fn properties(&self) -> &BacklightProperties;

    /// Mutable properties. Changes take effect on the next [`update_status`](Self::update_status).
    fn properties_mut(&mut self) -> &mut BacklightProperties;

    /// Optional behaviour this device supports.
    fn options(&self) -> BacklightOptions {
        BacklightOptions::default()
    }

    /// The brightness the device reports.
    fn get_brightness(&self) -> u32;

    /// Push the current properties to the hardware.
    fn update_status(&mut self) -> Result<(), BacklightError>;

    /// Request a new brightness and apply it.
    ///
    /// # Errors
    ///
    /// Returns [`BacklightError::BrightnessOutOfRange`] above `max_brightness`.
    fn set_brightness(&mut self, brightness: u32) -> Result<(), BacklightError> {
        let max = self.properties().max_brightness();
        if brightness > max {
            return Err(BacklightError::BrightnessOutOfRange {
                value: brightness,
                max,
            });
        }
        self.properties_mut().brightness = brightness;
        self.update_status()
    }

    /// Change the power state and apply it.
    fn set_power(&mut self, power: PowerState) -> Result<(), BacklightError> {
        self.properties_mut().power = power;
        self.update_status()
    }

    /// Mark the attached framebuffer blanked or unblanked and apply it.
    fn set_fb_blank(&mut self, blank: bool) -> Result<(), BacklightError> {
        self.properties_mut().fb_blank = blank;
        self.update_status()
    }

    /// Enter suspend. A no-op unless the device opts into suspend/resume.
    fn suspend(&mut self) -> Result<(), BacklightError> {
        if !self.options().core_suspend_resume {
            return Ok(());
        }
        self.properties_mut().suspended = true;
        self.update_status()
    }

    /// Leave suspend and restore the stored brightness.
    fn resume(&mut self) -> Result<(), BacklightError> {
        if !self.options().core_suspend_resume {
            return Ok(());
        }
        self.properties_mut().suspended = false;
        self.update_status()
    }
}

// =============================================================================
// Fan5345Backlight
// =============================================================================

/// A FAN5345 registered as a backlight device.
///
/// Created by [`attach`](Self::attach) and torn down by
/// [`detach`](Self::detach), which leaves the chip dark.
///
/// # Example
///
/// ```
/// use embedded_hal_mock::eh1::delay::NoopDelay;
/// use fan5345::{BacklightDevice, Fan5345Backlight, Properties, Trace};
///
/// let trace = Trace::new();
/// let props = Properties::new().with("default-level", "16");
/// let mut bl = Fan5345Backlight::attach("panel", &mut trace.pins(), &props, NoopDelay::new())?;
///
/// assert_eq!(bl.get_brightness(), 16);
/// bl.set_brightness(8)?;
/// assert_eq!(bl.chip().cur_level(), 8);
///
/// bl.detach()?;
/// # Ok::<(), fan5345::BacklightError>(())
/// ```
#[derive(Debug)]
pub struct Fan5345Backlight<P, D> {
    name: String,
    chip: Fan5345<P, D>,
    props: BacklightProperties,
}

impl<P, D> Fan5345Backlight<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    /// Acquire the control pin, read the configuration, register the device
    /// and apply the default level.
    ///
    /// A `compatible` property, when present, must name the FAN5345.
    ///
    /// # Errors
    ///
    /// - [`BacklightError::Incompatible`] if `compatible` names other devices only
    /// - Whatever `pins` returns if the [`LEVEL_GPIO`] pin cannot be requested
    /// - [`BacklightError::MissingProperty`] / [`BacklightError::InvalidProperty`]
    ///   if `default-level` is absent or malformed
    /// - [`BacklightError::Pin`] if applying the default level fails
    pub fn attach<G>(
        name: impl Into<String>,
        pins: &mut G,
        properties: &impl PropertySource,
        delay: D,
    ) -> Result<Self, BacklightError>
    where
        G: PinProvider<Pin = P>,
    {
        let name = name.into();

        if let Some(found) = properties.property(COMPATIBLE_PROP)
            && !is_compatible(properties)
        {
            error!("{}: not a {} device", name, COMPATIBLE);
            return Err(BacklightError::Incompatible {
                expected: COMPATIBLE,
                found: found.to_string(),
            });
        }

        let level_gpio = pins
            .request_output(LEVEL_GPIO, PinState::Low)
            .inspect_err(|e| error!("{}: failed to request GPIO: {}", name, e))?;

        let config = Fan5345Config::from_properties(properties)
            .inspect_err(|e| error!("{}: can't parse the level property: {}", name, e))?;

        let mut bl = Self {
            chip: Fan5345::new(level_gpio, delay),
            props: BacklightProperties::raw(NUM_STEPS),
            name,
        };
        debug!("{}: registered as {} backlight", bl.name, DRIVER_NAME);

        bl.props.brightness = config.default_level;
        bl.update_status()?;
        bl.props.fb_blank = false;
        bl.props.power = PowerState::Unblank;

        info!("{}: Driver Initialized.", bl.name);
        Ok(bl)
    }

    /// Turn the backlight off and hand back the pin and delay provider.
    pub fn detach(mut self) -> Result<(P, D), BacklightError> {
        self.props.power = PowerState::Powerdown;
        self.props.brightness = 0;
        self.update_status()?;

        info!("{}: Driver Unloaded.", self.name);
        Ok(self.chip.release())
    }

    /// Device name given at attach time.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying synchronizer.
    pub fn chip(&self) -> &Fan5345<P, D> {
        &self.chip
    }
}

impl<P, D> BacklightDevice for Fan5345Backlight<P, D>
where
    P: OutputPin,
    D: DelayNs,
{
    fn properties(&self) -> &BacklightProperties {
        &self.props
    }

    fn properties_mut(&mut self) -> &mut BacklightProperties {
        &mut self.props
    }

    fn options(&self) -> BacklightOptions {
        BacklightOptions {
            core_suspend_resume: true,
        }
    }

    fn get_brightness(&self) -> u32 {
        self.props.brightness
    }

    fn update_status(&mut self) -> Result<(), BacklightError> {
        // Anything above the chip's top step would never be reached by pulsing.
        let brightness = self.props.effective_brightness().min(NUM_STEPS);
        debug!(
            "{}: update_status brightness={} (requested {}, power={:?}, suspended={})",
            self.name, brightness, self.props.brightness, self.props.power, self.props.suspended
        );
        self.chip.set_level(brightness)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Properties;
    use crate::mock::{Trace, TraceDelay, TracePin};

    fn attach(trace: &Trace, level: &str) -> Fan5345Backlight<TracePin, TraceDelay> {
        let props = Properties::new().with("default-level", level);
        Fan5345Backlight::attach("test", &mut trace.pins(), &props, trace.delay()).unwrap()
    }

    #[test]
    fn test_attach_reports_raw_range() {
        let trace = Trace::new();
        let bl = attach(&trace, "16");

        let props = bl.properties();
        assert_eq!(props.max_brightness(), NUM_STEPS);
        assert_eq!(props.kind, crate::BacklightType::Raw);
        assert_eq!(props.power, PowerState::Unblank);
        assert!(bl.options().core_suspend_resume);
        assert_eq!(bl.name(), "test");
    }

    #[test]
    fn test_get_brightness_reports_requested_value() {
        let trace = Trace::new();
        let mut bl = attach(&trace, "16");

        bl.suspend().unwrap();
        assert_eq!(bl.chip().cur_level(), 0);
        assert_eq!(bl.get_brightness(), 16);
    }

    #[test]
    fn test_set_brightness_rejects_out_of_range() {
        let trace = Trace::new();
        let mut bl = attach(&trace, "16");
        trace.clear();

        let err = bl.set_brightness(33).unwrap_err();
        assert!(matches!(
            err,
            BacklightError::BrightnessOutOfRange { value: 33, max: 32 }
        ));
        assert_eq!(bl.get_brightness(), 16);
        assert!(trace.events().is_empty());
    }

    #[test]
    fn test_suspend_resume() {
        let trace = Trace::new();
        let mut bl = attach(&trace, "20");

        bl.suspend().unwrap();
        assert_eq!(bl.chip().cur_level(), 0);
        assert_eq!(trace.chip_level(), 0);

        trace.clear();
        bl.resume().unwrap();
        assert_eq!(bl.chip().cur_level(), 20);
        assert_eq!(trace.pulse_count(), 13);
    }

    #[test]
    fn test_power_and_blank() {
        let trace = Trace::new();
        let mut bl = attach(&trace, "10");

        bl.set_power(PowerState::Powerdown).unwrap();
        assert_eq!(bl.chip().cur_level(), 0);
        bl.set_power(PowerState::Unblank).unwrap();
        assert_eq!(bl.chip().cur_level(), 10);

        bl.set_fb_blank(true).unwrap();
        assert_eq!(bl.chip().cur_level(), 0);
        bl.set_fb_blank(false).unwrap();
        assert_eq!(bl.chip().cur_level(), 10);
    }

    #[test]
    fn test_detach_leaves_chip_dark() {
        let trace = Trace::new();
        let bl = attach(&trace, "16");
        trace.clear();

        bl.detach().unwrap();
        assert_eq!(trace.shutdown_count(), 1);
        assert_eq!(trace.pulse_count(), 0);
        assert_eq!(trace.chip_level(), 0);
    }

    #[test]
    fn test_attach_pin_request_failure() {
        let trace = Trace::new();
        let props = Properties::new().with("default-level", "16");
        let err = Fan5345Backlight::attach("test", &mut trace.unavailable_pins(), &props, trace.delay())
            .unwrap_err();

        assert!(matches!(err, BacklightError::PinRequest { name: LEVEL_GPIO, .. }));
        assert!(trace.events().is_empty());
    }

    #[test]
    fn test_attach_missing_level() {
        let trace = Trace::new();
        let err = Fan5345Backlight::attach("test", &mut trace.pins(), &Properties::new(), trace.delay())
            .unwrap_err();

        assert!(matches!(err, BacklightError::MissingProperty("default-level")));
        assert!(trace.events().is_empty());
    }

    #[test]
    fn test_update_status_clamps_to_top_step() {
        let trace = Trace::new();
        let mut bl = attach(&trace, "16");
        trace.clear();

        bl.properties_mut().brightness = 40;
        bl.update_status().unwrap();

        assert_eq!(bl.chip().cur_level(), NUM_STEPS);
        assert_eq!(trace.chip_level(), NUM_STEPS);
        assert_eq!(trace.pulse_count() as u32, crate::pulses_between(16, NUM_STEPS));
    }

    #[test]
    fn test_attach_checks_compatible() {
        let trace = Trace::new();
        let props = Properties::new()
            .with("compatible", "acme,panel")
            .with("default-level", "16");
        let err = Fan5345Backlight::attach("test", &mut trace.pins(), &props, trace.delay())
            .unwrap_err();

        assert!(matches!(err, BacklightError::Incompatible { .. }));
        assert!(trace.events().is_empty());

        let props = Properties::parse("compatible = \"fairchild,fan5345\"; default-level = <16>;");
        let bl = Fan5345Backlight::attach("test", &mut trace.pins(), &props, trace.delay()).unwrap();
        assert_eq!(bl.chip().cur_level(), 16);
    }

    #[test]
    fn test_attach_invalid_level() {
        let trace = Trace::new();
        let props = Properties::new().with("default-level", "<1 2>");
        let err = Fan5345Backlight::attach("test", &mut trace.pins(), &props, trace.delay())
            .unwrap_err();

        assert!(matches!(err, BacklightError::InvalidProperty { .. }));
    }
}
