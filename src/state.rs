//! Backlight device properties.

/// How brightness values map onto light output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BacklightType {
    /// Values are written straight to the hardware without any scaling.
    #[default]
    Raw,
}

/// Power state requested for the backlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerState {
    /// Backlight powered and showing the requested brightness.
    #[default]
    Unblank,
    /// Backlight powered down.
    Powerdown,
}

/// Optional behaviour a backlight device opts into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BacklightOptions {
    /// Darken on suspend and restore the stored brightness on resume.
    pub core_suspend_resume: bool,
}

/// The properties of a registered backlight device.
///
/// `brightness` is the last *requested* value. It is what
/// [`BacklightDevice::get_brightness`](crate::BacklightDevice::get_brightness)
/// reports, since the hardware cannot be asked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BacklightProperties {
    /// Requested brightness (0..=max_brightness).
    pub brightness: u32,
    /// Fixed by the hardware at registration.
    max_brightness: u32,
    /// Brightness scaling.
    pub kind: BacklightType,
    /// Requested power state.
    pub power: PowerState,
    /// The attached framebuffer is blanked.
    pub fb_blank: bool,
    /// The device is suspended.
    pub suspended: bool,
}

impl BacklightProperties {
    /// Properties for a raw-scaled device with `max_brightness` steps.
    pub fn raw(max_brightness: u32) -> Self {
        Self {
            max_brightness,
            kind: BacklightType::Raw,
            ..Default::default()
        }
    }

    /// Highest accepted brightness.
    pub fn max_brightness(&self) -> u32 {
        self.max_brightness
    }

    /// Whether the backlight should currently be dark regardless of brightness.
    pub fn is_blanked(&self) -> bool {
        self.power != PowerState::Unblank || self.fb_blank || self.suspended
    }

    /// The brightness the hardware should show right now.
    pub fn effective_brightness(&self) -> u32 {
        if self.is_blanked() { 0 } else { self.brightness }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_defaults() {
        let props = BacklightProperties::raw(32);
        assert_eq!(props.max_brightness(), 32);
        assert_eq!(props.kind, BacklightType::Raw);
        assert_eq!(props.power, PowerState::Unblank);
        assert!(!props.is_blanked());
    }

    #[test]
    fn test_effective_brightness() {
        let mut props = BacklightProperties {
            brightness: 12,
            ..BacklightProperties::raw(32)
        };
        assert_eq!(props.effective_brightness(), 12);

        props.suspended = true;
        assert_eq!(props.effective_brightness(), 0);
        props.suspended = false;

        props.fb_blank = true;
        assert_eq!(props.effective_brightness(), 0);
        props.fb_blank = false;

        props.power = PowerState::Powerdown;
        assert_eq!(props.effective_brightness(), 0);
    }
}
