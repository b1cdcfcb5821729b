//! Example: Attach a FAN5345 on a sysfs GPIO and set its brightness.
//!
//! Run with: `cargo run --example set_level -- <gpio> <level>`

use fan5345::{BacklightDevice, Delay, Fan5345Backlight, Properties, SysfsPins};
use std::process::ExitCode;

fn main() -> ExitCode {
    // Initialize logging (optional)
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (Some(gpio), Some(level)) = (
        args.first().and_then(|s| s.parse::<u64>().ok()),
        args.get(1).and_then(|s| s.parse::<u32>().ok()),
    ) else {
        eprintln!("usage: set_level <gpio> <level 0-32>");
        return ExitCode::FAILURE;
    };

    match run(gpio, level) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(gpio: u64, level: u32) -> Result<(), fan5345::BacklightError> {
    let mut pins = SysfsPins::new().with_pin("level", gpio);

    // Attach dark, then apply the requested level through the device layer
    let props = Properties::parse(
        r#"
        compatible = "fairchild,fan5345";
        default-level = <0>;
        "#,
    );
    let mut bl = Fan5345Backlight::attach("fan5345", &mut pins, &props, Delay)?;

    bl.set_brightness(level)?;
    println!(
        "Backlight on gpio{} at step {} of {}",
        gpio,
        bl.chip().cur_level(),
        bl.properties().max_brightness()
    );

    Ok(())
}
