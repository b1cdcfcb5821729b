//! Recording pin and delay for testing.

use crate::chip::{SHUTDOWN_HOLD_US, next_level};
use crate::config::PinProvider;
use crate::error::BacklightError;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorKind, ErrorType, OutputPin, PinState};
use std::sync::{Arc, Mutex, MutexGuard};

const SHUTDOWN_HOLD_NS: u64 = SHUTDOWN_HOLD_US as u64 * 1_000;

/// One recorded step on the control line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The pin was driven low.
    Low,
    /// The pin was driven high.
    High,
    /// Time passed, in nanoseconds. Back-to-back delays are merged.
    Delay(u32),
}

#[derive(Debug, Default)]
struct Inner {
    events: Vec<Event>,
    line_low: bool,
    low_ns: u64,
    chip_level: u32,
}

impl Inner {
    fn record(&mut self, event: Event) {
        match event {
            Event::Low => {
                if !self.line_low {
                    self.line_low = true;
                    self.low_ns = 0;
                }
            }
            Event::High => {
                if self.line_low {
                    self.line_low = false;
                    self.chip_level = next_level(self.chip_level);
                }
            }
            Event::Delay(ns) => {
                if self.line_low {
                    self.low_ns += u64::from(ns);
                    if self.low_ns >= SHUTDOWN_HOLD_NS {
                        self.chip_level = 0;
                    }
                }
                if let Some(Event::Delay(prev)) = self.events.last_mut() {
                    *prev = prev.saturating_add(ns);
                    return;
                }
            }
        }
        self.events.push(event);
    }
}

/// Shared timeline of pin writes and delays, with a simulated FAN5345 on the
/// other end of the line.
///
/// Pins and delays created from the same trace log into one sequence, so tests
/// can check pulse polarity, hold times and the level the chip would be on.
///
/// # Example
///
/// ```
/// use fan5345::{Event, Fan5345, Trace};
///
/// let trace = Trace::new();
/// let mut chip = Fan5345::new(trace.pin(), trace.delay());
/// chip.set_level(32)?;
///
/// assert_eq!(
///     trace.events(),
///     vec![Event::Low, Event::Delay(500), Event::High, Event::Delay(500)]
/// );
/// assert_eq!(trace.chip_level(), 32);
/// # Ok::<(), fan5345::BacklightError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Trace {
    inner: Arc<Mutex<Inner>>,
}

impl Trace {
    /// Create an empty trace. The simulated chip starts disabled.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// A pin that records every write.
    pub fn pin(&self) -> TracePin {
        TracePin {
            trace: self.clone(),
            writes_left: None,
        }
    }

    /// A pin that records `writes` writes and then fails every later one.
    pub fn failing_pin(&self, writes: usize) -> TracePin {
        TracePin {
            trace: self.clone(),
            writes_left: Some(writes),
        }
    }

    /// A delay provider that records instead of waiting.
    pub fn delay(&self) -> TraceDelay {
        TraceDelay {
            trace: self.clone(),
        }
    }

    /// A pin provider handing out recording pins.
    pub fn pins(&self) -> TracePins {
        TracePins {
            trace: self.clone(),
            available: true,
        }
    }

    /// A pin provider that refuses every request.
    pub fn unavailable_pins(&self) -> TracePins {
        TracePins {
            trace: self.clone(),
            available: false,
        }
    }

    /// All events recorded since creation or the last [`clear`](Self::clear).
    pub fn events(&self) -> Vec<Event> {
        self.lock().events.clone()
    }

    /// Forget recorded events. The simulated chip keeps its level.
    pub fn clear(&self) {
        self.lock().events.clear();
    }

    /// The level the simulated chip is on.
    pub fn chip_level(&self) -> u32 {
        self.lock().chip_level
    }

    /// Number of completed low→high pulses.
    pub fn pulse_count(&self) -> usize {
        self.pulse_durations().len()
    }

    /// Number of low holds long enough to shut the chip down.
    pub fn shutdown_count(&self) -> usize {
        self.low_holds()
            .iter()
            .filter(|&&ns| u64::from(ns) >= SHUTDOWN_HOLD_NS)
            .count()
    }

    /// Time spent low after each low write, in nanoseconds.
    pub fn low_holds(&self) -> Vec<u32> {
        self.holds(Event::Low)
    }

    /// Time spent high after each high write, in nanoseconds.
    pub fn high_holds(&self) -> Vec<u32> {
        self.holds(Event::High)
    }

    /// Low plus high time of each completed pulse, in nanoseconds.
    pub fn pulse_durations(&self) -> Vec<u32> {
        let events = self.events();
        let mut durations = Vec::new();
        for (i, event) in events.iter().enumerate() {
            if *event != Event::Low {
                continue;
            }
            let low = hold_after(&events, i);
            let next_edge = events[i + 1..]
                .iter()
                .position(|e| !matches!(e, Event::Delay(_)));
            if let Some(offset) = next_edge {
                let high_at = i + 1 + offset;
                if events[high_at] == Event::High {
                    durations.push(low.saturating_add(hold_after(&events, high_at)));
                }
            }
        }
        durations
    }

    fn holds(&self, edge: Event) -> Vec<u32> {
        let events = self.events();
        events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == edge)
            .map(|(i, _)| hold_after(&events, i))
            .collect()
    }
}

fn hold_after(events: &[Event], index: usize) -> u32 {
    match events.get(index + 1) {
        Some(Event::Delay(ns)) => *ns,
        _ => 0,
    }
}

/// Output pin recording into a [`Trace`].
#[derive(Debug, Clone)]
pub struct TracePin {
    trace: Trace,
    writes_left: Option<usize>,
}

impl TracePin {
    fn write(&mut self, event: Event) -> Result<(), ErrorKind> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(ErrorKind::Other);
            }
            *left -= 1;
        }
        self.trace.lock().record(event);
        Ok(())
    }
}

impl ErrorType for TracePin {
    type Error = ErrorKind;
}

impl OutputPin for TracePin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write(Event::Low)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write(Event::High)
    }
}

/// Delay provider recording into a [`Trace`] instead of waiting.
#[derive(Debug, Clone)]
pub struct TraceDelay {
    trace: Trace,
}

impl DelayNs for TraceDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.trace.lock().record(Event::Delay(ns));
    }
}

/// Pin provider handing out [`TracePin`]s.
#[derive(Debug, Clone)]
pub struct TracePins {
    trace: Trace,
    available: bool,
}

impl PinProvider for TracePins {
    type Pin = TracePin;

    fn request_output(
        &mut self,
        name: &'static str,
        initial: PinState,
    ) -> Result<TracePin, BacklightError> {
        if !self.available {
            return Err(BacklightError::PinRequest {
                name,
                kind: ErrorKind::Other,
            });
        }
        // The line starts at `initial` without counting as a write.
        let mut inner = self.trace.lock();
        inner.line_low = initial == PinState::Low;
        inner.low_ns = 0;
        drop(inner);
        Ok(self.trace.pin())
    }
}
