//! # Hardware Watchdog Service
//!
//! Drives the external watchdog of the Thelma7 baseboard through three GPIO
//! lines.
//!
//! ## Philosophy
//!
//! **Report, don't decide.** The service triggers the watchdog and reports
//! what it observes (clock present, inhibit jumper, time left). Deciding
//! when to trigger belongs to the supervisor polling the attributes.
//!
//! ## Lines
//!
//! - `clock`: input toggled by the watchdog while it runs
//! - `inhib`: input, high when the watchdog is inhibited
//! - `trig`: output, a high pulse restarts the watchdog period
//!
//! Once the watchdog is seen inhibited or without clock it is considered
//! stopped until the next trigger.

pub mod attributes;
pub mod error;

pub use error::WatchdogError;

use hal::{DelayHal, GpioLine, TimerDevice};
use hal_imx27::memory_map;
use log::{error, info, warn};
use monitor_types::{ConfigError, PlatformConfig, WatchdogNode};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Width of the trigger pulse
pub const TRIGGER_PULSE_MS: u32 = 50;
/// Time between clock samples
pub const CLOCK_SAMPLE_INTERVAL_MS: u32 = 400;
/// Number of clock samples
pub const CLOCK_SAMPLES: usize = 3;

/// Resolves the watchdog node and validates its GPIO numbers
pub fn resolve_node(platform: &PlatformConfig) -> Result<WatchdogNode, ConfigError> {
    let node = platform.require_watchdog()?;
    let lines = [
        ("wd,gpio_clock", node.gpio_clock),
        ("wd,gpio_inhib", node.gpio_inhib),
        ("wd,gpio_trig", node.gpio_trig),
    ];
    for (role, gpio) in lines {
        if !memory_map::is_valid_gpio(gpio) {
            error!("wd: GPIO {} for {} is not valid", gpio, role);
            return Err(ConfigError::InvalidGpio { role, gpio });
        }
    }
    Ok(node)
}

/// The three lines of the watchdog
#[derive(Debug, Clone)]
pub struct WatchdogLines<G> {
    /// Clock input
    pub clock: G,
    /// Inhibit input
    pub inhib: G,
    /// Trigger output
    pub trig: G,
}

struct WatchdogState<G, T, D> {
    lines: WatchdogLines<G>,
    clock: T,
    delay: D,
    last_trig_s: u64,
    stopped: bool,
}

impl<G: GpioLine, T: TimerDevice, D: DelayHal> WatchdogState<G, T, D> {
    fn trigger(&mut self) -> Result<(), WatchdogError> {
        self.lines.trig.set_level(true)?;
        self.delay.delay_ms(TRIGGER_PULSE_MS);
        self.lines.trig.set_level(false)?;
        self.last_trig_s = self.clock.poll_seconds();
        Ok(())
    }

    fn has_inhibit(&mut self) -> Result<bool, WatchdogError> {
        Ok(self.lines.inhib.is_high()?)
    }

    fn has_clock(&mut self) -> Result<bool, WatchdogError> {
        let mut samples = [false; CLOCK_SAMPLES];
        for (i, sample) in samples.iter_mut().enumerate() {
            if i > 0 {
                self.delay.delay_ms(CLOCK_SAMPLE_INTERVAL_MS);
            }
            *sample = self.lines.clock.is_high()?;
        }
        Ok(samples.windows(2).any(|pair| pair[0] != pair[1]))
    }

    fn remaining_s(&mut self, period_s: u32) -> u64 {
        let elapsed = self.clock.poll_seconds().saturating_sub(self.last_trig_s);
        u64::from(period_s).saturating_sub(elapsed)
    }
}

/// The Thelma7 hardware watchdog
pub struct Watchdog<G, T, D> {
    period_s: u32,
    state: Mutex<WatchdogState<G, T, D>>,
}

impl<G: GpioLine, T: TimerDevice, D: DelayHal> Watchdog<G, T, D> {
    /// Takes control of the watchdog lines and triggers once
    pub fn init(node: WatchdogNode, mut lines: WatchdogLines<G>, mut clock: T, delay: D) -> Result<Self, WatchdogError> {
        let claim = lines
            .clock
            .set_input()
            .and_then(|_| lines.inhib.set_input())
            .and_then(|_| lines.trig.set_output(false));
        if let Err(err) = claim {
            error!("wd: watchdog GPIO not available: {}", err);
            return Err(err.into());
        }

        let last_trig_s = clock.poll_seconds();
        let mut state = WatchdogState {
            lines,
            clock,
            delay,
            last_trig_s,
            stopped: false,
        };
        state.trigger()?;

        info!("wd: hardware watchdog armed, period {} s", node.period_s);
        Ok(Self {
            period_s: node.period_s,
            state: Mutex::new(state),
        })
    }

    fn state(&self) -> MutexGuard<'_, WatchdogState<G, T, D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the watchdog period in seconds
    pub fn period_s(&self) -> u32 {
        self.period_s
    }

    /// Returns the time of the last trigger in whole seconds
    pub fn last_trigger_s(&self) -> u64 {
        self.state().last_trig_s
    }

    /// Returns true if the watchdog was seen stopped since the last trigger
    pub fn is_stopped(&self) -> bool {
        self.state().stopped
    }

    /// Pulses the trigger line
    pub fn trigger(&self) -> Result<(), WatchdogError> {
        self.state().trigger()
    }

    /// Clears the stopped mark and triggers
    pub fn rearm(&self) -> Result<(), WatchdogError> {
        let mut state = self.state();
        state.stopped = false;
        state.trigger()
    }

    /// Reads the inhibit line, marking the watchdog stopped when inhibited
    pub fn poll_inhibit(&self) -> Result<bool, WatchdogError> {
        let mut state = self.state();
        let inhibited = state.has_inhibit()?;
        if inhibited {
            state.stopped = true;
        }
        Ok(inhibited)
    }

    /// Samples the clock line, marking the watchdog stopped without clock
    ///
    /// Blocks for two sample intervals.
    pub fn poll_clock(&self) -> Result<bool, WatchdogError> {
        let mut state = self.state();
        let clocking = state.has_clock()?;
        if !clocking {
            warn!("wd: no watchdog clock");
            state.stopped = true;
        }
        Ok(clocking)
    }

    /// Returns the seconds left before the watchdog fires, or -1 when it is
    /// inhibited or stopped
    pub fn poll_remaining(&self) -> Result<i64, WatchdogError> {
        let mut state = self.state();
        let remaining = state.remaining_s(self.period_s);
        if state.has_inhibit()? {
            state.stopped = true;
        }
        if state.stopped {
            return Ok(-1);
        }
        Ok(i64::try_from(remaining).unwrap_or(i64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hal::GpioError;
    use hal_imx27::{FakeGpioLine, GpioEvent, RecordingDelay, SimClock};

    type FakeWatchdog = Watchdog<FakeGpioLine, SimClock, RecordingDelay>;

    struct Board {
        lines: WatchdogLines<FakeGpioLine>,
        clock: SimClock,
        delay: RecordingDelay,
    }

    fn node() -> WatchdogNode {
        WatchdogNode {
            gpio_clock: 100,
            gpio_inhib: 101,
            gpio_trig: 102,
            period_s: 30,
        }
    }

    fn board() -> Board {
        let _ = env_logger::builder().is_test(true).try_init();
        let clock = SimClock::new(100);
        Board {
            lines: WatchdogLines {
                clock: FakeGpioLine::new(100).unwrap(),
                inhib: FakeGpioLine::new(101).unwrap(),
                trig: FakeGpioLine::new(102).unwrap(),
            },
            delay: RecordingDelay::with_clock(clock.clone()),
            clock,
        }
    }

    fn watchdog(board: &Board) -> FakeWatchdog {
        Watchdog::init(node(), board.lines.clone(), board.clock.clone(), board.delay.clone()).unwrap()
    }

    #[test]
    fn test_resolve_node() {
        let mut platform = PlatformConfig::default();
        assert_eq!(resolve_node(&platform), Err(ConfigError::MissingNode("wd@0")));

        platform.watchdog = Some(node());
        assert_eq!(resolve_node(&platform), Ok(node()));

        platform.watchdog = Some(WatchdogNode {
            gpio_inhib: 192,
            ..node()
        });
        assert_eq!(
            resolve_node(&platform),
            Err(ConfigError::InvalidGpio {
                role: "wd,gpio_inhib",
                gpio: 192
            })
        );
    }

    #[test]
    fn test_init_claims_lines_and_triggers() {
        let board = board();
        let watchdog = watchdog(&board);

        assert_eq!(board.lines.clock.events(), vec![GpioEvent::Input]);
        assert_eq!(board.lines.inhib.events(), vec![GpioEvent::Input]);
        assert_eq!(
            board.lines.trig.events(),
            vec![GpioEvent::Output(false), GpioEvent::Level(true), GpioEvent::Level(false)]
        );
        assert_eq!(board.delay.calls(), vec![TRIGGER_PULSE_MS]);
        assert_eq!(watchdog.period_s(), 30);
        assert!(!watchdog.is_stopped());
    }

    #[test]
    fn test_init_fails_when_line_unavailable() {
        let board = board();
        board.lines.trig.set_failing(true);
        let result = Watchdog::init(node(), board.lines.clone(), board.clock.clone(), board.delay.clone());
        assert!(matches!(result, Err(WatchdogError::Gpio(GpioError::Access(102)))));
    }

    #[test]
    fn test_remaining_time_counts_down_and_saturates() {
        let board = board();
        let watchdog = watchdog(&board);

        assert_eq!(watchdog.poll_remaining().unwrap(), 30);
        board.clock.advance(10 * 100);
        assert_eq!(watchdog.poll_remaining().unwrap(), 20);
        board.clock.advance(40 * 100);
        assert_eq!(watchdog.poll_remaining().unwrap(), 0);
    }

    #[test]
    fn test_trigger_restarts_period() {
        let board = board();
        let watchdog = watchdog(&board);
        board.clock.advance(25 * 100);
        assert_eq!(watchdog.poll_remaining().unwrap(), 5);

        watchdog.trigger().unwrap();
        assert_eq!(watchdog.last_trigger_s(), 25);
        assert_eq!(watchdog.poll_remaining().unwrap(), 30);
    }

    #[test]
    fn test_inhibit_marks_stopped() {
        let board = board();
        let watchdog = watchdog(&board);

        assert!(!watchdog.poll_inhibit().unwrap());
        assert!(!watchdog.is_stopped());

        board.lines.inhib.script_levels(&[true]);
        assert!(watchdog.poll_inhibit().unwrap());
        assert!(watchdog.is_stopped());
        assert_eq!(watchdog.poll_remaining().unwrap(), -1);
    }

    #[test]
    fn test_remaining_time_checks_inhibit() {
        let board = board();
        let watchdog = watchdog(&board);
        board.lines.inhib.script_levels(&[true]);
        assert_eq!(watchdog.poll_remaining().unwrap(), -1);
        // Stays stopped after the jumper is removed
        assert_eq!(watchdog.poll_remaining().unwrap(), -1);

        watchdog.rearm().unwrap();
        assert_eq!(watchdog.poll_remaining().unwrap(), 30);
    }

    #[test]
    fn test_clock_detection() {
        let board = board();
        let watchdog = watchdog(&board);

        board.lines.clock.script_levels(&[false, true, false]);
        assert!(watchdog.poll_clock().unwrap());
        assert!(!watchdog.is_stopped());

        board.lines.clock.script_levels(&[true, true, false]);
        assert!(watchdog.poll_clock().unwrap());

        board.lines.clock.script_levels(&[true, true, true]);
        assert!(!watchdog.poll_clock().unwrap());
        assert!(watchdog.is_stopped());
        assert_eq!(board.lines.clock.reads(), 9);
    }

    #[test]
    fn test_clock_sampling_spacing() {
        let board = board();
        let watchdog = watchdog(&board);
        let before = board.clock.now();
        watchdog.poll_clock().unwrap();
        assert_eq!(board.clock.now() - before, 80);
        assert_eq!(
            board.delay.calls(),
            vec![TRIGGER_PULSE_MS, CLOCK_SAMPLE_INTERVAL_MS, CLOCK_SAMPLE_INTERVAL_MS]
        );
    }

    #[test]
    fn test_failed_trigger_keeps_last_time() {
        let board = board();
        let watchdog = watchdog(&board);
        board.clock.advance(1000);
        board.lines.trig.set_failing(true);
        assert!(watchdog.trigger().is_err());
        assert_eq!(watchdog.last_trigger_s(), 0);
    }
}
