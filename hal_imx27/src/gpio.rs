//! Fake GPIO lines
//!
//! A [`FakeGpioLine`] records every direction and level change and can be
//! scripted with the levels it reports as an input. Clones share state, so
//! a test can keep one handle while the monitor owns another.

use crate::memory_map;
use hal::{GpioError, GpioLine};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Current direction of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Released, the level comes from outside
    Input,
    /// Driven at the given level
    Output(bool),
}

/// One recorded change on a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioEvent {
    /// Switched to output with an initial level
    Output(bool),
    /// Level changed while an output
    Level(bool),
    /// Switched to input
    Input,
}

#[derive(Debug)]
struct LineState {
    direction: Direction,
    /// Levels returned by the next input reads, in order
    script: VecDeque<bool>,
    /// Level returned once the script is exhausted
    idle_level: bool,
    events: Vec<GpioEvent>,
    reads: usize,
    failing: bool,
}

/// Fake GPIO line
///
/// # Examples
///
/// ```
/// use hal::GpioLine;
/// use hal_imx27::FakeGpioLine;
///
/// let mut line = FakeGpioLine::new(42).unwrap();
/// line.script_levels(&[true, false]);
///
/// assert!(line.is_high().unwrap());
/// assert!(!line.is_high().unwrap());
/// assert!(!line.is_high().unwrap()); // idle level
/// ```
#[derive(Debug, Clone)]
pub struct FakeGpioLine {
    number: u32,
    state: Arc<Mutex<LineState>>,
}

impl FakeGpioLine {
    /// Creates an input line reading low
    ///
    /// Fails if `number` is not a line of the SoC.
    pub fn new(number: u32) -> Result<Self, GpioError> {
        if !memory_map::is_valid_gpio(number) {
            return Err(GpioError::InvalidLine(number));
        }
        Ok(Self {
            number,
            state: Arc::new(Mutex::new(LineState {
                direction: Direction::Input,
                script: VecDeque::new(),
                idle_level: false,
                events: Vec::new(),
                reads: 0,
                failing: false,
            })),
        })
    }

    fn state(&self) -> MutexGuard<'_, LineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues levels returned by the next input reads
    pub fn script_levels(&self, levels: &[bool]) {
        self.state().script.extend(levels.iter().copied());
    }

    /// Sets the level returned once the script is exhausted
    pub fn set_idle_level(&self, high: bool) {
        self.state().idle_level = high;
    }

    /// Makes every access fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.state().failing = failing;
    }

    /// Returns the current direction
    pub fn direction(&self) -> Direction {
        self.state().direction
    }

    /// Returns every recorded change in order
    pub fn events(&self) -> Vec<GpioEvent> {
        self.state().events.clone()
    }

    /// Returns the number of level reads
    pub fn reads(&self) -> usize {
        self.state().reads
    }
}

impl GpioLine for FakeGpioLine {
    fn number(&self) -> u32 {
        self.number
    }

    fn is_high(&mut self) -> Result<bool, GpioError> {
        let mut state = self.state();
        if state.failing {
            return Err(GpioError::Access(self.number));
        }
        state.reads += 1;
        match state.direction {
            Direction::Output(level) => Ok(level),
            Direction::Input => {
                let idle = state.idle_level;
                Ok(state.script.pop_front().unwrap_or(idle))
            }
        }
    }

    fn set_level(&mut self, high: bool) -> Result<(), GpioError> {
        let mut state = self.state();
        if state.failing {
            return Err(GpioError::Access(self.number));
        }
        match state.direction {
            Direction::Output(_) => {
                state.direction = Direction::Output(high);
                state.events.push(GpioEvent::Level(high));
                Ok(())
            }
            Direction::Input => Err(GpioError::Access(self.number)),
        }
    }

    fn set_output(&mut self, high: bool) -> Result<(), GpioError> {
        let mut state = self.state();
        if state.failing {
            return Err(GpioError::Access(self.number));
        }
        state.direction = Direction::Output(high);
        state.events.push(GpioEvent::Output(high));
        Ok(())
    }

    fn set_input(&mut self) -> Result<(), GpioError> {
        let mut state = self.state();
        if state.failing {
            return Err(GpioError::Access(self.number));
        }
        state.direction = Direction::Input;
        state.events.push(GpioEvent::Input);
        Ok(())
    }
}
