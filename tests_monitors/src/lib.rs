//! Board Monitor Test Utilities
//!
//! Shared bootstrap for the integration tests: a simulated Thelma7 board
//! with every peripheral the monitors touch.
//!
//! ## Test Philosophy
//!
//! - **Through the transport**: tests read and write attributes the way user
//!   space does, not the monitor internals
//! - **Deterministic hardware**: pulses, fuse values and pin levels are set
//!   by the test; simulated time only moves when a test or a delay moves it
//! - **Faults on demand**: bus errors and unavailable lines are injected
//!   through the fakes

use hal_imx27::memory_map::{IIM_BASE, SYSCTRL_BASE};
use hal_imx27::{FakeGpioLine, FakePhysicalMemory, FakeSmbus, RecordingDelay, SimClock, SimGpt};
use monitor_types::{AttributeError, AttributeGroup, ModuleParams, PlatformConfig};
use services_odometer::{resolve_channel, Odometer, OdometerError};
use services_picodo::{resolve_reset_gpio, Picodo, PicodoError};
use services_soc_info::SocInfo;
use services_watchdog::{resolve_node, Watchdog, WatchdogError, WatchdogLines};
use std::collections::BTreeMap;

/// Kernel tick rate of the simulated board
pub const BOARD_HZ: u64 = 100;

/// Device tree of a fully fitted board
pub const BOARD_CONFIG: &str = r#"{
    "odo@0": { "odo,timer": 3 },
    "wd@0": {
        "wd,gpio_clock": 100,
        "wd,gpio_inhib": 101,
        "wd,gpio_trig": 102,
        "wd,period_s": 30
    },
    "picodo": { "gpio-reset": 12 }
}"#;

/// Chip id of the simulated SoC
pub const CHIP_ID: u32 = 0x1882_101D;

/// Timer odometer running on the simulated board
pub type BoardOdometer = Odometer<SimGpt, SimClock, RecordingDelay>;
/// Counter chip on the simulated board
pub type BoardPicodo = Picodo<FakeSmbus, FakeGpioLine, SimClock, RecordingDelay>;
/// Hardware watchdog on the simulated board
pub type BoardWatchdog = Watchdog<FakeGpioLine, SimClock, RecordingDelay>;

/// Installs the test logger once
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A simulated Thelma7 board
pub struct SimulatedBoard {
    /// Board description
    pub platform: PlatformConfig,
    /// Module parameters
    pub params: ModuleParams,
    /// Physical address space (identification registers)
    pub memory: FakePhysicalMemory,
    /// Timer used by the odometer
    pub gpt: SimGpt,
    /// Kernel tick source
    pub clock: SimClock,
    /// Delays, advancing `clock`
    pub delay: RecordingDelay,
    /// Counter chip on the I2C bus
    pub counter_chip: FakeSmbus,
    gpios: BTreeMap<u32, FakeGpioLine>,
}

/// Creates a fully fitted board
pub fn test_bootstrap() -> SimulatedBoard {
    board_with_config(BOARD_CONFIG)
}

/// Creates a board from a device tree in JSON form
///
/// # Panics
///
/// Panics if the configuration is malformed.
pub fn board_with_config(config: &str) -> SimulatedBoard {
    init_logging();
    let platform = match PlatformConfig::from_json(config) {
        Ok(platform) => platform,
        Err(err) => panic!("bad board configuration: {}", err),
    };

    let mut memory = FakePhysicalMemory::new();
    memory.poke(SYSCTRL_BASE, CHIP_ID);
    memory.poke(IIM_BASE + 0x20, 0x02);
    memory.poke(IIM_BASE + 0x24, 0x21);
    for (i, byte) in [0x00u32, 0x04, 0x9F, 0x12, 0x34, 0x56].iter().enumerate() {
        memory.poke(IIM_BASE + 0x814 + 4 * i as u64, *byte);
    }

    let counter_chip = FakeSmbus::new();
    counter_chip.set_word(services_picodo::REG_VER, u32::from_be_bytes(*b"P1.3"));

    let clock = SimClock::new(BOARD_HZ);
    SimulatedBoard {
        platform,
        params: ModuleParams::default(),
        memory,
        gpt: SimGpt::new(),
        delay: RecordingDelay::with_clock(clock.clone()),
        clock,
        counter_chip,
        gpios: BTreeMap::new(),
    }
}

impl SimulatedBoard {
    /// Returns a handle on GPIO `number`, shared with every other handle
    ///
    /// # Panics
    ///
    /// Panics if `number` is not a line of the SoC.
    pub fn gpio(&mut self, number: u32) -> FakeGpioLine {
        self.gpios
            .entry(number)
            .or_insert_with(|| match FakeGpioLine::new(number) {
                Ok(line) => line,
                Err(err) => panic!("{}", err),
            })
            .clone()
    }

    /// Brings up the timer odometer
    pub fn start_odometer(&mut self) -> Result<BoardOdometer, OdometerError> {
        let channel = resolve_channel(&self.platform, &self.params)?;
        Odometer::new(channel, self.gpt.clone(), self.clock.clone(), self.delay.clone())
    }

    /// Brings up the counter chip
    pub fn start_picodo(&mut self) -> Result<BoardPicodo, PicodoError> {
        let gpio = resolve_reset_gpio(&self.platform)?;
        let line = self.gpio(gpio);
        Picodo::attach(self.counter_chip.clone(), line, self.clock.clone(), self.delay.clone())
    }

    /// Brings up the hardware watchdog
    pub fn start_watchdog(&mut self) -> Result<BoardWatchdog, WatchdogError> {
        let node = resolve_node(&self.platform)?;
        let lines = WatchdogLines {
            clock: self.gpio(node.gpio_clock),
            inhib: self.gpio(node.gpio_inhib),
            trig: self.gpio(node.gpio_trig),
        };
        Watchdog::init(node, lines, self.clock.clone(), self.delay.clone())
    }

    /// Reads the identification registers
    pub fn load_soc_info(&mut self) -> SocInfo {
        SocInfo::load(&mut self.memory)
    }
}

/// Reads every readable attribute of a group, in declaration order
pub fn read_all(group: &dyn AttributeGroup) -> Vec<(&'static str, Result<String, AttributeError>)> {
    group
        .attributes()
        .iter()
        .filter(|attribute| attribute.is_readable())
        .map(|attribute| (attribute.name, group.show(attribute.name)))
        .collect()
}
