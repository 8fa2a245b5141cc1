//! PWM outputs on CTIMER match units.
//!
//! Each unit dedicates one match register (usually MR3) to the cycle length and
//! gives every channel its own pulse match register. The period register is
//! shared: changing the period of one channel changes it for every channel of
//! the same unit. Callers must serialize configuration per unit, not merely per
//! channel; the driver enforces this with a per-unit mutex held for the whole
//! of `enable`, `disable`, `set` and `get`.
//!
//! The counter of a unit runs while at least one of its channels is enabled.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embassy_sync::blocking_mutex::Mutex;
use static_assertions::const_assert;

use crate::board::{BoardConfig, ClockTree};
use crate::ctimer::{Ctimer, UnitId, UNIT_COUNT};
use crate::time::Hertz;

mod channel;
mod slots;
pub mod ticks;

pub use channel::PwmChannel;
pub use slots::{SlotMap, MAX_CHANNELS};

// one enable bit per channel
const_assert!(MAX_CHANNELS <= u8::BITS as usize);

/// PWM error
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Zero period, pulse longer than period, or a period the counter cannot resolve.
    InvalidArgument,
    /// Unit or channel not configured, match register collision, or unknown clock.
    Configuration,
    /// Unrecognized command.
    NotSupported,
    /// Zero frequency met while converting.
    DivisionByZero,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            Error::InvalidArgument => "invalid argument",
            Error::Configuration => "configuration error",
            Error::NotSupported => "command not supported",
            Error::DivisionByZero => "division by zero",
        };
        f.write_str(msg)
    }
}

impl embedded_hal::pwm::Error for Error {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

/// Start-up waveform and counter prescale.
#[non_exhaustive]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Config {
    /// Programmed on every channel before the device is registered.
    pub default_frequency: Hertz,
    /// Percent, 0 to 100.
    pub default_duty: u8,
    /// Counter increments every `prescale + 1` clock cycles.
    pub prescale: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_frequency: Hertz(1_000),
            default_duty: 50,
            prescale: 0,
        }
    }
}

/// Waveform request or report for one channel.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    pub channel: u8,
    /// Nanoseconds
    pub period_ns: u32,
    /// Nanoseconds
    pub pulse_ns: u32,
}

impl Configuration {
    pub const fn new(channel: u8, period_ns: u32, pulse_ns: u32) -> Self {
        Self {
            channel,
            period_ns,
            pulse_ns,
        }
    }
}

/// Raw command codes used by the device framework.
pub mod opcode {
    pub const ENABLE: u32 = 0;
    pub const DISABLE: u32 = 1;
    pub const SET: u32 = 2;
    pub const GET: u32 = 3;
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Enable(u8),
    Disable(u8),
    Set(Configuration),
    Get(u8),
}

impl Command {
    pub fn decode(opcode: u32, config: Configuration) -> Result<Command, Error> {
        match opcode {
            opcode::ENABLE => Ok(Command::Enable(config.channel)),
            opcode::DISABLE => Ok(Command::Disable(config.channel)),
            opcode::SET => Ok(Command::Set(config)),
            opcode::GET => Ok(Command::Get(config.channel)),
            _ => Err(Error::NotSupported),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    Done,
    Config(Configuration),
}

/// Device framework the units are published to.
pub trait Dispatcher {
    fn register(&mut self, name: &'static str, unit: UnitId) -> Result<(), Error>;
}

/// Name a unit is published under.
pub const fn device_name(unit: UnitId) -> &'static str {
    match unit {
        UnitId::Ctimer0 => "pwm0",
        UnitId::Ctimer1 => "pwm1",
        UnitId::Ctimer2 => "pwm2",
        UnitId::Ctimer3 => "pwm3",
        UnitId::Ctimer4 => "pwm4",
    }
}

pub(crate) struct UnitState {
    pub(crate) regs: Ctimer,
    pub(crate) slots: SlotMap,
    /// bit `n - 1` set while channel `n` is enabled
    pub(crate) enabled: u8,
}

pub(crate) struct Unit<M: RawMutex> {
    id: UnitId,
    state: Mutex<M, RefCell<UnitState>>,
}

impl<M: RawMutex> Unit<M> {
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut UnitState) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }
}

/// All PWM units of the board.
pub struct Registry<C: ClockTree, M: RawMutex = CriticalSectionRawMutex> {
    clocks: C,
    units: [Option<Unit<M>>; UNIT_COUNT],
}

impl<C: ClockTree, M: RawMutex> Registry<C, M> {
    /// Validate the board tables, initialize every unit and program the default waveform.
    ///
    /// Nothing is written to hardware unless the whole board configuration is valid.
    pub fn new(board: &BoardConfig<'_>, clocks: C, config: Config) -> Result<Self, Error> {
        if board.units.is_empty() {
            error!("no PWM unit configured");
            return Err(Error::Configuration);
        }

        let mut maps: [Option<(Ctimer, SlotMap)>; UNIT_COUNT] = [None; UNIT_COUNT];

        for unit in board.units {
            let entry = &mut maps[unit.id.number()];
            if entry.is_some() {
                error!("pwm{} configured twice", unit.id.number());
                return Err(Error::Configuration);
            }

            let mut slots = SlotMap::new(unit.period_slot);
            for ch in board.channels_of(unit.id) {
                slots.assign(ch.channel, ch.pulse_slot).map_err(|e| {
                    error!("pwm{} channel {}: match slot conflict", unit.id.number(), ch.channel);
                    e
                })?;
            }
            *entry = Some((unit.regs, slots));
        }

        if let Some(orphan) = board.channels.iter().find(|ch| maps[ch.unit.number()].is_none()) {
            error!("pwm{} channel {}: unit not configured", orphan.unit.number(), orphan.channel);
            return Err(Error::Configuration);
        }

        // compute every default before touching any register
        let mut defaults = [(0u32, 0u32); UNIT_COUNT];
        for unit in board.units {
            let f = clocks.tick_frequency(unit.id).ok_or(Error::Configuration)?;
            let period = ticks::frequency_to_ticks(config.default_frequency, f, config.prescale)?;
            let pulse = ticks::pulse_to_ticks(config.default_duty, period)?;

            info!("pwm{}: tick {} Hz, period {} ticks", unit.id.number(), f.0, period);
            defaults[unit.id.number()] = (period, pulse);
        }

        let mut units: [Option<Unit<M>>; UNIT_COUNT] = core::array::from_fn(|_| None);
        for id in UnitId::ALL {
            let Some((regs, slots)) = maps[id.number()] else {
                continue;
            };
            let (period, pulse) = defaults[id.number()];

            regs.init(config.prescale);
            for (_, pulse_slot) in slots.channels() {
                regs.setup_pwm(slots.period_slot(), pulse_slot, period, pulse);
            }

            units[id.number()] = Some(Unit {
                id,
                state: Mutex::new(RefCell::new(UnitState {
                    regs,
                    slots,
                    enabled: 0,
                })),
            });
        }

        Ok(Self { clocks, units })
    }

    /// Publish every unit to the device framework.
    ///
    /// A failed registration is logged and does not stop the remaining units;
    /// the last failure is returned.
    pub fn register(&self, dispatcher: &mut impl Dispatcher) -> Result<(), Error> {
        let mut ret = Ok(());

        for unit in self.units.iter().flatten() {
            let name = device_name(unit.id);
            if let Err(e) = dispatcher.register(name, unit.id) {
                error!("{} register failed", name);
                ret = Err(e);
            }
        }

        ret
    }

    pub fn device(&self, id: UnitId) -> Result<PwmDevice<'_, C, M>, Error> {
        let unit = self.units[id.number()].as_ref().ok_or(Error::Configuration)?;

        Ok(PwmDevice {
            unit,
            clocks: &self.clocks,
        })
    }

    /// Look a device up by its published name, e.g. `"pwm2"`.
    pub fn find(&self, name: &str) -> Result<PwmDevice<'_, C, M>, Error> {
        let id = UnitId::ALL
            .into_iter()
            .find(|id| device_name(*id) == name)
            .ok_or(Error::Configuration)?;
        self.device(id)
    }

    pub fn devices(&self) -> impl Iterator<Item = PwmDevice<'_, C, M>> {
        self.units.iter().flatten().map(|unit| PwmDevice {
            unit,
            clocks: &self.clocks,
        })
    }
}

/// Handle on one registered unit and its channels.
pub struct PwmDevice<'r, C: ClockTree, M: RawMutex = CriticalSectionRawMutex> {
    unit: &'r Unit<M>,
    clocks: &'r C,
}

impl<'r, C: ClockTree, M: RawMutex> Clone for PwmDevice<'r, C, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'r, C: ClockTree, M: RawMutex> Copy for PwmDevice<'r, C, M> {}

impl<'r, C: ClockTree, M: RawMutex> PwmDevice<'r, C, M> {
    pub fn id(&self) -> UnitId {
        self.unit.id
    }

    pub fn name(&self) -> &'static str {
        device_name(self.unit.id)
    }

    fn tick_frequency(&self) -> Result<Hertz, Error> {
        self.clocks.tick_frequency(self.unit.id).ok_or_else(|| {
            warn!("pwm{}: clock source unknown", self.unit.id.number());
            Error::Configuration
        })
    }

    /// Single entry point for the device framework.
    pub fn handle(&self, cmd: Command) -> Result<Response, Error> {
        match cmd {
            Command::Enable(channel) => self.enable(channel).map(|_| Response::Done),
            Command::Disable(channel) => self.disable(channel).map(|_| Response::Done),
            Command::Set(config) => self.set(&config).map(|_| Response::Done),
            Command::Get(channel) => self.get(channel).map(Response::Config),
        }
    }

    /// Decode a raw opcode and run it.
    pub fn control(&self, opcode: u32, config: Configuration) -> Result<Response, Error> {
        self.handle(Command::decode(opcode, config)?)
    }

    /// Enable `channel`, starting the unit's counter if no other channel is running it.
    pub fn enable(&self, channel: u8) -> Result<(), Error> {
        self.unit.with(|state| {
            state.slots.lookup(channel)?;

            if state.enabled == 0 {
                trace!("pwm{}: counter start", self.unit.id.number());
                state.regs.start();
            }
            state.enabled |= 1 << (channel - 1);
            Ok(())
        })
    }

    /// Disable `channel`, stopping the unit's counter once no channel uses it.
    pub fn disable(&self, channel: u8) -> Result<(), Error> {
        self.unit.with(|state| {
            state.slots.lookup(channel)?;

            let bit = 1 << (channel - 1);
            if state.enabled & bit == 0 {
                return Ok(());
            }
            state.enabled &= !bit;

            if state.enabled == 0 {
                trace!("pwm{}: counter stop", self.unit.id.number());
                state.regs.stop();
            }
            Ok(())
        })
    }

    pub fn is_enabled(&self, channel: u8) -> Result<bool, Error> {
        self.unit.with(|state| {
            state.slots.lookup(channel)?;
            Ok(state.enabled & (1 << (channel - 1)) != 0)
        })
    }

    /// Whether the unit's counter is running.
    pub fn is_running(&self) -> bool {
        self.unit.with(|state| state.regs.is_running())
    }

    /// Program period and pulse of `config.channel`.
    ///
    /// The period is written to the unit's shared period register, so every
    /// channel of the unit takes the new period. On error no register is written.
    pub fn set(&self, config: &Configuration) -> Result<(), Error> {
        if config.period_ns == 0 || config.pulse_ns > config.period_ns {
            return Err(Error::InvalidArgument);
        }

        self.unit.with(|state| {
            let (period_slot, pulse_slot) = state.slots.lookup(config.channel)?;
            let f = self.tick_frequency()?;
            let prescale = state.regs.prescale();

            let period = ticks::period_to_ticks(config.period_ns, f, prescale)?;
            let duty = ticks::duty_percent(config.period_ns, config.pulse_ns)?;
            let pulse = ticks::pulse_to_ticks(duty, period)?;

            state.regs.set_match_value(period_slot, period);
            state.regs.set_match_value(pulse_slot, pulse);

            debug!(
                "pwm{} channel {}: period {} ticks, pulse {} ticks",
                self.unit.id.number(),
                config.channel,
                period,
                pulse
            );
            Ok(())
        })
    }

    /// Read back period and pulse of `channel`, rounded through integer frequency and duty.
    pub fn get(&self, channel: u8) -> Result<Configuration, Error> {
        self.unit.with(|state| {
            let (period_slot, pulse_slot) = state.slots.lookup(channel)?;
            let f = self.tick_frequency()?;
            let prescale = state.regs.prescale();

            let period_ticks = state.regs.match_value(period_slot);
            let pulse_ticks = state.regs.match_value(pulse_slot);

            let period_ns = ticks::ticks_to_period_ns(period_ticks, f, prescale)?;
            let pulse_ns = ticks::ticks_to_pulse_ns(pulse_ticks, period_ticks, period_ns);

            debug!(
                "pwm{} channel {}: period {} ns, pulse {} ns",
                self.unit.id.number(),
                channel,
                period_ns,
                pulse_ns
            );
            Ok(Configuration::new(channel, period_ns, pulse_ns))
        })
    }

    /// Device framework style `set`.
    pub fn configure(&self, period_ns: u32, pulse_ns: u32, channel: u8) -> Result<(), Error> {
        self.set(&Configuration::new(channel, period_ns, pulse_ns))
    }

    /// Device framework style `get`, returns `(period_ns, pulse_ns)`.
    pub fn query(&self, channel: u8) -> Result<(u32, u32), Error> {
        let config = self.get(channel)?;
        Ok((config.period_ns, config.pulse_ns))
    }

    /// embedded-hal view of one channel.
    pub fn channel(&self, channel: u8) -> Result<PwmChannel<'r, C, M>, Error> {
        self.unit.with(|state| state.slots.lookup(channel))?;
        Ok(PwmChannel::new(*self, channel))
    }

    pub(crate) fn unit(&self) -> &'r Unit<M> {
        self.unit
    }
}
