//! Board description consumed at start-up: which timers exist, which match
//! outputs are routed as PWM channels, and what clocks the timers.

use crate::ctimer::{Ctimer, MatchSlot, UnitId};
use crate::time::Hertz;

/// One timer unit made available to the PWM driver.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct UnitConfig {
    pub id: UnitId,
    pub regs: Ctimer,
    /// Match register resetting the counter, shared by all channels of the unit.
    pub period_slot: MatchSlot,
}

impl UnitConfig {
    /// Unit with the usual MR3 period slot.
    pub const fn new(id: UnitId, regs: Ctimer) -> Self {
        Self {
            id,
            regs,
            period_slot: MatchSlot::Match3,
        }
    }
}

/// `(unit, channel, pulse slot)` triple.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelConfig {
    pub unit: UnitId,
    /// Channel index as seen by callers, starting at 1.
    pub channel: u8,
    pub pulse_slot: MatchSlot,
}

impl ChannelConfig {
    pub const fn new(unit: UnitId, channel: u8, pulse_slot: MatchSlot) -> Self {
        Self {
            unit,
            channel,
            pulse_slot,
        }
    }
}

/// Static board configuration.
#[derive(Copy, Clone)]
pub struct BoardConfig<'a> {
    pub units: &'a [UnitConfig],
    pub channels: &'a [ChannelConfig],
}

impl<'a> BoardConfig<'a> {
    pub fn channels_of(&self, unit: UnitId) -> impl Iterator<Item = &'a ChannelConfig> + 'a {
        self.channels.iter().filter(move |c| c.unit == unit)
    }
}

/// Source of the counter input clock of each unit.
pub trait ClockTree {
    /// `None` when the unit's clock source is not attached or unknown.
    fn tick_frequency(&self, unit: UnitId) -> Option<Hertz>;
}

impl<F> ClockTree for F
where
    F: Fn(UnitId) -> Option<Hertz>,
{
    fn tick_frequency(&self, unit: UnitId) -> Option<Hertz> {
        self(unit)
    }
}

/// Every unit clocked from one source, e.g. the main clock.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SharedClock(pub Hertz);

impl ClockTree for SharedClock {
    fn tick_frequency(&self, _unit: UnitId) -> Option<Hertz> {
        Some(self.0)
    }
}
