//! Channel to match register assignment of one unit.

use static_assertions::const_assert;

use super::Error;
use crate::ctimer::{MatchSlot, MATCH_SLOT_COUNT};

/// Channels a unit can host: every match register except the period one.
pub const MAX_CHANNELS: usize = MATCH_SLOT_COUNT - 1;

const_assert!(MAX_CHANNELS >= 1);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SlotMap {
    period_slot: MatchSlot,
    pulse_slots: [Option<MatchSlot>; MAX_CHANNELS],
}

impl SlotMap {
    pub const fn new(period_slot: MatchSlot) -> Self {
        Self {
            period_slot,
            pulse_slots: [None; MAX_CHANNELS],
        }
    }

    fn index(channel: u8) -> Result<usize, Error> {
        match channel as usize {
            n @ 1..=MAX_CHANNELS => Ok(n - 1),
            _ => Err(Error::Configuration),
        }
    }

    pub fn period_slot(&self) -> MatchSlot {
        self.period_slot
    }

    /// Bind `channel` to `pulse_slot`.
    ///
    /// Each slot backs at most one channel and never the period boundary.
    pub fn assign(&mut self, channel: u8, pulse_slot: MatchSlot) -> Result<(), Error> {
        let idx = Self::index(channel)?;

        if pulse_slot == self.period_slot {
            return Err(Error::Configuration);
        }
        if self.pulse_slots[idx].is_some() {
            return Err(Error::Configuration);
        }
        if self.pulse_slots.contains(&Some(pulse_slot)) {
            return Err(Error::Configuration);
        }

        self.pulse_slots[idx] = Some(pulse_slot);
        Ok(())
    }

    /// `(period_slot, pulse_slot)` of a configured channel.
    pub fn lookup(&self, channel: u8) -> Result<(MatchSlot, MatchSlot), Error> {
        let idx = Self::index(channel)?;
        let pulse_slot = self.pulse_slots[idx].ok_or(Error::Configuration)?;

        Ok((self.period_slot, pulse_slot))
    }

    /// Configured `(channel, pulse_slot)` pairs in channel order.
    pub fn channels(&self) -> impl Iterator<Item = (u8, MatchSlot)> + '_ {
        self.pulse_slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.map(|s| (i as u8 + 1, s)))
    }

    pub fn is_empty(&self) -> bool {
        self.pulse_slots.iter().all(Option::is_none)
    }
}
