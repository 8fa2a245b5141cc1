use embassy_sync::blocking_mutex::raw::{CriticalSectionRawMutex, RawMutex};
use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use super::{Error, PwmDevice};
use crate::board::ClockTree;

/// One channel as an [`embedded_hal::pwm::SetDutyCycle`] output.
///
/// The duty range is the unit's cycle length in ticks (saturated to `u16::MAX`).
/// Duty `0` holds the output low, full duty holds it high. Only the pulse match
/// register is written, the shared period is left alone.
pub struct PwmChannel<'r, C: ClockTree, M: RawMutex = CriticalSectionRawMutex> {
    device: PwmDevice<'r, C, M>,
    channel: u8,
}

impl<'r, C: ClockTree, M: RawMutex> PwmChannel<'r, C, M> {
    pub(crate) fn new(device: PwmDevice<'r, C, M>, channel: u8) -> Self {
        Self { device, channel }
    }

    pub fn channel(&self) -> u8 {
        self.channel
    }

    pub fn enable(&mut self) -> Result<(), Error> {
        self.device.enable(self.channel)
    }

    pub fn disable(&mut self) -> Result<(), Error> {
        self.device.disable(self.channel)
    }

    /// Ticks per cycle, at least 1.
    fn cycles(&self) -> u64 {
        self.device.unit().with(|state| {
            let period = state.regs.match_value(state.slots.period_slot());
            period as u64 + 1
        })
    }
}

impl<'r, C: ClockTree, M: RawMutex> ErrorType for PwmChannel<'r, C, M> {
    type Error = Error;
}

impl<'r, C: ClockTree, M: RawMutex> SetDutyCycle for PwmChannel<'r, C, M> {
    fn max_duty_cycle(&self) -> u16 {
        self.cycles().min(u16::MAX as u64) as u16
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let channel = self.channel;

        self.device.unit().with(|state| {
            let (period_slot, pulse_slot) = state.slots.lookup(channel)?;
            let cycles = state.regs.match_value(period_slot) as u64 + 1;
            let max = cycles.min(u16::MAX as u64);

            if duty as u64 > max {
                return Err(Error::InvalidArgument);
            }

            let on = cycles * duty as u64 / max;
            // zero duty on a u32::MAX period has no match value past the boundary
            let pulse = u32::try_from(cycles - on).map_err(|_| Error::InvalidArgument)?;
            state.regs.set_match_value(pulse_slot, pulse);
            Ok(())
        })
    }
}
