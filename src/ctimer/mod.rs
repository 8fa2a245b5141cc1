//! Standard counter/timer (CTIMER)
//!
//! - 32-bit timer counter with 32-bit prescaler
//! - four match registers, any of which may reset the counter
//! - single-edge PWM on match outputs 0 to 2, MR3 usually defines the cycle length
//!
//! In PWM mode a match output is low from the start of the cycle until the
//! counter reaches its match value, then high until the cycle resets.

mod regs;

pub use regs::{Ctcr, Ctimer, Mcr, Pwmc, Reg, Tcr, BLOCK_WORDS};

/// Number of match registers per timer.
pub const MATCH_SLOT_COUNT: usize = 4;

/// One of the match registers MR0..MR3.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MatchSlot {
    Match0 = 0,
    Match1 = 1,
    Match2 = 2,
    Match3 = 3,
}

impl MatchSlot {
    pub const ALL: [MatchSlot; MATCH_SLOT_COUNT] = [
        MatchSlot::Match0,
        MatchSlot::Match1,
        MatchSlot::Match2,
        MatchSlot::Match3,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// CTIMER instances of the LPC55S6x.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UnitId {
    Ctimer0 = 0,
    Ctimer1 = 1,
    Ctimer2 = 2,
    Ctimer3 = 3,
    Ctimer4 = 4,
}

/// Number of CTIMER instances.
pub const UNIT_COUNT: usize = 5;

impl UnitId {
    pub const ALL: [UnitId; UNIT_COUNT] = [
        UnitId::Ctimer0,
        UnitId::Ctimer1,
        UnitId::Ctimer2,
        UnitId::Ctimer3,
        UnitId::Ctimer4,
    ];

    #[inline]
    pub const fn number(self) -> usize {
        self as usize
    }

    const fn base_address(self) -> usize {
        match self {
            UnitId::Ctimer0 => 0x4000_8000,
            UnitId::Ctimer1 => 0x4000_9000,
            UnitId::Ctimer2 => 0x4002_8000,
            UnitId::Ctimer3 => 0x4002_9000,
            UnitId::Ctimer4 => 0x4002_a000,
        }
    }

    /// Register block of this instance on the LPC55S6x memory map.
    ///
    /// # Safety
    ///
    /// Only meaningful on target, and the caller must be the sole user of the instance.
    pub const unsafe fn regs(self) -> Ctimer {
        Ctimer::from_ptr(self.base_address() as *mut ())
    }
}

impl Ctimer {
    /// Put the timer into timer mode with the given prescale, counter stopped and reset.
    pub fn init(self, prescale: u32) {
        self.tcr().write(|w| w.set_crst(true));
        self.ctcr().write(|w| w.set_ctmode(0));
        self.mcr().write_value(Mcr(0));
        self.pwmc().write_value(Pwmc(0));
        self.pr().write_value(prescale);
        self.tcr().write(|w| w.set_crst(false));
    }

    pub fn start(self) {
        self.tcr().modify(|w| w.set_cen(true));
    }

    pub fn stop(self) {
        self.tcr().modify(|w| w.set_cen(false));
    }

    pub fn is_running(self) -> bool {
        self.tcr().read().cen()
    }

    pub fn prescale(self) -> u32 {
        self.pr().read()
    }

    pub fn match_value(self, slot: MatchSlot) -> u32 {
        self.mr(slot.index()).read()
    }

    pub fn set_match_value(self, slot: MatchSlot, value: u32) {
        self.mr(slot.index()).write_value(value);
    }

    /// Use `period_slot` as the cycle boundary and drive `pulse_slot`'s output as PWM.
    pub fn setup_pwm(self, period_slot: MatchSlot, pulse_slot: MatchSlot, period: u32, pulse: u32) {
        self.mcr().modify(|w| w.set_mrr(period_slot.index(), true));
        self.pwmc().modify(|w| w.set_pwmen(pulse_slot.index(), true));

        self.set_match_value(period_slot, period);
        self.set_match_value(pulse_slot, pulse);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ram() -> (std::boxed::Box<[u32; BLOCK_WORDS]>, Ctimer) {
        let mut mem = std::boxed::Box::new([0xffff_ffffu32; BLOCK_WORDS]);
        let regs = unsafe { Ctimer::from_ptr(mem.as_mut_ptr() as *mut ()) };
        (mem, regs)
    }

    #[test]
    fn register_offsets() {
        let (mem, regs) = ram();
        let base = regs.as_ptr() as usize;

        assert_eq!(regs.tcr().as_ptr() as usize - base, 0x04);
        assert_eq!(regs.pr().as_ptr() as usize - base, 0x0c);
        assert_eq!(regs.mcr().as_ptr() as usize - base, 0x14);
        assert_eq!(regs.mr(0).as_ptr() as usize - base, 0x18);
        assert_eq!(regs.mr(3).as_ptr() as usize - base, 0x24);
        assert_eq!(regs.ctcr().as_ptr() as usize - base, 0x70);
        assert_eq!(regs.pwmc().as_ptr() as usize - base, 0x74);
        drop(mem);
    }

    #[test]
    fn init_leaves_counter_stopped_in_timer_mode() {
        let (mem, regs) = ram();

        regs.init(7);
        assert!(!regs.is_running());
        assert!(!regs.tcr().read().crst());
        assert_eq!(regs.ctcr().read().ctmode(), 0);
        assert_eq!(regs.mcr().read(), Mcr(0));
        assert_eq!(regs.pwmc().read(), Pwmc(0));
        assert_eq!(regs.prescale(), 7);

        regs.start();
        assert!(regs.is_running());
        regs.stop();
        assert!(!regs.is_running());
        drop(mem);
    }

    #[test]
    fn setup_pwm_sets_reset_and_pwm_mode() {
        let (mem, regs) = ram();
        regs.init(0);

        regs.setup_pwm(MatchSlot::Match3, MatchSlot::Match1, 11_999, 5_999);
        regs.setup_pwm(MatchSlot::Match3, MatchSlot::Match2, 11_999, 5_999);

        let mcr = regs.mcr().read();
        assert!(mcr.mrr(3));
        assert!(!mcr.mrr(1) && !mcr.mri(3) && !mcr.mrs(3));

        let pwmc = regs.pwmc().read();
        assert!(pwmc.pwmen(1) && pwmc.pwmen(2));
        assert!(!pwmc.pwmen(0) && !pwmc.pwmen(3));

        assert_eq!(regs.match_value(MatchSlot::Match3), 11_999);
        assert_eq!(regs.match_value(MatchSlot::Match1), 5_999);
        assert_eq!(regs.match_value(MatchSlot::Match2), 5_999);
        assert_eq!(mem[0x18 / 4 + 1], 5_999);
    }
}
