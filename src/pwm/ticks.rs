//! Nanoseconds <-> match register ticks.
//!
//! Match values follow the CTIMER PWM convention: the pulse match holds the
//! *off* time measured from the start of the cycle, so a larger pulse match
//! means a shorter asserted pulse.
//!
//! Conversions go through an integer frequency and an integer duty percentage,
//! so a `set` followed by a `get` is only accurate to rounding.

use super::Error;
use crate::time::Hertz;

/// Counter increment rate for tick frequency `f` and prescale `p`.
pub fn counter_frequency(f: Hertz, prescale: u32) -> Result<Hertz, Error> {
    let div = prescale.checked_add(1).ok_or(Error::InvalidArgument)?;
    let g = f / div;
    if g.0 == 0 {
        return Err(Error::DivisionByZero);
    }
    Ok(g)
}

/// Period match value for an output frequency.
///
/// Fails with `InvalidArgument` when the counter is too slow for one tick per cycle.
pub fn frequency_to_ticks(target: Hertz, f: Hertz, prescale: u32) -> Result<u32, Error> {
    let g = counter_frequency(f, prescale)?;
    if target.0 == 0 {
        return Err(Error::DivisionByZero);
    }

    match g.0 / target.0 {
        0 => Err(Error::InvalidArgument),
        cycles => Ok(cycles - 1),
    }
}

/// Period match value for a period given in nanoseconds.
pub fn period_to_ticks(period_ns: u32, f: Hertz, prescale: u32) -> Result<u32, Error> {
    let target = Hertz::from_period_ns(period_ns).ok_or(Error::InvalidArgument)?;
    frequency_to_ticks(target, f, prescale)
}

/// Integer duty percentage of `pulse_ns` within `period_ns`.
pub fn duty_percent(period_ns: u32, pulse_ns: u32) -> Result<u8, Error> {
    if period_ns == 0 || pulse_ns > period_ns {
        return Err(Error::InvalidArgument);
    }
    Ok((pulse_ns as u64 * 100 / period_ns as u64) as u8)
}

/// Pulse match value for a duty cycle.
///
/// A duty of 0 places the match past the period boundary so the output never asserts.
pub fn pulse_to_ticks(duty_percent: u8, period_ticks: u32) -> Result<u32, Error> {
    if duty_percent > 100 {
        return Err(Error::InvalidArgument);
    }
    if duty_percent == 0 {
        return period_ticks.checked_add(1).ok_or(Error::InvalidArgument);
    }

    let off = period_ticks as u64 * (100 - duty_percent as u64) / 100;
    Ok(off as u32)
}

/// Period in nanoseconds currently programmed by `period_ticks`.
pub fn ticks_to_period_ns(period_ticks: u32, f: Hertz, prescale: u32) -> Result<u32, Error> {
    let g = counter_frequency(f, prescale)?;
    let cycles = period_ticks as u64 + 1;
    let get_freq = Hertz((g.0 as u64 / cycles) as u32);

    get_freq.period_ns().ok_or(Error::DivisionByZero)
}

/// Duty percentage programmed by a pulse/period match pair.
pub fn ticks_to_duty_percent(pulse_ticks: u32, period_ticks: u32) -> u8 {
    let cycles = period_ticks as u64 + 1;
    let on = cycles.saturating_sub(pulse_ticks as u64);

    (100 * on / cycles) as u8
}

/// Pulse width in nanoseconds from the match pair and the already converted period.
pub fn ticks_to_pulse_ns(pulse_ticks: u32, period_ticks: u32, period_ns: u32) -> u32 {
    let duty = ticks_to_duty_percent(pulse_ticks, period_ticks);

    (duty as u64 * period_ns as u64 / 100) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    const F_12M: Hertz = Hertz(12_000_000);

    #[test]
    fn one_khz_on_12mhz_counter() {
        assert_eq!(period_to_ticks(1_000_000, F_12M, 0), Ok(11_999));
        assert_eq!(frequency_to_ticks(Hertz(1_000), F_12M, 0), Ok(11_999));
    }

    #[test]
    fn prescale_divides_counter_clock() {
        // 12MHz / 4 = 3MHz counter, 1kHz output
        assert_eq!(period_to_ticks(1_000_000, F_12M, 3), Ok(2_999));
        assert_eq!(counter_frequency(F_12M, 3), Ok(Hertz(3_000_000)));
    }

    #[test]
    fn period_shorter_than_a_tick_is_rejected() {
        // 10ns is 100MHz, faster than the counter
        assert_eq!(period_to_ticks(10, F_12M, 0), Err(Error::InvalidArgument));
        assert_eq!(period_to_ticks(0, F_12M, 0), Err(Error::InvalidArgument));
    }

    #[test]
    fn period_longer_than_a_second_has_no_frequency() {
        assert_eq!(period_to_ticks(2_000_000_000, F_12M, 0), Err(Error::DivisionByZero));
    }

    #[test]
    fn zero_clock_is_division_by_zero() {
        assert_eq!(period_to_ticks(1_000_000, Hertz(0), 0), Err(Error::DivisionByZero));
        assert_eq!(ticks_to_period_ns(11_999, Hertz(0), 0), Err(Error::DivisionByZero));
    }

    #[test]
    fn pulse_stays_within_period() {
        for period_ticks in [0u32, 1, 2, 99, 100, 11_999, 65_535, u32::MAX - 1] {
            for duty in 1..=100u8 {
                let pulse = pulse_to_ticks(duty, period_ticks).unwrap();
                assert!(pulse <= period_ticks, "duty {} period {}", duty, period_ticks);
            }
        }
    }

    #[test]
    fn zero_duty_is_past_period_boundary() {
        for period_ticks in [0u32, 1, 11_999, u32::MAX - 1] {
            assert_eq!(pulse_to_ticks(0, period_ticks), Ok(period_ticks + 1));
        }
        assert_eq!(pulse_to_ticks(0, u32::MAX), Err(Error::InvalidArgument));
    }

    #[test]
    fn pulse_match_is_off_time() {
        assert_eq!(pulse_to_ticks(100, 11_999), Ok(0));
        assert_eq!(pulse_to_ticks(50, 11_999), Ok(5_999));
        assert_eq!(pulse_to_ticks(25, 11_999), Ok(8_999));
        assert_eq!(pulse_to_ticks(101, 11_999), Err(Error::InvalidArgument));
    }

    #[test]
    fn duty_from_nanoseconds() {
        assert_eq!(duty_percent(1_000_000, 500_000), Ok(50));
        assert_eq!(duty_percent(1_000_000, 0), Ok(0));
        assert_eq!(duty_percent(1_000_000, 1_000_000), Ok(100));
        assert_eq!(duty_percent(3, 2), Ok(66));
        assert_eq!(duty_percent(1_000, 2_000), Err(Error::InvalidArgument));
        assert_eq!(duty_percent(0, 0), Err(Error::InvalidArgument));
    }

    #[test]
    fn read_back_half_duty() {
        let period_ns = ticks_to_period_ns(11_999, F_12M, 0).unwrap();
        assert_eq!(period_ns, 1_000_000);
        assert_eq!(ticks_to_duty_percent(5_999, 11_999), 50);
        assert_eq!(ticks_to_pulse_ns(5_999, 11_999, period_ns), 500_000);
    }

    #[test]
    fn read_back_extremes() {
        assert_eq!(ticks_to_duty_percent(12_000, 11_999), 0);
        assert_eq!(ticks_to_duty_percent(0, 11_999), 100);
        // garbage pulse match beyond the boundary reads as never asserted
        assert_eq!(ticks_to_duty_percent(u32::MAX, 11_999), 0);
        assert_eq!(ticks_to_pulse_ns(0, u32::MAX, 1_000), 1_000);
    }

    #[test]
    fn read_back_is_lossy() {
        // 7kHz does not divide 12MHz, period reads back rounded
        let ticks = period_to_ticks(142_857, F_12M, 0).unwrap();
        assert_eq!(ticks, 1_713);
        assert_eq!(ticks_to_period_ns(ticks, F_12M, 0), Ok(142_836));

        let ticks = period_to_ticks(333_333, F_12M, 0).unwrap();
        assert_eq!(ticks, 3_999);
        assert_eq!(ticks_to_period_ns(ticks, F_12M, 0), Ok(333_333));
    }

    #[test]
    fn counter_slower_than_period_reads_as_division_by_zero() {
        // 12M ticks + 1 per cycle on a 12MHz counter is below 1Hz
        assert_eq!(ticks_to_period_ns(12_000_000, F_12M, 0), Err(Error::DivisionByZero));
    }
}
