//! Time units

use core::ops::Div;

pub const NANOS_PER_SECOND: u32 = 1_000_000_000;

/// Hertz
#[derive(PartialEq, PartialOrd, Ord, Clone, Copy, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Hertz(pub u32);

impl Hertz {
    pub const fn hz(hertz: u32) -> Self {
        Self(hertz)
    }

    pub const fn khz(kilohertz: u32) -> Self {
        Self(kilohertz * 1_000)
    }

    pub const fn mhz(megahertz: u32) -> Self {
        Self(megahertz * 1_000_000)
    }

    /// Frequency whose period is `nanos` nanoseconds, truncated.
    ///
    /// Periods longer than one second give `Hertz(0)`.
    pub const fn from_period_ns(nanos: u32) -> Option<Self> {
        if nanos == 0 {
            None
        } else {
            Some(Self(NANOS_PER_SECOND / nanos))
        }
    }

    /// Period in nanoseconds, truncated. `None` for 0Hz.
    pub const fn period_ns(self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(NANOS_PER_SECOND / self.0)
        }
    }
}

/// This is a convenience shortcut for [`Hertz::hz`]
pub const fn hz(hertz: u32) -> Hertz {
    Hertz::hz(hertz)
}

/// This is a convenience shortcut for [`Hertz::khz`]
pub const fn khz(kilohertz: u32) -> Hertz {
    Hertz::khz(kilohertz)
}

/// This is a convenience shortcut for [`Hertz::mhz`]
pub const fn mhz(megahertz: u32) -> Hertz {
    Hertz::mhz(megahertz)
}

impl Div<u32> for Hertz {
    type Output = Hertz;

    fn div(self, rhs: u32) -> Self::Output {
        Hertz(self.0 / rhs)
    }
}
