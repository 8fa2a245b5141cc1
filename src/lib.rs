#![cfg_attr(not(test), no_std)]

// This must go FIRST so that all the other modules see its macros.
mod macros;

pub mod board;
pub mod ctimer;
pub mod pwm;
pub mod time;

pub use board::{BoardConfig, ChannelConfig, ClockTree, SharedClock, UnitConfig};
pub use ctimer::{MatchSlot, UnitId};
pub use pwm::{Command, Config, Configuration, Error, PwmChannel, PwmDevice, Registry, Response};
pub use time::Hertz;
