//! World clock for the Granary simulation.
//!
//! A tick is half a day. The clock toggles the subphase once per tick and
//! rolls the day over when Evening turns into Morning. The clock is the only
//! place that knows this rule.

use granary_types::Subphase;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Day counter would overflow.
    #[error("day counter overflow: cannot advance beyond u64::MAX")]
    DayOverflow,

    /// A restored clock carried an impossible day number.
    #[error("invalid day number {day}: days start at 1")]
    InvalidDay {
        /// The rejected day number.
        day: u64,
    },
}

/// Day number and subphase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldClock {
    /// Current day, starting at 1.
    day: u64,

    /// Current half of the day.
    subphase: Subphase,
}

impl WorldClock {
    /// Create a clock at the morning of day 1.
    pub const fn new() -> Self {
        Self {
            day: 1,
            subphase: Subphase::Morning,
        }
    }

    /// Create a clock from explicit parts (used when restoring a snapshot).
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidDay`] if `day` is 0.
    pub const fn from_parts(day: u64, subphase: Subphase) -> Result<Self, ClockError> {
        if day == 0 {
            return Err(ClockError::InvalidDay { day });
        }
        Ok(Self { day, subphase })
    }

    /// Advance by one tick and return the new subphase.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::DayOverflow`] if rolling over would exceed
    /// `u64::MAX` days.
    pub fn advance(&mut self) -> Result<Subphase, ClockError> {
        match self.subphase {
            Subphase::Morning => {
                self.subphase = Subphase::Evening;
            }
            Subphase::Evening => {
                self.day = self.day.checked_add(1).ok_or(ClockError::DayOverflow)?;
                self.subphase = Subphase::Morning;
            }
        }
        Ok(self.subphase)
    }

    /// Return the current day.
    pub const fn day(&self) -> u64 {
        self.day
    }

    /// Return the current subphase.
    pub const fn subphase(&self) -> Subphase {
        self.subphase
    }
}

impl Default for WorldClock {
    fn default() -> Self {
        Self::new()
    }
}
