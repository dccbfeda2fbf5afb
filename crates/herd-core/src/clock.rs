//! Simulation clock and trailing windows.
//!
//! The clock is the single source of truth for the simulation day. The
//! reporting and statistics windows are derived from the day counter and
//! the run length, never stored independently.
//!
//! # Design Principles
//!
//! - All day arithmetic is checked or saturating (no silent overflow).
//! - A window of `n` days covers the last `n` days of the run: day `d` is
//!   inside it when `days - d <= n`.

use crate::config::RunConfig;

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The clock was advanced past the end of the run.
    #[error("clock advanced past the final day {days}")]
    PastEnd {
        /// Configured run length.
        days: u32,
    },

    /// Invalid run configuration (e.g. zero days).
    #[error("invalid clock configuration: {reason}")]
    InvalidConfig {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

/// Day counter for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimClock {
    /// Current day, 0-based.
    day: u32,

    /// Total days in the run.
    days: u32,

    /// Trailing economics window length.
    reporting_window: u32,

    /// Trailing reproduction statistics window length.
    stat_window: u32,
}

impl SimClock {
    /// Create a clock at day 0 from the run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::InvalidConfig`] if the run has no days or a
    /// window is longer than the run.
    pub fn new(config: &RunConfig) -> Result<Self, ClockError> {
        Self::from_parts(
            0,
            config.days,
            config.reporting_window,
            config.stat_window(),
        )
    }

    /// Create a clock from explicit parts (useful for tests).
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), plus a starting day past the end.
    pub fn from_parts(
        day: u32,
        days: u32,
        reporting_window: u32,
        stat_window: u32,
    ) -> Result<Self, ClockError> {
        if days == 0 {
            return Err(ClockError::InvalidConfig {
                reason: "a run needs at least one day".to_owned(),
            });
        }
        if reporting_window > days || stat_window > days {
            return Err(ClockError::InvalidConfig {
                reason: format!(
                    "windows ({reporting_window}, {stat_window}) exceed run length {days}"
                ),
            });
        }
        if day >= days {
            return Err(ClockError::PastEnd { days });
        }
        Ok(Self {
            day,
            days,
            reporting_window,
            stat_window,
        })
    }

    /// Move to the next day. Returns the new day.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::PastEnd`] if the current day is the last one.
    pub fn advance(&mut self) -> Result<u32, ClockError> {
        let next = self
            .day
            .checked_add(1)
            .filter(|next| *next < self.days)
            .ok_or(ClockError::PastEnd { days: self.days })?;
        self.day = next;
        Ok(next)
    }

    /// Current day, 0-based.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Total days in the run.
    pub const fn days(&self) -> u32 {
        self.days
    }

    /// Whether today is the final day.
    pub const fn is_last_day(&self) -> bool {
        self.day.saturating_add(1) >= self.days
    }

    /// Days left after today.
    pub const fn remaining(&self) -> u32 {
        self.days.saturating_sub(self.day).saturating_sub(1)
    }

    /// Whether today falls in the trailing economics window.
    pub const fn in_reporting_window(&self) -> bool {
        self.days.saturating_sub(self.day) <= self.reporting_window
    }

    /// Whether today falls in the trailing reproduction statistics window.
    pub const fn in_stat_window(&self) -> bool {
        self.days.saturating_sub(self.day) <= self.stat_window
    }

    /// Whether today is the first day of the economics window.
    pub const fn opens_reporting_window(&self) -> bool {
        self.days.saturating_sub(self.day) == self.reporting_window
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_day_zero_and_stops_at_the_end() {
        let mut clock = SimClock::from_parts(0, 3, 1, 1).unwrap();
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.remaining(), 2);
        assert_eq!(clock.advance().unwrap(), 1);
        assert_eq!(clock.advance().unwrap(), 2);
        assert!(clock.is_last_day());
        assert!(matches!(clock.advance(), Err(ClockError::PastEnd { days: 3 })));
        assert_eq!(clock.day(), 2);
    }

    #[test]
    fn window_covers_the_last_n_days() {
        let mut clock = SimClock::from_parts(0, 10, 3, 0).unwrap();
        let mut inside = Vec::new();
        loop {
            if clock.in_reporting_window() {
                inside.push(clock.day());
            }
            if clock.advance().is_err() {
                break;
            }
        }
        assert_eq!(inside, vec![7, 8, 9]);
    }

    #[test]
    fn window_opens_exactly_once() {
        let clock = SimClock::from_parts(7, 10, 3, 0).unwrap();
        assert!(clock.opens_reporting_window());
        let clock = SimClock::from_parts(8, 10, 3, 0).unwrap();
        assert!(!clock.opens_reporting_window());
    }

    #[test]
    fn zero_stat_window_is_never_open() {
        let clock = SimClock::from_parts(9, 10, 1, 0).unwrap();
        assert!(!clock.in_stat_window());
        assert!(clock.in_reporting_window());
    }

    #[test]
    fn invalid_parts_are_rejected() {
        assert!(SimClock::from_parts(0, 0, 0, 0).is_err());
        assert!(SimClock::from_parts(0, 5, 6, 0).is_err());
        assert!(SimClock::from_parts(5, 5, 1, 1).is_err());
    }
}
