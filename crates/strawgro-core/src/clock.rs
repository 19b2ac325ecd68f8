//! Crop clock: days after planting and weather chronology.
//!
//! The clock is the single source of truth for the day counter of a run.
//! It refuses records that predate planting and, once the first record has
//! been consumed, any record that is not exactly one day after the previous
//! one. Missing days are never interpolated.
//!
//! Validation ([`CropClock::peek`]) is separate from mutation
//! ([`CropClock::advance`]) so a rejected day leaves the clock untouched.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Errors that can occur during clock operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    /// The first weather record falls before the planting date.
    #[error("weather record {date} predates planting date {planting_date}")]
    BeforePlanting {
        /// Date of the offending record.
        date: NaiveDate,
        /// Configured planting date.
        planting_date: NaiveDate,
    },

    /// A record is not the day immediately after the previous record.
    #[error("weather sequence is not dense: expected {expected}, found {found}")]
    NotConsecutive {
        /// The only date that would have been accepted.
        expected: NaiveDate,
        /// Date of the offending record.
        found: NaiveDate,
    },

    /// The calendar cannot represent the day after the previous record.
    #[error("no calendar date follows {last}")]
    DateOverflow {
        /// Date of the previous record.
        last: NaiveDate,
    },

    /// Day counter would overflow.
    #[error("day-after-planting counter overflow: cannot advance beyond u32::MAX")]
    DayOverflow,
}

/// Day counter and chronology guard for one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropClock {
    /// Configured planting date.
    planting_date: NaiveDate,

    /// Days after planting of the last consumed record (0 before day 1).
    day: u32,

    /// Date of the last consumed record.
    last_date: Option<NaiveDate>,
}

impl CropClock {
    /// Create a clock at planting: day 0, no record consumed yet.
    pub const fn new(planting_date: NaiveDate) -> Self {
        Self {
            planting_date,
            day: 0,
            last_date: None,
        }
    }

    /// Check that `date` may be consumed next and return the day number it
    /// would be assigned. Does not advance the clock.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError`] if the date breaks chronology or the day
    /// counter would overflow.
    pub fn peek(&self, date: NaiveDate) -> Result<u32, ClockError> {
        match self.last_date {
            None if date < self.planting_date => {
                return Err(ClockError::BeforePlanting {
                    date,
                    planting_date: self.planting_date,
                });
            }
            None => {}
            Some(last) => {
                let expected = last
                    .succ_opt()
                    .ok_or(ClockError::DateOverflow { last })?;
                if date != expected {
                    return Err(ClockError::NotConsecutive {
                        expected,
                        found: date,
                    });
                }
            }
        }
        self.day.checked_add(1).ok_or(ClockError::DayOverflow)
    }

    /// Consume `date` and return the new day number.
    ///
    /// # Errors
    ///
    /// Same conditions as [`CropClock::peek`]; the clock is unchanged on error.
    pub fn advance(&mut self, date: NaiveDate) -> Result<u32, ClockError> {
        let day = self.peek(date)?;
        self.day = day;
        self.last_date = Some(date);
        Ok(day)
    }

    /// Return to planting conditions.
    pub const fn reset(&mut self) {
        self.day = 0;
        self.last_date = None;
    }

    /// Days after planting of the last consumed record.
    pub const fn day(&self) -> u32 {
        self.day
    }

    /// Configured planting date.
    pub const fn planting_date(&self) -> NaiveDate {
        self.planting_date
    }

    /// Date of the last consumed record, if any.
    pub const fn last_date(&self) -> Option<NaiveDate> {
        self.last_date
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, month, day).unwrap()
    }

    #[test]
    fn starts_at_day_zero() {
        let clock = CropClock::new(date(5, 1));
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.last_date(), None);
        assert_eq!(clock.planting_date(), date(5, 1));
    }

    #[test]
    fn advances_on_consecutive_days() {
        let mut clock = CropClock::new(date(5, 1));
        assert_eq!(clock.advance(date(5, 1)).unwrap(), 1);
        assert_eq!(clock.advance(date(5, 2)).unwrap(), 2);
        assert_eq!(clock.last_date(), Some(date(5, 2)));
    }

    #[test]
    fn first_record_may_follow_planting() {
        let mut clock = CropClock::new(date(5, 1));
        assert_eq!(clock.advance(date(5, 3)).unwrap(), 1);
    }

    #[test]
    fn rejects_record_before_planting() {
        let clock = CropClock::new(date(5, 1));
        let err = clock.peek(date(4, 30)).unwrap_err();
        assert!(matches!(err, ClockError::BeforePlanting { .. }));
    }

    #[test]
    fn rejects_gap_without_advancing() {
        let mut clock = CropClock::new(date(5, 1));
        clock.advance(date(5, 1)).unwrap();
        let err = clock.advance(date(5, 3)).unwrap_err();
        assert_eq!(
            err,
            ClockError::NotConsecutive {
                expected: date(5, 2),
                found: date(5, 3),
            }
        );
        assert_eq!(clock.day(), 1);
        assert_eq!(clock.last_date(), Some(date(5, 1)));
    }

    #[test]
    fn rejects_repeated_date() {
        let mut clock = CropClock::new(date(5, 1));
        clock.advance(date(5, 1)).unwrap();
        assert!(clock.advance(date(5, 1)).is_err());
    }

    #[test]
    fn crosses_month_and_year_boundaries() {
        let mut clock = CropClock::new(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        clock.advance(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()).unwrap();
        let day = clock
            .advance(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .unwrap();
        assert_eq!(day, 2);
    }

    #[test]
    fn reset_returns_to_planting() {
        let mut clock = CropClock::new(date(5, 1));
        clock.advance(date(5, 1)).unwrap();
        clock.reset();
        assert_eq!(clock.day(), 0);
        assert_eq!(clock.advance(date(5, 1)).unwrap(), 1);
    }

    #[test]
    fn day_counter_overflow_is_an_error() {
        let clock = CropClock {
            planting_date: date(5, 1),
            day: u32::MAX,
            last_date: None,
        };
        assert_eq!(clock.peek(date(5, 1)).unwrap_err(), ClockError::DayOverflow);
    }
}
