//! Recurring-reservation expansion
//!
//! Turns one booking request into a deterministic, finite series of concrete
//! (start, end) date pairs. This is the only place series length and series
//! pricing are computed, so it must stay side-effect-free and reproducible.

use crate::domain::types::{Money, RecurrenceKind};
use crate::error::{MetricsError, Result};
use chrono::{Duration, Months, NaiveDate};

/// Longest span allowed between the first start date and the recurrence end.
const MAX_RECURRENCE_DAYS: i64 = 365;

/// A validated recurrence request.
///
/// Iterating the schedule yields every concrete instance in order, starting
/// with the original (start, end) pair and stepping by seven days (weekly) or
/// one calendar month (monthly, same day-of-month, clamped to the last valid
/// day of shorter months), while the instance start is on or before
/// `recurrence_end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSchedule {
    start: NaiveDate,
    end: NaiveDate,
    kind: RecurrenceKind,
    recurrence_end: NaiveDate,
}

impl RecurrenceSchedule {
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        kind: RecurrenceKind,
        recurrence_end: NaiveDate,
    ) -> Result<Self> {
        if recurrence_end <= end {
            return Err(MetricsError::validation(
                "Recurrence end date must be after the end date of the first reservation",
            ));
        }
        if recurrence_end - start > Duration::days(MAX_RECURRENCE_DAYS) {
            return Err(MetricsError::validation(
                "Recurrence may not span more than one year from the start date",
            ));
        }
        Ok(Self {
            start,
            end,
            kind,
            recurrence_end,
        })
    }

    pub fn kind(&self) -> RecurrenceKind {
        self.kind
    }

    pub fn recurrence_end(&self) -> NaiveDate {
        self.recurrence_end
    }

    /// Lazy iterator over the concrete instances. Restartable: every call
    /// starts from the first instance again.
    pub fn iter(&self) -> ScheduleIter {
        ScheduleIter {
            schedule: *self,
            index: 0,
        }
    }

    /// Materialize the whole series in order. Always non-empty: the first
    /// instance is the original (start, end) pair and validation guarantees
    /// `start <= recurrence_end`.
    pub fn instances(&self) -> Vec<(NaiveDate, NaiveDate)> {
        self.iter().collect()
    }

    pub fn instance_count(&self) -> u32 {
        self.iter().count() as u32
    }

    /// Total price for the series: per-instance value times instance count.
    pub fn series_total(&self, base_value: Money) -> Money {
        base_value.multiply(self.instance_count())
    }

    fn instance_at(&self, index: u32) -> Option<(NaiveDate, NaiveDate)> {
        let (start, end) = match self.kind {
            RecurrenceKind::Weekly => {
                let offset = Duration::days(7 * index as i64);
                (self.start + offset, self.end + offset)
            }
            RecurrenceKind::Monthly => {
                let months = Months::new(index);
                (
                    self.start.checked_add_months(months)?,
                    self.end.checked_add_months(months)?,
                )
            }
        };
        (start <= self.recurrence_end).then_some((start, end))
    }
}

/// Iterator over the instances of a [`RecurrenceSchedule`]
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    schedule: RecurrenceSchedule,
    index: u32,
}

impl Iterator for ScheduleIter {
    type Item = (NaiveDate, NaiveDate);

    fn next(&mut self) -> Option<Self::Item> {
        let instance = self.schedule.instance_at(self.index)?;
        self.index += 1;
        Some(instance)
    }
}

impl IntoIterator for &RecurrenceSchedule {
    type Item = (NaiveDate, NaiveDate);
    type IntoIter = ScheduleIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_expansion() {
        let schedule = RecurrenceSchedule::new(
            date(2024, 3, 1),
            date(2024, 3, 1),
            RecurrenceKind::Weekly,
            date(2024, 3, 22),
        )
        .unwrap();

        let instances = schedule.instances();
        assert_eq!(
            instances,
            vec![
                (date(2024, 3, 1), date(2024, 3, 1)),
                (date(2024, 3, 8), date(2024, 3, 8)),
                (date(2024, 3, 15), date(2024, 3, 15)),
                (date(2024, 3, 22), date(2024, 3, 22)),
            ]
        );
    }

    #[test]
    fn test_monthly_expansion_clamps_short_months() {
        let schedule = RecurrenceSchedule::new(
            date(2024, 1, 31),
            date(2024, 1, 31),
            RecurrenceKind::Monthly,
            date(2024, 4, 30),
        )
        .unwrap();

        let starts: Vec<NaiveDate> = schedule.iter().map(|(s, _)| s).collect();
        assert_eq!(
            starts,
            vec![date(2024, 1, 31), date(2024, 2, 29), date(2024, 3, 31)]
        );
    }

    #[test]
    fn test_first_instance_is_original_pair() {
        let schedule = RecurrenceSchedule::new(
            date(2024, 5, 10),
            date(2024, 5, 12),
            RecurrenceKind::Weekly,
            date(2024, 6, 1),
        )
        .unwrap();

        assert_eq!(
            schedule.iter().next(),
            Some((date(2024, 5, 10), date(2024, 5, 12)))
        );
    }

    #[test]
    fn test_recurrence_end_must_follow_first_end() {
        let result = RecurrenceSchedule::new(
            date(2024, 3, 1),
            date(2024, 3, 5),
            RecurrenceKind::Weekly,
            date(2024, 3, 5),
        );
        assert!(matches!(result, Err(MetricsError::Validation { .. })));
    }

    #[test]
    fn test_recurrence_span_capped_at_one_year() {
        let result = RecurrenceSchedule::new(
            date(2024, 3, 1),
            date(2024, 3, 1),
            RecurrenceKind::Monthly,
            date(2025, 3, 15),
        );
        assert!(matches!(result, Err(MetricsError::Validation { .. })));
    }

    #[test]
    fn test_series_total_is_count_times_base() {
        let schedule = RecurrenceSchedule::new(
            date(2024, 3, 1),
            date(2024, 3, 1),
            RecurrenceKind::Weekly,
            date(2024, 3, 22),
        )
        .unwrap();

        let base = Money::try_from_f64(50.0).unwrap();
        assert_eq!(schedule.series_total(base), base.multiply(4));
    }

    #[test]
    fn test_iterator_is_restartable() {
        let schedule = RecurrenceSchedule::new(
            date(2024, 3, 1),
            date(2024, 3, 1),
            RecurrenceKind::Weekly,
            date(2024, 3, 22),
        )
        .unwrap();

        assert_eq!(schedule.iter().count(), schedule.iter().count());
    }
}
