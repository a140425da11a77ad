use crate::domain::recurrence::RecurrenceSchedule;
use crate::domain::types::{Money, RecurrenceKind, RentalId, SpaceId, TimeOfDay, UserId};
use crate::error::{MetricsError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A booking record in the rental ledger.
///
/// Recurring series: the first created instance is the parent and holds the
/// ordered `instance_ids` of every sibling; every sibling points back through
/// `parent_rental_id`. All instances share the per-instance value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalRecord {
    pub id: RentalId,
    pub tenant_id: UserId,
    pub space_id: SpaceId,
    pub owner_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub value: Money,
    pub is_recurring: bool,
    pub recurrence_kind: Option<RecurrenceKind>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub parent_rental_id: Option<RentalId>,
    pub instance_ids: Vec<RentalId>,
    pub created_at: DateTime<Utc>,
}

impl RentalRecord {
    /// Whether the stay has completed as of `today`.
    pub fn has_ended(&self, today: NaiveDate) -> bool {
        self.end_date < today
    }

    /// Calendar month of the start date as a `YYYY-MM` grouping key.
    pub fn month_key(&self) -> String {
        self.start_date.format("%Y-%m").to_string()
    }
}

/// Recurrence section of a booking request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRequest {
    pub kind: RecurrenceKind,
    pub end_date: NaiveDate,
}

/// A validated booking request, possibly recurring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub tenant_id: UserId,
    pub space_id: SpaceId,
    pub owner_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub value: Money,
    pub recurrence: Option<RecurrenceRequest>,
}

impl BookingRequest {
    /// Check the rental invariants, failing fast with the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.end_date < self.start_date {
            return Err(MetricsError::validation(
                "End date must be on or after the start date",
            ));
        }
        if self.start_date == self.end_date && self.end_time <= self.start_time {
            return Err(MetricsError::validation(
                "End time must be after the start time for same-day rentals",
            ));
        }
        if let Some(recurrence) = &self.recurrence {
            // Surfaces the specific recurrence rule that was violated.
            self.schedule_for(recurrence)?;
        }
        Ok(())
    }

    /// Build the expansion schedule for a recurring request.
    pub fn schedule(&self) -> Result<Option<RecurrenceSchedule>> {
        match &self.recurrence {
            Some(recurrence) => Ok(Some(self.schedule_for(recurrence)?)),
            None => Ok(None),
        }
    }

    fn schedule_for(&self, recurrence: &RecurrenceRequest) -> Result<RecurrenceSchedule> {
        RecurrenceSchedule::new(
            self.start_date,
            self.end_date,
            recurrence.kind,
            recurrence.end_date,
        )
    }

    /// Materialize one rental instance of this request.
    pub fn instance(
        &self,
        start_date: NaiveDate,
        end_date: NaiveDate,
        parent: Option<RentalId>,
    ) -> RentalRecord {
        RentalRecord {
            id: RentalId::new(),
            tenant_id: self.tenant_id,
            space_id: self.space_id,
            owner_id: self.owner_id,
            start_date,
            end_date,
            start_time: self.start_time.clone(),
            end_time: self.end_time.clone(),
            value: self.value,
            is_recurring: self.recurrence.is_some(),
            recurrence_kind: self.recurrence.as_ref().map(|r| r.kind),
            recurrence_end_date: self.recurrence.as_ref().map(|r| r.end_date),
            parent_rental_id: parent,
            instance_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request() -> BookingRequest {
        BookingRequest {
            tenant_id: UserId::new(),
            space_id: SpaceId::new(),
            owner_id: UserId::new(),
            start_date: date(2024, 3, 1),
            end_date: date(2024, 3, 1),
            start_time: TimeOfDay::new("14:00").unwrap(),
            end_time: TimeOfDay::new("16:00").unwrap(),
            value: Money::try_from_f64(120.0).unwrap(),
            recurrence: None,
        }
    }

    #[test]
    fn test_valid_booking() {
        assert!(request().validate().is_ok());
    }

    #[test]
    fn test_end_date_before_start_rejected() {
        let mut booking = request();
        booking.end_date = date(2024, 2, 28);
        assert!(matches!(
            booking.validate(),
            Err(MetricsError::Validation { .. })
        ));
    }

    #[test]
    fn test_same_day_time_ordering() {
        let mut booking = request();
        booking.end_time = TimeOfDay::new("13:00").unwrap();
        assert!(booking.validate().is_err());

        // Only enforced for same-day rentals
        booking.end_date = date(2024, 3, 2);
        assert!(booking.validate().is_ok());
    }

    #[test]
    fn test_recurrence_validation_is_surfaced() {
        let mut booking = request();
        booking.recurrence = Some(RecurrenceRequest {
            kind: RecurrenceKind::Weekly,
            end_date: date(2024, 3, 1),
        });
        assert!(booking.validate().is_err());
    }

    #[test]
    fn test_rental_completion() {
        let booking = request();
        let rental = booking.instance(date(2024, 1, 8), date(2024, 1, 10), None);
        assert!(!rental.has_ended(date(2024, 1, 10)));
        assert!(rental.has_ended(date(2024, 1, 11)));
        assert_eq!(rental.month_key(), "2024-01");
    }
}
