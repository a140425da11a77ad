//! Request and response types for the Spazio API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use spazio_metrics::domain::types::{
    DateRange, EvaluationType, Money, RecurrenceKind, SpaceId, TimeOfDay, UserId,
};
use spazio_metrics::domain::{BookingRequest, RecurrenceRequest};
use spazio_metrics::ledger::{RentalSort, RentalSortField, SortOrder};

/// Recurrence section of a booking body
#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceBody {
    pub kind: RecurrenceKind,
    pub end_date: NaiveDate,
}

/// Body for `POST /rentals`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRentalBody {
    pub tenant_id: UserId,
    pub space_id: SpaceId,
    pub owner_id: UserId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// 24h HH:MM
    pub start_time: String,
    /// 24h HH:MM
    pub end_time: String,
    /// Per-instance price
    pub value: f64,
    pub recurrence: Option<RecurrenceBody>,
}

impl CreateRentalBody {
    /// Validate the wire-level fields into a booking request.
    pub fn into_booking(self) -> spazio_metrics::Result<BookingRequest> {
        Ok(BookingRequest {
            tenant_id: self.tenant_id,
            space_id: self.space_id,
            owner_id: self.owner_id,
            start_date: self.start_date,
            end_date: self.end_date,
            start_time: TimeOfDay::new(self.start_time)?,
            end_time: TimeOfDay::new(self.end_time)?,
            value: Money::try_from_f64(self.value)?,
            recurrence: self.recurrence.map(|r| RecurrenceRequest {
                kind: r.kind,
                end_date: r.end_date,
            }),
        })
    }
}

/// Query parameters for `GET /rentals`
#[derive(Debug, Clone, Deserialize)]
pub struct ListRentalsQuery {
    pub owner_id: UserId,
    pub tenant_id: Option<UserId>,
    pub space_id: Option<SpaceId>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub sort_by: Option<RentalSortField>,
    pub order: Option<SortOrder>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListRentalsQuery {
    pub fn date_range(&self) -> DateRange {
        DateRange::new(self.start_date, self.end_date)
    }

    pub fn sort(&self) -> RentalSort {
        RentalSort {
            field: self.sort_by.unwrap_or_default(),
            order: self.order.unwrap_or_default(),
        }
    }
}

/// Query parameters for `GET /owners/:owner_id/metrics`
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerMetricsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub space_id: Option<SpaceId>,
}

/// Query parameters for `GET /owners/:owner_id/revenue-report`
#[derive(Debug, Clone, Deserialize)]
pub struct RevenueReportQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub group_by: Option<spazio_metrics::aggregation::RevenueGroupBy>,
}

/// Query parameters for `GET /spaces/top-rated`
#[derive(Debug, Clone, Deserialize)]
pub struct TopRatedQuery {
    pub limit: Option<usize>,
}

/// Query parameters for `GET /users/:user_id/assessments`
#[derive(Debug, Clone, Deserialize)]
pub struct UserAssessmentsQuery {
    pub evaluation_type: Option<EvaluationType>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Query parameters for paginated admin listings
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Response for `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
