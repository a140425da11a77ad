//! Aggregation over the ledgers
//!
//! Each aggregation is a typed request object mapped to a fixed, reviewable
//! query plan. Every operation is read-only and tolerant of empty result
//! sets: "no data" produces zero-valued structures, never an error.

pub mod engine;

pub use engine::AggregationEngine;

use crate::domain::types::{DateRange, Money, SpaceId, UserId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default ranking size for top-rated spaces
pub const DEFAULT_TOP_RATED_LIMIT: usize = 25;

/// Request for a full owner dashboard aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerMetricsRequest {
    pub owner_id: UserId,
    pub date_range: DateRange,
    pub space_id: Option<SpaceId>,
}

/// Grouping axis for revenue reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevenueGroupBy {
    #[default]
    Month,
    Space,
}

/// Request for a grouped revenue report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevenueReportRequest {
    pub owner_id: UserId,
    pub date_range: DateRange,
    pub group_by: RevenueGroupBy,
}

/// Rental count and revenue for one group (space or calendar month)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalGroup {
    pub count: u64,
    pub revenue: Money,
}

impl RentalGroup {
    fn add(&mut self, value: Money) {
        self.count += 1;
        self.revenue = self.revenue.add(value);
    }
}

/// Rating summary for one of the owner's spaces
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceRatingSummary {
    pub total_score: u64,
    pub count: u64,
    pub average_score: f64,
}

/// Short space listing entry in owner metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceListing {
    pub id: SpaceId,
    pub name: String,
}

/// Owner dashboard aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerMetrics {
    pub total_rentals: u64,
    pub total_revenue: Money,
    /// Grouped by space name
    pub rentals_by_space: BTreeMap<String, RentalGroup>,
    /// Grouped by calendar month (`YYYY-MM`)
    pub rentals_by_month: BTreeMap<String, RentalGroup>,
    /// Rating summaries keyed by space id
    pub assessments_by_space: BTreeMap<String, SpaceRatingSummary>,
    pub spaces: Vec<SpaceListing>,
}

/// One row of a revenue report, sorted by `key` ascending
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueRow {
    /// Group key: `YYYY-MM` for month grouping, space name for space grouping
    pub key: String,
    pub total_revenue: Money,
    pub rental_count: u64,
    /// Names of the spaces contributing to this row
    pub space_names: Vec<String>,
}

/// Average rating of a user with the full score histogram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRating {
    /// Rounded to one decimal; 0 when the user has no assessments
    pub average_score: f64,
    pub total_assessments: u64,
    /// All five buckets are always present, defaulting to 0
    pub score_distribution: BTreeMap<u8, u64>,
}

impl UserRating {
    pub fn empty() -> Self {
        Self {
            average_score: 0.0,
            total_assessments: 0,
            score_distribution: (1..=5).map(|score| (score, 0)).collect(),
        }
    }
}

/// Average score of a space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceScore {
    pub space_id: SpaceId,
    /// Rounded to one decimal; 0 when the space has no assessments
    pub average_score: f64,
    pub total_reviews: u64,
}

/// Ranking entry joined with display metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopRatedSpace {
    pub space_id: SpaceId,
    pub average_score: f64,
    pub total_reviews: u64,
    pub name: String,
    pub location: String,
    pub price_per_hour: Money,
    pub image_url: Option<String>,
}

/// Round an average to one decimal place.
pub(crate) fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
