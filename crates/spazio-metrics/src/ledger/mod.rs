//! Ledger interfaces
//!
//! The durable stores for rentals, assessments, spaces and users are external
//! collaborators. The core consumes them through these narrow async traits;
//! `memory` provides the in-process reference implementation used by tests
//! and local development.

pub mod memory;

use crate::domain::types::{
    AssessmentId, DateRange, EvaluationType, Money, RentalId, Score, SpaceId, UserId,
};
use crate::domain::{AssessmentRecord, RentalRecord};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Field a rental listing is sorted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RentalSortField {
    #[default]
    StartDate,
    EndDate,
    Value,
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RentalSort {
    pub field: RentalSortField,
    pub order: SortOrder,
}

/// One-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit,
        }
    }

    pub fn offset(&self) -> usize {
        ((self.page - 1) as usize) * self.limit as usize
    }
}

/// Equality / range filter over rental records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RentalFilter {
    pub owner_id: Option<UserId>,
    pub tenant_id: Option<UserId>,
    pub space_id: Option<SpaceId>,
    pub date_range: DateRange,
}

impl RentalFilter {
    pub fn for_owner(owner_id: UserId) -> Self {
        Self {
            owner_id: Some(owner_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, rental: &RentalRecord) -> bool {
        if let Some(owner_id) = &self.owner_id {
            if rental.owner_id != *owner_id {
                return false;
            }
        }
        if let Some(tenant_id) = &self.tenant_id {
            if rental.tenant_id != *tenant_id {
                return false;
            }
        }
        if let Some(space_id) = &self.space_id {
            if rental.space_id != *space_id {
                return false;
            }
        }
        self.date_range.matches(rental.start_date, rental.end_date)
    }
}

/// Equality filter over assessment records
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssessmentFilter {
    pub subject_user_id: Option<UserId>,
    pub space_id: Option<SpaceId>,
    /// Set-membership filter; matches assessments for any listed space
    pub space_ids: Option<Vec<SpaceId>>,
    pub author_id: Option<UserId>,
    pub rental_id: Option<RentalId>,
    pub evaluation_type: Option<EvaluationType>,
}

impl AssessmentFilter {
    pub fn for_subject(subject_user_id: UserId) -> Self {
        Self {
            subject_user_id: Some(subject_user_id),
            ..Self::default()
        }
    }

    pub fn for_space(space_id: SpaceId) -> Self {
        Self {
            space_id: Some(space_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, assessment: &AssessmentRecord) -> bool {
        if let Some(subject) = &self.subject_user_id {
            if assessment.subject_user_id != *subject {
                return false;
            }
        }
        if let Some(space_id) = &self.space_id {
            if assessment.space_id != *space_id {
                return false;
            }
        }
        if let Some(space_ids) = &self.space_ids {
            if !space_ids.contains(&assessment.space_id) {
                return false;
            }
        }
        if let Some(author_id) = &self.author_id {
            if assessment.author_id != *author_id {
                return false;
            }
        }
        if let Some(rental_id) = &self.rental_id {
            if assessment.rental_id != *rental_id {
                return false;
            }
        }
        if let Some(evaluation_type) = &self.evaluation_type {
            if assessment.evaluation_type != *evaluation_type {
                return false;
            }
        }
        true
    }
}

/// Mutable assessment fields
#[derive(Debug, Clone, Default)]
pub struct AssessmentPatch {
    pub score: Option<Score>,
    pub comment: Option<String>,
}

/// Durable store of booking records
#[async_trait]
pub trait RentalLedger: Send + Sync {
    /// Insert a whole recurring series (or a single rental) as one unit.
    async fn create_series(&self, rentals: Vec<RentalRecord>) -> Result<Vec<RentalId>>;

    async fn find_one(&self, id: &RentalId) -> Result<Option<RentalRecord>>;

    /// Filtered listing, sorted, optionally paginated.
    async fn find(
        &self,
        filter: &RentalFilter,
        sort: RentalSort,
        page: Option<PageRequest>,
    ) -> Result<Vec<RentalRecord>>;

    async fn count(&self, filter: &RentalFilter) -> Result<u64>;
}

/// Durable store of rating/review records.
///
/// `create` enforces uniqueness on (rental, author, evaluation type) and
/// fails with a conflict when the triple already exists.
#[async_trait]
pub trait AssessmentLedger: Send + Sync {
    async fn create(&self, assessment: AssessmentRecord) -> Result<AssessmentRecord>;

    async fn find_by_id(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>>;

    async fn find_one(&self, filter: &AssessmentFilter) -> Result<Option<AssessmentRecord>>;

    /// Filtered listing, newest evaluation first, optionally paginated.
    async fn find(
        &self,
        filter: &AssessmentFilter,
        page: Option<PageRequest>,
    ) -> Result<Vec<AssessmentRecord>>;

    async fn count(&self, filter: &AssessmentFilter) -> Result<u64>;

    async fn update(
        &self,
        id: &AssessmentId,
        patch: AssessmentPatch,
    ) -> Result<Option<AssessmentRecord>>;

    async fn delete(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>>;
}

/// Display metadata for a space, joined into metric responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceProfile {
    pub id: SpaceId,
    pub owner_id: UserId,
    pub name: String,
    pub location: String,
    pub price_per_hour: Money,
    pub image_url: Option<String>,
}

/// Display metadata for a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
}

/// Read-only directory of spaces
#[async_trait]
pub trait SpaceDirectory: Send + Sync {
    async fn find_one(&self, id: &SpaceId) -> Result<Option<SpaceProfile>>;

    async fn find_many(&self, ids: &[SpaceId]) -> Result<Vec<SpaceProfile>>;

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<SpaceProfile>>;
}

/// Read-only directory of users
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_one(&self, id: &UserId) -> Result<Option<UserProfile>>;
}
