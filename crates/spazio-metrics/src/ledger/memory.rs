//! In-memory ledger implementations
//!
//! Reference backing for tests and local development; semantics mirror what
//! the production document store is expected to provide, including the
//! uniqueness constraint on assessment triples.

use crate::domain::types::{AssessmentId, RentalId, SpaceId, UserId};
use crate::domain::{AssessmentRecord, RentalRecord};
use crate::error::{MetricsError, Result};
use crate::ledger::{
    AssessmentFilter, AssessmentLedger, AssessmentPatch, PageRequest, RentalFilter, RentalLedger,
    RentalSort, RentalSortField, SortOrder, SpaceDirectory, SpaceProfile, UserDirectory,
    UserProfile,
};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

fn paginate<T>(items: Vec<T>, page: Option<PageRequest>) -> Vec<T> {
    match page {
        Some(page) => items
            .into_iter()
            .skip(page.offset())
            .take(page.limit as usize)
            .collect(),
        None => items,
    }
}

/// In-memory rental ledger
#[derive(Default)]
pub struct InMemoryRentalLedger {
    rentals: Arc<RwLock<HashMap<RentalId, RentalRecord>>>,
}

impl InMemoryRentalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn compare(a: &RentalRecord, b: &RentalRecord, sort: RentalSort) -> Ordering {
        let ordering = match sort.field {
            RentalSortField::StartDate => a.start_date.cmp(&b.start_date),
            RentalSortField::EndDate => a.end_date.cmp(&b.end_date),
            RentalSortField::Value => a.value.cmp(&b.value),
            RentalSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        match sort.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

#[async_trait]
impl RentalLedger for InMemoryRentalLedger {
    async fn create_series(&self, rentals: Vec<RentalRecord>) -> Result<Vec<RentalId>> {
        let mut store = self.rentals.write().await;
        let ids: Vec<RentalId> = rentals.iter().map(|r| r.id).collect();
        for rental in rentals {
            store.insert(rental.id, rental);
        }
        Ok(ids)
    }

    async fn find_one(&self, id: &RentalId) -> Result<Option<RentalRecord>> {
        let store = self.rentals.read().await;
        Ok(store.get(id).cloned())
    }

    async fn find(
        &self,
        filter: &RentalFilter,
        sort: RentalSort,
        page: Option<PageRequest>,
    ) -> Result<Vec<RentalRecord>> {
        let store = self.rentals.read().await;
        let mut matching: Vec<RentalRecord> = store
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| Self::compare(a, b, sort));
        Ok(paginate(matching, page))
    }

    async fn count(&self, filter: &RentalFilter) -> Result<u64> {
        let store = self.rentals.read().await;
        Ok(store.values().filter(|r| filter.matches(r)).count() as u64)
    }
}

/// In-memory assessment ledger
#[derive(Default)]
pub struct InMemoryAssessmentLedger {
    assessments: Arc<RwLock<HashMap<AssessmentId, AssessmentRecord>>>,
}

impl InMemoryAssessmentLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssessmentLedger for InMemoryAssessmentLedger {
    async fn create(&self, assessment: AssessmentRecord) -> Result<AssessmentRecord> {
        let mut store = self.assessments.write().await;
        // Uniqueness constraint on (rental, author, evaluation type)
        let duplicate = store.values().any(|existing| {
            existing.rental_id == assessment.rental_id
                && existing.author_id == assessment.author_id
                && existing.evaluation_type == assessment.evaluation_type
        });
        if duplicate {
            return Err(MetricsError::conflict(
                "An assessment for this rental, author and evaluation type already exists",
            ));
        }
        store.insert(assessment.id, assessment.clone());
        Ok(assessment)
    }

    async fn find_by_id(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>> {
        let store = self.assessments.read().await;
        Ok(store.get(id).cloned())
    }

    async fn find_one(&self, filter: &AssessmentFilter) -> Result<Option<AssessmentRecord>> {
        let store = self.assessments.read().await;
        Ok(store.values().find(|a| filter.matches(a)).cloned())
    }

    async fn find(
        &self,
        filter: &AssessmentFilter,
        page: Option<PageRequest>,
    ) -> Result<Vec<AssessmentRecord>> {
        let store = self.assessments.read().await;
        let mut matching: Vec<AssessmentRecord> = store
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.evaluation_date.cmp(&a.evaluation_date));
        Ok(paginate(matching, page))
    }

    async fn count(&self, filter: &AssessmentFilter) -> Result<u64> {
        let store = self.assessments.read().await;
        Ok(store.values().filter(|a| filter.matches(a)).count() as u64)
    }

    async fn update(
        &self,
        id: &AssessmentId,
        patch: AssessmentPatch,
    ) -> Result<Option<AssessmentRecord>> {
        let mut store = self.assessments.write().await;
        let Some(assessment) = store.get_mut(id) else {
            return Ok(None);
        };
        if let Some(score) = patch.score {
            assessment.score = score;
        }
        if let Some(comment) = patch.comment {
            assessment.comment = Some(comment);
        }
        Ok(Some(assessment.clone()))
    }

    async fn delete(&self, id: &AssessmentId) -> Result<Option<AssessmentRecord>> {
        let mut store = self.assessments.write().await;
        Ok(store.remove(id))
    }
}

/// In-memory space directory
#[derive(Default)]
pub struct InMemorySpaceDirectory {
    spaces: Arc<RwLock<HashMap<SpaceId, SpaceProfile>>>,
}

impl InMemorySpaceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, space: SpaceProfile) {
        self.spaces.write().await.insert(space.id, space);
    }
}

#[async_trait]
impl SpaceDirectory for InMemorySpaceDirectory {
    async fn find_one(&self, id: &SpaceId) -> Result<Option<SpaceProfile>> {
        let store = self.spaces.read().await;
        Ok(store.get(id).cloned())
    }

    async fn find_many(&self, ids: &[SpaceId]) -> Result<Vec<SpaceProfile>> {
        let store = self.spaces.read().await;
        Ok(ids.iter().filter_map(|id| store.get(id).cloned()).collect())
    }

    async fn find_by_owner(&self, owner_id: &UserId) -> Result<Vec<SpaceProfile>> {
        let store = self.spaces.read().await;
        let mut spaces: Vec<SpaceProfile> = store
            .values()
            .filter(|s| s.owner_id == *owner_id)
            .cloned()
            .collect();
        spaces.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(spaces)
    }
}

/// In-memory user directory
#[derive(Default)]
pub struct InMemoryUserDirectory {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user: UserProfile) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_one(&self, id: &UserId) -> Result<Option<UserProfile>> {
        let store = self.users.read().await;
        Ok(store.get(id).cloned())
    }
}
