//! Metrics facade
//!
//! The single entry point callers use. Every read goes through the cache
//! (key from [`crate::cache::keys`], TTL from config); every write goes to
//! the ledger first and then applies the matching [`CoherencePolicy`]
//! eviction set, so a cached read never outlives the data it was derived
//! from by more than the eviction itself.

use crate::aggregation::{
    AggregationEngine, OwnerMetrics, OwnerMetricsRequest, RevenueReportRequest, RevenueRow,
    SpaceScore, TopRatedSpace, UserRating, DEFAULT_TOP_RATED_LIMIT,
};
use crate::cache::{keys, CacheService, CacheStore, CoherencePolicy};
use crate::config::MetricsConfig;
use crate::domain::types::{
    AssessmentId, DateRange, EvaluationType, Money, RentalId, Score, SpaceId, UserId,
};
use crate::domain::{AssessmentRecord, BookingRequest, NewAssessment, RentalRecord};
use crate::error::{MetricsError, Result};
use crate::ledger::{
    AssessmentFilter, AssessmentLedger, AssessmentPatch, PageRequest, RentalFilter, RentalLedger,
    RentalSort, SpaceDirectory, UserDirectory,
};
use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Page of results with navigation metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    fn new(items: Vec<T>, total: u64, page: PageRequest) -> Self {
        let limit = page.limit.max(1) as u64;
        let total_pages = total.div_ceil(limit) as u32;
        Self {
            items,
            total,
            current_page: page.page,
            total_pages,
            has_next: page.page < total_pages,
            has_previous: page.page > 1,
        }
    }
}

/// Who is performing a mutation
#[derive(Debug, Clone, Copy)]
pub struct Requester {
    pub id: UserId,
    pub is_admin: bool,
}

impl Requester {
    pub fn user(id: UserId) -> Self {
        Self {
            id,
            is_admin: false,
        }
    }

    pub fn admin(id: UserId) -> Self {
        Self { id, is_admin: true }
    }
}

/// Request to create an assessment, with wire-level (unvalidated) fields
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAssessmentRequest {
    pub subject_user_id: UserId,
    pub space_id: SpaceId,
    pub rental_id: RentalId,
    pub author_id: UserId,
    pub score: f64,
    pub comment: Option<String>,
    pub evaluation_type: EvaluationType,
}

/// Request for an owner to rate the tenant of one of their completed rentals
#[derive(Debug, Clone, Deserialize)]
pub struct OwnerAssessmentRequest {
    pub rental_id: RentalId,
    pub author_id: UserId,
    pub score: f64,
    pub comment: Option<String>,
}

/// Partial assessment update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateAssessmentRequest {
    pub score: Option<f64>,
    pub comment: Option<String>,
}

/// Owner-scoped rental listing request
#[derive(Debug, Clone)]
pub struct RentalListingRequest {
    pub owner_id: UserId,
    pub tenant_id: Option<UserId>,
    pub space_id: Option<SpaceId>,
    pub date_range: DateRange,
    pub sort: RentalSort,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Assessment joined with display metadata for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentView {
    #[serde(flatten)]
    pub assessment: AssessmentRecord,
    pub author_name: Option<String>,
    pub space_name: Option<String>,
    pub space_location: Option<String>,
}

/// Outcome of booking a rental, single or recurring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedRentals {
    /// The parent rental (equals the only rental for non-recurring bookings)
    pub parent_id: RentalId,
    /// Every created rental id, parent first, in occurrence order
    pub rental_ids: Vec<RentalId>,
    /// Per-instance value times the number of instances
    pub total_value: Money,
}

pub struct MetricsFacade {
    rentals: Arc<dyn RentalLedger>,
    assessments: Arc<dyn AssessmentLedger>,
    spaces: Arc<dyn SpaceDirectory>,
    users: Arc<dyn UserDirectory>,
    engine: AggregationEngine,
    cache: CacheService,
    config: MetricsConfig,
}

impl MetricsFacade {
    pub fn new(
        rentals: Arc<dyn RentalLedger>,
        assessments: Arc<dyn AssessmentLedger>,
        spaces: Arc<dyn SpaceDirectory>,
        users: Arc<dyn UserDirectory>,
        store: Arc<dyn CacheStore>,
        config: MetricsConfig,
    ) -> Self {
        let engine = AggregationEngine::new(
            Arc::clone(&rentals),
            Arc::clone(&assessments),
            Arc::clone(&spaces),
        );
        Self {
            rentals,
            assessments,
            spaces,
            users,
            engine,
            cache: CacheService::new(store),
            config,
        }
    }

    fn resolve_page(&self, page: Option<u32>, limit: Option<u32>) -> PageRequest {
        let pagination = &self.config.pagination;
        let limit = limit
            .unwrap_or(pagination.default_limit)
            .clamp(1, pagination.max_limit);
        PageRequest::new(page.unwrap_or(pagination.default_page), limit)
    }

    /// Cached read: serve the cached value under `key` or compute and store
    /// it with the short TTL.
    async fn cached<T, F>(&self, key: String, compute: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: std::future::Future<Output = Result<T>>,
    {
        if let Some(hit) = self.cache.get_json::<T>(&key).await {
            return Ok(hit);
        }
        let value = compute.await?;
        self.cache
            .set_json(&key, &value, self.config.cache.short_ttl())
            .await;
        Ok(value)
    }

    // ---- rentals ----

    /// Book a rental. A recurring request is expanded into its full series
    /// and inserted as one unit; the first instance is the parent.
    pub async fn create_rental(&self, request: BookingRequest) -> Result<CreatedRentals> {
        request.validate()?;
        self.spaces
            .find_one(&request.space_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("space"))?;

        let (records, total_value) = match request.schedule()? {
            Some(schedule) => {
                let mut records: Vec<RentalRecord> = Vec::new();
                for (start, end) in schedule.iter() {
                    let parent = records.first().map(|r: &RentalRecord| r.id);
                    records.push(request.instance(start, end, parent));
                }
                let sibling_ids: Vec<RentalId> =
                    records.iter().skip(1).map(|r| r.id).collect();
                if let Some(parent) = records.first_mut() {
                    parent.instance_ids = sibling_ids;
                }
                let total = schedule.series_total(request.value);
                (records, total)
            }
            None => (
                vec![request.instance(request.start_date, request.end_date, None)],
                request.value,
            ),
        };

        let rental_ids = self.rentals.create_series(records).await?;
        let parent_id = *rental_ids
            .first()
            .ok_or_else(|| MetricsError::validation("Booking produced no rental instances"))?;

        self.cache
            .apply(CoherencePolicy::rental_mutated(&request.owner_id))
            .await;

        Ok(CreatedRentals {
            parent_id,
            rental_ids,
            total_value,
        })
    }

    /// Owner's rentals, filtered, sorted and paginated.
    pub async fn get_rentals_filtered(
        &self,
        request: RentalListingRequest,
    ) -> Result<Paginated<RentalRecord>> {
        let page = self.resolve_page(request.page, request.limit);
        let filter = RentalFilter {
            owner_id: Some(request.owner_id),
            tenant_id: request.tenant_id,
            space_id: request.space_id,
            date_range: request.date_range,
        };
        let key = keys::rentals_filtered(&request.owner_id, &filter, request.sort, page);
        self.cached(key, async {
            let (items, total) = tokio::try_join!(
                self.rentals.find(&filter, request.sort, Some(page)),
                self.rentals.count(&filter),
            )?;
            Ok(Paginated::new(items, total, page))
        })
        .await
    }

    pub async fn get_owner_metrics(&self, request: OwnerMetricsRequest) -> Result<OwnerMetrics> {
        let key = keys::owner_metrics(&request);
        self.cached(key, self.engine.owner_metrics(&request)).await
    }

    pub async fn get_revenue_report(
        &self,
        request: RevenueReportRequest,
    ) -> Result<Vec<RevenueRow>> {
        let key = keys::revenue_report(&request);
        self.cached(key, self.engine.revenue_report(&request)).await
    }

    // ---- assessments ----

    /// Create an assessment of a user or a space after a rental.
    pub async fn create_assessment(
        &self,
        request: CreateAssessmentRequest,
    ) -> Result<AssessmentRecord> {
        let score = Score::try_from_f64(request.score)?;
        self.users
            .find_one(&request.subject_user_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("user"))?;
        let space = self
            .spaces
            .find_one(&request.space_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("space"))?;

        if request.evaluation_type == EvaluationType::OwnerToTenant
            && request.author_id != space.owner_id
        {
            return Err(MetricsError::authorization(
                "Only the space owner may assess a tenant",
            ));
        }

        let new_assessment = NewAssessment {
            subject_user_id: request.subject_user_id,
            space_id: request.space_id,
            rental_id: request.rental_id,
            author_id: request.author_id,
            score,
            comment: request.comment,
            evaluation_type: request.evaluation_type,
        };
        new_assessment.validate()?;
        self.insert_assessment(new_assessment).await
    }

    /// Owner rates the tenant of one of their rentals. Allowed only after
    /// the rental has completed.
    pub async fn create_owner_assessment(
        &self,
        request: OwnerAssessmentRequest,
    ) -> Result<AssessmentRecord> {
        let score = Score::try_from_f64(request.score)?;
        let rental = self
            .rentals
            .find_one(&request.rental_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("rental"))?;

        if request.author_id != rental.owner_id {
            return Err(MetricsError::authorization(
                "Only the owner of this rental may assess its tenant",
            ));
        }
        if !rental.has_ended(Utc::now().date_naive()) {
            return Err(MetricsError::conflict(
                "A tenant can only be assessed after the rental is completed",
            ));
        }

        let new_assessment = NewAssessment {
            subject_user_id: rental.tenant_id,
            space_id: rental.space_id,
            rental_id: rental.id,
            author_id: request.author_id,
            score,
            comment: request.comment,
            evaluation_type: EvaluationType::OwnerToTenant,
        };
        new_assessment.validate()?;
        self.insert_assessment(new_assessment).await
    }

    async fn insert_assessment(&self, new_assessment: NewAssessment) -> Result<AssessmentRecord> {
        let duplicate = self
            .assessments
            .find_one(&AssessmentFilter {
                rental_id: Some(new_assessment.rental_id),
                author_id: Some(new_assessment.author_id),
                evaluation_type: Some(new_assessment.evaluation_type),
                ..AssessmentFilter::default()
            })
            .await?;
        if duplicate.is_some() {
            return Err(MetricsError::conflict(
                "You have already assessed this rental",
            ));
        }

        let record = self.assessments.create(new_assessment.into_record()).await?;
        self.cache
            .apply(CoherencePolicy::assessment_mutated(
                &record.space_id,
                &record.subject_user_id,
            ))
            .await;
        Ok(record)
    }

    /// Update an assessment's score and/or comment. Author-only, unless the
    /// requester is an admin.
    pub async fn update_assessment(
        &self,
        id: &AssessmentId,
        requester: Requester,
        request: UpdateAssessmentRequest,
    ) -> Result<AssessmentRecord> {
        let existing = self
            .assessments
            .find_by_id(id)
            .await?
            .ok_or_else(|| MetricsError::not_found("assessment"))?;
        if existing.author_id != requester.id && !requester.is_admin {
            return Err(MetricsError::authorization(
                "Only the author may update this assessment",
            ));
        }

        let patch = AssessmentPatch {
            score: request.score.map(Score::try_from_f64).transpose()?,
            comment: match request.comment {
                Some(comment) => {
                    crate::domain::validate_comment(&comment)?;
                    Some(comment)
                }
                None => None,
            },
        };

        let updated = self
            .assessments
            .update(id, patch)
            .await?
            .ok_or_else(|| MetricsError::not_found("assessment"))?;
        self.cache
            .apply(CoherencePolicy::assessment_mutated(
                &updated.space_id,
                &updated.subject_user_id,
            ))
            .await;
        Ok(updated)
    }

    /// Delete an assessment. Author-only, unless the requester is an admin.
    pub async fn delete_assessment(&self, id: &AssessmentId, requester: Requester) -> Result<()> {
        let existing = self
            .assessments
            .find_by_id(id)
            .await?
            .ok_or_else(|| MetricsError::not_found("assessment"))?;
        if existing.author_id != requester.id && !requester.is_admin {
            return Err(MetricsError::authorization(
                "Only the author may delete this assessment",
            ));
        }

        self.assessments.delete(id).await?;
        self.cache
            .apply(CoherencePolicy::assessment_mutated(
                &existing.space_id,
                &existing.subject_user_id,
            ))
            .await;
        Ok(())
    }

    /// Join assessments with the author and space display names the listing
    /// endpoints return alongside each record.
    async fn enrich_assessments(
        &self,
        records: Vec<AssessmentRecord>,
    ) -> Result<Vec<AssessmentView>> {
        let mut authors: HashMap<UserId, Option<String>> = HashMap::new();
        let mut spaces: HashMap<SpaceId, Option<(String, String)>> = HashMap::new();
        for record in &records {
            if !authors.contains_key(&record.author_id) {
                let name = self
                    .users
                    .find_one(&record.author_id)
                    .await?
                    .map(|user| user.name);
                authors.insert(record.author_id, name);
            }
            if !spaces.contains_key(&record.space_id) {
                let profile = self
                    .spaces
                    .find_one(&record.space_id)
                    .await?
                    .map(|space| (space.name, space.location));
                spaces.insert(record.space_id, profile);
            }
        }

        Ok(records
            .into_iter()
            .map(|assessment| {
                let space = spaces.get(&assessment.space_id).cloned().flatten();
                AssessmentView {
                    author_name: authors.get(&assessment.author_id).cloned().flatten(),
                    space_name: space.as_ref().map(|(name, _)| name.clone()),
                    space_location: space.map(|(_, location)| location),
                    assessment,
                }
            })
            .collect())
    }

    /// All assessments for a space, newest first.
    pub async fn get_assessments_by_space(
        &self,
        space_id: &SpaceId,
    ) -> Result<Vec<AssessmentView>> {
        self.spaces
            .find_one(space_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("space"))?;

        let key = keys::assessments_space(space_id);
        let filter = AssessmentFilter::for_space(*space_id);
        self.cached(key, async {
            let records = self.assessments.find(&filter, None).await?;
            self.enrich_assessments(records).await
        })
        .await
    }

    /// Assessments where the user is the subject, newest first, paginated.
    pub async fn get_user_assessments(
        &self,
        user_id: &UserId,
        evaluation_type: Option<EvaluationType>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<AssessmentView>> {
        self.users
            .find_one(user_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("user"))?;

        let page = self.resolve_page(page, limit);
        let filter = AssessmentFilter {
            subject_user_id: Some(*user_id),
            evaluation_type,
            ..AssessmentFilter::default()
        };
        let key = keys::user_assessments(user_id, evaluation_type, page);
        self.cached(key, async {
            let (records, total) = tokio::try_join!(
                self.assessments.find(&filter, Some(page)),
                self.assessments.count(&filter),
            )?;
            let items = self.enrich_assessments(records).await?;
            Ok(Paginated::new(items, total, page))
        })
        .await
    }

    /// Admin-only listing of every assessment.
    pub async fn get_all_assessments(
        &self,
        requester: Requester,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Paginated<AssessmentView>> {
        if !requester.is_admin {
            return Err(MetricsError::authorization(
                "Only administrators may list all assessments",
            ));
        }

        let page = self.resolve_page(page, limit);
        let filter = AssessmentFilter::default();
        let key = keys::all_assessments(page);
        self.cached(key, async {
            let (records, total) = tokio::try_join!(
                self.assessments.find(&filter, Some(page)),
                self.assessments.count(&filter),
            )?;
            let items = self.enrich_assessments(records).await?;
            Ok(Paginated::new(items, total, page))
        })
        .await
    }

    // ---- derived metrics ----

    /// A user's average rating and score histogram. Cached under the slow
    /// TTL; ratings move slowly relative to listings.
    pub async fn get_user_rating(&self, user_id: &UserId) -> Result<UserRating> {
        self.users
            .find_one(user_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("user"))?;

        let key = keys::user_rating(user_id);
        if let Some(hit) = self.cache.get_json::<UserRating>(&key).await {
            return Ok(hit);
        }
        let rating = self.engine.user_rating(user_id).await?;
        self.cache
            .set_json(&key, &rating, self.config.cache.slow_ttl())
            .await;
        Ok(rating)
    }

    pub async fn get_average_score_by_space(&self, space_id: &SpaceId) -> Result<SpaceScore> {
        self.spaces
            .find_one(space_id)
            .await?
            .ok_or_else(|| MetricsError::not_found("space"))?;

        let key = keys::average_score(space_id);
        self.cached(key, self.engine.space_average_score(space_id))
            .await
    }

    pub async fn get_top_rated_spaces(&self, limit: Option<usize>) -> Result<Vec<TopRatedSpace>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_RATED_LIMIT);
        let key = keys::top_rated_spaces(limit);
        self.cached(key, self.engine.top_rated_spaces(Some(limit)))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginated_envelope_math() {
        let page = PageRequest::new(2, 10);
        let paginated = Paginated::new(vec![0u8; 10], 25, page);
        assert_eq!(paginated.total_pages, 3);
        assert!(paginated.has_next);
        assert!(paginated.has_previous);

        let last = Paginated::new(vec![0u8; 5], 25, PageRequest::new(3, 10));
        assert!(!last.has_next);
    }

    #[test]
    fn test_paginated_empty() {
        let paginated = Paginated::<u8>::new(Vec::new(), 0, PageRequest::new(1, 10));
        assert_eq!(paginated.total_pages, 0);
        assert!(!paginated.has_next);
        assert!(!paginated.has_previous);
    }
}
