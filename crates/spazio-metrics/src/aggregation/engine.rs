use crate::aggregation::{
    round_one_decimal, OwnerMetrics, OwnerMetricsRequest, RentalGroup, RevenueGroupBy,
    RevenueReportRequest, RevenueRow, SpaceListing, SpaceRatingSummary, SpaceScore, TopRatedSpace,
    UserRating, DEFAULT_TOP_RATED_LIMIT,
};
use crate::domain::types::{Money, SpaceId, UserId};
use crate::error::Result;
use crate::ledger::{
    AssessmentFilter, AssessmentLedger, RentalFilter, RentalLedger, RentalSort, SpaceDirectory,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

/// Computes derived metrics from the ledgers.
///
/// Purely read-only; knows nothing about caching.
pub struct AggregationEngine {
    rentals: Arc<dyn RentalLedger>,
    assessments: Arc<dyn AssessmentLedger>,
    spaces: Arc<dyn SpaceDirectory>,
}

impl AggregationEngine {
    pub fn new(
        rentals: Arc<dyn RentalLedger>,
        assessments: Arc<dyn AssessmentLedger>,
        spaces: Arc<dyn SpaceDirectory>,
    ) -> Self {
        Self {
            rentals,
            assessments,
            spaces,
        }
    }

    /// Owner dashboard: rental totals, per-space and per-month groupings,
    /// plus rating summaries for the owner's spaces.
    pub async fn owner_metrics(&self, request: &OwnerMetricsRequest) -> Result<OwnerMetrics> {
        let filter = RentalFilter {
            owner_id: Some(request.owner_id),
            space_id: request.space_id,
            date_range: request.date_range,
            ..RentalFilter::default()
        };

        // Rentals and the owner's space list are independent reads.
        let (rentals, spaces) = tokio::try_join!(
            self.rentals.find(&filter, RentalSort::default(), None),
            self.spaces.find_by_owner(&request.owner_id),
        )?;

        let space_names: HashMap<SpaceId, String> =
            spaces.iter().map(|s| (s.id, s.name.clone())).collect();

        let total_rentals = rentals.len() as u64;
        let total_revenue = rentals
            .iter()
            .fold(Money::zero(), |acc, r| acc.add(r.value));

        let mut rentals_by_space: BTreeMap<String, RentalGroup> = BTreeMap::new();
        let mut rentals_by_month: BTreeMap<String, RentalGroup> = BTreeMap::new();
        for rental in &rentals {
            let space_name = space_names
                .get(&rental.space_id)
                .cloned()
                .unwrap_or_else(|| "unknown space".to_string());
            rentals_by_space.entry(space_name).or_default().add(rental.value);
            rentals_by_month
                .entry(rental.month_key())
                .or_default()
                .add(rental.value);
        }

        let space_ids: Vec<SpaceId> = spaces.iter().map(|s| s.id).collect();
        let assessments = self
            .assessments
            .find(
                &AssessmentFilter {
                    space_ids: Some(space_ids),
                    ..AssessmentFilter::default()
                },
                None,
            )
            .await?;

        let mut assessments_by_space: BTreeMap<String, SpaceRatingSummary> = BTreeMap::new();
        for assessment in &assessments {
            let summary = assessments_by_space
                .entry(assessment.space_id.to_string())
                .or_default();
            summary.total_score += assessment.score.value() as u64;
            summary.count += 1;
        }
        for summary in assessments_by_space.values_mut() {
            summary.average_score = summary.total_score as f64 / summary.count as f64;
        }

        Ok(OwnerMetrics {
            total_rentals,
            total_revenue,
            rentals_by_space,
            rentals_by_month,
            assessments_by_space,
            spaces: spaces
                .into_iter()
                .map(|s| SpaceListing {
                    id: s.id,
                    name: s.name,
                })
                .collect(),
        })
    }

    /// Revenue grouped by calendar month or by space, rows sorted by group
    /// key ascending.
    pub async fn revenue_report(&self, request: &RevenueReportRequest) -> Result<Vec<RevenueRow>> {
        let filter = RentalFilter {
            owner_id: Some(request.owner_id),
            date_range: request.date_range,
            ..RentalFilter::default()
        };

        let (rentals, spaces) = tokio::try_join!(
            self.rentals.find(&filter, RentalSort::default(), None),
            self.spaces.find_by_owner(&request.owner_id),
        )?;

        let space_names: HashMap<SpaceId, String> =
            spaces.iter().map(|s| (s.id, s.name.clone())).collect();
        let name_of = |space_id: &SpaceId| {
            space_names
                .get(space_id)
                .cloned()
                .unwrap_or_else(|| "unknown space".to_string())
        };

        let mut groups: BTreeMap<String, (RentalGroup, BTreeSet<String>)> = BTreeMap::new();
        for rental in &rentals {
            let key = match request.group_by {
                RevenueGroupBy::Month => rental.month_key(),
                RevenueGroupBy::Space => name_of(&rental.space_id),
            };
            let (group, names) = groups.entry(key).or_default();
            group.add(rental.value);
            names.insert(name_of(&rental.space_id));
        }

        Ok(groups
            .into_iter()
            .map(|(key, (group, names))| RevenueRow {
                key,
                total_revenue: group.revenue,
                rental_count: group.count,
                space_names: names.into_iter().collect(),
            })
            .collect())
    }

    /// Average score and full 1-5 distribution for a user. Zero-valued when
    /// the user has no assessments.
    pub async fn user_rating(&self, user_id: &UserId) -> Result<UserRating> {
        let assessments = self
            .assessments
            .find(&AssessmentFilter::for_subject(*user_id), None)
            .await?;

        let mut rating = UserRating::empty();
        if assessments.is_empty() {
            return Ok(rating);
        }

        let mut total_score = 0u64;
        for assessment in &assessments {
            total_score += assessment.score.value() as u64;
            *rating
                .score_distribution
                .entry(assessment.score.value())
                .or_insert(0) += 1;
        }
        rating.total_assessments = assessments.len() as u64;
        rating.average_score =
            round_one_decimal(total_score as f64 / assessments.len() as f64);
        Ok(rating)
    }

    /// Average score for a space; average 0 / count 0 when unrated.
    pub async fn space_average_score(&self, space_id: &SpaceId) -> Result<SpaceScore> {
        let assessments = self
            .assessments
            .find(&AssessmentFilter::for_space(*space_id), None)
            .await?;

        if assessments.is_empty() {
            return Ok(SpaceScore {
                space_id: *space_id,
                average_score: 0.0,
                total_reviews: 0,
            });
        }

        let total: u64 = assessments.iter().map(|a| a.score.value() as u64).sum();
        Ok(SpaceScore {
            space_id: *space_id,
            average_score: round_one_decimal(total as f64 / assessments.len() as f64),
            total_reviews: assessments.len() as u64,
        })
    }

    /// Spaces ranked by average score descending, joined with display
    /// metadata. Spaces missing from the directory are dropped from the
    /// ranking.
    pub async fn top_rated_spaces(&self, limit: Option<usize>) -> Result<Vec<TopRatedSpace>> {
        let limit = limit.unwrap_or(DEFAULT_TOP_RATED_LIMIT);
        let assessments = self
            .assessments
            .find(&AssessmentFilter::default(), None)
            .await?;

        let mut by_space: HashMap<SpaceId, (u64, u64)> = HashMap::new();
        for assessment in &assessments {
            let (total, count) = by_space.entry(assessment.space_id).or_default();
            *total += assessment.score.value() as u64;
            *count += 1;
        }

        let mut ranked: Vec<(SpaceId, f64, u64)> = by_space
            .into_iter()
            .map(|(space_id, (total, count))| {
                (space_id, total as f64 / count as f64, count)
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(b.2.cmp(&a.2))
                .then(a.0.as_uuid().cmp(&b.0.as_uuid()))
        });
        ranked.truncate(limit);

        let ids: Vec<SpaceId> = ranked.iter().map(|(id, _, _)| *id).collect();
        let profiles = self.spaces.find_many(&ids).await?;
        let profiles: HashMap<SpaceId, _> =
            profiles.into_iter().map(|p| (p.id, p)).collect();

        Ok(ranked
            .into_iter()
            .filter_map(|(space_id, average, count)| {
                profiles.get(&space_id).map(|profile| TopRatedSpace {
                    space_id,
                    average_score: round_one_decimal(average),
                    total_reviews: count,
                    name: profile.name.clone(),
                    location: profile.location.clone(),
                    price_per_hour: profile.price_per_hour,
                    image_url: profile.image_url.clone(),
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::{
        AssessmentId, DateRange, EvaluationType, RentalId, Score, TimeOfDay,
    };
    use crate::domain::{AssessmentRecord, RentalRecord};
    use crate::ledger::memory::{
        InMemoryAssessmentLedger, InMemoryRentalLedger, InMemorySpaceDirectory,
    };
    use crate::ledger::SpaceProfile;
    use chrono::{NaiveDate, Utc};

    struct Fixture {
        engine: AggregationEngine,
        rentals: Arc<InMemoryRentalLedger>,
        assessments: Arc<InMemoryAssessmentLedger>,
        spaces: Arc<InMemorySpaceDirectory>,
    }

    fn fixture() -> Fixture {
        let rentals = Arc::new(InMemoryRentalLedger::new());
        let assessments = Arc::new(InMemoryAssessmentLedger::new());
        let spaces = Arc::new(InMemorySpaceDirectory::new());
        let engine = AggregationEngine::new(
            rentals.clone(),
            assessments.clone(),
            spaces.clone(),
        );
        Fixture {
            engine,
            rentals,
            assessments,
            spaces,
        }
    }

    fn space(owner: UserId, name: &str) -> SpaceProfile {
        SpaceProfile {
            id: SpaceId::new(),
            owner_id: owner,
            name: name.to_string(),
            location: "Lisbon".to_string(),
            price_per_hour: Money::try_from_f64(40.0).unwrap(),
            image_url: None,
        }
    }

    fn rental(owner: UserId, space: SpaceId, start: NaiveDate, value: f64) -> RentalRecord {
        RentalRecord {
            id: RentalId::new(),
            tenant_id: UserId::new(),
            space_id: space,
            owner_id: owner,
            start_date: start,
            end_date: start,
            start_time: TimeOfDay::new("10:00").unwrap(),
            end_time: TimeOfDay::new("12:00").unwrap(),
            value: Money::try_from_f64(value).unwrap(),
            is_recurring: false,
            recurrence_kind: None,
            recurrence_end_date: None,
            parent_rental_id: None,
            instance_ids: Vec::new(),
            created_at: Utc::now(),
        }
    }

    fn assessment(subject: UserId, space: SpaceId, score: u8) -> AssessmentRecord {
        AssessmentRecord {
            id: AssessmentId::new(),
            subject_user_id: subject,
            space_id: space,
            rental_id: RentalId::new(),
            author_id: UserId::new(),
            score: Score::new(score).unwrap(),
            comment: None,
            evaluation_type: EvaluationType::TenantToSpace,
            is_owner_evaluation: false,
            evaluation_date: Utc::now(),
        }
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_owner_metrics_groups_by_space_and_month() {
        let f = fixture();
        let owner = UserId::new();
        let studio = space(owner, "Studio");
        let loft = space(owner, "Loft");
        f.spaces.insert(studio.clone()).await;
        f.spaces.insert(loft.clone()).await;

        f.rentals
            .create_series(vec![
                rental(owner, studio.id, date(1, 10), 100.0),
                rental(owner, studio.id, date(1, 20), 150.0),
                rental(owner, loft.id, date(2, 5), 200.0),
            ])
            .await
            .unwrap();

        f.assessments
            .create(assessment(UserId::new(), studio.id, 4))
            .await
            .unwrap();
        f.assessments
            .create(assessment(UserId::new(), studio.id, 5))
            .await
            .unwrap();

        let metrics = f
            .engine
            .owner_metrics(&OwnerMetricsRequest {
                owner_id: owner,
                date_range: DateRange::default(),
                space_id: None,
            })
            .await
            .unwrap();

        assert_eq!(metrics.total_rentals, 3);
        assert_eq!(
            metrics.total_revenue,
            Money::try_from_f64(450.0).unwrap()
        );
        assert_eq!(metrics.rentals_by_space["Studio"].count, 2);
        assert_eq!(metrics.rentals_by_month["2024-01"].count, 2);
        assert_eq!(metrics.rentals_by_month["2024-02"].count, 1);

        let summary = &metrics.assessments_by_space[&studio.id.to_string()];
        assert_eq!(summary.total_score, 9);
        assert_eq!(summary.count, 2);
        assert!((summary.average_score - 4.5).abs() < f64::EPSILON);
        assert_eq!(metrics.spaces.len(), 2);
    }

    #[tokio::test]
    async fn test_owner_metrics_empty_is_zero_valued() {
        let f = fixture();
        let metrics = f
            .engine
            .owner_metrics(&OwnerMetricsRequest {
                owner_id: UserId::new(),
                date_range: DateRange::default(),
                space_id: None,
            })
            .await
            .unwrap();

        assert_eq!(metrics.total_rentals, 0);
        assert_eq!(metrics.total_revenue, Money::zero());
        assert!(metrics.rentals_by_space.is_empty());
    }

    #[tokio::test]
    async fn test_revenue_report_by_month_sorted_ascending() {
        let f = fixture();
        let owner = UserId::new();
        let studio = space(owner, "Studio");
        f.spaces.insert(studio.clone()).await;

        f.rentals
            .create_series(vec![
                rental(owner, studio.id, date(3, 1), 100.0),
                rental(owner, studio.id, date(1, 15), 50.0),
                rental(owner, studio.id, date(1, 25), 70.0),
            ])
            .await
            .unwrap();

        let rows = f
            .engine
            .revenue_report(&RevenueReportRequest {
                owner_id: owner,
                date_range: DateRange::default(),
                group_by: RevenueGroupBy::Month,
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "2024-01");
        assert_eq!(rows[0].rental_count, 2);
        assert_eq!(rows[0].total_revenue, Money::try_from_f64(120.0).unwrap());
        assert_eq!(rows[1].key, "2024-03");
        assert_eq!(rows[0].space_names, vec!["Studio".to_string()]);
    }

    #[tokio::test]
    async fn test_user_rating_distribution_has_all_buckets() {
        let f = fixture();
        let subject = UserId::new();
        let somewhere = SpaceId::new();

        f.assessments
            .create(assessment(subject, somewhere, 5))
            .await
            .unwrap();
        f.assessments
            .create(assessment(subject, somewhere, 4))
            .await
            .unwrap();
        f.assessments
            .create(assessment(subject, somewhere, 4))
            .await
            .unwrap();

        let rating = f.engine.user_rating(&subject).await.unwrap();
        assert_eq!(rating.total_assessments, 3);
        assert!((rating.average_score - 4.3).abs() < f64::EPSILON);
        assert_eq!(rating.score_distribution[&4], 2);
        assert_eq!(rating.score_distribution[&5], 1);
        assert_eq!(rating.score_distribution[&1], 0);
        assert_eq!(rating.score_distribution.len(), 5);
    }

    #[tokio::test]
    async fn test_user_rating_empty() {
        let f = fixture();
        let rating = f.engine.user_rating(&UserId::new()).await.unwrap();
        assert_eq!(rating, UserRating::empty());
    }

    #[tokio::test]
    async fn test_space_average_score_zero_when_unrated() {
        let f = fixture();
        let space_id = SpaceId::new();
        let score = f.engine.space_average_score(&space_id).await.unwrap();
        assert_eq!(score.average_score, 0.0);
        assert_eq!(score.total_reviews, 0);
    }

    #[tokio::test]
    async fn test_top_rated_spaces_ranked_descending() {
        let f = fixture();
        let owner = UserId::new();
        let good = space(owner, "Good");
        let better = space(owner, "Better");
        let unlisted = SpaceId::new();
        f.spaces.insert(good.clone()).await;
        f.spaces.insert(better.clone()).await;

        f.assessments
            .create(assessment(UserId::new(), good.id, 3))
            .await
            .unwrap();
        f.assessments
            .create(assessment(UserId::new(), better.id, 5))
            .await
            .unwrap();
        // Rated but missing from the directory, dropped from the ranking
        f.assessments
            .create(assessment(UserId::new(), unlisted, 5))
            .await
            .unwrap();

        let ranked = f.engine.top_rated_spaces(None).await.unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].name, "Better");
        assert_eq!(ranked[0].average_score, 5.0);
        assert_eq!(ranked[1].name, "Good");
    }
}
