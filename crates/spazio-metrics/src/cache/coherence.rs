//! Invalidation policy
//!
//! Maps each write to the fixed set of cached reads it can stale. The sets
//! are intentionally wider than strictly necessary (patterns clear every
//! parameter variant); an over-invalidation costs one recomputation, a
//! missed one serves stale data for a full TTL.

use crate::cache::keys;
use crate::domain::types::{SpaceId, UserId};

/// A single cache eviction: either one exact key or every key matching a
/// glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    Key(String),
    Pattern(String),
}

/// Write-to-eviction mapping. Stateless; exists as a type so the tables are
/// one greppable place.
pub struct CoherencePolicy;

impl CoherencePolicy {
    /// Evictions after an assessment is created, updated or deleted.
    ///
    /// Touches every derived read that folds over assessments: the space's
    /// listing and average, the subject's rating and listings, and the
    /// global ranking and admin listing.
    pub fn assessment_mutated(space_id: &SpaceId, subject_user_id: &UserId) -> Vec<Invalidation> {
        vec![
            Invalidation::Key(keys::assessments_space(space_id)),
            Invalidation::Key(keys::average_score(space_id)),
            Invalidation::Key(keys::user_rating(subject_user_id)),
            Invalidation::Pattern(keys::user_assessments_pattern(subject_user_id)),
            Invalidation::Pattern(keys::top_rated_spaces_pattern()),
            Invalidation::Pattern(keys::all_assessments_pattern()),
        ]
    }

    /// Evictions after rentals are created for an owner's space.
    ///
    /// Owner metrics, filtered listings and revenue reports all embed query
    /// parameters in their keys, so each is cleared by pattern.
    pub fn rental_mutated(owner_id: &UserId) -> Vec<Invalidation> {
        vec![
            Invalidation::Pattern(keys::owner_metrics_pattern(owner_id)),
            Invalidation::Pattern(keys::rentals_filtered_pattern(owner_id)),
            Invalidation::Pattern(keys::revenue_report_pattern(owner_id)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregation::OwnerMetricsRequest;
    use crate::cache::store::glob_to_regex;
    use crate::domain::types::DateRange;

    fn covers(invalidations: &[Invalidation], key: &str) -> bool {
        invalidations.iter().any(|inv| match inv {
            Invalidation::Key(k) => k == key,
            Invalidation::Pattern(p) => glob_to_regex(p).unwrap().is_match(key),
        })
    }

    #[test]
    fn test_assessment_mutation_covers_derived_reads() {
        let space = SpaceId::new();
        let subject = UserId::new();
        let invalidations = CoherencePolicy::assessment_mutated(&space, &subject);

        assert!(covers(&invalidations, &keys::assessments_space(&space)));
        assert!(covers(&invalidations, &keys::average_score(&space)));
        assert!(covers(&invalidations, &keys::user_rating(&subject)));
        assert!(covers(&invalidations, &keys::top_rated_spaces(25)));
        assert!(covers(&invalidations, &keys::top_rated_spaces(10)));
    }

    #[test]
    fn test_assessment_mutation_leaves_other_users_alone() {
        let invalidations = CoherencePolicy::assessment_mutated(&SpaceId::new(), &UserId::new());
        let other = UserId::new();
        assert!(!covers(&invalidations, &keys::user_rating(&other)));
    }

    #[test]
    fn test_rental_mutation_covers_owner_aggregates() {
        let owner = UserId::new();
        let invalidations = CoherencePolicy::rental_mutated(&owner);
        let request = OwnerMetricsRequest {
            owner_id: owner,
            date_range: DateRange::default(),
            space_id: None,
        };
        assert!(covers(&invalidations, &keys::owner_metrics(&request)));

        let other = OwnerMetricsRequest {
            owner_id: UserId::new(),
            ..request
        };
        assert!(!covers(&invalidations, &keys::owner_metrics(&other)));
    }
}
