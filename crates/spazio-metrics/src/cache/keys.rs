//! Cache key construction
//!
//! Every cached read derives its key here so the invalidation patterns in
//! [`crate::cache::coherence`] stay in lockstep with the keys they must
//! cover. Keys embed every parameter that changes the result; absent
//! optional parameters are encoded as fixed placeholders so the key shape
//! is stable.

use crate::aggregation::{OwnerMetricsRequest, RevenueGroupBy, RevenueReportRequest};
use crate::domain::types::{DateRange, EvaluationType, SpaceId, UserId};
use crate::ledger::{PageRequest, RentalFilter, RentalSort, RentalSortField, SortOrder};
use chrono::NaiveDate;

fn date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "any".to_string(), |d| d.to_string())
}

fn range(range: &DateRange) -> String {
    format!("{}_{}", date(range.start), date(range.end))
}

fn sort(sort: RentalSort) -> String {
    let field = match sort.field {
        RentalSortField::StartDate => "start_date",
        RentalSortField::EndDate => "end_date",
        RentalSortField::Value => "value",
        RentalSortField::CreatedAt => "created_at",
    };
    let order = match sort.order {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    };
    format!("{field}_{order}")
}

fn page(page: PageRequest) -> String {
    format!("page_{}_limit_{}", page.page, page.limit)
}

pub fn owner_metrics(request: &OwnerMetricsRequest) -> String {
    let space = request
        .space_id
        .map_or_else(|| "all".to_string(), |id| id.to_string());
    format!(
        "owner_metrics_{}_{}_{}",
        request.owner_id,
        range(&request.date_range),
        space
    )
}

pub fn owner_metrics_pattern(owner_id: &UserId) -> String {
    format!("owner_metrics_{owner_id}_*")
}

/// Key for an owner's filtered rental listing. The owner id leads so one
/// pattern can clear every variant an owner may have cached.
pub fn rentals_filtered(
    owner_id: &UserId,
    filter: &RentalFilter,
    sort_by: RentalSort,
    page_request: PageRequest,
) -> String {
    let tenant = filter
        .tenant_id
        .map_or_else(|| "any".to_string(), |id| id.to_string());
    let space = filter
        .space_id
        .map_or_else(|| "any".to_string(), |id| id.to_string());
    format!(
        "rentals_filtered_{}_{}_{}_{}_{}_{}",
        owner_id,
        tenant,
        space,
        range(&filter.date_range),
        sort(sort_by),
        page(page_request)
    )
}

pub fn rentals_filtered_pattern(owner_id: &UserId) -> String {
    format!("rentals_filtered_{owner_id}_*")
}

pub fn revenue_report(request: &RevenueReportRequest) -> String {
    let group = match request.group_by {
        RevenueGroupBy::Month => "month",
        RevenueGroupBy::Space => "space",
    };
    format!(
        "revenue_report_{}_{}_{}",
        request.owner_id,
        range(&request.date_range),
        group
    )
}

pub fn revenue_report_pattern(owner_id: &UserId) -> String {
    format!("revenue_report_{owner_id}_*")
}

pub fn assessments_space(space_id: &SpaceId) -> String {
    format!("assessments_space_{space_id}")
}

pub fn user_assessments(
    user_id: &UserId,
    evaluation_type: Option<EvaluationType>,
    page_request: PageRequest,
) -> String {
    let kind = evaluation_type.map_or("all", |t| t.as_str());
    format!(
        "user_assessments_{}_{}_{}",
        user_id,
        kind,
        page(page_request)
    )
}

pub fn user_assessments_pattern(user_id: &UserId) -> String {
    format!("user_assessments_{user_id}_*")
}

pub fn user_rating(user_id: &UserId) -> String {
    format!("user_rating_{user_id}")
}

pub fn average_score(space_id: &SpaceId) -> String {
    format!("average_score_{space_id}")
}

pub fn top_rated_spaces(limit: usize) -> String {
    format!("top_rated_spaces_{limit}")
}

pub fn top_rated_spaces_pattern() -> String {
    "top_rated_spaces_*".to_string()
}

pub fn all_assessments(page_request: PageRequest) -> String {
    format!("all_assessments_{}", page(page_request))
}

pub fn all_assessments_pattern() -> String {
    "all_assessments_*".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::glob_to_regex;

    #[test]
    fn test_keys_are_deterministic() {
        let owner = UserId::new();
        let request = OwnerMetricsRequest {
            owner_id: owner,
            date_range: DateRange::default(),
            space_id: None,
        };
        assert_eq!(owner_metrics(&request), owner_metrics(&request));
        assert_eq!(
            owner_metrics(&request),
            format!("owner_metrics_{owner}_any_any_all")
        );
    }

    #[test]
    fn test_patterns_cover_their_keys() {
        let owner = UserId::new();
        let user = UserId::new();
        let page = PageRequest::new(2, 10);

        let cases = [
            (
                rentals_filtered(&owner, &RentalFilter::for_owner(owner), RentalSort::default(), page),
                rentals_filtered_pattern(&owner),
            ),
            (
                user_assessments(&user, Some(EvaluationType::UserToUser), page),
                user_assessments_pattern(&user),
            ),
            (top_rated_spaces(25), top_rated_spaces_pattern()),
            (all_assessments(page), all_assessments_pattern()),
        ];
        for (key, pattern) in cases {
            let regex = glob_to_regex(&pattern).unwrap();
            assert!(regex.is_match(&key), "{pattern} should match {key}");
        }
    }

    #[test]
    fn test_pattern_does_not_cross_users() {
        let a = UserId::new();
        let b = UserId::new();
        let regex = glob_to_regex(&user_assessments_pattern(&a)).unwrap();
        assert!(!regex.is_match(&user_assessments(&b, None, PageRequest::new(1, 10))));
    }
}
