//! Derived-metric handlers

use crate::{
    api::types::{OwnerMetricsQuery, RevenueReportQuery, TopRatedQuery},
    error::Result,
    server::AppState,
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use spazio_metrics::aggregation::{
    OwnerMetrics, OwnerMetricsRequest, RevenueReportRequest, RevenueRow, SpaceScore, TopRatedSpace,
    UserRating,
};
use spazio_metrics::domain::types::{DateRange, SpaceId, UserId};

pub async fn owner_metrics(
    State(state): State<AppState>,
    Path(owner_id): Path<UserId>,
    Query(query): Query<OwnerMetricsQuery>,
) -> Result<Json<OwnerMetrics>> {
    let request = OwnerMetricsRequest {
        owner_id,
        date_range: DateRange::new(query.start_date, query.end_date),
        space_id: query.space_id,
    };
    let metrics = state.facade.get_owner_metrics(request).await?;
    Ok(Json(metrics))
}

pub async fn revenue_report(
    State(state): State<AppState>,
    Path(owner_id): Path<UserId>,
    Query(query): Query<RevenueReportQuery>,
) -> Result<Json<Vec<RevenueRow>>> {
    let request = RevenueReportRequest {
        owner_id,
        date_range: DateRange::new(query.start_date, query.end_date),
        group_by: query.group_by.unwrap_or_default(),
    };
    let report = state.facade.get_revenue_report(request).await?;
    Ok(Json(report))
}

pub async fn top_rated_spaces(
    State(state): State<AppState>,
    Query(query): Query<TopRatedQuery>,
) -> Result<Json<Vec<TopRatedSpace>>> {
    let ranking = state.facade.get_top_rated_spaces(query.limit).await?;
    Ok(Json(ranking))
}

pub async fn space_average_score(
    State(state): State<AppState>,
    Path(space_id): Path<SpaceId>,
) -> Result<Json<SpaceScore>> {
    let score = state.facade.get_average_score_by_space(&space_id).await?;
    Ok(Json(score))
}

pub async fn user_rating(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserRating>> {
    let rating = state.facade.get_user_rating(&user_id).await?;
    Ok(Json(rating))
}
