//! Rental booking and listing handlers

use crate::{
    api::types::{CreateRentalBody, ListRentalsQuery},
    error::Result,
    server::AppState,
};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use spazio_metrics::domain::RentalRecord;
use spazio_metrics::facade::{CreatedRentals, RentalListingRequest};
use spazio_metrics::Paginated;
use tracing::info;

/// Book a rental, expanding recurring requests into their full series.
pub async fn create_rental(
    State(state): State<AppState>,
    Json(body): Json<CreateRentalBody>,
) -> Result<(StatusCode, Json<CreatedRentals>)> {
    let booking = body.into_booking()?;
    info!(
        space_id = %booking.space_id,
        recurring = booking.recurrence.is_some(),
        "Creating rental"
    );

    let created = state.facade.create_rental(booking).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// List an owner's rentals, filtered, sorted and paginated.
pub async fn list_rentals(
    State(state): State<AppState>,
    Query(query): Query<ListRentalsQuery>,
) -> Result<Json<Paginated<RentalRecord>>> {
    let request = RentalListingRequest {
        owner_id: query.owner_id,
        tenant_id: query.tenant_id,
        space_id: query.space_id,
        date_range: query.date_range(),
        sort: query.sort(),
        page: query.page,
        limit: query.limit,
    };
    let page = state.facade.get_rentals_filtered(request).await?;
    Ok(Json(page))
}
