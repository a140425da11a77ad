//! API module for the Spazio HTTP service

pub mod extractors;
pub mod routes;
pub mod types;

use crate::server::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        // Rental booking and listing
        .route("/rentals", post(routes::rentals::create_rental))
        .route("/rentals", get(routes::rentals::list_rentals))
        // Owner dashboards
        .route(
            "/owners/:owner_id/metrics",
            get(routes::metrics::owner_metrics),
        )
        .route(
            "/owners/:owner_id/revenue-report",
            get(routes::metrics::revenue_report),
        )
        // Assessments
        .route(
            "/assessments",
            post(routes::assessments::create_assessment),
        )
        .route("/assessments", get(routes::assessments::list_all_assessments))
        .route(
            "/assessments/owner",
            post(routes::assessments::create_owner_assessment),
        )
        .route(
            "/assessments/:assessment_id",
            put(routes::assessments::update_assessment),
        )
        .route(
            "/assessments/:assessment_id",
            delete(routes::assessments::delete_assessment),
        )
        // Space metrics
        .route("/spaces/top-rated", get(routes::metrics::top_rated_spaces))
        .route(
            "/spaces/:space_id/assessments",
            get(routes::assessments::space_assessments),
        )
        .route(
            "/spaces/:space_id/average-score",
            get(routes::metrics::space_average_score),
        )
        // User metrics
        .route(
            "/users/:user_id/assessments",
            get(routes::assessments::user_assessments),
        )
        .route("/users/:user_id/rating", get(routes::metrics::user_rating))
        // Health
        .route("/health", get(routes::health::health_check))
}
