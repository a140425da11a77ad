//! Request extractors

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use spazio_metrics::domain::types::UserId;
use spazio_metrics::Requester;

/// Caller identity taken from the `x-user-id` and `x-admin` headers.
///
/// Authentication is terminated upstream; by the time a request reaches this
/// service the gateway has resolved the caller and forwards their id.
pub struct RequesterHeader(pub Requester);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for RequesterHeader {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = parts
            .headers
            .get("x-user-id")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::bad_request("Missing x-user-id header"))?;
        let id: UserId = id
            .parse()
            .map_err(|_| ApiError::bad_request("Invalid x-user-id header"))?;

        let is_admin = parts
            .headers
            .get("x-admin")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Ok(Self(if is_admin {
            Requester::admin(id)
        } else {
            Requester::user(id)
        }))
    }
}
