use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use crate::error::AppError;

/// The `{id}` segment of a `/grams/{id}` route.
///
/// A segment that fails to percent-decode or is not an integer cannot name a
/// gram, so it is rejected as `NotFound` like any other missing id. Put this
/// after [`AuthUser`](super::auth::AuthUser) so sign-in is still checked first.
pub struct GramId(pub i32);

impl<S> FromRequestParts<S> for GramId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                tracing::debug!("Unreadable gram id: {}", rejection.body_text());
                AppError::NotFound
            })?;

        raw.parse().map(GramId).map_err(|_| AppError::NotFound)
    }
}
