use std::ops::Deref;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::identity::Identity;
use crate::state::AppState;

/// The signed-in caller, resolved through the state's identity provider.
///
/// Add this as the first handler parameter to require authentication; an
/// anonymous request is redirected to the sign-in page before any other
/// extractor or check runs.
pub struct AuthUser(pub Identity);

impl Deref for AuthUser {
    type Target = Identity;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        state
            .identity
            .current_identity(&parts.headers)
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthenticated {
                sign_in: state.identity.sign_in_path().to_owned(),
            })
    }
}
