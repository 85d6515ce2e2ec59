//! Resolution of the signed-in caller for a request.
//!
//! Handlers never look at cookies or headers themselves; they ask the
//! [`IdentityProvider`] held in the application state, through the
//! extractors in [`crate::extractors::auth`].

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::CookieJar;

use crate::utils::jwt;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "session";

/// Where anonymous callers of protected actions are sent.
pub const SIGN_IN_PATH: &str = "/users/sign_in";

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
}

pub trait IdentityProvider: Send + Sync {
    /// The caller behind these request headers, or `None` for anonymous.
    fn current_identity(&self, headers: &HeaderMap) -> Option<Identity>;

    /// Redirect target for anonymous access to a protected action.
    fn sign_in_path(&self) -> &str {
        SIGN_IN_PATH
    }
}

/// Reads a signed session token from the `session` cookie, falling back to
/// an `Authorization: Bearer` header. Bad or expired tokens are anonymous.
pub struct SessionIdentityProvider {
    secret: String,
}

impl SessionIdentityProvider {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn token<'a>(jar: &'a CookieJar, headers: &'a HeaderMap) -> Option<&'a str> {
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            return Some(cookie.value());
        }
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
    }
}

impl IdentityProvider for SessionIdentityProvider {
    fn current_identity(&self, headers: &HeaderMap) -> Option<Identity> {
        let jar = CookieJar::from_headers(headers);
        let token = Self::token(&jar, headers)?;

        match jwt::verify(token, &self.secret) {
            Ok(claims) => Some(Identity {
                user_id: claims.uid,
                username: claims.sub,
            }),
            Err(e) => {
                tracing::debug!("Ignoring invalid session token: {e}");
                None
            }
        }
    }
}
