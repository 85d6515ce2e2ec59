use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// Account credentials, used for both sign-up and sign-in.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct Credentials {
    /// 1-32 chars, letters, digits and underscores.
    #[schema(example = "alice_wonder")]
    pub username: String,
    /// 8-128 characters.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_sign_up(payload: &Credentials) -> Result<(), AppError> {
    let username = payload.username.trim();
    if username.is_empty() || username.chars().count() > 32 {
        return Err(AppError::Validation(
            "Username must be 1-32 characters".into(),
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(AppError::Validation(
            "Username must contain only letters, digits, and underscores".into(),
        ));
    }
    if payload.password.len() < 8 || payload.password.len() > 128 {
        return Err(AppError::Validation(
            "Password must be 8-128 characters".into(),
        ));
    }
    Ok(())
}

pub fn validate_sign_in(payload: &Credentials) -> Result<(), AppError> {
    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password must not be empty".into(),
        ));
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SignUpResponse {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
}

impl From<crate::entity::user::Model> for SignUpResponse {
    fn from(user: crate::entity::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

/// Successful sign-in. The token is also set as the `session` cookie.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SignInResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub token: String,
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "alice_wonder")]
    pub username: String,
}

/// What the sign-in page shows.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SignInPage {
    #[schema(example = "sign_in")]
    pub page: &'static str,
    /// Username of the current session, if already signed in.
    pub signed_in_as: Option<String>,
}
