use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::json::AppJson;
use crate::identity::SESSION_COOKIE;
use crate::models::auth::{
    Credentials, SignInPage, SignInResponse, SignUpResponse, validate_sign_in, validate_sign_up,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/users/sign_up",
    tag = "Auth",
    operation_id = "signUp",
    summary = "Create an account",
    request_body = Credentials,
    responses(
        (status = 201, description = "Account created", body = SignUpResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 409, description = "Username taken (USERNAME_TAKEN)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn sign_up(
    State(state): State<AppState>,
    AppJson(payload): AppJson<Credentials>,
) -> Result<impl IntoResponse, AppError> {
    validate_sign_up(&payload)?;

    let hash = hash::hash_password(&payload.password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {}", e)))?;

    let new_user = user::ActiveModel {
        username: Set(payload.username.trim().to_string()),
        password: Set(hash),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = new_user.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::UsernameTaken,
        _ => AppError::from(e),
    })?;

    tracing::info!(user_id = user.id, "Account created");
    Ok((StatusCode::CREATED, Json(SignUpResponse::from(user))))
}

#[utoipa::path(
    get,
    path = "/users/sign_in",
    tag = "Auth",
    operation_id = "signInPage",
    summary = "Show the sign-in page",
    description = "Target of the redirect issued to anonymous callers of protected gram actions.",
    responses((status = 200, description = "Sign-in page", body = SignInPage)),
)]
pub async fn sign_in_page(State(state): State<AppState>, headers: HeaderMap) -> Json<SignInPage> {
    Json(SignInPage {
        page: "sign_in",
        signed_in_as: state
            .identity
            .current_identity(&headers)
            .map(|identity| identity.username),
    })
}

#[utoipa::path(
    post,
    path = "/users/sign_in",
    tag = "Auth",
    operation_id = "signIn",
    summary = "Sign in",
    description = "Verifies the credentials and starts a session: the token is returned in the \
        body and set as the HttpOnly `session` cookie.",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed in", body = SignInResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong username or password (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<Credentials>,
) -> Result<(CookieJar, Json<SignInResponse>), AppError> {
    validate_sign_in(&payload)?;

    let Some(user) = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.trim()))
        .one(&state.db)
        .await?
    else {
        hash::verify_unknown_user(&payload.password);
        return Err(AppError::InvalidCredentials);
    };

    let is_valid = hash::verify_password(&payload.password, &user.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let auth = &state.config.auth;
    let token = jwt::sign(user.id, &user.username, &auth.jwt_secret, auth.session_ttl_days)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(auth.session_ttl_days));

    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            token,
            id: user.id,
            username: user.username,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/users/sign_out",
    tag = "Auth",
    operation_id = "signOut",
    summary = "Sign out",
    description = "Clears the session cookie and redirects home.",
    responses((status = 303, description = "Redirect to the home page")),
)]
pub async fn sign_out(jar: CookieJar) -> (CookieJar, Redirect) {
    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Redirect::to("/"),
    )
}
