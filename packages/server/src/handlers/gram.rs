use axum::Json;
use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use common::storage::{PictureKey, PictureStore};
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::gram;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::path::GramId;
use crate::extractors::upload::GramUpload;
use crate::identity::Identity;
use crate::models::gram::{
    FormKind, FormPage, GramDraft, GramListResponse, GramParams, GramResponse,
};
use crate::state::AppState;
use crate::{policy, store};

/// Where successful create/update/destroy requests are sent.
pub const HOME_PATH: &str = "/";

/// Room for the message and multipart framing on top of the picture itself.
const FORM_OVERHEAD: u64 = 64 * 1024;

pub fn picture_upload_body_limit(max_picture_size: u64) -> DefaultBodyLimit {
    let limit = max_picture_size.saturating_add(FORM_OVERHEAD);
    DefaultBodyLimit::max(usize::try_from(limit).unwrap_or(usize::MAX))
}

#[utoipa::path(
    get,
    path = "/grams",
    tag = "Grams",
    operation_id = "listGrams",
    summary = "List all grams",
    description = "Returns every gram, newest first. Also served at `/` as the home page.",
    responses((status = 200, description = "All grams", body = GramListResponse)),
)]
#[instrument(skip(state))]
pub async fn list_grams(State(state): State<AppState>) -> Result<Json<GramListResponse>, AppError> {
    let grams: Vec<GramResponse> = store::list(&state.db)
        .await?
        .into_iter()
        .map(GramResponse::from)
        .collect();
    let total = grams.len() as u64;

    Ok(Json(GramListResponse { grams, total }))
}

#[utoipa::path(
    get,
    path = "/grams/new",
    tag = "Grams",
    operation_id = "newGram",
    summary = "Show the blank gram form",
    responses(
        (status = 200, description = "Blank form", body = FormPage),
        (status = 303, description = "Not signed in; redirect to the sign-in page"),
    ),
    security(("session" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn new_gram(auth_user: AuthUser) -> Json<FormPage> {
    Json(GramDraft::new(GramParams::default()).form(FormKind::New, Vec::new()))
}

#[utoipa::path(
    post,
    path = "/grams",
    tag = "Grams",
    operation_id = "createGram",
    summary = "Create a gram",
    description = "Creates a gram owned by the caller from a `message` text field and a `picture` \
        file field. Other fields are ignored. On success redirects home; on invalid input the new \
        form is re-rendered with the submitted values and errors.",
    request_body(content_type = "multipart/form-data", description = "`message` and `picture` fields"),
    responses(
        (status = 303, description = "Created, redirect home; or not signed in, redirect to sign-in"),
        (status = 400, description = "Malformed multipart body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 422, description = "Invalid gram; new form re-rendered", body = FormPage),
    ),
    security(("session" = [])),
)]
#[instrument(skip(auth_user, state, upload), fields(user_id = auth_user.user_id))]
pub async fn create_gram(
    auth_user: AuthUser,
    State(state): State<AppState>,
    upload: GramUpload,
) -> Result<Response, AppError> {
    let params = upload.read(state.config.storage.max_picture_size).await?;

    let valid = match GramDraft::new(params).validate() {
        Ok(valid) => valid,
        Err(rejected) => {
            tracing::debug!(errors = ?rejected.errors, "Rejected new gram");
            return Ok(unprocessable(rejected.draft.form(FormKind::New, rejected.errors)));
        }
    };

    // Bytes land before the row. A failed insert leaves an unreferenced
    // picture behind; keys are content hashes, so a retry reuses it.
    let record = valid.store_picture(&*state.pictures).await?;
    let gram = store::create(&state.db, auth_user.user_id, record).await?;
    tracing::info!(gram_id = gram.id, "Gram created");

    Ok(Redirect::to(HOME_PATH).into_response())
}

#[utoipa::path(
    get,
    path = "/grams/{id}",
    tag = "Grams",
    operation_id = "showGram",
    summary = "Show a gram",
    params(("id" = String, Path, description = "Gram ID")),
    responses(
        (status = 200, description = "The gram", body = GramResponse),
        (status = 404, description = "No such gram (plain-text body)"),
    ),
)]
#[instrument(skip(state))]
pub async fn show_gram(
    State(state): State<AppState>,
    GramId(id): GramId,
) -> Result<Json<GramResponse>, AppError> {
    let gram = find_gram(&state, id).await?;
    Ok(Json(gram.into()))
}

#[utoipa::path(
    get,
    path = "/grams/{id}/edit",
    tag = "Grams",
    operation_id = "editGram",
    summary = "Show the edit form for a gram",
    params(("id" = String, Path, description = "Gram ID")),
    responses(
        (status = 200, description = "Edit form with the stored values", body = FormPage),
        (status = 303, description = "Not signed in; redirect to the sign-in page"),
        (status = 403, description = "Caller does not own the gram (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "No such gram (plain-text body)"),
    ),
    security(("session" = [])),
)]
#[instrument(skip(auth_user, state), fields(user_id = auth_user.user_id))]
pub async fn edit_gram(
    auth_user: AuthUser,
    State(state): State<AppState>,
    GramId(id): GramId,
) -> Result<Json<FormPage>, AppError> {
    let gram = find_gram(&state, id).await?;
    require_owner(&auth_user, &gram)?;

    Ok(Json(
        GramDraft::edit(&gram, GramParams::default()).form(FormKind::Edit, Vec::new()),
    ))
}

#[utoipa::path(
    patch,
    path = "/grams/{id}",
    tag = "Grams",
    operation_id = "updateGram",
    summary = "Update a gram",
    description = "Changes the message and/or picture of a gram the caller owns. Fields left out \
        keep their stored values. On invalid input nothing is saved and the edit form is \
        re-rendered.",
    params(("id" = String, Path, description = "Gram ID")),
    request_body(content_type = "multipart/form-data", description = "Optional `message` and `picture` fields"),
    responses(
        (status = 303, description = "Updated, redirect home; or not signed in, redirect to sign-in"),
        (status = 400, description = "Malformed multipart body (VALIDATION_ERROR)", body = ErrorBody),
        (status = 403, description = "Caller does not own the gram (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "No such gram (plain-text body)"),
        (status = 422, description = "Invalid gram; edit form re-rendered", body = FormPage),
    ),
    security(("session" = [])),
)]
#[instrument(skip(auth_user, state, upload), fields(user_id = auth_user.user_id))]
pub async fn update_gram(
    auth_user: AuthUser,
    State(state): State<AppState>,
    GramId(id): GramId,
    upload: GramUpload,
) -> Result<Response, AppError> {
    let gram = find_gram(&state, id).await?;
    require_owner(&auth_user, &gram)?;

    let params = upload.read(state.config.storage.max_picture_size).await?;
    let valid = match GramDraft::edit(&gram, params).validate() {
        Ok(valid) => valid,
        Err(rejected) => {
            tracing::debug!(gram_id = gram.id, errors = ?rejected.errors, "Rejected gram update");
            return Ok(unprocessable(rejected.draft.form(FormKind::Edit, rejected.errors)));
        }
    };

    // Same ordering as create: an aborted update can orphan new bytes only.
    let record = valid.store_picture(&*state.pictures).await?;
    let gram = store::update(&state.db, gram, record).await?;
    tracing::info!(gram_id = gram.id, "Gram updated");

    Ok(Redirect::to(HOME_PATH).into_response())
}

#[utoipa::path(
    delete,
    path = "/grams/{id}",
    tag = "Grams",
    operation_id = "destroyGram",
    summary = "Delete a gram",
    description = "Permanently deletes a gram the caller owns. The picture bytes stay in storage, \
        since other grams may share them.",
    params(("id" = String, Path, description = "Gram ID")),
    responses(
        (status = 303, description = "Deleted, redirect home; or not signed in, redirect to sign-in"),
        (status = 403, description = "Caller does not own the gram (FORBIDDEN)", body = ErrorBody),
        (status = 404, description = "No such gram (plain-text body)"),
    ),
    security(("session" = [])),
)]
#[instrument(skip(auth_user, state), fields(user_id = auth_user.user_id))]
pub async fn destroy_gram(
    auth_user: AuthUser,
    State(state): State<AppState>,
    GramId(id): GramId,
) -> Result<Redirect, AppError> {
    let gram = find_gram(&state, id).await?;
    require_owner(&auth_user, &gram)?;

    if store::delete(&state.db, gram.id).await? {
        tracing::info!(gram_id = gram.id, "Gram deleted");
    }

    Ok(Redirect::to(HOME_PATH))
}

#[utoipa::path(
    get,
    path = "/grams/{id}/picture",
    tag = "Grams",
    operation_id = "showGramPicture",
    summary = "Download a gram's picture",
    description = "Streams the picture bytes. Supports ETag-based caching via If-None-Match.",
    params(("id" = String, Path, description = "Gram ID")),
    responses(
        (status = 200, description = "Picture content"),
        (status = 304, description = "Not Modified (ETag match)"),
        (status = 404, description = "No such gram (plain-text body)"),
    ),
)]
#[instrument(skip(state, headers))]
pub async fn show_picture(
    State(state): State<AppState>,
    GramId(id): GramId,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let gram = find_gram(&state, id).await?;
    picture_response(&gram, &headers, &*state.pictures).await
}

async fn find_gram(state: &AppState, id: i32) -> Result<gram::Model, AppError> {
    store::find_by_id(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)
}

fn require_owner(identity: &Identity, gram: &gram::Model) -> Result<(), AppError> {
    if policy::can_modify(identity, gram) {
        Ok(())
    } else {
        tracing::warn!(
            gram_id = gram.id,
            owner_id = gram.user_id,
            "Refused change by non-owner"
        );
        Err(AppError::Forbidden)
    }
}

fn unprocessable(page: FormPage) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response()
}

async fn picture_response(
    gram: &gram::Model,
    headers: &HeaderMap,
    pictures: &dyn PictureStore,
) -> Result<Response, AppError> {
    let etag_value = format!("\"{}\"", gram.picture_hash);
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && let Ok(val) = if_none_match.to_str()
        && (val == etag_value || val == "*")
    {
        return Ok(StatusCode::NOT_MODIFIED.into_response());
    }

    let key: PictureKey = gram.picture_hash.parse()?;
    let size = pictures.size(&key).await?;
    let reader = pictures.open(&key).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, &gram.picture_content_type)
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::ETAG, &etag_value)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
