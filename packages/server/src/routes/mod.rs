use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

/// Every route carries its full path in its `#[utoipa::path]` annotation, so
/// the groups are merged rather than nested.
pub fn app_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(gram_routes(config))
        .merge(user_routes())
}

fn gram_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::gram::list_grams,
            handlers::gram::create_gram
        ))
        .routes(routes!(handlers::gram::new_gram))
        .routes(routes!(
            handlers::gram::show_gram,
            handlers::gram::update_gram,
            handlers::gram::destroy_gram
        ))
        .routes(routes!(handlers::gram::edit_gram))
        .routes(routes!(handlers::gram::show_picture))
        .layer(handlers::gram::picture_upload_body_limit(
            config.storage.max_picture_size,
        ))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::sign_up))
        .routes(routes!(
            handlers::auth::sign_in_page,
            handlers::auth::sign_in
        ))
        .routes(routes!(handlers::auth::sign_out))
}
