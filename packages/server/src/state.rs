use std::sync::Arc;

use common::storage::PictureStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::identity::IdentityProvider;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub pictures: Arc<dyn PictureStore>,
    pub identity: Arc<dyn IdentityProvider>,
}
