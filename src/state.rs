use crate::config::AppConfig;
use crate::db::VideoStore;
use crate::services::aspect_ratio::MediaProber;
use crate::services::object_storage::ObjectStorage;
use std::sync::Arc;

/// Built once at startup and shared with every handler through `web::Data`.
pub struct AppState {
    pub config: AppConfig,
    pub videos: Arc<dyn VideoStore>,
    pub storage: Arc<dyn ObjectStorage>,
    pub prober: Arc<dyn MediaProber>,
}
