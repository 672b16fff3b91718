mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseConfig, FfprobeConfig, ServerConfig, StorageConfig,
};
