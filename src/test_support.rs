//! In-memory collaborators and request builders for handler tests.

use crate::auth::{AuthError, TOKEN_ISSUER};
use crate::config::{
    AppConfig, AuthConfig, DatabaseConfig, FfprobeConfig, ServerConfig, StorageConfig,
};
use crate::db::models::Video;
use crate::db::{StoreError, VideoStore};
use crate::services::aspect_ratio::{parse_probe_output, MediaProber, ProbeError, ProbeOutput};
use crate::services::object_storage::{ObjectStorage, StorageError};
use crate::state::AppState;
use actix_web::web;
use async_trait::async_trait;
use chrono::{TimeDelta, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const JWT_SECRET: &str = "handler-test-secret";
pub const BUCKET: &str = "tubely-test";
pub const REGION: &str = "us-east-2";
pub const PORT: u16 = 8091;
pub const BOUNDARY: &str = "tubely-test-boundary";

pub fn test_config(assets_root: &Path) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            port: PORT,
            ..ServerConfig::default()
        },
        auth: AuthConfig {
            jwt_secret: JWT_SECRET.to_string(),
        },
        database: DatabaseConfig::default(),
        storage: StorageConfig {
            assets_root: assets_root.to_path_buf(),
            s3_bucket: BUCKET.to_string(),
            s3_region: REGION.to_string(),
            ..StorageConfig::default()
        },
        ffprobe: FfprobeConfig::default(),
    }
}

pub fn app_state(
    config: AppConfig,
    videos: Arc<InMemoryVideoStore>,
    storage: Arc<RecordingStorage>,
    prober: Arc<StaticProber>,
) -> web::Data<AppState> {
    web::Data::new(AppState {
        config,
        videos,
        storage,
        prober,
    })
}

pub fn video_owned_by(user_id: Uuid) -> Video {
    let now = Utc::now().naive_utc();
    Video {
        id: Uuid::new_v4(),
        title: "Boots on the ground".to_string(),
        description: Some("A walk through the data center".to_string()),
        thumbnail_url: None,
        video_url: None,
        user_id,
        created_at: now,
        updated_at: now,
    }
}

/// Issues an HS256 access token accepted by `validate_jwt`.
pub fn make_jwt(user_id: Uuid, secret: &str, expires_in: TimeDelta) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = serde_json::json!({
        "iss": TOKEN_ISSUER,
        "sub": user_id.to_string(),
        "iat": now.timestamp(),
        "exp": (now + expires_in).timestamp(),
    });

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

pub fn bearer(user_id: Uuid) -> String {
    let token = make_jwt(user_id, JWT_SECRET, TimeDelta::hours(1)).unwrap();
    format!("Bearer {}", token)
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}

pub struct FormPart<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub content_type: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> FormPart<'a> {
    pub fn text(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: None,
            content_type: None,
            data,
        }
    }

    pub fn file(
        name: &'a str,
        filename: &'a str,
        content_type: Option<&'a str>,
        data: &'a [u8],
    ) -> Self {
        Self {
            name,
            filename: Some(filename),
            content_type,
            data,
        }
    }
}

pub fn multipart_form(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        let mut disposition = format!("Content-Disposition: form-data; name=\"{}\"", part.name);
        if let Some(filename) = part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", filename));
        }
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(b"\r\n");
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Single-file multipart body. `content_type` of `None` omits the part header.
pub fn multipart_body(
    field: &str,
    filename: &str,
    content_type: Option<&str>,
    data: &[u8],
) -> Vec<u8> {
    multipart_form(&[FormPart::file(field, filename, content_type, data)])
}

#[derive(Default)]
pub struct InMemoryVideoStore {
    videos: Mutex<HashMap<Uuid, Video>>,
    reject_updates: bool,
    updates: AtomicUsize,
}

impl InMemoryVideoStore {
    pub fn with(videos: Vec<Video>) -> Self {
        Self {
            videos: Mutex::new(videos.into_iter().map(|v| (v.id, v)).collect()),
            ..Self::default()
        }
    }

    pub fn rejecting_updates(videos: Vec<Video>) -> Self {
        Self {
            reject_updates: true,
            ..Self::with(videos)
        }
    }

    pub fn stored(&self, id: Uuid) -> Option<Video> {
        self.videos.lock().unwrap().get(&id).cloned()
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VideoStore for InMemoryVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Video, StoreError> {
        self.stored(id).ok_or(StoreError::NotFound(id))
    }

    async fn update_video(&self, video: &Video) -> Result<(), StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.reject_updates {
            return Err(StoreError::Database(diesel::result::Error::RollbackTransaction));
        }

        let mut videos = self.videos.lock().unwrap();
        match videos.get_mut(&video.id) {
            Some(stored) => {
                *stored = video.clone();
                Ok(())
            }
            None => Err(StoreError::NotFound(video.id)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

#[derive(Default)]
pub struct RecordingStorage {
    objects: Mutex<Vec<StoredObject>>,
    fail: bool,
}

impl RecordingStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn objects(&self) -> Vec<StoredObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn put_object(
        &self,
        key: &str,
        body: &Path,
        content_type: &str,
    ) -> Result<(), StorageError> {
        if self.fail {
            return Err(StorageError::Put("bucket unavailable".to_string()));
        }

        let body = tokio::fs::read(body)
            .await
            .map_err(|e| StorageError::Body(e.to_string()))?;

        self.objects.lock().unwrap().push(StoredObject {
            key: key.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        Ok(())
    }
}

/// Answers every probe with a fixed ffprobe stdout and remembers the paths it saw.
pub struct StaticProber {
    stdout: String,
    probed: Mutex<Vec<PathBuf>>,
}

impl StaticProber {
    pub fn from_json(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            probed: Mutex::new(Vec::new()),
        }
    }

    pub fn dimensions(width: u32, height: u32) -> Self {
        Self::from_json(&format!(
            r#"{{"streams":[{{"codec_type":"video","width":{},"height":{}}}]}}"#,
            width, height
        ))
    }

    pub fn probed(&self) -> Vec<PathBuf> {
        self.probed.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaProber for StaticProber {
    async fn probe(&self, path: &Path) -> Result<ProbeOutput, ProbeError> {
        self.probed.lock().unwrap().push(path.to_path_buf());
        parse_probe_output(self.stdout.as_bytes())
    }
}
