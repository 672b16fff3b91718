use crate::db::models::Video;
use crate::db::schema::videos;
use crate::db::DbPool;
use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("video {0} not found")]
    NotFound(Uuid),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

/// System of record for video metadata, keyed by video id.
#[async_trait]
pub trait VideoStore: Send + Sync {
    async fn get_video(&self, id: Uuid) -> Result<Video, StoreError>;

    /// Persists the mutable fields of `video` in a single write.
    async fn update_video(&self, video: &Video) -> Result<(), StoreError>;
}

pub struct PgVideoStore {
    pool: DbPool,
}

impl PgVideoStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoStore for PgVideoStore {
    async fn get_video(&self, id: Uuid) -> Result<Video, StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        videos::table
            .find(id)
            .select(Video::as_select())
            .first(conn)
            .await
            .optional()?
            .ok_or(StoreError::NotFound(id))
    }

    async fn update_video(&self, video: &Video) -> Result<(), StoreError> {
        let conn = &mut self
            .pool
            .get()
            .await
            .map_err(|e| StoreError::Pool(e.to_string()))?;

        let updated = diesel::update(videos::table.find(video.id))
            .set((
                videos::title.eq(&video.title),
                videos::description.eq(&video.description),
                videos::thumbnail_url.eq(&video.thumbnail_url),
                videos::video_url.eq(&video.video_url),
                videos::updated_at.eq(chrono::Utc::now().naive_utc()),
            ))
            .execute(conn)
            .await?;

        if updated == 0 {
            return Err(StoreError::NotFound(video.id));
        }

        Ok(())
    }
}
