//! Stages shared by the upload endpoints: path parsing, authentication,
//! the ownership gate and multipart intake.

use crate::api::shared::ApiError;
use crate::auth;
use crate::db::models::Video;
use crate::db::VideoStore;
use actix_multipart::{Field, Multipart};
use actix_web::HttpRequest;
use futures::TryStreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use uuid::Uuid;

pub fn parse_video_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| {
        log::warn!("Invalid video id {:?}: {}", raw, e);
        ApiError::bad_request("Invalid ID")
    })
}

/// Returns the user id carried by the request's bearer token.
pub fn authenticate(req: &HttpRequest, jwt_secret: &str) -> Result<Uuid, ApiError> {
    let token = auth::get_bearer_token(req.headers()).map_err(|e| {
        log::warn!("Rejected request without bearer token: {}", e);
        ApiError::unauthorized("Couldn't find JWT")
    })?;

    auth::validate_jwt(&token, jwt_secret).map_err(|e| {
        log::warn!("Rejected bearer token: {}", e);
        ApiError::unauthorized("Couldn't validate JWT")
    })
}

/// Loads the video and checks that `user_id` owns it.
pub async fn owned_video(
    store: &dyn VideoStore,
    video_id: Uuid,
    user_id: Uuid,
) -> Result<Video, ApiError> {
    let video = store.get_video(video_id).await.map_err(|e| {
        log::error!("Failed to load video {}: {}", video_id, e);
        ApiError::internal("Unable to get video metadata")
    })?;

    if !video.is_owned_by(user_id) {
        log::warn!("User {} does not own video {}", user_id, video_id);
        return Err(ApiError::unauthorized("Unauthorized: must be video's owner"));
    }

    Ok(video)
}

/// Byte allowance shared by every part of one multipart body.
#[derive(Debug)]
pub struct BodyLimit {
    limit: usize,
    consumed: usize,
}

impl BodyLimit {
    pub fn new(limit: usize) -> Self {
        Self { limit, consumed: 0 }
    }

    fn consume(&mut self, len: usize) -> Result<(), ApiError> {
        self.consumed += len;
        if self.consumed > self.limit {
            log::warn!("Upload body exceeds the {} byte limit", self.limit);
            return Err(ApiError::bad_request(format!(
                "Request body exceeds the maximum size of {} bytes",
                self.limit
            )));
        }
        Ok(())
    }
}

/// Advances the form to the field called `name`, discarding the fields before it.
/// Discarded bytes count against `limit`.
pub async fn file_field(
    payload: &mut Multipart,
    name: &str,
    limit: &mut BodyLimit,
) -> Result<Field, ApiError> {
    loop {
        let field = payload.try_next().await.map_err(|e| {
            log::warn!("Unable to parse multipart form: {}", e);
            ApiError::bad_request("Unable to parse multipart form")
        })?;

        let Some(mut field) = field else {
            return Err(ApiError::bad_request(format!(
                "Missing form file \"{}\"",
                name
            )));
        };

        if field.name() == Some(name) {
            return Ok(field);
        }

        while let Some(chunk) = field.try_next().await.map_err(|e| {
            log::warn!("Unable to parse multipart form: {}", e);
            ApiError::bad_request("Unable to parse multipart form")
        })? {
            limit.consume(chunk.len())?;
        }
    }
}

/// Declared media type of a form part, without parameters.
pub fn media_type(field: &Field) -> Result<String, ApiError> {
    field
        .content_type()
        .map(|mime| mime.essence_str().to_string())
        .ok_or_else(|| ApiError::bad_request("Error parsing media type"))
}

/// Streams a form part into `out`, failing once the body exceeds `limit`.
pub async fn copy_field<W>(
    field: &mut Field,
    out: &mut W,
    limit: &mut BodyLimit,
) -> Result<usize, ApiError>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0usize;

    while let Some(chunk) = field.try_next().await.map_err(|e| {
        log::warn!("Error reading upload chunk: {}", e);
        ApiError::bad_request("Unable to parse form file")
    })? {
        limit.consume(chunk.len())?;
        written += chunk.len();

        out.write_all(&chunk).await.map_err(|e| {
            log::error!("Error writing upload chunk: {}", e);
            ApiError::internal("Couldn't write temp file")
        })?;
    }

    out.flush().await.map_err(|e| {
        log::error!("Error flushing upload: {}", e);
        ApiError::internal("Couldn't write temp file")
    })?;

    Ok(written)
}
