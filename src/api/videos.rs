use crate::api::shared::ApiError;
use crate::api::upload;
use crate::services::{aspect_ratio, keys};
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};

const VIDEO_MP4: &str = "video/mp4";

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/video_upload/{video_id}", web::post().to(upload_video));
}

/// POST /api/video_upload/{video_id}
///
/// Buffers the `video` form file to a temporary file, classifies its aspect
/// ratio, stores it under `{classification}/{hex}.mp4` and records the
/// object URL on the video.
pub async fn upload_video(
    req: HttpRequest,
    path: web::Path<String>,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video_id = upload::parse_video_id(&path)?;
    let user_id = upload::authenticate(&req, &state.config.auth.jwt_secret)?;
    let mut video = upload::owned_video(state.videos.as_ref(), video_id, user_id).await?;

    let mut limit = upload::BodyLimit::new(state.config.storage.max_video_size);
    let mut field = upload::file_field(&mut payload, "video", &mut limit).await?;
    let media_type = upload::media_type(&field)?;
    if media_type != VIDEO_MP4 {
        log::warn!("Rejected video upload with media type {}", media_type);
        return Err(ApiError::bad_request(
            "Wrong media type. Video files must be .mp4",
        ));
    }

    // Removed when dropped, on every return path below.
    let temp_file = tempfile::Builder::new()
        .prefix("tubely-upload")
        .suffix(".mp4")
        .tempfile()
        .map_err(|e| {
            log::error!("Failed to create temp file: {}", e);
            ApiError::internal("Couldn't create temp file")
        })?;

    let handle = temp_file.reopen().map_err(|e| {
        log::error!("Failed to open temp file {:?}: {}", temp_file.path(), e);
        ApiError::internal("Couldn't create temp file")
    })?;
    let mut out = tokio::fs::File::from_std(handle);
    let size = upload::copy_field(&mut field, &mut out, &mut limit).await?;
    drop(out);

    let classification = aspect_ratio::aspect_ratio(state.prober.as_ref(), temp_file.path())
        .await
        .map_err(|e| {
            log::error!("Failed to classify video {}: {}", video_id, e);
            ApiError::internal("Couldn't get video's aspect ratio")
        })?;

    let key = keys::video_key(classification);
    state
        .storage
        .put_object(&key, temp_file.path(), &media_type)
        .await
        .map_err(|e| {
            log::error!("Failed to store video {} as {}: {}", video_id, key, e);
            ApiError::internal("Couldn't put object into s3")
        })?;

    video.video_url = Some(state.config.storage.object_url(&key));
    state.videos.update_video(&video).await.map_err(|e| {
        log::error!("Failed to update video {}: {}", video_id, e);
        ApiError::UpdateRejected("Error updating video metadata".to_string())
    })?;

    log::info!(
        "Stored video {} for user {} as {} ({} bytes)",
        video_id,
        user_id,
        key,
        size
    );

    Ok(HttpResponse::Ok().json(video))
}
