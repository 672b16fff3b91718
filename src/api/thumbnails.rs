use crate::api::shared::ApiError;
use crate::api::upload;
use crate::services::keys;
use crate::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse};
use tokio::io::AsyncWriteExt;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route(
        "/thumbnail_upload/{video_id}",
        web::post().to(upload_thumbnail),
    );
}

fn thumbnail_extension(media_type: &str) -> Option<&'static str> {
    match media_type {
        "image/png" => Some(".png"),
        "image/jpeg" => Some(".jpg"),
        _ => None,
    }
}

/// POST /api/thumbnail_upload/{video_id}
pub async fn upload_thumbnail(
    req: HttpRequest,
    path: web::Path<String>,
    mut payload: Multipart,
    state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let video_id = upload::parse_video_id(&path)?;
    let user_id = upload::authenticate(&req, &state.config.auth.jwt_secret)?;
    let mut video = upload::owned_video(state.videos.as_ref(), video_id, user_id).await?;

    let mut limit = upload::BodyLimit::new(state.config.storage.max_thumbnail_size);
    let mut field = upload::file_field(&mut payload, "thumbnail", &mut limit).await?;
    let media_type = upload::media_type(&field)?;
    let extension = thumbnail_extension(&media_type).ok_or_else(|| {
        log::warn!("Rejected thumbnail upload with media type {}", media_type);
        ApiError::bad_request("Wrong media type")
    })?;

    let mut data = Vec::new();
    upload::copy_field(&mut field, &mut data, &mut limit).await?;

    let file_name = keys::thumbnail_file_name(extension);
    let file_path = state.config.storage.assets_root.join(&file_name);
    let mut file = tokio::fs::File::create(&file_path).await.map_err(|e| {
        log::error!("Failed to create thumbnail file {:?}: {}", file_path, e);
        ApiError::internal("Error creating thumbnail file")
    })?;

    file.write_all(&data).await.map_err(|e| {
        log::error!("Failed to write thumbnail file {:?}: {}", file_path, e);
        ApiError::internal("Error writing content into file")
    })?;
    file.flush().await.map_err(|e| {
        log::error!("Failed to flush thumbnail file {:?}: {}", file_path, e);
        ApiError::internal("Error writing content into file")
    })?;

    video.thumbnail_url = Some(state.config.server.asset_url(&file_name));
    state.videos.update_video(&video).await.map_err(|e| {
        log::error!("Failed to update video {}: {}", video_id, e);
        ApiError::UpdateRejected("Error updating video metadata".to_string())
    })?;

    log::info!(
        "Stored thumbnail for video {} by user {} as {}",
        video_id,
        user_id,
        file_name
    );

    Ok(HttpResponse::Ok().json(video))
}
