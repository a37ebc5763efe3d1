use axum::extract::Multipart;
use chrono::Utc;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dto::upload::UploadResponse,
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
};

pub const UPLOAD_FIELD: &str = "images";
pub const PUBLIC_PREFIX: &str = "/uploads";

struct PendingFile {
    name: String,
    bytes: axum::body::Bytes,
}

/// Raster formats only, with the extension each is stored under. SVG can carry
/// script and would be served from our own origin.
const IMAGE_TYPES: [(&str, &str); 4] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/gif", "gif"),
    ("image/webp", "webp"),
];

/// Extension for an accepted image content type. Parameters such as
/// `; charset=...` are ignored.
pub fn image_extension(content_type: Option<&str>) -> Option<&'static str> {
    let essence = content_type?.split(';').next()?.trim().to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == essence)
        .map(|(_, ext)| *ext)
}

pub fn is_image(content_type: Option<&str>) -> bool {
    image_extension(content_type).is_some()
}

/// Stored file name: `images-<unix ms>-<uuid>.<ext>`. The client's file name is
/// never used, so the served content type always matches what was checked.
pub fn stored_file_name(ext: &str, now_ms: i64, id: Uuid) -> String {
    format!("{UPLOAD_FIELD}-{now_ms}-{}.{ext}", id.simple())
}

/// Read every `images` part, checking limits before anything touches the disk,
/// then write the batch and return the public paths.
pub async fn store_images(
    config: &AppConfig,
    user: &AuthUser,
    mut multipart: Multipart,
) -> AppResult<UploadResponse> {
    let mut pending: Vec<PendingFile> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            return Err(AppError::BadRequest(format!(
                "Unexpected field, files must be sent as '{UPLOAD_FIELD}'"
            )));
        }
        if pending.len() >= config.upload_max_files {
            return Err(AppError::BadRequest(format!(
                "Too many files, at most {} images per upload",
                config.upload_max_files
            )));
        }
        let Some(ext) = image_extension(field.content_type()) else {
            return Err(AppError::BadRequest(
                "Only JPEG, PNG, GIF and WebP images are allowed".to_string(),
            ));
        };

        let name = stored_file_name(ext, Utc::now().timestamp_millis(), Uuid::new_v4());
        let bytes = field.bytes().await?;
        if bytes.len() > config.upload_max_file_bytes {
            return Err(AppError::BadRequest(format!(
                "File too large, limit is {} bytes",
                config.upload_max_file_bytes
            )));
        }
        pending.push(PendingFile { name, bytes });
    }

    if pending.is_empty() {
        return Err(AppError::BadRequest("No files uploaded".to_string()));
    }

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("creating upload dir: {e}")))?;

    let mut urls = Vec::with_capacity(pending.len());
    for file in pending {
        let path = config.upload_dir.join(&file.name);
        tokio::fs::write(&path, &file.bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("writing {}: {e}", path.display())))?;
        urls.push(format!("{PUBLIC_PREFIX}/{}", file.name));
    }

    tracing::info!(user_id = %user.id(), count = urls.len(), "images uploaded");

    Ok(UploadResponse { urls })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_name_uses_the_checked_type() {
        assert_eq!(
            stored_file_name("jpg", 1700000000000, Uuid::nil()),
            "images-1700000000000-00000000000000000000000000000000.jpg"
        );
    }

    #[test]
    fn extension_follows_content_type() {
        assert_eq!(image_extension(Some("image/jpeg")), Some("jpg"));
        assert_eq!(image_extension(Some("image/PNG")), Some("png"));
        assert_eq!(image_extension(Some("image/webp; q=1")), Some("webp"));
        assert_eq!(image_extension(Some("image/svg+xml")), None);
        assert_eq!(image_extension(None), None);
    }

    #[test]
    fn only_image_content_types_pass() {
        assert!(is_image(Some("image/png")));
        assert!(is_image(Some("image/webp")));
        assert!(is_image(Some("image/JPEG")));
        assert!(!is_image(Some("application/pdf")));
        assert!(!is_image(Some("image/svg+xml")));
        assert!(!is_image(Some("text/html")));
        assert!(!is_image(None));
    }
}
