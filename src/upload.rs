//! Image intake for multipart uploads.
//!
//! Files land in the configured upload directory under a fresh UUID name and
//! are served back at `/uploads/<name>`. Callers remove the file again when
//! the accompanying database write fails.

use crate::error::AppError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub struct StoredImage {
    pub url: String,
    pub path: PathBuf,
}

fn extension_for(content_type: &str) -> Result<&'static str, AppError> {
    match content_type {
        "image/jpeg" => Ok("jpg"),
        "image/png" => Ok("png"),
        "image/gif" => Ok("gif"),
        "image/webp" => Ok("webp"),
        other if other.starts_with("image/") => Ok("img"),
        other => Err(AppError::UnsupportedMedia(other.to_string())),
    }
}

/// Write one uploaded image to disk. Only `image/*` content types are accepted.
pub async fn store_image(
    upload_dir: &str,
    content_type: &str,
    bytes: &[u8],
) -> Result<StoredImage, AppError> {
    let ext = extension_for(content_type)?;
    tokio::fs::create_dir_all(upload_dir).await?;
    let file_name = format!("{}.{}", Uuid::new_v4(), ext);
    let path = Path::new(upload_dir).join(&file_name);
    tokio::fs::write(&path, bytes).await?;
    tracing::debug!(file = %path.display(), "stored upload");
    Ok(StoredImage {
        url: format!("/uploads/{}", file_name),
        path,
    })
}

/// Best-effort removal of a stored file after a failed write.
pub async fn remove_stored(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        tracing::warn!(file = %path.display(), error = %err, "could not remove upload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_types_map_to_extensions() {
        assert_eq!(extension_for("image/jpeg").unwrap(), "jpg");
        assert_eq!(extension_for("image/webp").unwrap(), "webp");
        assert_eq!(extension_for("image/x-icon").unwrap(), "img");
    }

    #[test]
    fn non_image_types_are_rejected() {
        let err = extension_for("application/pdf").unwrap_err();
        assert!(matches!(err, AppError::UnsupportedMedia(_)));
        assert!(extension_for("text/plain").is_err());
    }

    #[tokio::test]
    async fn store_and_remove_round_trip() {
        let dir = std::env::temp_dir().join(format!("uploads-{}", Uuid::new_v4()));
        let dir_str = dir.to_str().unwrap();
        let stored = store_image(dir_str, "image/png", b"not-really-a-png")
            .await
            .unwrap();
        assert!(stored.url.starts_with("/uploads/"));
        assert!(stored.url.ends_with(".png"));
        assert!(stored.path.exists());
        remove_stored(&stored.path).await;
        assert!(!stored.path.exists());
        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
