//! 上传控件
//!
//! 读取本地照片并编码；不是图片时在本地直接拒绝，不触发状态切换

use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tokio::fs;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::PendingImage;

/// 拒绝非图片文件时的提示
pub const NOT_AN_IMAGE_MESSAGE: &str = "Please upload an image file.";

/// 根据扩展名推断图片类型，不是图片时返回 `None`
pub fn image_mime_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "heic" => Some("image/heic"),
        "heif" => Some("image/heif"),
        _ => None,
    }
}

/// 读取并编码照片
///
/// # 参数
/// - `path`: 照片路径
///
/// # 返回
/// 返回编码后的待分析图片
pub async fn read_image(path: &Path) -> AppResult<PendingImage> {
    let mime_type = image_mime_type(path).ok_or_else(|| AppError::invalid_input(NOT_AN_IMAGE_MESSAGE))?;

    let bytes = fs::read(path)
        .await
        .map_err(|e| AppError::file(path.display().to_string(), e))?;
    if bytes.is_empty() {
        return Err(AppError::invalid_input("The selected image is empty."));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    debug!("读取图片 {} ({} 字节, {})", file_name, bytes.len(), mime_type);

    Ok(PendingImage::new(file_name, mime_type, STANDARD.encode(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime_type() {
        assert_eq!(image_mime_type(Path::new("page.JPG")), Some("image/jpeg"));
        assert_eq!(image_mime_type(Path::new("scan.png")), Some("image/png"));
        assert_eq!(image_mime_type(Path::new("notes.pdf")), None);
        assert_eq!(image_mime_type(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_read_image_encodes_bytes_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.jpg");
        std::fs::write(&path, b"hello").unwrap();

        let image = read_image(&path).await.unwrap();
        assert_eq!(image.file_name, "page.jpg");
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "aGVsbG8=");
    }

    #[tokio::test]
    async fn test_read_image_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"text").unwrap();

        let err = read_image(&path).await.unwrap_err();
        assert!(matches!(err, AppError::InputValidation { .. }));
        assert_eq!(err.to_string(), NOT_AN_IMAGE_MESSAGE);
    }

    #[tokio::test]
    async fn test_read_image_rejects_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.png");
        std::fs::write(&path, b"").unwrap();

        assert!(matches!(
            read_image(&path).await,
            Err(AppError::InputValidation { .. })
        ));
    }
}
