//! 업로드 전 이미지 처리
//!
//! - 확장자로 MIME 판별 (jpg/jpeg/png/webp만 허용)
//! - 긴 변이 최대 크기를 넘으면 비율을 유지한 채 축소
//! - JPEG 재인코딩 후 data URL로 변환

mod exif;

use crate::error::{FoodBuddyError, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::NaiveDate;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::path::{Path, PathBuf};

pub use self::exif::extract_date;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
];

/// 업로드 준비가 끝난 영수증 이미지
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub path: PathBuf,
    pub file_name: String,
    /// 원본 파일 바이트 (OCR 업로드용)
    pub original: Vec<u8>,
    pub mime: &'static str,
    /// 축소된 JPEG의 data URL (리뷰 저장용)
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    pub receipt_date: Option<NaiveDate>,
}

/// 확장자로 MIME 타입 판별 (대소문자 무시)
pub fn mime_for_path(path: &Path) -> Result<&'static str> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| FoodBuddyError::UnsupportedImage(path.display().to_string()))
}

/// 긴 변이 max_dimension을 넘을 때만 비율을 유지해 축소
pub fn resize_for_upload(image: &DynamicImage, max_dimension: u32) -> DynamicImage {
    if image.width() <= max_dimension && image.height() <= max_dimension {
        return image.clone();
    }
    image.resize(max_dimension, max_dimension, FilterType::Lanczos3)
}

pub fn encode_jpeg(image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let rgb = image.to_rgb8();
    let mut buffer = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    encoder
        .encode_image(&rgb)
        .map_err(|e| FoodBuddyError::ImageProcessing(e.to_string()))?;
    Ok(buffer)
}

pub fn to_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// 파일을 읽어 업로드용으로 준비
pub fn prepare_image(path: &Path, max_dimension: u32, jpeg_quality: u8) -> Result<PreparedImage> {
    if !path.is_file() {
        return Err(FoodBuddyError::FileNotFound(path.display().to_string()));
    }
    let mime = mime_for_path(path)?;
    let original = std::fs::read(path)?;

    let decoded = image::load_from_memory(&original)
        .map_err(|e| FoodBuddyError::ImageProcessing(format!("{}: {}", path.display(), e)))?;
    let resized = resize_for_upload(&decoded, max_dimension);
    let jpeg = encode_jpeg(&resized, jpeg_quality)?;

    tracing::debug!(
        file = %path.display(),
        from = %format!("{}x{}", decoded.width(), decoded.height()),
        to = %format!("{}x{}", resized.width(), resized.height()),
        bytes = jpeg.len(),
        "이미지 축소"
    );

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    Ok(PreparedImage {
        path: path.to_path_buf(),
        file_name,
        receipt_date: extract_date(&original),
        mime,
        data_url: to_data_url(&jpeg, "image/jpeg"),
        width: resized.width(),
        height: resized.height(),
        original,
    })
}
