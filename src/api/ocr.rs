//! 영수증 OCR (`POST /api/ocr/process`)
//!
//! 원본 이미지를 multipart `image` 필드로 올린다. OCR은 처리 시간이 길어
//! 일반 요청보다 긴 타임아웃을 쓴다. 빈 필드는 에러가 아니다.

use super::{request_error, ApiClient};
use crate::cache::{content_hash, OcrCache};
use crate::error::{FoodBuddyError, Result};
use crate::imaging::PreparedImage;
use async_trait::async_trait;
use foodbuddy_common::ReceiptFields;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use std::path::PathBuf;

pub const OCR_RETRY_MESSAGE: &str = "영수증 인식에 실패했습니다. 다시 시도해주세요";

#[async_trait]
pub trait ReceiptRecognizer: Send + Sync {
    async fn recognize(&self, image: &PreparedImage) -> Result<ReceiptFields>;
}

/// OCR 응답 상태 코드 → 에러
///
/// 403과 500만 구분하고 나머지는 재시도 안내로 통일한다.
pub fn ocr_status_error(status: StatusCode, _body: &str) -> FoodBuddyError {
    match status {
        StatusCode::UNAUTHORIZED => FoodBuddyError::Unauthorized,
        StatusCode::FORBIDDEN => FoodBuddyError::AccessDenied,
        StatusCode::INTERNAL_SERVER_ERROR => FoodBuddyError::ServerError,
        _ => FoodBuddyError::ApiCall(OCR_RETRY_MESSAGE.into()),
    }
}

impl ApiClient {
    pub async fn process_ocr(&self, image: &PreparedImage) -> Result<ReceiptFields> {
        let part = Part::bytes(image.original.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime)
            .map_err(request_error)?;
        let form = Form::new().part("image", part);

        let builder = self
            .request(Method::POST, "/api/ocr/process")
            .timeout(self.ocr_timeout)
            .multipart(form);

        let response = builder.send().await.map_err(|e| {
            tracing::warn!(error = %e, "OCR 요청 실패");
            FoodBuddyError::ApiCall(OCR_RETRY_MESSAGE.into())
        })?;
        let response = self.check_status_with(response, ocr_status_error).await?;

        let fields: ReceiptFields = Self::read_json(response).await?;
        tracing::info!(
            restaurant = %fields.restaurant_name,
            items = fields.items.len(),
            total = fields.total,
            "OCR 완료"
        );
        Ok(fields)
    }
}

#[async_trait]
impl ReceiptRecognizer for ApiClient {
    async fn recognize(&self, image: &PreparedImage) -> Result<ReceiptFields> {
        self.process_ocr(image).await
    }
}

/// 결과를 디스크 캐시에 보관하는 OCR
pub struct CachedRecognizer<R> {
    inner: R,
    cache_dir: PathBuf,
}

impl<R: ReceiptRecognizer> CachedRecognizer<R> {
    pub fn new(inner: R, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            cache_dir: cache_dir.into(),
        }
    }
}

#[async_trait]
impl<R: ReceiptRecognizer> ReceiptRecognizer for CachedRecognizer<R> {
    async fn recognize(&self, image: &PreparedImage) -> Result<ReceiptFields> {
        let hash = content_hash(&image.original);
        let mut cache = OcrCache::load(&self.cache_dir);
        if let Some(fields) = cache.get(&hash) {
            tracing::debug!(file = %image.file_name, "OCR 캐시 적중");
            return Ok(fields.clone());
        }

        let fields = self.inner.recognize(image).await?;
        cache.insert(
            hash,
            image.file_name.clone(),
            image.original.len() as u64,
            fields.clone(),
        );
        if let Err(e) = cache.save(&self.cache_dir) {
            tracing::warn!(error = %e, "OCR 캐시 저장 실패");
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ocr_status_error() {
        assert!(matches!(
            ocr_status_error(StatusCode::FORBIDDEN, ""),
            FoodBuddyError::AccessDenied
        ));
        assert!(matches!(
            ocr_status_error(StatusCode::INTERNAL_SERVER_ERROR, ""),
            FoodBuddyError::ServerError
        ));
        for status in [StatusCode::BAD_REQUEST, StatusCode::BAD_GATEWAY, StatusCode::NOT_FOUND] {
            match ocr_status_error(status, "") {
                FoodBuddyError::ApiCall(msg) => assert_eq!(msg, OCR_RETRY_MESSAGE),
                other => panic!("unexpected: {:?}", other),
            }
        }
    }
}
