//! 생성 응답 파서
//!
//! LLM 응답 텍스트에서 JSON을 추출해 GeneratedReview로 변환한다.
//! JSON이 아니면 원문을 잘라 기본 카테고리로 대체한다.

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::prompts::{DEFAULT_CATEGORY, REVIEW_CATEGORIES};
use crate::types::GeneratedReview;

/// 파싱 실패 시 원문에서 남기는 최대 글자 수
pub const FALLBACK_REVIEW_MAX_CHARS: usize = 150;

#[derive(Deserialize)]
struct ReviewPayload {
    #[serde(default)]
    review: String,
    #[serde(default)]
    category: String,
}

/// 응답에서 JSON 객체 부분을 추출
///
/// 추출 우선순위:
/// 1. ```json ... ``` 블록
/// 2. 첫 `{` 부터 마지막 `}` 까지
/// 3. 에러
///
/// # Examples
/// ```
/// use foodbuddy_common::extract_json_object;
///
/// let response = "결과: {\"review\": \"맛있어요\"} 끝";
/// let json = extract_json_object(response).unwrap();
/// assert_eq!(json, "{\"review\": \"맛있어요\"}");
/// ```
pub fn extract_json_object(response: &str) -> Result<&str> {
    if let Some(start_marker) = response.find("```json") {
        let start = start_marker + 7; // "```json" 길이
        if let Some(end_offset) = response[start..].find("```") {
            let end = start + end_offset;
            return Ok(response[start..end].trim());
        }
    }

    if let Some(start) = response.find('{') {
        if let Some(end) = response.rfind('}') {
            if end >= start {
                return Ok(&response[start..=end]);
            }
        }
    }

    Err(Error::Parse("JSON을 찾을 수 없습니다".into()))
}

/// 엄격 파싱. 리뷰 본문이 없으면 에러.
pub fn try_parse_generated_review(response: &str) -> Result<GeneratedReview> {
    let json_str = extract_json_object(response)?;
    let payload: ReviewPayload = serde_json::from_str(json_str)
        .map_err(|e| Error::Parse(format!("리뷰 JSON 파싱 오류: {}", e)))?;

    let text = payload.review.trim().to_string();
    if text.is_empty() {
        return Err(Error::Parse("review 필드가 비어 있습니다".into()));
    }

    Ok(GeneratedReview {
        text,
        inferred_category: normalize_category(&payload.category),
    })
}

/// 생성 응답 파싱 (실패하지 않음)
///
/// JSON이 아니면 원문을 FALLBACK_REVIEW_MAX_CHARS 글자로 자르고
/// 카테고리는 DEFAULT_CATEGORY로 둔다.
pub fn parse_generated_review(response: &str) -> GeneratedReview {
    match try_parse_generated_review(response) {
        Ok(review) => review,
        Err(_) => GeneratedReview {
            text: truncate_chars(response.trim(), FALLBACK_REVIEW_MAX_CHARS),
            inferred_category: DEFAULT_CATEGORY.to_string(),
        },
    }
}

/// 알려진 카테고리가 아니면 기본값
pub fn normalize_category(category: &str) -> String {
    let category = category.trim();
    if REVIEW_CATEGORIES.contains(&category) {
        category.to_string()
    } else {
        DEFAULT_CATEGORY.to_string()
    }
}

/// 문자 단위로 자르기 (바이트 경계가 아니라 char 경계)
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
