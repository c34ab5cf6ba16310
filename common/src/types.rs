//! 도메인 타입 정의
//!
//! CLI와 다른 프런트엔드에서 공유되는 타입:
//! - ReceiptFields: OCR 서버 응답
//! - ReceiptDraft: 사용자가 확인・수정하는 영수증 초안
//! - GeneratedReview / GenerationRequest: 리뷰 생성 입출력
//! - CompleteReviewRequest / ReviewRecord 등: 백엔드 DTO

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::tone::{Rating, Tone};

/// null을 기본값으로 취급한다 (OCR 서버는 인식 실패 항목을 null로 보낸다)
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 금액 필드: 정수, 실수, "12,000원" 같은 문자열을 받는다. 읽을 수 없으면 0
fn lenient_amount<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(parse_amount).unwrap_or(0))
}

fn parse_amount(value: &serde_json::Value) -> i64 {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
            .unwrap_or(0),
        serde_json::Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| !c.is_whitespace() && *c != ',' && *c != '원')
                .collect();
            cleaned
                .parse::<i64>()
                .ok()
                .or_else(|| {
                    cleaned
                        .parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f.round() as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

/// 영수증 메뉴 항목
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// 원 단위 가격
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl LineItem {
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: None,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }
}

/// OCR 서버(`/api/ocr/process`) 응답
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReceiptFields {
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<LineItem>,
    #[serde(deserialize_with = "lenient_amount")]
    pub total: i64,
}

/// 영수증 초안
///
/// 이미지 업로드 시 생성되고 OCR 결과와 수동 수정으로 채워진다.
/// 빈 문자열은 에러가 아니라 "직접 입력 필요"를 의미한다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDraft {
    /// 업로드용으로 축소된 JPEG의 data URL
    pub image_data: String,
    pub restaurant_name_guess: String,
    pub address_guess: String,
    pub line_items: Vec<LineItem>,
    pub total_amount: i64,
    #[serde(default)]
    pub receipt_date: Option<NaiveDate>,
}

impl ReceiptDraft {
    pub fn new(image_data: impl Into<String>) -> Self {
        Self {
            image_data: image_data.into(),
            ..Default::default()
        }
    }

    /// OCR 결과를 반영
    pub fn apply_fields(&mut self, fields: &ReceiptFields) {
        self.restaurant_name_guess = fields.restaurant_name.trim().to_string();
        self.address_guess = fields.address.trim().to_string();
        self.line_items = fields.items.clone();
        self.total_amount = fields.total;
    }

    /// 직접 입력이 필요한 항목 이름
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.restaurant_name_guess.trim().is_empty() {
            missing.push("restaurantName");
        }
        if self.address_guess.trim().is_empty() {
            missing.push("address");
        }
        if self.line_items.is_empty() {
            missing.push("items");
        }
        if self.total_amount <= 0 {
            missing.push("total");
        }
        missing
    }

    /// 메뉴 합계 (수량 반영)
    pub fn items_sum(&self) -> i64 {
        self.line_items
            .iter()
            .map(|item| item.price.saturating_mul(i64::from(item.quantity())))
            .fold(0i64, i64::saturating_add)
    }
}

/// 생성된 리뷰. 저장 전까지 사용자가 수정할 수 있다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedReview {
    pub text: String,
    pub inferred_category: String,
}

/// 리뷰 생성기에 넘기는 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub restaurant_name: String,
    pub menu_items: Vec<LineItem>,
    pub tone: Tone,
    pub rating: Rating,
    pub satisfaction_level: String,
    pub tone_instruction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_keywords: Option<String>,
}

impl GenerationRequest {
    pub fn new(
        restaurant_name: impl Into<String>,
        menu_items: Vec<LineItem>,
        tone: Tone,
        rating: Rating,
        additional_keywords: Option<String>,
    ) -> Self {
        let additional_keywords = additional_keywords
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            restaurant_name: restaurant_name.into(),
            menu_items,
            tone,
            rating,
            satisfaction_level: rating.satisfaction_level().to_string(),
            tone_instruction: tone.instruction().to_string(),
            additional_keywords,
        }
    }
}

/// `/api/reviews/complete` 요청
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteReviewRequest {
    // OCR 정보
    pub ocr_restaurant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ocr_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_img: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_date: Option<NaiveDate>,
    pub ocr_menu_items: Vec<LineItem>,

    // 식당 정보
    pub restaurant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restaurant_category: Option<String>,
    pub restaurant_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,

    // 리뷰 정보
    pub style_id: String,
    pub review_content: String,
    pub rating: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompleteReviewResponse {
    pub success: bool,
    pub review_id: String,
    pub receipt_id: String,
    pub restaurant_id: String,
    pub message: String,
}

/// 저장된 리뷰 (`/api/reviews/me/detailed`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReviewRecord {
    pub review_id: String,
    pub restaurant_id: String,
    pub receipt_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub style_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: String,
    pub rating: f64,
    pub created_at: Option<NaiveDateTime>,

    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_category: String,

    pub original_img: Option<String>,
    pub receipt_date: Option<NaiveDate>,
}

/// 식당 (`/api/restaurants`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Restaurant {
    pub restaurant_id: String,
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub category: String,
    #[serde(deserialize_with = "null_as_default")]
    pub address: String,
    pub location_id: Option<String>,
}

/// 즐겨찾기 (`/api/favorites/me`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Favorite {
    pub favorite_id: String,
    pub restaurant_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_address: String,
    #[serde(deserialize_with = "null_as_default")]
    pub restaurant_category: String,
    pub rating: Option<f64>,
    pub visit_count: Option<u32>,
    pub last_visit: Option<String>,
    pub created_at: Option<String>,
}

/// 서버 집계 통계 (`/api/statistics/me`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStatistics {
    pub total_review_count: usize,
    pub avg_rating: f64,
    pub this_month_review_count: usize,
    pub monthly_review_count: std::collections::BTreeMap<String, usize>,
    pub rating_distribution: std::collections::BTreeMap<String, usize>,
    pub category_distribution: std::collections::BTreeMap<String, usize>,
    pub top_visited_restaurants: Vec<TopVisited>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopVisited {
    pub name: String,
    pub category: String,
    pub visit_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_fields_with_nulls() {
        let json = r#"{
            "text": "raw",
            "restaurantName": null,
            "address": null,
            "items": [{"name": "김치찌개", "price": null}],
            "total": null
        }"#;
        let fields: ReceiptFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.restaurant_name, "");
        assert_eq!(fields.address, "");
        assert_eq!(fields.items.len(), 1);
        assert_eq!(fields.items[0].price, 0);
        assert_eq!(fields.total, 0);
    }

    #[test]
    fn test_receipt_fields_loose_amounts() {
        let json = r#"{
            "items": [
                {"name": "김치찌개", "price": "12,000"},
                {"name": "공기밥", "price": 1000.4},
                {"name": "서비스", "price": "무료"}
            ],
            "total": 1000.0
        }"#;
        let fields: ReceiptFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.items[0].price, 12000);
        assert_eq!(fields.items[1].price, 1000);
        assert_eq!(fields.items[2].price, 0);
        assert_eq!(fields.total, 1000);

        let fields: ReceiptFields =
            serde_json::from_str(r#"{"total": " 13,000원 "}"#).unwrap();
        assert_eq!(fields.total, 13000);

        let fields: ReceiptFields = serde_json::from_str(r#"{"total": [1, 2]}"#).unwrap();
        assert_eq!(fields.total, 0);
    }

    #[test]
    fn test_receipt_fields_missing_keys() {
        let fields: ReceiptFields = serde_json::from_str("{}").unwrap();
        assert!(fields.items.is_empty());
        assert_eq!(fields.total, 0);
    }

    #[test]
    fn test_draft_missing_fields() {
        let mut draft = ReceiptDraft::new("data:image/jpeg;base64,AAAA");
        assert_eq!(
            draft.missing_fields(),
            vec!["restaurantName", "address", "items", "total"]
        );

        draft.apply_fields(&ReceiptFields {
            restaurant_name: "  맛있는 김치찌개 ".to_string(),
            items: vec![LineItem::new("김치찌개", 8000)],
            total: 8000,
            ..Default::default()
        });
        assert_eq!(draft.restaurant_name_guess, "맛있는 김치찌개");
        assert_eq!(draft.missing_fields(), vec!["address"]);
    }

    #[test]
    fn test_items_sum_uses_quantity() {
        let draft = ReceiptDraft {
            line_items: vec![
                LineItem {
                    name: "진로이즈백".to_string(),
                    price: 6000,
                    quantity: Some(2),
                },
                LineItem::new("공기밥", 1000),
            ],
            ..Default::default()
        };
        assert_eq!(draft.items_sum(), 13000);
    }

    #[test]
    fn test_items_sum_saturates() {
        let draft = ReceiptDraft {
            line_items: vec![
                LineItem {
                    name: "오인식".to_string(),
                    price: i64::MAX,
                    quantity: Some(2),
                },
                LineItem::new("공기밥", 1000),
            ],
            ..Default::default()
        };
        assert_eq!(draft.items_sum(), i64::MAX);
    }

    #[test]
    fn test_complete_review_request_serialize() {
        let request = CompleteReviewRequest {
            ocr_restaurant_name: "A".to_string(),
            ocr_address: None,
            original_img: None,
            receipt_date: NaiveDate::from_ymd_opt(2025, 7, 1),
            ocr_menu_items: vec![LineItem::new("X", 1000)],
            restaurant_name: "A".to_string(),
            restaurant_category: Some("한식".to_string()),
            restaurant_address: String::new(),
            location_id: None,
            style_id: "simple".to_string(),
            review_content: "맛있음".to_string(),
            rating: 4,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"ocrRestaurantName\":\"A\""));
        assert!(json.contains("\"receiptDate\":\"2025-07-01\""));
        assert!(json.contains("\"styleId\":\"simple\""));
        assert!(!json.contains("ocrAddress"));
    }

    #[test]
    fn test_review_record_deserialize() {
        let json = r#"{
            "reviewId": "r1",
            "restaurantId": "s1",
            "content": "좋아요",
            "rating": 4.5,
            "createdAt": "2025-06-30T12:34:56",
            "restaurantName": "맛집",
            "restaurantCategory": null
        }"#;
        let record: ReviewRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.review_id, "r1");
        assert_eq!(record.rating, 4.5);
        assert!(record.created_at.is_some());
        assert_eq!(record.restaurant_category, "");
    }
}
