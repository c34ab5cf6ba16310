//! 프롬프트 생성 모듈
//!
//! - REVIEW_CATEGORIES: 리뷰 생성 시 추론하는 음식 카테고리
//! - build_review_prompt: 리뷰 생성용 프롬프트

use crate::types::{GenerationRequest, LineItem};

/// 생성기가 고를 수 있는 카테고리
pub const REVIEW_CATEGORIES: &[&str] = &["한식", "중식", "일식", "양식", "분식", "카페", "기타"];

/// 카테고리를 판별할 수 없을 때의 기본값
pub const DEFAULT_CATEGORY: &str = "한식";

/// 원화 금액 표기 (8000 → "8,000원")
pub fn format_won(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-{}원", grouped)
    } else {
        format!("{}원", grouped)
    }
}

/// 메뉴 정보 문자열 ("김치찌개 8,000원, 공기밥 1,000원")
pub fn format_menu_info(items: &[LineItem]) -> String {
    items
        .iter()
        .map(|item| match item.quantity {
            Some(q) if q > 1 => format!("{} x{} {}", item.name, q, format_won(item.price)),
            _ => format!("{} {}", item.name, format_won(item.price)),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// 리뷰 생성 프롬프트
///
/// 출력은 `{"review": ..., "category": ...}` JSON 객체 하나로 요구한다.
pub fn build_review_prompt(request: &GenerationRequest) -> String {
    let menu_info = if request.menu_items.is_empty() {
        "정보 없음".to_string()
    } else {
        format_menu_info(&request.menu_items)
    };
    let categories = REVIEW_CATEGORIES.join(", ");

    let mut prompt = format!(
        r#"다음 정보를 바탕으로 음식점 리뷰를 작성해주세요:

식당명: {name}
주문 메뉴: {menu_info}
만족도: {satisfaction}
말투: {tone}
{instruction}

요구사항:
- 실제 방문한 것처럼 생생하게 작성
- 메뉴의 맛, 가격, 서비스에 대한 언급 포함
- 100-200자 정도의 적당한 길이
- 자연스럽고 진정성 있는 표현 사용"#,
        name = request.restaurant_name,
        satisfaction = request.satisfaction_level,
        tone = request.tone.id(),
        instruction = request.tone_instruction,
    );

    if let Some(keywords) = &request.additional_keywords {
        prompt.push_str(&format!("\n- 다음 키워드를 자연스럽게 포함: {}", keywords));
    }

    prompt.push_str(&format!(
        r#"

## 출력 형식 (반드시 이 JSON 객체 하나만 출력)
{{"review": "리뷰 본문", "category": "카테고리"}}

- category는 다음 중 하나: {categories}
- 설명문이나 마크다운은 출력하지 마세요"#
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tone::{Rating, Tone};

    fn sample_request(keywords: Option<&str>) -> GenerationRequest {
        GenerationRequest::new(
            "맛있는 김치찌개",
            vec![LineItem::new("김치찌개", 8000), LineItem::new("공기밥", 1000)],
            Tone::Friendly,
            Rating::new(5).unwrap(),
            keywords.map(str::to_string),
        )
    }

    #[test]
    fn test_format_won() {
        assert_eq!(format_won(0), "0원");
        assert_eq!(format_won(900), "900원");
        assert_eq!(format_won(8000), "8,000원");
        assert_eq!(format_won(1234567), "1,234,567원");
        assert_eq!(format_won(-76900), "-76,900원");
    }

    #[test]
    fn test_format_menu_info() {
        let items = vec![
            LineItem::new("김치찌개", 8000),
            LineItem {
                name: "진로이즈백".to_string(),
                price: 6000,
                quantity: Some(2),
            },
        ];
        assert_eq!(format_menu_info(&items), "김치찌개 8,000원, 진로이즈백 x2 6,000원");
    }

    #[test]
    fn test_build_review_prompt() {
        let prompt = build_review_prompt(&sample_request(None));
        assert!(prompt.contains("식당명: 맛있는 김치찌개"));
        assert!(prompt.contains("김치찌개 8,000원, 공기밥 1,000원"));
        assert!(prompt.contains("매우 만족 (5점)"));
        assert!(prompt.contains(Tone::Friendly.instruction()));
        assert!(prompt.contains("\"category\""));
        assert!(!prompt.contains("키워드"));
    }

    #[test]
    fn test_build_review_prompt_with_keywords() {
        let prompt = build_review_prompt(&sample_request(Some("가성비, 혼밥")));
        assert!(prompt.contains("다음 키워드를 자연스럽게 포함: 가성비, 혼밥"));
    }

    #[test]
    fn test_blank_keywords_are_dropped() {
        let request = sample_request(Some("   "));
        assert!(request.additional_keywords.is_none());
    }

    #[test]
    fn test_default_category_is_known() {
        assert!(REVIEW_CATEGORIES.contains(&DEFAULT_CATEGORY));
    }
}
