//! 리뷰 통계 집계
//!
//! 이미 받아온 리뷰 목록에 대한 순수 집계. 입력 순서와 무관하게
//! 같은 결과를 낸다.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::types::{ReviewRecord, TopVisited};

/// 월별 통계에서 남기는 최근 개월 수
pub const RECENT_MONTHS: usize = 5;

/// 자주 방문한 식당 상위 개수
pub const TOP_VISITED_LIMIT: usize = 3;

/// 카테고리가 비어 있는 리뷰의 분류
pub const UNCATEGORIZED: &str = "기타";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStatistics {
    pub total_review_count: usize,
    pub avg_rating: f64,
    pub this_month_review_count: usize,
    pub category_distribution: BTreeMap<String, usize>,
    /// "YYYY-MM" → 건수 (최근 RECENT_MONTHS개월)
    pub monthly_review_count: BTreeMap<String, usize>,
    /// index 0 = 1점 … index 4 = 5점
    pub rating_histogram: [usize; 5],
    pub top_visited_restaurants: Vec<TopVisited>,
}

impl ReviewStatistics {
    /// 가장 많이 방문한 카테고리 (동률이면 이름순)
    pub fn favorite_category(&self) -> Option<&str> {
        self.category_distribution
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(name, _)| name.as_str())
    }
}

/// 리뷰 목록을 집계
pub fn aggregate(reviews: &[ReviewRecord], today: NaiveDate) -> ReviewStatistics {
    let mut stats = ReviewStatistics {
        total_review_count: reviews.len(),
        ..Default::default()
    };

    // 평균은 0.1점 단위 정수로 합산 (f64 합산 순서에 따른 오차 방지)
    let mut rating_tenths: i64 = 0;
    let mut monthly: BTreeMap<String, usize> = BTreeMap::new();
    let mut visits: BTreeMap<String, (usize, BTreeSet<String>)> = BTreeMap::new();

    for review in reviews {
        rating_tenths += (review.rating * 10.0).round() as i64;

        let category = match review.restaurant_category.trim() {
            "" => UNCATEGORIZED.to_string(),
            c => c.to_string(),
        };
        *stats.category_distribution.entry(category).or_insert(0) += 1;

        if let Some(bucket) = histogram_bucket(review.rating) {
            stats.rating_histogram[usize::from(bucket - 1)] += 1;
        }

        if let Some(created_at) = review.created_at {
            let date = created_at.date();
            *monthly.entry(month_key(date)).or_insert(0) += 1;
            if date.year() == today.year() && date.month() == today.month() {
                stats.this_month_review_count += 1;
            }
        }

        let name = review.restaurant_name.trim();
        if !name.is_empty() {
            let entry = visits.entry(name.to_string()).or_default();
            entry.0 += 1;
            let category = review.restaurant_category.trim();
            if !category.is_empty() {
                entry.1.insert(category.to_string());
            }
        }
    }

    if !reviews.is_empty() {
        let avg = rating_tenths as f64 / 10.0 / reviews.len() as f64;
        stats.avg_rating = (avg * 10.0).round() / 10.0;
    }

    let skip = monthly.len().saturating_sub(RECENT_MONTHS);
    stats.monthly_review_count = monthly.into_iter().skip(skip).collect();

    stats.top_visited_restaurants = top_visited(visits);
    stats
}

/// 방문 횟수 내림차순, 동률이면 식당 이름 오름차순
fn top_visited(visits: BTreeMap<String, (usize, BTreeSet<String>)>) -> Vec<TopVisited> {
    let mut ranked: Vec<TopVisited> = visits
        .into_iter()
        .map(|(name, (count, categories))| TopVisited {
            name,
            category: categories.into_iter().next().unwrap_or_default(),
            visit_count: count,
        })
        .collect();
    ranked.sort_by(|a, b| b.visit_count.cmp(&a.visit_count).then_with(|| a.name.cmp(&b.name)));
    ranked.truncate(TOP_VISITED_LIMIT);
    ranked
}

fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// 별점을 1~5 정수 구간으로 (반올림 후 범위 고정)
pub fn histogram_bucket(rating: f64) -> Option<u8> {
    if !rating.is_finite() {
        return None;
    }
    let rounded = (rating + 0.5).floor().clamp(1.0, 5.0);
    Some(rounded as u8)
}

/// 차트 표시용 백분율 (정수 반올림)
pub fn percentage(count: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn review(name: &str, category: &str, rating: f64, created: &str) -> ReviewRecord {
        ReviewRecord {
            restaurant_name: name.to_string(),
            restaurant_category: category.to_string(),
            rating,
            created_at: NaiveDateTime::parse_from_str(created, "%Y-%m-%d %H:%M:%S").ok(),
            ..Default::default()
        }
    }

    fn sample() -> Vec<ReviewRecord> {
        vec![
            review("맛있는 김치찌개", "한식", 5.0, "2025-07-03 12:00:00"),
            review("스시 오마카세", "일식", 4.0, "2025-07-10 19:00:00"),
            review("맛있는 김치찌개", "한식", 4.5, "2025-06-01 12:00:00"),
            review("파스타 하우스", "양식", 3.0, "2025-05-20 18:00:00"),
            review("스시 오마카세", "일식", 2.0, "2025-03-02 18:00:00"),
            review("분식집", "", 1.0, "2025-02-11 13:00:00"),
            review("분식집", "", 4.0, "2024-12-24 13:00:00"),
        ]
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, 15).unwrap()
    }

    #[test]
    fn test_aggregate_counts() {
        let stats = aggregate(&sample(), today());
        assert_eq!(stats.total_review_count, 7);
        assert_eq!(stats.this_month_review_count, 2);
        assert_eq!(stats.category_distribution["한식"], 2);
        assert_eq!(stats.category_distribution["일식"], 2);
        assert_eq!(stats.category_distribution[UNCATEGORIZED], 2);
        // 4.5 → 5점 구간
        assert_eq!(stats.rating_histogram, [1, 1, 1, 2, 2]);
        assert_eq!(stats.avg_rating, 3.4);
    }

    #[test]
    fn test_monthly_trimmed_to_recent() {
        let stats = aggregate(&sample(), today());
        let keys: Vec<&str> = stats.monthly_review_count.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["2025-02", "2025-03", "2025-05", "2025-06", "2025-07"]);
        assert_eq!(stats.monthly_review_count["2025-07"], 2);
    }

    #[test]
    fn test_top_visited_tie_break_by_name() {
        let stats = aggregate(&sample(), today());
        let names: Vec<&str> = stats
            .top_visited_restaurants
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, vec!["맛있는 김치찌개", "분식집", "스시 오마카세"]);
        assert_eq!(stats.top_visited_restaurants[0].visit_count, 2);
        assert_eq!(stats.top_visited_restaurants[0].category, "한식");
    }

    #[test]
    fn test_order_independent() {
        let forward = sample();
        let mut reversed = sample();
        reversed.reverse();
        let mut rotated = sample();
        rotated.rotate_left(3);

        let expected = aggregate(&forward, today());
        assert_eq!(aggregate(&reversed, today()), expected);
        assert_eq!(aggregate(&rotated, today()), expected);
    }

    #[test]
    fn test_idempotent() {
        let reviews = sample();
        assert_eq!(aggregate(&reviews, today()), aggregate(&reviews, today()));
    }

    #[test]
    fn test_empty_input() {
        let stats = aggregate(&[], today());
        assert_eq!(stats.total_review_count, 0);
        assert_eq!(stats.avg_rating, 0.0);
        assert!(stats.top_visited_restaurants.is_empty());
        assert!(stats.favorite_category().is_none());
    }

    #[test]
    fn test_favorite_category_tie_break() {
        let stats = aggregate(&sample(), today());
        // 한식・일식・기타 모두 2건 → 이름순 첫 번째
        assert_eq!(stats.favorite_category(), Some("기타"));
    }

    #[test]
    fn test_histogram_bucket() {
        assert_eq!(histogram_bucket(0.0), Some(1));
        assert_eq!(histogram_bucket(2.4), Some(2));
        assert_eq!(histogram_bucket(2.5), Some(3));
        assert_eq!(histogram_bucket(7.0), Some(5));
        assert_eq!(histogram_bucket(f64::NAN), None);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(8, 8), 100);
    }
}
