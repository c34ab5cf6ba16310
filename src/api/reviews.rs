//! 리뷰 저장・조회・삭제

use super::ApiClient;
use crate::error::Result;
use async_trait::async_trait;
use foodbuddy_common::{CompleteReviewRequest, CompleteReviewResponse, ReviewRecord};
use reqwest::Method;

/// 내 리뷰 정렬
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReviewOrder {
    #[default]
    Latest,
    Oldest,
}

impl ReviewOrder {
    pub fn as_query(&self) -> &'static str {
        match self {
            ReviewOrder::Latest => "latest",
            ReviewOrder::Oldest => "oldest",
        }
    }
}

impl std::str::FromStr for ReviewOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "latest" | "new" => Ok(ReviewOrder::Latest),
            "oldest" | "old" => Ok(ReviewOrder::Oldest),
            _ => Err(format!("Unknown order: {}. Use latest or oldest", s)),
        }
    }
}

/// 완성된 리뷰 저장소
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn save_review(&self, request: &CompleteReviewRequest) -> Result<CompleteReviewResponse>;
}

impl ApiClient {
    /// `POST /api/reviews/complete`
    pub async fn save_complete_review(
        &self,
        request: &CompleteReviewRequest,
    ) -> Result<CompleteReviewResponse> {
        let response: CompleteReviewResponse = self.post_json("/api/reviews/complete", request).await?;
        tracing::info!(review_id = %response.review_id, "리뷰 저장");
        Ok(response)
    }

    /// `GET /api/reviews/me/detailed`
    pub async fn my_reviews(&self, order: ReviewOrder) -> Result<Vec<ReviewRecord>> {
        self.get_json(&format!("/api/reviews/me/detailed?order={}", order.as_query()))
            .await
    }

    /// `DELETE /api/reviews/{id}`
    pub async fn delete_review(&self, review_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &format!("/api/reviews/{}", review_id.trim()))
            .await
    }
}

#[async_trait]
impl ReviewRepository for ApiClient {
    async fn save_review(&self, request: &CompleteReviewRequest) -> Result<CompleteReviewResponse> {
        self.save_complete_review(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_review_order_parse() {
        assert_eq!("latest".parse::<ReviewOrder>().unwrap(), ReviewOrder::Latest);
        assert_eq!("OLDEST".parse::<ReviewOrder>().unwrap(), ReviewOrder::Oldest);
        assert!("rating".parse::<ReviewOrder>().is_err());
        assert_eq!(ReviewOrder::default().as_query(), "latest");
    }
}
