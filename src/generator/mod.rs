//! 리뷰 생성기
//!
//! `ReviewGenerator`를 구현하면 어떤 LLM이든 쓸 수 있다.
//! 응답 파싱은 실패하지 않으며(원문 일부 + 기본 카테고리), 에러는 전송 단계에서만 난다.

mod openai;

use crate::error::Result;
use async_trait::async_trait;
use foodbuddy_common::{GeneratedReview, GenerationRequest};

pub use openai::OpenAiGenerator;

#[async_trait]
pub trait ReviewGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedReview>;
}
