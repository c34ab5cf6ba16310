//! 백엔드 REST 클라이언트
//!
//! 모든 요청에 저장된 토큰을 Bearer로 붙이고, 401 응답을 받으면
//! 세션(토큰・닉네임)을 지운 뒤 `Unauthorized`를 돌려준다. 재시도는 하지 않는다.

pub mod auth;
pub mod favorites;
pub mod ocr;
pub mod restaurants;
pub mod reviews;
pub mod statistics;

use crate::config::{normalize_base_url, Config};
use crate::error::{FoodBuddyError, Result};
use crate::store::{KeyValueStore, Session};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

pub use auth::{LoginResponse, UserProfile};
pub use ocr::{CachedRecognizer, ReceiptRecognizer};
pub use reviews::ReviewRepository;

/// 에러 메시지에 남길 응답 본문 최대 글자 수
const ERROR_BODY_MAX_CHARS: usize = 200;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    ocr_timeout: Duration,
    store: Arc<dyn KeyValueStore>,
}

impl ApiClient {
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.api_base_url(),
            timeout: config.request_timeout(),
            ocr_timeout: config.ocr_timeout(),
            store,
        }
    }

    /// 설정・환경 변수와 무관하게 주소를 지정
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = normalize_base_url(url);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> Session<'_> {
        Session::new(self.store.as_ref())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 기본 타임아웃과 인증 헤더를 붙인 요청
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        tracing::debug!(%method, %url, "API 요청");

        let builder = self.client.request(method, url).timeout(self.timeout);
        match self.session().access_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// 전송 후 상태 코드 검사
    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await.map_err(request_error)?;
        self.check_status(response).await
    }

    async fn check_status(&self, response: Response) -> Result<Response> {
        self.check_status_with(response, status_error).await
    }

    /// 상태 코드 검사. 401이면 세션을 지운 뒤 `to_error`로 변환한다.
    async fn check_status_with(
        &self,
        response: Response,
        to_error: fn(StatusCode, &str) -> FoodBuddyError,
    ) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::warn!(status = status.as_u16(), body = %body, "API 오류 응답");

        if status == StatusCode::UNAUTHORIZED {
            // 토큰 만료 또는 무효
            if let Err(e) = self.session().clear() {
                tracing::warn!(error = %e, "세션 삭제 실패");
            }
        }
        Err(to_error(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text().await.map_err(request_error)?;
        serde_json::from_str(&text).map_err(|e| FoodBuddyError::ApiParse(e.to_string()))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send(self.request(Method::GET, path)).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::POST, path).json(body)).await?;
        Self::read_json(response).await
    }

    pub(crate) async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        Self::read_json(response).await
    }

    /// 응답 본문을 문자열로 받는 PUT (비밀번호 변경)
    pub(crate) async fn put_text<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<String> {
        let response = self.send(self.request(Method::PUT, path).json(body)).await?;
        response.text().await.map_err(request_error)
    }

    /// 본문이 없는 요청 (POST/DELETE)
    pub(crate) async fn send_empty(&self, method: Method, path: &str) -> Result<()> {
        self.send(self.request(method, path)).await?;
        Ok(())
    }
}

/// 전송 단계의 실패 (연결 불가, 타임아웃)
pub(crate) fn request_error(err: reqwest::Error) -> FoodBuddyError {
    if err.is_timeout() {
        FoodBuddyError::ApiCall("요청 시간이 초과되었습니다".into())
    } else {
        FoodBuddyError::ApiCall(err.to_string())
    }
}

/// 상태 코드 → 에러
pub fn status_error(status: StatusCode, body: &str) -> FoodBuddyError {
    match status {
        StatusCode::UNAUTHORIZED => FoodBuddyError::Unauthorized,
        StatusCode::FORBIDDEN => FoodBuddyError::AccessDenied,
        s if s.is_server_error() => FoodBuddyError::ServerError,
        s => {
            let body: String = body.trim().chars().take(ERROR_BODY_MAX_CHARS).collect();
            if body.is_empty() {
                FoodBuddyError::ApiCall(format!("HTTP {}", s.as_u16()))
            } else {
                FoodBuddyError::ApiCall(format!("HTTP {}: {}", s.as_u16(), body))
            }
        }
    }
}
