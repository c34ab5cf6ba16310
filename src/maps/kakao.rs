use super::{Coordinates, MapProvider};
use crate::config::Config;
use crate::error::{FoodBuddyError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const KAKAO_ADDRESS_URL: &str = "https://dapi.kakao.com/v2/local/search/address.json";

/// 카카오 로컬 주소 검색
pub struct KakaoMapProvider {
    client: Client,
    api_key: String,
    endpoint: String,
    timeout: Duration,
}

impl KakaoMapProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            endpoint: KAKAO_ADDRESS_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.kakao_api_key()?).with_timeout(config.request_timeout()))
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Deserialize)]
struct AddressSearchResponse {
    #[serde(default)]
    documents: Vec<AddressDocument>,
}

/// x = 경도, y = 위도 (문자열)
#[derive(Deserialize)]
struct AddressDocument {
    x: String,
    y: String,
}

fn first_coordinates(response: AddressSearchResponse) -> Result<Option<Coordinates>> {
    let Some(doc) = response.documents.into_iter().next() else {
        return Ok(None);
    };
    let parse = |v: &str| {
        v.trim()
            .parse::<f64>()
            .map_err(|_| FoodBuddyError::ApiParse(format!("좌표 형식 오류: {}", v)))
    };
    Ok(Some(Coordinates {
        latitude: parse(&doc.y)?,
        longitude: parse(&doc.x)?,
    }))
}

#[async_trait]
impl MapProvider for KakaoMapProvider {
    fn name(&self) -> &str {
        "kakao"
    }

    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", address)])
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FoodBuddyError::ApiCall(format!("카카오 주소 검색 실패: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FoodBuddyError::ApiCall(format!(
                "카카오 주소 검색 오류 {}: {}",
                status, body
            )));
        }

        let parsed: AddressSearchResponse = response
            .json()
            .await
            .map_err(|e| FoodBuddyError::ApiParse(e.to_string()))?;
        first_coordinates(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_coordinates() {
        let response: AddressSearchResponse = serde_json::from_str(
            r#"{
                "meta": {"total_count": 1},
                "documents": [{"address_name": "서울 중구 세종대로 110", "x": "126.978", "y": "37.5665"}]
            }"#,
        )
        .unwrap();
        let coords = first_coordinates(response).unwrap().unwrap();
        assert_eq!(coords.latitude, 37.5665);
        assert_eq!(coords.longitude, 126.978);
    }

    #[test]
    fn test_no_documents() {
        let response: AddressSearchResponse = serde_json::from_str(r#"{"documents": []}"#).unwrap();
        assert!(first_coordinates(response).unwrap().is_none());
    }

    #[test]
    fn test_bad_coordinate() {
        let response: AddressSearchResponse =
            serde_json::from_str(r#"{"documents": [{"x": "east", "y": "37.5"}]}"#).unwrap();
        assert!(first_coordinates(response).is_err());
    }
}
