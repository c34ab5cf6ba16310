//! 지도・주소 검색
//!
//! `MapProvider`가 주소를 좌표로 바꾼다. 기본 구현은 카카오 로컬 API.

mod kakao;

use crate::error::Result;
use async_trait::async_trait;
use foodbuddy_common::Restaurant;
use futures::future::join_all;
use serde::Serialize;
use std::collections::BTreeMap;

pub use kakao::KakaoMapProvider;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
pub trait MapProvider: Send + Sync {
    fn name(&self) -> &str;

    /// 주소 검색. 결과가 없으면 None.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinates>>;
}

/// 식당 주소를 동시에 검색해 식당 ID별로 모은다
///
/// 주소가 비어 있거나 검색에 실패한 식당은 None.
pub async fn geocode_all(
    provider: &dyn MapProvider,
    restaurants: &[Restaurant],
) -> BTreeMap<String, Option<Coordinates>> {
    let lookups = restaurants.iter().map(|restaurant| async move {
        let address = restaurant.address.trim();
        if address.is_empty() {
            return (restaurant.restaurant_id.clone(), None);
        }

        let coordinates = match provider.geocode(address).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    restaurant = %restaurant.name,
                    error = %e,
                    "주소 검색 실패"
                );
                None
            }
        };
        (restaurant.restaurant_id.clone(), coordinates)
    });

    join_all(lookups).await.into_iter().collect()
}
