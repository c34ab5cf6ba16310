//! 즐겨찾기

use super::ApiClient;
use crate::error::Result;
use foodbuddy_common::Favorite;
use reqwest::Method;

impl ApiClient {
    /// `POST /api/favorites/{restaurantId}`
    pub async fn add_favorite(&self, restaurant_id: &str) -> Result<()> {
        self.send_empty(Method::POST, &favorite_path(restaurant_id)).await
    }

    /// `DELETE /api/favorites/{restaurantId}`
    pub async fn remove_favorite(&self, restaurant_id: &str) -> Result<()> {
        self.send_empty(Method::DELETE, &favorite_path(restaurant_id)).await
    }

    /// `GET /api/favorites/me`
    pub async fn my_favorites(&self) -> Result<Vec<Favorite>> {
        self.get_json("/api/favorites/me").await
    }

    /// `GET /api/favorites/me/{restaurantId}`
    pub async fn is_favorite(&self, restaurant_id: &str) -> Result<bool> {
        self.get_json(&format!("/api/favorites/me/{}", restaurant_id.trim()))
            .await
    }
}

fn favorite_path(restaurant_id: &str) -> String {
    format!("/api/favorites/{}", restaurant_id.trim())
}
