use super::ApiClient;
use crate::error::Result;
use foodbuddy_common::Restaurant;

impl ApiClient {
    /// `GET /api/restaurants`
    pub async fn restaurants(&self) -> Result<Vec<Restaurant>> {
        self.get_json("/api/restaurants").await
    }
}
