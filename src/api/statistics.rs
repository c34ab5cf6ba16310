use super::ApiClient;
use crate::error::Result;
use foodbuddy_common::UserStatistics;

impl ApiClient {
    /// `GET /api/statistics/me` (서버 집계)
    pub async fn my_statistics(&self) -> Result<UserStatistics> {
        self.get_json("/api/statistics/me").await
    }
}
