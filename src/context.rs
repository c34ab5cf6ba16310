//! 실행 컨텍스트
//!
//! 시작 시 한 번 만들어 각 명령에 넘긴다. 저장소는 교체할 수 있다
//! (CLI는 파일, 테스트는 메모리).

use crate::api::ApiClient;
use crate::config::Config;
use crate::error::Result;
use crate::store::{FileStore, KeyValueStore, Preferences, Session};
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppContext {
    pub config: Config,
    store: Arc<dyn KeyValueStore>,
}

impl AppContext {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        Self { config, store }
    }

    /// 설정 파일과 같은 디렉터리의 `store.json`을 쓴다
    pub fn load() -> Result<Self> {
        let config = Config::load()?;
        let store = FileStore::open(&Config::config_dir()?);
        tracing::debug!(store = %store.path().display(), "저장소 열기");
        Ok(Self::new(config, Arc::new(store)))
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::clone(&self.store)
    }

    pub fn session(&self) -> Session<'_> {
        Session::new(self.store.as_ref())
    }

    pub fn preferences(&self) -> Preferences<'_> {
        Preferences::new(self.store.as_ref())
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.config, self.store())
    }

    /// OCR 캐시 디렉터리
    pub fn cache_dir(&self) -> Result<PathBuf> {
        Config::config_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_session_shared_with_api_client() {
        let ctx = AppContext::new(Config::default(), Arc::new(MemoryStore::new()));
        assert!(!ctx.session().is_logged_in());

        ctx.session().save("token-1", "먹보").unwrap();
        let api = ctx.api();
        assert_eq!(api.session().access_token().as_deref(), Some("token-1"));

        api.logout().unwrap();
        assert!(!ctx.session().is_logged_in());
        assert_eq!(ctx.session().nickname(), None);
    }

    #[test]
    fn test_preferences_defaults() {
        let ctx = AppContext::new(Config::default(), Arc::new(MemoryStore::new()));
        assert!(!ctx.preferences().dark_mode());
        assert_eq!(ctx.preferences().language(), "ko");
    }
}
