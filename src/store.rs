//! 클라이언트 키-값 저장소
//!
//! 로그인 토큰과 화면 설정을 보관한다. 구현은 JSON 파일과 메모리 두 가지.

use crate::error::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const KEY_ACCESS_TOKEN: &str = "accessToken";
pub const KEY_NICKNAME: &str = "nickname";
pub const KEY_HAS_SHOWN_SPLASH: &str = "hasShownSplash";
pub const KEY_DARK_MODE: &str = "darkMode";
pub const KEY_LANGUAGE: &str = "language";

pub const DEFAULT_LANGUAGE: &str = "ko";

const STORE_FILE_NAME: &str = "store.json";

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn lock(map: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    // 패닉한 스레드가 남긴 맵도 그대로 사용
    map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 테스트와 일회성 실행용
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries).remove(key);
        Ok(())
    }
}

/// JSON 파일 저장소. 변경할 때마다 파일 전체를 다시 쓴다.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// 디렉터리 안의 저장소 파일을 연다. 파일이 없거나 깨져 있으면 빈 상태로 시작한다.
    pub fn open(dir: &Path) -> Self {
        let path = dir.join(STORE_FILE_NAME);
        let entries = Self::read_entries(&path).unwrap_or_default();
        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn read_entries(path: &Path) -> Option<BTreeMap<String, String>> {
        let file = File::open(path).ok()?;
        match serde_json::from_reader(BufReader::new(file)) {
            Ok(entries) => Some(entries),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "저장소 파일이 손상되어 초기화합니다");
                None
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let writer = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(writer, entries)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries);
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// 로그인 세션 (토큰과 닉네임)
pub struct Session<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> Session<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(KEY_ACCESS_TOKEN).filter(|t| !t.is_empty())
    }

    pub fn nickname(&self) -> Option<String> {
        self.store.get(KEY_NICKNAME)
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }

    pub fn save(&self, token: &str, nickname: &str) -> Result<()> {
        self.store.set(KEY_ACCESS_TOKEN, token)?;
        self.store.set(KEY_NICKNAME, nickname)
    }

    pub fn set_nickname(&self, nickname: &str) -> Result<()> {
        self.store.set(KEY_NICKNAME, nickname)
    }

    /// 토큰과 닉네임 삭제 (로그아웃, 401 응답)
    pub fn clear(&self) -> Result<()> {
        self.store.remove(KEY_ACCESS_TOKEN)?;
        self.store.remove(KEY_NICKNAME)
    }
}

/// 화면 설정 (다크 모드, 언어, 스플래시 표시 여부)
pub struct Preferences<'a> {
    store: &'a dyn KeyValueStore,
}

impl<'a> Preferences<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self { store }
    }

    fn flag(&self, key: &str) -> bool {
        self.store.get(key).as_deref() == Some("true")
    }

    pub fn dark_mode(&self) -> bool {
        self.flag(KEY_DARK_MODE)
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        self.store.set(KEY_DARK_MODE, if enabled { "true" } else { "false" })
    }

    pub fn language(&self) -> String {
        self.store
            .get(KEY_LANGUAGE)
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
    }

    pub fn set_language(&self, language: &str) -> Result<()> {
        self.store.set(KEY_LANGUAGE, language.trim())
    }

    pub fn has_shown_splash(&self) -> bool {
        self.flag(KEY_HAS_SHOWN_SPLASH)
    }

    pub fn mark_splash_shown(&self) -> Result<()> {
        self.store.set(KEY_HAS_SHOWN_SPLASH, "true")
    }

    pub fn reset_splash(&self) -> Result<()> {
        self.store.remove(KEY_HAS_SHOWN_SPLASH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::new();
        assert!(store.get(KEY_ACCESS_TOKEN).is_none());
        store.set(KEY_ACCESS_TOKEN, "t").unwrap();
        assert_eq!(store.get(KEY_ACCESS_TOKEN).as_deref(), Some("t"));
        store.remove(KEY_ACCESS_TOKEN).unwrap();
        assert!(store.get(KEY_ACCESS_TOKEN).is_none());
    }

    #[test]
    fn test_session_save_and_clear() {
        let store = MemoryStore::new();
        let session = Session::new(&store);
        assert!(!session.is_logged_in());

        session.save("jwt-token", "먹보").unwrap();
        assert!(session.is_logged_in());
        assert_eq!(session.nickname().as_deref(), Some("먹보"));

        session.clear().unwrap();
        assert!(session.access_token().is_none());
        assert!(session.nickname().is_none());
    }

    #[test]
    fn test_preferences_defaults() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(&store);
        assert!(!prefs.dark_mode());
        assert!(!prefs.has_shown_splash());
        assert_eq!(prefs.language(), "ko");
    }

    #[test]
    fn test_preferences_roundtrip() {
        let store = MemoryStore::new();
        let prefs = Preferences::new(&store);
        prefs.set_dark_mode(true).unwrap();
        prefs.set_language("en").unwrap();
        prefs.mark_splash_shown().unwrap();
        assert!(prefs.dark_mode());
        assert_eq!(prefs.language(), "en");
        assert!(prefs.has_shown_splash());

        prefs.reset_splash().unwrap();
        assert!(!prefs.has_shown_splash());
    }
}
