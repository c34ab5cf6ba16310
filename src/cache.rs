//! OCR 결과 캐시
//!
//! 이미지 바이트의 SHA-256을 키로 OCR 결과를 저장해
//! 같은 영수증을 다시 업로드하지 않는다.

use crate::error::Result;
use foodbuddy_common::ReceiptFields;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

const CACHE_FILE_NAME: &str = ".foodbuddy-ocr-cache.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrCache {
    /// 버전 (호환성 체크용)
    version: u32,
    /// 이미지 해시 → OCR 결과
    entries: HashMap<String, CacheEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub file_name: String,
    pub file_size: u64,
    pub fields: ReceiptFields,
}

impl OcrCache {
    const CURRENT_VERSION: u32 = 1;

    pub fn cache_path(dir: &Path) -> PathBuf {
        dir.join(CACHE_FILE_NAME)
    }

    /// 캐시 파일 읽기. 없거나 손상되었거나 버전이 다르면 빈 캐시.
    pub fn load(dir: &Path) -> Self {
        let cache_path = Self::cache_path(dir);
        let file = match File::open(&cache_path) {
            Ok(f) => f,
            Err(_) => return Self::default(),
        };

        match serde_json::from_reader::<_, OcrCache>(BufReader::new(file)) {
            Ok(cache) if cache.version == Self::CURRENT_VERSION => cache,
            Ok(cache) => {
                tracing::warn!(found = cache.version, "캐시 버전 불일치, 새로 만듭니다");
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "캐시 파일이 손상되어 무시합니다");
                Self::default()
            }
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        let file = File::create(Self::cache_path(dir))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn get(&self, hash: &str) -> Option<&ReceiptFields> {
        self.entries.get(hash).map(|e| &e.fields)
    }

    pub fn insert(&mut self, hash: String, file_name: String, file_size: u64, fields: ReceiptFields) {
        self.entries.insert(
            hash,
            CacheEntry {
                file_name,
                file_size,
                fields,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 캐시 파일 삭제. 파일이 있었으면 true.
    pub fn clear(dir: &Path) -> Result<bool> {
        let cache_path = Self::cache_path(dir);
        if cache_path.exists() {
            std::fs::remove_file(cache_path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl Default for OcrCache {
    fn default() -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            entries: HashMap::new(),
        }
    }
}

/// 이미지 바이트의 SHA-256 (hex)
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
