use crate::error::{FoodBuddyError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_API_URL: &str = "FOODBUDDY_API_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_KAKAO_API_KEY: &str = "KAKAO_REST_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 백엔드 주소
    pub api_base_url: String,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub kakao_api_key: Option<String>,
    /// 업로드 전 축소할 긴 변의 최대 픽셀
    pub max_image_size: u32,
    pub jpeg_quality: u8,
    pub request_timeout_seconds: u64,
    /// OCR은 처리 시간이 길어 별도 타임아웃
    pub ocr_timeout_seconds: u64,
    /// 리뷰 생성(OpenAI) 요청 타임아웃
    pub generation_timeout_seconds: u64,
    /// 공유 시 리뷰 본문을 stdin으로 넘길 명령 (예: "pbcopy")
    pub share_command: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            openai_api_key: None,
            openai_model: "gpt-3.5-turbo".into(),
            openai_base_url: "https://api.openai.com/v1".into(),
            kakao_api_key: None,
            max_image_size: 1024,
            jpeg_quality: 80,
            request_timeout_seconds: 10,
            ocr_timeout_seconds: 60,
            generation_timeout_seconds: 60,
            share_command: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// `~/.config/foodbuddy`
    pub fn config_dir() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| FoodBuddyError::Config("홈 디렉터리를 찾을 수 없습니다".into()))?;
        Ok(home.join(".config").join("foodbuddy"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    pub fn api_base_url(&self) -> String {
        // 환경 변수 우선
        let url = std::env::var(ENV_API_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone());
        normalize_base_url(&url)
    }

    pub fn openai_api_key(&self) -> Result<String> {
        env_or(ENV_OPENAI_API_KEY, &self.openai_api_key).ok_or(FoodBuddyError::MissingApiKey("OpenAI API"))
    }

    pub fn kakao_api_key(&self) -> Result<String> {
        env_or(ENV_KAKAO_API_KEY, &self.kakao_api_key).ok_or(FoodBuddyError::MissingApiKey("Kakao REST API"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn ocr_timeout(&self) -> Duration {
        Duration::from_secs(self.ocr_timeout_seconds)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_seconds)
    }

    /// `config --set KEY VALUE`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let optional = |v: &str| Some(v.trim().to_string()).filter(|v| !v.is_empty());
        match key {
            "api_base_url" => self.api_base_url = value.trim().to_string(),
            "openai_api_key" => self.openai_api_key = optional(value),
            "openai_model" => self.openai_model = value.trim().to_string(),
            "openai_base_url" => self.openai_base_url = value.trim().to_string(),
            "kakao_api_key" => self.kakao_api_key = optional(value),
            "max_image_size" => self.max_image_size = parse_number(key, value)?,
            "jpeg_quality" => {
                let quality: u8 = parse_number(key, value)?;
                if !(1..=100).contains(&quality) {
                    return Err(FoodBuddyError::Config("jpeg_quality는 1~100 사이여야 합니다".into()));
                }
                self.jpeg_quality = quality;
            }
            "request_timeout_seconds" => self.request_timeout_seconds = parse_number(key, value)?,
            "ocr_timeout_seconds" => self.ocr_timeout_seconds = parse_number(key, value)?,
            "generation_timeout_seconds" => {
                self.generation_timeout_seconds = parse_number(key, value)?
            }
            "share_command" => self.share_command = optional(value),
            _ => return Err(FoodBuddyError::Config(format!("알 수 없는 설정 키: {}", key))),
        }
        Ok(())
    }
}

/// 앞뒤 공백과 끝의 `/`를 떼어낸다
pub fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn env_or(name: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| fallback.clone().filter(|v| !v.trim().is_empty()))
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| FoodBuddyError::Config(format!("{}: 숫자가 아닙니다: {}", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_image_size, 1024);
        assert_eq!(config.jpeg_quality, 80);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.ocr_timeout(), Duration::from_secs(60));
        assert_eq!(config.generation_timeout(), Duration::from_secs(60));
        assert_eq!(config.openai_model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"max_image_size": 800}"#).unwrap();
        assert_eq!(config.max_image_size, 800);
        assert_eq!(config.ocr_timeout_seconds, 60);
    }

    #[test]
    fn test_set_value() {
        let mut config = Config::default();
        config.set_value("jpeg_quality", "70").unwrap();
        config.set_value("share_command", "pbcopy").unwrap();
        config.set_value("kakao_api_key", "  ").unwrap();
        assert_eq!(config.jpeg_quality, 70);
        assert_eq!(config.share_command.as_deref(), Some("pbcopy"));
        assert!(config.kakao_api_key.is_none());

        assert!(config.set_value("jpeg_quality", "0").is_err());
        assert!(config.set_value("max_image_size", "big").is_err());
        assert!(config.set_value("unknown", "1").is_err());
    }

    #[test]
    fn test_timeouts_are_independent() {
        let mut config = Config::default();
        config.set_value("generation_timeout_seconds", "15").unwrap();
        assert_eq!(config.generation_timeout(), Duration::from_secs(15));
        assert_eq!(config.ocr_timeout(), Duration::from_secs(60));
        assert!(config.set_value("generation_timeout_seconds", "-1").is_err());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://api.test/"), "http://api.test");
        assert_eq!(normalize_base_url(" http://api.test// "), "http://api.test");
        assert_eq!(normalize_base_url("http://api.test"), "http://api.test");
    }
}
