//! 에러 케이스 테스트
//!
//! 설정 파일 오류와 입력값 검증 에러를 검증

use foodbuddy::api::ApiClient;
use foodbuddy::config::Config;
use foodbuddy::error::FoodBuddyError;
use foodbuddy::store::MemoryStore;
use std::sync::Arc;
use tempfile::tempdir;

/// 설정 파일이 없으면 기본값
#[test]
fn test_config_missing_file_uses_defaults() {
    let dir = tempdir().expect("Failed to create temp dir");
    let config = Config::load_from(&dir.path().join("config.json")).unwrap();
    assert_eq!(config.max_image_size, 1024);
    assert_eq!(config.request_timeout_seconds, 10);
}

/// 일부 키만 있는 설정 파일
#[test]
fn test_config_partial_file() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"jpeg_quality": 60}"#).unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.jpeg_quality, 60);
    assert_eq!(config.ocr_timeout_seconds, 60);
}

/// 깨진 설정 파일은 JSON 에러
#[test]
fn test_config_invalid_json() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("config.json");
    std::fs::write(&path, "{ invalid").unwrap();

    let result = Config::load_from(&path);
    assert!(matches!(result, Err(FoodBuddyError::Json(_))));
}

/// 저장 후 다시 읽기
#[test]
fn test_config_save_and_load() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.json");

    let mut config = Config::default();
    config.set_value("share_command", "wl-copy").unwrap();
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.share_command.as_deref(), Some("wl-copy"));
}

/// 알 수 없는 키
#[test]
fn test_config_unknown_key() {
    let mut config = Config::default();
    assert!(matches!(
        config.set_value("model", "x"),
        Err(FoodBuddyError::Config(_))
    ));
}

fn offline_client() -> ApiClient {
    // 요청이 나가면 연결 실패가 난다
    let config = Config {
        api_base_url: "http://127.0.0.1:9".into(),
        request_timeout_seconds: 1,
        ..Config::default()
    };
    ApiClient::new(&config, Arc::new(MemoryStore::new()))
}

/// 입력값 검증은 네트워크 요청 전에 끝난다
#[tokio::test]
async fn test_login_validation_before_request() {
    let result = offline_client().login("not-an-email", "password1!").await;
    match result {
        Err(FoodBuddyError::Common(foodbuddy_common::Error::Validation(msg))) => {
            assert!(msg.contains("이메일"));
        }
        other => panic!("unexpected: {:?}", other.map(|r| r.nickname)),
    }
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let result = offline_client()
        .register("user@example.com", "password1!", "password2!", "먹보")
        .await;
    assert!(matches!(
        result,
        Err(FoodBuddyError::Common(foodbuddy_common::Error::Validation(_)))
    ));
}

#[tokio::test]
async fn test_weak_password_rejected() {
    let result = offline_client()
        .register("user@example.com", "password", "password", "먹보")
        .await;
    assert!(matches!(
        result,
        Err(FoodBuddyError::Common(foodbuddy_common::Error::Validation(_)))
    ));
}

#[tokio::test]
async fn test_blank_nickname_rejected() {
    let result = offline_client().update_nickname("   ").await;
    assert!(matches!(
        result,
        Err(FoodBuddyError::Common(foodbuddy_common::Error::Validation(_)))
    ));
}

/// 에러 메시지
#[test]
fn test_error_messages() {
    assert!(FoodBuddyError::Unauthorized.to_string().contains("로그인"));
    assert!(FoodBuddyError::MissingApiKey("OpenAI API").to_string().contains("OpenAI API"));
    assert!(FoodBuddyError::UnsupportedImage("a.gif".into())
        .to_string()
        .contains("a.gif"));
}
