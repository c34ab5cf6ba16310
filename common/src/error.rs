//! 에러 타입 정의

use thiserror::Error;

/// 공통 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("입력값 오류: {0}")]
    Validation(String),

    #[error("별점은 1~5 사이여야 합니다: {0}")]
    InvalidRating(i64),

    #[error("알 수 없는 말투: {0}")]
    UnknownTone(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Wizard(#[from] crate::wizard::WizardError),
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::Io(io_error);
        let display = format!("{}", error);
        assert!(display.contains("IO error"));
        assert!(display.contains("file not found"));
    }

    #[test]
    fn test_error_display_validation() {
        let error = Error::Validation("닉네임은 필수입니다.".to_string());
        assert_eq!(format!("{}", error), "입력값 오류: 닉네임은 필수입니다.");
    }

    #[test]
    fn test_error_display_rating() {
        let error = Error::InvalidRating(7);
        assert!(format!("{}", error).contains('7'));
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_from_wizard() {
        let error: Error = crate::wizard::WizardError::RatingMissing.into();
        assert!(matches!(error, Error::Wizard(_)));
        assert!(!format!("{}", error).is_empty());
    }
}
