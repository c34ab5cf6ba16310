use foodbuddy_common::WizardError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FoodBuddyError {
    #[error("설정 오류: {0}")]
    Config(String),

    #[error("{0} 키가 설정되지 않았습니다. `foodbuddy config` 로 설정해주세요")]
    MissingApiKey(&'static str),

    #[error("파일을 찾을 수 없습니다: {0}")]
    FileNotFound(String),

    #[error("지원하지 않는 이미지 형식입니다: {0} (jpg, jpeg, png, webp만 가능)")]
    UnsupportedImage(String),

    #[error("이미지 처리 오류: {0}")]
    ImageProcessing(String),

    #[error("로그인이 필요합니다. 다시 로그인해주세요")]
    Unauthorized,

    #[error("접근 권한이 없습니다")]
    AccessDenied,

    #[error("서버 오류가 발생했습니다. 잠시 후 다시 시도해주세요")]
    ServerError,

    #[error("API 호출 오류: {0}")]
    ApiCall(String),

    #[error("API 응답 파싱 실패: {0}")]
    ApiParse(String),

    #[error("입력 오류: {0}")]
    Interaction(String),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Common(#[from] foodbuddy_common::Error),

    #[error("JSON 오류: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO 오류: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for FoodBuddyError {
    fn from(err: dialoguer::Error) -> Self {
        FoodBuddyError::Interaction(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FoodBuddyError>;
