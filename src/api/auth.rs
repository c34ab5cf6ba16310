//! 회원가입・로그인・내 정보

use super::ApiClient;
use crate::error::Result;
use foodbuddy_common::validation;
use serde::{Deserialize, Serialize};

/// 가입 시 기본 리뷰 말투
pub const DEFAULT_STYLE_ID: &str = "friendly";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub nickname: String,
    pub default_style_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub nickname: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub nickname: String,
    pub default_style_id: Option<String>,
    pub location_enabled: Option<String>,
    pub review_visibility: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    email: &'a str,
    nickname: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_style_id: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChangeRequest {
    pub current_password: String,
    pub new_password: String,
}

impl ApiClient {
    /// `POST /api/users/register`
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
        nickname: &str,
    ) -> Result<UserProfile> {
        validation::validate_registration(email, password, confirm_password, nickname)?;

        let request = RegisterRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
            nickname: nickname.trim().to_string(),
            default_style_id: DEFAULT_STYLE_ID.to_string(),
        };
        self.post_json("/api/users/register", &request).await
    }

    /// `POST /api/users/login`. 성공하면 토큰과 닉네임을 저장한다.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        validation::validate_login(email, password)?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response: LoginResponse = self.post_json("/api/users/login", &request).await?;
        self.session().save(&response.token, &response.nickname)?;
        tracing::info!(nickname = %response.nickname, "로그인");
        Ok(response)
    }

    pub fn logout(&self) -> Result<()> {
        self.session().clear()
    }

    /// `GET /api/users/me`
    pub async fn me(&self) -> Result<UserProfile> {
        self.get_json("/api/users/me").await
    }

    /// `PUT /api/users/me`
    ///
    /// 서버는 닉네임과 기본 말투를 함께 덮어쓰므로 현재 값을 먼저 읽어 보낸다.
    pub async fn update_nickname(&self, nickname: &str) -> Result<UserProfile> {
        validation::validate_nickname(nickname)?;

        let current = self.me().await?;
        let request = UpdateProfileRequest {
            email: &current.email,
            nickname: nickname.trim(),
            default_style_id: current.default_style_id.as_deref(),
        };
        let updated: UserProfile = self.put_json("/api/users/me", &request).await?;
        self.session().set_nickname(&updated.nickname)?;
        Ok(updated)
    }

    /// `PUT /api/users/password`. 서버 메시지를 그대로 돌려준다.
    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<String> {
        validation::validate_password_change(current, new, confirm)?;

        let request = PasswordChangeRequest {
            current_password: current.to_string(),
            new_password: new.to_string(),
        };
        self.put_text("/api/users/password", &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_wire_names() {
        let request = RegisterRequest {
            email: "a@b.com".into(),
            password: "abcd1234!".into(),
            nickname: "먹보".into(),
            default_style_id: DEFAULT_STYLE_ID.into(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"defaultStyleId\":\"friendly\""));
    }

    #[test]
    fn test_password_change_wire_names() {
        let request = PasswordChangeRequest {
            current_password: "old".into(),
            new_password: "new".into(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("currentPassword"));
        assert!(json.contains("newPassword"));
    }

    #[test]
    fn test_profile_with_nulls() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"userId": "u1", "email": "a@b.com", "nickname": "먹보", "defaultStyleId": null}"#,
        )
        .unwrap();
        assert_eq!(profile.user_id, "u1");
        assert!(profile.default_style_id.is_none());
    }
}
