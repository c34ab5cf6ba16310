//! 입력값 검증
//!
//! 네트워크 호출 전에 회원가입・로그인・비밀번호 변경 입력을 검사한다.
//! 메시지는 서버 검증 메시지와 같은 문구를 쓴다.

use regex::Regex;

use crate::error::{Error, Result};

/// 비밀번호에 하나 이상 포함되어야 하는 특수문자
pub const PASSWORD_SPECIAL_CHARS: &str = "@$!%*#?&";

/// 비밀번호 최소 길이 (문자 수)
pub const PASSWORD_MIN_LENGTH: usize = 8;

lazy_static::lazy_static! {
    static ref EMAIL_RE: Regex =
        Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)+$").unwrap();
}

fn required(value: &str, message: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(())
}

pub fn validate_email(email: &str) -> Result<()> {
    required(email, "이메일은 필수입니다.")?;
    if !EMAIL_RE.is_match(email.trim()) {
        return Err(Error::Validation("이메일 형식이 올바르지 않습니다.".into()));
    }
    Ok(())
}

/// 8자 이상, 영문・숫자・특수문자(`@$!%*#?&`) 각 1자 이상
pub fn validate_password(password: &str) -> Result<()> {
    required(password, "비밀번호는 필수입니다.")?;

    let long_enough = password.chars().count() >= PASSWORD_MIN_LENGTH;
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c));

    if long_enough && has_letter && has_digit && has_special {
        Ok(())
    } else {
        Err(Error::Validation(
            "비밀번호는 8자 이상, 영문/숫자/특수문자를 포함해야 합니다.".into(),
        ))
    }
}

pub fn validate_nickname(nickname: &str) -> Result<()> {
    required(nickname, "닉네임은 필수입니다.")
}

/// 회원가입 입력 검증
pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
    nickname: &str,
) -> Result<()> {
    validate_email(email)?;
    validate_password(password)?;
    if password != confirm_password {
        return Err(Error::Validation("비밀번호가 일치하지 않습니다.".into()));
    }
    validate_nickname(nickname)
}

pub fn validate_login(email: &str, password: &str) -> Result<()> {
    validate_email(email)?;
    required(password, "비밀번호는 필수입니다.")
}

/// 비밀번호 변경 입력 검증
pub fn validate_password_change(current: &str, new: &str, confirm: &str) -> Result<()> {
    required(current, "기존 비밀번호는 필수입니다.")?;
    required(new, "새 비밀번호는 필수입니다.")?;
    validate_password(new)?;
    if new != confirm {
        return Err(Error::Validation(
            "새 비밀번호와 비밀번호 확인이 일치하지 않습니다.".into(),
        ));
    }
    if current == new {
        return Err(Error::Validation("현재 비밀번호와 새 비밀번호가 동일합니다.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<()>) -> String {
        match result {
            Err(Error::Validation(msg)) => msg,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email(" first.last+tag@mail.co.kr ").is_ok());
        assert_eq!(message(validate_email("")), "이메일은 필수입니다.");
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user.example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("abcd1234!").is_ok());
        assert!(validate_password("Passw0rd#").is_ok());
        // 길이 부족
        assert!(validate_password("ab1!").is_err());
        // 숫자 없음
        assert!(validate_password("abcdefgh!").is_err());
        // 영문 없음
        assert!(validate_password("12345678!").is_err());
        // 허용되지 않은 특수문자만 있음
        assert!(validate_password("abcd1234^").is_err());
    }

    #[test]
    fn test_registration() {
        assert!(validate_registration("a@b.com", "abcd1234!", "abcd1234!", "먹보").is_ok());
        assert_eq!(
            message(validate_registration("a@b.com", "abcd1234!", "abcd1234?", "먹보")),
            "비밀번호가 일치하지 않습니다."
        );
        assert_eq!(
            message(validate_registration("a@b.com", "abcd1234!", "abcd1234!", "  ")),
            "닉네임은 필수입니다."
        );
    }

    #[test]
    fn test_login_only_requires_password() {
        assert!(validate_login("a@b.com", "short").is_ok());
        assert!(validate_login("a@b.com", "").is_err());
    }

    #[test]
    fn test_password_change() {
        assert!(validate_password_change("old1234!", "new1234!", "new1234!").is_ok());
        assert_eq!(
            message(validate_password_change("", "new1234!", "new1234!")),
            "기존 비밀번호는 필수입니다."
        );
        assert_eq!(
            message(validate_password_change("old1234!", "new1234!", "new1234?")),
            "새 비밀번호와 비밀번호 확인이 일치하지 않습니다."
        );
        assert_eq!(
            message(validate_password_change("same1234!", "same1234!", "same1234!")),
            "현재 비밀번호와 새 비밀번호가 동일합니다."
        );
    }
}
