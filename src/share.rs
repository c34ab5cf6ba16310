//! 리뷰 공유
//!
//! 설정된 명령(예: `pbcopy`, `wl-copy`)의 stdin으로 본문을 넘긴다.
//! 명령이 없거나 실패하면 직접 복사할 수 있도록 화면에 출력한다.

use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// 명령으로 전달됨
    Command(String),
    /// 화면 출력으로 대체
    Printed,
}

/// 공유 텍스트 (식당 이름 + 리뷰)
pub fn share_text(title: &str, content: &str) -> String {
    format!("[{}]\n{}", title.trim(), content.trim())
}

pub fn share(title: &str, content: &str, command: Option<&str>) -> ShareOutcome {
    let text = share_text(title, content);

    if let Some(command) = command.map(str::trim).filter(|c| !c.is_empty()) {
        match run_share_command(command, &text) {
            Ok(()) => return ShareOutcome::Command(command.to_string()),
            Err(e) => tracing::warn!(command, error = %e, "공유 명령 실패, 화면에 출력합니다"),
        }
    }

    println!("아래 내용을 복사해 공유하세요:\n");
    println!("{}", text);
    ShareOutcome::Printed
}

fn run_share_command(command: &str, text: &str) -> std::io::Result<()> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "빈 명령"))?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    let output = child.wait_with_output()?;
    if !output.status.success() {
        return Err(std::io::Error::other(format!(
            "exit {:?}: {}",
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(())
}
