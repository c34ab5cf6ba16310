//! tracing 초기화
//!
//! 진행 상황은 stdout(println!, 스피너)으로, 로그는 stderr로 분리한다.

use tracing_subscriber::EnvFilter;

/// 전역 로거 초기화. `RUST_LOG`가 있으면 우선한다.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
