//! 에러 타입 — 도메인별 에러 정의

/// Spamcull 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum SpamcullError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 모니터 파이프라인 에러 (tail/rule/dispatch)
    #[error("monitor error: {0}")]
    Monitor(String),

    /// 플러그인 에러
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 플러그인 에러
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// 동일한 이름의 플러그인이 이미 등록됨
    #[error("plugin already registered: {name}")]
    AlreadyRegistered { name: String },

    /// 등록되지 않은 플러그인 이름
    #[error("plugin not found: {name}")]
    NotFound { name: String },

    /// 지원하지 않는 트리거
    #[error("plugin '{name}' declares unsupported trigger '{trigger}'")]
    UnsupportedTrigger { name: String, trigger: String },

    /// 플러그인 호출 실패
    #[error("plugin '{name}' failed: {reason}")]
    Invocation { name: String, reason: String },

    /// 플러그인 호출 시간 초과
    #[error("plugin '{name}' timed out after {timeout_ms}ms")]
    Timeout { name: String, timeout_ms: u64 },
}
