//! 설정 관리 — spamcull.toml 파싱 및 런타임 설정
//!
//! [`SpamcullConfig`]는 데몬과 모니터 파이프라인의 설정을 담는
//! 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`SPAMCULL_MONITOR_LOG_PATH=...` 형식)
//! 3. 설정 파일 (`spamcull.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), spamcull_core::error::SpamcullError> {
//! use spamcull_core::config::SpamcullConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = SpamcullConfig::load("spamcull.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = SpamcullConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, SpamcullError};

/// Spamcull 통합 설정
///
/// `spamcull.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpamcullConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 모니터 파이프라인 설정
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 플러그인 설정
    #[serde(default)]
    pub plugins: PluginConfig,
}

impl SpamcullConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, SpamcullError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, SpamcullError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SpamcullError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                SpamcullError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, SpamcullError> {
        toml::from_str(toml_str).map_err(|e| {
            SpamcullError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `SPAMCULL_{SECTION}_{FIELD}`
    /// 예: `SPAMCULL_MONITOR_LOG_PATH=/games/poe2/Client.txt`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "SPAMCULL_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "SPAMCULL_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_dir, "SPAMCULL_GENERAL_LOG_DIR");

        // Monitor
        override_string(&mut self.monitor.log_path, "SPAMCULL_MONITOR_LOG_PATH");
        override_u64(
            &mut self.monitor.poll_interval_ms,
            "SPAMCULL_MONITOR_POLL_INTERVAL_MS",
        );
        override_usize(
            &mut self.monitor.max_line_length,
            "SPAMCULL_MONITOR_MAX_LINE_LENGTH",
        );
        override_u64(
            &mut self.monitor.retry_backoff_ms,
            "SPAMCULL_MONITOR_RETRY_BACKOFF_MS",
        );
        override_u32(
            &mut self.monitor.max_consecutive_failures,
            "SPAMCULL_MONITOR_MAX_CONSECUTIVE_FAILURES",
        );
        override_bool(
            &mut self.monitor.read_from_start,
            "SPAMCULL_MONITOR_READ_FROM_START",
        );
        override_string(&mut self.monitor.host_list, "SPAMCULL_MONITOR_HOST_LIST");
        override_string(
            &mut self.monitor.handle_list,
            "SPAMCULL_MONITOR_HANDLE_LIST",
        );
        override_string(
            &mut self.monitor.chat_pattern,
            "SPAMCULL_MONITOR_CHAT_PATTERN",
        );

        // Plugins
        override_csv(&mut self.plugins.enabled, "SPAMCULL_PLUGINS_ENABLED");
        override_u64(
            &mut self.plugins.invoke_timeout_ms,
            "SPAMCULL_PLUGINS_INVOKE_TIMEOUT_MS",
        );
        override_string(&mut self.plugins.report_path, "SPAMCULL_PLUGINS_REPORT_PATH");
        override_string(
            &mut self.plugins.ignore_list_path,
            "SPAMCULL_PLUGINS_IGNORE_LIST_PATH",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), SpamcullError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.monitor.log_path.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "monitor.log_path".to_owned(),
                reason: "log path must not be empty".to_owned(),
            }
            .into());
        }

        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.poll_interval_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.monitor.max_line_length == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.max_line_length".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.monitor.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "monitor.max_consecutive_failures".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        if self.plugins.invoke_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "plugins.invoke_timeout_ms".to_owned(),
                reason: "must be greater than 0".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 탐지 로그 파일 디렉토리 (빈 문자열이면 파일 싱크 비활성화)
    pub log_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            log_dir: String::new(),
        }
    }
}

/// 모니터 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// 감시할 게임 클라이언트 로그 파일 경로
    pub log_path: String,
    /// 파일 상태 체크 주기 (밀리초)
    pub poll_interval_ms: u64,
    /// 최대 라인 길이 (바이트, 초과분은 잘라냄)
    pub max_line_length: usize,
    /// 일시적 I/O 실패 시 재시도 백오프 (밀리초)
    pub retry_backoff_ms: u64,
    /// 연속 실패 허용 횟수 (초과 시 치명적 에러)
    pub max_consecutive_failures: u32,
    /// 파일 처음부터 읽기 (기본: 현재 끝부터)
    pub read_from_start: bool,
    /// 스팸 호스트 목록 파일 경로
    pub host_list: String,
    /// 스팸 Discord 핸들 목록 파일 경로
    pub handle_list: String,
    /// 채팅 라인 추출 정규식 (빈 문자열이면 전체 라인 매칭)
    ///
    /// 캡처 그룹 1 = 발신자, 그룹 2 = 메시지 본문.
    pub chat_pattern: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_path: "Client.txt".to_owned(),
            poll_interval_ms: 500,
            max_line_length: 64 * 1024, // 64KB
            retry_backoff_ms: 1000,
            max_consecutive_failures: 10,
            read_from_start: false,
            host_list: "spam_hosts.txt".to_owned(),
            handle_list: "spam_discord.txt".to_owned(),
            chat_pattern: String::new(),
        }
    }
}

/// 플러그인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// 활성화할 플러그인 이름 (호출 순서)
    pub enabled: Vec<String>,
    /// 플러그인 호출당 타임아웃 (밀리초)
    pub invoke_timeout_ms: u64,
    /// jsonl_report 플러그인 출력 파일
    pub report_path: String,
    /// ignore_list 플러그인 출력 파일
    pub ignore_list_path: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            enabled: vec!["echo".to_owned()],
            invoke_timeout_ms: 5000,
            report_path: "detections.jsonl".to_owned(),
            ignore_list_path: "ignore_list.txt".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u32(target: &mut u32, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u32>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u32 from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect();
    }
}
