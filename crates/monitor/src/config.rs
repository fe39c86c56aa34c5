//! monitor 설정.
//!
//! core의 [`SpamcullConfig`]에서 monitor가 쓰는 값만 골라
//! 타입을 정리한(PathBuf/Duration) 설정 구조체를 만든다.

use std::path::PathBuf;
use std::time::Duration;

use spamcull_core::SpamcullConfig;

/// monitor 런타임 설정.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// 추적할 로그 파일 경로.
    pub log_path: PathBuf,
    /// 폴링 주기.
    pub poll_interval: Duration,
    /// 한 라인의 최대 길이 (바이트). 초과분은 잘린다.
    pub max_line_length: usize,
    /// 일시적 읽기 실패 후 재시도 대기 시간의 기본 단위.
    pub retry_backoff: Duration,
    /// 연속 실패 허용 횟수. 초과하면 치명적 오류로 전환.
    pub max_consecutive_failures: u32,
    /// true면 파일 처음부터 읽는다. 기본은 EOF부터 시작.
    pub read_from_start: bool,
    /// 스팸 호스트 목록 파일 경로.
    pub host_list: PathBuf,
    /// 스팸 디스코드 핸들 목록 파일 경로.
    pub handle_list: PathBuf,
    /// 채팅 라인 추출 패턴. 비어 있으면 필터 없이 전체 라인을 검사.
    pub chat_pattern: Option<String>,
    /// 플러그인 호출당 타임아웃.
    pub invoke_timeout: Duration,
}

impl MonitorSettings {
    /// core 설정에서 monitor 설정을 만든다.
    pub fn from_core(config: &SpamcullConfig) -> Self {
        let chat_pattern = if config.monitor.chat_pattern.trim().is_empty() {
            None
        } else {
            Some(config.monitor.chat_pattern.clone())
        };

        Self {
            log_path: PathBuf::from(&config.monitor.log_path),
            poll_interval: Duration::from_millis(config.monitor.poll_interval_ms),
            max_line_length: config.monitor.max_line_length,
            retry_backoff: Duration::from_millis(config.monitor.retry_backoff_ms),
            max_consecutive_failures: config.monitor.max_consecutive_failures,
            read_from_start: config.monitor.read_from_start,
            host_list: PathBuf::from(&config.monitor.host_list),
            handle_list: PathBuf::from(&config.monitor.handle_list),
            chat_pattern,
            invoke_timeout: Duration::from_millis(config.plugins.invoke_timeout_ms),
        }
    }
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self::from_core(&SpamcullConfig::default())
    }
}

// ─── 테스트 ───
