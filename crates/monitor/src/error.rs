//! monitor 크레이트 에러 타입 정의.
//!
//! tail/rule/dispatch 단계에서 발생하는 에러를 구분하고,
//! 상위 [`spamcull_core::SpamcullError`]로 변환하는 경로를 제공한다.

use std::path::PathBuf;

use thiserror::Error;

use spamcull_core::SpamcullError;

/// monitor 크레이트 내부 에러.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// 로그 파일 읽기 실패 (일시적 오류 포함).
    #[error("tail failed for {path}: {reason}")]
    Tail { path: PathBuf, reason: String },

    /// 연속 읽기 실패가 허용 한도를 초과.
    #[error("tail retries exhausted for {path} after {attempts} consecutive failures")]
    RetriesExhausted { path: PathBuf, attempts: u32 },

    /// 스팸 목록 파일 로드 실패.
    #[error("failed to load list {path}: {reason}")]
    ListLoad { path: PathBuf, reason: String },

    /// 채팅 패턴이 요구 조건을 만족하지 않음.
    #[error("invalid chat pattern: {reason}")]
    Pattern { reason: String },

    /// 정규식 컴파일 실패.
    #[error("regex compile failed: {0}")]
    Regex(#[from] regex::Error),

    /// 기타 I/O 에러.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MonitorError> for SpamcullError {
    fn from(err: MonitorError) -> Self {
        SpamcullError::Monitor(err.to_string())
    }
}

// ─── 테스트 ───
