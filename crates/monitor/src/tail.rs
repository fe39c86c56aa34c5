//! 로그 파일 tail 리더.
//!
//! 단일 로그 파일을 오프셋 기반으로 추적한다. 파일 교체(rotation),
//! 잘림(truncation), 일시적 부재를 감지해 자동 복구하고,
//! 개행으로 끝나지 않은 부분 라인은 다음 폴까지 보관한다.

use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info, warn};

use spamcull_core::LogLine;

use crate::config::MonitorSettings;
use crate::error::MonitorError;

/// 한 번의 폴에서 읽는 최대 바이트 수. 긴 백로그가 루프를 독점하지 않게 한다.
const MAX_READ_PER_POLL: u64 = 1024 * 1024;

/// 파일 동일성 판별 키. 교체(rotation) 감지에 쓴다.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity(u64);

impl FileIdentity {
    #[cfg(unix)]
    fn of(meta: &std::fs::Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self(meta.ino()))
    }

    #[cfg(not(unix))]
    fn of(meta: &std::fs::Metadata) -> Option<Self> {
        // inode가 없는 플랫폼은 생성 시각으로 대체한다.
        let created = meta.created().ok()?;
        let nanos = created
            .duration_since(std::time::UNIX_EPOCH)
            .ok()?
            .as_nanos();
        Some(Self(nanos as u64))
    }
}

/// tail 진행 상태.
#[derive(Debug, Default)]
struct TailState {
    /// 다음 읽기 시작 오프셋.
    offset: u64,
    /// 마지막으로 관측한 파일 동일성 키.
    identity: Option<FileIdentity>,
    /// 개행으로 끝나지 않은 마지막 조각.
    partial: Vec<u8>,
}

/// 단일 로그 파일 tail 리더.
///
/// [`poll`](TailReader::poll)을 반복 호출하면 새로 추가된 완전한 라인을
/// [`LogLine`]으로 돌려준다. 일시적 오류는 내부에서 백오프로 흡수하고,
/// 연속 실패가 한도를 넘으면 [`MonitorError::RetriesExhausted`]를 반환한다.
pub struct TailReader {
    path: PathBuf,
    max_line_length: usize,
    read_from_start: bool,
    retry_backoff: Duration,
    max_consecutive_failures: u32,
    state: TailState,
    consecutive_failures: u32,
}

impl TailReader {
    /// 설정으로 리더를 만든다. 파일은 첫 폴에서 연다.
    pub fn new(settings: &MonitorSettings) -> Self {
        Self {
            path: settings.log_path.clone(),
            max_line_length: settings.max_line_length,
            read_from_start: settings.read_from_start,
            retry_backoff: settings.retry_backoff,
            max_consecutive_failures: settings.max_consecutive_failures,
            state: TailState::default(),
            consecutive_failures: 0,
        }
    }

    /// 추적 대상 경로.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 초기 오프셋을 잡는다. 파일이 이미 존재하면 기본은 EOF에서 시작해
    /// 과거 내용을 건너뛴다. 파일이 없으면 나중에 생길 때 처음부터 읽는다.
    pub async fn open(&mut self) -> Result<(), MonitorError> {
        match tokio::fs::metadata(&self.path).await {
            Ok(meta) => {
                self.state.identity = FileIdentity::of(&meta);
                self.state.offset = if self.read_from_start { 0 } else { meta.len() };
                info!(
                    path = %self.path.display(),
                    offset = self.state.offset,
                    "tail reader opened"
                );
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %self.path.display(), "log file not present yet, waiting");
                self.state = TailState::default();
                Ok(())
            }
            Err(err) => Err(MonitorError::Tail {
                path: self.path.clone(),
                reason: err.to_string(),
            }),
        }
    }

    /// 새로 추가된 완전한 라인을 읽는다.
    ///
    /// 일시적 오류(파일 부재 포함)는 선형 백오프 후 빈 결과로 흡수한다.
    /// 연속 실패가 `max_consecutive_failures`를 넘으면 치명적 오류를 반환한다.
    pub async fn poll(&mut self) -> Result<Vec<LogLine>, MonitorError> {
        match self.poll_inner().await {
            Ok(lines) => {
                self.consecutive_failures = 0;
                Ok(lines)
            }
            Err(err) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures > self.max_consecutive_failures {
                    return Err(MonitorError::RetriesExhausted {
                        path: self.path.clone(),
                        attempts: self.consecutive_failures,
                    });
                }
                warn!(
                    path = %self.path.display(),
                    attempt = self.consecutive_failures,
                    error = %err,
                    "tail poll failed, backing off"
                );
                let backoff = self.retry_backoff * self.consecutive_failures;
                tokio::time::sleep(backoff).await;
                Ok(Vec::new())
            }
        }
    }

    async fn poll_inner(&mut self) -> Result<Vec<LogLine>, MonitorError> {
        let meta = match tokio::fs::metadata(&self.path).await {
            Ok(meta) => meta,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                // 파일이 사라진 경우. 다시 생기면 처음부터 읽는다.
                if self.state.identity.is_some() {
                    warn!(path = %self.path.display(), "log file disappeared, waiting for it to return");
                    self.state = TailState::default();
                }
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(MonitorError::Tail {
                    path: self.path.clone(),
                    reason: err.to_string(),
                });
            }
        };

        let identity = FileIdentity::of(&meta);
        if self.state.identity.is_some() && identity != self.state.identity {
            // 같은 경로에 다른 파일이 놓였다. 새 파일은 처음부터 읽는다.
            info!(path = %self.path.display(), "log file replaced, reading new file from start");
            self.state = TailState::default();
        }
        self.state.identity = identity;

        let len = meta.len();
        if len < self.state.offset {
            warn!(
                path = %self.path.display(),
                old_offset = self.state.offset,
                new_len = len,
                "log file truncated, resetting position"
            );
            self.state.offset = 0;
            self.state.partial.clear();
        }

        if len == self.state.offset {
            return Ok(Vec::new());
        }

        let to_read = (len - self.state.offset).min(MAX_READ_PER_POLL);
        let mut file =
            tokio::fs::File::open(&self.path)
                .await
                .map_err(|err| MonitorError::Tail {
                    path: self.path.clone(),
                    reason: err.to_string(),
                })?;
        file.seek(SeekFrom::Start(self.state.offset))
            .await
            .map_err(|err| MonitorError::Tail {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;
        let mut buf = Vec::with_capacity(to_read as usize);
        (&mut file)
            .take(to_read)
            .read_to_end(&mut buf)
            .await
            .map_err(|err| MonitorError::Tail {
                path: self.path.clone(),
                reason: err.to_string(),
            })?;

        debug!(
            path = %self.path.display(),
            offset = self.state.offset,
            bytes = buf.len(),
            "read log chunk"
        );

        Ok(self.split_lines(buf))
    }

    /// 읽은 청크를 완전한 라인으로 쪼갠다. 마지막 미완성 조각은 보관한다.
    fn split_lines(&mut self, buf: Vec<u8>) -> Vec<LogLine> {
        let partial_len = self.state.partial.len() as u64;
        let read_base = self.state.offset;
        self.state.offset += buf.len() as u64;

        let mut data = std::mem::take(&mut self.state.partial);
        data.extend_from_slice(&buf);

        let mut lines = Vec::new();
        let mut start = 0usize;
        while let Some(pos) = data[start..].iter().position(|&b| b == b'\n') {
            let end = start + pos;
            let mut raw = &data[start..end];
            if raw.last() == Some(&b'\r') {
                raw = &raw[..raw.len() - 1];
            }
            // 이 라인이 시작된 파일 내 오프셋.
            let line_offset = read_base - partial_len + start as u64;
            let text = self.decode_line(raw, line_offset);
            lines.push(LogLine::new(text, line_offset));
            start = end + 1;
        }

        // 개행 없는 잔여분은 다음 폴을 위해 보관하되, 메모리 점유를 제한한다.
        let mut rest = data.split_off(start);
        if rest.len() > self.max_line_length {
            rest.truncate(self.max_line_length);
        }
        self.state.partial = rest;

        lines
    }

    fn decode_line(&self, raw: &[u8], line_offset: u64) -> String {
        let raw = if raw.len() > self.max_line_length {
            warn!(
                path = %self.path.display(),
                offset = line_offset,
                length = raw.len(),
                limit = self.max_line_length,
                "line exceeds maximum length, truncating"
            );
            &raw[..self.max_line_length]
        } else {
            raw
        };
        String::from_utf8_lossy(raw).into_owned()
    }
}

// ─── 테스트 ───
