//! 실행 루프 오케스트레이션.
//!
//! 단일 협력적 루프에서 tail -> (chat) -> rule -> plugin 순으로
//! 라인을 처리한다. 활성 규칙/플러그인 세트는 watch 채널로 전달되고,
//! 라인 경계에서만 스냅샷을 떠서 리로드가 라인 중간에 끼어들지 않게 한다.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, error, info};

use spamcull_core::{Detection, LogLine, PluginSet};

use crate::chat::ChatFilter;
use crate::config::MonitorSettings;
use crate::error::MonitorError;
use crate::rule::RuleSet;
use crate::tail::TailReader;

/// 한 시점의 활성 규칙 + 플러그인 세트.
///
/// 리로드는 이 구조체를 통째로 교체하는 것으로만 이뤄진다.
/// 한 라인은 하나의 스냅샷으로만 처리된다.
#[derive(Clone, Default)]
pub struct ActiveSet {
    pub rules: Arc<RuleSet>,
    pub plugins: PluginSet,
}

/// 디스패처 수명주기 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Idle,
    Running,
    Stopping,
    Stopped,
    Fatal,
}

/// 처리 누계.
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchStats {
    pub lines_processed: u64,
    pub detections_dispatched: u64,
}

/// 파이프라인 실행 루프.
pub struct Dispatcher {
    reader: TailReader,
    chat: Option<ChatFilter>,
    poll_interval: Duration,
    invoke_timeout: Duration,
    active_rx: watch::Receiver<ActiveSet>,
    shutdown_rx: watch::Receiver<bool>,
    state: DispatcherState,
    stats: DispatchStats,
}

impl Dispatcher {
    /// 디스패처를 만든다. 채팅 패턴이 설정돼 있으면 필터를 컴파일한다.
    pub fn new(
        settings: &MonitorSettings,
        active_rx: watch::Receiver<ActiveSet>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Result<Self, MonitorError> {
        let chat = match &settings.chat_pattern {
            Some(pattern) => Some(ChatFilter::new(pattern)?),
            None => None,
        };
        Ok(Self {
            reader: TailReader::new(settings),
            chat,
            poll_interval: settings.poll_interval,
            invoke_timeout: settings.invoke_timeout,
            active_rx,
            shutdown_rx,
            state: DispatcherState::Idle,
            stats: DispatchStats::default(),
        })
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// 루프를 실행한다. 종료 신호를 받으면 현재 라인까지 마치고
    /// `Ok`으로 돌아오고, tail이 복구 불가능하게 실패하면 `Err`이다.
    pub async fn run(mut self) -> Result<DispatchStats, MonitorError> {
        self.reader.open().await?;
        self.state = DispatcherState::Running;
        info!(path = %self.reader.path().display(), "dispatcher started");

        loop {
            if *self.shutdown_rx.borrow() {
                self.state = DispatcherState::Stopping;
                break;
            }

            let lines = match self.reader.poll().await {
                Ok(lines) => lines,
                Err(err) => {
                    self.state = DispatcherState::Fatal;
                    error!(error = %err, "tail reader failed permanently");
                    return Err(err);
                }
            };

            if lines.is_empty() {
                tokio::select! {
                    _ = tokio::time::sleep(self.poll_interval) => {}
                    _ = self.shutdown_rx.changed() => {}
                }
                continue;
            }

            for line in lines {
                // 종료 중에도 시작한 라인은 끝까지 처리한다.
                if *self.shutdown_rx.borrow() {
                    self.state = DispatcherState::Stopping;
                    break;
                }
                self.process_line(line).await;
            }
            if self.state == DispatcherState::Stopping {
                break;
            }
        }

        self.state = DispatcherState::Stopped;
        info!(
            lines = self.stats.lines_processed,
            detections = self.stats.detections_dispatched,
            "dispatcher stopped"
        );
        Ok(self.stats)
    }

    async fn process_line(&mut self, line: LogLine) {
        self.stats.lines_processed += 1;

        // 라인 경계 스냅샷. borrow 가드는 await 전에 끝난다.
        let active = self.active_rx.borrow().clone();

        let (body, player) = match &self.chat {
            Some(filter) => match filter.extract(&line.text) {
                Some(msg) => (msg.body, Some(msg.player)),
                None => {
                    debug!(offset = line.offset, "non-chat line skipped");
                    return;
                }
            },
            None => (line.text.clone(), None),
        };

        for hit in active.rules.matches(&body) {
            let mut detection = Detection::new(hit.kind, hit.matched, &line);
            if let Some(player) = &player {
                detection = detection.with_player(player.clone());
            }
            info!(
                rule = %detection.rule,
                severity = %detection.severity,
                matched = ?detection.matched,
                player = detection.player.as_deref().unwrap_or("-"),
                line = %detection.line,
                "spam detected"
            );
            active.plugins.invoke_all(&detection, self.invoke_timeout).await;
            self.stats.detections_dispatched += 1;
        }
    }
}

// ─── 테스트 ───
