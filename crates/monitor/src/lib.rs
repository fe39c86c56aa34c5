#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`tail`]: 단일 로그 파일 추적 (truncation/rotation/부재 복구)
//! - [`chat`]: 채팅 라인에서 발신자와 메시지 본문 추출
//! - [`rule`]: 목록 기반 스팸 패턴 컴파일 및 매칭
//! - [`dispatch`]: 실행 루프 오케스트레이션 (상태 머신, 리로드, 종료)
//! - [`config`]: 모니터 설정 (core 설정에서 파생)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! TailReader -> ChatFilter -> RuleSet -> Dispatcher -> PluginSet
//!      |                        |                        |
//!  offset/inode 상태        목록 기반 regex        타임아웃 + 격리
//! ```

pub mod chat;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod rule;
pub mod tail;

// --- 주요 타입 re-export ---

// 디스패처
pub use dispatch::{ActiveSet, DispatchStats, Dispatcher, DispatcherState};

// 설정
pub use config::MonitorSettings;

// 에러
pub use error::MonitorError;

// 규칙
pub use rule::{RuleHit, RuleSet, SpamLists};

// tail
pub use tail::TailReader;

// 채팅 필터
pub use chat::ChatFilter;
