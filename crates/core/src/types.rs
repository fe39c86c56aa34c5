//! 도메인 타입 — 탐지 파이프라인 전역에서 사용되는 공통 타입
//!
//! 모니터와 플러그인이 공유하는 데이터 구조를 정의합니다.
//! [`LogLine`]은 tail reader가 생산하고, [`Detection`]은 규칙 매칭이
//! 생산하여 플러그인으로 전달됩니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 로그 파일에서 읽은 한 줄
///
/// tail reader가 완성된 라인 단위로만 생산합니다.
/// `offset`은 읽기 시점의 라인 시작 바이트 오프셋입니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    /// 라인 텍스트 (개행 제외, 손상 바이트는 치환됨)
    pub text: String,
    /// 소스 파일 내 라인 시작 바이트 오프셋
    pub offset: u64,
    /// 읽은 시각
    pub read_at: SystemTime,
}

impl LogLine {
    /// 새 LogLine을 생성합니다.
    pub fn new(text: impl Into<String>, offset: u64) -> Self {
        Self {
            text: text.into(),
            offset,
            read_at: SystemTime::now(),
        }
    }
}

/// 탐지 규칙 분류
///
/// 네 가지 스팸 카테고리를 나타냅니다. 평가 순서는 항상
/// `Url → DiscordHandle → CurrencyOffer → CouponCode` 입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// 스팸 호스트/URL 매칭
    Url,
    /// 알려진 Discord 핸들 매칭
    DiscordHandle,
    /// 현금 거래(RMT) 제안 매칭
    CurrencyOffer,
    /// 할인 쿠폰 코드 매칭
    CouponCode,
}

impl RuleKind {
    /// 규칙 식별자 문자열을 반환합니다.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::DiscordHandle => "discord_handle",
            Self::CurrencyOffer => "currency_offer",
            Self::CouponCode => "coupon_code",
        }
    }

    /// 카테고리 기본 심각도를 반환합니다.
    ///
    /// RMT 직결 카테고리(url, currency_offer)는 High,
    /// 나머지는 Medium입니다.
    pub fn default_severity(self) -> Severity {
        match self {
            Self::Url | Self::CurrencyOffer => Severity::High,
            Self::DiscordHandle | Self::CouponCode => Severity::Medium,
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Info < Low < Medium < High < Critical`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 정보성 이벤트
    #[default]
    Info,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 — 즉시 대응 필요
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "Info"),
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// 스팸 탐지 결과
///
/// 하나의 규칙이 하나의 라인에 매칭될 때 생성됩니다.
/// 불변 값이며, 플러그인마다 복제본이 전달됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// 탐지 고유 ID (UUID v4)
    pub id: String,
    /// 매칭된 규칙 분류
    pub rule: RuleKind,
    /// 매칭된 부분 문자열 목록
    pub matched: Vec<String>,
    /// 채팅 발신자 (채팅 필터가 활성화된 경우)
    pub player: Option<String>,
    /// 원본 로그 라인 전체 (감사/로깅용)
    pub line: String,
    /// 소스 파일 내 라인 오프셋
    pub offset: u64,
    /// 심각도
    pub severity: Severity,
    /// 탐지 시각
    pub detected_at: SystemTime,
}

impl Detection {
    /// 규칙 매칭 결과에서 새 Detection을 생성합니다.
    pub fn new(rule: RuleKind, matched: Vec<String>, line: &LogLine) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rule,
            matched,
            player: None,
            line: line.text.clone(),
            offset: line.offset,
            severity: rule.default_severity(),
            detected_at: SystemTime::now(),
        }
    }

    /// 발신자 이름을 설정합니다.
    pub fn with_player(mut self, player: impl Into<String>) -> Self {
        self.player = Some(player.into());
        self
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} matched={:?} player={}",
            self.severity,
            self.rule,
            self.matched,
            self.player.as_deref().unwrap_or("-"),
        )
    }
}
