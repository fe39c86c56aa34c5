//! 채팅 라인 필터.
//!
//! 로그 라인에서 발신자와 메시지 본문을 추출한다. 패턴이 설정되면
//! 매칭되지 않는 라인은 비채팅 라인으로 간주해 규칙 검사에서 제외된다.

use regex::Regex;

use crate::error::MonitorError;

/// 채팅 라인에서 추출한 발신자와 본문.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// 발신자 이름. 선행 장식 문자(길드 태그 구분 기호 등)는 제거된다.
    pub player: String,
    /// 메시지 본문.
    pub body: String,
}

/// 채팅 라인 추출 필터.
///
/// 패턴은 최소 두 개의 캡처 그룹을 가져야 한다. 첫 번째가 발신자,
/// 두 번째가 본문이다.
#[derive(Debug, Clone)]
pub struct ChatFilter {
    pattern: Regex,
}

impl ChatFilter {
    /// 패턴을 컴파일한다. 캡처 그룹이 두 개 미만이면 실패한다.
    pub fn new(pattern: &str) -> Result<Self, MonitorError> {
        let regex = Regex::new(pattern)?;
        if regex.captures_len() < 3 {
            // captures_len은 전체 매치를 포함하므로 그룹 2개면 3이다.
            return Err(MonitorError::Pattern {
                reason: format!(
                    "pattern must have at least two capture groups (player, body), got {}",
                    regex.captures_len() - 1
                ),
            });
        }
        Ok(Self { pattern: regex })
    }

    /// 라인에서 채팅 메시지를 추출한다. 채팅 라인이 아니면 `None`.
    pub fn extract(&self, line: &str) -> Option<ChatMessage> {
        let caps = self.pattern.captures(line)?;
        let raw_player = caps.get(1)?.as_str();
        let body = caps.get(2)?.as_str();
        let player = raw_player
            .trim()
            .trim_start_matches(|c: char| !c.is_alphanumeric())
            .to_string();
        if player.is_empty() {
            return None;
        }
        Some(ChatMessage {
            player,
            body: body.to_string(),
        })
    }
}

// ─── 테스트 ───
