//! 스팸 규칙 컴파일과 매칭.
//!
//! [`SpamLists`]에서 [`RuleSet`]을 컴파일한다. 컴파일은 순수 함수라
//! 실패해도 기존 활성 세트에 영향이 없고, 리로드는 새 세트로의
//! 전면 교체로만 이뤄진다.

mod lists;
mod patterns;

pub use lists::SpamLists;

use tracing::{debug, info};

use spamcull_core::RuleKind;

use crate::error::MonitorError;

use patterns::{CouponMatcher, CurrencyMatcher, HandleMatcher, UrlMatcher};

/// 한 라인에서 발생한 단일 카테고리 매칭.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    /// 매칭된 규칙 카테고리.
    pub kind: RuleKind,
    /// 매칭 근거 토큰.
    pub matched: Vec<String>,
}

/// 컴파일된 규칙 세트.
///
/// 목록이 비어 있는 카테고리는 비활성(`None`)으로 컴파일된다.
/// 화폐/쿠폰 매처는 목록이 필요 없어 항상 활성이다.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    url: Option<UrlMatcher>,
    handle: Option<HandleMatcher>,
    currency: Option<CurrencyMatcher>,
    coupon: Option<CouponMatcher>,
}

impl RuleSet {
    /// 목록에서 규칙 세트를 컴파일한다.
    pub fn compile(lists: &SpamLists) -> Result<Self, MonitorError> {
        let url = if lists.hosts.is_empty() {
            None
        } else {
            Some(UrlMatcher::new(lists.hosts.clone())?)
        };
        let handle = if lists.handles.is_empty() {
            None
        } else {
            Some(HandleMatcher::new(lists.handles.clone())?)
        };
        let set = Self {
            url,
            handle,
            currency: Some(CurrencyMatcher::new()?),
            coupon: Some(CouponMatcher::new()?),
        };
        info!(
            url = set.url.is_some(),
            discord_handle = set.handle.is_some(),
            "rule set compiled"
        );
        Ok(set)
    }

    /// 라인을 모든 활성 카테고리에 대해 검사한다.
    ///
    /// 검사 순서는 url, discord_handle, currency_offer, coupon_code로
    /// 고정이며, 카테고리당 최대 한 개의 히트만 낸다. 한 카테고리의
    /// 매칭 여부는 다른 카테고리에 영향이 없다.
    pub fn matches(&self, body: &str) -> Vec<RuleHit> {
        let body = body.to_lowercase();
        let mut hits = Vec::new();

        if let Some(m) = &self.url {
            push_hit(&mut hits, RuleKind::Url, m.matches(&body));
        }
        if let Some(m) = &self.handle {
            push_hit(&mut hits, RuleKind::DiscordHandle, m.matches(&body));
        }
        if let Some(m) = &self.currency {
            push_hit(&mut hits, RuleKind::CurrencyOffer, m.matches(&body));
        }
        if let Some(m) = &self.coupon {
            push_hit(&mut hits, RuleKind::CouponCode, m.matches(&body));
        }

        if !hits.is_empty() {
            debug!(categories = hits.len(), "rule hits for line");
        }
        hits
    }
}

fn push_hit(hits: &mut Vec<RuleHit>, kind: RuleKind, matched: Vec<String>) {
    if !matched.is_empty() {
        hits.push(RuleHit { kind, matched });
    }
}

// ─── 테스트 ───
