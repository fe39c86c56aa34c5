//! 카테고리별 스팸 매처.
//!
//! 모든 매처는 소문자로 정규화된 본문을 입력으로 받고, 매칭된
//! 토큰 목록을 돌려준다. 빈 벡터는 매칭 없음을 뜻한다.

use std::collections::BTreeSet;

use regex::Regex;

use crate::error::MonitorError;

/// 호스트 토큰 매처.
///
/// 스팸 판매 사이트는 점 대신 쉼표를 섞어 필터를 회피하므로
/// (`xyz,com`), 레이블 구분자로 `.`와 `,`를 모두 허용한다.
/// 설정된 호스트 항목이 토큰의 마지막이 아닌 레이블과 일치하면
/// 스팸으로 본다. TLD 자체(`com`, `net`)는 매칭 대상이 아니다.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    host_re: Regex,
    hosts: BTreeSet<String>,
}

impl UrlMatcher {
    pub fn new(hosts: BTreeSet<String>) -> Result<Self, MonitorError> {
        Ok(Self {
            host_re: Regex::new(r"[a-z0-9][a-z0-9-]*(?:[.,][a-z0-9][a-z0-9-]*)+")?,
            hosts,
        })
    }

    pub fn matches(&self, body: &str) -> Vec<String> {
        let mut hits = Vec::new();
        for token in self.host_re.find_iter(body) {
            let token = token.as_str();
            let labels: Vec<&str> = token.split(['.', ',']).collect();
            // 마지막 레이블(TLD 위치)은 제외한다. myxyzfriend.com처럼
            // 레이블 내부 부분 일치도 매칭하지 않는다.
            let spam = labels[..labels.len() - 1]
                .iter()
                .any(|label| self.hosts.contains(*label));
            if spam {
                hits.push(token.to_string());
            }
        }
        hits
    }
}

/// 디스코드 핸들 매처.
///
/// `@핸들` 표기와 `discord: 핸들` / `add discord 핸들` 표기를 인식한다.
/// 추출된 핸들이 목록과 정확히 일치해야 매칭이다.
#[derive(Debug, Clone)]
pub struct HandleMatcher {
    at_re: Regex,
    ctx_re: Regex,
    handles: BTreeSet<String>,
}

impl HandleMatcher {
    pub fn new(handles: BTreeSet<String>) -> Result<Self, MonitorError> {
        Ok(Self {
            at_re: Regex::new(r"@([a-z0-9_.]{2,32})")?,
            ctx_re: Regex::new(r"discord[\s:.,]*([a-z0-9_.]{2,32})")?,
            handles,
        })
    }

    pub fn matches(&self, body: &str) -> Vec<String> {
        let mut hits = Vec::new();
        let candidates = self
            .at_re
            .captures_iter(body)
            .chain(self.ctx_re.captures_iter(body));
        for caps in candidates {
            if let Some(m) = caps.get(1) {
                let handle = m.as_str().trim_end_matches('.');
                if self.handles.contains(handle) && !hits.iter().any(|h| h == handle) {
                    hits.push(handle.to_string());
                }
            }
        }
        hits
    }
}

/// 화폐 판매 제안 매처.
///
/// RMT 광고의 직접 표기(`ex/100 $5`)이거나, 화폐 기호/통화명과
/// 거래 의도 단어가 한 라인에 같이 나오면 매칭한다.
#[derive(Debug, Clone)]
pub struct CurrencyMatcher {
    direct_re: Regex,
    symbol_re: Regex,
    intent_re: Regex,
}

impl CurrencyMatcher {
    pub fn new() -> Result<Self, MonitorError> {
        Ok(Self {
            direct_re: Regex::new(r"\b(?:ex|div)\s*/\s*\d+(?:\.\d+)?\s*\$")?,
            symbol_re: Regex::new(r"[$€£]|\b(?:usd|eur|gbp)\b")?,
            intent_re: Regex::new(r"\b(?:buy|buying|sell|selling|trade|trading|wts|wtb)\b")?,
        })
    }

    pub fn matches(&self, body: &str) -> Vec<String> {
        let direct: Vec<String> = self
            .direct_re
            .find_iter(body)
            .map(|m| m.as_str().trim().to_string())
            .collect();
        if !direct.is_empty() {
            return direct;
        }

        let symbol = self.symbol_re.find(body);
        let intent = self.intent_re.find(body);
        match (symbol, intent) {
            (Some(s), Some(i)) => vec![s.as_str().to_string(), i.as_str().to_string()],
            _ => Vec::new(),
        }
    }
}

/// 쿠폰 코드 매처.
///
/// `coupon CODE` / `code CODE` 표기와 할인 언급(`20% off`, `discount`)이
/// 함께 있어야 매칭한다. 둘 중 하나만으로는 부족하다.
#[derive(Debug, Clone)]
pub struct CouponMatcher {
    code_re: Regex,
    discount_re: Regex,
}

impl CouponMatcher {
    pub fn new() -> Result<Self, MonitorError> {
        Ok(Self {
            code_re: Regex::new(r"\b(?:coupon\s+code|coupon|code)[\s:]*([a-z0-9]{3,16})\b")?,
            discount_re: Regex::new(r"\d{1,3}\s*%|\bdiscount\b|\boff\b")?,
        })
    }

    pub fn matches(&self, body: &str) -> Vec<String> {
        if self.discount_re.find(body).is_none() {
            return Vec::new();
        }
        self.code_re
            .captures_iter(body)
            .filter_map(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            // "coupon code ABC"에서 "code"가 코드로 잡히는 것을 막는다.
            .filter(|code| code != "coupon" && code != "code")
            .collect()
    }
}

// ─── 테스트 ───

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts() -> BTreeSet<String> {
        ["xyz", "cheapcurrency"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn url_matches_configured_host() {
        let m = UrlMatcher::new(hosts()).unwrap();
        assert_eq!(m.matches("visit xyz.com for deals"), vec!["xyz.com"]);
    }

    #[test]
    fn url_matches_subdomain() {
        let m = UrlMatcher::new(hosts()).unwrap();
        assert_eq!(m.matches("sub.xyz.net is live"), vec!["sub.xyz.net"]);
    }

    #[test]
    fn url_comma_obfuscation_matched() {
        let m = UrlMatcher::new(hosts()).unwrap();
        assert_eq!(m.matches("go to xyz,com now"), vec!["xyz,com"]);
    }

    #[test]
    fn url_does_not_match_inside_label() {
        let m = UrlMatcher::new(hosts()).unwrap();
        assert!(m.matches("myxyzfriend.com is fine").is_empty());
    }

    #[test]
    fn url_does_not_match_final_label() {
        let m = UrlMatcher::new(hosts()).unwrap();
        assert!(m.matches("totally.xyz is final-label only").is_empty());
    }

    #[test]
    fn url_ignores_unlisted_hosts() {
        let m = UrlMatcher::new(hosts()).unwrap();
        assert!(m.matches("see example.com").is_empty());
    }

    #[test]
    fn handle_at_notation() {
        let handles = ["spamseller"].into_iter().map(String::from).collect();
        let m = HandleMatcher::new(handles).unwrap();
        assert_eq!(m.matches("dm @spamseller for stock"), vec!["spamseller"]);
    }

    #[test]
    fn handle_discord_context() {
        let handles = ["spamseller"].into_iter().map(String::from).collect();
        let m = HandleMatcher::new(handles).unwrap();
        assert_eq!(
            m.matches("add discord: spamseller today"),
            vec!["spamseller"]
        );
    }

    #[test]
    fn handle_trailing_dot_trimmed() {
        let handles = ["spamseller"].into_iter().map(String::from).collect();
        let m = HandleMatcher::new(handles).unwrap();
        assert_eq!(m.matches("ping @spamseller."), vec!["spamseller"]);
    }

    #[test]
    fn handle_requires_exact_listed_match() {
        let handles = ["spamseller"].into_iter().map(String::from).collect();
        let m = HandleMatcher::new(handles).unwrap();
        assert!(m.matches("dm @legituser for help").is_empty());
    }

    #[test]
    fn currency_direct_notation() {
        let m = CurrencyMatcher::new().unwrap();
        let hits = m.matches("wts ex/100 $4.99 fast delivery");
        assert_eq!(hits, vec!["ex/100 $"]);
    }

    #[test]
    fn currency_symbol_plus_intent() {
        let m = CurrencyMatcher::new().unwrap();
        let hits = m.matches("selling divines for 5 usd each");
        assert_eq!(hits, vec!["usd", "selling"]);
    }

    #[test]
    fn currency_symbol_without_intent_clean() {
        let m = CurrencyMatcher::new().unwrap();
        assert!(m.matches("that ring is worth 5 usd i think").is_empty());
    }

    #[test]
    fn currency_intent_without_symbol_clean() {
        let m = CurrencyMatcher::new().unwrap();
        assert!(m.matches("wts mirror of kalandra, pm me").is_empty());
    }

    #[test]
    fn coupon_code_with_discount() {
        let m = CouponMatcher::new().unwrap();
        assert_eq!(m.matches("use coupon poe20 for 20% off"), vec!["poe20"]);
    }

    #[test]
    fn coupon_without_discount_clean() {
        let m = CouponMatcher::new().unwrap();
        assert!(m.matches("the dress code here is strict").is_empty());
    }

    #[test]
    fn coupon_keyword_not_captured_as_code() {
        let m = CouponMatcher::new().unwrap();
        assert_eq!(
            m.matches("coupon code save10 gives discount"),
            vec!["save10"]
        );
    }
}
