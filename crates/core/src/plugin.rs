//! 플러그인 시스템 — 명시적 등록, 활성화, 격리된 호출
//!
//! [`SpamPlugin`] trait은 탐지 결과를 소비하는 핸들러의 계약입니다.
//! 플러그인은 시작 시 [`PluginRegistry`]에 명시적으로 등록되고,
//! 설정의 활성화 목록(`plugins.enabled`)에 따라 [`PluginSet`]으로
//! 조립됩니다. 등록만 되고 활성화되지 않은 플러그인은 호출되지
//! 않습니다.
//!
//! # 트리거
//! 플러그인은 자신이 처리할 트리거 이름을 선언합니다. 현재는
//! [`TRIGGER_PROCESS_SPAM`] 하나만 지원하며, 다른 트리거를 선언한
//! 플러그인은 활성화 단계에서 경고 로그와 함께 제외됩니다.
//!
//! # 격리
//! 호출 실패와 타임아웃은 해당 플러그인, 해당 Detection에만
//! 국한됩니다. 다음 플러그인 호출과 이후 Detection 처리는 계속됩니다.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PluginError, SpamcullError};
use crate::types::Detection;

/// dyn-compatible future 타입
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// 스팸 탐지 트리거 — 플러그인이 Detection을 받는 진입점 이름
pub const TRIGGER_PROCESS_SPAM: &str = "process_spam";

// ─── PluginInfo ──────────────────────────────────────────────────────

/// 플러그인 메타데이터
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginInfo {
    /// 플러그인 고유 이름 — 설정의 `plugins.enabled` 항목과 대응
    pub name: String,
    /// 플러그인 버전 (semver 형식 문자열)
    pub version: String,
    /// 플러그인 설명
    pub description: String,
    /// 처리할 트리거 이름 (현재 `"process_spam"`만 지원)
    pub trigger: String,
}

impl PluginInfo {
    /// `process_spam` 트리거 플러그인의 메타데이터를 생성합니다.
    pub fn process_spam(
        name: impl Into<String>,
        version: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: description.into(),
            trigger: TRIGGER_PROCESS_SPAM.to_owned(),
        }
    }
}

impl fmt::Display for PluginInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} v{} ({})", self.name, self.version, self.trigger)
    }
}

// ─── SpamPlugin Trait ────────────────────────────────────────────────

/// 탐지 결과 핸들러 플러그인 trait
///
/// # 구현 예시
/// ```ignore
/// struct EchoPlugin {
///     info: PluginInfo,
/// }
///
/// impl SpamPlugin for EchoPlugin {
///     fn info(&self) -> &PluginInfo { &self.info }
///
///     async fn process_spam(&self, detection: Detection) -> Result<(), SpamcullError> {
///         tracing::info!(%detection, "spam detected");
///         Ok(())
///     }
/// }
/// ```
pub trait SpamPlugin: Send + Sync {
    /// 플러그인 메타데이터를 반환합니다.
    fn info(&self) -> &PluginInfo;

    /// Detection 하나를 처리합니다.
    ///
    /// 반환값은 실패 탐지에만 사용되며, 호출자는 에러를 로그로 남기고
    /// 다음 플러그인으로 진행합니다.
    fn process_spam(
        &self,
        detection: Detection,
    ) -> impl Future<Output = Result<(), SpamcullError>> + Send;
}

// ─── DynSpamPlugin Trait ─────────────────────────────────────────────

/// dyn-compatible 플러그인 trait
///
/// `SpamPlugin`은 RPITIT를 사용하므로 `dyn SpamPlugin`이 불가합니다.
/// `DynSpamPlugin`은 `BoxFuture`를 반환하여
/// `Vec<Arc<dyn DynSpamPlugin>>`으로 동적 관리를 가능하게 합니다.
pub trait DynSpamPlugin: Send + Sync {
    /// 플러그인 메타데이터를 반환합니다.
    fn info(&self) -> &PluginInfo;

    /// Detection 하나를 처리합니다.
    fn process_spam(&self, detection: Detection) -> BoxFuture<'_, Result<(), SpamcullError>>;
}

/// SpamPlugin을 구현한 타입은 자동으로 DynSpamPlugin도 구현됩니다.
impl<T: SpamPlugin> DynSpamPlugin for T {
    fn info(&self) -> &PluginInfo {
        SpamPlugin::info(self)
    }

    fn process_spam(&self, detection: Detection) -> BoxFuture<'_, Result<(), SpamcullError>> {
        Box::pin(SpamPlugin::process_spam(self, detection))
    }
}

// ─── PluginRegistry ──────────────────────────────────────────────────

/// 플러그인 레지스트리 — 시작 시 사용 가능한 플러그인의 전체 집합
///
/// 리플렉션 기반 탐색 대신, 호스트가 시작 시 내장 플러그인을 명시적으로
/// 등록합니다. 등록은 활성화가 아닙니다: 실제 호출 대상은
/// [`PluginRegistry::activate`]가 설정의 활성화 목록으로부터 만든
/// [`PluginSet`]입니다.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn DynSpamPlugin>>,
}

impl PluginRegistry {
    /// 빈 레지스트리를 생성합니다.
    pub fn new() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// 플러그인을 등록합니다.
    ///
    /// 동일한 이름의 플러그인이 이미 등록되어 있으면 에러를 반환합니다.
    pub fn register(&mut self, plugin: Arc<dyn DynSpamPlugin>) -> Result<(), SpamcullError> {
        let name = plugin.info().name.clone();
        if self.plugins.iter().any(|p| p.info().name == name) {
            return Err(PluginError::AlreadyRegistered { name }.into());
        }
        tracing::debug!(plugin = %name, "plugin registered");
        self.plugins.push(plugin);
        Ok(())
    }

    /// 이름으로 등록된 플러그인을 조회합니다.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn DynSpamPlugin>> {
        self.plugins.iter().find(|p| p.info().name == name)
    }

    /// 등록된 플러그인 수를 반환합니다.
    pub fn count(&self) -> usize {
        self.plugins.len()
    }

    /// 등록된 모든 플러그인의 정보를 반환합니다.
    pub fn list(&self) -> Vec<&PluginInfo> {
        self.plugins.iter().map(|p| p.info()).collect()
    }

    /// 활성화 목록에서 호출 대상 [`PluginSet`]을 조립합니다.
    ///
    /// 목록 순서가 호출 순서입니다. 아래 항목은 경고 로그와 함께
    /// 건너뛰며, 다른 플러그인의 활성화를 막지 않습니다:
    /// - 등록되지 않은 이름
    /// - 목록 내 중복 이름
    /// - 지원하지 않는 트리거를 선언한 플러그인
    pub fn activate(&self, enabled: &[String]) -> PluginSet {
        let mut active: Vec<Arc<dyn DynSpamPlugin>> = Vec::new();

        for name in enabled {
            if active.iter().any(|p| p.info().name == *name) {
                tracing::warn!(plugin = %name, "duplicate entry in enabled list, skipping");
                continue;
            }
            let Some(plugin) = self.get(name) else {
                tracing::warn!(plugin = %name, "enabled plugin is not registered, skipping");
                continue;
            };
            let trigger = &plugin.info().trigger;
            if trigger != TRIGGER_PROCESS_SPAM {
                tracing::warn!(
                    plugin = %name,
                    trigger = %trigger,
                    "unsupported plugin trigger, skipping"
                );
                continue;
            }
            active.push(Arc::clone(plugin));
        }

        tracing::info!(
            enabled = enabled.len(),
            active = active.len(),
            "plugin set activated"
        );
        PluginSet { plugins: active }
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ─── PluginSet ───────────────────────────────────────────────────────

/// 활성 플러그인 집합 — 호출 순서가 보존된 스냅샷
///
/// 리로드 시 전체가 통째로 교체됩니다. `Clone`은 `Arc` 복제이므로
/// 디스패처가 라인마다 스냅샷을 떠도 비용이 없습니다.
#[derive(Clone, Default)]
pub struct PluginSet {
    plugins: Vec<Arc<dyn DynSpamPlugin>>,
}

impl PluginSet {
    /// 활성 플러그인 수를 반환합니다.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// 활성 플러그인이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// 활성 플러그인 이름을 호출 순서대로 반환합니다.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.iter().map(|p| p.info().name.as_str()).collect()
    }

    /// 모든 활성 플러그인을 순서대로 호출합니다.
    ///
    /// 플러그인마다 Detection 복제본을 전달하며, 각 호출을 `timeout`으로
    /// 제한합니다. 실패·타임아웃은 플러그인 이름과 detection id를 포함해
    /// 로그로 남기고 다음 플러그인으로 진행합니다. 호출 자체는 이 함수를
    /// 실패시키지 않습니다.
    pub async fn invoke_all(&self, detection: &Detection, timeout: Duration) {
        for plugin in &self.plugins {
            let name = &plugin.info().name;
            match tokio::time::timeout(timeout, plugin.process_spam(detection.clone())).await {
                Ok(Ok(())) => {
                    tracing::debug!(
                        plugin = %name,
                        detection_id = %detection.id,
                        "plugin processed detection"
                    );
                }
                Ok(Err(e)) => {
                    tracing::warn!(
                        plugin = %name,
                        detection_id = %detection.id,
                        error = %e,
                        "plugin invocation failed"
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        plugin = %name,
                        detection_id = %detection.id,
                        timeout_ms = timeout.as_millis() as u64,
                        "plugin invocation timed out"
                    );
                }
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{LogLine, RuleKind};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 테스트용 플러그인 — 호출 횟수를 기록하고 실패/지연을 흉내냅니다.
    struct MockPlugin {
        info: PluginInfo,
        calls: AtomicUsize,
        fail: bool,
        hang: bool,
    }

    impl MockPlugin {
        fn new(name: &str) -> Self {
            Self {
                info: PluginInfo::process_spam(name, "0.1.0", "mock"),
                calls: AtomicUsize::new(0),
                fail: false,
                hang: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }

        fn hanging(mut self) -> Self {
            self.hang = true;
            self
        }

        fn with_trigger(mut self, trigger: &str) -> Self {
            self.info.trigger = trigger.to_owned();
            self
        }
    }

    impl SpamPlugin for MockPlugin {
        fn info(&self) -> &PluginInfo {
            &self.info
        }

        async fn process_spam(&self, _detection: Detection) -> Result<(), SpamcullError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail {
                return Err(PluginError::Invocation {
                    name: self.info.name.clone(),
                    reason: "mock failure".to_owned(),
                }
                .into());
            }
            Ok(())
        }
    }

    fn sample_detection() -> Detection {
        let line = LogLine::new("buy currency at spam.xyz", 0);
        Detection::new(RuleKind::Url, vec!["spam.xyz".to_owned()], &line)
    }

    #[test]
    fn registry_register_and_count() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::new("a"))).unwrap();
        registry.register(Arc::new(MockPlugin::new("b"))).unwrap();
        assert_eq!(registry.count(), 2);
        assert!(registry.get("a").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn registry_rejects_duplicate_names() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::new("dup"))).unwrap();
        let err = registry
            .register(Arc::new(MockPlugin::new("dup")))
            .unwrap_err();
        assert!(err.to_string().contains("already registered"));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn activate_preserves_enablement_order() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::new("a"))).unwrap();
        registry.register(Arc::new(MockPlugin::new("b"))).unwrap();
        registry.register(Arc::new(MockPlugin::new("c"))).unwrap();

        let set = registry.activate(&["c".to_owned(), "a".to_owned()]);
        assert_eq!(set.names(), vec!["c", "a"]);
    }

    #[test]
    fn activate_skips_unknown_and_duplicates() {
        let mut registry = PluginRegistry::new();
        registry.register(Arc::new(MockPlugin::new("a"))).unwrap();

        let set = registry.activate(&[
            "a".to_owned(),
            "ghost".to_owned(),
            "a".to_owned(),
        ]);
        assert_eq!(set.names(), vec!["a"]);
    }

    #[test]
    fn activate_skips_unsupported_trigger() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Arc::new(MockPlugin::new("odd").with_trigger("on_whisper")))
            .unwrap();
        registry.register(Arc::new(MockPlugin::new("ok"))).unwrap();

        let set = registry.activate(&["odd".to_owned(), "ok".to_owned()]);
        assert_eq!(set.names(), vec!["ok"]);
    }

    #[test]
    fn registered_but_not_enabled_is_inert() {
        let mut registry = PluginRegistry::new();
        registry
            .register(Arc::new(MockPlugin::new("present")))
            .unwrap();
        let set = registry.activate(&[]);
        assert!(set.is_empty());
    }

    #[tokio::test]
    async fn invoke_all_calls_every_plugin() {
        let a = Arc::new(MockPlugin::new("a"));
        let b = Arc::new(MockPlugin::new("b"));
        let mut registry = PluginRegistry::new();
        registry.register(a.clone()).unwrap();
        registry.register(b.clone()).unwrap();

        let set = registry.activate(&["a".to_owned(), "b".to_owned()]);
        set.invoke_all(&sample_detection(), Duration::from_secs(1))
            .await;

        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
        assert_eq!(b.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_plugin_does_not_block_others() {
        let bad = Arc::new(MockPlugin::new("bad").failing());
        let good = Arc::new(MockPlugin::new("good"));
        let mut registry = PluginRegistry::new();
        registry.register(bad.clone()).unwrap();
        registry.register(good.clone()).unwrap();

        let set = registry.activate(&["bad".to_owned(), "good".to_owned()]);
        let detection = sample_detection();
        set.invoke_all(&detection, Duration::from_secs(1)).await;
        set.invoke_all(&detection, Duration::from_secs(1)).await;

        // 실패한 플러그인 뒤의 플러그인도 매번 호출된다
        assert_eq!(bad.calls.load(Ordering::SeqCst), 2);
        assert_eq!(good.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn hung_plugin_is_cut_by_timeout() {
        let hung = Arc::new(MockPlugin::new("hung").hanging());
        let good = Arc::new(MockPlugin::new("good"));
        let mut registry = PluginRegistry::new();
        registry.register(hung.clone()).unwrap();
        registry.register(good.clone()).unwrap();

        let set = registry.activate(&["hung".to_owned(), "good".to_owned()]);
        set.invoke_all(&sample_detection(), Duration::from_millis(50))
            .await;

        assert_eq!(good.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn plugin_info_display() {
        let info = PluginInfo::process_spam("echo", "0.1.0", "echoes detections");
        let display = info.to_string();
        assert!(display.contains("echo"));
        assert!(display.contains("process_spam"));
    }
}
