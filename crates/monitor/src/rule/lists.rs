//! 스팸 목록 로더.
//!
//! 호스트/핸들 목록은 줄 단위 텍스트 파일이다. 항목은 소문자로
//! 정규화되고 빈 줄은 무시된다.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::info;

use crate::error::MonitorError;

/// 규칙 컴파일에 쓰이는 스팸 목록.
#[derive(Debug, Clone, Default)]
pub struct SpamLists {
    /// 스팸 호스트(도메인 레이블) 목록.
    pub hosts: BTreeSet<String>,
    /// 스팸 디스코드 핸들 목록.
    pub handles: BTreeSet<String>,
}

impl SpamLists {
    /// 두 목록 파일을 읽는다. 파일이 없으면 해당 목록은 비워 두고 넘어간다.
    pub async fn load(host_list: &Path, handle_list: &Path) -> Result<Self, MonitorError> {
        let hosts = load_list(host_list).await?;
        let handles = load_list(handle_list).await?;
        info!(
            hosts = hosts.len(),
            handles = handles.len(),
            "spam lists loaded"
        );
        Ok(Self { hosts, handles })
    }

    /// 테스트와 내장 기본값용 생성자.
    pub fn from_parts<H, D>(hosts: H, handles: D) -> Self
    where
        H: IntoIterator<Item = &'static str>,
        D: IntoIterator<Item = &'static str>,
    {
        Self {
            hosts: hosts.into_iter().map(normalize).collect(),
            handles: handles.into_iter().map(normalize).collect(),
        }
    }

    /// 두 목록이 모두 비었는지.
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty() && self.handles.is_empty()
    }
}

fn normalize(entry: &str) -> String {
    entry.trim().to_lowercase()
}

async fn load_list(path: &Path) -> Result<BTreeSet<String>, MonitorError> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            info!(path = %path.display(), "list file not found, using empty list");
            return Ok(BTreeSet::new());
        }
        Err(err) => {
            return Err(MonitorError::ListLoad {
                path: path.to_path_buf(),
                reason: err.to_string(),
            });
        }
    };

    Ok(contents
        .lines()
        .map(normalize)
        .filter(|entry| !entry.is_empty())
        .collect())
}

// ─── 테스트 ───

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn loads_and_normalizes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = dir.path().join("hosts.txt");
        let handles = dir.path().join("handles.txt");
        std::fs::write(&hosts, "XYZ\n  abc  \n\nxyz\n").unwrap();
        std::fs::write(&handles, "SpamSeller\n").unwrap();

        let lists = SpamLists::load(&hosts, &handles).await.unwrap();
        assert_eq!(lists.hosts.len(), 2);
        assert!(lists.hosts.contains("xyz"));
        assert!(lists.hosts.contains("abc"));
        assert!(lists.handles.contains("spamseller"));
    }

    #[tokio::test]
    async fn missing_file_yields_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let lists = SpamLists::load(
            &dir.path().join("nope.txt"),
            &dir.path().join("also-nope.txt"),
        )
        .await
        .unwrap();
        assert!(lists.is_empty());
    }

    #[test]
    fn from_parts_normalizes() {
        let lists = SpamLists::from_parts(["XYZ"], [" Seller "]);
        assert!(lists.hosts.contains("xyz"));
        assert!(lists.handles.contains("seller"));
    }
}
