//! End-to-end daemon tests.
//!
//! Drives the full runtime against a temporary log file and asserts on
//! the artifacts the built-in plugins produce (JSONL report, ignore list).

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use spamcull_core::{Detection, RuleKind, SpamcullConfig};
use spamcull_daemon::runtime::Runtime;

fn e2e_config(dir: &Path) -> SpamcullConfig {
    let mut config = SpamcullConfig::default();
    config.monitor.log_path = dir.join("Client.txt").display().to_string();
    config.monitor.poll_interval_ms = 10;
    config.monitor.read_from_start = true;
    config.monitor.host_list = dir.join("spam_hosts.txt").display().to_string();
    config.monitor.handle_list = dir.join("spam_discord.txt").display().to_string();
    config.monitor.chat_pattern = r"\[INFO Client \d+\] ([^:]+): (.+)".to_string();
    config.plugins.enabled = vec![
        "echo".to_string(),
        "jsonl_report".to_string(),
        "ignore_list".to_string(),
    ];
    config.plugins.report_path = dir.join("detections.jsonl").display().to_string();
    config.plugins.ignore_list_path = dir.join("ignore_list.txt").display().to_string();
    config
}

#[tokio::test]
async fn daemon_detects_and_reports_spam() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("spam_hosts.txt"), "xyz\n").unwrap();
    std::fs::write(dir.path().join("spam_discord.txt"), "spamseller\n").unwrap();
    std::fs::write(
        dir.path().join("Client.txt"),
        "[INFO Client 7] RmtGuy: cheap divines at xyz.com\n\
         [INFO Client 7] Friendly: anyone up for maps?\n",
    )
    .unwrap();

    let config = e2e_config(dir.path());
    let runtime = Runtime::new(config).unwrap();
    let shutdown = runtime.shutdown_handle();
    let handle = tokio::spawn(async move { runtime.run().await });

    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.send(true).unwrap();
    let stats = handle.await.unwrap().unwrap();
    assert_eq!(stats.lines_processed, 2);
    assert_eq!(stats.detections_dispatched, 1);

    // JSONL report holds the detection with the player attached.
    let report = std::fs::read_to_string(dir.path().join("detections.jsonl")).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 1);
    let detection: Detection = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(detection.rule, RuleKind::Url);
    assert_eq!(detection.matched, vec!["xyz.com"]);
    assert_eq!(detection.player.as_deref(), Some("RmtGuy"));

    // The spammer landed on the ignore list, the clean player did not.
    let ignored = std::fs::read_to_string(dir.path().join("ignore_list.txt")).unwrap();
    assert_eq!(ignored, "RmtGuy\n");
}

#[tokio::test]
async fn daemon_picks_up_appended_lines() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("spam_hosts.txt"), "xyz\n").unwrap();
    std::fs::write(dir.path().join("Client.txt"), "").unwrap();

    let mut config = e2e_config(dir.path());
    config.monitor.chat_pattern = String::new();
    config.plugins.enabled = vec!["jsonl_report".to_string()];
    let runtime = Runtime::new(config).unwrap();
    let shutdown = runtime.shutdown_handle();
    let handle = tokio::spawn(async move { runtime.run().await });

    tokio::time::sleep(Duration::from_millis(100)).await;
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("Client.txt"))
            .unwrap();
        writeln!(file, "wts divines 5 usd at sub.xyz.net").unwrap();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let report = std::fs::read_to_string(dir.path().join("detections.jsonl")).unwrap();
    let detections: Vec<Detection> = report
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    // Without a chat filter the whole line is matched; both the url and
    // the currency rule fire, and no player is attached.
    assert_eq!(detections.len(), 2);
    assert_eq!(detections[0].rule, RuleKind::Url);
    assert_eq!(detections[1].rule, RuleKind::CurrencyOffer);
    assert!(detections[0].player.is_none());
}

#[tokio::test]
async fn reload_applies_new_lists_without_restart() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("spam_hosts.txt"), "oldhost\n").unwrap();
    std::fs::write(dir.path().join("Client.txt"), "").unwrap();

    let mut config = e2e_config(dir.path());
    config.monitor.chat_pattern = String::new();
    config.plugins.enabled = vec!["jsonl_report".to_string()];
    let runtime = std::sync::Arc::new(Runtime::new(config).unwrap());
    let shutdown = runtime.shutdown_handle();

    let handle = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.run().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Drive reload directly; in production this is triggered by SIGHUP.
    std::fs::write(dir.path().join("spam_hosts.txt"), "newhost\n").unwrap();
    runtime.reload().await.unwrap();
    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("Client.txt"))
            .unwrap();
        writeln!(file, "check out newhost.com").unwrap();
        writeln!(file, "check out oldhost.com").unwrap();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();

    let report = std::fs::read_to_string(dir.path().join("detections.jsonl")).unwrap();
    let detections: Vec<Detection> = report
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].matched, vec!["newhost.com"]);
}

#[tokio::test]
async fn failed_reload_keeps_previous_rules() {
    let dir = tempfile::tempdir().unwrap();
    let hosts = dir.path().join("spam_hosts.txt");
    std::fs::write(&hosts, "xyz\n").unwrap();
    std::fs::write(dir.path().join("Client.txt"), "").unwrap();

    let mut config = e2e_config(dir.path());
    config.monitor.chat_pattern = String::new();
    config.plugins.enabled = vec!["jsonl_report".to_string()];
    let runtime = std::sync::Arc::new(Runtime::new(config).unwrap());
    let shutdown = runtime.shutdown_handle();

    let handle = {
        let runtime = runtime.clone();
        tokio::spawn(async move { runtime.run().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;

    // Replace the host list with a directory so the next list load fails
    // with a real I/O error (not the tolerated not-found case).
    std::fs::remove_file(&hosts).unwrap();
    std::fs::create_dir(&hosts).unwrap();
    assert!(runtime.reload().await.is_err());

    {
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(dir.path().join("Client.txt"))
            .unwrap();
        writeln!(file, "still catching xyz.com").unwrap();
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    shutdown.send(true).unwrap();
    handle.await.unwrap().unwrap();

    // The pre-reload rules stayed active.
    let report = std::fs::read_to_string(dir.path().join("detections.jsonl")).unwrap();
    let detections: Vec<Detection> = report
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(detections.len(), 1);
    assert_eq!(detections[0].matched, vec!["xyz.com"]);
}
