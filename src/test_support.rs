use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::banner::{BannerConfig, BannerPosition, TrackingScript};

pub const GA_SCRIPT_SRC: &str = "https://www.google-analytics.com/ga.js";

pub fn temp_path(prefix: &str) -> PathBuf {
    let now_ns = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    std::env::temp_dir().join(format!(
        "consent_banner_{prefix}_{}_{}",
        std::process::id(),
        now_ns
    ))
}

pub fn remove_dir_if_exists(path: &Path) {
    let _ = std::fs::remove_dir_all(path);
}

pub fn script(name: &str, code: &str) -> TrackingScript {
    TrackingScript {
        id: name.to_ascii_lowercase().replace(' ', "-"),
        name: name.to_owned(),
        category: String::new(),
        script_code: code.to_owned(),
        enabled: true,
    }
}

/// Bottom bar with one Google Analytics script and Consent Mode enabled.
pub fn scenario_config() -> BannerConfig {
    let mut config = BannerConfig::default();
    config.position = BannerPosition::Bottom;
    config.behavior.auto_show = true;
    config.advanced.google_consent_mode = true;
    config.scripts.tracking_performance.push(TrackingScript {
        category: "trackingPerformance".to_owned(),
        ..script(
            "Google Analytics",
            &format!(r#"<script async src="{GA_SCRIPT_SRC}"></script>"#),
        )
    });
    config
}

pub fn apply_generator_test_env(command: &mut Command, log_dir: &Path) {
    command.env("BANNER_TEXT_ESCAPING", "escape");
    command.env("RUST_LOG", "error");
    command.env("BANNER_FILE_LOG", "error");
    command.env("BANNER_LOG_DIR", log_dir.as_os_str());
}
