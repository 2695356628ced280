use std::fmt::{Display, Formatter};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Result, anyhow};
use tracing::{info, warn};

use crate::banner::BannerConfig;
use crate::codegen::{GenerateOptions, SnippetArtifacts, generate};
use crate::config::GeneratorSettings;

pub const DEFAULT_GENERATE_DELAY: Duration = Duration::from_millis(500);

/// Which generated artifact the panel is showing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputTab {
    #[default]
    Complete,
    Html,
    Js,
    Css,
}

impl OutputTab {
    pub const ALL: [OutputTab; 4] = [Self::Complete, Self::Html, Self::Js, Self::Css];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Html => "html",
            Self::Js => "js",
            Self::Css => "css",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Complete => "Complete Code",
            Self::Html => "HTML",
            Self::Js => "JavaScript",
            Self::Css => "CSS",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Complete => "cookie-banner-complete.html",
            Self::Html => "cookie-banner.html",
            Self::Js => "cookie-banner.js",
            Self::Css => "cookie-banner.css",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Complete | Self::Html => "text/html; charset=utf-8",
            Self::Js => "text/javascript; charset=utf-8",
            Self::Css => "text/css; charset=utf-8",
        }
    }

    pub fn select(self, artifacts: &SnippetArtifacts) -> &str {
        match self {
            Self::Complete => &artifacts.complete,
            Self::Html => &artifacts.html,
            Self::Js => &artifacts.js,
            Self::Css => &artifacts.css,
        }
    }
}

impl Display for OutputTab {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputTab {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "complete" | "all" => Ok(Self::Complete),
            "html" => Ok(Self::Html),
            "js" | "javascript" => Ok(Self::Js),
            "css" => Ok(Self::Css),
            other => Err(anyhow!(
                "invalid output tab `{other}`; expected `complete`, `html`, `js` or `css`"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Non-blocking feedback for copy/download actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }
}

/// State behind the "Generate Code" panel: the config being edited, the last
/// generated artifacts and which one is displayed.
#[derive(Debug, Clone)]
pub struct GeneratorSession {
    config: BannerConfig,
    options: GenerateOptions,
    generate_delay: Duration,
    active_tab: OutputTab,
    version: u64,
    generating: bool,
    artifacts: Option<SnippetArtifacts>,
}

impl GeneratorSession {
    pub fn new(config: BannerConfig, options: GenerateOptions) -> Self {
        Self {
            config,
            options,
            generate_delay: DEFAULT_GENERATE_DELAY,
            active_tab: OutputTab::default(),
            version: 0,
            generating: false,
            artifacts: None,
        }
    }

    pub fn from_settings(config: BannerConfig, settings: &GeneratorSettings) -> Self {
        Self::new(config, settings.generate_options())
    }

    pub fn with_generate_delay(mut self, delay: Duration) -> Self {
        self.generate_delay = delay;
        self
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    /// Replaces the config. The displayed code keeps reflecting the previous
    /// generation until `generate` runs again.
    pub fn update_config(&mut self, config: BannerConfig) {
        self.config = config;
    }

    pub fn active_tab(&self) -> OutputTab {
        self.active_tab
    }

    pub fn select_tab(&mut self, tab: OutputTab) {
        self.active_tab = tab;
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn artifacts(&self) -> Option<&SnippetArtifacts> {
        self.artifacts.as_ref()
    }

    /// Text of the active tab; empty before the first generation.
    pub fn displayed(&self) -> &str {
        self.artifacts
            .as_ref()
            .map(|artifacts| self.active_tab.select(artifacts))
            .unwrap_or_default()
    }

    /// Regenerates every artifact from the current config and returns the new
    /// version. The trailing delay only keeps the `generating` flag visible.
    pub async fn generate(&mut self) -> u64 {
        self.generating = true;
        let snippet = generate(&self.config, &self.options);
        self.artifacts = Some(snippet.to_artifacts());
        self.version += 1;

        info!(
            version = self.version,
            tab = %self.active_tab,
            position = %self.config.position,
            "generated banner code"
        );

        if !self.generate_delay.is_zero() {
            tokio::time::sleep(self.generate_delay).await;
        }
        self.generating = false;
        self.version
    }

    pub fn copy_to<W: Write>(&self, writer: &mut W) -> Notification {
        let Some(artifacts) = &self.artifacts else {
            return Notification::error("Nothing to copy yet. Generate the code first.");
        };
        let text = self.active_tab.select(artifacts);

        match writer.write_all(text.as_bytes()).and_then(|()| writer.flush()) {
            Ok(()) => Notification::success(format!("{} code copied", self.active_tab.label())),
            Err(error) => {
                warn!(tab = %self.active_tab, error = %error, "copy failed");
                Notification::error(format!("Failed to copy code: {error}"))
            }
        }
    }

    /// Writes the active tab to `dir` under its default file name.
    pub fn download(&self, dir: &Path) -> Notification {
        self.download_tab(dir, self.active_tab)
    }

    pub fn download_tab(&self, dir: &Path, tab: OutputTab) -> Notification {
        let Some(artifacts) = &self.artifacts else {
            return Notification::error("Nothing to download yet. Generate the code first.");
        };
        let path: PathBuf = dir.join(tab.file_name());

        match fs::write(&path, tab.select(artifacts)) {
            Ok(()) => {
                info!(tab = %tab, path = %path.display(), "downloaded banner code");
                Notification::success(format!("Downloaded {}", tab.file_name()))
            }
            Err(error) => {
                warn!(tab = %tab, path = %path.display(), error = %error, "download failed");
                Notification::error(format!("Failed to download {}: {error}", tab.file_name()))
            }
        }
    }
}
