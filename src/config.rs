use std::env;

use anyhow::{Context, Result, ensure};

use crate::codegen::{GenerateOptions, TextEscaping};

pub const DEFAULT_HTTP_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub text_escaping: TextEscaping,
    pub http_bind: String,
    pub log_dir: String,
    /// Filter for the rolling file log; file logging is off when unset.
    pub file_log_filter: Option<String>,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            text_escaping: TextEscaping::default(),
            http_bind: DEFAULT_HTTP_BIND.to_owned(),
            log_dir: DEFAULT_LOG_DIR.to_owned(),
            file_log_filter: None,
        }
    }
}

impl GeneratorSettings {
    pub fn from_env() -> Result<Self> {
        // Load .env if present, but do not fail if file does not exist.
        let _ = dotenvy::dotenv();

        let text_escaping = env::var("BANNER_TEXT_ESCAPING")
            .unwrap_or_else(|_| TextEscaping::default().as_str().to_owned())
            .parse::<TextEscaping>()
            .context("failed to parse BANNER_TEXT_ESCAPING")?;

        let http_bind =
            env::var("BANNER_HTTP_BIND").unwrap_or_else(|_| DEFAULT_HTTP_BIND.to_owned());
        ensure!(
            !http_bind.trim().is_empty(),
            "BANNER_HTTP_BIND cannot be empty"
        );

        let log_dir =
            read_optional_env("BANNER_LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_owned());
        let file_log_filter = read_optional_env("BANNER_FILE_LOG");

        Ok(Self {
            text_escaping,
            http_bind,
            log_dir,
            file_log_filter,
        })
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions {
            text_escaping: self.text_escaping,
        }
    }
}

fn read_optional_env(name: &str) -> Option<String> {
    env::var(name).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::GeneratorSettings;
    use crate::codegen::TextEscaping;

    #[test]
    fn defaults_escape_text_and_disable_file_logging() {
        let settings = GeneratorSettings::default();
        assert_eq!(settings.text_escaping, TextEscaping::Escape);
        assert_eq!(settings.http_bind, "127.0.0.1:8787");
        assert!(settings.file_log_filter.is_none());
    }

    #[test]
    fn generate_options_follow_escaping_setting() {
        let settings = GeneratorSettings {
            text_escaping: TextEscaping::Verbatim,
            ..GeneratorSettings::default()
        };
        assert_eq!(
            settings.generate_options().text_escaping,
            TextEscaping::Verbatim
        );
    }
}
