use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use anyhow::{Result, anyhow};
use serde::Serialize;
use tracing::debug;

use crate::banner::BannerConfig;

mod complete;
mod css;
pub mod fragments;
mod html;
mod js;

/// How user-supplied banner text reaches the generated HTML.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextEscaping {
    /// HTML-escape titles, messages, labels, URLs and colors.
    #[default]
    Escape,
    /// Interpolate everything unmodified. Only for configs authored by the
    /// site owner themselves.
    Verbatim,
}

impl TextEscaping {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Escape => "escape",
            Self::Verbatim => "verbatim",
        }
    }

    pub fn apply(self, raw: &str) -> Cow<'_, str> {
        match self {
            Self::Escape => Cow::Owned(fragments::escape_html(raw)),
            Self::Verbatim => Cow::Borrowed(raw),
        }
    }
}

impl Display for TextEscaping {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextEscaping {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "escape" => Ok(Self::Escape),
            "verbatim" => Ok(Self::Verbatim),
            other => Err(anyhow!(
                "invalid text escaping `{other}`; expected `escape` or `verbatim`"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateOptions {
    pub text_escaping: TextEscaping,
}

/// How the stylesheet is embedded in the complete artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CssDelivery {
    InlineStyle,
    DataUriLink,
}

/// The generated artifacts for one banner config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerSnippet {
    pub html: String,
    pub css: String,
    pub js: String,
    pub css_delivery: CssDelivery,
}

/// Wire shape of a snippet, with the assembled complete artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetArtifacts {
    pub html: String,
    pub css: String,
    pub js: String,
    pub complete: String,
}

impl BannerSnippet {
    /// Everything in one paste-ready block with placement instructions.
    pub fn complete(&self) -> String {
        complete::assemble(self)
    }

    pub fn to_artifacts(&self) -> SnippetArtifacts {
        SnippetArtifacts {
            html: self.html.clone(),
            css: self.css.clone(),
            js: self.js.clone(),
            complete: self.complete(),
        }
    }
}

/// Renders a banner config. Never fails: unknown or missing settings have
/// already been resolved to defaults by the config model.
pub fn generate(config: &BannerConfig, options: &GenerateOptions) -> BannerSnippet {
    let snippet = BannerSnippet {
        html: html::render(config, options.text_escaping),
        css: css::render(config),
        js: js::render(config),
        css_delivery: if config.advanced.performance.inline_critical_css {
            CssDelivery::InlineStyle
        } else {
            CssDelivery::DataUriLink
        },
    };

    debug!(
        position = %config.position,
        text_escaping = %options.text_escaping,
        consent_mode = config.advanced.google_consent_mode,
        html_bytes = snippet.html.len(),
        css_bytes = snippet.css.len(),
        js_bytes = snippet.js.len(),
        "generated banner snippet"
    );
    snippet
}
