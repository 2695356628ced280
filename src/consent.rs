use serde::{Deserialize, Serialize};

pub const CONSENT_COOKIE_NAME: &str = "cookie_consent";
pub const CONSENT_COOKIE_PATH: &str = "/";
pub const CONSENT_COOKIE_SAME_SITE: &str = "Lax";

/// What the visitor agreed to, as stored in the `cookie_consent` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentRecord {
    pub essential: bool,
    #[serde(default)]
    pub functionality: bool,
    #[serde(default)]
    pub analytics: bool,
    #[serde(default)]
    pub marketing: bool,
}

impl ConsentRecord {
    pub fn accept_all() -> Self {
        Self {
            essential: true,
            functionality: true,
            analytics: true,
            marketing: true,
        }
    }

    pub fn reject_all() -> Self {
        Self {
            essential: true,
            functionality: false,
            analytics: false,
            marketing: false,
        }
    }

    /// Compact object literal written by the generated script.
    pub fn to_js_literal(self) -> String {
        format!(
            "{{essential:true,functionality:{},analytics:{},marketing:{}}}",
            self.functionality, self.analytics, self.marketing
        )
    }

    /// Same bytes the browser writes: `encodeURIComponent(JSON.stringify(record))`.
    pub fn to_cookie_value(self) -> String {
        let json = format!(
            r#"{{"essential":true,"functionality":{},"analytics":{},"marketing":{}}}"#,
            self.functionality, self.analytics, self.marketing
        );
        urlencoding::encode(&json).into_owned()
    }

    pub fn from_cookie_value(value: &str) -> Option<Self> {
        let decoded = urlencoding::decode(value.trim()).ok()?;
        let mut record = serde_json::from_str::<Self>(&decoded).ok()?;
        record.essential = true;
        Some(record)
    }

    /// Finds and decodes the consent cookie in a `Cookie` request header.
    pub fn from_cookie_header(header: &str) -> Option<Self> {
        header.split(';').find_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            if name.trim() == CONSENT_COOKIE_NAME {
                Self::from_cookie_value(value)
            } else {
                None
            }
        })
    }
}
