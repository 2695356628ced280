use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Declares a string-backed config enum.
///
/// Values are matched case-insensitively with `_` treated as `-`. Anything
/// unrecognized falls back to the declared default instead of failing, so a
/// half-edited dashboard config still renders.
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal,)+
        }
        default = $default:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::$default
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
                    $($text => Self::$variant,)+
                    other => {
                        debug!(
                            kind = stringify!($name),
                            value = other,
                            "unrecognized config value; using default"
                        );
                        Self::$default
                    }
                }
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_owned()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

mod lenient;
mod position;

use self::lenient::lenient_struct;
pub use self::position::{BannerPosition, PositionFamily};

pub const DEFAULT_COOKIE_EXPIRY_DAYS: u32 = 365;

config_enum! {
    /// Color scheme modifier applied to the banner root as a CSS class.
    pub enum BannerTheme {
        Light => "light",
        Dark => "dark",
        Custom => "custom",
    }
    default = Light;
}

config_enum! {
    pub enum LogoPosition {
        Left => "left",
        Right => "right",
        Center => "center",
        Hidden => "hidden",
    }
    default = Left;
}

config_enum! {
    pub enum WidthMode {
        Full => "full",
        Container => "container",
        Custom => "custom",
    }
    default = Full;
}

config_enum! {
    pub enum ShadowSize {
        None => "none",
        Small => "small",
        Medium => "medium",
        Large => "large",
    }
    default = None;
}

config_enum! {
    pub enum BannerAnimation {
        None => "none",
        Fade => "fade",
        Slide => "slide",
        Bounce => "bounce",
        Pulse => "pulse",
    }
    default = None;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerConfig {
    pub position: BannerPosition,
    pub theme: BannerTheme,
    pub colors: BannerColors,
    pub text: BannerText,
    pub behavior: BannerBehavior,
    pub branding: BannerBranding,
    pub layout: BannerLayout,
    pub scripts: TrackingScripts,
    pub advanced: AdvancedSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerColors {
    pub background: String,
    pub text: String,
    pub button: String,
    pub button_text: String,
    pub link: String,
}

impl Default for BannerColors {
    fn default() -> Self {
        Self {
            background: "#ffffff".to_owned(),
            text: "#1f2937".to_owned(),
            button: "#2563eb".to_owned(),
            button_text: "#ffffff".to_owned(),
            link: "#2563eb".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerText {
    pub title: String,
    pub message: String,
    pub accept_button: String,
    pub reject_button: String,
    pub preferences_button: String,
}

impl Default for BannerText {
    fn default() -> Self {
        Self {
            title: "We value your privacy".to_owned(),
            message: "We use cookies to enhance your browsing experience, serve personalized \
                      content, and analyze our traffic. By clicking \"Accept All\", you consent \
                      to our use of cookies."
                .to_owned(),
            accept_button: "Accept All".to_owned(),
            reject_button: "Reject All".to_owned(),
            preferences_button: "Preferences".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerBehavior {
    pub auto_show: bool,
    pub dismiss_on_scroll: bool,
    pub show_preferences: bool,
    /// Lifetime of the consent cookie, in days.
    pub cookie_expiry: u32,
}

impl Default for BannerBehavior {
    fn default() -> Self {
        Self {
            auto_show: true,
            dismiss_on_scroll: false,
            show_preferences: true,
            cookie_expiry: DEFAULT_COOKIE_EXPIRY_DAYS,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerBranding {
    pub logo: Option<BrandingLogo>,
    pub privacy_policy: Option<PrivacyPolicyLink>,
}

impl BannerBranding {
    /// The logo to render, if any. Hidden placements and blank URLs count as
    /// no logo.
    pub fn visible_logo(&self) -> Option<&BrandingLogo> {
        self.logo
            .as_ref()
            .filter(|logo| logo.position != LogoPosition::Hidden && !logo.url.trim().is_empty())
    }

    pub fn visible_privacy_policy(&self) -> Option<&PrivacyPolicyLink> {
        self.privacy_policy
            .as_ref()
            .filter(|link| !link.url.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandingLogo {
    pub url: String,
    pub alt: String,
    pub position: LogoPosition,
    /// Rendered height in pixels.
    pub height: u32,
}

impl Default for BrandingLogo {
    fn default() -> Self {
        Self {
            url: String::new(),
            alt: "Logo".to_owned(),
            position: LogoPosition::default(),
            height: 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivacyPolicyLink {
    pub url: String,
    pub text: String,
    pub open_in_new_tab: bool,
}

impl Default for PrivacyPolicyLink {
    fn default() -> Self {
        Self {
            url: String::new(),
            text: "Privacy Policy".to_owned(),
            open_in_new_tab: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BannerLayout {
    pub width: WidthMode,
    pub custom_width: u32,
    pub max_width: u32,
    pub border_radius: u32,
    pub padding: u32,
    pub margin: u32,
    pub shadow: ShadowSize,
    pub animation: BannerAnimation,
}

impl Default for BannerLayout {
    fn default() -> Self {
        Self {
            width: WidthMode::Full,
            custom_width: 600,
            max_width: 1200,
            border_radius: 8,
            padding: 20,
            margin: 0,
            shadow: ShadowSize::Medium,
            animation: BannerAnimation::Fade,
        }
    }
}

/// The four consent buckets a tracking script can live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptBucket {
    StrictlyNecessary,
    Functionality,
    TrackingPerformance,
    TargetingAdvertising,
}

impl ScriptBucket {
    pub const ALL: [ScriptBucket; 4] = [
        Self::StrictlyNecessary,
        Self::Functionality,
        Self::TrackingPerformance,
        Self::TargetingAdvertising,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::StrictlyNecessary => "strictlyNecessary",
            Self::Functionality => "functionality",
            Self::TrackingPerformance => "trackingPerformance",
            Self::TargetingAdvertising => "targetingAdvertising",
        }
    }

    /// Field of the consent record gating this bucket. Strictly-necessary
    /// scripts are never gated.
    pub fn consent_key(self) -> Option<&'static str> {
        match self {
            Self::StrictlyNecessary => None,
            Self::Functionality => Some("functionality"),
            Self::TrackingPerformance => Some("analytics"),
            Self::TargetingAdvertising => Some("marketing"),
        }
    }
}

impl Display for ScriptBucket {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingScripts {
    pub strictly_necessary: Vec<TrackingScript>,
    pub functionality: Vec<TrackingScript>,
    pub tracking_performance: Vec<TrackingScript>,
    pub targeting_advertising: Vec<TrackingScript>,
}

impl TrackingScripts {
    pub fn bucket(&self, bucket: ScriptBucket) -> &[TrackingScript] {
        match bucket {
            ScriptBucket::StrictlyNecessary => &self.strictly_necessary,
            ScriptBucket::Functionality => &self.functionality,
            ScriptBucket::TrackingPerformance => &self.tracking_performance,
            ScriptBucket::TargetingAdvertising => &self.targeting_advertising,
        }
    }

    pub fn bucket_mut(&mut self, bucket: ScriptBucket) -> &mut Vec<TrackingScript> {
        match bucket {
            ScriptBucket::StrictlyNecessary => &mut self.strictly_necessary,
            ScriptBucket::Functionality => &mut self.functionality,
            ScriptBucket::TrackingPerformance => &mut self.tracking_performance,
            ScriptBucket::TargetingAdvertising => &mut self.targeting_advertising,
        }
    }

    /// Enabled scripts with code, in configured order.
    pub fn runnable(&self, bucket: ScriptBucket) -> impl Iterator<Item = &TrackingScript> {
        self.bucket(bucket)
            .iter()
            .filter(|script| script.enabled && !script.script_code.trim().is_empty())
    }
}

/// A named unit of third-party code. The bucket it is stored in decides its
/// consent gating; `category` is carried for the dashboard only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingScript {
    pub id: String,
    pub name: String,
    pub category: String,
    pub script_code: String,
    pub enabled: bool,
}

impl Default for TrackingScript {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            category: String::new(),
            script_code: String::new(),
            enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvancedSettings {
    pub google_consent_mode: bool,
    #[serde(rename = "customCSS")]
    pub custom_css: String,
    #[serde(rename = "customJS")]
    pub custom_js: String,
    pub performance: PerformanceSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSettings {
    pub defer_non_critical_scripts: bool,
    #[serde(rename = "inlineCriticalCSS")]
    pub inline_critical_css: bool,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            defer_non_critical_scripts: true,
            inline_critical_css: true,
        }
    }
}

lenient_struct!(BannerConfig {
    position: ["position"],
    theme: ["theme"],
    colors: ["colors"],
    text: ["text"],
    behavior: ["behavior"],
    branding: ["branding"],
    layout: ["layout"],
    scripts: ["scripts"],
    advanced: ["advanced"],
});

lenient_struct!(BannerColors {
    background: ["background"],
    text: ["text"],
    button: ["button"],
    button_text: ["buttonText"],
    link: ["link"],
});

lenient_struct!(BannerText {
    title: ["title"],
    message: ["message"],
    accept_button: ["acceptButton"],
    reject_button: ["rejectButton"],
    preferences_button: ["preferencesButton"],
});

lenient_struct!(BannerBehavior {
    auto_show: ["autoShow"],
    dismiss_on_scroll: ["dismissOnScroll"],
    show_preferences: ["showPreferences"],
    cookie_expiry: ["cookieExpiry"],
});

lenient_struct!(BannerBranding {
    logo: ["logo"],
    privacy_policy: ["privacyPolicy"],
});

lenient_struct!(BrandingLogo {
    url: ["url"],
    alt: ["alt"],
    position: ["position"],
    height: ["height"],
});

lenient_struct!(PrivacyPolicyLink {
    url: ["url"],
    text: ["text"],
    open_in_new_tab: ["openInNewTab"],
});

lenient_struct!(BannerLayout {
    width: ["width"],
    custom_width: ["customWidth"],
    max_width: ["maxWidth"],
    border_radius: ["borderRadius"],
    padding: ["padding"],
    margin: ["margin"],
    shadow: ["shadow"],
    animation: ["animation"],
});

lenient_struct!(TrackingScripts {
    strictly_necessary: ["strictlyNecessary"],
    functionality: ["functionality"],
    tracking_performance: ["trackingPerformance"],
    targeting_advertising: ["targetingAdvertising"],
});

lenient_struct!(TrackingScript {
    id: ["id"],
    name: ["name"],
    category: ["category"],
    script_code: ["scriptCode"],
    enabled: ["enabled"],
});

lenient_struct!(AdvancedSettings {
    google_consent_mode: ["googleConsentMode"],
    custom_css: ["customCSS", "customCss"],
    custom_js: ["customJS", "customJs"],
    performance: ["performance"],
});

lenient_struct!(PerformanceSettings {
    defer_non_critical_scripts: ["deferNonCriticalScripts"],
    inline_critical_css: ["inlineCriticalCSS", "inlineCriticalCss"],
});

#[derive(Debug, thiserror::Error)]
pub enum BannerConfigError {
    #[error("failed to read banner config `{}`: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid banner config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid banner config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("unsupported banner config file `{0}`; expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
}

impl BannerConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, BannerConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, BannerConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Loads a config file, picking the format from its extension.
    pub fn load(path: &Path) -> Result<Self, BannerConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        let raw = fs::read_to_string(path).map_err(|source| BannerConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = match extension.as_str() {
            "json" => Self::from_json_str(&raw)?,
            "yaml" | "yml" => Self::from_yaml_str(&raw)?,
            _ => {
                return Err(BannerConfigError::UnsupportedFormat(path.display().to_string()));
            }
        };

        debug!(
            path = %path.display(),
            position = %config.position,
            script_count = ScriptBucket::ALL
                .iter()
                .map(|bucket| config.scripts.bucket(*bucket).len())
                .sum::<usize>(),
            "loaded banner config"
        );
        Ok(config)
    }
}
