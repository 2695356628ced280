use crate::banner::{BannerAnimation, BannerConfig};

use super::fragments::CodeWriter;

pub const VISIBLE_CLASS: &str = "cookie-banner--visible";
const NARROW_VIEWPORT_MAX_WIDTH: u32 = 640;

const BASE_RULES: &str = r#"#cookie-banner {
  font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif;
  font-size: 14px;
  line-height: 1.5;
}
#cookie-banner *,
#cookie-banner *::before,
#cookie-banner *::after {
  box-sizing: border-box;
}
#cookie-banner .cookie-banner__content {
  display: flex;
  align-items: center;
  flex-wrap: wrap;
  gap: 16px;
}
#cookie-banner .cookie-banner__logo-row {
  text-align: center;
  margin-bottom: 12px;
}
#cookie-banner .cookie-banner__text {
  flex: 1 1 280px;
}
#cookie-banner .cookie-banner__title {
  margin: 0 0 8px;
  font-size: 16px;
  font-weight: 600;
}
#cookie-banner .cookie-banner__message {
  margin: 0;
}
#cookie-banner .cookie-banner__link {
  text-decoration: underline;
}
#cookie-banner .cookie-banner__actions {
  display: flex;
  flex-wrap: wrap;
  gap: 8px;
}
#cookie-banner .cookie-banner__button {
  padding: 8px 16px;
  border-radius: 4px;
  font-size: 14px;
  font-weight: 500;
  cursor: pointer;
}
#cookie-banner .cookie-banner__preferences {
  margin-top: 16px;
  padding-top: 16px;
  border-top: 1px solid rgba(127, 127, 127, 0.3);
}
#cookie-banner .cookie-banner__option {
  display: flex;
  align-items: center;
  gap: 8px;
  margin-bottom: 8px;
}"#;

/// Keyframes for the entrance animation. `translate`/`scale` are used
/// instead of `transform` so centered positions keep their offset.
fn animation_keyframes(animation: BannerAnimation) -> Option<(&'static str, &'static str)> {
    match animation {
        BannerAnimation::None => None,
        BannerAnimation::Fade => Some((
            "0.4s ease-out",
            "@keyframes cookie-banner-fade {\n  from { opacity: 0; }\n  to { opacity: 1; }\n}",
        )),
        BannerAnimation::Slide => Some((
            "0.4s ease-out",
            "@keyframes cookie-banner-slide {\n  from { opacity: 0; translate: 0 24px; }\n  to { opacity: 1; translate: 0 0; }\n}",
        )),
        BannerAnimation::Bounce => Some((
            "0.6s ease-out",
            "@keyframes cookie-banner-bounce {\n  0% { opacity: 0; translate: 0 24px; }\n  60% { opacity: 1; translate: 0 -6px; }\n  80% { translate: 0 2px; }\n  100% { translate: 0 0; }\n}",
        )),
        BannerAnimation::Pulse => Some((
            "0.6s ease-in-out",
            "@keyframes cookie-banner-pulse {\n  0% { opacity: 0; scale: 0.96; }\n  50% { opacity: 1; scale: 1.02; }\n  100% { scale: 1; }\n}",
        )),
    }
}

pub fn render(config: &BannerConfig) -> String {
    let mut css = CodeWriter::new();
    css.line("/* Cookie consent banner */");
    css.verbatim(BASE_RULES);

    if let Some((timing, keyframes)) = animation_keyframes(config.layout.animation) {
        css.blank();
        css.verbatim(keyframes);
        css.open(format!("#cookie-banner.{VISIBLE_CLASS} {{"));
        css.line(format!(
            "animation: cookie-banner-{} {timing};",
            config.layout.animation
        ));
        css.close("}");
    }

    css.blank();
    css.open(format!("@media (max-width: {NARROW_VIEWPORT_MAX_WIDTH}px) {{"));
    css.open("#cookie-banner {");
    css.line("top: auto !important;");
    css.line("bottom: 0 !important;");
    css.line("left: 0 !important;");
    css.line("right: 0 !important;");
    css.line("width: auto !important;");
    css.line("max-width: none !important;");
    css.line("margin: 0 !important;");
    css.line("border-radius: 0 !important;");
    css.line("transform: none !important;");
    css.close("}");
    css.open("#cookie-banner .cookie-banner__content {");
    css.line("flex-direction: column;");
    css.line("align-items: stretch;");
    css.close("}");
    css.open("#cookie-banner .cookie-banner__actions {");
    css.line("flex-direction: column;");
    css.close("}");
    css.open("#cookie-banner .cookie-banner__button {");
    css.line("width: 100%;");
    css.close("}");
    css.close("}");

    if !config.advanced.custom_css.trim().is_empty() {
        css.blank();
        css.line("/* Custom CSS */");
        css.verbatim(&config.advanced.custom_css);
    }

    css.finish()
}

#[cfg(test)]
mod tests {
    use super::render;
    use crate::banner::{BannerAnimation, BannerConfig};

    fn css_with(animation: BannerAnimation) -> String {
        let mut config = BannerConfig::default();
        config.layout.animation = animation;
        render(&config)
    }

    #[test]
    fn each_animation_selects_its_keyframes() {
        for (animation, name) in [
            (BannerAnimation::Fade, "cookie-banner-fade"),
            (BannerAnimation::Slide, "cookie-banner-slide"),
            (BannerAnimation::Bounce, "cookie-banner-bounce"),
            (BannerAnimation::Pulse, "cookie-banner-pulse"),
        ] {
            let css = css_with(animation);
            assert!(css.contains(&format!("@keyframes {name} {{")));
            assert!(css.contains(&format!("animation: {name} ")));
            assert_eq!(css.matches("@keyframes").count(), 1);
        }
    }

    #[test]
    fn no_animation_emits_no_keyframes() {
        let css = css_with(BannerAnimation::None);
        assert!(!css.contains("@keyframes"));
        assert!(!css.contains("animation:"));
    }

    #[test]
    fn narrow_viewport_rules_are_always_present() {
        let css = css_with(BannerAnimation::None);
        assert!(css.contains("@media (max-width: 640px) {"));
        assert!(css.contains("transform: none !important;"));
    }

    #[test]
    fn custom_css_is_appended_last_and_unmodified() {
        let mut config = BannerConfig::default();
        config.advanced.custom_css = "#cookie-banner { font-family: \"Inter\"; }".to_owned();
        let css = render(&config);
        assert!(css.ends_with("/* Custom CSS */\n#cookie-banner { font-family: \"Inter\"; }"));
    }
}
