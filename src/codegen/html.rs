use crate::banner::{
    BannerConfig, BannerLayout, BrandingLogo, LogoPosition, ShadowSize, WidthMode,
};

use super::TextEscaping;
use super::fragments::CodeWriter;

pub const BANNER_ELEMENT_ID: &str = "cookie-banner";
pub const ACCEPT_BUTTON_ID: &str = "accept-cookies";
pub const REJECT_BUTTON_ID: &str = "reject-cookies";
pub const PREFERENCES_BUTTON_ID: &str = "preferences-cookies";
pub const SAVE_PREFERENCES_BUTTON_ID: &str = "save-preferences";
pub const CLOSE_BUTTON_ID: &str = "close-cookie-banner";
pub const PREFERENCES_PANEL_ID: &str = "cookie-preferences-panel";

const Z_INDEX: u32 = 2_147_483_647;

/// Checkbox id and label for each consent category, in display order.
pub const PREFERENCE_CHECKBOXES: [(&str, &str); 4] = [
    ("pref-necessary", "Strictly Necessary"),
    ("pref-functionality", "Functionality"),
    ("pref-analytics", "Analytics &amp; Performance"),
    ("pref-marketing", "Targeting &amp; Advertising"),
];

pub fn render(config: &BannerConfig, escaping: TextEscaping) -> String {
    let esc = |raw: &str| escaping.apply(raw).into_owned();
    let colors = &config.colors;

    let root_style = format!(
        "display:none;position:fixed;z-index:{Z_INDEX};{}{}background-color:{};color:{};",
        config.position.css_fragment(),
        layout_style(&config.layout),
        esc(&colors.background),
        esc(&colors.text),
    );

    let mut html = CodeWriter::new();
    html.open(format!(
        r#"<div id="{BANNER_ELEMENT_ID}" class="cookie-banner cookie-banner--{} cookie-banner--{}" role="dialog" aria-live="polite" aria-label="{}" style="{root_style}">"#,
        config.theme,
        config.position,
        esc(&config.text.title),
    ));

    if config.position.has_close_button() {
        html.line(format!(
            r#"<button type="button" id="{CLOSE_BUTTON_ID}" class="cookie-banner__close" aria-label="Close" style="position:absolute;top:8px;right:12px;background:none;border:none;font-size:20px;line-height:1;cursor:pointer;color:{};">&times;</button>"#,
            esc(&colors.text),
        ));
    }

    let logo = config.branding.visible_logo();
    if let Some(logo) = logo.filter(|logo| logo.position == LogoPosition::Center) {
        html.open(r#"<div class="cookie-banner__logo-row">"#);
        html.line(logo_tag(logo, escaping));
        html.close("</div>");
    }

    html.open(r#"<div class="cookie-banner__content">"#);
    if let Some(logo) = logo.filter(|logo| logo.position == LogoPosition::Left) {
        html.line(logo_tag(logo, escaping));
    }

    html.open(r#"<div class="cookie-banner__text">"#);
    if !config.text.title.trim().is_empty() {
        html.line(format!(
            r#"<h3 class="cookie-banner__title">{}</h3>"#,
            esc(&config.text.title)
        ));
    }
    let privacy_link = config.branding.visible_privacy_policy().map(|link| {
        let target = if link.open_in_new_tab {
            r#" target="_blank" rel="noopener noreferrer""#
        } else {
            ""
        };
        format!(
            r#"<a href="{}" class="cookie-banner__link" style="color:{};"{target}>{}</a>"#,
            esc(&link.url),
            esc(&colors.link),
            esc(&link.text),
        )
    });
    let message = esc(&config.text.message);
    match (message.trim().is_empty(), privacy_link) {
        (true, None) => {}
        (true, Some(link)) => {
            html.line(format!(r#"<p class="cookie-banner__message">{link}</p>"#));
        }
        (false, None) => {
            html.line(format!(r#"<p class="cookie-banner__message">{message}</p>"#));
        }
        (false, Some(link)) => {
            html.line(format!(r#"<p class="cookie-banner__message">{message} {link}</p>"#));
        }
    }
    html.close("</div>");

    if let Some(logo) = logo.filter(|logo| logo.position == LogoPosition::Right) {
        html.line(logo_tag(logo, escaping));
    }

    html.open(r#"<div class="cookie-banner__actions">"#);
    if config.behavior.show_preferences {
        html.line(format!(
            r#"<button type="button" id="{PREFERENCES_BUTTON_ID}" class="cookie-banner__button cookie-banner__button--link" style="background:none;border:none;color:{};text-decoration:underline;">{}</button>"#,
            esc(&colors.link),
            esc(&config.text.preferences_button),
        ));
    }
    html.line(format!(
        r#"<button type="button" id="{REJECT_BUTTON_ID}" class="cookie-banner__button cookie-banner__button--secondary" style="background:transparent;color:{0};border:1px solid {0};">{1}</button>"#,
        esc(&colors.text),
        esc(&config.text.reject_button),
    ));
    html.line(format!(
        r#"<button type="button" id="{ACCEPT_BUTTON_ID}" class="cookie-banner__button cookie-banner__button--primary" style="{}">{}</button>"#,
        primary_button_style(config, escaping),
        esc(&config.text.accept_button),
    ));
    html.close("</div>");
    html.close("</div>");

    if config.behavior.show_preferences {
        html.open(format!(
            r#"<div id="{PREFERENCES_PANEL_ID}" class="cookie-banner__preferences" style="display:none;">"#
        ));
        for (index, (id, label)) in PREFERENCE_CHECKBOXES.iter().enumerate() {
            let locked = if index == 0 { " checked disabled" } else { "" };
            html.line(format!(
                r#"<label class="cookie-banner__option" for="{id}"><input type="checkbox" id="{id}"{locked}> {label}</label>"#
            ));
        }
        html.line(format!(
            r#"<button type="button" id="{SAVE_PREFERENCES_BUTTON_ID}" class="cookie-banner__button cookie-banner__button--primary" style="{}">Save Preferences</button>"#,
            primary_button_style(config, escaping),
        ));
        html.close("</div>");
    }

    html.close("</div>");
    html.finish()
}

/// Width, spacing and shadow declarations derived from the layout settings.
pub fn layout_style(layout: &BannerLayout) -> String {
    let mut style = String::new();
    match layout.width {
        WidthMode::Custom => style.push_str(&format!("width:{}px;", layout.custom_width)),
        WidthMode::Container => {
            style.push_str(&format!("max-width:{}px;margin:0 auto;", layout.max_width))
        }
        WidthMode::Full => style.push_str("width:100%;"),
    }
    if layout.border_radius > 0 {
        style.push_str(&format!("border-radius:{}px;", layout.border_radius));
    }
    if layout.padding > 0 {
        style.push_str(&format!("padding:{}px;", layout.padding));
    }
    if layout.margin > 0 && layout.width != WidthMode::Container {
        style.push_str(&format!("margin:{}px;", layout.margin));
    }
    if let Some(shadow) = box_shadow(layout.shadow) {
        style.push_str(&format!("box-shadow:{shadow};"));
    }
    style.push_str("box-sizing:border-box;");
    style
}

pub fn box_shadow(size: ShadowSize) -> Option<&'static str> {
    match size {
        ShadowSize::None => None,
        ShadowSize::Small => Some("0 1px 3px rgba(0,0,0,0.12)"),
        ShadowSize::Medium => Some("0 4px 12px rgba(0,0,0,0.15)"),
        ShadowSize::Large => Some("0 10px 30px rgba(0,0,0,0.25)"),
    }
}

fn primary_button_style(config: &BannerConfig, escaping: TextEscaping) -> String {
    format!(
        "background:{0};color:{1};border:1px solid {0};",
        escaping.apply(&config.colors.button),
        escaping.apply(&config.colors.button_text),
    )
}

fn logo_tag(logo: &BrandingLogo, escaping: TextEscaping) -> String {
    format!(
        r#"<img src="{}" alt="{}" class="cookie-banner__logo cookie-banner__logo--{}" style="height:{}px;width:auto;">"#,
        escaping.apply(&logo.url),
        escaping.apply(&logo.alt),
        logo.position,
        logo.height,
    )
}

#[cfg(test)]
mod tests {
    use super::{box_shadow, layout_style, render};
    use crate::banner::{
        BannerConfig, BannerLayout, BannerPosition, BrandingLogo, LogoPosition, PrivacyPolicyLink,
        ShadowSize, WidthMode,
    };
    use crate::codegen::TextEscaping;

    fn html_for(config: &BannerConfig) -> String {
        render(config, TextEscaping::Escape)
    }

    #[test]
    fn root_element_is_hidden_until_the_script_shows_it() {
        let html = html_for(&BannerConfig::default());
        assert!(html.starts_with(r#"<div id="cookie-banner""#));
        assert!(html.contains(r#"style="display:none;position:fixed;"#));
    }

    #[test]
    fn every_position_emits_its_fragment() {
        let mut config = BannerConfig::default();
        for position in BannerPosition::ALL {
            config.position = *position;
            let html = html_for(&config);
            let expected = format!("position:fixed;z-index:2147483647;{}", position.css_fragment());
            assert!(html.contains(&expected), "missing fragment for {position}");
        }
    }

    #[test]
    fn unrecognized_position_renders_as_bottom_bar() {
        let config = BannerConfig::from_json_str(r#"{"position":"diagonal"}"#)
            .expect("config should parse");
        assert!(html_for(&config).contains("bottom:0;left:0;right:0;"));
    }

    #[test]
    fn layout_style_follows_width_mode() {
        let mut layout = BannerLayout {
            width: WidthMode::Custom,
            custom_width: 480,
            border_radius: 0,
            padding: 0,
            shadow: ShadowSize::None,
            ..BannerLayout::default()
        };
        assert_eq!(layout_style(&layout), "width:480px;box-sizing:border-box;");

        layout.width = WidthMode::Container;
        layout.max_width = 960;
        layout.margin = 12;
        assert_eq!(
            layout_style(&layout),
            "max-width:960px;margin:0 auto;box-sizing:border-box;"
        );

        layout.width = WidthMode::Full;
        layout.border_radius = 6;
        layout.padding = 16;
        layout.shadow = ShadowSize::Small;
        assert_eq!(
            layout_style(&layout),
            "width:100%;border-radius:6px;padding:16px;margin:12px;box-shadow:0 1px 3px rgba(0,0,0,0.12);box-sizing:border-box;"
        );
    }

    #[test]
    fn shadow_sizes_map_to_fixed_values() {
        assert_eq!(box_shadow(ShadowSize::None), None);
        assert_eq!(box_shadow(ShadowSize::Medium), Some("0 4px 12px rgba(0,0,0,0.15)"));
        assert_eq!(box_shadow(ShadowSize::Large), Some("0 10px 30px rgba(0,0,0,0.25)"));
    }

    #[test]
    fn close_button_only_for_floating_and_modal_positions() {
        let mut config = BannerConfig::default();
        config.position = BannerPosition::Bottom;
        assert!(!html_for(&config).contains("close-cookie-banner"));

        config.position = BannerPosition::Center;
        assert!(html_for(&config).contains(r#"id="close-cookie-banner""#));
        assert!(html_for(&config).contains("&times;"));
    }

    #[test]
    fn logo_placement_controls_image_position() {
        let mut config = BannerConfig::default();
        config.branding.logo = Some(BrandingLogo {
            url: "https://cdn.test/logo.svg".to_owned(),
            position: LogoPosition::Right,
            ..BrandingLogo::default()
        });
        let html = html_for(&config);
        let img = html.find("<img").expect("logo should render");
        let text = html.find("cookie-banner__text").expect("text block should render");
        let actions = html.find("cookie-banner__actions").expect("actions should render");
        assert!(text < img && img < actions);

        if let Some(logo) = config.branding.logo.as_mut() {
            logo.position = LogoPosition::Hidden;
        }
        assert!(!html_for(&config).contains("<img"));
    }

    #[test]
    fn privacy_link_honors_new_tab_flag() {
        let mut config = BannerConfig::default();
        config.branding.privacy_policy = Some(PrivacyPolicyLink {
            url: "https://shop.test/privacy".to_owned(),
            ..PrivacyPolicyLink::default()
        });
        let html = html_for(&config);
        assert!(html.contains(r#"href="https://shop.test/privacy""#));
        assert!(html.contains(r#"target="_blank" rel="noopener noreferrer""#));

        if let Some(link) = config.branding.privacy_policy.as_mut() {
            link.open_in_new_tab = false;
        }
        assert!(!html_for(&config).contains("_blank"));

        if let Some(link) = config.branding.privacy_policy.as_mut() {
            link.url = "  ".to_owned();
        }
        assert!(!html_for(&config).contains("cookie-banner__link"));
    }

    #[test]
    fn preferences_panel_has_locked_necessary_checkbox() {
        let html = html_for(&BannerConfig::default());
        assert!(html.contains(r#"id="preferences-cookies""#));
        assert!(html.contains(r#"<input type="checkbox" id="pref-necessary" checked disabled>"#));
        assert!(html.contains(r#"<input type="checkbox" id="pref-marketing">"#));
        assert!(html.contains(
            r#"id="cookie-preferences-panel" class="cookie-banner__preferences" style="display:none;""#
        ));
    }

    #[test]
    fn disabled_preferences_remove_button_and_panel() {
        let mut config = BannerConfig::default();
        config.behavior.show_preferences = false;
        let html = html_for(&config);
        assert!(!html.contains("preferences-cookies"));
        assert!(!html.contains("cookie-preferences-panel"));
        assert!(!html.contains("pref-necessary"));
    }

    #[test]
    fn user_text_is_escaped_by_default() {
        let mut config = BannerConfig::default();
        config.text.title = "<img src=x onerror=alert(1)>".to_owned();
        config.text.accept_button = "OK \"now\"".to_owned();
        let html = html_for(&config);
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(html.contains("OK &quot;now&quot;"));
    }

    #[test]
    fn verbatim_mode_interpolates_text_unmodified() {
        let mut config = BannerConfig::default();
        config.text.message = "Read <strong>this</strong>".to_owned();
        let html = render(&config, TextEscaping::Verbatim);
        let expected = r#"<p class="cookie-banner__message">Read <strong>this</strong></p>"#;
        assert!(html.contains(expected));
    }

    #[test]
    fn empty_title_omits_heading() {
        let mut config = BannerConfig::default();
        config.text.title = String::new();
        assert!(!html_for(&config).contains("<h3"));
    }
}
