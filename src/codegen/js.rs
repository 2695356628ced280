use crate::banner::{BannerConfig, ScriptBucket, TrackingScript};
use crate::consent::{
    CONSENT_COOKIE_NAME, CONSENT_COOKIE_PATH, CONSENT_COOKIE_SAME_SITE, ConsentRecord,
};

use super::css::VISIBLE_CLASS;
use super::fragments::{
    CodeWriter, EmbeddedScript, js_comment_text, js_string_literal, template_literal,
};
use super::html::{
    ACCEPT_BUTTON_ID, BANNER_ELEMENT_ID, CLOSE_BUTTON_ID, PREFERENCE_CHECKBOXES,
    PREFERENCES_BUTTON_ID, PREFERENCES_PANEL_ID, REJECT_BUTTON_ID, SAVE_PREFERENCES_BUTTON_ID,
};

const SCROLL_DISMISS_DELAY_MS: u32 = 1_000;
const CONSENT_MODE_WAIT_FOR_UPDATE_MS: u32 = 500;

/// Google Consent Mode v2 signals and the consent record field granting each.
const CONSENT_MODE_SIGNALS: [(&str, &str); 5] = [
    ("ad_storage", "marketing"),
    ("ad_user_data", "marketing"),
    ("ad_personalization", "marketing"),
    ("analytics_storage", "analytics"),
    ("functionality_storage", "functionality"),
];

pub fn render(config: &BannerConfig) -> String {
    let consent_mode = config.advanced.google_consent_mode;
    let show_preferences = config.behavior.show_preferences;

    let mut js = CodeWriter::new();
    js.open("(function () {");
    js.line("'use strict';");
    js.blank();
    js.line(format!(
        "var COOKIE_NAME = {};",
        js_string_literal(CONSENT_COOKIE_NAME)
    ));
    js.line(format!(
        "var COOKIE_EXPIRY_DAYS = {};",
        config.behavior.cookie_expiry
    ));
    js.line(format!("var AUTO_SHOW = {};", config.behavior.auto_show));
    js.line("var banner = null;");

    if consent_mode {
        write_consent_mode_default(&mut js);
    }
    write_cookie_helpers(&mut js);
    write_visibility_helpers(&mut js);
    write_script_loaders(&mut js);
    write_strictly_necessary_loader(&mut js, config);
    write_consented_loader(&mut js, config);
    write_scheduler(&mut js, config.advanced.performance.defer_non_critical_scripts);
    if consent_mode {
        write_consent_mode_update(&mut js);
    }
    write_apply_consent(&mut js, consent_mode);
    if show_preferences {
        write_preference_helpers(&mut js);
    }
    write_init(&mut js, config);

    js.blank();
    js.open("window.CookieConsentBanner = {");
    js.line("show: showBanner,");
    js.line("hide: hideBanner,");
    js.line("getConsent: getConsent");
    js.close("};");
    js.blank();
    js.open("if (document.readyState === 'loading') {");
    js.line("document.addEventListener('DOMContentLoaded', init);");
    js.reopen("} else {");
    js.line("init();");
    js.close("}");
    js.close("})();");
    js.finish()
}

fn write_consent_mode_default(js: &mut CodeWriter) {
    js.blank();
    js.open("if (typeof gtag !== 'undefined') {");
    js.open("gtag('consent', 'default', {");
    for (signal, _) in CONSENT_MODE_SIGNALS {
        js.line(format!("'{signal}': 'denied',"));
    }
    js.line(format!("'wait_for_update': {CONSENT_MODE_WAIT_FOR_UPDATE_MS}"));
    js.close("});");
    js.close("}");
}

fn write_consent_mode_update(js: &mut CodeWriter) {
    js.blank();
    js.open("function updateConsentMode(consent) {");
    js.open("if (typeof gtag !== 'undefined') {");
    js.open("gtag('consent', 'update', {");
    let last = CONSENT_MODE_SIGNALS.len() - 1;
    for (index, (signal, field)) in CONSENT_MODE_SIGNALS.iter().enumerate() {
        let separator = if index == last { "" } else { "," };
        js.line(format!(
            "'{signal}': consent.{field} ? 'granted' : 'denied'{separator}"
        ));
    }
    js.close("});");
    js.close("}");
    js.close("}");
}

fn write_cookie_helpers(js: &mut CodeWriter) {
    js.blank();
    js.open("function getConsent() {");
    js.line("var pairs = document.cookie ? document.cookie.split('; ') : [];");
    js.open("for (var i = 0; i < pairs.length; i++) {");
    js.line("var index = pairs[i].indexOf('=');");
    js.open("if (pairs[i].substring(0, index) === COOKIE_NAME) {");
    js.open("try {");
    js.line("var consent = JSON.parse(decodeURIComponent(pairs[i].substring(index + 1)));");
    js.line("consent.essential = true;");
    js.line("return consent;");
    js.reopen("} catch (e) {");
    js.line("return null;");
    js.close("}");
    js.close("}");
    js.close("}");
    js.line("return null;");
    js.close("}");

    js.blank();
    js.open("function setConsent(consent) {");
    js.line("var lifetime = COOKIE_EXPIRY_DAYS * 24 * 60 * 60 * 1000;");
    js.line("var expires = new Date(Date.now() + lifetime).toUTCString();");
    js.line("var secure = window.location.protocol === 'https:' ? '; Secure' : '';");
    js.line(format!(
        "document.cookie = COOKIE_NAME + '=' + encodeURIComponent(JSON.stringify(consent)) + '; expires=' + expires + '; path={CONSENT_COOKIE_PATH}; SameSite={CONSENT_COOKIE_SAME_SITE}' + secure;"
    ));
    js.close("}");
}

fn write_visibility_helpers(js: &mut CodeWriter) {
    js.blank();
    js.open("function showBanner() {");
    js.open("if (banner) {");
    js.line("banner.style.display = 'block';");
    js.line(format!("banner.classList.add('{VISIBLE_CLASS}');"));
    js.close("}");
    js.close("}");

    js.blank();
    js.open("function hideBanner() {");
    js.open("if (banner) {");
    js.line("banner.style.display = 'none';");
    js.line(format!("banner.classList.remove('{VISIBLE_CLASS}');"));
    js.close("}");
    js.close("}");
}

fn write_script_loaders(js: &mut CodeWriter) {
    js.blank();
    js.open("function runInlineScript(code) {");
    js.line("var script = document.createElement('script');");
    js.line("script.text = code;");
    js.line("document.head.appendChild(script);");
    js.close("}");

    js.blank();
    js.open("function loadExternalScript(src) {");
    js.line("var script = document.createElement('script');");
    js.line("script.src = src;");
    js.line("script.async = true;");
    js.line("document.head.appendChild(script);");
    js.close("}");
}

fn write_tracking_script(js: &mut CodeWriter, script: &TrackingScript) {
    let embedded = EmbeddedScript::from_code(&script.script_code);
    if embedded.is_empty() {
        return;
    }

    let label = js_comment_text(if script.name.trim().is_empty() {
        &script.id
    } else {
        &script.name
    });
    if !label.is_empty() {
        js.line(format!("// {label}"));
    }
    for src in &embedded.external_sources {
        js.line(format!("loadExternalScript({});", js_string_literal(src)));
    }
    if let Some(code) = &embedded.inline_code {
        js.line(format!("runInlineScript({});", template_literal(code)));
    }
}

fn write_strictly_necessary_loader(js: &mut CodeWriter, config: &BannerConfig) {
    js.blank();
    js.open("function loadStrictlyNecessaryScripts() {");
    for script in config.scripts.runnable(ScriptBucket::StrictlyNecessary) {
        write_tracking_script(js, script);
    }
    js.close("}");
}

fn write_consented_loader(js: &mut CodeWriter, config: &BannerConfig) {
    js.blank();
    js.open("function loadConsentedScripts(consent) {");
    for bucket in ScriptBucket::ALL {
        let Some(consent_key) = bucket.consent_key() else {
            continue;
        };
        let mut scripts = config.scripts.runnable(bucket).peekable();
        if scripts.peek().is_none() {
            continue;
        }
        js.open(format!("if (consent.{consent_key}) {{"));
        for script in scripts {
            write_tracking_script(js, script);
        }
        js.close("}");
    }
    js.close("}");
}

fn write_scheduler(js: &mut CodeWriter, defer: bool) {
    js.blank();
    js.open("function scheduleConsentedScripts(consent) {");
    if !defer {
        js.line("loadConsentedScripts(consent);");
        js.close("}");
        return;
    }

    js.open("var run = function () {");
    js.line("loadConsentedScripts(consent);");
    js.close("};");
    js.open("var schedule = function () {");
    js.open("if ('requestIdleCallback' in window) {");
    js.line("window.requestIdleCallback(run);");
    js.reopen("} else {");
    js.line("setTimeout(run, 1);");
    js.close("}");
    js.close("};");
    js.open("if (document.readyState === 'loading') {");
    js.line("document.addEventListener('DOMContentLoaded', schedule);");
    js.reopen("} else {");
    js.line("schedule();");
    js.close("}");
    js.close("}");
}

fn write_apply_consent(js: &mut CodeWriter, consent_mode: bool) {
    js.blank();
    js.open("function applyConsent(consent) {");
    js.line("setConsent(consent);");
    if consent_mode {
        js.line("updateConsentMode(consent);");
    }
    js.line("hideBanner();");
    js.line("scheduleConsentedScripts(consent);");
    js.close("}");
}

fn write_preference_helpers(js: &mut CodeWriter) {
    js.blank();
    js.open("function setChecked(id, value) {");
    js.line("var element = document.getElementById(id);");
    js.open("if (element && !element.disabled) {");
    js.line("element.checked = !!value;");
    js.close("}");
    js.close("}");

    js.blank();
    js.open("function isChecked(id) {");
    js.line("var element = document.getElementById(id);");
    js.line("return !!(element && element.checked);");
    js.close("}");

    js.blank();
    js.open("function syncPreferenceCheckboxes(consent) {");
    for (id, field) in preference_fields() {
        js.line(format!("setChecked('{id}', consent.{field});"));
    }
    js.close("}");

    js.blank();
    js.open("function togglePreferences() {");
    js.line(format!(
        "var panel = document.getElementById('{PREFERENCES_PANEL_ID}');"
    ));
    js.open("if (panel) {");
    js.line("panel.style.display = panel.style.display === 'none' ? 'block' : 'none';");
    js.close("}");
    js.close("}");
}

/// Checkbox ids for the optional categories paired with their consent field.
fn preference_fields() -> impl Iterator<Item = (&'static str, &'static str)> {
    PREFERENCE_CHECKBOXES
        .iter()
        .skip(1)
        .map(|(id, _)| *id)
        .zip(["functionality", "analytics", "marketing"])
}

fn write_init(js: &mut CodeWriter, config: &BannerConfig) {
    let consent_mode = config.advanced.google_consent_mode;
    let show_preferences = config.behavior.show_preferences;

    js.blank();
    js.open("function on(id, handler) {");
    js.line("var element = document.getElementById(id);");
    js.open("if (element) {");
    js.line("element.addEventListener('click', handler);");
    js.close("}");
    js.close("}");

    js.blank();
    js.open("function init() {");
    js.line(format!("banner = document.getElementById('{BANNER_ELEMENT_ID}');"));
    js.line("loadStrictlyNecessaryScripts();");
    js.blank();
    js.line("var existing = getConsent();");
    js.open("if (existing) {");
    if show_preferences {
        js.line("syncPreferenceCheckboxes(existing);");
    }
    if consent_mode {
        js.line("updateConsentMode(existing);");
    }
    js.line("hideBanner();");
    js.line("scheduleConsentedScripts(existing);");
    js.reopen("} else if (AUTO_SHOW) {");
    js.line("showBanner();");
    js.close("}");

    js.blank();
    js.open(format!("on('{ACCEPT_BUTTON_ID}', function () {{"));
    js.line(format!(
        "applyConsent({});",
        ConsentRecord::accept_all().to_js_literal()
    ));
    js.verbatim(&config.advanced.custom_js);
    js.close("});");
    js.open(format!("on('{REJECT_BUTTON_ID}', function () {{"));
    js.line(format!(
        "applyConsent({});",
        ConsentRecord::reject_all().to_js_literal()
    ));
    js.close("});");

    if show_preferences {
        js.line(format!("on('{PREFERENCES_BUTTON_ID}', togglePreferences);"));
        js.open(format!("on('{SAVE_PREFERENCES_BUTTON_ID}', function () {{"));
        js.open("applyConsent({");
        js.line("essential: true,");
        let mut fields = preference_fields().peekable();
        while let Some((id, field)) = fields.next() {
            let separator = if fields.peek().is_some() { "," } else { "" };
            js.line(format!("{field}: isChecked('{id}'){separator}"));
        }
        js.close("});");
        js.close("});");
    }

    if config.position.has_close_button() {
        js.line(format!("on('{CLOSE_BUTTON_ID}', hideBanner);"));
    }

    if config.behavior.dismiss_on_scroll {
        js.blank();
        js.line("var scrollTimer = null;");
        js.open("window.addEventListener('scroll', function () {");
        js.open("if (getConsent()) {");
        js.line("return;");
        js.close("}");
        js.line("clearTimeout(scrollTimer);");
        js.open("scrollTimer = setTimeout(function () {");
        js.open("if (!getConsent()) {");
        js.line("hideBanner();");
        js.close("}");
        js.close(format!("}}, {SCROLL_DISMISS_DELAY_MS});"));
        js.close("}, { passive: true });");
    }
    js.close("}");
}
