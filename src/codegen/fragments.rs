//! Escaping helpers and the line writer shared by the HTML/CSS/JS renderers.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<script\b[^>]*>").expect("valid script tag regex"));
static SRC_ATTRIBUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid src attribute regex")
});
static EXTERNAL_SCRIPT_ELEMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*\ssrc\s*=[^>]*>.*?</script\s*>")
        .expect("valid external script regex")
});
static HTML_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid html comment regex"));
static SCRIPT_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)</?script\b[^>]*>").expect("valid script tag regex"));

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Single-quoted JS string literal that is also safe inside an inline
/// `<script>` element.
pub fn js_string_literal(raw: &str) -> String {
    let mut literal = String::with_capacity(raw.len() + 2);
    literal.push('\'');
    for ch in raw.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '<' => literal.push_str("\\x3C"),
            '\u{2028}' => literal.push_str("\\u2028"),
            '\u{2029}' => literal.push_str("\\u2029"),
            other => literal.push(other),
        }
    }
    literal.push('\'');
    literal
}

/// Backtick template literal body. `\`, `` ` `` and `$` are escaped so the
/// code is carried as data; `</` and `<!--` are broken up so the enclosing
/// script element cannot be terminated early.
pub fn template_literal(code: &str) -> String {
    let escaped = code
        .replace('\\', "\\\\")
        .replace('`', "\\`")
        .replace('$', "\\$")
        .replace("</", "<\\/")
        .replace("<!--", "<\\!--");
    format!("`{escaped}`")
}

/// Text usable after `//` on a single line inside an inline `<script>`.
/// `<` is written as `\x3C` so the comment cannot end the element.
pub fn js_comment_text(raw: &str) -> String {
    let mut text = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        match ch {
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => text.push(' '),
            '<' => text.push_str("\\x3C"),
            other => text.push(other),
        }
    }
    text.trim().to_owned()
}

/// A tracking script split into the parts the generated loader handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedScript {
    /// `src` URLs of external `<script>` elements, in source order.
    pub external_sources: Vec<String>,
    /// Inline code left after removing external elements, script tags and
    /// HTML comments.
    pub inline_code: Option<String>,
}

impl EmbeddedScript {
    pub fn from_code(code: &str) -> Self {
        let external_sources = SCRIPT_OPEN_TAG
            .find_iter(code)
            .filter_map(|tag| SRC_ATTRIBUTE.captures(tag.as_str()))
            .filter_map(|captures| captures.get(1))
            .map(|src| src.as_str().trim().to_owned())
            .filter(|src| !src.is_empty())
            .collect();

        let without_external = EXTERNAL_SCRIPT_ELEMENT.replace_all(code, "");
        let without_comments = HTML_COMMENT.replace_all(&without_external, "");
        let inline = SCRIPT_TAG.replace_all(&without_comments, "");
        let inline = inline.trim();

        Self {
            external_sources,
            inline_code: (!inline.is_empty()).then(|| inline.to_owned()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.external_sources.is_empty() && self.inline_code.is_none()
    }
}

/// Indentation-aware line buffer used to assemble generated code.
#[derive(Debug, Default)]
pub struct CodeWriter {
    out: String,
    depth: usize,
}

const INDENT: &str = "  ";

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Writes a line and indents everything after it.
    pub fn open(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.line(text);
        self.depth += 1;
        self
    }

    pub fn close(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(text)
    }

    /// Closes and reopens a block on one line, as in `} else {`.
    pub fn reopen(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.close(text);
        self.depth += 1;
        self
    }

    /// Writes user-supplied text as-is, without indentation.
    pub fn verbatim(&mut self, text: &str) -> &mut Self {
        let text = text.trim_end();
        if !text.is_empty() {
            self.out.push_str(text);
            self.out.push('\n');
        }
        self
    }

    pub fn finish(self) -> String {
        self.out.trim_end().to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CodeWriter, EmbeddedScript, escape_html, js_comment_text, js_string_literal,
        template_literal,
    };

    #[test]
    fn html_escape_covers_markup_and_quotes() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn template_literal_escapes_interpolation_and_terminators() {
        assert_eq!(template_literal(r"a\b"), r"`a\\b`");
        assert_eq!(template_literal("`${x}`"), r"`\`\${x}\``");
        assert_eq!(template_literal("'</div>'"), r"`'<\/div>'`");
    }

    #[test]
    fn js_string_literal_is_safe_inside_script_elements() {
        assert_eq!(
            js_string_literal("it's\n</script>"),
            r"'it\'s\n\x3C/script>'"
        );
    }

    #[test]
    fn js_comment_text_stays_on_one_line() {
        assert_eq!(js_comment_text(" Pixel\nalert(1) "), "Pixel alert(1)");
        assert_eq!(js_comment_text("</script><!-- x"), r"\x3C/script>\x3C!-- x");
    }

    #[test]
    fn inline_script_tags_and_comments_are_stripped() {
        let script = EmbeddedScript::from_code(
            "<!-- Hotjar -->\n<script type=\"text/javascript\">\n  hj('init');\n</script>",
        );
        assert!(script.external_sources.is_empty());
        assert_eq!(script.inline_code.as_deref(), Some("hj('init');"));
    }

    #[test]
    fn external_sources_are_detected_and_removed_from_inline_code() {
        let script = EmbeddedScript::from_code(
            "<script async src=\"https://www.googletagmanager.com/gtag/js?id=G-1\"></script>\n\
             <script>\n  window.dataLayer = window.dataLayer || [];\n</script>",
        );
        assert_eq!(
            script.external_sources,
            vec!["https://www.googletagmanager.com/gtag/js?id=G-1".to_owned()]
        );
        assert_eq!(
            script.inline_code.as_deref(),
            Some("window.dataLayer = window.dataLayer || [];")
        );
    }

    #[test]
    fn src_assignments_in_plain_code_stay_inline() {
        let script =
            EmbeddedScript::from_code("var s = document.createElement('img'); s.src = \"/p.gif\";");
        assert!(script.external_sources.is_empty());
        assert!(script.inline_code.is_some());
    }

    #[test]
    fn data_src_attributes_are_not_external_sources() {
        let script = EmbeddedScript::from_code(r#"<script data-src="x.js">init();</script>"#);
        assert!(script.external_sources.is_empty());
        assert_eq!(script.inline_code.as_deref(), Some("init();"));

        let script =
            EmbeddedScript::from_code(r#"<script data-src="x.js" src="/real.js"></script>"#);
        assert_eq!(script.external_sources, vec!["/real.js".to_owned()]);
        assert!(script.inline_code.is_none());
    }

    #[test]
    fn comment_only_code_is_empty() {
        assert!(EmbeddedScript::from_code("<!-- nothing here -->").is_empty());
    }

    #[test]
    fn code_writer_indents_nested_blocks() {
        let mut writer = CodeWriter::new();
        writer.open("if (a) {").line("b();").close("}");
        writer.verbatim("  raw();\n");
        assert_eq!(writer.finish(), "if (a) {\n  b();\n}\n  raw();");
    }
}
