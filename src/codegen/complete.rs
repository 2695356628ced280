use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::fragments::CodeWriter;
use super::{BannerSnippet, CssDelivery};

const INSTRUCTIONS: &str = "<!--
  Cookie Consent Banner

  Installation:
  1. Paste the stylesheet and script from STEP 1 inside the head element of every page.
  2. Paste the banner markup from STEP 2 just before the closing body tag.

  The script keeps the banner hidden until it has checked for an existing
  `cookie_consent` cookie, and only loads optional tracking scripts after the
  visitor has agreed to their category.
-->";

pub fn assemble(snippet: &BannerSnippet) -> String {
    let mut out = CodeWriter::new();
    out.verbatim(INSTRUCTIONS);
    out.blank();

    out.line("<!-- STEP 1: add to <head> -->");
    match snippet.css_delivery {
        CssDelivery::InlineStyle => {
            out.line("<style>");
            out.verbatim(&snippet.css);
            out.line("</style>");
        }
        CssDelivery::DataUriLink => {
            out.line(format!(
                r#"<link rel="stylesheet" href="{}">"#,
                css_data_uri(&snippet.css)
            ));
        }
    }
    out.line("<script>");
    out.verbatim(&snippet.js);
    out.line("</script>");
    out.blank();

    out.line("<!-- STEP 2: add just before </body> -->");
    out.verbatim(&snippet.html);
    out.finish()
}

pub fn css_data_uri(css: &str) -> String {
    format!("data:text/css;base64,{}", STANDARD.encode(css))
}
