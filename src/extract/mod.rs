use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use crate::wire::CodeBundle;

pub const DEFAULT_STYLE: &str = "body {\n  font-family: Arial, sans-serif;\n  margin: 0;\n  padding: 20px;\n}";

pub const DEFAULT_SCRIPT: &str =
    "document.addEventListener('DOMContentLoaded', () => {\n  console.log('UI loaded');\n});";

// First opening fence of each label through the next closing fence, non-greedy.
static HTML_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```html\b\s*(.*?)\s*```").expect("html fence regex"));
static CSS_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```css\b\s*(.*?)\s*```").expect("css fence regex"));
static JS_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)```(?:javascript|js)\b\s*(.*?)\s*```").expect("js fence regex"));

static INLINE_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style[^>]*>(.*?)</style>").expect("inline style regex"));
static INLINE_SCRIPT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").expect("inline script regex"));

/// Non-fatal notes about how a bundle was assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionWarning {
    MissingMarkup,
    StyleFromInline,
    ScriptFromInline,
    DefaultStyle,
    DefaultScript,
}

fn first_capture(re: &Regex, text: &str) -> String {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}

/// Pulls the markup/style/script triple out of free-form model text.
///
/// Best effort: missing style or script is first looked for inline in the
/// markup, then replaced by a fixed default. Markup never gets a default, an
/// empty markup is left for the caller to interpret.
pub fn extract(raw: &str) -> (CodeBundle, Vec<ExtractionWarning>) {
    let mut warnings = Vec::new();

    let markup = first_capture(&HTML_FENCE, raw);
    let mut style = first_capture(&CSS_FENCE, raw);
    let mut script = first_capture(&JS_FENCE, raw);

    if markup.is_empty() {
        warnings.push(ExtractionWarning::MissingMarkup);
    }

    if style.is_empty() {
        style = first_capture(&INLINE_STYLE, &markup);
        if !style.is_empty() {
            warnings.push(ExtractionWarning::StyleFromInline);
        }
    }
    if script.is_empty() {
        script = first_capture(&INLINE_SCRIPT, &markup);
        if !script.is_empty() {
            warnings.push(ExtractionWarning::ScriptFromInline);
        }
    }

    if style.is_empty() {
        style = DEFAULT_STYLE.to_string();
        warnings.push(ExtractionWarning::DefaultStyle);
    }
    if script.is_empty() {
        script = DEFAULT_SCRIPT.to_string();
        warnings.push(ExtractionWarning::DefaultScript);
    }

    if !warnings.is_empty() {
        warn!(?warnings, "generated text was missing code sections");
    }

    (CodeBundle { markup, style, script }, warnings)
}
