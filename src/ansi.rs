use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

/// `ESC [ <digits and semicolons> m` — SGR colour/style codes only.
static SGR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());

/// Remove every ANSI SGR escape sequence from `text`.
///
/// Borrows when there is nothing to strip, so clean input is never copied.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    SGR.replace_all(text, "")
}
