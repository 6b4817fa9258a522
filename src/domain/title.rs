use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

const FALLBACK_TITLE: &str = "untitled";

static INVALID_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]+"#).unwrap());
static SEPARATOR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"_{2,}").unwrap());

/// Make a media title safe for use inside a storage path. Foreign-language
/// characters are preserved; only characters invalid in filenames are
/// replaced, and runs of them collapse to a single separator.
pub fn sanitize_title(raw: &str) -> String {
    let normalized: String = raw.nfkc().collect();
    let replaced = INVALID_RUN.replace_all(normalized.trim(), "_");
    let collapsed = SEPARATOR_RUN.replace_all(&replaced, "_");
    let trimmed = collapsed.trim_matches('_').trim();

    if trimmed.is_empty() {
        FALLBACK_TITLE.to_string()
    } else {
        trimmed.to_string()
    }
}
