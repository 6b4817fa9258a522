use runavik::domain::sanitize_title;

#[test]
fn given_invalid_filename_characters_when_sanitizing_then_each_is_replaced() {
    assert_eq!(sanitize_title("a/b:c*d"), "a_b_c_d");
}

#[test]
fn given_empty_title_when_sanitizing_then_fallback_placeholder_is_used() {
    assert_eq!(sanitize_title(""), "untitled");
}

#[test]
fn given_only_invalid_characters_when_sanitizing_then_fallback_placeholder_is_used() {
    assert_eq!(sanitize_title("<>:\"/\\|?*"), "untitled");
}

#[test]
fn given_consecutive_invalid_characters_when_sanitizing_then_they_collapse_to_one_separator() {
    assert_eq!(sanitize_title("a//*<>b"), "a_b");
}

#[test]
fn given_adjacent_separators_and_invalid_characters_when_sanitizing_then_runs_collapse() {
    assert_eq!(sanitize_title("a_/b"), "a_b");
}

#[test]
fn given_leading_and_trailing_invalid_characters_when_sanitizing_then_they_are_stripped() {
    assert_eq!(sanitize_title("/leading and trailing?"), "leading and trailing");
}

#[test]
fn given_foreign_language_title_when_sanitizing_then_characters_are_preserved() {
    assert_eq!(sanitize_title("日本語のタイトル"), "日本語のタイトル");
}

#[test]
fn given_surrounding_whitespace_when_sanitizing_then_it_is_trimmed() {
    assert_eq!(sanitize_title("  padded title  "), "padded title");
}
