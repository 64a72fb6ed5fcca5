//! Small text helpers

/// Drop lines whose first non-whitespace character is `#`
///
/// The operator preferences file uses `#` for comment lines; only the
/// remaining content is handed to the stages.
pub fn strip_comment_lines(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .collect::<Vec<_>>()
        .join("\n")
}
