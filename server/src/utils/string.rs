//! String utility functions

/// Truncate text to a maximum number of characters, appending an ellipsis
/// when anything was cut. Char-based so multi-byte text is never split.
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if text.chars().count() > max_chars {
        format!("{}...", text.chars().take(max_chars).collect::<String>())
    } else {
        text.to_string()
    }
}
