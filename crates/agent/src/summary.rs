/// Marker the model puts in front of its final summary.
pub const COMPLETION_SENTINEL: &str = "[AGENT_DONE]";

/// Keep only what follows the first `sentinel`, trimmed.
///
/// Text without the sentinel is returned trimmed as-is, so models that ignore
/// the instruction still produce a usable summary.
pub fn extract_summary(text: &str, sentinel: &str) -> String {
    match text.split_once(sentinel) {
        Some((_, after)) => after.trim().to_string(),
        None => text.trim().to_string(),
    }
}
