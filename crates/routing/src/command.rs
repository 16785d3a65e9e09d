//! Inbound command parsing.

/// Extract the prompt from a draw command.
///
/// Accepts the configured prefix case-insensitively, followed by an
/// optional ASCII or fullwidth colon, then the prompt. Returns `None`
/// when the message is not a draw command or the prompt is empty.
pub fn parse_draw_command(prefix: &str, message: &str) -> Option<String> {
    let message = message.trim_start();
    let rest = strip_prefix_ignore_case(message, prefix)?;

    // The prefix must end at a word boundary so "/p" does not swallow
    // "/ping wibble".
    if rest
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric())
    {
        return None;
    }

    let rest = rest.trim_start();
    let rest = rest
        .strip_prefix(':')
        .or_else(|| rest.strip_prefix('：'))
        .unwrap_or(rest);
    let prompt = rest.trim();

    if prompt.is_empty() {
        None
    } else {
        Some(prompt.to_string())
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        s.get(prefix.len()..)
    } else {
        None
    }
}
