//! Outbound reply classification.

use std::path::PathBuf;

use tracing::debug;

/// What the host channel should do with a generator reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Attach a file from local disk.
    LocalImage(PathBuf),
    /// Embed an image by URL.
    RemoteImage(String),
    /// Forward the text unchanged.
    Plain(String),
}

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

mod patterns {
    // Pattern literals are compile-time constants; a failed build here is a
    // programmer error, not a runtime condition.
    #![allow(clippy::expect_used)]

    use {regex::Regex, std::sync::LazyLock};

    /// Status line emitted after a successful save. The path may contain
    /// spaces, so match up to the image extension rather than to the next
    /// whitespace.
    pub(super) static GENERATED_LINE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)image generated:\s*([^\n\r]*?\.(?:png|jpe?g|gif|webp))")
            .expect("valid regex")
    });

    /// Markdown image with a non-empty target.
    pub(super) static MARKDOWN_IMAGE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[[^\]]*\]\(([^)\s]+)\)").expect("valid regex"));

    pub(super) static BARE_URL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s"'<>]+"#).expect("valid regex"));

    pub(super) static FILE_URL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)file://(\S+)").expect("valid regex"));
}

/// Classify a reply for delivery.
///
/// Branches are tried in a fixed order; the first hit wins and the
/// remainder of the text is discarded for image branches.
pub fn classify_reply(reply: &str) -> OutboundMessage {
    if let Some(caps) = patterns::GENERATED_LINE.captures(reply) {
        let target = caps[1].trim_matches(['\'', '"', '`']);
        debug!(path = target, "classified as generated-file reference");
        return OutboundMessage::LocalImage(PathBuf::from(target));
    }

    if let Some(caps) = patterns::MARKDOWN_IMAGE.captures(reply) {
        let target = trim_trailing_punct(&caps[1]);
        if target.starts_with("http://") || target.starts_with("https://") {
            return OutboundMessage::RemoteImage(target.to_string());
        }
        return OutboundMessage::LocalImage(PathBuf::from(target));
    }

    if let Some(m) = patterns::BARE_URL.find(reply) {
        let url = trim_trailing_punct(m.as_str());
        if is_image_url(url) {
            return OutboundMessage::RemoteImage(url.to_string());
        }
    }

    if let Some(caps) = patterns::FILE_URL.captures(reply) {
        let target = trim_trailing_punct(&caps[1]);
        return OutboundMessage::LocalImage(PathBuf::from(target));
    }

    OutboundMessage::Plain(reply.to_string())
}

fn trim_trailing_punct(s: &str) -> &str {
    s.trim_end_matches(['.', ',', ')', ';'])
}

fn has_image_extension(target: &str) -> bool {
    let path = target.split(['?', '#']).next().unwrap_or(target);
    path.rsplit('.')
        .next()
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// A bare URL only counts as an image when its path carries an image
/// extension or it points at a known image host.
fn is_image_url(url: &str) -> bool {
    has_image_extension(url) || url.contains("image.pollinations.ai/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_line_becomes_local_image() {
        assert_eq!(
            classify_reply("image generated: /tmp/out/drawer_ab12.png"),
            OutboundMessage::LocalImage(PathBuf::from("/tmp/out/drawer_ab12.png"))
        );
    }

    #[test]
    fn generated_line_path_with_spaces_is_kept_whole() {
        assert_eq!(
            classify_reply("image generated: /home/me/My Images/drawer_1.png"),
            OutboundMessage::LocalImage(PathBuf::from("/home/me/My Images/drawer_1.png"))
        );
    }

    #[test]
    fn generated_line_path_quotes_are_stripped() {
        assert_eq!(
            classify_reply("image generated: \"/tmp/out.png\""),
            OutboundMessage::LocalImage(PathBuf::from("/tmp/out.png"))
        );
    }

    #[test]
    fn generated_line_without_image_extension_falls_through() {
        assert_eq!(
            classify_reply("image generated: /tmp/notes.txt"),
            OutboundMessage::Plain("image generated: /tmp/notes.txt".to_string())
        );
    }

    #[test]
    fn markdown_remote_image() {
        assert_eq!(
            classify_reply("here you go ![fox](https://cdn.example/fox.png)"),
            OutboundMessage::RemoteImage("https://cdn.example/fox.png".to_string())
        );
    }

    #[test]
    fn markdown_local_image() {
        assert_eq!(
            classify_reply("![fox](generated/fox.png)"),
            OutboundMessage::LocalImage(PathBuf::from("generated/fox.png"))
        );
    }

    #[test]
    fn bare_image_url_with_trailing_period() {
        assert_eq!(
            classify_reply("see https://cdn.example/a.webp."),
            OutboundMessage::RemoteImage("https://cdn.example/a.webp".to_string())
        );
    }

    #[test]
    fn pollinations_url_counts_without_extension() {
        assert_eq!(
            classify_reply("https://image.pollinations.ai/prompt/a%20fox"),
            OutboundMessage::RemoteImage(
                "https://image.pollinations.ai/prompt/a%20fox".to_string()
            )
        );
    }

    #[test]
    fn non_image_url_stays_plain() {
        let text = "docs at https://example.com/guide";
        assert_eq!(
            classify_reply(text),
            OutboundMessage::Plain(text.to_string())
        );
    }

    #[test]
    fn file_url_becomes_local_image() {
        assert_eq!(
            classify_reply("saved to file:///tmp/x.png"),
            OutboundMessage::LocalImage(PathBuf::from("/tmp/x.png"))
        );
    }

    #[test]
    fn generated_line_wins_over_later_url() {
        assert_eq!(
            classify_reply("image generated: out.png (also at https://cdn.example/out.png)"),
            OutboundMessage::LocalImage(PathBuf::from("out.png"))
        );
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(
            classify_reply("I could not draw that."),
            OutboundMessage::Plain("I could not draw that.".to_string())
        );
    }
}
