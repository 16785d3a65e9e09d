//! Fallback image provider URL construction.

/// Build a pollinations.ai prompt URL.
///
/// The service renders an image on GET, so the URL itself is the
/// deliverable; no API key is involved.
pub fn fallback_image_url(prompt: &str) -> String {
    format!(
        "https://image.pollinations.ai/prompt/{}",
        urlencoding::encode(prompt)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_spaces_and_punctuation() {
        assert_eq!(
            fallback_image_url("a red fox, watercolor"),
            "https://image.pollinations.ai/prompt/a%20red%20fox%2C%20watercolor"
        );
    }

    #[test]
    fn passes_plain_words_through() {
        assert_eq!(
            fallback_image_url("fox"),
            "https://image.pollinations.ai/prompt/fox"
        );
    }
}
