//! Payload locator — find and materialize an image inside an arbitrary
//! provider response.
//!
//! There is no single stable contract for where an image appears in a
//! chat-completion response: some backends inline base64 under `b64_json`,
//! some nest an `image` or `source` object, some attach files, some embed a
//! data URI in free text, and some hand back a plain URL. The locator
//! searches in decreasing order of specificity:
//!
//! 1. structured object scan (explicit type discriminators, MIME hints,
//!    attachment lists), depth-first in document order;
//! 2. message-content scan (data URI in text, then the first bare URL;
//!    typed and textual content parts);
//! 3. whole-response serialization, rescanned for a data URI.
//!
//! Within a tier, every inline base64 candidate is tried before any URL
//! candidate, wherever each sits in the tree. A malformed base64 candidate
//! is skipped so it cannot shadow a later
//! valid one. A located URL that fails to download is terminal — at most
//! one URL candidate exists per response in practice, and masking a
//! download failure as "not found" hides genuine provider errors.

use std::path::{Path, PathBuf};

use {
    serde_json::{Map, Value},
    tracing::{debug, trace},
};

use crate::error::Result;

/// Base64 payloads at or below this length are noise (tokens, hashes,
/// short echoes), not image data. Length is counted before decoding.
pub const MIN_BASE64_LEN: usize = 64;

/// `type` values that mark an image-bearing object.
const TYPE_DISCRIMINATORS: &[&str] = &["output_image", "image", "image_url"];

/// Key aliases for inline base64 payloads, most specific first.
const BASE64_KEYS: &[&str] = &["b64_json", "b64", "base64", "data"];

/// Key aliases for image URLs.
const URL_KEYS: &[&str] = &["url", "image_url", "link"];

/// Key aliases for MIME type hints.
const MIME_KEYS: &[&str] = &["mime_type", "mimeType", "content_type"];

/// Nested `source` chains deeper than this are not worth following.
const MAX_RESOLVE_DEPTH: usize = 8;

mod patterns {
    #![allow(clippy::expect_used)]

    use {regex::Regex, std::sync::LazyLock};

    /// Embedded data URI with an image subtype.
    pub static DATA_URI: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"(?i)data:image/(png|jpe?g|webp|gif);base64,([A-Za-z0-9+/=]+)")
            .expect("data URI pattern is valid")
    });

    /// First bare http(s) token in free text.
    pub static BARE_URL: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).expect("URL pattern is valid"));
}

/// A discovered, not-yet-materialized image representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageCandidate {
    Base64Inline {
        bytes_b64: String,
        media_hint: Option<String>,
    },
    RemoteUrl {
        url: String,
    },
}

/// Outcome of a locate call. The search is exhaustive before concluding
/// [`ExtractionResult::NotFound`]; there are no partial states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionResult {
    Saved { absolute_path: PathBuf },
    NotFound,
}

/// Search `node` for an image payload and save it at `out_path`.
pub async fn locate(
    client: &reqwest::Client,
    node: &Value,
    out_path: &Path,
) -> Result<ExtractionResult> {
    // Tier 1: structured object scan.
    for candidate in prefer_base64(structured_candidates(node)) {
        if let Some(path) = try_materialize(client, candidate, out_path).await? {
            return Ok(ExtractionResult::Saved {
                absolute_path: path,
            });
        }
    }

    // Tier 2: message-content scan.
    for candidate in prefer_base64(content_candidates(node)) {
        if let Some(path) = try_materialize(client, candidate, out_path).await? {
            return Ok(ExtractionResult::Saved {
                absolute_path: path,
            });
        }
    }

    // Tier 3: serialize the whole tree and rescan for a data URI.
    if let Some(candidate) = data_uri_candidate(&node.to_string())
        && let Some(path) = try_materialize(client, candidate, out_path).await?
    {
        return Ok(ExtractionResult::Saved {
            absolute_path: path,
        });
    }

    Ok(ExtractionResult::NotFound)
}

/// Search raw text for an image payload and save it at `out_path`.
///
/// Applies the same data-URI-then-bare-URL scan as the content tier.
pub async fn locate_in_text(
    client: &reqwest::Client,
    text: &str,
    out_path: &Path,
) -> Result<ExtractionResult> {
    for candidate in text_candidates(text) {
        if let Some(path) = try_materialize(client, candidate, out_path).await? {
            return Ok(ExtractionResult::Saved {
                absolute_path: path,
            });
        }
    }
    Ok(ExtractionResult::NotFound)
}

/// Order a tier's candidates so every inline base64 candidate is tried
/// before any URL candidate, stable within each kind. Inline data avoids
/// a second network round trip and possible link expiry, no matter where
/// the two representations sit relative to each other in the tree.
fn prefer_base64(candidates: Vec<ImageCandidate>) -> Vec<ImageCandidate> {
    let (inline, remote): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| matches!(c, ImageCandidate::Base64Inline { .. }));
    inline.into_iter().chain(remote).collect()
}

/// Materialize one candidate: decode-and-save or fetch-and-save.
///
/// `Ok(None)` means the candidate was malformed base64 and the search
/// should continue. Download and filesystem failures are terminal.
async fn try_materialize(
    client: &reqwest::Client,
    candidate: ImageCandidate,
    out_path: &Path,
) -> Result<Option<PathBuf>> {
    match candidate {
        ImageCandidate::Base64Inline {
            bytes_b64,
            media_hint,
        } => match decode_base64(&bytes_b64) {
            Ok(bytes) => {
                debug!(
                    size = bytes.len(),
                    media_hint = media_hint.as_deref().unwrap_or("unknown"),
                    "decoded inline image payload"
                );
                Ok(Some(drawkit_media::save_bytes(&bytes, out_path).await?))
            },
            Err(e) => {
                debug!(error = %e, "skipping malformed base64 candidate");
                Ok(None)
            },
        },
        ImageCandidate::RemoteUrl { url } => {
            debug!(url, "downloading located image URL");
            let bytes = drawkit_media::fetch_bytes(client, &url).await?;
            Ok(Some(drawkit_media::save_bytes(&bytes, out_path).await?))
        },
    }
}

/// Decode base64, tolerating missing padding.
fn decode_base64(payload: &str) -> std::result::Result<Vec<u8>, base64::DecodeError> {
    use base64::{Engine as _, alphabet, engine};

    const FORGIVING: engine::GeneralPurpose = engine::GeneralPurpose::new(
        &alphabet::STANDARD,
        engine::GeneralPurposeConfig::new()
            .with_decode_padding_mode(engine::DecodePaddingMode::Indifferent),
    );
    FORGIVING.decode(payload.trim())
}

// ── Tier 1: structured object scan ──────────────────────────────────────────

/// Collect candidates from every object node, depth-first pre-order in
/// document order. An explicit work stack keeps the walk bounded and
/// non-reentrant regardless of how deep the provider nests its payload.
fn structured_candidates(root: &Value) -> Vec<ImageCandidate> {
    let mut out = Vec::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            Value::Object(obj) => {
                let matches = candidates_from_object(obj);
                if !matches.is_empty() {
                    trace!(candidates = matches.len(), "structured scan match");
                    out.extend(matches);
                }
                // Reverse push so pop order follows document order.
                for value in obj.values().rev() {
                    stack.push(value);
                }
            },
            Value::Array(items) => {
                for value in items.iter().rev() {
                    stack.push(value);
                }
            },
            _ => {},
        }
    }

    out
}

/// Test one object against the structured matching rules, in priority
/// order: type discriminator, MIME hint with sibling URL, attachments.
/// The first rule to match wins; the attachment rule yields every
/// matching attachment so a malformed one cannot shadow a later valid one.
fn candidates_from_object(obj: &Map<String, Value>) -> Vec<ImageCandidate> {
    // a. Explicit type discriminator.
    if let Some(kind) = obj.get("type").and_then(Value::as_str)
        && TYPE_DISCRIMINATORS.contains(&kind)
    {
        let nested = obj
            .get(kind)
            .or_else(|| obj.get("image"))
            .or_else(|| obj.get("image_url"))
            .or_else(|| obj.get("source"))
            .or_else(|| obj.get("url"))
            .or_else(|| obj.get("data"));
        if let Some(candidate) = nested.and_then(|v| resolve_image_value(v, 0)) {
            return vec![candidate];
        }
    }

    // b. MIME type hint with a sibling URL.
    if mime_hint(obj).is_some()
        && let Some(url) = obj.get("url").and_then(Value::as_str)
        && is_http_url(url)
    {
        return vec![ImageCandidate::RemoteUrl {
            url: url.to_string(),
        }];
    }

    // c. Attachment list.
    if let Some(attachments) = obj.get("attachments").and_then(Value::as_array) {
        return attachments
            .iter()
            .filter_map(Value::as_object)
            .filter(|att| mime_hint(att).is_some())
            .filter_map(|att| base64_alias_candidate(att).or_else(|| url_alias_candidate(att)))
            .collect();
    }

    Vec::new()
}

/// Resolve the value nested under a type discriminator: a direct URL
/// string, a data URI, a base64-carrying object, a nested `source`
/// object, or an object exposing a URL alias.
fn resolve_image_value(value: &Value, depth: usize) -> Option<ImageCandidate> {
    if depth > MAX_RESOLVE_DEPTH {
        return None;
    }

    match value {
        Value::String(s) => {
            if is_http_url(s) {
                return Some(ImageCandidate::RemoteUrl { url: s.clone() });
            }
            let (payload, hint) = split_data_uri(s)?;
            accept_base64(payload, hint)
        },
        Value::Object(obj) => base64_alias_candidate(obj)
            .or_else(|| {
                obj.get("source")
                    .and_then(|source| resolve_image_value(source, depth + 1))
            })
            .or_else(|| url_alias_candidate(obj)),
        _ => None,
    }
}

/// First base64 alias key whose payload clears the sanity threshold.
fn base64_alias_candidate(obj: &Map<String, Value>) -> Option<ImageCandidate> {
    for key in BASE64_KEYS {
        let Some(raw) = obj.get(*key).and_then(Value::as_str) else {
            continue;
        };
        // An alias value may itself be a full data URI.
        let (payload, uri_hint) = match split_data_uri(raw) {
            Some((payload, hint)) => (payload, hint),
            None => (raw, None),
        };
        if let Some(candidate) = accept_base64(payload, uri_hint.or_else(|| mime_hint(obj))) {
            return Some(candidate);
        }
    }
    None
}

/// First URL alias key carrying a well-formed http(s) string.
fn url_alias_candidate(obj: &Map<String, Value>) -> Option<ImageCandidate> {
    for key in URL_KEYS {
        if let Some(url) = obj.get(*key).and_then(Value::as_str)
            && is_http_url(url)
        {
            return Some(ImageCandidate::RemoteUrl {
                url: url.to_string(),
            });
        }
    }
    None
}

fn accept_base64(payload: &str, media_hint: Option<String>) -> Option<ImageCandidate> {
    if payload.len() <= MIN_BASE64_LEN {
        return None;
    }
    Some(ImageCandidate::Base64Inline {
        bytes_b64: payload.to_string(),
        media_hint,
    })
}

/// MIME hint field starting with `image/`, under any known alias.
fn mime_hint(obj: &Map<String, Value>) -> Option<String> {
    for key in MIME_KEYS {
        if let Some(mime) = obj.get(*key).and_then(Value::as_str)
            && mime.starts_with("image/")
        {
            return Some(mime.to_string());
        }
    }
    None
}

/// Split a `data:image/...;base64,` string into payload and MIME hint.
fn split_data_uri(s: &str) -> Option<(&str, Option<String>)> {
    let rest = strip_prefix_ignore_case(s, "data:image/")?;
    let semicolon = rest.find(';')?;
    let subtype = &rest[..semicolon];
    let payload = strip_prefix_ignore_case(&rest[semicolon..], ";base64,")?;
    Some((payload, Some(format!("image/{}", subtype.to_lowercase()))))
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn is_http_url(s: &str) -> bool {
    let lower = s.trim_start();
    let head = lower.get(..8).unwrap_or(lower);
    head.to_ascii_lowercase().starts_with("http://")
        || head.to_ascii_lowercase().starts_with("https://")
}

// ── Tier 2: message-content scan ────────────────────────────────────────────

/// Candidates from the `content` field of a message-shaped node.
fn content_candidates(node: &Value) -> Vec<ImageCandidate> {
    let Some(content) = node.get("content") else {
        return Vec::new();
    };

    match content {
        Value::String(text) => text_candidates(text),
        Value::Array(parts) => {
            let mut out = Vec::new();
            for part in parts {
                let Some(obj) = part.as_object() else {
                    continue;
                };
                let matches = candidates_from_object(obj);
                if !matches.is_empty() {
                    out.extend(matches);
                    continue;
                }
                for text_key in ["text", "input_text"] {
                    if let Some(text) = obj.get(text_key).and_then(Value::as_str) {
                        out.extend(text_candidates(text));
                    }
                }
            }
            out
        },
        _ => Vec::new(),
    }
}

/// Data URI first, then the first bare URL. Ordering matters: an inline
/// payload avoids a second network round trip and possible link expiry,
/// and unrelated URLs in surrounding prose must not win over it.
fn text_candidates(text: &str) -> Vec<ImageCandidate> {
    let mut out = Vec::new();
    if let Some(candidate) = data_uri_candidate(text) {
        out.push(candidate);
    }
    if let Some(m) = patterns::BARE_URL.find(text) {
        let url = m.as_str().trim_end_matches(['.', ',', ')', ';']);
        out.push(ImageCandidate::RemoteUrl {
            url: url.to_string(),
        });
    }
    out
}

/// First embedded image data URI in `text` that clears the threshold.
fn data_uri_candidate(text: &str) -> Option<ImageCandidate> {
    let caps = patterns::DATA_URI.captures(text)?;
    let subtype = caps.get(1).map(|m| m.as_str().to_lowercase())?;
    let payload = caps.get(2).map(|m| m.as_str())?;
    accept_base64(payload, Some(format!("image/{subtype}")))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {base64::Engine as _, serde_json::json};

    use super::*;

    fn b64(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    /// Payload bytes whose encoding clears `MIN_BASE64_LEN`.
    fn sample_bytes() -> Vec<u8> {
        (0u8..=99).collect()
    }

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    fn out_path(dir: &tempfile::TempDir) -> PathBuf {
        dir.path().join("out.png")
    }

    async fn assert_saved_bytes(result: ExtractionResult, expected: &[u8]) {
        match result {
            ExtractionResult::Saved { absolute_path } => {
                assert_eq!(tokio::fs::read(&absolute_path).await.unwrap(), expected);
            },
            ExtractionResult::NotFound => panic!("expected Saved, got NotFound"),
        }
    }

    #[tokio::test]
    async fn finds_b64_json_under_output_image_discriminator() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let node = json!({
            "type": "output_image",
            "image": { "b64_json": b64(&bytes) }
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn finds_deeply_nested_data_uri_roundtrip() {
        // object → array → object, depth 4.
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let uri = format!("data:image/png;base64,{}", b64(&bytes));
        let node = json!({
            "choices": [{
                "message": {
                    "content": [
                        { "type": "text", "text": "here you go" },
                        { "type": "image", "image": { "source": { "data": uri } } }
                    ]
                }
            }]
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn base64_is_preferred_over_url_in_same_object() {
        // No HTTP mock exists, so any download attempt would error out.
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let node = json!({
            "type": "image",
            "image": {
                "b64_json": b64(&bytes),
                "url": "https://example.invalid/should-not-be-fetched.png"
            }
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn discriminator_with_direct_url_string_downloads_it() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/pic.png")
            .with_status(200)
            .with_body(b"remote-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let node = json!({
            "type": "image_url",
            "image_url": format!("{}/pic.png", server.url())
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, b"remote-bytes").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn image_url_part_fetches_exactly_that_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/x.png")
            .with_status(200)
            .with_body(b"x-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let node = json!({
            "content": [{
                "type": "image_url",
                "image_url": { "url": format!("{}/x.png", server.url()) }
            }]
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, b"x-bytes").await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn mime_hint_with_sibling_url_is_downloaded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/hinted.webp")
            .with_status(200)
            .with_body(b"webp-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let node = json!({
            "mime_type": "image/webp",
            "url": format!("{}/hinted.webp", server.url())
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, b"webp-bytes").await;
    }

    #[tokio::test]
    async fn attachment_with_image_mime_and_base64_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let node = json!({
            "attachments": [
                { "mime_type": "text/plain", "data": "not an image" },
                { "mime_type": "image/png", "data": b64(&bytes) }
            ]
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn content_string_with_embedded_data_uri_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let node = json!({
            "content": format!("Some text data:image/png;base64,{} more text", b64(&bytes))
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn data_uri_wins_over_unrelated_url_in_text() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let text = format!(
            "data:image/png;base64,{} see also http://example.invalid/unrelated",
            b64(&bytes)
        );

        let result = locate_in_text(&client(), &text, &out_path(&dir))
            .await
            .unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn bare_url_in_text_is_fetched_when_no_data_uri() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/from-text.png")
            .with_status(200)
            .with_body(b"text-url-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let text = format!("your image: {}/from-text.png.", server.url());

        let result = locate_in_text(&client(), &text, &out_path(&dir))
            .await
            .unwrap();
        assert_saved_bytes(result, b"text-url-bytes").await;
    }

    #[tokio::test]
    async fn short_base64_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let node = json!({
            "type": "image",
            "image": { "b64_json": "QUFBQg==" }
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_eq!(result, ExtractionResult::NotFound);
    }

    #[tokio::test]
    async fn malformed_candidate_is_skipped_in_favor_of_later_valid_one() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let bad = "!!!not-base64!!!".repeat(8);
        let node = json!({
            "parts": [
                { "type": "image", "image": { "b64_json": bad } },
                { "type": "image", "image": { "b64_json": b64(&bytes) } }
            ]
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn inline_base64_wins_over_earlier_url_candidate() {
        let mut server = mockito::Server::new_async().await;
        let get = server
            .mock("GET", "/wrong.png")
            .expect(0)
            .with_status(200)
            .with_body(b"url-bytes")
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        // The URL candidate comes first in document order; the inline
        // payload must still win without any GET being issued.
        let node = json!({
            "a": {
                "type": "image_url",
                "image_url": { "url": format!("{}/wrong.png", server.url()) }
            },
            "b": { "type": "image", "image": { "b64_json": b64(&bytes) } }
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
        get.assert_async().await;
    }

    #[tokio::test]
    async fn malformed_attachment_does_not_block_later_valid_one() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let bad = "!!!corrupt!!!".repeat(8);
        let node = json!({
            "attachments": [
                { "mime_type": "image/png", "data": bad },
                { "mime_type": "image/png", "data": b64(&bytes) }
            ]
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn whole_tree_fallback_finds_data_uri_under_unknown_key() {
        let dir = tempfile::tempdir().unwrap();
        let bytes = sample_bytes();
        let node = json!({
            "completely": { "unexpected": { "nesting": format!(
                "data:image/jpeg;base64,{}", b64(&bytes)
            )}}
        });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_saved_bytes(result, &bytes).await;
    }

    #[tokio::test]
    async fn plain_prose_yields_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let node = json!({ "content": "I cannot draw that, sorry." });

        let result = locate(&client(), &node, &out_path(&dir)).await.unwrap();
        assert_eq!(result, ExtractionResult::NotFound);
    }

    #[tokio::test]
    async fn failed_download_of_located_url_is_terminal() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.png")
            .with_status(500)
            .create_async()
            .await;

        let dir = tempfile::tempdir().unwrap();
        let node = json!({
            "type": "image_url",
            "image_url": { "url": format!("{}/gone.png", server.url()) }
        });

        let err = locate(&client(), &node, &out_path(&dir)).await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn split_data_uri_extracts_payload_and_hint() {
        let (payload, hint) = split_data_uri("data:image/png;base64,AAAA").unwrap();
        assert_eq!(payload, "AAAA");
        assert_eq!(hint.as_deref(), Some("image/png"));

        // Case-insensitive.
        let (payload, hint) = split_data_uri("DATA:IMAGE/JPEG;BASE64,BBBB").unwrap();
        assert_eq!(payload, "BBBB");
        assert_eq!(hint.as_deref(), Some("image/jpeg"));

        assert!(split_data_uri("https://example.com/x.png").is_none());
    }

    #[test]
    fn traversal_prefers_earlier_document_order() {
        let bytes_a = b64(&[1u8; 60]);
        let bytes_b = b64(&[2u8; 60]);
        let node = json!({
            "first": { "type": "image", "image": { "b64_json": bytes_a } },
            "second": { "type": "image", "image": { "b64_json": bytes_b } }
        });

        let candidates = structured_candidates(&node);
        assert_eq!(candidates.len(), 2);
        assert!(
            matches!(&candidates[0], ImageCandidate::Base64Inline { bytes_b64, .. } if *bytes_b64 == bytes_a)
        );
    }

    #[test]
    fn decode_tolerates_missing_padding() {
        let full = b64(b"hello world!");
        let unpadded = full.trim_end_matches('=');
        assert_eq!(decode_base64(unpadded).unwrap(), b"hello world!");
    }
}
