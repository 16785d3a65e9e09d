//! Prompt-to-image generation against an OpenRouter-style chat API.
//!
//! The provider has no stable contract for where an image lands in a
//! response, so the heart of this crate is a schema-tolerant payload
//! locator ([`locate`]) that searches an arbitrary response tree for an
//! inline base64 payload or an image URL, and an orchestrator
//! ([`generate::ImageGenerator`]) that drives the primary chat call, the
//! raw-text fallback, and the secondary image-modality call.

pub mod error;
pub mod generate;
pub mod locate;

pub use {
    error::{Error, Result},
    generate::{GenerateRequest, GenerationOutcome, ImageGenerator, SiteAttribution},
    locate::{ExtractionResult, ImageCandidate, locate, locate_in_text},
};

/// Process-wide HTTP client.
///
/// Both API calls and candidate downloads reuse this client to share
/// connection pools, DNS cache, and TLS sessions.
pub fn shared_http_client() -> &'static reqwest::Client {
    static CLIENT: std::sync::LazyLock<reqwest::Client> =
        std::sync::LazyLock::new(reqwest::Client::new);
    &CLIENT
}
