//! Completion orchestrator — drive the two provider calls and the
//! extraction fallbacks for one generation request.
//!
//! Flow: primary chat-completions call (biased toward a single inline
//! data URI) → locate → raw-text scan of the message content → secondary
//! image-modality call → locate (which ends in the whole-response scan) →
//! `Failed` with a bounded excerpt and a best-effort diagnostic dump.
//!
//! Only "no image located in this response" drives the internal fallback.
//! Transport and protocol errors propagate verbatim; nothing is retried.

use std::path::{Path, PathBuf};

use {
    secrecy::{ExposeSecret, Secret},
    serde_json::{Value, json},
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    locate::{ExtractionResult, locate, locate_in_text},
};

/// Diagnostic excerpts are capped so a failure never drags a full payload
/// into logs or user-visible errors.
const EXCERPT_MAX_CHARS: usize = 200;

/// Optional attribution headers forwarded to the provider.
#[derive(Debug, Clone, Default)]
pub struct SiteAttribution {
    /// Sent as `HTTP-Referer`.
    pub url: Option<String>,
    /// Sent as `X-Title`.
    pub title: Option<String>,
}

/// One generation request.
#[derive(Debug)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub out_path: &'a Path,
    /// Forwarded as `size` on the secondary image-modality call.
    pub size_hint: Option<&'a str>,
}

/// Terminal value of a generation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Saved {
        path: PathBuf,
    },
    /// Both call shapes were exhausted without locating an image.
    Failed {
        diagnostic_excerpt: String,
        raw_dump_path: Option<PathBuf>,
    },
}

/// Orchestrates prompt-to-image generation against one provider.
///
/// Holds no mutable state; concurrent requests may share one instance as
/// long as they use distinct output paths.
pub struct ImageGenerator {
    client: &'static reqwest::Client,
    api_key: Secret<String>,
    model: String,
    base_url: String,
    attribution: SiteAttribution,
    diagnostics_dir: Option<PathBuf>,
}

impl std::fmt::Debug for ImageGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageGenerator")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ImageGenerator {
    /// Build a generator. Fails with [`Error::CredentialMissing`] when the
    /// credential is absent or blank — before any network call can happen.
    pub fn new(
        api_key: Option<Secret<String>>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        attribution: SiteAttribution,
    ) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(Error::CredentialMissing)?;

        Ok(Self {
            client: crate::shared_http_client(),
            api_key,
            model: model.into(),
            base_url: base_url.into(),
            attribution,
            diagnostics_dir: None,
        })
    }

    /// Enable best-effort raw-response dumps under `dir` on exhaustion.
    #[must_use]
    pub fn with_diagnostics_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.diagnostics_dir = Some(dir.into());
        self
    }

    /// Run one generation request to completion.
    pub async fn generate(&self, request: GenerateRequest<'_>) -> Result<GenerationOutcome> {
        debug!(
            model = %self.model,
            prompt_len = request.prompt.len(),
            out_path = %request.out_path.display(),
            "issuing primary chat completion"
        );
        let primary = self.chat_completion(request.prompt).await?;

        let message = &primary["choices"][0]["message"];
        if let ExtractionResult::Saved { absolute_path } =
            locate(self.client, message, request.out_path).await?
        {
            info!(path = %absolute_path.display(), "image extracted from primary response");
            return Ok(GenerationOutcome::Saved {
                path: absolute_path,
            });
        }

        // The structured scan came up empty; the content may still hide a
        // data URI or link inside prose.
        if let Some(text) = message["content"].as_str()
            && let ExtractionResult::Saved { absolute_path } =
                locate_in_text(self.client, text, request.out_path).await?
        {
            info!(path = %absolute_path.display(), "image extracted from primary response text");
            return Ok(GenerationOutcome::Saved {
                path: absolute_path,
            });
        }

        debug!("primary response carried no image, issuing image-modality call");
        let secondary = self
            .image_generation(request.prompt, request.size_hint)
            .await?;

        if let ExtractionResult::Saved { absolute_path } =
            locate(self.client, &secondary, request.out_path).await?
        {
            info!(path = %absolute_path.display(), "image extracted from secondary response");
            return Ok(GenerationOutcome::Saved {
                path: absolute_path,
            });
        }

        let diagnostic_excerpt = self.failure_excerpt(message, &secondary);
        let raw_dump_path = self.dump_raw_responses(&primary, &secondary);
        warn!(
            excerpt = %diagnostic_excerpt,
            "no image located in either response shape"
        );
        Ok(GenerationOutcome::Failed {
            diagnostic_excerpt,
            raw_dump_path,
        })
    }

    /// Primary call: chat completion instructed to answer with exactly one
    /// inline data URI and no prose.
    async fn chat_completion(&self, prompt: &str) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "Return the generated image as exactly one \
                                data:image/png;base64,... payload and nothing else."
                },
                {
                    "role": "user",
                    "content": [{ "type": "text", "text": prompt }]
                }
            ]
        });
        self.post_json("/chat/completions", &body).await
    }

    /// Secondary call: the provider's image-output-modality surface.
    /// Different backend configurations expose images through different
    /// shapes, so this is a distinct request, not a retry.
    async fn image_generation(&self, prompt: &str, size_hint: Option<&str>) -> Result<Value> {
        let mut body = json!({
            "model": self.model,
            "prompt": prompt,
        });
        if let Some(size) = size_hint {
            body["size"] = Value::String(size.to_string());
        }
        self.post_json("/images/generations", &body).await
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let mut req = self
            .client
            .post(format!("{}{path}", self.base_url.trim_end_matches('/')))
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("content-type", "application/json");

        if let Some(url) = &self.attribution.url {
            req = req.header("HTTP-Referer", url);
        }
        if let Some(title) = &self.attribution.title {
            req = req.header("X-Title", title);
        }

        let resp = req.json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            warn!(status = %status, path, body = %body_text, "provider API error");
            return Err(Error::Api {
                status: status.as_u16(),
                body: body_text,
            });
        }

        Ok(resp.json::<Value>().await?)
    }

    /// Pick the more informative of the two responses for the user-visible
    /// excerpt: primary message content when non-empty, else the serialized
    /// secondary response.
    fn failure_excerpt(&self, primary_message: &Value, secondary: &Value) -> String {
        let primary_content = primary_message["content"].as_str().unwrap_or("");
        if !primary_content.trim().is_empty() {
            return truncate_chars(primary_content, EXCERPT_MAX_CHARS);
        }
        truncate_chars(&secondary.to_string(), EXCERPT_MAX_CHARS)
    }

    /// Persist both raw response trees for post-mortem inspection. Failure
    /// here is logged and swallowed; it must not disturb the caller.
    fn dump_raw_responses(&self, primary: &Value, secondary: &Value) -> Option<PathBuf> {
        let dir = self.diagnostics_dir.as_ref()?;
        let path = dir.join(format!("response_{}.json", uuid::Uuid::new_v4().simple()));
        let dump = json!({ "primary": primary, "secondary": secondary });

        let write = std::fs::create_dir_all(dir)
            .and_then(|()| std::fs::write(&path, dump.to_string()));
        match write {
            Ok(()) => {
                debug!(path = %path.display(), "wrote raw response dump");
                Some(path)
            },
            Err(e) => {
                warn!(error = %e, path = %path.display(), "failed to write response dump");
                None
            },
        }
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}
