//! Typed configuration schema with serde defaults.
//!
//! Every section tolerates partial files: any omitted key falls back to
//! its default, so a one-line config overriding just the model is valid.

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawkitConfig {
    /// Chat command prefix that triggers a generation. Defaults to "/p".
    pub command_prefix: CommandPrefix,
    pub openrouter: OpenRouterConfig,
    pub storage: StorageConfig,
    pub fallback: FallbackConfig,
}

/// Newtype so the prefix default lives next to the field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandPrefix(pub String);

impl Default for CommandPrefix {
    fn default() -> Self {
        Self("/p".into())
    }
}

impl std::ops::Deref for CommandPrefix {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

/// Provider configuration for the OpenRouter-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenRouterConfig {
    /// Whether the provider is enabled. Defaults to true.
    pub enabled: bool,
    /// Model identifier passed to the API.
    pub model: String,
    /// API key. Resolved from here first, then `OPENROUTER_API_KEY`.
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,
    /// API base URL, without the trailing endpoint path.
    pub base_url: String,
    /// Sent as `HTTP-Referer` for provider-side attribution.
    pub site_url: Option<String>,
    /// Sent as `X-Title` for provider-side attribution.
    pub site_title: Option<String>,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "google/gemini-2.5-flash-image-preview:free".into(),
            api_key: None,
            base_url: "https://openrouter.ai/api/v1".into(),
            site_url: None,
            site_title: None,
        }
    }
}

impl OpenRouterConfig {
    /// Resolve the effective API key: config value first, then the
    /// `OPENROUTER_API_KEY` environment variable. Blank values (empty or
    /// whitespace-only) are treated as absent.
    pub fn resolve_api_key(&self) -> Option<Secret<String>> {
        if let Some(key) = &self.api_key
            && !key.expose_secret().trim().is_empty()
        {
            return Some(key.clone());
        }
        std::env::var("OPENROUTER_API_KEY")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(Secret::new)
    }
}

/// Where generated images land on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Output directory for saved images. Defaults to "generated".
    pub output_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: "generated".into(),
        }
    }
}

/// Fallback provider used when the primary provider yields no image.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Whether the fallback is enabled. Defaults to true.
    pub enabled: bool,
    /// Fallback provider name. Only "pollinations" is recognized.
    pub provider: String,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: "pollinations".into(),
        }
    }
}

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
