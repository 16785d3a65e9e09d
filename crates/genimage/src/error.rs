#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("no API credential configured (set OPENROUTER_API_KEY or openrouter.api_key)")]
    CredentialMissing,

    #[error("provider call failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider API error HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error(transparent)]
    Media(#[from] drawkit_media::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
