//! Route chat traffic around the generator.
//!
//! Inbound: recognize the draw command and extract the prompt.
//! Outbound: classify a reply so the host channel can attach a local
//! file, embed a remote image, or pass plain text through.
//!
//! Classification cascade (first match wins):
//! 1. `image generated: <path>` status line
//! 2. Markdown image `![..](target)`
//! 3. Bare image URL
//! 4. `file://` path
//! 5. Plain text

pub mod classify;
pub mod command;
pub mod fallback;

pub use {
    classify::{OutboundMessage, classify_reply},
    command::parse_draw_command,
    fallback::fallback_image_url,
};
