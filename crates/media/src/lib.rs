//! Byte-level media plumbing: fetch remote images, persist raw bytes.

pub mod error;
pub mod fetch;
pub mod sink;

pub use {
    error::{Error, Result},
    fetch::{DEFAULT_FETCH_TIMEOUT, fetch_bytes},
    sink::save_bytes,
};
