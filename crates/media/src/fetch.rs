//! Remote fetcher — single bounded GET for a discovered image URL.

use std::time::Duration;

use {tracing::debug, url::Url};

use crate::error::{Error, Result};

/// Upper bound on a single download. Provider-hosted image links are
/// short-lived, so waiting longer than this rarely helps.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Fetch the body of `url` with one GET and a bounded timeout.
///
/// Non-2xx status and transport failures both surface as [`Error::Network`];
/// the caller decides whether that is terminal. No retries at this layer.
pub async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>> {
    let parsed = Url::parse(url).map_err(|e| Error::network(url, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {},
        s => return Err(Error::network(url, format!("unsupported URL scheme: {s}"))),
    }

    let resp = client
        .get(parsed)
        .timeout(DEFAULT_FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| Error::network(url, e.to_string()))?;

    let status = resp.status();
    if !status.is_success() {
        return Err(Error::network(url, format!("HTTP {status}")));
    }

    let bytes = resp
        .bytes()
        .await
        .map_err(|e| Error::network(url, e.to_string()))?;
    debug!(url, size = bytes.len(), "fetched remote image");
    Ok(bytes.to_vec())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn downloads_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/x.png")
            .with_status(200)
            .with_body(b"image-bytes")
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let bytes = fetch_bytes(&client, &format!("{}/x.png", server.url()))
            .await
            .unwrap();

        assert_eq!(bytes, b"image-bytes");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gone.png")
            .with_status(404)
            .create_async()
            .await;

        let client = reqwest::Client::new();
        let err = fetch_bytes(&client, &format!("{}/gone.png", server.url()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Network { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn rejects_non_http_scheme() {
        let client = reqwest::Client::new();
        let err = fetch_bytes(&client, "ftp://example.com/x.png")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[tokio::test]
    async fn rejects_malformed_url() {
        let client = reqwest::Client::new();
        let err = fetch_bytes(&client, "not a url").await.unwrap_err();
        assert!(matches!(err, Error::Network { .. }));
    }
}
