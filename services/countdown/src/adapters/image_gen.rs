//! services/countdown/src/adapters/image_gen.rs
//!
//! This module contains the adapter for the hosted text-to-image endpoint.
//! It implements the `ImageGenerationService` port from the `core` crate.
//!
//! The endpoint URL names the model; the response body is the raw image.

use async_trait::async_trait;
use countdown_core::ports::{ImageGenerationService, PortError, PortResult};
use reqwest::{header::ACCEPT, Client};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Longest slice of an error body kept in the failure message.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Serialize)]
struct ImageRequest<'a> {
    inputs: &'a str,
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ImageGenerationService` over a bearer-authenticated HTTP endpoint.
#[derive(Clone)]
pub struct HttpImageAdapter {
    client: Client,
    endpoint: String,
    token: String,
}

impl HttpImageAdapter {
    /// Creates a new `HttpImageAdapter` whose requests give up after `timeout`.
    pub fn new(endpoint: String, token: String, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("countdown/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            token,
        })
    }
}

//=========================================================================================
// `ImageGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ImageGenerationService for HttpImageAdapter {
    async fn generate_image(&self, prompt: &str) -> PortResult<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(ACCEPT, "image/png")
            .json(&ImageRequest { inputs: prompt })
            .send()
            .await
            .map_err(|e| PortError::GenerationFailed(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail: String = body.chars().take(ERROR_BODY_LIMIT).collect();
            return Err(PortError::GenerationFailed(format!("HTTP {status}: {detail}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PortError::GenerationFailed(format!("reading body failed: {e}")))?;
        if bytes.is_empty() {
            return Err(PortError::GenerationFailed(
                "image endpoint returned an empty body".to_string(),
            ));
        }

        debug!(len = bytes.len(), "Image endpoint responded");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// Serves one canned response and hands back the raw request it received.
    async fn serve_once(status_line: &'static str, body: Vec<u8>) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let head = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(&body).await.unwrap();
            socket.shutdown().await.ok();
            request
        });
        (format!("http://{addr}/models/flux"), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|l| l.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= end + 4 + len {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn adapter(endpoint: String) -> HttpImageAdapter {
        HttpImageAdapter::new(endpoint, "hf-test".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn returns_raw_body_and_sends_bearer_prompt() {
        let png = vec![0x89, b'P', b'N', b'G', 0x0d, 0x0a];
        let (url, server) = serve_once("200 OK", png.clone()).await;

        let bytes = adapter(url).generate_image("a rocket on a pad").await.unwrap();
        let request = server.await.unwrap();

        assert_eq!(bytes, png);
        assert!(request.starts_with("POST /models/flux"));
        assert!(request.to_lowercase().contains("authorization: bearer hf-test"));
        assert!(request.contains(r#"{"inputs":"a rocket on a pad"}"#));
    }

    #[tokio::test]
    async fn non_success_status_is_generation_failure() {
        let (url, server) = serve_once("503 Service Unavailable", b"model loading".to_vec()).await;

        let err = adapter(url).generate_image("x").await.unwrap_err();
        server.await.unwrap();

        match err {
            PortError::GenerationFailed(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("model loading"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_body_is_generation_failure() {
        let (url, server) = serve_once("200 OK", Vec::new()).await;

        let err = adapter(url).generate_image("x").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(err, PortError::GenerationFailed(_)));
    }

    #[tokio::test]
    async fn connection_refused_is_generation_failure() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = adapter(format!("http://{addr}/models/flux"))
            .generate_image("x")
            .await
            .unwrap_err();

        assert!(matches!(err, PortError::GenerationFailed(_)));
    }
}
