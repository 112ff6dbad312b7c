//! HTTP client for a relay socket.
//!
//! Every call opens a fresh connection; relays expect few, slow requests.

use std::path::{Path, PathBuf};

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;

use crate::routing::{LOGIN_PATH, SPACE_CREATE_PATH, UPLOAD_PATH, WHOAMI_PATH};

/// Host header sent on every request. The socket path is the real address.
const RELAY_HOST: &str = "localhost";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid request: {0}")]
    Request(#[from] axum::http::Error),
    #[error("HTTP error: {0}")]
    Http(#[from] hyper::Error),
    #[error("failed to read response body: {0}")]
    Body(#[from] axum::Error),
}

/// A buffered response from a relay.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl RelayResponse {
    /// Body as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct RelayClient {
    socket_path: PathBuf,
}

impl RelayClient {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub async fn whoami(&self) -> Result<RelayResponse, ClientError> {
        self.get(WHOAMI_PATH, &[]).await
    }

    pub async fn login(&self, email: &str) -> Result<RelayResponse, ClientError> {
        self.get(LOGIN_PATH, &[("email", email)]).await
    }

    pub async fn space_create(&self) -> Result<RelayResponse, ClientError> {
        self.get(SPACE_CREATE_PATH, &[]).await
    }

    /// Upload a file, named relative to the relay's rewards directory.
    pub async fn upload(&self, file: &str) -> Result<RelayResponse, ClientError> {
        self.get(UPLOAD_PATH, &[("file", file)]).await
    }

    /// Send a GET request with the given query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RelayResponse, ClientError> {
        let uri = if query.is_empty() {
            path.to_string()
        } else {
            let encoded = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(query)
                .finish();
            format!("{path}?{encoded}")
        };

        let request = Request::get(uri)
            .header(header::HOST, RELAY_HOST)
            .body(Body::empty())?;

        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|source| ClientError::Connect {
                path: self.socket_path.clone(),
                source,
            })?;

        let (mut sender, connection) = hyper::client::conn::http1::handshake(TokioIo::new(stream)).await?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::debug!(error = %e, "Relay connection closed with error");
            }
        });

        let response = sender.send_request(request).await?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = axum::body::to_bytes(Body::new(response.into_body()), usize::MAX).await?;

        Ok(RelayResponse {
            status,
            content_type,
            body,
        })
    }
}
