//! IPC client — one HTTP request/response exchange per call over a Unix
//! domain socket.
//!
//! Every call dials the daemon socket fresh, sends a single request, reads
//! the full response body, and drops the connection. Nothing is shared
//! between calls, so a client value can be used from concurrent tasks at
//! the cost of one dial per call. Uses `hyper` for proper HTTP/1.1 over
//! the Unix socket.

use std::path::{Path, PathBuf};

use hyper::Method;
use hyper::body::Bytes;
use hyper_util::rt::TokioIo;
use tokio::net::UnixStream;
use tracing::debug;

use chargectl_config::AppConfig;

/// Errors from the IPC client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(
        "failed to connect to daemon socket at {path}: {source} \
         (is the daemon running? do you have permission to access the socket?)"
    )]
    Connect {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    #[error("failed to build request: {0}")]
    BuildRequest(#[from] hyper::http::Error),

    #[error("transport failure: {0}")]
    Transport(#[source] hyper::Error),

    #[error("failed to read response body: {0}")]
    ReadBody(#[source] hyper::Error),

    #[error("daemon returned {status}: {body}")]
    Remote { status: u16, body: String },
}

/// Client for the chargectl daemon's Unix-socket HTTP API.
pub struct IpcClient {
    socket_path: PathBuf,
}

impl IpcClient {
    /// Create a new IPC client targeting the given socket path.
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self {
            socket_path: socket_path.into(),
        }
    }

    /// Create a client targeting the socket path from the given config.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.socket_path())
    }

    /// The socket path this client dials.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Check if the daemon socket exists (daemon is likely running).
    pub fn daemon_available(&self) -> bool {
        self.socket_path.exists()
    }

    /// `GET` the given resource path.
    pub async fn get(&self, path: &str) -> Result<Bytes, ClientError> {
        self.send("GET", path, &[]).await
    }

    /// `POST` a raw body to the given resource path.
    pub async fn post(&self, path: &str, body: &[u8]) -> Result<Bytes, ClientError> {
        self.send("POST", path, body).await
    }

    /// `PUT` a raw body to the given resource path.
    pub async fn put(&self, path: &str, body: &[u8]) -> Result<Bytes, ClientError> {
        self.send("PUT", path, body).await
    }

    /// `DELETE` the given resource path.
    pub async fn delete(&self, path: &str) -> Result<Bytes, ClientError> {
        self.send("DELETE", path, &[]).await
    }

    /// Send one HTTP request over a freshly dialed Unix socket connection
    /// and return the response body.
    ///
    /// The method is validated before any network activity; 2xx statuses
    /// return the body, anything else becomes [`ClientError::Remote`] with
    /// the response body passed through verbatim as diagnostic text.
    pub async fn send(
        &self,
        method: &str,
        path: &str,
        body: &[u8],
    ) -> Result<Bytes, ClientError> {
        let method = parse_method(method)?;

        debug!(
            %method,
            path,
            body = %String::from_utf8_lossy(body),
            socket = %self.socket_path.display(),
            "sending daemon request"
        );

        let stream =
            UnixStream::connect(&self.socket_path)
                .await
                .map_err(|e| ClientError::Connect {
                    path: self.socket_path.clone(),
                    source: e,
                })?;

        let io = TokioIo::new(stream);

        let (mut sender, conn) =
            hyper::client::conn::http1::handshake::<_, http_body_util::Full<Bytes>>(io)
                .await
                .map_err(ClientError::Transport)?;

        // Drive the connection in the background; it finishes when the
        // request/response exchange completes and the sender is dropped.
        tokio::spawn(async move {
            if let Err(e) = conn.await {
                tracing::warn!(error = %e, "daemon connection error");
            }
        });

        let has_body = method == Method::POST || method == Method::PUT;

        let mut builder = hyper::Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        if has_body {
            builder = builder.header("content-type", "application/octet-stream");
        }

        let req = builder.body(http_body_util::Full::new(Bytes::copy_from_slice(body)))?;

        let resp = sender
            .send_request(req)
            .await
            .map_err(ClientError::Transport)?;

        let status = resp.status();

        let resp_body = http_body_util::BodyExt::collect(resp.into_body())
            .await
            .map_err(ClientError::ReadBody)?
            .to_bytes();

        debug!(
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&resp_body),
            "daemon response"
        );

        if !status.is_success() {
            return Err(ClientError::Remote {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&resp_body).into_owned(),
            });
        }

        Ok(resp_body)
    }
}

/// Validate a method string against the supported set without touching the
/// network.
fn parse_method(method: &str) -> Result<Method, ClientError> {
    match method {
        "GET" => Ok(Method::GET),
        "POST" => Ok(Method::POST),
        "PUT" => Ok(Method::PUT),
        "DELETE" => Ok(Method::DELETE),
        other => Err(ClientError::UnsupportedMethod(other.to_string())),
    }
}
