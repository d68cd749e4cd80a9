//! A scriptable mock daemon for exercising the IPC client.
//!
//! [`MockDaemon`] binds an axum router to a Unix socket in a temp
//! directory and serves scripted `(status, body)` responses per
//! `(method, path)` route. Connections are accepted one at a time in a
//! counted loop so tests can assert on how many dials the client made —
//! including zero.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hyper_util::rt::TokioIo;
use tokio::net::UnixListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tower::Service;
use tracing::debug;

type RouteTable = HashMap<(String, String), (u16, Vec<u8>)>;

/// Builder for [`MockDaemon`]: script routes, then [`start`](Self::start).
#[derive(Default)]
pub struct MockDaemonBuilder {
    routes: RouteTable,
}

impl MockDaemonBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `method path` with the given status and body. Unscripted
    /// routes return 404.
    pub fn route(
        mut self,
        method: &str,
        path: &str,
        status: u16,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.routes
            .insert((method.to_string(), path.to_string()), (status, body.into()));
        self
    }

    /// Bind a temp-dir Unix socket and start serving.
    pub async fn start(self) -> MockDaemon {
        let dir = tempfile::TempDir::new().expect("failed to create temp dir");
        let socket_path = dir.path().join("chargectl-mock.sock");
        let listener = UnixListener::bind(&socket_path).expect("failed to bind mock socket");

        let app = axum::Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(self.routes));

        let dials = Arc::new(AtomicUsize::new(0));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let accept_dials = Arc::clone(&dials);
        let accept_path = socket_path.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _addr)) = accepted else { break };
                        accept_dials.fetch_add(1, Ordering::SeqCst);
                        let app = app.clone();
                        tokio::spawn(async move {
                            let service = hyper::service::service_fn(
                                move |req: hyper::Request<hyper::body::Incoming>| {
                                    app.clone().call(req)
                                },
                            );
                            if let Err(e) = hyper::server::conn::http1::Builder::new()
                                .serve_connection(TokioIo::new(stream), service)
                                .await
                            {
                                debug!(error = %e, "mock daemon connection error");
                            }
                        });
                    }
                }
            }
            let _ = std::fs::remove_file(&accept_path);
        });

        MockDaemon {
            socket_path,
            dials,
            shutdown_tx: Some(shutdown_tx),
            task,
            _dir: dir,
        }
    }
}

/// A mock daemon listening on a throwaway Unix socket.
///
/// The socket lives in an owned temp directory that is deleted when this
/// value is dropped, guaranteeing cleanup even on panic.
pub struct MockDaemon {
    socket_path: PathBuf,
    dials: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
    _dir: tempfile::TempDir,
}

impl MockDaemon {
    pub fn builder() -> MockDaemonBuilder {
        MockDaemonBuilder::new()
    }

    /// The socket path clients should dial.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// How many connections have been accepted so far.
    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    /// Stop the accept loop and wait for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for MockDaemon {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.task.abort();
    }
}

async fn dispatch(
    State(routes): State<Arc<RouteTable>>,
    req: axum::extract::Request,
) -> Response {
    let key = (
        req.method().as_str().to_string(),
        req.uri().path().to_string(),
    );
    match routes.get(&key) {
        Some((status, body)) => (
            StatusCode::from_u16(*status).expect("scripted status code is invalid"),
            body.clone(),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            format!("no route for {} {}", key.0, key.1),
        )
            .into_response(),
    }
}
