//! Hyper server setup and request handling.

use std::convert::Infallible;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming as IncomingBody};
use hyper::{Request, Response};
use hyper_util::rt::TokioExecutor;
use hyper_util::rt::TokioIo;
use hyper_util::server::conn::auto::Builder as ConnectionBuilder;
use tokio::net::TcpListener;
use tokio::task::JoinSet;

use crate::router::Router;

/// HTTP server for the records API.
pub struct Server {
    listener: TcpListener,
    router: Arc<Router>,
}

impl Server {
    /// Binds the listener. Port 0 picks a free port; see [`Server::local_addr`].
    pub async fn bind(addr: SocketAddr, router: Router) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            router: Arc::new(router),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until the task is aborted.
    pub async fn serve(self) -> io::Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Serves connections until `shutdown` resolves, then aborts open
    /// connections so the router (and its runtime sender) is dropped.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!("Server listening on http://{}", addr);

        let mut connections = JoinSet::new();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(e) => {
                            tracing::warn!("Failed to accept connection: {}", e);
                            continue;
                        }
                    };
                    let io = TokioIo::new(stream);
                    let router = Arc::clone(&self.router);

                    connections.spawn(async move {
                        let builder = ConnectionBuilder::new(TokioExecutor::new());
                        if let Err(err) = builder
                            .serve_connection(
                                io,
                                hyper::service::service_fn(move |req| {
                                    handle_request(req, router.clone())
                                }),
                            )
                            .await
                        {
                            tracing::debug!("Error serving connection from {}: {}", peer, err);
                        }
                    });
                }
                Some(_) = connections.join_next(), if !connections.is_empty() => {}
                _ = &mut shutdown => {
                    tracing::info!("Shutting down server on {}", addr);
                    break;
                }
            }
        }

        connections.shutdown().await;
        Ok(())
    }
}

/// Handles an incoming HTTP request.
async fn handle_request(
    req: Request<IncomingBody>,
    router: Arc<Router>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match router.route(req).await {
        Ok(response) => response,
        Err(err) => {
            if err.status().is_server_error() {
                tracing::error!("{} {} failed: {}", method, path, err);
            } else {
                tracing::debug!("{} {} rejected: {}", method, path, err);
            }
            Response::from(err)
        }
    };
    tracing::trace!("{} {} -> {}", method, path, response.status());
    Ok(response.map(Full::new))
}
