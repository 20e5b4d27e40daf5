//! # Ingress: Accept Loop
//!
//! One tokio task per connection, HTTP/1 only. Every connection shares the
//! same `App` (and therefore the same engine, store and clock).

use crate::error::HttpError;
use crate::routes::App;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tillage_core::{PlayerStore, PlotStore};
use tillage_flow::Clock;
use tokio::net::TcpListener;

/// Serve `app` on `addr` until `shutdown` resolves.
///
/// # Example
///
/// ```rust,ignore
/// let app = App::new(Arc::new(engine))?;
/// tillage_http::serve("0.0.0.0:8080".parse()?, app, tokio::signal::ctrl_c()).await?;
/// ```
pub async fn serve<S, C, F, T>(addr: SocketAddr, app: App<S, C>, shutdown: F) -> Result<(), HttpError>
where
    S: PlotStore + PlayerStore,
    C: Clock,
    F: Future<Output = T>,
{
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Tillage listening");

    let app = Arc::new(app);
    tokio::pin!(shutdown);

    loop {
        let (stream, peer) = tokio::select! {
            accepted = listener.accept() => accepted?,
            _ = &mut shutdown => {
                tracing::info!("Shutdown signal received, no longer accepting connections");
                return Ok(());
            }
        };

        let io = TokioIo::new(stream);
        let app = app.clone();

        tokio::task::spawn(async move {
            let service = service_fn(move |req: Request<Incoming>| {
                let app = app.clone();
                async move { Ok::<_, Infallible>(app.handle(req).await) }
            });

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                tracing::warn!(%peer, error = ?err, "Error serving connection");
            }
        });
    }
}
