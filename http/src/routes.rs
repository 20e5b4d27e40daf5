//! Routing and handlers.
//!
//! `App::handle` accepts any `http_body::Body`, so tests can drive it with
//! `Full<Bytes>` requests and never open a socket.

use crate::error::{ApiError, HttpError};
use crate::response;
use crate::wire::{NewPlayerBody, PlantBody, PlayerBody, PlotBody};
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::{BodyExt, Full};
use hyper::body::Body;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;
use tillage_core::{PlayerId, PlayerStore, PlotEngine, PlotStore};
use tillage_flow::{Clock, PlotError, PlotId};
use tracing::Instrument;

#[derive(Debug, Clone, Copy)]
enum Route {
    Health,
    Players,
    Plot,
}

/// The HTTP application: a route table over a shared engine.
pub struct App<S, C> {
    engine: Arc<PlotEngine<S, C>>,
    routes: matchit::Router<Route>,
}

impl<S, C> App<S, C>
where
    S: PlotStore + PlayerStore,
    C: Clock,
{
    pub fn new(engine: Arc<PlotEngine<S, C>>) -> Result<Self, HttpError> {
        let mut routes = matchit::Router::new();
        routes.insert("/health", Route::Health)?;
        routes.insert("/players", Route::Players)?;
        routes.insert("/players/{player}/plots/{plot}", Route::Plot)?;
        Ok(Self { engine, routes })
    }

    /// Serve one request.
    pub async fn handle<B>(&self, req: Request<B>) -> Response<Full<Bytes>>
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: Display,
    {
        let request_id = uuid::Uuid::new_v4().to_string();
        let method = req.method().clone();
        let path = req.uri().path().to_string();
        let span = tracing::info_span!(
            "HTTPRequest",
            tillage.http.method = %method,
            tillage.http.path = %path,
            tillage.http.request_id = %request_id
        );

        async move {
            let mut res = match self.dispatch(req).await {
                Ok(res) => res,
                Err(err) => {
                    if err.status.is_server_error() {
                        tracing::error!(status = %err.status, error = %err.message, "Request failed");
                    } else {
                        tracing::debug!(status = %err.status, error = %err.message, "Request rejected");
                    }
                    response::error(&err)
                }
            };
            if let Ok(value) = http::HeaderValue::from_str(&request_id) {
                res.headers_mut().insert("x-request-id", value);
            }
            tracing::info!(status = %res.status(), "Request completed");
            res
        }
        .instrument(span)
        .await
    }

    async fn dispatch<B>(&self, req: Request<B>) -> Result<Response<Full<Bytes>>, ApiError>
    where
        B: Body + Send,
        B::Data: Send,
        B::Error: Display,
    {
        let path = req.uri().path().to_string();
        let matched = self
            .routes
            .at(&path)
            .map_err(|_| ApiError::not_found("Not Found"))?;
        let route = *matched.value;

        match (route, req.method().clone()) {
            (Route::Health, Method::GET) => {
                Ok(response::ok(&serde_json::json!({ "status": "ok" })))
            }
            (Route::Players, Method::GET) => self.list_players().await,
            (Route::Players, Method::POST) => {
                let body: NewPlayerBody = read_json(req).await?;
                self.create_player(body).await
            }
            (Route::Plot, method @ (Method::GET | Method::PUT)) => {
                let player = parse_player(matched.params.get("player"))?;
                let plot = parse_plot(matched.params.get("plot"))?;
                if method == Method::GET {
                    self.get_plot(player, plot).await
                } else {
                    let body: PlantBody = read_json(req).await?;
                    self.put_plot(player, plot, body).await
                }
            }
            _ => Err(ApiError::method_not_allowed()),
        }
    }

    async fn list_players(&self) -> Result<Response<Full<Bytes>>, ApiError> {
        let players = self.engine.players().await?;
        let body: BTreeMap<PlayerId, PlayerBody> = players
            .iter()
            .map(|p| (p.id, PlayerBody::from(p)))
            .collect();
        Ok(response::ok(&body))
    }

    async fn create_player(&self, body: NewPlayerBody) -> Result<Response<Full<Bytes>>, ApiError> {
        let registered = self.engine.register(&body.name, body.auth).await?;
        Ok(response::ok(&PlayerBody::from(registered)))
    }

    async fn get_plot(
        &self,
        player: PlayerId,
        plot: PlotId,
    ) -> Result<Response<Full<Bytes>>, ApiError> {
        let plot = self.engine.resolve_and_maybe_persist(player, plot).await?;
        Ok(response::ok(&PlotBody::from(&plot)))
    }

    async fn put_plot(
        &self,
        player: PlayerId,
        plot: PlotId,
        body: PlantBody,
    ) -> Result<Response<Full<Bytes>>, ApiError> {
        let plot = self.engine.plant(player, plot, body.item).await?;
        Ok(response::ok(&PlotBody::from(&plot)))
    }
}

fn parse_player(raw: Option<&str>) -> Result<PlayerId, ApiError> {
    raw.and_then(|s| s.parse::<PlayerId>().ok())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid player id {:?}", raw.unwrap_or(""))))
}

fn parse_plot(raw: Option<&str>) -> Result<PlotId, ApiError> {
    let index = raw
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| ApiError::bad_request(format!("Invalid plot id {:?}", raw.unwrap_or(""))))?;
    PlotId::new(index).map_err(|e| match e {
        PlotError::OutOfRange(_) => ApiError::not_found(e.to_string()),
        other => ApiError::bad_request(other.to_string()),
    })
}

async fn read_json<B, T>(req: Request<B>) -> Result<T, ApiError>
where
    B: Body,
    B::Error: Display,
    T: DeserializeOwned,
{
    let bytes = req
        .into_body()
        .collect()
        .await
        .map_err(|e| ApiError::bad_request(format!("Failed to read body: {e}")))?
        .to_bytes();
    serde_json::from_slice(&bytes).map_err(|e| {
        ApiError::bad_request(format!(
            "Failed to unmarshal {:?}: {e}",
            String::from_utf8_lossy(&bytes)
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn test_parse_plot_bounds() {
        assert_eq!(parse_plot(Some("5")).unwrap().index(), 5);
        assert_eq!(parse_plot(Some("6")).unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(
            parse_plot(Some("x")).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_parse_player() {
        assert_eq!(parse_player(Some("12")).unwrap(), 12);
        assert_eq!(
            parse_player(Some("abc")).unwrap_err().status,
            StatusCode::BAD_REQUEST
        );
    }
}
