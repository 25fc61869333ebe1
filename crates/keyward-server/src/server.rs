use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, MatchedPath},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use keyward_auth::{TokenService, http::oauth_router};
use keyward_memory::InMemoryProvider;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use crate::{bootstrap, config::AppConfig};

pub struct KeywardServer {
    addr: SocketAddr,
    app: Router,
    provider: Arc<InMemoryProvider>,
    purge_interval: Duration,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

pub fn build_app(service: TokenService, cfg: &AppConfig) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(oauth_router(service))
        .layer(DefaultBodyLimit::max(cfg.server.body_limit_bytes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    use tracing::field::Empty;
                    // The matched route, never the raw path: revocation URIs carry token values.
                    let route = req
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or("unmatched");
                    tracing::info_span!(
                        "http.request",
                        http.method = %req.method(),
                        http.route = %route,
                        http.status_code = Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: Duration, span: &tracing::Span| {
                        span.record(
                            "http.status_code",
                            tracing::field::display(res.status().as_u16()),
                        );
                        tracing::info!(
                            http.status = %res.status().as_u16(),
                            elapsed_ms = %latency.as_millis(),
                            "request handled"
                        );
                    },
                ),
        )
}

#[derive(Default)]
pub struct ServerBuilder {
    config: AppConfig,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> anyhow::Result<KeywardServer> {
        let cfg = self.config;
        cfg.validate().map_err(anyhow::Error::msg)?;

        let provider = Arc::new(InMemoryProvider::with_grants(
            cfg.oauth.grant_types.iter().copied(),
        ));
        bootstrap::seed(&provider, &cfg.bootstrap)?;

        let service = TokenService::new(provider.clone(), Arc::new(cfg.oauth.clone()));
        let app = build_app(service, &cfg);

        tracing::info!(
            grant_types = ?cfg.oauth.grant_types,
            token_expiration = ?cfg.oauth.token_expiration,
            "Token service initialized"
        );

        Ok(KeywardServer {
            addr: cfg.addr(),
            app,
            provider,
            purge_interval: cfg.storage.purge_interval,
        })
    }
}

impl KeywardServer {
    /// The fully layered router, for serving without a listener.
    pub fn router(&self) -> Router {
        self.app.clone()
    }

    pub fn provider(&self) -> &Arc<InMemoryProvider> {
        &self.provider
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let purge = tokio::spawn(purge_loop(self.provider.clone(), self.purge_interval));

        let listener = tokio::net::TcpListener::bind(self.addr).await?;
        tracing::info!("listening on {}", self.addr);
        let served = axum::serve(listener, self.app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        purge.abort();
        served?;
        Ok(())
    }
}

async fn purge_loop(provider: Arc<InMemoryProvider>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        let removed = provider.purge_inactive();
        if removed > 0 {
            tracing::debug!(removed, "Purged inactive grant codes and tokens");
        }
    }
}

async fn shutdown_signal() {
    // Wait for Ctrl+C
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
