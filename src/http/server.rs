//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (request ID, tracing)
//! - Bind server to a plain or TLS listener
//! - Dispatch control routes locally, proxy everything else
//! - Observability (metrics, correlation IDs)
//!
//! # Data Flow
//! ```text
//! request → ControlRouter
//!     → control route: answered locally
//!     → proxy route: context → resolve origin → forward → rewrite
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    routing::any,
    Router,
};
use axum_server::{tls_rustls::RustlsConfig, Handle};
use chrono::Utc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::{ProxyConfig, ProxySettings};
use crate::http::request::{propagate_request_id_layer, request_id, set_request_id_layer};
use crate::http::response::{
    drop_response, html_response, javascript_response, preflight_response, ProxyError,
};
use crate::lifecycle::startup::{build_blocklist, StartupError};
use crate::observability::metrics;
use crate::proxy::{ProxyRequestContext, RequestForwarder, ResponseRewriter};
use crate::routing::{ControlRouter, RouteKind};
use crate::scripts::pages::{inject_help_page, navigation_page};
use crate::scripts::{render_service_worker, ServiceWorkerParams};
use crate::session::SessionCookieManager;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<ProxySettings>,
    pub router: Arc<ControlRouter>,
    pub forwarder: Arc<RequestForwarder>,
    pub rewriter: Arc<ResponseRewriter>,
}

impl AppState {
    pub fn new(config: &ProxyConfig) -> Result<Self, StartupError> {
        let blocklist = Arc::new(build_blocklist(&config.blocklist)?);
        tracing::info!(entries = blocklist.len(), "Blocklist loaded");

        let session = SessionCookieManager::new(&config.session);
        Ok(Self {
            settings: Arc::new(config.proxy.clone()),
            router: Arc::new(ControlRouter::new(&config.proxy)),
            forwarder: Arc::new(RequestForwarder::new(&config.proxy)?),
            rewriter: Arc::new(ResponseRewriter::new(&config.proxy, blocklist, session)),
        })
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, StartupError> {
        let state = AppState::new(&config)?;
        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http())
            .layer(set_request_id_layer())
    }

    /// The configured router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            proxy_domain = %self.config.proxy.domain,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            proxy_domain = %self.config.proxy.domain,
            "HTTPS server starting"
        );

        let handle = Handle::new();
        let signal_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            signal_handle.graceful_shutdown(None);
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Catch-all handler: control routes first, then the proxy pipeline.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers());
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let kind = state.router.match_request(&request);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        route = kind.as_str(),
        "Handling request"
    );

    let response = match kind {
        RouteKind::Preflight => preflight_response(request.headers()),
        RouteKind::Drop => drop_response(request.headers()),
        RouteKind::Navigate => html_response(StatusCode::OK, navigation_page(&state.settings.domain)),
        RouteKind::InjectHelp => {
            html_response(StatusCode::OK, inject_help_page(&state.settings.domain))
        }
        RouteKind::ServiceWorker | RouteKind::Proxy => {
            match handle_proxied(&state, request, kind).await {
                Ok(response) => response,
                Err(err) => {
                    let status = err.status();
                    if status.is_server_error() {
                        tracing::error!(request_id = %request_id, path = %path, error = %err, "Proxy request failed");
                    } else {
                        tracing::warn!(request_id = %request_id, path = %path, error = %err, "Proxy request rejected");
                    }
                    err.into_response_for(&state.settings.domain)
                }
            }
        }
    };

    metrics::record_request(method.as_str(), response.status().as_u16(), kind.as_str(), start_time);
    response
}

async fn handle_proxied(
    state: &AppState,
    request: Request<Body>,
    kind: RouteKind,
) -> Result<Response, ProxyError> {
    let ctx = ProxyRequestContext::from_request(request, state.settings.max_body_bytes).await?;
    let origin = ctx.resolve_origin()?;

    tracing::debug!(origin = %origin.target, source = origin.source.as_str(), "Origin resolved");

    if kind == RouteKind::ServiceWorker {
        let params = ServiceWorkerParams {
            proxy_domain: &state.settings.domain,
            service_worker_path: &state.settings.service_worker_path,
            target: &origin.target,
        };
        return Ok(javascript_response(render_service_worker(&params, Utc::now())));
    }

    let upstream = state.forwarder.forward(&origin.target, &ctx).await?;
    tracing::debug!(origin = %origin.target, status = %upstream.status, "Upstream responded");

    Ok(state.rewriter.rewrite(upstream, &ctx, &origin))
}
