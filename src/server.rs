use crate::config::{AppConfig, SiteConfig};
use crate::dom::HtmlDocument;
use crate::page::PageContext;
use crate::render::render_with_comments;
use crate::routing::{RouteContent, RouteDecision, resolve_route};
use crate::theme::ThemeState;
use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub site: Arc<dyn SiteConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, site: Arc<dyn SiteConfig>) -> Self {
        Self {
            config: Arc::new(config),
            site,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_page))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(?err, "failed to listen for shutdown signal");
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn serve_index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    serve(&state, "/", &headers).await
}

/// The wildcard capture arrives percent-decoded, matching file names on disk.
async fn serve_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
    headers: HeaderMap,
) -> Response {
    serve(&state, &path, &headers).await
}

async fn serve(state: &AppState, path: &str, headers: &HeaderMap) -> Response {
    match resolve_route(&state.config.page_root, path).await {
        Ok(RouteDecision::Serve(content)) => {
            let theme = theme_from_headers(headers).unwrap_or(state.config.default_theme);
            Html(render_page(state, &content, theme)).into_response()
        }
        Ok(RouteDecision::NotFound) => (StatusCode::NOT_FOUND, "not found").into_response(),
        Err(err) => {
            error!(%path, ?err, "failed to load page");
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to load page").into_response()
        }
    }
}

fn render_page(state: &AppState, content: &RouteContent, theme: ThemeState) -> String {
    let document = HtmlDocument::parse(&content.html);
    let url = state.config.page_url(&content.path);
    let page = match PageContext::from_url(&url, document.title()) {
        Ok(page) => page,
        Err(err) => {
            warn!(%url, ?err, "page url did not parse; using the route path as identifier");
            PageContext::new(url, content.path.clone(), document.title())
        }
    };
    render_with_comments(document, &page, state.site.clone(), theme)
}

pub fn theme_from_headers(headers: &HeaderMap) -> Option<ThemeState> {
    headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find_map(|c| c.strip_prefix("theme="))
                .map(ThemeState::parse)
        })
        .filter(|theme| *theme != ThemeState::Unresolved)
}
