//! Read-only JSON API over the content store, plus the generated files

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::commands::generate::{generate_from, watch_content};
use crate::content::{CategoryCount, Navigation, PostSummary, TagCount};
use crate::query::PostDetail;
use crate::store::ContentStore;
use crate::Site;

/// Server state
pub struct ServerState {
    store: ContentStore,
}

impl ServerState {
    pub fn new(store: ContentStore) -> Self {
        Self { store }
    }
}

/// Errors surfaced to API clients
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("post `{0}` not found")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

/// Filters for the post listing; all given filters must match
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub category: Option<String>,
    pub tag: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelatedParams {
    pub limit: Option<usize>,
}

/// Build the application router
pub fn router(state: Arc<ServerState>) -> Router {
    let public_dir = state.store.site().public_dir.clone();

    Router::new()
        .route("/api/posts", get(list_posts))
        .route("/api/posts/:slug", get(get_post))
        .route("/api/posts/:slug/related", get(related_posts))
        .route("/api/posts/:slug/navigation", get(navigation))
        .route("/api/categories", get(categories))
        .route("/api/tags", get(tags))
        .route("/api/reload", post(reload))
        .fallback_service(ServeDir::new(public_dir).append_index_html_on_directories(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(site: &Site, ip: &str, port: u16, watch: bool) -> Result<()> {
    let state = Arc::new(ServerState::new(ContentStore::new(site.clone())));

    // Load before accepting requests so the first one is not slow
    let warm = Arc::clone(&state);
    let count = tokio::task::spawn_blocking(move || warm.store.snapshot().len()).await?;
    tracing::info!("Serving {} posts", count);

    let app = router(Arc::clone(&state));

    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    if watch {
        println!("Watching {:?} for changes...", site.content_dir);
    }
    println!("Press Ctrl+C to stop.");

    if watch {
        let watch_state = Arc::clone(&state);
        tokio::task::spawn_blocking(move || {
            if let Err(e) = watch_and_reload(&watch_state) {
                tracing::error!("File watcher error: {}", e);
            }
        });
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Reload the store (and regenerate artifacts) whenever content changes
fn watch_and_reload(state: &ServerState) -> Result<()> {
    let site = state.store.site();
    if !site.content_dir.exists() {
        tracing::warn!(
            "Content directory {:?} does not exist, not watching",
            site.content_dir
        );
        return Ok(());
    }

    watch_content(site, || {
        state.store.reload();
        if let Err(e) = generate_from(&state.store) {
            tracing::error!("Generation failed: {}", e);
        }
    })
}

/// `GET /api/posts`
pub async fn list_posts(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<PostSummary>> {
    let posts = state.store.public_snapshot();
    let defaults = &state.store.site().config.default_images;

    let summaries = posts
        .search(params.q.as_deref().unwrap_or(""))
        .into_iter()
        .filter(|p| params.category.as_deref().map_or(true, |c| p.in_category(c)))
        .filter(|p| {
            params
                .tag
                .as_deref()
                .map_or(true, |t| p.tags.iter().any(|tag| tag == t))
        })
        .map(|p| PostSummary::new(p, defaults))
        .collect();

    Json(summaries)
}

/// `GET /api/posts/:slug`
pub async fn get_post(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, ApiError> {
    let posts = state.store.public_snapshot();
    PostDetail::build(&posts, &slug, &state.store.site().config)
        .map(Json)
        .ok_or(ApiError::NotFound(slug))
}

/// `GET /api/posts/:slug/related`; an unknown slug has no related posts
pub async fn related_posts(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
    Query(params): Query<RelatedParams>,
) -> Json<Vec<PostSummary>> {
    let posts = state.store.public_snapshot();
    let config = &state.store.site().config;
    let limit = params.limit.unwrap_or(config.related_limit);

    Json(
        posts
            .related_posts(&slug, limit)
            .into_iter()
            .map(|p| PostSummary::new(p, &config.default_images))
            .collect(),
    )
}

/// `GET /api/posts/:slug/navigation`
pub async fn navigation(
    State(state): State<Arc<ServerState>>,
    Path(slug): Path<String>,
) -> Result<Json<Navigation>, ApiError> {
    state
        .store
        .public_snapshot()
        .navigation(&slug)
        .map(Json)
        .ok_or(ApiError::NotFound(slug))
}

/// `GET /api/categories`
pub async fn categories(State(state): State<Arc<ServerState>>) -> Json<Vec<CategoryCount>> {
    Json(state.store.public_snapshot().categories_with_counts())
}

/// `GET /api/tags`
pub async fn tags(State(state): State<Arc<ServerState>>) -> Json<Vec<TagCount>> {
    Json(state.store.public_snapshot().tags_with_counts())
}

/// `POST /api/reload`
pub async fn reload(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let count = tokio::task::spawn_blocking(move || state.store.reload().len())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "posts": count })))
}
