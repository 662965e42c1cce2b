//! HTTP server for the list and detail views

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::content::MarkdownRenderer;
use crate::error::BlogError;
use crate::store::DocumentStore;
use crate::templates::TemplateRenderer;
use crate::views::{like, BlogDetail, BlogList, LoadState, Notice};
use crate::Blog;

/// Server state
struct ServerState {
    blog: Blog,
    store: Arc<dyn DocumentStore>,
    list: RwLock<BlogList>,
    templates: TemplateRenderer,
    markdown: MarkdownRenderer,
}

/// Body of the like endpoints when the client asks for JSON
#[derive(Debug, Serialize)]
struct LikeResponse {
    id: String,
    likes: u64,
}

#[derive(Debug, Deserialize)]
struct ListLikeForm {
    page: Option<usize>,
}

impl ServerState {
    fn new(blog: Blog, store: Arc<dyn DocumentStore>) -> Result<Self> {
        Ok(Self {
            list: RwLock::new(BlogList::from_config(&blog.config)),
            templates: TemplateRenderer::new()?,
            markdown: MarkdownRenderer::with_options(
                &blog.config.highlight.theme,
                blog.config.highlight.line_number,
            ),
            store,
            blog,
        })
    }
}

/// Start the server
pub async fn start(blog: &Blog, ip: &str, port: u16, open: bool) -> Result<()> {
    let store = blog.open_store()?;
    let app = router(blog.clone(), store)?;

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}/blogs", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router around an already-open store
pub fn router(blog: Blog, store: Arc<dyn DocumentStore>) -> Result<Router> {
    let state = Arc::new(ServerState::new(blog, store)?);

    Ok(Router::new()
        .route("/", get(|| async { Redirect::to("/blogs") }))
        .route("/blogs", get(list_handler))
        .route("/blogs/:id/like", post(list_like_handler))
        .route("/blog/:id", get(detail_handler))
        .route("/blog/:id/like", post(detail_like_handler))
        .route("/404", get(not_found_handler))
        .fallback(not_found_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

/// List route: mounts the list on first visit (or `?refresh`), then pages
/// through what is in memory
async fn list_handler(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let page = parse_page(params.get("page").map(String::as_str));
    let notice = params.get("notice").and_then(|code| Notice::from_code(code));

    {
        let mut list = state.list.write().await;
        let remount = params.contains_key("refresh") && list.state() != LoadState::Loading;
        if list.state() == LoadState::Idle || remount {
            list.begin_loading();
            spawn_fetch(state.clone());
        }
    }

    let list = state.list.read().await;
    match list.render(&state.templates, &state.blog.config, page, notice.as_ref()) {
        Ok(html) => Html(html).into_response(),
        Err(e) => render_error(e),
    }
}

/// Fetch the collection in the background; the list route keeps serving
/// skeletons until the result lands
fn spawn_fetch(state: Arc<ServerState>) {
    tokio::spawn(async move {
        let collection = state.blog.config.collection.clone();
        let result = BlogList::request(state.store.as_ref(), &collection).await;
        // Failure is already logged inside finish_loading
        let _ = state.list.write().await.finish_loading(result);
    });
}

async fn list_like_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Form(form): Form<ListLikeForm>,
) -> Response {
    // The write happens with no list lock held; only the cached count is
    // read before and patched after.
    let current = state.list.read().await.find(&id).map(|post| post.likes);
    let result = match current {
        Some(current) => {
            let collection = &state.blog.config.collection;
            like::increment_likes(state.store.as_ref(), collection, &id, current).await
        }
        None => Err(BlogError::NotFound(id.clone())),
    };
    if let Ok(likes) = &result {
        state.list.write().await.apply_likes(&id, *likes);
    }
    let back = format!("/blogs?page={}", form.page.unwrap_or(1).max(1));
    like_response(&headers, id, result, &back)
}

async fn detail_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
) -> Response {
    let config = &state.blog.config;
    match BlogDetail::load_with_config(state.store.as_ref(), config, &id).await {
        Ok(detail) => match detail.render(&state.templates, &state.markdown, config) {
            Ok(html) => Html(html).into_response(),
            Err(e) => render_error(e),
        },
        Err(BlogError::NotFound(_)) => Redirect::to("/404").into_response(),
        Err(_) => Redirect::to(&format!("/blogs?notice={}", Notice::LOAD_FAILED)).into_response(),
    }
}

async fn detail_like_handler(
    State(state): State<Arc<ServerState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let store = state.store.as_ref();
    let result = match BlogDetail::open_with_config(store, &state.blog.config, &id).await {
        Ok(mut detail) => detail.like(store).await,
        Err(e) => Err(e),
    };
    if let Ok(likes) = &result {
        state.list.write().await.apply_likes(&id, *likes);
    }
    let back = format!("/blog/{}", id);
    like_response(&headers, id, result, &back)
}

async fn not_found_handler(State(state): State<Arc<ServerState>>) -> Response {
    match state.templates.render_not_found(&state.blog.config) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => render_error(e),
    }
}

/// JSON for the page script, a redirect for plain form posts
fn like_response(
    headers: &HeaderMap,
    id: String,
    result: Result<u64, BlogError>,
    back: &str,
) -> Response {
    match (wants_json(headers), result) {
        (true, Ok(likes)) => Json(LikeResponse { id, likes }).into_response(),
        (true, Err(BlogError::NotFound(_))) => StatusCode::NOT_FOUND.into_response(),
        (true, Err(e)) => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": e.to_string() })),
        )
            .into_response(),
        (false, _) => Redirect::to(back).into_response(),
    }
}

fn render_error(e: anyhow::Error) -> Response {
    tracing::error!("Render error: {}", e);
    (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
}

fn wants_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("application/json"))
        .unwrap_or(false)
}

/// Page numbers from the query string; anything unparsable means page 1.
/// Range clamping happens in the list itself.
fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
        .unwrap_or(1)
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
