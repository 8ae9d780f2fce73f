//! HTTP server rendering the site on request

use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::net::SocketAddr;
use tower_http::trace::TraceLayer;

use crate::helpers::url_for;
use crate::pages::{AdminTab, ContactForm, Page, Pages};
use crate::templates::STYLESHEET;

/// Error returned by a handler; rendered as a plain 500 page
pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Failed to render page");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error: the page could not be rendered.",
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

type PageResult = std::result::Result<Page, AppError>;

#[derive(Debug, Default, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminParams {
    tab: Option<String>,
    q: Option<String>,
}

/// Build the site's router, mounted under the configured root
pub fn router(pages: Pages) -> Router {
    let root = pages.config().root.trim_end_matches('/').to_string();

    let routes = Router::new()
        .route("/", get(home_handler))
        .route("/post/:slug", get(post_handler))
        .route("/category/:slug", get(category_handler))
        .route("/about", get(about_handler))
        .route("/contact", get(contact_handler).post(contact_submit_handler))
        .route("/admin", get(admin_handler))
        .route("/search", get(search_handler))
        .route("/assets/site.css", get(stylesheet_handler))
        .fallback(fallback_handler);

    let app = if root.is_empty() {
        routes
    } else {
        Router::new()
            .nest(&root, routes)
            .fallback(outer_fallback_handler)
    };

    app.with_state(pages).layer(TraceLayer::new_for_http())
}

/// Start the server and serve until the process is stopped
pub async fn start(pages: Pages, ip: &str, port: u16, open: bool) -> Result<()> {
    let root = pages.config().root.clone();
    let app = router(pages);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}{}", ip, port, root);
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

async fn home_handler(State(pages): State<Pages>) -> PageResult {
    Ok(pages.home().await?)
}

async fn post_handler(State(pages): State<Pages>, Path(slug): Path<String>) -> PageResult {
    Ok(pages.post(&slug).await?)
}

async fn category_handler(State(pages): State<Pages>, Path(slug): Path<String>) -> PageResult {
    Ok(pages.category(&slug).await?)
}

async fn about_handler(State(pages): State<Pages>) -> PageResult {
    Ok(pages.about().await?)
}

async fn contact_handler(State(pages): State<Pages>) -> PageResult {
    Ok(pages.contact().await?)
}

async fn contact_submit_handler(
    State(pages): State<Pages>,
    Form(form): Form<ContactForm>,
) -> PageResult {
    Ok(pages.submit_contact(form).await?)
}

async fn admin_handler(
    State(pages): State<Pages>,
    Query(params): Query<AdminParams>,
) -> PageResult {
    // Unknown tabs fall back to the posts tab
    let tab = params
        .tab
        .as_deref()
        .and_then(|t| t.parse::<AdminTab>().ok())
        .unwrap_or_default();
    Ok(pages.admin(tab, params.q.as_deref().unwrap_or("")).await?)
}

async fn search_handler(
    State(pages): State<Pages>,
    Query(params): Query<SearchParams>,
) -> PageResult {
    Ok(pages.search(params.q.as_deref().unwrap_or("")).await?)
}

async fn stylesheet_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLESHEET,
    )
}

async fn fallback_handler(State(pages): State<Pages>, uri: Uri) -> PageResult {
    Ok(pages.not_found(uri.path())?)
}

/// Paths outside a nested root
async fn outer_fallback_handler(State(pages): State<Pages>, uri: Uri) -> PageResult {
    // The nested router only matches its index without the trailing slash
    let home = url_for(pages.config(), "/");
    if uri.path().strip_suffix('/') == Some(home.as_str()) {
        return Ok(pages.home().await?);
    }
    Ok(pages.not_found(uri.path())?)
}

/// Open URL in default browser
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
