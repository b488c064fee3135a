//! HTTP server.
//!
//! Pages are rendered per request from the posts directory, so edits show up
//! on reload. Besides pages it serves the feed, social card images, the
//! typewriter frame stream and the preference store.

use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{
        Html, IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, put},
};
use folio_core::{
    Config, Preferences,
    prefs::{PrefMap, PrefsBackend, THEME_KEY},
};
use folio_generator::{
    HtmlGenerator, OgCard, OgError, PostStore, RssGenerator, StoreError, Theme, html::HtmlError,
    meta::post_path, og::require_title,
};
use folio_typewriter::{Frame, Typewriter, TypewriterError, animate};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::{Stream, StreamExt, wrappers::ReceiverStream};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Longest accepted preference key.
const MAX_PREF_KEY_LEN: usize = 64;

/// Frames buffered between the animation task and the SSE response.
const FRAME_BUFFER: usize = 16;

/// Preference store shared by all requests.
pub type SharedPrefs = Preferences<Box<dyn PrefsBackend>>;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Page renderer, which also owns the configuration.
    pub generator: Arc<HtmlGenerator>,
    /// Post source.
    pub store: PostStore,
    /// Visitor preferences.
    pub prefs: SharedPrefs,
}

impl AppState {
    /// Create the server state.
    pub fn new(generator: HtmlGenerator, store: PostStore, prefs: SharedPrefs) -> Self {
        Self {
            generator: Arc::new(generator),
            store,
            prefs,
        }
    }

    fn config(&self) -> &Config {
        self.generator.config()
    }

    fn theme(&self) -> Theme {
        Theme::from_pref(self.prefs.get_str(THEME_KEY).as_deref())
    }
}

/// Handler errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Post store failure.
    #[error("post store error: {0}")]
    Store(#[from] StoreError),

    /// Page rendering failure.
    #[error("render error: {0}")]
    Html(#[from] HtmlError),

    /// Bad social card request.
    #[error("{0}")]
    Og(#[from] OgError),

    /// Typewriter could not start.
    #[error("typewriter error: {0}")]
    Typewriter(#[from] TypewriterError),

    /// Rejected preference key.
    #[error("invalid preference key")]
    PrefKey,

    /// Blocking task panicked or was cancelled.
    #[error("task failed: {0}")]
    Task(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match &self {
            ServerError::Store(e) if e.is_not_found() => {
                (StatusCode::NOT_FOUND, self.to_string()).into_response()
            }
            ServerError::Og(_) | ServerError::PrefKey => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "err": "invalid request" })),
            )
                .into_response(),
            _ => {
                error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
            }
        }
    }
}

/// Run file system work off the async workers.
async fn blocking<T, F>(f: F) -> Result<T, ServerError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, ServerError> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServerError::Task(e.to_string()))?
}

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/blog", get(blog_index))
        .route("/blog/rss.xml", get(rss_feed))
        .route("/blog/{slug}", get(post_redirect))
        .route("/blog/{slug}/{lang}", get(post_page))
        .route("/api/og", get(og_image))
        .route("/api/typewriter", get(typewriter_stream))
        .route("/api/prefs", get(get_prefs))
        .route("/api/prefs/{key}", put(put_pref).delete(delete_pref))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    Ok(Html(state.generator.render_home(state.theme())?))
}

async fn blog_index(State(state): State<AppState>) -> Result<Html<String>, ServerError> {
    blocking(move || {
        let posts = state.store.ordered_posts(false)?;
        Ok(Html(state.generator.render_blog_index(&posts, state.theme())?))
    })
    .await
}

async fn rss_feed(State(state): State<AppState>) -> Result<Response, ServerError> {
    if !state.config().rss.enabled {
        return Ok(not_found(State(state)).await);
    }

    blocking(move || {
        let posts = state.store.ordered_posts(true)?;
        let xml = RssGenerator::new(state.config(), state.generator.markdown()).generate(&posts);
        Ok((
            [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
            xml,
        )
            .into_response())
    })
    .await
}

async fn post_redirect(State(state): State<AppState>, Path(slug): Path<String>) -> Redirect {
    let lang = &state.config().site.default_language;
    Redirect::temporary(&post_path(&slug, lang))
}

async fn post_page(
    State(state): State<AppState>,
    Path((slug, lang)): Path<(String, String)>,
) -> Result<Response, ServerError> {
    blocking(move || {
        let theme = state.theme();
        match state.store.get_post(&slug, &lang) {
            Ok(post) => {
                let translations = state.store.translations(&slug)?;
                let html = state.generator.render_post(&post, &translations, theme)?;
                Ok(Html(html).into_response())
            }
            Err(e) if e.is_not_found() => {
                debug!(%slug, %lang, "post not found");
                Ok(not_found_page(&state))
            }
            Err(e) => Err(e.into()),
        }
    })
    .await
}

#[derive(Debug, Deserialize)]
struct OgQuery {
    title: Option<String>,
}

async fn og_image(
    State(state): State<AppState>,
    Query(query): Query<OgQuery>,
) -> Result<Response, ServerError> {
    let title = require_title(query.title.as_deref())?;
    let svg = OgCard::new(state.config(), title).render();
    Ok((
        [
            (header::CONTENT_TYPE, "image/svg+xml"),
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
        ],
        svg,
    )
        .into_response())
}

/// Frame as sent to the browser.
fn frame_json(frame: &Frame) -> String {
    serde_json::json!({
        "current": frame.current,
        "target": frame.target,
        "idle": frame.idle,
    })
    .to_string()
}

/// One animation per connection; it stops when the client goes away.
async fn typewriter_stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let typewriter = Typewriter::new(state.config().home.snippets.clone())?;
    let (tx, rx) = mpsc::channel(FRAME_BUFFER);
    tokio::spawn(animate(typewriter, tx));

    let stream = ReceiverStream::new(rx).map(|frame| Ok(Event::default().data(frame_json(&frame))));

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(30))
            .text("ping"),
    ))
}

async fn get_prefs(State(state): State<AppState>) -> Json<PrefMap> {
    Json(state.prefs.snapshot())
}

fn check_pref_key(key: &str) -> Result<(), ServerError> {
    let valid = !key.is_empty()
        && key.len() <= MAX_PREF_KEY_LEN
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid { Ok(()) } else { Err(ServerError::PrefKey) }
}

async fn put_pref(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(value): Json<Value>,
) -> Result<StatusCode, ServerError> {
    check_pref_key(&key)?;
    debug!(%key, "preference updated");
    state.prefs.set(key, value);
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_pref(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, ServerError> {
    check_pref_key(&key)?;
    state.prefs.remove(&key);
    Ok(StatusCode::NO_CONTENT)
}

fn not_found_page(state: &AppState) -> Response {
    match state.generator.render_not_found(state.theme()) {
        Ok(html) => (StatusCode::NOT_FOUND, Html(html)).into_response(),
        Err(e) => {
            error!(error = %e, "failed to render 404 page");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn not_found(State(state): State<AppState>) -> Response {
    not_found_page(&state)
}
