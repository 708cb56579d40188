pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod notify;
pub mod qr;
pub mod routes;
pub mod store;
pub mod uploads;

pub const STATIC_HASH: &str = env!("STATIC_HASH");

use std::sync::Arc;

use axum::http::{header, HeaderValue};
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Config;
use crate::notify::Notifier;
use crate::store::VisitorStore;
use crate::uploads::{AttachmentStore, MAX_PHOTO_BYTES};

/// Room for the text fields and multipart framing on top of the photo cap.
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub visitors: VisitorStore,
    pub attachments: AttachmentStore,
    pub notifier: Notifier,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            visitors: VisitorStore::new(&config.visitors_file),
            attachments: AttachmentStore::new(&config.upload_dir),
            notifier: Notifier::new(&config.twilio_api_base, config.twilio.clone()),
            config: Arc::new(config),
        }
    }
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Creates the attachment directory if it does not exist yet. The visitor log
/// itself is created lazily by the first append.
pub async fn build_app(config: Config) -> std::io::Result<Router> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let state = AppState::new(config);
    let static_dir = state.config.static_dir.clone();
    let upload_dir = state.attachments.dir().to_path_buf();

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Ok(Router::new()
        .route("/health", get(health))
        .merge(routes::pages::router())
        .merge(routes::visitors::router())
        .merge(routes::qrcode::router())
        .nest_service(
            "/static",
            ServiceBuilder::new()
                .layer(SetResponseHeaderLayer::overriding(
                    header::CACHE_CONTROL,
                    HeaderValue::from_static("public, max-age=86400"),
                ))
                .service(ServeDir::new(static_dir)),
        )
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES + FORM_OVERHEAD_BYTES))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state))
}
