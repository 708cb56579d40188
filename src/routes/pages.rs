use askama::Template;
use axum::{
    response::{Html, IntoResponse},
    routing::get,
    Router,
};

use crate::error::AppError;
use crate::AppState;

#[derive(Template)]
#[template(path = "index.html")]
struct AdminTemplate {
    static_hash: &'static str,
}

#[derive(Template)]
#[template(path = "visitor.html")]
struct VisitorFormTemplate {
    static_hash: &'static str,
    max_photo_mb: usize,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(admin_page))
        .route("/visitor", get(visitor_form))
}

async fn admin_page() -> Result<impl IntoResponse, AppError> {
    let template = AdminTemplate {
        static_hash: crate::STATIC_HASH,
    };
    Ok(Html(template.render()?))
}

async fn visitor_form() -> Result<impl IntoResponse, AppError> {
    let template = VisitorFormTemplate {
        static_hash: crate::STATIC_HASH,
        max_photo_mb: crate::uploads::MAX_PHOTO_BYTES / (1024 * 1024),
    };
    Ok(Html(template.render()?))
}
