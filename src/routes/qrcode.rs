use axum::{
    extract::State,
    http::HeaderMap,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::qr;
use crate::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QrCodeResponse {
    success: bool,
    qr_code: String,
    url: String,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/qrcode", get(qr_code))
}

async fn qr_code(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<QrCodeResponse>, AppError> {
    let url = qr::visitor_url(&state.config, &headers);
    let qr_code = qr::render_data_url(&url)?;

    Ok(Json(QrCodeResponse {
        success: true,
        qr_code,
        url,
    }))
}
