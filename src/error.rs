use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::qr::QrError;
use crate::store::StoreError;
use crate::uploads::UploadError;

#[derive(Debug)]
pub enum AppError {
    Upload(UploadError),
    Intake(StoreError),
    Listing(StoreError),
    QrCode(QrError),
    Template(askama::Error),
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    message: String,
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    let body = Failure {
        success: false,
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Upload(e) => {
                tracing::warn!("Rejected upload: {e:?}");
                failure(e.status(), e.to_string())
            }
            AppError::Intake(e) => {
                tracing::error!("Error processing visitor: {e}");
                failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Error processing visitor information",
                )
            }
            AppError::Listing(e) => {
                tracing::error!("Error fetching visitors: {e}");
                failure(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching visitors")
            }
            AppError::QrCode(e) => {
                tracing::error!("Error generating QR code: {e}");
                failure(StatusCode::INTERNAL_SERVER_ERROR, "Error generating QR code")
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

impl From<UploadError> for AppError {
    fn from(e: UploadError) -> Self {
        AppError::Upload(e)
    }
}

impl From<QrError> for AppError {
    fn from(e: QrError) -> Self {
        AppError::QrCode(e)
    }
}

impl From<askama::Error> for AppError {
    fn from(e: askama::Error) -> Self {
        AppError::Template(e)
    }
}
