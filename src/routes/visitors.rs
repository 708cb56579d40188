use axum::{
    extract::{Multipart, State},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

use crate::error::AppError;
use crate::extract::ClientIp;
use crate::models::{VisitorForm, VisitorRecord};
use crate::uploads::{PendingPhoto, UploadError, PHOTO_FIELD};
use crate::AppState;

pub const RECORDED_MESSAGE: &str =
    "Visitor information recorded successfully. The host has been notified.";

#[derive(Serialize)]
struct IntakeResponse {
    success: bool,
    message: &'static str,
    data: IntakeSummary,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntakeSummary {
    visitor_name: String,
    person_to_visit: String,
    timestamp: String,
}

#[derive(Serialize)]
struct VisitorList {
    success: bool,
    visitors: Vec<VisitorRecord>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/visitor", post(create_visitor))
        .route("/api/visitors", get(list_visitors))
}

/// Collect the text fields and at most one photo. File parts with an empty
/// filename are what browsers send for an untouched file input, so they are
/// skipped rather than rejected.
async fn read_submission(
    mut multipart: Multipart,
) -> Result<(VisitorForm, Option<PendingPhoto>), UploadError> {
    let mut form = VisitorForm::default();
    let mut photo = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);

        match file_name.as_deref() {
            None => {
                let slot = match name.as_str() {
                    "visitorName" => &mut form.visitor_name,
                    "phoneNumber" => &mut form.phone_number,
                    "personToVisit" => &mut form.person_to_visit,
                    "purpose" => &mut form.purpose,
                    _ => continue,
                };
                *slot = field.text().await?;
            }
            Some("") => continue,
            Some(_) => {
                if name != PHOTO_FIELD || photo.is_some() {
                    return Err(UploadError::UnexpectedField(name));
                }
                photo = Some(PendingPhoto::read(field).await?);
            }
        }
    }

    Ok((form, photo))
}

async fn create_visitor(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    multipart: Multipart,
) -> Result<Json<IntakeResponse>, AppError> {
    let (form, photo) = read_submission(multipart).await?;

    let photo_path = match &photo {
        Some(photo) => Some(
            state
                .attachments
                .save(photo)
                .await
                .map_err(|e| AppError::Intake(e.into()))?,
        ),
        None => None,
    };

    let appended = state
        .visitors
        .append_with(|| VisitorRecord::new(form, photo_path.clone(), ip))
        .await;
    let record = match appended {
        Ok(record) => record,
        Err(e) => {
            if let Some(name) = &photo_path {
                state.attachments.remove(name).await;
            }
            return Err(AppError::Intake(e));
        }
    };

    tracing::info!(
        visitor = %record.visitor_name,
        host = %record.person_to_visit,
        photo = record.photo_path.is_some(),
        "visitor recorded"
    );

    let data = IntakeSummary {
        visitor_name: record.visitor_name.clone(),
        person_to_visit: record.person_to_visit.clone(),
        timestamp: record.timestamp.clone(),
    };
    state.notifier.notify(&record).await;

    Ok(Json(IntakeResponse {
        success: true,
        message: RECORDED_MESSAGE,
        data,
    }))
}

async fn list_visitors(State(state): State<AppState>) -> Result<Json<VisitorList>, AppError> {
    let visitors = state.visitors.list_all().await.map_err(AppError::Listing)?;

    Ok(Json(VisitorList {
        success: true,
        visitors,
    }))
}
