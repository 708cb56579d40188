use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Text fields of a visitor submission, copied verbatim into the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisitorForm {
    pub visitor_name: String,
    pub phone_number: String,
    pub person_to_visit: String,
    pub purpose: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorRecord {
    #[serde(default)]
    pub visitor_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub person_to_visit: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub photo_path: Option<String>,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub ip: String,
}

impl VisitorRecord {
    pub fn new(form: VisitorForm, photo_path: Option<String>, ip: String) -> Self {
        Self {
            visitor_name: form.visitor_name,
            phone_number: form.phone_number,
            person_to_visit: form.person_to_visit,
            purpose: form.purpose,
            photo_path,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            ip,
        }
    }
}
