#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Body;
use axum::extract::{ConnectInfo, Form, Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use gatepass::config::Config;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tokio::sync::mpsc;

pub const CLIENT_ADDR: ([u8; 4], u16) = ([203, 0, 113, 7], 51000);
const BOUNDARY: &str = "----gatepass-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_vars(&[]).await
    }

    /// Build the app against a fresh temp directory, with `vars` layered on
    /// top of the path settings.
    pub async fn with_vars(vars: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static");

        let mut pairs = vec![
            (
                "VISITORS_FILE".to_string(),
                dir.path().join("visitors.json").display().to_string(),
            ),
            (
                "UPLOAD_DIR".to_string(),
                dir.path().join("uploads").display().to_string(),
            ),
            ("STATIC_DIR".to_string(), static_dir.display().to_string()),
        ];
        pairs.extend(vars.iter().map(|(k, v)| (k.to_string(), v.to_string())));

        let config = Config::from_vars(pairs).expect("Invalid test config");
        let router = gatepass::build_app(config)
            .await
            .expect("Failed to build app");

        Self { router, dir }
    }

    pub fn visitors_file(&self) -> PathBuf {
        self.dir.path().join("visitors.json")
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn stored_uploads(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.upload_dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    pub async fn get_with_headers(&self, uri: &str, headers: &[(&str, &str)]) -> Response {
        let mut builder = Request::builder().uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        self.request(builder.body(Body::empty()).unwrap()).await
    }

    /// POST a multipart submission to `/api/visitor` from `CLIENT_ADDR`.
    pub async fn submit(&self, parts: &[Part]) -> Response {
        self.request(submission_request(parts)).await
    }

    pub async fn submit_visitor(&self, name: &str, host: &str) -> Response {
        self.submit(&visitor_fields(name, "555-0100", host, "Meeting"))
            .await
    }

    pub async fn list_visitors(&self) -> serde_json::Value {
        let resp = self.get("/api/visitors").await;
        assert_eq!(resp.status(), StatusCode::OK);
        body_json(resp).await
    }
}

pub enum Part {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Vec<u8>,
    },
}

impl Part {
    pub fn text(name: &str, value: &str) -> Self {
        Part::Text {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn file(name: &str, file_name: &str, content_type: &str, data: Vec<u8>) -> Self {
        Part::File {
            name: name.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            data,
        }
    }
}

pub fn visitor_fields(name: &str, phone: &str, host: &str, purpose: &str) -> Vec<Part> {
    vec![
        Part::text("visitorName", name),
        Part::text("phoneNumber", phone),
        Part::text("personToVisit", host),
        Part::text("purpose", purpose),
    ]
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                         Content-Type: {content_type}\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn submission_request(parts: &[Part]) -> Request<Body> {
    let mut req = Request::builder()
        .uri("/api/visitor")
        .method("POST")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap();
    req.extensions_mut()
        .insert(ConnectInfo(SocketAddr::from(CLIENT_ADDR)));
    req
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    let body = body_string(resp).await;
    serde_json::from_str(&body).unwrap_or_else(|e| panic!("invalid JSON {body:?}: {e}"))
}

/// A message captured by the fake messaging API.
#[derive(Debug)]
pub struct CapturedMessage {
    pub account_sid: String,
    pub authorization: Option<String>,
    pub params: HashMap<String, String>,
}

#[derive(Clone)]
struct FakeTwilio {
    tx: mpsc::UnboundedSender<CapturedMessage>,
    status: StatusCode,
}

async fn fake_messages(
    State(fake): State<FakeTwilio>,
    Path(account_sid): Path<String>,
    headers: HeaderMap,
    Form(params): Form<HashMap<String, String>>,
) -> (StatusCode, Json<serde_json::Value>) {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let _ = fake.tx.send(CapturedMessage {
        account_sid,
        authorization,
        params,
    });
    (fake.status, Json(serde_json::json!({ "sid": "SM-test" })))
}

/// Start a stand-in for the messaging API that answers every message with
/// `status`. Returns its base URL and the stream of received messages.
pub async fn spawn_fake_twilio(
    status: StatusCode,
) -> (String, mpsc::UnboundedReceiver<CapturedMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let app = Router::new()
        .route(
            "/2010-04-01/Accounts/{sid}/Messages.json",
            post(fake_messages),
        )
        .with_state(FakeTwilio { tx, status });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), rx)
}

pub fn twilio_vars(api_base: &str) -> Vec<(&str, &str)> {
    vec![
        ("TWILIO_ACCOUNT_SID", "AC123"),
        ("TWILIO_AUTH_TOKEN", "secret"),
        ("TWILIO_WHATSAPP_NUMBER", "whatsapp:+14155238886"),
        ("HOST_WHATSAPP_NUMBER", "whatsapp:+15550001111"),
        ("TWILIO_API_BASE", api_base),
    ]
}
