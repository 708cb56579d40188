use std::io::Cursor;

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use thiserror::Error;

use crate::config::Config;

const QR_SIZE: u32 = 300;

#[derive(Error, Debug)]
pub enum QrError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("PNG encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Absolute URL of the visitor form as reachable by whoever scans the code.
pub fn visitor_url(config: &Config, headers: &HeaderMap) -> String {
    let base = match &config.base_url {
        Some(base) => base.clone(),
        None => {
            let proto = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.split(',').next())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or("http");
            let host = headers
                .get(header::HOST)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
                .unwrap_or_else(|| format!("localhost:{}", config.port));
            format!("{proto}://{host}")
        }
    };

    let mut base = base.trim_end_matches('/').to_string();
    if config.force_https {
        if let Some(rest) = base.strip_prefix("http://") {
            base = format!("https://{rest}");
        }
    }

    format!("{base}/visitor")
}

/// Render `text` as a PNG QR code wrapped in a `data:` URL.
pub fn render_data_url(text: &str) -> Result<String, QrError> {
    let code = QrCode::new(text.as_bytes())?;
    let img = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_SIZE, QR_SIZE)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img).write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;

    Ok(format!("data:image/png;base64,{}", STANDARD.encode(&png)))
}
