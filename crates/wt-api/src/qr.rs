//! # QR Rendering Collaborator
//!
//! Turns a UPI link into an image. Rendering happens on a spawned task; the
//! register applies the outcome only if the checkout session that asked for
//! it is still live.
//!
//! ```text
//!  begin_checkout ──► UpiUri ──► spawn(render_outcome) ──► complete_qr(token, outcome)
//!                                       │
//!                      LocalQrRenderer (SVG, default)
//!                      HttpQrRenderer  GET <endpoint>?size=NxN&data=<uri>
//! ```
//!
//! The link carries the payee, amount and bill note, so it only leaves the
//! terminal when `[qr] endpoint` is configured.

use std::sync::Arc;

use async_trait::async_trait;
use qrcode::render::svg;
use qrcode::QrCode;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};
use url::Url;
use wt_core::{QrImage, QrOutcome, UpiUri};

use crate::client::check_status;
use crate::config::{ApiSettings, QrSettings};
use crate::error::{ClientError, ClientResult};

/// Renders a UPI link as an image.
#[async_trait]
pub trait QrRenderer: Send + Sync {
    async fn render(&self, uri: &UpiUri) -> ClientResult<QrImage>;
}

/// Runs the renderer and folds any failure into [`QrOutcome::Failed`].
pub async fn render_outcome(renderer: &dyn QrRenderer, uri: UpiUri) -> QrOutcome {
    match renderer.render(&uri).await {
        Ok(image) => {
            debug!(bytes = image.bytes.len(), content_type = %image.content_type, "QR rendered");
            QrOutcome::Ready { uri, image }
        }
        Err(e) => {
            warn!(error = %e, "QR rendering failed");
            QrOutcome::Failed {
                uri,
                reason: e.to_string(),
            }
        }
    }
}

/// Picks the renderer for the configured `[qr]` section.
pub fn renderer_from_config(
    qr: &QrSettings,
    api: &ApiSettings,
) -> ClientResult<Arc<dyn QrRenderer>> {
    match &qr.endpoint {
        Some(endpoint) => {
            info!(endpoint = %endpoint, "QR codes rendered by remote service");
            Ok(Arc::new(HttpQrRenderer::new(endpoint, qr.size, api)?))
        }
        None => Ok(Arc::new(LocalQrRenderer::new(qr.size))),
    }
}

/// [`QrRenderer`] that encodes the link in-process as SVG.
#[derive(Debug, Clone, Copy)]
pub struct LocalQrRenderer {
    size: u32,
}

impl LocalQrRenderer {
    pub fn new(size: u32) -> Self {
        LocalQrRenderer { size }
    }
}

#[async_trait]
impl QrRenderer for LocalQrRenderer {
    async fn render(&self, uri: &UpiUri) -> ClientResult<QrImage> {
        let code = QrCode::new(uri.as_str().as_bytes())
            .map_err(|e| ClientError::QrRender(e.to_string()))?;
        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.size, self.size)
            .build();
        Ok(QrImage::new("image/svg+xml", image.into_bytes()))
    }
}

/// [`QrRenderer`] backed by an HTTP image endpoint.
#[derive(Debug, Clone)]
pub struct HttpQrRenderer {
    http: reqwest::Client,
    endpoint: Url,
    size: u32,
}

impl HttpQrRenderer {
    pub fn new(endpoint: &str, size: u32, api: &ApiSettings) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(api.timeout())
            .connect_timeout(api.connect_timeout())
            .build()?;

        Ok(HttpQrRenderer {
            http,
            endpoint: Url::parse(endpoint)?,
            size,
        })
    }

    /// Full request URL; `data` is form-encoded by `url`.
    pub fn request_url(&self, uri: &UpiUri) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("size", &format!("{0}x{0}", self.size))
            .append_pair("data", uri.as_str());
        url
    }
}

#[async_trait]
impl QrRenderer for HttpQrRenderer {
    async fn render(&self, uri: &UpiUri) -> ClientResult<QrImage> {
        let response = self.http.get(self.request_url(uri)).send().await?;
        let response = check_status(response).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_default();

        if !content_type.starts_with("image/") {
            return Err(ClientError::QrRender(format!(
                "expected an image, got '{}'",
                content_type
            )));
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(ClientError::QrRender("empty image".into()));
        }

        Ok(QrImage::new(content_type, bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_backend;
    use axum::extract::Query;
    use axum::http::header;
    use axum::response::IntoResponse;
    use axum::routing::get;
    use axum::Router;
    use chrono::Utc;
    use std::collections::HashMap;
    use wt_core::{Cart, Money, Product, UpiPayee};

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn uri() -> UpiUri {
        let payee = UpiPayee::new("shop@okicici", "WalletTracker").unwrap();
        let mut cart = Cart::new(Utc::now());
        cart.add_item(&Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery"));
        UpiUri::build(&payee, cart.bill())
    }

    async fn image(Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
        match params.get("data") {
            Some(data) if data.starts_with("upi://pay?") => {
                ([(header::CONTENT_TYPE, "image/png")], PNG_MAGIC.to_vec()).into_response()
            }
            _ => ([(header::CONTENT_TYPE, "text/html")], "bad request".to_string()).into_response(),
        }
    }

    async fn renderer(path: &str) -> HttpQrRenderer {
        let base = spawn_backend(Router::new().route("/qr", get(image))).await;
        HttpQrRenderer::new(&format!("{}{}", base, path), 200, &ApiSettings::default()).unwrap()
    }

    struct BrokenRenderer;

    #[async_trait]
    impl QrRenderer for BrokenRenderer {
        async fn render(&self, _uri: &UpiUri) -> ClientResult<QrImage> {
            Err(ClientError::ConnectionFailed("offline".into()))
        }
    }

    #[tokio::test]
    async fn test_renders_png() {
        let renderer = renderer("/qr").await;
        let image = renderer.render(&uri()).await.unwrap();
        assert_eq!(image.content_type, "image/png");
        assert_eq!(image.extension(), "png");
        assert_eq!(image.bytes, PNG_MAGIC);
    }

    #[tokio::test]
    async fn test_request_url_roundtrips_uri() {
        let renderer = renderer("/qr").await;
        let uri = uri();
        let url = renderer.request_url(&uri);
        let pairs: HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs.get("size").map(String::as_str), Some("200x200"));
        assert_eq!(pairs.get("data").map(String::as_str), Some(uri.as_str()));
    }

    #[tokio::test]
    async fn test_non_image_response_fails() {
        let renderer = renderer("/missing").await;
        let outcome = render_outcome(&renderer, uri()).await;
        assert!(!outcome.is_ready());
    }

    #[tokio::test]
    async fn test_local_renderer_produces_svg() {
        let image = LocalQrRenderer::new(200).render(&uri()).await.unwrap();
        assert_eq!(image.content_type, "image/svg+xml");
        assert_eq!(image.extension(), "svg");
        let text = String::from_utf8(image.bytes).unwrap();
        assert!(text.contains("<svg"));
        assert!(!text.contains("upi://"));
    }

    #[tokio::test]
    async fn test_default_config_renders_locally() {
        let renderer = renderer_from_config(&QrSettings::default(), &ApiSettings::default()).unwrap();
        let outcome = render_outcome(renderer.as_ref(), uri()).await;
        match outcome {
            QrOutcome::Ready { image, .. } => assert_eq!(image.content_type, "image/svg+xml"),
            QrOutcome::Failed { reason, .. } => panic!("local rendering failed: {}", reason),
        }
    }

    #[tokio::test]
    async fn test_failure_keeps_uri() {
        let uri = uri();
        match render_outcome(&BrokenRenderer, uri.clone()).await {
            QrOutcome::Failed { uri: kept, reason } => {
                assert_eq!(kept, uri);
                assert!(reason.contains("offline"));
            }
            QrOutcome::Ready { .. } => panic!("broken renderer reported success"),
        }
    }
}
