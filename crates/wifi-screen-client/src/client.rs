//! HTTP client for a single display device.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use wifi_screen_core::config::Config;
use wifi_screen_core::{CanvasBatch, DisplayConfig, Result, ScreenError};

use crate::DisplayTransport;

/// One HTTP session against one device.
///
/// The underlying `reqwest::Client` keeps its connection pool for as long
/// as this value lives and releases it on drop.
#[derive(Debug, Clone)]
pub struct DisplayClient {
    base_url: String,
    http: reqwest::Client,
}

impl DisplayClient {
    /// Client with no request timeout.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, Some(timeout))
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::build(config.base_url(), config.timeout())
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ScreenError::Other(anyhow::Error::new(e)))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// `GET /display_config`.
    pub async fn fetch_config(&self) -> Result<DisplayConfig> {
        let url = self.url("display_config");
        debug!(%url, "Fetching display config");

        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        let body = resp.text().await.map_err(|e| connection_error(&url, e))?;

        let config = DisplayConfig::from_json(&body)?;
        debug!(
            width = config.rotated_width,
            height = config.rotated_height,
            "Display config received"
        );
        Ok(config)
    }

    /// `POST /draw_canvas` with the batch as a JSON array.
    ///
    /// Completes once the device has answered. The device reports drawing
    /// failures as a plain-text body rather than an HTTP error; those are
    /// logged, not returned.
    pub async fn draw_batch(&self, batch: &CanvasBatch) -> Result<()> {
        batch.validate()?;

        let url = self.url("draw_canvas");
        debug!(%url, commands = batch.len(), "Sending canvas batch");

        let body = batch.to_json()?;
        let resp = self
            .http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        let status = resp.status();
        let body = resp.text().await.map_err(|e| connection_error(&url, e))?;

        if !status.is_success() || body.trim() != "OK" {
            warn!(%status, reply = %body.trim(), "Device did not acknowledge canvas batch");
        }
        Ok(())
    }

    /// `POST /upload_image?key=...` with encoded image bytes.
    ///
    /// Returns the device's list of cached image keys, as sent.
    pub async fn upload_image(&self, key: &str, data: Vec<u8>) -> Result<String> {
        let url = self.url("upload_image");
        debug!(%url, key, bytes = data.len(), "Uploading image");

        let resp = self
            .http
            .post(&url)
            .query(&[("key", key)])
            .body(data)
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        let body = resp.text().await.map_err(|e| connection_error(&url, e))?;
        expect_key_list("upload_image", body)
    }

    /// `GET /delete_image?key=...`.
    pub async fn delete_image(&self, key: &str) -> Result<String> {
        let url = self.url("delete_image");
        debug!(%url, key, "Deleting cached image");

        let resp = self
            .http
            .get(&url)
            .query(&[("key", key)])
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        let body = resp.text().await.map_err(|e| connection_error(&url, e))?;
        expect_key_list("delete_image", body)
    }

    /// `POST /draw_image` with encoded PNG, JPEG or GIF bytes.
    ///
    /// The device draws the picture at the top-left corner without caching
    /// it and answers `"<w>x<h> <timings>"`.
    pub async fn draw_image(&self, data: Vec<u8>) -> Result<DrawnImage> {
        let url = self.url("draw_image");
        debug!(%url, bytes = data.len(), "Drawing image");

        let resp = self
            .http
            .post(&url)
            .body(data)
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        let body = resp.text().await.map_err(|e| connection_error(&url, e))?;
        DrawnImage::parse(&body)
    }

    /// `GET /status`, returned as raw JSON.
    pub async fn status(&self) -> Result<serde_json::Value> {
        let url = self.url("status");
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| connection_error(&url, e))?;
        let body = resp.text().await.map_err(|e| connection_error(&url, e))?;
        serde_json::from_str(&body)
            .map_err(|e| ScreenError::Protocol(format!("bad status response ({e}): `{body}`")))
    }
}

#[async_trait]
impl DisplayTransport for DisplayClient {
    async fn fetch_config(&self) -> Result<DisplayConfig> {
        DisplayClient::fetch_config(self).await
    }

    async fn draw_batch(&self, batch: &CanvasBatch) -> Result<()> {
        DisplayClient::draw_batch(self, batch).await
    }
}

/// Reply to `draw_image`: the decoded image size and the device's timing note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawnImage {
    pub width: u32,
    pub height: u32,
    pub detail: String,
}

impl DrawnImage {
    fn parse(body: &str) -> Result<Self> {
        let body = body.trim();
        let (size, detail) = body.split_once(' ').unwrap_or((body, ""));
        let parsed = size
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
        match parsed {
            Some((width, height)) => Ok(Self {
                width,
                height,
                detail: detail.to_string(),
            }),
            None => Err(ScreenError::Protocol(format!("draw_image rejected: {body}"))),
        }
    }
}

fn connection_error(url: &str, err: reqwest::Error) -> ScreenError {
    ScreenError::Connection(format!("{url}: {err}"))
}

/// Image cache endpoints answer with the remaining keys, e.g. `["1", "logo"]`,
/// or with an error message.
fn expect_key_list(endpoint: &str, body: String) -> Result<String> {
    if body.trim_start().starts_with('[') {
        Ok(body)
    } else {
        Err(ScreenError::Protocol(format!("{endpoint} rejected: {}", body.trim())))
    }
}
