//! Client side of the wifi-screen HTTP drawing API.
//!
//! [`DisplayClient`] speaks to a real device; [`DisplaySession`] sequences
//! a run against anything implementing [`DisplayTransport`].

use async_trait::async_trait;

use wifi_screen_core::{CanvasBatch, DisplayConfig, Result};

pub mod client;
pub mod session;

pub use client::{DisplayClient, DrawnImage};
pub use session::{DisplaySession, BATCH_PAUSE};

/// The two device operations a drawing session depends on.
#[async_trait]
pub trait DisplayTransport: Send + Sync {
    /// Read the display resolution.
    async fn fetch_config(&self) -> Result<DisplayConfig>;

    /// Send one batch and wait for the write to complete.
    async fn draw_batch(&self, batch: &CanvasBatch) -> Result<()>;
}
