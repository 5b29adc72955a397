//! The greeting run: read the display size, draw text, pause, draw shapes.

use std::time::Duration;

use tracing::info;

use wifi_screen_core::canvas::{Rectangle, Text};
use wifi_screen_core::{CanvasBatch, DisplayConfig, Result};

use crate::DisplayTransport;

/// Delay between the text batch and the shapes batch.
pub const BATCH_PAUSE: Duration = Duration::from_millis(2000);

const BACKGROUND: &str = "black";
const GREETING: &str = "Hello!你好世界！";

/// Black background with a white greeting in the top-left corner.
pub fn greeting_batch(display: &DisplayConfig) -> CanvasBatch {
    CanvasBatch::cleared(display, BACKGROUND).with(Text::new(10, 15, GREETING, 20, "white"))
}

/// Black background with filled, outlined, and outline-only squares.
pub fn shapes_batch(display: &DisplayConfig) -> CanvasBatch {
    CanvasBatch::cleared(display, BACKGROUND)
        .with(Rectangle::new(10, 20, 60, 60).fill("red").stroke("blue", 6))
        .with(Rectangle::new(80, 20, 60, 60).stroke("blue", 6))
        .with(Rectangle::new(10, 90, 60, 60).fill("red"))
}

/// Drives one run against a device: config read, two draws, fixed pacing.
///
/// Every step waits for the previous one; the first error ends the run.
pub struct DisplaySession<T> {
    transport: T,
}

impl<T: DisplayTransport> DisplaySession<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run the fixed sequence and return the display config it used.
    pub async fn run(&self) -> Result<DisplayConfig> {
        info!("Fetching display config");
        let screen = self.transport.fetch_config().await?;
        info!(
            width = screen.rotated_width,
            height = screen.rotated_height,
            "Display config"
        );

        info!("Drawing text");
        self.transport.draw_batch(&greeting_batch(&screen)).await?;

        wait(BATCH_PAUSE).await;

        info!("Drawing shapes");
        self.transport.draw_batch(&shapes_batch(&screen)).await?;

        Ok(screen)
    }
}

/// Suspend the current task without blocking the runtime.
pub async fn wait(duration: Duration) {
    tokio::time::sleep(duration).await;
}
