//! Display configuration as reported by `GET /display_config`.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScreenError};

/// Resolution of the device after its mounted orientation is applied.
///
/// The device reports many more fields (panel type, SPI mode, color
/// adjustments, ...); only the rotated size matters to a drawing client and
/// everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    pub rotated_width: u32,
    pub rotated_height: u32,
}

impl DisplayConfig {
    pub fn new(rotated_width: u32, rotated_height: u32) -> Self {
        Self {
            rotated_width,
            rotated_height,
        }
    }

    /// Parse a `display_config` response body.
    ///
    /// An unconfigured device answers with a plain-text message instead of
    /// JSON, which surfaces here as a protocol error carrying that text.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| {
            ScreenError::Protocol(format!("bad display_config response ({e}): `{}`", snippet(body)))
        })
    }
}

fn snippet(body: &str) -> &str {
    const MAX: usize = 120;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
