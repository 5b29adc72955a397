//! Core types, config, and errors for wifi-screen.

pub mod canvas;
pub mod config;
pub mod display;
pub mod error;

pub use canvas::{CanvasBatch, CanvasCommand, Color};
pub use display::DisplayConfig;
pub use error::{Result, ScreenError};
