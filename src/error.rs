//! Error types for Markcard
//!
//! This module defines all custom error types used throughout the crate.
//! Error types are organized by category for clear error handling and
//! user-friendly messages.
//!
//! Markdown parse failures are intentionally absent: the parser degrades
//! to a plain-paragraph fallback instead of surfacing an error.

use thiserror::Error;

/// Main error type encompassing all error categories
#[derive(Error, Debug)]
pub enum CardError {
    /// Drawing surface errors
    #[error(transparent)]
    Surface(#[from] SurfaceError),

    /// Theme lookup errors
    #[error(transparent)]
    Theme(#[from] ThemeError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic unexpected error
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Drawing surface related errors
///
/// A surface error is fatal for the render pass that hit it; no partial
/// surface state is assumed valid afterwards.
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The host never handed over a usable surface
    #[error("Drawing surface is not available: {reason}")]
    Unavailable { reason: String },

    /// The surface reported a size the renderer cannot work with
    #[error("Invalid surface size: {width}x{height}")]
    InvalidSize { width: f32, height: f32 },

    /// The reported pixel density is unusable
    #[error("Invalid pixel ratio: {ratio}")]
    InvalidPixelRatio { ratio: f32 },
}

/// Theme registry errors
#[derive(Error, Debug)]
pub enum ThemeError {
    /// Requested theme name is not registered
    #[error("Unknown theme '{name}'. Known themes: {known}")]
    UnknownTheme { name: String, known: String },
}

/// Configuration related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error loading configuration file
    #[error("Could not load configuration: {0}")]
    LoadError(String),

    /// Error parsing configuration
    #[error("Invalid configuration format: {0}")]
    ParseError(String),

    /// Error saving configuration
    #[error("Could not save configuration: {0}")]
    SaveError(String),

    /// Configuration directory error
    #[error("Could not access configuration directory")]
    DirectoryError,
}

/// Result type alias for operations that can fail with CardError
pub type CardResult<T> = Result<T, CardError>;

/// Result type alias for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl SurfaceError {
    /// Create a user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            SurfaceError::Unavailable { .. } => {
                "The drawing surface is not ready. Try rendering again.".to_string()
            }
            SurfaceError::InvalidSize { .. } => {
                "The drawing surface reported an unusable size.".to_string()
            }
            SurfaceError::InvalidPixelRatio { .. } => {
                "The display reported an unusable pixel density.".to_string()
            }
        }
    }
}
