//! Error types and handling infrastructure for raster to SVG conversion

use anyhow::Error;
use std::path::PathBuf;

/// Core error types for the conversion process
#[derive(Debug, thiserror::Error)]
pub enum ConversionErrorKind {
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Engine fault: {message}")]
    EngineFault { message: String },

    #[error("Engine of session {session} accessed after release")]
    UseAfterRelease { session: u64 },

    #[error("No source raster loaded for surface '{canvas_id}'")]
    NoSourceLoaded { canvas_id: String },

    #[error("Cannot {action} session {session} in state {state}")]
    InvalidState {
        session: u64,
        state: String,
        action: String,
    },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Image decode error: {message}")]
    ImageDecode {
        message: String,
        path: Option<PathBuf>,
    },

    #[error("Export failed: {message}")]
    Export { message: String, path: PathBuf },
}

impl ConversionErrorKind {
    pub fn configuration(message: String) -> Self {
        Self::Configuration { message }
    }

    pub fn engine_fault(message: String) -> Self {
        Self::EngineFault { message }
    }

    pub fn io(message: String, path: Option<PathBuf>) -> Self {
        Self::Io { message, path }
    }

    pub fn export(message: String, path: PathBuf) -> Self {
        Self::Export { message, path }
    }
}

/// Main error type for conversion operations
#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("{kind}")]
    Conversion {
        kind: ConversionErrorKind,
        source: Option<anyhow::Error>,
    },

    #[error(transparent)]
    Wire(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] Error),
}

impl ConversionError {
    pub fn conversion(kind: ConversionErrorKind) -> Self {
        Self::Conversion { kind, source: None }
    }

    pub fn conversion_with_source(kind: ConversionErrorKind, source: anyhow::Error) -> Self {
        Self::Conversion {
            kind,
            source: Some(source),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::conversion(ConversionErrorKind::configuration(message.into()))
    }

    pub fn engine_fault(message: impl Into<String>) -> Self {
        Self::conversion(ConversionErrorKind::engine_fault(message.into()))
    }

    /// The kind of a conversion error, if this is one
    pub fn kind(&self) -> Option<&ConversionErrorKind> {
        match self {
            Self::Conversion { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Whether the error originated inside the conversion engine
    pub fn is_engine_fault(&self) -> bool {
        matches!(self.kind(), Some(ConversionErrorKind::EngineFault { .. }))
    }

    /// Create a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            Self::Conversion { kind, .. } => match kind {
                ConversionErrorKind::Io {
                    message,
                    path: Some(path),
                } => format!("{} ({})", message, path.display()),
                ConversionErrorKind::ImageDecode {
                    message,
                    path: Some(path),
                } => format!("Could not read image {}: {}", path.display(), message),
                ConversionErrorKind::NoSourceLoaded { .. } => {
                    "No image loaded. Provide an input raster first".to_string()
                }
                ConversionErrorKind::Export { message, path } => {
                    format!("Could not write {}: {}", path.display(), message)
                }
                ConversionErrorKind::EngineFault { message } => {
                    format!("Conversion engine failed: {}", message)
                }
                _ => self.to_string(),
            },
            Self::Wire(err) => format!("Malformed conversion config: {}", err),
            Self::Other(err) => format!("Unexpected error: {}", err),
        }
    }
}

/// Result type for conversion operations
pub type ConversionResult<T> = Result<T, ConversionError>;
