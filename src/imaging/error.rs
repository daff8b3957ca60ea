//! Error type shared by every imaging stage.
//!
//! A loader returning `Ok(None)` is *not* an error: it means the source had
//! no pixels to give (unsupported scheme, non-image MIME type, bounds-only
//! decode). Everything here is a real failure and is returned to the caller
//! as soon as it happens. Nothing is retried.

use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("image reference must not be empty")]
    InvalidReference,
    #[error("Unable to load image into Bitmap: {0}")]
    NotFound(String),
    #[error("Unable to load image from a malformed URL: {0}")]
    MalformedUrl(String),
    #[error("Unable to download image: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Unexpected code {0}")]
    UnexpectedStatus(u16),
    #[error("image must not be null")]
    NullImage,
    #[error("image file already exists: {}", .0.display())]
    AlreadyExists(PathBuf),
    /// Allocation failure or decoder memory limit. Never recovered from.
    #[error("out of memory: {0}")]
    OutOfMemory(String),
    #[error("invalid target dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid base64 payload: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
    #[error("encoding failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    /// Wrap an HTTP client failure.
    pub fn transport(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Transport(err.into())
    }

    /// True for the failures a caller must not try to recover from.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::OutOfMemory(_))
    }
}

impl From<TryReserveError> for ConvertError {
    fn from(err: TryReserveError) -> Self {
        Self::OutOfMemory(err.to_string())
    }
}

/// Map an `image` crate failure, keeping limit violations fatal.
pub(crate) fn from_image_error(err: image::ImageError) -> ConvertError {
    match err {
        image::ImageError::Limits(limit) => ConvertError::OutOfMemory(limit.to_string()),
        image::ImageError::IoError(io) => ConvertError::Io(io),
        other => ConvertError::Encode(other.to_string()),
    }
}
