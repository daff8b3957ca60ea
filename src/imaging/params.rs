//! Parameter types for loading and encoding.
//!
//! These describe *how* a stage should behave, separately from the pixel
//! data flowing through it.
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1-100, default 90), clamped on construction.
//! - [`CompressFormat`]: output codec, JPEG or PNG.
//! - [`DecodeOptions`]: bounds-only mode and decoder memory limits.

use image::ImageFormat;
use serde::{Deserialize, Serialize};

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    /// Fixed quality used for base64 export.
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Quality from a `0.0..=1.0` fraction.
    ///
    /// The fraction is scaled to `0..=100` by truncation, then clamped to the
    /// range the JPEG encoder accepts. NaN and negatives end up at 1.
    pub fn from_fraction(fraction: f32) -> Self {
        Self::new((fraction * 100.0) as u32)
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Compressed output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressFormat {
    #[serde(alias = "jpg")]
    Jpeg,
    Png,
}

impl CompressFormat {
    pub fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Match a lower-cased data URI media descriptor such as
    /// `image/png;base64`. Only the two supported prefixes are recognised.
    pub fn from_media_type(descriptor: &str) -> Option<Self> {
        if descriptor.starts_with("image/jpeg") {
            Some(Self::Jpeg)
        } else if descriptor.starts_with("image/png") {
            Some(Self::Png)
        } else {
            None
        }
    }
}

impl std::str::FromStr for CompressFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(format!("unknown format '{other}' (expected jpeg or png)")),
        }
    }
}

/// How the loader decodes what it reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Read only the header of local and data URI sources; the load then
    /// yields no pixels.
    pub bounds_only: bool,
    /// Upper bound on decoder allocations, in bytes.
    pub max_alloc: Option<u64>,
}

impl DecodeOptions {
    pub(crate) fn limits(&self) -> image::Limits {
        let mut limits = image::Limits::default();
        limits.max_alloc = self.max_alloc;
        limits
    }
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            bounds_only: false,
            max_alloc: Some(512 * 1024 * 1024),
        }
    }
}
