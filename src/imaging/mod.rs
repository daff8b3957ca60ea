//! Image loading, transforming and encoding.
//!
//! | Stage | Module | Entry points |
//! |---|---|---|
//! | **Load** | [`loader`] | [`load_uri`], [`load`], [`identify`] |
//! | **Resize** | [`resize`](mod@resize) | [`resize()`], [`resize_keep_source`], [`scale_with_matrix`] |
//! | **Grayscale** | [`grayscale`] | [`to_grayscale`] |
//! | **Encode** | [`encoder`] | [`save_to_file`], [`to_base64`], [`encode`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing how stages behave
//! - **Backend**: [`SourceBackend`] trait + [`SystemBackend`]
//! - **Stages**: loader, resize, grayscale and encoder, each a set of free
//!   functions over [`DecodedImage`]
//!
//! Stages are chained by passing return values along. Transforms that
//! consume their input take [`DecodedImage`] by value, so the source buffer
//! is freed as soon as its replacement exists.

pub mod backend;
mod calculations;
mod decoded;
pub mod encoder;
mod error;
pub mod grayscale;
pub mod loader;
mod params;
pub mod reference;
pub mod resize;
pub mod system_backend;

pub use backend::{Dimensions, HttpResponse, SourceBackend};
pub use calculations::calculate_fit_dimensions;
pub use decoded::DecodedImage;
pub use encoder::{encode, save_to_file, to_base64};
pub use error::ConvertError;
pub use grayscale::{ColorMatrix, GRAYSCALE_MATRIX, apply_matrix, to_grayscale};
pub use loader::{ImageInfo, decode_bytes, identify, load, load_uri, read_source};
pub use params::{CompressFormat, DecodeOptions, Quality};
pub use reference::{DataUri, ImageReference, LocalResource, LocalScheme};
pub use resize::{resize, resize_keep_source, scale_with_matrix};
pub use system_backend::SystemBackend;
