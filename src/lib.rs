//! # Image Converter
//!
//! Load an image from a path, a `content://` or `file://` URI, an inline
//! `data:` URI or an HTTP(S) URL; optionally resize it and convert it to
//! grayscale; then re-encode it as JPEG or PNG into a new file or a base64
//! string.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! Load        reference  →  DecodedImage      (file / data URI / HTTP)
//! Resize      image      →  image             (bilinear or centred matrix)
//! Grayscale   image      →  image             (fixed 4x5 luma matrix)
//! Encode      image      →  file | base64     (JPEG / PNG)
//! ```
//!
//! Every stage is a free function; stages are chained by passing return
//! values along. Transforms that consume their input take the image by
//! value, so the previous buffer is freed as soon as the next one exists.
//! Nothing is shared between calls and nothing is retried.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The stages: loader, resizers, grayscale matrix, encoder, and the [`imaging::SourceBackend`] seam |
//! | [`pipeline`] | Chains the stages for one [`pipeline::ConvertRequest`] |
//! | [`config`] | `config.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Absent Is Not an Error
//!
//! The loader returns `Result<Option<DecodedImage>, _>`. `Ok(None)` covers
//! the cases where the source exists but holds nothing we can decode: a
//! `data:` URI announcing GIF, a scheme we do not load, corrupt bytes. Only
//! callers that need pixels (the [`pipeline`]) turn that into
//! [`imaging::ConvertError::NullImage`].
//!
//! ## Out of Memory Is Fatal
//!
//! Destination buffers are reserved with `try_reserve_exact` and decoder
//! allocations are bounded by `image::Limits`. Either failing surfaces as
//! [`imaging::ConvertError::OutOfMemory`], which is never retried at a
//! smaller size.
//!
//! ## Two Resizers
//!
//! [`imaging::resize()`] and [`imaging::scale_with_matrix`] implement
//! different algorithms and both stay. See [`imaging::resize`](mod@imaging::resize)
//! for how their edges differ.

pub mod config;
pub mod imaging;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
