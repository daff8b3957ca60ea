//! Source backend trait and shared types.
//!
//! The [`SourceBackend`] trait is the loader's view of the outside world:
//! a resolver that opens local resources and an HTTP client that fetches
//! remote ones. Decoding, base64 handling and status checks stay in the
//! [`loader`](super::loader) so every backend behaves the same.
//!
//! The production implementation is
//! [`SystemBackend`](super::system_backend::SystemBackend), backed by the
//! filesystem and a blocking `reqwest` client.

use super::error::ConvertError;
use super::reference::LocalResource;
use serde::Serialize;
use std::io::Read;

/// Width and height of an image, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A completed HTTP exchange. `body` is only read for 2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the collaborators the loader needs.
pub trait SourceBackend {
    /// Open a local resource for reading.
    ///
    /// `Ok(None)` means the resolver has no stream for this resource; the
    /// load then yields no image rather than failing. A resource that
    /// cannot be opened is [`ConvertError::NotFound`].
    fn open_local(&self, resource: &LocalResource)
    -> Result<Option<Box<dyn Read + '_>>, ConvertError>;

    /// Perform a blocking GET. Transport failures are
    /// [`ConvertError::Transport`]; HTTP statuses are returned, not judged.
    fn fetch(&self, url: &reqwest::Url) -> Result<HttpResponse, ConvertError>;
}
