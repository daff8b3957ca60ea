//! Filesystem + HTTP backend used in production.
//!
//! | Resource | Resolution |
//! |---|---|
//! | bare path, `file:` | `std::fs::File::open` |
//! | `content:` | `<content_root>/<authority>/<path>`; no stream when no root is set |
//! | `http:`, `https:` | `reqwest::blocking::Client` GET |
//!
//! The HTTP client has no timeout unless one is configured: a hung request
//! blocks the calling thread.

use super::backend::{HttpResponse, SourceBackend};
use super::error::ConvertError;
use super::reference::{LocalResource, LocalScheme};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct SystemBackend {
    client: reqwest::blocking::Client,
    content_root: Option<PathBuf>,
}

impl SystemBackend {
    /// Backend with no content root and no request timeout.
    pub fn new() -> Result<Self, ConvertError> {
        Self::with_settings(None, None)
    }

    pub fn with_settings(
        content_root: Option<PathBuf>,
        timeout: Option<Duration>,
    ) -> Result<Self, ConvertError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConvertError::transport)?;
        Ok(Self {
            client,
            content_root,
        })
    }

    pub fn content_root(&self) -> Option<&Path> {
        self.content_root.as_deref()
    }
}

fn open_file(path: &Path) -> Result<Box<dyn Read>, ConvertError> {
    let file = File::open(path)
        .map_err(|e| ConvertError::NotFound(format!("{}: {}", path.display(), e)))?;
    Ok(Box::new(BufReader::new(file)))
}

impl SourceBackend for SystemBackend {
    fn open_local(
        &self,
        resource: &LocalResource,
    ) -> Result<Option<Box<dyn Read + '_>>, ConvertError> {
        match resource.scheme {
            LocalScheme::Bare | LocalScheme::File => {
                Ok(Some(open_file(Path::new(&resource.location))?))
            }
            LocalScheme::Content => match &self.content_root {
                Some(root) => Ok(Some(open_file(&root.join(&resource.location))?)),
                None => {
                    log::debug!(
                        "no content root configured, content://{} has no stream",
                        resource.location
                    );
                    Ok(None)
                }
            },
        }
    }

    fn fetch(&self, url: &reqwest::Url) -> Result<HttpResponse, ConvertError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(ConvertError::transport)?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(HttpResponse {
                status,
                body: Vec::new(),
            });
        }

        let body = response.bytes().map_err(ConvertError::transport)?;
        log::debug!("downloaded {} bytes (HTTP {})", body.len(), status);
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::write_png;

    fn resource(scheme: LocalScheme, location: &str) -> LocalResource {
        LocalResource {
            scheme,
            location: location.to_string(),
        }
    }

    #[test]
    fn opens_bare_and_file_paths() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("a.png");
        write_png(&path, 4, 4);
        let location = path.to_string_lossy().to_string();

        let backend = SystemBackend::new().unwrap();
        for scheme in [LocalScheme::Bare, LocalScheme::File] {
            let mut reader = backend
                .open_local(&resource(scheme, &location))
                .unwrap()
                .unwrap();
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes).unwrap();
            assert_eq!(bytes, std::fs::read(&path).unwrap());
        }
    }

    #[test]
    fn missing_file_is_not_found() {
        let backend = SystemBackend::new().unwrap();
        let result = backend.open_local(&resource(LocalScheme::Bare, "/nonexistent/a.png"));
        assert!(matches!(result, Err(ConvertError::NotFound(msg)) if msg.contains("/nonexistent/a.png")));
    }

    #[test]
    fn content_without_root_has_no_stream() {
        let backend = SystemBackend::new().unwrap();
        let result = backend
            .open_local(&resource(LocalScheme::Content, "media/images/1"))
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn content_resolves_under_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("media/images")).unwrap();
        write_png(&tmp.path().join("media/images/1"), 2, 2);

        let backend = SystemBackend::with_settings(Some(tmp.path().to_path_buf()), None).unwrap();
        assert_eq!(backend.content_root(), Some(tmp.path()));
        let result = backend
            .open_local(&resource(LocalScheme::Content, "media/images/1"))
            .unwrap();
        assert!(result.is_some());
    }
}
