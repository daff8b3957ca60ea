//! Image references: where the pixels come from.
//!
//! A reference is parsed once from a URI string into one of four shapes,
//! and the loader dispatches on it with an exhaustive `match`:
//!
//! | Input | Variant |
//! |---|---|
//! | `photo.jpg`, `/tmp/a.png` | [`ImageReference::Local`] (bare path) |
//! | `file:///tmp/a.png` | [`ImageReference::Local`] (file scheme) |
//! | `content://media/images/7` | [`ImageReference::Local`] (content scheme) |
//! | `data:image/png;base64,iVBOR...` | [`ImageReference::Data`] |
//! | `https://example.com/a.jpg` | [`ImageReference::Remote`] |
//! | anything else with a scheme | [`ImageReference::Unsupported`] |

use super::error::ConvertError;
use super::params::CompressFormat;
use percent_encoding::percent_decode_str;
use std::fmt;

/// Which local resolver path a [`LocalResource`] goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalScheme {
    /// No scheme: a plain filesystem path.
    Bare,
    File,
    Content,
}

/// A resource opened through the local resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalResource {
    pub scheme: LocalScheme,
    /// Filesystem path for `Bare`/`File`, `authority/path` for `Content`.
    pub location: String,
}

/// Inline payload of a `data:` URI, percent-decoded and split at the first
/// comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Lower-cased descriptor before the comma, e.g. `image/png;base64`.
    pub media_type: String,
    /// Base64 text after the comma.
    pub payload: String,
}

impl DataUri {
    /// The image format the descriptor announces, if it is one we decode.
    pub fn format(&self) -> Option<CompressFormat> {
        CompressFormat::from_media_type(&self.media_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageReference {
    Local(LocalResource),
    /// `None` when the data URI has no comma separating descriptor and payload.
    Data(Option<DataUri>),
    /// URL text kept verbatim; it is validated when loaded.
    Remote(String),
    Unsupported(String),
}

impl ImageReference {
    /// Parse a URI string. Blank input is rejected.
    pub fn parse(uri: &str) -> Result<Self, ConvertError> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(ConvertError::InvalidReference);
        }

        let Some((scheme, rest)) = split_scheme(uri) else {
            return Ok(Self::Local(LocalResource {
                scheme: LocalScheme::Bare,
                location: uri.to_string(),
            }));
        };

        let reference = match scheme.as_str() {
            "file" => Self::Local(LocalResource {
                scheme: LocalScheme::File,
                location: strip_authority(rest).to_string(),
            }),
            "content" => Self::Local(LocalResource {
                scheme: LocalScheme::Content,
                location: rest.trim_start_matches('/').to_string(),
            }),
            "data" => Self::Data(parse_data(rest)),
            "http" | "https" => Self::Remote(uri.to_string()),
            _ => Self::Unsupported(scheme),
        };
        Ok(reference)
    }

    /// Short label used in logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Data(_) => "data",
            Self::Remote(_) => "remote",
            Self::Unsupported(_) => "unsupported",
        }
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(res) => match res.scheme {
                LocalScheme::Bare => write!(f, "{}", res.location),
                LocalScheme::File => write!(f, "file://{}", res.location),
                LocalScheme::Content => write!(f, "content://{}", res.location),
            },
            Self::Data(Some(data)) => {
                write!(f, "data:{},<{} chars>", data.media_type, data.payload.len())
            }
            Self::Data(None) => write!(f, "data:<malformed>"),
            Self::Remote(url) => write!(f, "{}", redact_url(url)),
            Self::Unsupported(scheme) => write!(f, "{scheme}:<unsupported>"),
        }
    }
}

/// Split `scheme:rest`. The scheme must start with a letter and contain only
/// letters, digits, `+`, `-` or `.`, and must precede any `/`, `?` or `#`.
fn split_scheme(uri: &str) -> Option<(String, &str)> {
    let colon = uri.find(':')?;
    let scheme = &uri[..colon];
    let mut chars = scheme.chars();
    let first = chars.next()?;
    if !first.is_ascii_alphabetic()
        || !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    {
        return None;
    }
    Some((scheme.to_ascii_lowercase(), &uri[colon + 1..]))
}

/// `//host/path` → `/path`; `/path` stays as is.
fn strip_authority(rest: &str) -> &str {
    match rest.strip_prefix("//") {
        Some(after) => after.find('/').map_or("", |slash| &after[slash..]),
        None => rest,
    }
}

fn parse_data(rest: &str) -> Option<DataUri> {
    let decoded = percent_decode_str(rest).decode_utf8_lossy();
    let (descriptor, payload) = decoded.split_once(',')?;
    Some(DataUri {
        media_type: descriptor.replace('\\', "/").to_lowercase(),
        payload: payload.to_string(),
    })
}

/// Drop query and fragment from a URL before it reaches logs.
pub(crate) fn redact_url(url: &str) -> String {
    let Ok(parsed) = reqwest::Url::parse(url) else {
        return "<invalid-url>".to_string();
    };
    let host = parsed.host_str().unwrap_or("<unknown-host>");
    let port = parsed.port().map(|p| format!(":{p}")).unwrap_or_default();
    format!("{}://{}{}{}", parsed.scheme(), host, port, parsed.path())
}
