//! Source loader: image reference in, decoded pixels out.
//!
//! Loading happens in two steps. [`read_source`] turns a reference into raw
//! bytes through the [`SourceBackend`], and [`decode_bytes`] turns bytes into
//! a [`DecodedImage`]. Either step may legitimately produce nothing:
//!
//! - the resolver has no stream for a local resource;
//! - a data URI announces something other than JPEG or PNG, or has no comma;
//! - the scheme is not one we load;
//! - the decoder cannot make pixels out of the bytes, or only the bounds
//!   were requested.
//!
//! Those cases are `Ok(None)`. Real failures (missing file, bad URL,
//! non-2xx status, transport error, memory limits) are errors.

use super::backend::{Dimensions, SourceBackend};
use super::decoded::DecodedImage;
use super::error::{ConvertError, from_image_error};
use super::params::DecodeOptions;
use super::reference::{DataUri, ImageReference, redact_url};
use base64::Engine as _;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use image::{ImageFormat, ImageReader};
use std::io::{Cursor, Read};

/// Standard alphabet; trailing `=` padding is optional on decode.
const DATA_PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Header information about an image, without its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageInfo {
    pub dimensions: Dimensions,
    pub format: Option<ImageFormat>,
}

/// Load the image a URI points at.
///
/// `None` or a blank URI fails with [`ConvertError::InvalidReference`].
pub fn load_uri(
    backend: &impl SourceBackend,
    uri: Option<&str>,
    options: &DecodeOptions,
) -> Result<Option<DecodedImage>, ConvertError> {
    let uri = uri.ok_or(ConvertError::InvalidReference)?;
    let reference = ImageReference::parse(uri)?;
    load(backend, &reference, options)
}

/// Load and decode the image behind `reference`.
pub fn load(
    backend: &impl SourceBackend,
    reference: &ImageReference,
    options: &DecodeOptions,
) -> Result<Option<DecodedImage>, ConvertError> {
    log::info!("loading {} image from {}", reference.kind(), reference);

    let Some(bytes) = read_source(backend, reference)? else {
        log::info!("{reference} yielded no image data");
        return Ok(None);
    };

    // The bounds-only mode belongs to the local decoders; remote bodies are
    // always decoded in full.
    let honours_bounds = matches!(reference, ImageReference::Local(_) | ImageReference::Data(_));
    if options.bounds_only && honours_bounds {
        if let Some(info) = read_header(&bytes)? {
            log::debug!(
                "bounds-only decode: {}x{}",
                info.dimensions.width,
                info.dimensions.height
            );
        }
        return Ok(None);
    }

    let decoded = decode_bytes(&bytes, options)?;
    if let Some(image) = &decoded {
        log::info!("decoded {}x{} image", image.width(), image.height());
    }
    Ok(decoded)
}

/// Read only the header of the image behind `reference`.
pub fn identify(
    backend: &impl SourceBackend,
    reference: &ImageReference,
) -> Result<Option<ImageInfo>, ConvertError> {
    match read_source(backend, reference)? {
        Some(bytes) => read_header(&bytes),
        None => Ok(None),
    }
}

/// Resolve a reference to the raw encoded bytes it names.
pub fn read_source(
    backend: &impl SourceBackend,
    reference: &ImageReference,
) -> Result<Option<Vec<u8>>, ConvertError> {
    match reference {
        ImageReference::Local(resource) => {
            let Some(mut reader) = backend.open_local(resource)? else {
                return Ok(None);
            };
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            Ok(Some(bytes))
        }
        ImageReference::Data(Some(data)) => decode_data_payload(data),
        ImageReference::Data(None) => Ok(None),
        ImageReference::Remote(url) => fetch_remote(backend, url).map(Some),
        ImageReference::Unsupported(scheme) => {
            log::debug!("scheme '{scheme}' is not loadable");
            Ok(None)
        }
    }
}

fn decode_data_payload(data: &DataUri) -> Result<Option<Vec<u8>>, ConvertError> {
    if data.format().is_none() {
        log::debug!("data URI media type '{}' is not jpeg/png", data.media_type);
        return Ok(None);
    }
    // Line breaks and other whitespace are common in pasted payloads.
    let compact: String = data
        .payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = DATA_PAYLOAD_ENGINE.decode(compact)?;
    Ok(Some(bytes))
}

fn fetch_remote(backend: &impl SourceBackend, url: &str) -> Result<Vec<u8>, ConvertError> {
    let parsed = reqwest::Url::parse(url)
        .map_err(|e| ConvertError::MalformedUrl(format!("{url}: {e}")))?;

    log::debug!("GET {}", redact_url(url));
    let response = backend.fetch(&parsed)?;
    if !response.is_success() {
        return Err(ConvertError::UnexpectedStatus(response.status));
    }
    Ok(response.body)
}

/// Decode encoded bytes into pixels.
///
/// Unrecognised or corrupt data yields `Ok(None)`; decoder memory limits
/// are [`ConvertError::OutOfMemory`].
pub fn decode_bytes(
    bytes: &[u8],
    options: &DecodeOptions,
) -> Result<Option<DecodedImage>, ConvertError> {
    let mut reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let Some(format) = reader.format() else {
        log::warn!("unrecognised image data ({} bytes)", bytes.len());
        return Ok(None);
    };
    reader.limits(options.limits());

    match reader.decode() {
        Ok(image) => DecodedImage::from_dynamic(image, Some(format)).map(Some),
        Err(err @ image::ImageError::Limits(_)) => Err(from_image_error(err)),
        Err(err) => {
            log::warn!("failed to decode {format:?} data: {err}");
            Ok(None)
        }
    }
}

fn read_header(bytes: &[u8]) -> Result<Option<ImageInfo>, ConvertError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    let format = reader.format();
    match reader.into_dimensions() {
        Ok((width, height)) => Ok(Some(ImageInfo {
            dimensions: Dimensions { width, height },
            format,
        })),
        Err(err) => {
            log::warn!("could not read image header: {err}");
            Ok(None)
        }
    }
}
