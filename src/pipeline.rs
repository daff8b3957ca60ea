//! End-to-end conversion: load → (resize) → (grayscale) → encode.
//!
//! A [`ConvertRequest`] names the source, the optional transforms and where
//! the result goes. [`convert`] builds the production backend from a
//! [`ConverterConfig`]; [`convert_with_backend`] takes any
//! [`SourceBackend`] so the whole chain can run against a mock.
//!
//! Each stage hands its image to the next by value, so at most two pixel
//! buffers are alive at once.

use crate::config::ConverterConfig;
use crate::imaging::{
    CompressFormat, ConvertError, DecodeOptions, DecodedImage, Dimensions, ImageReference,
    Quality, SourceBackend, SystemBackend, calculate_fit_dimensions, load, resize,
    save_to_file, scale_with_matrix, to_base64, to_grayscale,
};
use serde::Serialize;
use std::path::PathBuf;

/// Which resampler a [`ResizeStep`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaleAlgorithm {
    /// [`resize`]: top-left anchored bilinear.
    #[default]
    Bilinear,
    /// [`scale_with_matrix`]: centred affine scale.
    Centered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeStep {
    pub width: u32,
    pub height: u32,
    pub algorithm: ScaleAlgorithm,
    /// Treat `width x height` as a bounding box and keep the aspect ratio.
    pub preserve_aspect: bool,
}

impl ResizeStep {
    /// Target dimensions for a source of the given size.
    pub fn target_for(&self, source: Dimensions) -> Dimensions {
        if !self.preserve_aspect {
            return Dimensions {
                width: self.width,
                height: self.height,
            };
        }
        let (width, height) = calculate_fit_dimensions(
            (source.width, source.height),
            (self.width, self.height),
        );
        Dimensions { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Write a new file; an existing file is never replaced.
    File(PathBuf),
    /// Return base64 text, encoded at maximum quality.
    Base64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    /// Path or URI, as accepted by [`ImageReference::parse`].
    pub source: String,
    pub resize: Option<ResizeStep>,
    pub grayscale: bool,
    pub format: CompressFormat,
    /// Ignored for [`OutputTarget::Base64`].
    pub quality: Quality,
    pub output: OutputTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertOutput {
    Saved { path: PathBuf, bytes: u64 },
    Base64(String),
}

/// What a conversion did, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertReport {
    pub source_kind: &'static str,
    pub source: Dimensions,
    pub result: Dimensions,
    pub resized: Option<ScaleAlgorithm>,
    pub grayscale: bool,
    pub format: &'static str,
    pub output: ConvertOutput,
}

/// Run a conversion with the filesystem/HTTP backend described by `config`.
pub fn convert(
    request: &ConvertRequest,
    config: &ConverterConfig,
) -> Result<ConvertReport, ConvertError> {
    let backend = SystemBackend::with_settings(config.local.content_root.clone(), config.timeout())?;
    convert_with_backend(&backend, request, &config.decode_options())
}

/// Run a conversion against an arbitrary backend.
///
/// A source that loads no image fails with [`ConvertError::NullImage`].
pub fn convert_with_backend(
    backend: &impl SourceBackend,
    request: &ConvertRequest,
    decode: &DecodeOptions,
) -> Result<ConvertReport, ConvertError> {
    let reference = ImageReference::parse(&request.source)?;
    let mut image = DecodedImage::require(load(backend, &reference, decode)?)?;
    let source = image.dimensions();

    let resized = match request.resize {
        Some(step) => {
            let target = step.target_for(source);
            image = match step.algorithm {
                ScaleAlgorithm::Bilinear => resize(image, target.width, target.height)?,
                ScaleAlgorithm::Centered => {
                    scale_with_matrix(&image, target.width, target.height)?
                }
            };
            Some(step.algorithm)
        }
        None => None,
    };

    if request.grayscale {
        image = to_grayscale(image)?;
    }
    let result = image.dimensions();

    let output = match &request.output {
        OutputTarget::File(path) => {
            let bytes = save_to_file(image, path, request.format, request.quality)?;
            ConvertOutput::Saved {
                path: path.clone(),
                bytes,
            }
        }
        OutputTarget::Base64 => ConvertOutput::Base64(to_base64(&image, request.format)?),
    };

    Ok(ConvertReport {
        source_kind: reference.kind(),
        source,
        result,
        resized,
        grayscale: request.grayscale,
        format: request.format.mime_type(),
        output,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::test_helpers::png_bytes;
    use base64::{Engine as _, engine::general_purpose};

    fn request(source: &str, output: OutputTarget) -> ConvertRequest {
        ConvertRequest {
            source: source.to_string(),
            resize: None,
            grayscale: false,
            format: CompressFormat::Png,
            quality: Quality::default(),
            output,
        }
    }

    #[test]
    fn base64_round_trip_keeps_dimensions() {
        let backend = MockBackend::with_local(vec![Some(png_bytes(30, 20))]);
        let report = convert_with_backend(
            &backend,
            &request("/in.png", OutputTarget::Base64),
            &DecodeOptions::default(),
        )
        .unwrap();

        assert_eq!(report.source_kind, "local");
        assert_eq!(report.source, Dimensions { width: 30, height: 20 });
        assert_eq!(report.result, report.source);
        assert_eq!(report.format, "image/png");
        let ConvertOutput::Base64(text) = report.output else {
            panic!("expected base64 output");
        };
        let bytes = general_purpose::STANDARD.decode(text).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
        assert_eq!(
            backend.get_operations(),
            vec![RecordedOp::OpenLocal("/in.png".to_string())]
        );
    }

    #[test]
    fn resize_then_grayscale_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.jpg");
        let backend = MockBackend::with_local(vec![Some(png_bytes(40, 40))]);
        let mut req = request("/in.png", OutputTarget::File(out.clone()));
        req.format = CompressFormat::Jpeg;
        req.grayscale = true;
        req.resize = Some(ResizeStep {
            width: 10,
            height: 5,
            algorithm: ScaleAlgorithm::Bilinear,
            preserve_aspect: false,
        });

        let report = convert_with_backend(&backend, &req, &DecodeOptions::default()).unwrap();
        assert_eq!(report.result, Dimensions { width: 10, height: 5 });
        assert_eq!(report.resized, Some(ScaleAlgorithm::Bilinear));
        assert!(report.grayscale);
        let ConvertOutput::Saved { path, bytes } = report.output else {
            panic!("expected saved output");
        };
        assert_eq!(path, out);
        assert_eq!(bytes, std::fs::metadata(&out).unwrap().len());
    }

    #[test]
    fn fit_preserves_aspect_with_centered_scale() {
        let backend = MockBackend::with_local(vec![Some(png_bytes(80, 40))]);
        let mut req = request("/in.png", OutputTarget::Base64);
        req.resize = Some(ResizeStep {
            width: 20,
            height: 20,
            algorithm: ScaleAlgorithm::Centered,
            preserve_aspect: true,
        });

        let report = convert_with_backend(&backend, &req, &DecodeOptions::default()).unwrap();
        assert_eq!(report.result, Dimensions { width: 20, height: 10 });
        assert_eq!(report.resized, Some(ScaleAlgorithm::Centered));
    }

    #[test]
    fn missing_image_is_null_image() {
        let backend = MockBackend::new();
        let result = convert_with_backend(
            &backend,
            &request("data:image/gif;base64,R0lGOD", OutputTarget::Base64),
            &DecodeOptions::default(),
        );
        assert!(matches!(result, Err(ConvertError::NullImage)));
    }

    #[test]
    fn loader_errors_pass_through() {
        let result = convert_with_backend(
            &MockBackend::new(),
            &request("   ", OutputTarget::Base64),
            &DecodeOptions::default(),
        );
        assert!(matches!(result, Err(ConvertError::InvalidReference)));
    }

    #[test]
    fn resize_step_target_ignores_aspect_by_default() {
        let step = ResizeStep {
            width: 7,
            height: 70,
            algorithm: ScaleAlgorithm::default(),
            preserve_aspect: false,
        };
        let source = Dimensions { width: 100, height: 100 };
        assert_eq!(step.target_for(source), Dimensions { width: 7, height: 70 });
    }
}
