//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Convert
//!
//! ```text
//! photo.png (local)
//!     Source: 4000x3000
//!     Resize: 800x600 (bilinear)
//!     Grayscale
//!     Saved: out.jpg (48213 bytes, image/jpeg)
//! ```
//!
//! With `--base64` the last line reads `Base64: 64412 chars (image/png)` and
//! the encoded text itself goes to stdout on its own, so it can be piped.
//! The summary then goes to stderr.
//!
//! With `--json` the whole [`ConvertReport`] is printed as one JSON object
//! on stdout, base64 payload included.
//!
//! ## Identify
//!
//! ```text
//! photo.png
//!     Dimensions: 4000x3000
//!     Format: Jpeg
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that does the writing. Format
//! functions are pure: no I/O, no side effects.

use crate::imaging::{Dimensions, ImageInfo};
use crate::pipeline::{ConvertOutput, ConvertReport, ScaleAlgorithm};

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims(d: Dimensions) -> String {
    format!("{}x{}", d.width, d.height)
}

fn algorithm_name(algorithm: ScaleAlgorithm) -> &'static str {
    match algorithm {
        ScaleAlgorithm::Bilinear => "bilinear",
        ScaleAlgorithm::Centered => "centered",
    }
}

// ============================================================================
// Convert
// ============================================================================

/// Format the summary of a finished conversion.
///
/// The base64 payload is not part of the summary.
pub fn format_convert_report(source: &str, report: &ConvertReport) -> Vec<String> {
    let mut lines = vec![format!("{} ({})", source, report.source_kind)];
    lines.push(format!("{}Source: {}", indent(1), dims(report.source)));

    if let Some(algorithm) = report.resized {
        lines.push(format!(
            "{}Resize: {} ({})",
            indent(1),
            dims(report.result),
            algorithm_name(algorithm)
        ));
    }
    if report.grayscale {
        lines.push(format!("{}Grayscale", indent(1)));
    }

    match &report.output {
        ConvertOutput::Saved { path, bytes } => lines.push(format!(
            "{}Saved: {} ({} bytes, {})",
            indent(1),
            path.display(),
            bytes,
            report.format
        )),
        ConvertOutput::Base64(text) => lines.push(format!(
            "{}Base64: {} chars ({})",
            indent(1),
            text.len(),
            report.format
        )),
    }
    lines
}

/// Print a conversion summary. Base64 text goes to stdout alone, with the
/// summary moved to stderr.
pub fn print_convert_report(source: &str, report: &ConvertReport) {
    let lines = format_convert_report(source, report);
    match &report.output {
        ConvertOutput::Base64(text) => {
            for line in lines {
                eprintln!("{}", line);
            }
            println!("{}", text);
        }
        ConvertOutput::Saved { .. } => {
            for line in lines {
                println!("{}", line);
            }
        }
    }
}

/// Serialize a conversion report as pretty-printed JSON.
pub fn format_convert_json(report: &ConvertReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

// ============================================================================
// Identify
// ============================================================================

/// Format header information for one source.
pub fn format_identify(source: &str, info: Option<&ImageInfo>) -> Vec<String> {
    let mut lines = vec![source.to_string()];
    match info {
        Some(info) => {
            lines.push(format!("{}Dimensions: {}", indent(1), dims(info.dimensions)));
            let format = info
                .format
                .map(|f| format!("{f:?}"))
                .unwrap_or_else(|| "unknown".to_string());
            lines.push(format!("{}Format: {}", indent(1), format));
        }
        None => lines.push(format!("{}No image", indent(1))),
    }
    lines
}

pub fn print_identify(source: &str, info: Option<&ImageInfo>) {
    for line in format_identify(source, info) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn report(output: ConvertOutput) -> ConvertReport {
        ConvertReport {
            source_kind: "remote",
            source: Dimensions {
                width: 4000,
                height: 3000,
            },
            result: Dimensions {
                width: 800,
                height: 600,
            },
            resized: Some(ScaleAlgorithm::Bilinear),
            grayscale: true,
            format: "image/jpeg",
            output,
        }
    }

    #[test]
    fn convert_report_saved() {
        let lines = format_convert_report(
            "https://example.com/a.png",
            &report(ConvertOutput::Saved {
                path: PathBuf::from("out.jpg"),
                bytes: 48213,
            }),
        );
        assert_eq!(
            lines,
            vec![
                "https://example.com/a.png (remote)",
                "    Source: 4000x3000",
                "    Resize: 800x600 (bilinear)",
                "    Grayscale",
                "    Saved: out.jpg (48213 bytes, image/jpeg)",
            ]
        );
    }

    #[test]
    fn convert_report_base64_omits_payload() {
        let mut r = report(ConvertOutput::Base64("QUJD".to_string()));
        r.resized = None;
        r.grayscale = false;
        let lines = format_convert_report("in.png", &r);
        assert_eq!(
            lines,
            vec![
                "in.png (remote)",
                "    Source: 4000x3000",
                "    Base64: 4 chars (image/jpeg)",
            ]
        );
    }

    #[test]
    fn convert_report_json_fields() {
        let text = format_convert_json(&report(ConvertOutput::Saved {
            path: PathBuf::from("out.jpg"),
            bytes: 48213,
        }))
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["source_kind"], "remote");
        assert_eq!(value["source"]["width"], 4000);
        assert_eq!(value["result"]["height"], 600);
        assert_eq!(value["resized"], "bilinear");
        assert_eq!(value["grayscale"], true);
        assert_eq!(value["format"], "image/jpeg");
        assert_eq!(value["output"]["saved"]["path"], "out.jpg");
        assert_eq!(value["output"]["saved"]["bytes"], 48213);
    }

    #[test]
    fn convert_report_json_base64_carries_payload() {
        let mut r = report(ConvertOutput::Base64("QUJD".to_string()));
        r.resized = None;
        let value: serde_json::Value =
            serde_json::from_str(&format_convert_json(&r).unwrap()).unwrap();
        assert_eq!(value["output"]["base64"], "QUJD");
        assert!(value["resized"].is_null());
    }

    #[test]
    fn identify_with_info() {
        let info = ImageInfo {
            dimensions: Dimensions {
                width: 10,
                height: 20,
            },
            format: Some(image::ImageFormat::Png),
        };
        assert_eq!(
            format_identify("a.png", Some(&info)),
            vec!["a.png", "    Dimensions: 10x20", "    Format: Png"]
        );
    }

    #[test]
    fn identify_without_image() {
        assert_eq!(
            format_identify("data:text/plain,x", None),
            vec!["data:text/plain,x", "    No image"]
        );
    }
}
