use clap::{Parser, Subcommand, ValueEnum};
use image_converter::imaging::{self, CompressFormat, ImageReference, Quality, SystemBackend};
use image_converter::pipeline::{self, ConvertRequest, OutputTarget, ResizeStep, ScaleAlgorithm};
use image_converter::{config, output};
use serde_json::json;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(name = "image-converter")]
#[command(about = "Load, resize, grayscale and re-encode images")]
#[command(long_about = "\
Load, resize, grayscale and re-encode images

Sources can be:

  photo.jpg, /tmp/a.png            # Filesystem path
  file:///tmp/a.png                # File URI
  content://media/images/7         # Resolved under [local] content_root
  data:image/png;base64,iVBOR...   # Inline JPEG or PNG
  https://example.com/a.jpg        # Downloaded with a blocking GET

Output is JPEG or PNG, written to a new file (never overwritten) or printed
as standard base64.

Run 'image-converter gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults apply when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert one image
    Convert(ConvertArgs),
    /// Print an image's dimensions and format without decoding pixels
    Identify {
        /// Path or URI of the image
        source: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Path or URI of the image
    source: String,

    /// Resize to exactly WIDTHxHEIGHT
    #[arg(long, value_name = "WxH", conflicts_with = "fit")]
    resize: Option<Size>,

    /// Resize to fit inside WIDTHxHEIGHT, keeping the aspect ratio
    #[arg(long, value_name = "WxH")]
    fit: Option<Size>,

    /// Scale about the image centre instead of the top-left corner
    #[arg(long)]
    centered: bool,

    /// Convert to grayscale
    #[arg(long)]
    grayscale: bool,

    /// File to create; it must not exist yet
    #[arg(long, short, required_unless_present = "base64", conflicts_with = "base64")]
    output: Option<PathBuf>,

    /// Print the encoded image as base64 instead of writing a file
    #[arg(long)]
    base64: bool,

    /// Output format (default from config)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Quality from 0.0 to 1.0 for file output (default from config)
    #[arg(long)]
    quality: Option<f32>,

    /// Print the conversion report as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    #[value(alias = "jpg")]
    Jpeg,
    Png,
}

impl From<FormatArg> for CompressFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => CompressFormat::Jpeg,
            FormatArg::Png => CompressFormat::Png,
        }
    }
}

/// `WIDTHxHEIGHT`, both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Size {
    width: u32,
    height: u32,
}

impl FromStr for Size {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let parse = |v: &str| {
            v.trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| format!("'{v}' is not a positive integer"))
        };
        Ok(Size {
            width: parse(w)?,
            height: parse(h)?,
        })
    }
}

fn build_request(args: ConvertArgs, config: &config::ConverterConfig) -> ConvertRequest {
    let algorithm = if args.centered {
        ScaleAlgorithm::Centered
    } else {
        ScaleAlgorithm::Bilinear
    };
    let resize = match (args.resize, args.fit) {
        (Some(size), _) => Some((size, false)),
        (None, Some(size)) => Some((size, true)),
        (None, None) => None,
    }
    .map(|(size, preserve_aspect)| ResizeStep {
        width: size.width,
        height: size.height,
        algorithm,
        preserve_aspect,
    });

    let output = match args.output {
        Some(path) if !args.base64 => OutputTarget::File(path),
        _ => OutputTarget::Base64,
    };

    ConvertRequest {
        source: args.source,
        resize,
        grayscale: args.grayscale,
        format: args.format.map_or(config.output.format, CompressFormat::from),
        quality: args
            .quality
            .map_or_else(|| config.quality(), Quality::from_fraction),
        output,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => {
            let config = config::load_config(cli.config.as_deref())?;
            if let Some(q) = args.quality.filter(|q| !(0.0..=1.0).contains(q)) {
                return Err(format!("--quality must be between 0.0 and 1.0, got {q}").into());
            }
            let source = args.source.clone();
            let as_json = args.json;
            let request = build_request(args, &config);
            let report = pipeline::convert(&request, &config)?;
            if as_json {
                println!("{}", output::format_convert_json(&report)?);
            } else {
                output::print_convert_report(&source, &report);
            }
        }
        Command::Identify { source, json } => {
            let config = config::load_config(cli.config.as_deref())?;
            let backend =
                SystemBackend::with_settings(config.local.content_root.clone(), config.timeout())?;
            let reference = ImageReference::parse(&source)?;
            let info = imaging::identify(&backend, &reference)?;
            if json {
                let value = match &info {
                    Some(info) => json!({
                        "source": source,
                        "width": info.dimensions.width,
                        "height": info.dimensions.height,
                        "format": info.format.map(|f| format!("{f:?}").to_lowercase()),
                    }),
                    None => json!({ "source": source, "image": null }),
                };
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                output::print_identify(&source, info.as_ref());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
