use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use imageglider::app::{App, ImageJob};
use imageglider::form::Attachment;
use imageglider::models::{Config, ResizeMode, WatermarkPosition};
use imageglider::operations::{
    CenterCropRequest, ColorAdjustRequest, CompressRequest, ConvertRequest, CropRequest,
    ImageWatermarkRequest, MetadataStripRequest, PercentCropRequest, ResizeRequest,
    TextWatermarkRequest, ThumbnailRequest,
};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "imageglider")]
#[command(about = "Submit images to an ImageGlider service and fetch the results")]
struct CliArgs {
    /// Service base URL (overrides IMAGEGLIDER_BASE_URL).
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Record requests in memory instead of calling the service.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Where to save the generated file.
    #[arg(long, short, global = true, value_name = "PATH")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Source {
    /// Image to process.
    #[arg(long, short)]
    file: PathBuf,

    /// Output quality (1-100).
    #[arg(long)]
    quality: Option<u8>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Crop to a pixel rectangle.
    Crop {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        x: u32,
        #[arg(long)]
        y: u32,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Crop a region around the center.
    CenterCrop {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
    },
    /// Crop a rectangle given in percent of the image size.
    PercentCrop {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        x_percent: f64,
        #[arg(long)]
        y_percent: f64,
        #[arg(long)]
        width_percent: f64,
        #[arg(long)]
        height_percent: f64,
    },
    Resize {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// stretch, keep-aspect-ratio or crop
        #[arg(long, default_value = "keep-aspect-ratio")]
        mode: ResizeMode,
    },
    Thumbnail {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        max_size: u32,
    },
    TextWatermark {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        text: String,
        #[arg(long, default_value = "bottom-right")]
        position: WatermarkPosition,
        #[arg(long, default_value_t = 0.5)]
        opacity: f64,
        #[arg(long, default_value_t = 24)]
        font_size: u32,
        #[arg(long, default_value = "#FFFFFF")]
        font_color: String,
    },
    ImageWatermark {
        #[command(flatten)]
        source: Source,
        /// Image to overlay.
        #[arg(long)]
        watermark: PathBuf,
        #[arg(long, default_value = "bottom-right")]
        position: WatermarkPosition,
        #[arg(long, default_value_t = 0.5)]
        opacity: f64,
        #[arg(long, default_value_t = 0.2)]
        scale: f64,
    },
    /// Adjust brightness, contrast, saturation, hue and gamma.
    Color {
        #[command(flatten)]
        source: Source,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        brightness: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        contrast: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        saturation: f64,
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        hue: f64,
        #[arg(long, default_value_t = 1.0)]
        gamma: f64,
    },
    Compress {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        level: u32,
        #[arg(long)]
        preserve_metadata: bool,
    },
    Convert {
        #[command(flatten)]
        source: Source,
        /// Target format extension, e.g. webp.
        #[arg(long)]
        to: String,
    },
    StripMetadata {
        #[command(flatten)]
        source: Source,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        exif: bool,
        #[arg(long)]
        icc: bool,
        #[arg(long)]
        xmp: bool,
    },
    /// Print dimensions, format and size of an image.
    Info {
        #[arg(long, short)]
        file: PathBuf,
    },
    /// Fetch a previously generated file by its id.
    Download {
        #[arg(value_name = "FILE_ID")]
        file_id: String,
    },
}

impl Command {
    async fn into_job(self) -> imageglider::Result<ImageJob> {
        let job = match self {
            Command::Crop {
                source,
                x,
                y,
                width,
                height,
            } => ImageJob::Crop(CropRequest {
                file: Attachment::from_path(&source.file).await?,
                x,
                y,
                width,
                height,
                quality: source.quality,
            }),
            Command::CenterCrop {
                source,
                width,
                height,
            } => ImageJob::CenterCrop(CenterCropRequest {
                file: Attachment::from_path(&source.file).await?,
                width,
                height,
                quality: source.quality,
            }),
            Command::PercentCrop {
                source,
                x_percent,
                y_percent,
                width_percent,
                height_percent,
            } => ImageJob::PercentCrop(PercentCropRequest {
                file: Attachment::from_path(&source.file).await?,
                x_percent,
                y_percent,
                width_percent,
                height_percent,
                quality: source.quality,
            }),
            Command::Resize {
                source,
                width,
                height,
                mode,
            } => ImageJob::Resize(ResizeRequest {
                file: Attachment::from_path(&source.file).await?,
                width,
                height,
                resize_mode: mode,
                quality: source.quality,
            }),
            Command::Thumbnail { source, max_size } => ImageJob::Thumbnail(ThumbnailRequest {
                file: Attachment::from_path(&source.file).await?,
                max_size,
                quality: source.quality,
            }),
            Command::TextWatermark {
                source,
                text,
                position,
                opacity,
                font_size,
                font_color,
            } => ImageJob::TextWatermark(TextWatermarkRequest {
                file: Attachment::from_path(&source.file).await?,
                text,
                position,
                opacity,
                font_size,
                font_color,
                quality: source.quality,
            }),
            Command::ImageWatermark {
                source,
                watermark,
                position,
                opacity,
                scale,
            } => ImageJob::ImageWatermark(ImageWatermarkRequest {
                file: Attachment::from_path(&source.file).await?,
                watermark_file: Attachment::from_path(&watermark).await?,
                position,
                opacity,
                scale,
                quality: source.quality,
            }),
            Command::Color {
                source,
                brightness,
                contrast,
                saturation,
                hue,
                gamma,
            } => ImageJob::ColorAdjust(ColorAdjustRequest {
                file: Attachment::from_path(&source.file).await?,
                brightness,
                contrast,
                saturation,
                hue,
                gamma,
                quality: source.quality,
            }),
            Command::Compress {
                source,
                level,
                preserve_metadata,
            } => ImageJob::Compress(CompressRequest {
                file: Attachment::from_path(&source.file).await?,
                compression_level: level,
                preserve_metadata,
                quality: source.quality,
            }),
            Command::Convert { source, to } => ImageJob::Convert(ConvertRequest {
                file: Attachment::from_path(&source.file).await?,
                file_ext: to,
                quality: source.quality,
            }),
            Command::StripMetadata {
                source,
                all,
                exif,
                icc,
                xmp,
            } => ImageJob::MetadataStrip(MetadataStripRequest {
                file: Attachment::from_path(&source.file).await?,
                strip_all: all,
                strip_exif: exif,
                strip_icc: icc,
                strip_xmp: xmp,
                quality: source.quality,
            }),
            Command::Info { file } => ImageJob::Info(Attachment::from_path(&file).await?),
            Command::Download { file_id } => ImageJob::Download(file_id),
        };

        Ok(job)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imageglider=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let mut config = Config::from_env()?;
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    config.dry_run |= args.dry_run;

    let app = match App::new(&config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            std::process::exit(1);
        }
    };

    let job = match args.command.into_job().await {
        Ok(job) => job,
        Err(e) => {
            error!("Failed to prepare request: {}", e);
            std::process::exit(1);
        }
    };
    let operation = job.operation();

    match app.run(job, args.output).await {
        Ok(()) => {
            info!("{} completed successfully", operation);
            Ok(())
        }
        Err(e) => {
            error!("{} failed: {}", operation, e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_parse_resize_with_defaults() {
        let args = CliArgs::try_parse_from([
            "imageglider",
            "resize",
            "--file",
            "in.png",
            "--width",
            "100",
        ])
        .unwrap();

        match args.command {
            Command::Resize {
                width, height, mode, ..
            } => {
                assert_eq!(width, Some(100));
                assert_eq!(height, None);
                assert_eq!(mode, ResizeMode::KeepAspectRatio);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_output_after_subcommand() {
        let args = CliArgs::try_parse_from([
            "imageglider",
            "download",
            "result-123.png",
            "--output",
            "out.png",
            "--dry-run",
        ])
        .unwrap();

        assert!(args.dry_run);
        assert_eq!(args.output, Some(PathBuf::from("out.png")));
    }

    #[test]
    fn test_parse_invalid_position() {
        let result = CliArgs::try_parse_from([
            "imageglider",
            "text-watermark",
            "--file",
            "in.png",
            "--text",
            "hi",
            "--position",
            "sideways",
        ]);

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_into_job_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();

        let err = Command::Info {
            file: dir.path().join("absent.png"),
        }
        .into_job()
        .await
        .unwrap_err();

        assert!(matches!(err, imageglider::Error::Io(_)));
    }

    #[tokio::test]
    async fn test_into_job_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.png");
        std::fs::write(&path, [0x89, 0x50, 0x4E, 0x47]).unwrap();

        let job = Command::Thumbnail {
            source: Source {
                file: path,
                quality: Some(80),
            },
            max_size: 64,
        }
        .into_job()
        .await
        .unwrap();

        match job {
            ImageJob::Thumbnail(request) => {
                assert_eq!(request.file.file_name, "in.png");
                assert_eq!(request.max_size, 64);
                assert_eq!(request.quality, Some(80));
            }
            other => panic!("unexpected job: {:?}", other),
        }
    }
}
