//! Command orchestration on top of the gateway.
//!
//! An [`ImageJob`] names one operation together with its parameters; the
//! [`App`] dispatches it to the matching gateway method, reports the envelope,
//! and optionally fetches the generated file.

use crate::form::Attachment;
use crate::gateway::{ImageGateway, ImageGliderClient, MockImageGateway};
use crate::models::{ApiResponse, Config, ImageInfo};
use crate::operations::{
    CenterCropRequest, ColorAdjustRequest, CompressRequest, ConvertRequest, CropRequest,
    ImageWatermarkRequest, MetadataStripRequest, Operation, PercentCropRequest, ResizeRequest,
    TextWatermarkRequest, ThumbnailRequest,
};
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One gateway call, tagged by operation.
#[derive(Debug, Clone)]
pub enum ImageJob {
    Crop(CropRequest),
    CenterCrop(CenterCropRequest),
    PercentCrop(PercentCropRequest),
    Resize(ResizeRequest),
    Thumbnail(ThumbnailRequest),
    TextWatermark(TextWatermarkRequest),
    ImageWatermark(ImageWatermarkRequest),
    ColorAdjust(ColorAdjustRequest),
    Compress(CompressRequest),
    Convert(ConvertRequest),
    MetadataStrip(MetadataStripRequest),
    Info(Attachment),
    Download(String),
}

impl ImageJob {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Crop(_) => Operation::Crop,
            Self::CenterCrop(_) => Operation::CenterCrop,
            Self::PercentCrop(_) => Operation::PercentCrop,
            Self::Resize(_) => Operation::Resize,
            Self::Thumbnail(_) => Operation::Thumbnail,
            Self::TextWatermark(_) => Operation::TextWatermark,
            Self::ImageWatermark(_) => Operation::ImageWatermark,
            Self::ColorAdjust(_) => Operation::ColorAdjust,
            Self::Compress(_) => Operation::Compress,
            Self::Convert(_) => Operation::Convert,
            Self::MetadataStrip(_) => Operation::MetadataStrip,
            Self::Info(_) => Operation::Info,
            Self::Download(_) => Operation::Download,
        }
    }
}

/// What a job produced.
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    FileId(ApiResponse<String>),
    Info(ApiResponse<ImageInfo>),
    Bytes(Vec<u8>),
}

pub struct App {
    gateway: Box<dyn ImageGateway>,
}

impl App {
    pub fn with_gateway(gateway: Box<dyn ImageGateway>) -> Self {
        Self { gateway }
    }

    /// Builds the HTTP gateway, or the in-memory one when `dry_run` is set.
    pub fn new(config: &Config) -> Result<Self> {
        let gateway: Box<dyn ImageGateway> = if config.dry_run {
            info!("DRY_RUN enabled, requests will not leave this process");
            Box::new(MockImageGateway::new())
        } else {
            info!("Using image service at {}", config.base_url);
            Box::new(ImageGliderClient::new(config)?)
        };

        Ok(Self::with_gateway(gateway))
    }

    pub async fn execute(&self, job: ImageJob) -> Result<JobOutcome> {
        let gateway = self.gateway.as_ref();
        info!("Running {}", job.operation());

        let outcome = match job {
            ImageJob::Crop(params) => JobOutcome::FileId(gateway.crop_image(&params).await?),
            ImageJob::CenterCrop(params) => {
                JobOutcome::FileId(gateway.crop_image_center(&params).await?)
            }
            ImageJob::PercentCrop(params) => {
                JobOutcome::FileId(gateway.crop_image_by_percent(&params).await?)
            }
            ImageJob::Resize(params) => JobOutcome::FileId(gateway.resize_image(&params).await?),
            ImageJob::Thumbnail(params) => {
                JobOutcome::FileId(gateway.generate_thumbnail(&params).await?)
            }
            ImageJob::TextWatermark(params) => {
                JobOutcome::FileId(gateway.add_text_watermark(&params).await?)
            }
            ImageJob::ImageWatermark(params) => {
                JobOutcome::FileId(gateway.add_image_watermark(&params).await?)
            }
            ImageJob::ColorAdjust(params) => {
                JobOutcome::FileId(gateway.adjust_color(&params).await?)
            }
            ImageJob::Compress(params) => {
                JobOutcome::FileId(gateway.compress_image(&params).await?)
            }
            ImageJob::Convert(params) => JobOutcome::FileId(gateway.convert_image(&params).await?),
            ImageJob::MetadataStrip(params) => {
                JobOutcome::FileId(gateway.strip_metadata(&params).await?)
            }
            ImageJob::Info(file) => JobOutcome::Info(gateway.get_image_info(&file).await?),
            ImageJob::Download(file_name) => {
                JobOutcome::Bytes(gateway.download_image(&file_name).await?)
            }
        };

        Ok(outcome)
    }

    /// Fetches a generated file and writes it to `output`.
    pub async fn download_to(&self, file_name: &str, output: &Path) -> Result<usize> {
        let bytes = self.gateway.download_image(file_name).await?;
        tokio::fs::write(output, &bytes).await?;
        info!("Saved {} ({} bytes) to {}", file_name, bytes.len(), output.display());
        Ok(bytes.len())
    }

    /// Runs `job`, prints its envelope, and stores any resulting file.
    ///
    /// Transformations are downloaded only when `output` is given; a download
    /// job falls back to the file's own name in the current directory. A failed
    /// envelope is printed, then returned as [`crate::Error::Remote`].
    pub async fn run(&self, job: ImageJob, output: Option<PathBuf>) -> Result<()> {
        let download_name = match &job {
            ImageJob::Download(file_name) => Some(file_name.clone()),
            _ => None,
        };

        match self.execute(job).await? {
            JobOutcome::FileId(envelope) => {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
                let file_id = envelope.into_data()?;
                match output {
                    Some(path) => {
                        self.download_to(&file_id, &path).await?;
                    }
                    None => info!("Generated file: {}", file_id),
                }
            }
            JobOutcome::Info(envelope) => {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
                envelope.into_data()?;
                if output.is_some() {
                    warn!("--output is ignored for info requests");
                }
            }
            JobOutcome::Bytes(bytes) => {
                let path = output
                    .or_else(|| {
                        download_name
                            .and_then(|name| Path::new(&name).file_name().map(PathBuf::from))
                    })
                    .unwrap_or_else(|| PathBuf::from("download.bin"));
                tokio::fs::write(&path, &bytes).await?;
                info!("Saved {} bytes to {}", bytes.len(), path.display());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResizeMode;
    use crate::Error;

    fn image() -> Attachment {
        Attachment::new("photo.png", vec![0x89, 0x50, 0x4E, 0x47, 0x42])
    }

    fn resize_job() -> ImageJob {
        ImageJob::Resize(ResizeRequest {
            file: image(),
            width: Some(100),
            height: Some(200),
            resize_mode: ResizeMode::KeepAspectRatio,
            quality: None,
        })
    }

    #[test]
    fn test_job_operation() {
        assert_eq!(resize_job().operation(), Operation::Resize);
        assert_eq!(
            ImageJob::Download("x.png".to_string()).operation(),
            Operation::Download
        );
        assert_eq!(ImageJob::Info(image()).operation(), Operation::Info);
    }

    #[tokio::test]
    async fn test_execute_dispatches_to_bound_operation() {
        let gateway = MockImageGateway::new();
        let app = App::with_gateway(Box::new(gateway.clone()));

        let outcome = app.execute(resize_job()).await.unwrap();
        assert!(matches!(outcome, JobOutcome::FileId(ref e) if e.successful));

        let calls = gateway.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].operation, Operation::Resize);
        assert_eq!(calls[0].path, "/resize");
    }

    #[tokio::test]
    async fn test_run_downloads_result_to_output() {
        let gateway = MockImageGateway::new();
        let app = App::with_gateway(Box::new(gateway.clone()));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");

        app.run(resize_job(), Some(output.clone())).await.unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), image().bytes);
        let calls = gateway.get_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].operation, Operation::Download);
    }

    #[tokio::test]
    async fn test_run_reports_remote_failure() {
        let gateway = MockImageGateway::new().with_failure(Operation::Resize, 400, "too large");
        let app = App::with_gateway(Box::new(gateway.clone()));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");

        let err = app.run(resize_job(), Some(output.clone())).await.unwrap_err();

        assert!(matches!(err, Error::Remote { status_code: 400, .. }));
        assert!(!output.exists());
        assert_eq!(gateway.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_run_download_job_writes_bytes() {
        let gateway = MockImageGateway::new().with_file("seed.png".to_string(), vec![9, 8, 7]);
        let app = App::with_gateway(Box::new(gateway));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("seed-copy.png");

        app.run(
            ImageJob::Download("seed.png".to_string()),
            Some(output.clone()),
        )
        .await
        .unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn test_new_with_dry_run_uses_mock() {
        let config = Config {
            dry_run: true,
            ..Config::default()
        };
        assert!(App::new(&config).is_ok());
    }
}
