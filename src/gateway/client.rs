use super::http::GatewayHttpClient;
use super::ImageGateway;
use crate::form::{Attachment, FormEncode, FormFields};
use crate::models::{ApiResponse, Config, ImageInfo};
use crate::operations::{
    self, CenterCropRequest, ColorAdjustRequest, CompressRequest, ConvertRequest, CropRequest,
    ImageWatermarkRequest, MetadataStripRequest, Operation, PercentCropRequest, ResizeRequest,
    TextWatermarkRequest, ThumbnailRequest,
};
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// HTTP implementation of [`ImageGateway`].
pub struct ImageGliderClient {
    http: GatewayHttpClient,
}

impl ImageGliderClient {
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self {
            http: GatewayHttpClient::new(config.base_url.clone(), config.timeout)?,
        })
    }

    pub fn new_with_client(base_url: String, client: reqwest::Client) -> Self {
        Self {
            http: GatewayHttpClient::new_with_client(base_url, client),
        }
    }

    async fn submit<T: DeserializeOwned>(
        &self,
        operation: Operation,
        fields: FormFields,
    ) -> Result<ApiResponse<T>> {
        tracing::debug!("Dispatching {} to {}", operation, operation.path());
        self.http.post_form(operation.path(), fields).await
    }

    async fn transform<P: FormEncode + Sync>(
        &self,
        operation: Operation,
        params: &P,
    ) -> Result<ApiResponse<String>> {
        self.submit(operation, params.to_form_fields()).await
    }
}

#[async_trait]
impl ImageGateway for ImageGliderClient {
    async fn crop_image(&self, params: &CropRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::Crop, params).await
    }

    async fn crop_image_center(&self, params: &CenterCropRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::CenterCrop, params).await
    }

    async fn crop_image_by_percent(
        &self,
        params: &PercentCropRequest,
    ) -> Result<ApiResponse<String>> {
        self.transform(Operation::PercentCrop, params).await
    }

    async fn resize_image(&self, params: &ResizeRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::Resize, params).await
    }

    async fn generate_thumbnail(&self, params: &ThumbnailRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::Thumbnail, params).await
    }

    async fn add_text_watermark(
        &self,
        params: &TextWatermarkRequest,
    ) -> Result<ApiResponse<String>> {
        self.transform(Operation::TextWatermark, params).await
    }

    async fn add_image_watermark(
        &self,
        params: &ImageWatermarkRequest,
    ) -> Result<ApiResponse<String>> {
        self.transform(Operation::ImageWatermark, params).await
    }

    async fn adjust_color(&self, params: &ColorAdjustRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::ColorAdjust, params).await
    }

    async fn compress_image(&self, params: &CompressRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::Compress, params).await
    }

    async fn convert_image(&self, params: &ConvertRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::Convert, params).await
    }

    async fn strip_metadata(&self, params: &MetadataStripRequest) -> Result<ApiResponse<String>> {
        self.transform(Operation::MetadataStrip, params).await
    }

    async fn get_image_info(&self, file: &Attachment) -> Result<ApiResponse<ImageInfo>> {
        self.submit(Operation::Info, operations::info_fields(file))
            .await
    }

    async fn download_image(&self, file_name: &str) -> Result<Vec<u8>> {
        tracing::debug!("Downloading {}", file_name);
        let url = self
            .http
            .segment_url(Operation::Download.path(), file_name)?;
        self.http.post_for_bytes(url).await
    }
}
