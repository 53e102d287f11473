//! Typed gateway to the remote image-processing service
//!
//! One async method per operation. Transformation and info calls return the
//! service's response envelope as-is; a `successful: false` envelope is a
//! normal value, not an error. Downloads bypass the envelope and return the
//! raw file bytes.

pub mod client;
pub mod http;
pub mod mock;

pub use client::ImageGliderClient;
pub use http::GatewayHttpClient;
pub use mock::{MockImageGateway, RecordedCall};

use crate::form::Attachment;
use crate::models::{ApiResponse, ImageInfo};
use crate::operations::{
    CenterCropRequest, ColorAdjustRequest, CompressRequest, ConvertRequest, CropRequest,
    ImageWatermarkRequest, MetadataStripRequest, PercentCropRequest, ResizeRequest,
    TextWatermarkRequest, ThumbnailRequest,
};
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ImageGateway: Send + Sync {
    async fn crop_image(&self, params: &CropRequest) -> Result<ApiResponse<String>>;
    async fn crop_image_center(&self, params: &CenterCropRequest) -> Result<ApiResponse<String>>;
    async fn crop_image_by_percent(
        &self,
        params: &PercentCropRequest,
    ) -> Result<ApiResponse<String>>;
    async fn resize_image(&self, params: &ResizeRequest) -> Result<ApiResponse<String>>;
    async fn generate_thumbnail(&self, params: &ThumbnailRequest) -> Result<ApiResponse<String>>;
    async fn add_text_watermark(
        &self,
        params: &TextWatermarkRequest,
    ) -> Result<ApiResponse<String>>;
    async fn add_image_watermark(
        &self,
        params: &ImageWatermarkRequest,
    ) -> Result<ApiResponse<String>>;
    async fn adjust_color(&self, params: &ColorAdjustRequest) -> Result<ApiResponse<String>>;
    async fn compress_image(&self, params: &CompressRequest) -> Result<ApiResponse<String>>;
    async fn convert_image(&self, params: &ConvertRequest) -> Result<ApiResponse<String>>;
    async fn strip_metadata(&self, params: &MetadataStripRequest) -> Result<ApiResponse<String>>;
    async fn get_image_info(&self, file: &Attachment) -> Result<ApiResponse<ImageInfo>>;
    /// Fetches a file produced by an earlier transformation, by its generated name.
    async fn download_image(&self, file_name: &str) -> Result<Vec<u8>>;
}
