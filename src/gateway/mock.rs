use super::ImageGateway;
use crate::form::{Attachment, FieldValue, FormEncode, FormFields};
use crate::mime;
use crate::models::{ApiResponse, ImageInfo};
use crate::operations::{
    self, CenterCropRequest, ColorAdjustRequest, CompressRequest, ConvertRequest, CropRequest,
    ImageWatermarkRequest, MetadataStripRequest, Operation, PercentCropRequest, ResizeRequest,
    TextWatermarkRequest, ThumbnailRequest,
};
use crate::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// One call received by [`MockImageGateway`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub operation: Operation,
    pub path: String,
    pub fields: FormFields,
}

/// In-memory gateway that records every call instead of reaching a service.
///
/// Transformations "succeed" by issuing a fresh file id and remembering the
/// submitted image under it, so a later `download_image` of that id returns
/// the submitted bytes.
#[derive(Clone)]
pub struct MockImageGateway {
    calls: Arc<Mutex<Vec<RecordedCall>>>,
    files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    failures: Arc<Mutex<HashMap<Operation, (i32, String)>>>,
    image_info: Arc<Mutex<Option<ImageInfo>>>,
}

impl MockImageGateway {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            files: Arc::new(Mutex::new(HashMap::new())),
            failures: Arc::new(Mutex::new(HashMap::new())),
            image_info: Arc::new(Mutex::new(None)),
        }
    }

    /// Makes `operation` answer with a `successful: false` envelope.
    pub fn with_failure(self, operation: Operation, status_code: i32, message: &str) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(operation, (status_code, message.to_string()));
        self
    }

    pub fn with_image_info(self, info: ImageInfo) -> Self {
        *self.image_info.lock().unwrap() = Some(info);
        self
    }

    pub fn with_file(self, file_name: String, content: Vec<u8>) -> Self {
        self.files.lock().unwrap().insert(file_name, content);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn get_files(&self) -> HashMap<String, Vec<u8>> {
        self.files.lock().unwrap().clone()
    }

    fn record(&self, operation: Operation, path: String, fields: FormFields) {
        self.calls.lock().unwrap().push(RecordedCall {
            operation,
            path,
            fields,
        });
    }

    fn failure_for<T>(&self, operation: Operation) -> Option<ApiResponse<T>> {
        self.failures
            .lock()
            .unwrap()
            .get(&operation)
            .map(|(status_code, message)| ApiResponse::failure(*status_code, message.as_str()))
    }

    fn transform<P: FormEncode>(&self, operation: Operation, params: &P) -> ApiResponse<String> {
        let fields = params.to_form_fields();
        self.record(operation, operation.path().to_string(), fields.clone());

        if let Some(failure) = self.failure_for(operation) {
            return failure;
        }

        let source = fields.get("file").and_then(FieldValue::as_file);
        let extension = match fields.get("fileExt").and_then(FieldValue::as_text) {
            Some(ext) => ext.trim_start_matches('.').to_ascii_lowercase(),
            None => source
                .map(|file| mime::extension_for(file.mime_type()))
                .unwrap_or("bin")
                .to_string(),
        };

        let file_id = format!("{}_{}.{}", operation.name(), Uuid::new_v4(), extension);
        let content = source.map(|file| file.bytes.clone()).unwrap_or_default();
        self.files.lock().unwrap().insert(file_id.clone(), content);

        ApiResponse::success(file_id)
    }
}

impl Default for MockImageGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGateway for MockImageGateway {
    async fn crop_image(&self, params: &CropRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::Crop, params))
    }

    async fn crop_image_center(&self, params: &CenterCropRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::CenterCrop, params))
    }

    async fn crop_image_by_percent(
        &self,
        params: &PercentCropRequest,
    ) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::PercentCrop, params))
    }

    async fn resize_image(&self, params: &ResizeRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::Resize, params))
    }

    async fn generate_thumbnail(&self, params: &ThumbnailRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::Thumbnail, params))
    }

    async fn add_text_watermark(
        &self,
        params: &TextWatermarkRequest,
    ) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::TextWatermark, params))
    }

    async fn add_image_watermark(
        &self,
        params: &ImageWatermarkRequest,
    ) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::ImageWatermark, params))
    }

    async fn adjust_color(&self, params: &ColorAdjustRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::ColorAdjust, params))
    }

    async fn compress_image(&self, params: &CompressRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::Compress, params))
    }

    async fn convert_image(&self, params: &ConvertRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::Convert, params))
    }

    async fn strip_metadata(&self, params: &MetadataStripRequest) -> Result<ApiResponse<String>> {
        Ok(self.transform(Operation::MetadataStrip, params))
    }

    async fn get_image_info(&self, file: &Attachment) -> Result<ApiResponse<ImageInfo>> {
        self.record(
            Operation::Info,
            Operation::Info.path().to_string(),
            operations::info_fields(file),
        );

        if let Some(failure) = self.failure_for(Operation::Info) {
            return Ok(failure);
        }

        let info = self.image_info.lock().unwrap().clone().unwrap_or_else(|| ImageInfo {
            width: 0,
            height: 0,
            format: mime::extension_for(file.mime_type()).to_string(),
            file_size: file.bytes.len() as u64,
            color_depth: None,
            has_alpha: None,
            dpi: None,
        });

        Ok(ApiResponse::success(info))
    }

    async fn download_image(&self, file_name: &str) -> Result<Vec<u8>> {
        self.record(
            Operation::Download,
            format!("{}/{}", Operation::Download.path(), file_name),
            FormFields::new(),
        );

        self.files
            .lock()
            .unwrap()
            .get(file_name)
            .cloned()
            .ok_or_else(|| crate::Error::Transport {
                status: 404,
                body: format!("File not found: {}", file_name),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResizeMode;

    fn image() -> Attachment {
        Attachment::new("photo.jpg", vec![0xFF, 0xD8, 0xFF, 0xE0, 0x01])
    }

    fn thumbnail() -> ThumbnailRequest {
        ThumbnailRequest {
            file: image(),
            max_size: 128,
            quality: None,
        }
    }

    #[tokio::test]
    async fn test_mock_issues_id_and_serves_download() {
        let gateway = MockImageGateway::new();

        let envelope = gateway.generate_thumbnail(&thumbnail()).await.unwrap();
        assert!(envelope.successful);

        let file_id = envelope.into_data().unwrap();
        assert!(file_id.starts_with("thumbnail_"));
        assert!(file_id.ends_with(".jpg"));

        let bytes = gateway.download_image(&file_id).await.unwrap();
        assert_eq!(bytes, image().bytes);
        assert_eq!(gateway.get_call_count(), 2);
    }

    #[tokio::test]
    async fn test_mock_records_paths_and_fields() {
        let gateway = MockImageGateway::new();
        let request = ResizeRequest {
            file: image(),
            width: Some(100),
            height: None,
            resize_mode: ResizeMode::Crop,
            quality: None,
        };

        gateway.resize_image(&request).await.unwrap();
        gateway.download_image("whatever.png").await.unwrap_err();

        let calls = gateway.get_calls();
        assert_eq!(calls[0].operation, Operation::Resize);
        assert_eq!(calls[0].path, "/resize");
        assert_eq!(calls[0].fields, request.to_form_fields());
        assert_eq!(calls[1].path, "/downloads/whatever.png");
    }

    #[tokio::test]
    async fn test_mock_convert_uses_requested_extension() {
        let gateway = MockImageGateway::new();
        let request = ConvertRequest {
            file: image(),
            file_ext: ".WebP".to_string(),
            quality: None,
        };

        let file_id = gateway
            .convert_image(&request)
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert!(file_id.ends_with(".webp"));
    }

    #[tokio::test]
    async fn test_mock_failure_envelope() {
        let gateway = MockImageGateway::new().with_failure(
            Operation::Thumbnail,
            400,
            "maxSize must be positive",
        );

        let envelope = gateway.generate_thumbnail(&thumbnail()).await.unwrap();
        assert!(!envelope.successful);
        assert_eq!(envelope.status_code, 400);
        assert_eq!(envelope.message.as_deref(), Some("maxSize must be positive"));
        assert!(gateway.get_files().is_empty());
    }

    #[tokio::test]
    async fn test_mock_info_default_and_override() {
        let gateway = MockImageGateway::new();
        let info = gateway
            .get_image_info(&image())
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(info.format, "jpg");
        assert_eq!(info.file_size, 5);

        let custom = ImageInfo {
            width: 800,
            height: 600,
            format: "Jpeg".to_string(),
            file_size: 5,
            color_depth: Some(24),
            has_alpha: Some(false),
            dpi: None,
        };
        let gateway = MockImageGateway::new().with_image_info(custom.clone());
        let info = gateway
            .get_image_info(&image())
            .await
            .unwrap()
            .into_data()
            .unwrap();
        assert_eq!(info, custom);
    }

    #[tokio::test]
    async fn test_mock_download_preloaded_file() {
        let gateway = MockImageGateway::new().with_file("seed.png".to_string(), vec![1, 2, 3]);
        assert_eq!(gateway.download_image("seed.png").await.unwrap(), vec![1, 2, 3]);
    }
}
