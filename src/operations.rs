//! Operation table and per-operation parameter objects
//!
//! Each supported image operation has its own closed parameter struct. The
//! gateway method invoked decides which endpoint a struct is sent to; the
//! [`Operation`] table is the single source of those paths.

use crate::form::{Attachment, FormEncode, FormFields};
use crate::models::{ResizeMode, WatermarkPosition};
use std::fmt;

/// What a successful call to an operation yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultKind {
    /// Envelope carrying the generated file identifier.
    FileId,
    /// Envelope carrying an [`crate::models::ImageInfo`] record.
    ImageInfo,
    /// Raw response body, no envelope.
    Binary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Crop,
    CenterCrop,
    PercentCrop,
    Resize,
    Thumbnail,
    TextWatermark,
    ImageWatermark,
    ColorAdjust,
    Compress,
    Convert,
    MetadataStrip,
    Info,
    Download,
}

impl Operation {
    pub const ALL: [Operation; 13] = [
        Self::Crop,
        Self::CenterCrop,
        Self::PercentCrop,
        Self::Resize,
        Self::Thumbnail,
        Self::TextWatermark,
        Self::ImageWatermark,
        Self::ColorAdjust,
        Self::Compress,
        Self::Convert,
        Self::MetadataStrip,
        Self::Info,
        Self::Download,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::CenterCrop => "center-crop",
            Self::PercentCrop => "percent-crop",
            Self::Resize => "resize",
            Self::Thumbnail => "thumbnail",
            Self::TextWatermark => "text-watermark",
            Self::ImageWatermark => "image-watermark",
            Self::ColorAdjust => "color-adjust",
            Self::Compress => "compress",
            Self::Convert => "convert",
            Self::MetadataStrip => "metadata-strip",
            Self::Info => "info",
            Self::Download => "download",
        }
    }

    /// Endpoint path, relative to the service base URL.
    ///
    /// For [`Operation::Download`] this is the prefix; the file id is appended
    /// as one extra path segment.
    pub fn path(self) -> &'static str {
        match self {
            Self::Crop => "/crop",
            Self::CenterCrop => "/crop/center",
            Self::PercentCrop => "/crop/percent",
            Self::Resize => "/resize",
            Self::Thumbnail => "/resize/thumbnail",
            Self::TextWatermark => "/watermark/text",
            Self::ImageWatermark => "/watermark/image",
            Self::ColorAdjust => "/color/adjust",
            Self::Compress => "/compress",
            Self::Convert => "/convert",
            Self::MetadataStrip => "/metadata/strip",
            Self::Info => "/info",
            Self::Download => "/downloads",
        }
    }

    pub fn result_kind(self) -> ResultKind {
        match self {
            Self::Info => ResultKind::ImageInfo,
            Self::Download => ResultKind::Binary,
            _ => ResultKind::FileId,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields shared by every transformation: the source file and an optional
/// output quality.
fn base_fields(file: &Attachment) -> FormFields {
    FormFields::new().file("file", file)
}

fn finish(fields: FormFields, quality: Option<u8>) -> FormFields {
    fields.optional("quality", quality)
}

/// Crop to an explicit pixel rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct CropRequest {
    pub file: Attachment,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub quality: Option<u8>,
}

impl FormEncode for CropRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("x", &self.x)
            .text("y", &self.y)
            .text("width", &self.width)
            .text("height", &self.height);
        finish(fields, self.quality)
    }
}

/// Crop a `width` x `height` region around the image center.
#[derive(Debug, Clone, PartialEq)]
pub struct CenterCropRequest {
    pub file: Attachment,
    pub width: u32,
    pub height: u32,
    pub quality: Option<u8>,
}

impl FormEncode for CenterCropRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("width", &self.width)
            .text("height", &self.height);
        finish(fields, self.quality)
    }
}

/// Crop a rectangle expressed as percentages of the source dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentCropRequest {
    pub file: Attachment,
    pub x_percent: f64,
    pub y_percent: f64,
    pub width_percent: f64,
    pub height_percent: f64,
    pub quality: Option<u8>,
}

impl FormEncode for PercentCropRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("xPercent", &self.x_percent)
            .text("yPercent", &self.y_percent)
            .text("widthPercent", &self.width_percent)
            .text("heightPercent", &self.height_percent);
        finish(fields, self.quality)
    }
}

/// Resize to a target size. Either dimension may be left to the service.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeRequest {
    pub file: Attachment,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub resize_mode: ResizeMode,
    pub quality: Option<u8>,
}

impl FormEncode for ResizeRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .optional("width", self.width)
            .optional("height", self.height)
            .text("resizeMode", &self.resize_mode);
        finish(fields, self.quality)
    }
}

/// Fit the image inside a `max_size` square.
#[derive(Debug, Clone, PartialEq)]
pub struct ThumbnailRequest {
    pub file: Attachment,
    pub max_size: u32,
    pub quality: Option<u8>,
}

impl FormEncode for ThumbnailRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file).text("maxSize", &self.max_size);
        finish(fields, self.quality)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextWatermarkRequest {
    pub file: Attachment,
    pub text: String,
    pub position: WatermarkPosition,
    pub opacity: f64,
    pub font_size: u32,
    /// CSS-style color, e.g. `#FFFFFF`.
    pub font_color: String,
    pub quality: Option<u8>,
}

impl FormEncode for TextWatermarkRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("text", &self.text)
            .text("position", &self.position)
            .text("opacity", &self.opacity)
            .text("fontSize", &self.font_size)
            .text("fontColor", &self.font_color);
        finish(fields, self.quality)
    }
}

/// Overlay a second image. Both attachments travel in the same submission.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageWatermarkRequest {
    pub file: Attachment,
    pub watermark_file: Attachment,
    pub position: WatermarkPosition,
    pub opacity: f64,
    pub scale: f64,
    pub quality: Option<u8>,
}

impl FormEncode for ImageWatermarkRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .file("watermarkFile", &self.watermark_file)
            .text("position", &self.position)
            .text("opacity", &self.opacity)
            .text("scale", &self.scale);
        finish(fields, self.quality)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorAdjustRequest {
    pub file: Attachment,
    pub brightness: f64,
    pub contrast: f64,
    pub saturation: f64,
    pub hue: f64,
    pub gamma: f64,
    pub quality: Option<u8>,
}

impl FormEncode for ColorAdjustRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("brightness", &self.brightness)
            .text("contrast", &self.contrast)
            .text("saturation", &self.saturation)
            .text("hue", &self.hue)
            .text("gamma", &self.gamma);
        finish(fields, self.quality)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompressRequest {
    pub file: Attachment,
    pub compression_level: u32,
    pub preserve_metadata: bool,
    pub quality: Option<u8>,
}

impl FormEncode for CompressRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("compressionLevel", &self.compression_level)
            .text("preserveMetadata", &self.preserve_metadata);
        finish(fields, self.quality)
    }
}

/// Re-encode into the format named by `file_ext` (e.g. `webp`).
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertRequest {
    pub file: Attachment,
    pub file_ext: String,
    pub quality: Option<u8>,
}

impl FormEncode for ConvertRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file).text("fileExt", &self.file_ext);
        finish(fields, self.quality)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataStripRequest {
    pub file: Attachment,
    pub strip_all: bool,
    pub strip_exif: bool,
    pub strip_icc: bool,
    pub strip_xmp: bool,
    pub quality: Option<u8>,
}

impl FormEncode for MetadataStripRequest {
    fn to_form_fields(&self) -> FormFields {
        let fields = base_fields(&self.file)
            .text("stripAll", &self.strip_all)
            .text("stripExif", &self.strip_exif)
            .text("stripIcc", &self.strip_icc)
            .text("stripXmp", &self.strip_xmp);
        finish(fields, self.quality)
    }
}

/// The info endpoint takes the image alone, under the `file` key.
pub fn info_fields(file: &Attachment) -> FormFields {
    base_fields(file)
}
