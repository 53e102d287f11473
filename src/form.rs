//! Request encoding for multipart submissions
//!
//! Every operation's parameters flatten into an ordered [`FormFields`] set:
//! scalars become their canonical string form, attachments pass through with
//! their bytes and file name untouched, and absent optional values produce no
//! field at all.

use crate::mime;
use crate::models::{ResizeMode, WatermarkPosition};
use crate::{Error, Result};
use reqwest::multipart::{Form, Part};
use std::path::Path;

/// A binary file value. Never stringified on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Declared content type; sniffed from `bytes` when absent.
    pub content_type: Option<String>,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Reads a file from disk, keeping its base name as the attachment name.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::Config(format!("Not a file path: {}", path.display())))?;

        Ok(Self::new(file_name, bytes))
    }

    pub fn mime_type(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or_else(|| mime::detect_image_mime(&self.bytes))
    }
}

/// Value of one wire field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    File(Attachment),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&Attachment> {
        match self {
            Self::File(attachment) => Some(attachment),
            Self::Text(_) => None,
        }
    }
}

/// Values that may be sent as a plain text field.
///
/// Only numbers, strings, booleans and the service enums implement this, so a
/// nested structure can never reach the wire.
pub trait FormScalar {
    fn to_form_value(&self) -> String;
}

macro_rules! impl_form_scalar_display {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FormScalar for $ty {
                fn to_form_value(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_form_scalar_display!(u8, u16, u32, u64, i32, i64, f32, f64, bool, str, String);

impl FormScalar for ResizeMode {
    fn to_form_value(&self) -> String {
        (*self as u8).to_string()
    }
}

impl FormScalar for WatermarkPosition {
    fn to_form_value(&self) -> String {
        (*self as u8).to_string()
    }
}

/// Ordered set of wire fields ready for multipart transport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormFields {
    fields: Vec<(String, FieldValue)>,
}

impl FormFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text<V: FormScalar + ?Sized>(mut self, name: &str, value: &V) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::Text(value.to_form_value())));
        self
    }

    /// Appends `value` only when it is present.
    pub fn optional<V: FormScalar>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.text(name, &value),
            None => self,
        }
    }

    pub fn file(mut self, name: &str, attachment: &Attachment) -> Self {
        self.fields
            .push((name.to_string(), FieldValue::File(attachment.clone())));
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Builds the multipart body, in field order.
    pub fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, value) in self.fields {
            form = match value {
                FieldValue::Text(text) => form.text(name, text),
                FieldValue::File(attachment) => {
                    let mime_type = attachment.mime_type().to_string();
                    let part = Part::bytes(attachment.bytes)
                        .file_name(attachment.file_name)
                        .mime_str(&mime_type)?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

/// Flattens a parameter object into wire fields.
pub trait FormEncode {
    fn to_form_fields(&self) -> FormFields;
}
