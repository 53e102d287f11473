//! Data models and structures
//!
//! Defines the response envelope returned by the image service, the image-info
//! record, the enumerations shared by several operations, and the runtime
//! configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Uniform response wrapper used by every non-binary endpoint.
///
/// `successful` decides the outcome regardless of `status_code`. `data` is only
/// meaningful when `successful` is true, and `message` is human-readable text,
/// not an error code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: i32,
    pub successful: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status_code: 200,
            successful: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(status_code: i32, message: impl Into<String>) -> Self {
        Self {
            status_code,
            successful: false,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Unwraps the payload of a successful envelope.
    ///
    /// A failed envelope, or a successful one without data, becomes
    /// [`crate::Error::Remote`].
    pub fn into_data(self) -> crate::Result<T> {
        match (self.successful, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(crate::Error::Remote {
                status_code: self.status_code,
                message: self.message,
            }),
        }
    }
}

/// Image properties reported by the info endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: String,
    pub file_size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_depth: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_alpha: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<f64>,
}

/// How a resize treats the source aspect ratio. Sent as its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeMode {
    Stretch = 0,
    KeepAspectRatio = 1,
    Crop = 2,
}

impl FromStr for ResizeMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "stretch" | "0" => Ok(Self::Stretch),
            "keepaspectratio" | "keep" | "1" => Ok(Self::KeepAspectRatio),
            "crop" | "2" => Ok(Self::Crop),
            _ => Err(format!(
                "Invalid resize mode '{}'. Expected stretch, keep-aspect-ratio or crop",
                s
            )),
        }
    }
}

/// Anchor of a watermark on a 3x3 grid. Sent as its discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatermarkPosition {
    TopLeft = 0,
    TopCenter = 1,
    TopRight = 2,
    MiddleLeft = 3,
    Center = 4,
    MiddleRight = 5,
    BottomLeft = 6,
    BottomCenter = 7,
    BottomRight = 8,
}

impl WatermarkPosition {
    pub const ALL: [WatermarkPosition; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::MiddleLeft,
        Self::Center,
        Self::MiddleRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    fn name(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::MiddleLeft => "middle-left",
            Self::Center => "center",
            Self::MiddleRight => "middle-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl fmt::Display for WatermarkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WatermarkPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = s.to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|p| p.name() == normalized || (*p as u8).to_string() == normalized)
            .ok_or_else(|| {
                format!(
                    "Invalid watermark position '{}'. Expected one of: {}",
                    s,
                    Self::ALL.map(|p| p.name()).join(", ")
                )
            })
    }
}

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub timeout: Duration,
    pub dry_run: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            dry_run: false,
        }
    }
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        load_env_file(dotenvy::dotenv())?;

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs = match lookup("IMAGEGLIDER_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                crate::Error::Config(format!(
                    "IMAGEGLIDER_TIMEOUT_SECS must be a whole number of seconds, got '{}'",
                    raw
                ))
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            base_url: lookup("IMAGEGLIDER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout: Duration::from_secs(timeout_secs),
            dry_run: lookup("DRY_RUN")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true"))
                .unwrap_or(false),
        })
    }
}

/// A missing `.env` is fine; one that fails to load is not.
fn load_env_file<T>(result: std::result::Result<T, dotenvy::Error>) -> crate::Result<()> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_envelope_deserializes_success() {
        let json = r#"{"statusCode":200,"successful":true,"data":"result-123.png"}"#;
        let envelope: ApiResponse<String> = serde_json::from_str(json).unwrap();

        assert_eq!(envelope, ApiResponse::success("result-123.png".to_string()));
    }

    #[test]
    fn test_envelope_deserializes_failure_without_data() {
        let json = r#"{"statusCode":400,"successful":false,"message":"invalid crop bounds"}"#;
        let envelope: ApiResponse<String> = serde_json::from_str(json).unwrap();

        assert!(!envelope.successful);
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.message.as_deref(), Some("invalid crop bounds"));
    }

    fn decode_generic<T: serde::de::DeserializeOwned>(json: &str) -> ApiResponse<T> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_envelope_decodes_for_any_deserializable_payload() {
        #[derive(Debug, PartialEq, Deserialize)]
        struct NoDefault {
            id: u32,
        }

        let envelope: ApiResponse<NoDefault> =
            decode_generic(r#"{"statusCode":200,"successful":true,"data":{"id":3}}"#);
        assert_eq!(envelope.data, Some(NoDefault { id: 3 }));

        let envelope: ApiResponse<NoDefault> =
            decode_generic(r#"{"statusCode":500,"successful":false}"#);
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn test_envelope_serializes_camel_case_and_skips_absent() {
        let json = serde_json::to_string(&ApiResponse::<String>::failure(400, "bad")).unwrap();
        assert_eq!(json, r#"{"statusCode":400,"successful":false,"message":"bad"}"#);
    }

    #[test]
    fn test_into_data() {
        let ok = ApiResponse::success(7u32).into_data().unwrap();
        assert_eq!(ok, 7);

        let err = ApiResponse::<u32>::failure(422, "nope")
            .into_data()
            .unwrap_err();
        assert!(matches!(
            err,
            crate::Error::Remote {
                status_code: 422,
                ..
            }
        ));
    }

    #[test]
    fn test_into_data_successful_without_data_is_error() {
        let envelope = ApiResponse::<String> {
            status_code: 200,
            successful: true,
            message: None,
            data: None,
        };
        assert!(envelope.into_data().is_err());
    }

    #[test]
    fn test_image_info_deserializes_optional_fields() {
        let json = r#"{"width":640,"height":480,"format":"png","fileSize":1024,"hasAlpha":true}"#;
        let info: ImageInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.width, 640);
        assert_eq!(info.file_size, 1024);
        assert_eq!(info.has_alpha, Some(true));
        assert_eq!(info.color_depth, None);
        assert_eq!(info.dpi, None);
    }

    #[test]
    fn test_resize_mode_parse() {
        assert_eq!("stretch".parse::<ResizeMode>(), Ok(ResizeMode::Stretch));
        assert_eq!("keep-aspect-ratio".parse::<ResizeMode>(), Ok(ResizeMode::KeepAspectRatio));
        assert_eq!("KeepAspectRatio".parse::<ResizeMode>(), Ok(ResizeMode::KeepAspectRatio));
        assert_eq!("2".parse::<ResizeMode>(), Ok(ResizeMode::Crop));
        assert!("zoom".parse::<ResizeMode>().is_err());
    }

    #[test]
    fn test_watermark_position_parse() {
        assert_eq!("bottom-right".parse::<WatermarkPosition>(), Ok(WatermarkPosition::BottomRight));
        assert_eq!("TOP_LEFT".parse::<WatermarkPosition>(), Ok(WatermarkPosition::TopLeft));
        assert_eq!("4".parse::<WatermarkPosition>(), Ok(WatermarkPosition::Center));

        let err = "sideways".parse::<WatermarkPosition>().unwrap_err();
        assert!(err.contains("middle-left"));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_config_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("IMAGEGLIDER_BASE_URL", "https://images.example.com/api"),
            ("IMAGEGLIDER_TIMEOUT_SECS", "5"),
            ("DRY_RUN", "true"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();

        assert_eq!(config.base_url, "https://images.example.com/api");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert!(config.dry_run);
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let result = dotenvy::from_path(dir.path().join(".env"));

        assert!(load_env_file(result).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "not a valid line\n").unwrap();

        let err = load_env_file(dotenvy::from_path(&path)).unwrap_err();
        assert!(matches!(err, crate::Error::EnvVar(_)));
    }

    #[test]
    fn test_config_invalid_timeout() {
        let err = Config::from_lookup(|key| {
            (key == "IMAGEGLIDER_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();

        assert!(matches!(err, crate::Error::Config(_)));
    }
}
