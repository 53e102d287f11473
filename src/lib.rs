//! Client for the ImageGlider image-processing service
//!
//! Turns typed operation parameters (crop, resize, watermark, color, compress,
//! convert, metadata strip, info) into multipart submissions against the
//! service, decodes its uniform response envelope, and fetches generated files
//! as raw bytes.

pub mod app;
pub mod error;
pub mod form;
pub mod gateway;
pub mod mime;
pub mod models;
pub mod operations;

pub use error::{Error, Result};
pub use gateway::{ImageGateway, ImageGliderClient, MockImageGateway};
