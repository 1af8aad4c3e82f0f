//! Backend API contract.
//!
//! The controller never builds PDFs; it only has to keep the backend
//! endpoints network-only. These types describe what travels over those
//! endpoints so the page and the controller agree on the paths and shapes.

use std::fmt;
use std::str::FromStr;

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::error::ContractError;

/// Multipart upload endpoint (POST)
pub const UPLOAD_PATH: &str = "/upload";

/// Liveness probe (GET)
pub const HEALTH_PATH: &str = "/health";

/// Default print size in centimetres
pub const DEFAULT_SIZE_CM: f64 = 5.5;

/// Multipart field carrying the images
pub const IMAGES_FIELD: &str = "images[]";

/// Page layout of the generated grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// The image fills its whole frame
    #[default]
    Standard,
    /// White frame with a wider bottom margin
    Polaroid,
}

impl Layout {
    /// Parse the way the backend does: anything but an exact known name
    /// means `standard`
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Standard => "standard",
            Layout::Polaroid => "polaroid",
        }
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(Layout::Standard),
            "polaroid" => Ok(Layout::Polaroid),
            other => Err(format!("unknown layout: {}", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One image selected by the user
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Form submitted to [`UPLOAD_PATH`]
#[derive(Debug, Clone, PartialEq)]
pub struct UploadRequest {
    pub images: Vec<ImageFile>,
    /// Edge length of each printed image, in centimetres
    pub size_cm: f64,
    pub layout: Layout,
    /// Ask for a JSON preview instead of a PDF attachment
    pub preview: bool,
}

impl UploadRequest {
    /// Preview request with the default size and layout
    pub fn new(images: Vec<ImageFile>) -> Self {
        Self {
            images,
            size_cm: DEFAULT_SIZE_CM,
            layout: Layout::Standard,
            preview: true,
        }
    }

    pub fn with_size(mut self, size_cm: f64) -> Self {
        self.size_cm = size_cm;
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Parts of the multipart form, in submission order: one
    /// [`IMAGES_FIELD`] part per image, then the text fields.
    pub fn parts(&self) -> Vec<FormPart<'_>> {
        let mut parts: Vec<FormPart<'_>> = self
            .images
            .iter()
            .map(|image| FormPart::File {
                name: IMAGES_FIELD,
                image,
            })
            .collect();
        parts.push(FormPart::Text {
            name: "size",
            value: self.size_cm.to_string(),
        });
        parts.push(FormPart::Text {
            name: "layout",
            value: self.layout.to_string(),
        });
        parts.push(FormPart::Text {
            name: "preview",
            value: self.preview.to_string(),
        });
        parts
    }
}

/// One part of the upload form
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart<'a> {
    Text { name: &'static str, value: String },
    File { name: &'static str, image: &'a ImageFile },
}

impl FormPart<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            FormPart::Text { name, .. } | FormPart::File { name, .. } => *name,
        }
    }
}

/// Grid the backend laid the images out on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridInfo {
    pub cols: u32,
    pub rows: u32,
    pub layout: Layout,
}

/// JSON answer to a preview upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    /// Base64-encoded PDF document
    pub pdf_data: String,
    pub filename: String,
    /// PDF size in bytes
    pub size: u64,
    pub image_count: u32,
    pub grid_info: GridInfo,
}

impl UploadResponse {
    /// Decode a response body. Non-2xx answers carry a plain-text error.
    pub fn parse(status: u16, body: &[u8]) -> Result<Self, ContractError> {
        if !(200..300).contains(&status) {
            return Err(ContractError::Rejected {
                status,
                message: String::from_utf8_lossy(body).trim().to_string(),
            });
        }
        Ok(serde_json::from_slice(body)?)
    }

    /// The PDF bytes
    pub fn decode_pdf(&self) -> Result<Vec<u8>, ContractError> {
        Ok(base64::engine::general_purpose::STANDARD.decode(&self.pdf_data)?)
    }
}

/// JSON answer to [`HEALTH_PATH`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
