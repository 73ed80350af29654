//! Request-scoped upload types.
//!
//! ```text
//! Upload ──validate──▶ UploadedImage ──collect──▶ AnalysisRequest
//! (name + raw bytes)    (decoded image)             (≥ 1 image, upload order)
//! ```
//!
//! All three live only as long as the request that created them. Nothing
//! is written to disk and nothing outlives the response.

use crate::config::Variant;
use crate::error::AnalyzeError;
use image::DynamicImage;
use std::path::Path;

/// A candidate file exactly as it arrived: filename plus raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a local file, keeping only its file name (not the directory).
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalyzeError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AnalyzeError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { filename, bytes })
    }
}

/// An upload that passed validation and decoded cleanly.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    /// Lower-cased extension, one of png, jpg, jpeg, gif.
    pub extension: String,
    pub image: DynamicImage,
}

/// The images of one request, in upload order. Never empty.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    variant: Variant,
    images: Vec<UploadedImage>,
}

impl AnalysisRequest {
    /// Returns `None` when `images` is empty; such a request must not reach
    /// the model.
    pub fn new(variant: Variant, images: Vec<UploadedImage>) -> Option<Self> {
        if images.is_empty() {
            None
        } else {
            Some(Self { variant, images })
        }
    }

    /// A single-image request; cannot be empty.
    pub fn single(image: UploadedImage) -> Self {
        Self {
            variant: Variant::Single,
            images: vec![image],
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn images(&self) -> &[UploadedImage] {
        &self.images
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
