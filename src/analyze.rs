//! End-to-end analysis pipelines.
//!
//! Both pipelines have the same shape and differ only in how they treat
//! missing fields and rejected files:
//!
//! | Situation | Single (`file`) | Multi (`files[]`) |
//! |-----------|-----------------|-------------------|
//! | field absent | `No file part` | `No files uploaded` |
//! | (first) filename empty | `No selected file` | `No selected files` |
//! | file rejected | `Invalid file type` | file dropped, others continue |
//! | nothing accepted | - | `No valid image files` |
//!
//! Every validation outcome is decided before the model is touched; a
//! request that ends in an `error` envelope never makes a network call.

use crate::config::{AnalyzerConfig, Variant};
use crate::error::AnalyzeError;
use crate::model::{resolve_model, VisionModel};
use crate::pipeline::invoke::invoke;
use crate::pipeline::respond::{
    Envelope, INVALID_FILE_TYPE, NO_FILES_UPLOADED, NO_FILE_PART, NO_SELECTED_FILE,
    NO_SELECTED_FILES, NO_VALID_IMAGE_FILES,
};
use crate::pipeline::validate::{validate_upload, Validation};
use crate::upload::{AnalysisRequest, Upload};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Runs uploads through validation and the model.
///
/// Cheap to clone; the only shared state is the read-only model handle.
#[derive(Clone)]
pub struct Analyzer {
    model: Arc<dyn VisionModel>,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("model", &self.model.name())
            .finish()
    }
}

impl Analyzer {
    pub fn new(model: Arc<dyn VisionModel>) -> Self {
        Self { model }
    }

    /// Resolve the model described by `config` and wrap it.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self, AnalyzeError> {
        Ok(Self::new(resolve_model(config)?))
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Dispatch on `variant`. An empty `uploads` means the field was absent.
    ///
    /// The single pipeline only looks at the first upload.
    pub async fn analyze(
        &self,
        variant: Variant,
        uploads: Vec<Upload>,
    ) -> Result<Envelope, AnalyzeError> {
        match variant {
            Variant::Single => self.analyze_single(uploads.into_iter().next()).await,
            Variant::Multi => {
                let uploads = if uploads.is_empty() { None } else { Some(uploads) };
                self.analyze_multi(uploads).await
            }
        }
    }

    /// Single-image pipeline.
    pub async fn analyze_single(&self, upload: Option<Upload>) -> Result<Envelope, AnalyzeError> {
        let Some(upload) = upload else {
            return Ok(Envelope::error(NO_FILE_PART));
        };
        if upload.filename.is_empty() {
            return Ok(Envelope::error(NO_SELECTED_FILE));
        }

        info!("Analyzing single upload '{}'", upload.filename);
        let image = match validate_upload(&upload) {
            Validation::Accepted(image) => image,
            Validation::Rejected(reason) => {
                debug!("Rejected upload: {}", reason);
                return Ok(Envelope::error(INVALID_FILE_TYPE));
            }
        };
        drop(upload);

        let request = AnalysisRequest::single(image);
        let response = invoke(self.model.as_ref(), &request).await?;
        Ok(Envelope::from(response))
    }

    /// Multi-image pipeline. Rejected files are dropped; order is preserved.
    pub async fn analyze_multi(
        &self,
        uploads: Option<Vec<Upload>>,
    ) -> Result<Envelope, AnalyzeError> {
        let Some(uploads) = uploads else {
            return Ok(Envelope::error(NO_FILES_UPLOADED));
        };
        match uploads.first() {
            None => return Ok(Envelope::error(NO_SELECTED_FILES)),
            Some(first) if first.filename.is_empty() => {
                return Ok(Envelope::error(NO_SELECTED_FILES))
            }
            Some(_) => {}
        }

        info!("Analyzing {} uploads", uploads.len());
        let total = uploads.len();
        let images: Vec<_> = uploads
            .into_iter()
            .filter_map(|upload| match validate_upload(&upload) {
                Validation::Accepted(image) => Some(image),
                Validation::Rejected(reason) => {
                    warn!("Dropping upload: {}", reason);
                    None
                }
            })
            .collect();
        debug!("{}/{} uploads accepted", images.len(), total);

        let Some(request) = AnalysisRequest::new(Variant::Multi, images) else {
            return Ok(Envelope::error(NO_VALID_IMAGE_FILES));
        };
        let response = invoke(self.model.as_ref(), &request).await?;
        Ok(Envelope::from(response))
    }
}
