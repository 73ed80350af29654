//! Response adapter: the outward JSON envelope.
//!
//! Exactly two shapes exist:
//!
//! ```text
//! {"result": "<model text, verbatim>"}
//! {"error":  "<fixed message>"}
//! ```
//!
//! Client-input problems are reported as an `error` envelope with HTTP 200.
//! Callers detect failure by the presence of the `error` key, not by status.

use crate::model::ModelResponse;
use serde::{Deserialize, Serialize};

pub const NO_FILE_PART: &str = "No file part";
pub const NO_SELECTED_FILE: &str = "No selected file";
pub const INVALID_FILE_TYPE: &str = "Invalid file type";
pub const NO_FILES_UPLOADED: &str = "No files uploaded";
pub const NO_SELECTED_FILES: &str = "No selected files";
pub const NO_VALID_IMAGE_FILES: &str = "No valid image files";

/// The JSON object returned for every handled request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Result { result: String },
    Error { error: String },
}

impl Envelope {
    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Envelope::Error { .. })
    }

    /// Model text if this is a `result` envelope.
    pub fn result_text(&self) -> Option<&str> {
        match self {
            Envelope::Result { result } => Some(result),
            Envelope::Error { .. } => None,
        }
    }
}

impl From<ModelResponse> for Envelope {
    fn from(response: ModelResponse) -> Self {
        Envelope::Result {
            result: response.text,
        }
    }
}
