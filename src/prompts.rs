//! Extraction prompts for reading blood-pressure monitor displays.
//!
//! Every prompt lives here so that:
//!
//! 1. **One place to edit**: the schema the model is asked for is defined
//!    exactly once per variant.
//!
//! 2. **Testability**: prompts are plain constants, so tests can assert
//!    their content and stability without calling a model.
//!
//! The text is fixed. Nothing about a request other than the [`Variant`]
//! influences what the model is asked.

use crate::config::Variant;

/// Prompt for a single monitor photo.
///
/// Requested keys: `systolic`, `diastolic`, `pulse`, `summary`.
pub const SINGLE_READING_PROMPT: &str = "Analyze the attached image of a digital blood pressure monitor. \
Extract the following three key values from the display:\
1. **Systolic**: The upper blood pressure reading (usually the larger number).\
2. **Diastolic**: The lower blood pressure reading (usually the smaller number).\
3. **Pulse**: The heart rate reading, typically labeled as Pulse or represented by a heart symbol.\
High level summary for a non-medical person, easy to understand in one sentence, \
followed by another sentence with a recommendation on what to do next, if any\
Provide the results in a JSON object with the following keys: systolic, diastolic, pulse, summary";

/// Prompt for several monitor photos analysed together.
///
/// Requested keys: `readings` (one `{systolic, diastolic, pulse}` object per
/// image, in upload order) and `summary`.
pub const MULTI_READING_PROMPT: &str = "Analyze the attached images of digital blood pressure monitors. \
For each image, extract the following three key values from the display:\
1. **Systolic**: The upper blood pressure reading (usually the larger number).\
2. **Diastolic**: The lower blood pressure reading (usually the smaller number).\
3. **Pulse**: The heart rate reading, typically labeled as Pulse or represented by a heart symbol.\
Provide a high-level summary for a non-medical person, easy to understand in one sentence, \
followed by another sentence with a recommendation on what to do next, if any.\
Provide the results in a JSON object with the following keys: readings \
(an array of objects, each containing systolic, diastolic, pulse for each image), summary";

/// System instruction for providers without a native JSON response mode.
pub const JSON_ONLY_INSTRUCTION: &str = "Respond with a single JSON object and nothing else. \
Do not wrap it in markdown fences and do not add commentary.";

/// Top-level keys of the single-reading schema.
pub const SINGLE_OUTPUT_KEYS: &[&str] = &["systolic", "diastolic", "pulse", "summary"];

/// Top-level keys of the multi-reading schema.
pub const MULTI_OUTPUT_KEYS: &[&str] = &["readings", "summary"];

/// Keys of each object inside `readings`.
pub const READING_KEYS: &[&str] = &["systolic", "diastolic", "pulse"];

/// The instruction sent to the model plus the schema it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptSpec {
    pub variant: Variant,
    pub text: &'static str,
    pub output_keys: &'static [&'static str],
}

impl PromptSpec {
    /// Prompt for an explicit variant.
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Single => Self {
                variant,
                text: SINGLE_READING_PROMPT,
                output_keys: SINGLE_OUTPUT_KEYS,
            },
            Variant::Multi => Self {
                variant,
                text: MULTI_READING_PROMPT,
                output_keys: MULTI_OUTPUT_KEYS,
            },
        }
    }

    /// Prompt chosen by image count: one image reads as single, more as multi.
    pub fn for_images(count: usize) -> Self {
        if count > 1 {
            Self::for_variant(Variant::Multi)
        } else {
            Self::for_variant(Variant::Single)
        }
    }
}
