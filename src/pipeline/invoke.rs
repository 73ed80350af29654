//! Model invocation: one validated request in, one raw model answer out.
//!
//! Images are encoded in request order and sent after the prompt in that
//! same order, so `readings[i]` in a multi answer refers to the i-th
//! accepted upload. Model errors propagate unchanged; there is no retry.

use crate::error::AnalyzeError;
use crate::model::{ModelResponse, VisionModel};
use crate::pipeline::encode::encode_image;
use crate::prompts::PromptSpec;
use crate::upload::AnalysisRequest;
use edgequake_llm::ImageData;
use std::time::Instant;
use tracing::info;

/// Encode the request's images and call the model exactly once.
pub async fn invoke(
    model: &dyn VisionModel,
    request: &AnalysisRequest,
) -> Result<ModelResponse, AnalyzeError> {
    let spec = PromptSpec::for_variant(request.variant());
    let images = request
        .images()
        .iter()
        .map(|upload| encode_image(&upload.image))
        .collect::<Result<Vec<ImageData>, _>>()?;

    let start = Instant::now();
    let response = model.generate_json(spec.text, &images).await?;
    info!(
        "{} answered {} {} image(s) in {}ms ({} chars)",
        model.name(),
        spec.variant,
        images.len(),
        start.elapsed().as_millis(),
        response.text.len()
    );
    Ok(response)
}
