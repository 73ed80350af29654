//! Image encoding: `DynamicImage` → base64 PNG wrapped in `ImageData`.
//!
//! Every accepted upload is re-encoded as PNG regardless of whether it
//! arrived as JPEG or GIF. The model then sees one lossless format, the
//! seven-segment digits stay crisp, and only the first frame of an animated
//! GIF is ever sent.

use crate::error::AnalyzeError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a decoded upload as a base64 PNG ready for the model request.
pub fn encode_image(img: &DynamicImage) -> Result<ImageData, AnalyzeError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| AnalyzeError::Encode(e.to_string()))?;

    let b64 = STANDARD.encode(&buf);
    debug!("Encoded image → {} bytes base64", b64.len());

    Ok(ImageData::new(b64, "image/png"))
}
