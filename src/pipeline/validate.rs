//! Upload validation: decide whether a candidate file is an acceptable image.
//!
//! A file is accepted only when all of the following hold:
//!
//! 1. it has a non-empty filename
//! 2. the text after the last `.` is png, jpg, jpeg or gif (any case)
//! 3. its leading bytes identify one of those formats
//! 4. the header parses (structural verify)
//! 5. the full image decodes
//!
//! Steps 3–5 read the same cursor twice. After the header read in step 4
//! the cursor is rewound to byte 0 before decoding; decoding from wherever
//! the verify pass stopped would hand a truncated stream to the decoder.
//!
//! Nothing here returns `Err` or panics: every failure becomes a
//! [`Rejection`] inside [`Validation::Rejected`].

use crate::error::Rejection;
use crate::upload::{Upload, UploadedImage};
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::{Cursor, Seek};
use tracing::debug;

/// Extensions accepted as image uploads (compared lower-cased).
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

const ALLOWED_FORMATS: &[ImageFormat] = &[ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Gif];

/// Outcome of validating one upload.
#[derive(Debug, Clone)]
pub enum Validation {
    Accepted(UploadedImage),
    Rejected(Rejection),
}

impl Validation {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Validation::Accepted(_))
    }
}

/// Validate one upload; see the module docs for the exact checks.
pub fn validate_upload(upload: &Upload) -> Validation {
    let extension = match allowed_extension(&upload.filename) {
        Ok(ext) => ext,
        Err(rejection) => return Validation::Rejected(rejection),
    };

    let mut cursor = Cursor::new(upload.bytes.as_slice());
    match verify_then_decode(&mut cursor, &upload.filename) {
        Ok(image) => {
            debug!(
                "Accepted '{}' ({}x{}, {} bytes)",
                upload.filename,
                image.width(),
                image.height(),
                upload.bytes.len()
            );
            Validation::Accepted(UploadedImage {
                filename: upload.filename.clone(),
                extension,
                image,
            })
        }
        Err(rejection) => Validation::Rejected(rejection),
    }
}

/// Return the lower-cased extension if it is one of [`ALLOWED_EXTENSIONS`].
pub fn allowed_extension(filename: &str) -> Result<String, Rejection> {
    if filename.is_empty() {
        return Err(Rejection::MissingFilename);
    }
    let Some((_, ext)) = filename.rsplit_once('.') else {
        return Err(Rejection::MissingExtension {
            filename: filename.to_string(),
        });
    };
    let ext = ext.to_ascii_lowercase();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(Rejection::UnsupportedExtension {
            filename: filename.to_string(),
            extension: ext,
        })
    }
}

/// Verify the header, rewind, then decode the whole image from the same cursor.
pub fn verify_then_decode<R>(cursor: &mut R, filename: &str) -> Result<DynamicImage, Rejection>
where
    R: std::io::BufRead + Seek,
{
    verify(cursor, filename)?;
    cursor.rewind().map_err(|e| corrupt(filename, e))?;

    ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(|e| corrupt(filename, e))?
        .decode()
        .map_err(|e| corrupt(filename, e))
}

/// Structural check: the magic bytes name an accepted format and the header parses.
fn verify<R>(cursor: &mut R, filename: &str) -> Result<(), Rejection>
where
    R: std::io::BufRead + Seek,
{
    let reader = ImageReader::new(cursor)
        .with_guessed_format()
        .map_err(|e| corrupt(filename, e))?;

    match reader.format() {
        Some(format) if ALLOWED_FORMATS.contains(&format) => {}
        _ => {
            return Err(Rejection::UnrecognisedFormat {
                filename: filename.to_string(),
            })
        }
    }

    let (width, height) = reader.into_dimensions().map_err(|e| corrupt(filename, e))?;
    if width == 0 || height == 0 {
        return Err(Rejection::Corrupt {
            filename: filename.to_string(),
            detail: format!("zero-sized image {width}x{height}"),
        });
    }
    Ok(())
}

fn corrupt(filename: &str, e: impl std::fmt::Display) -> Rejection {
    Rejection::Corrupt {
        filename: filename.to_string(),
        detail: e.to_string(),
    }
}
