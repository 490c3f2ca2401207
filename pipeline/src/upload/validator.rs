use shared::{ApiError, ErrorKind};
use thiserror::Error;

pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;
pub const ALLOWED_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose a JPG, JPEG or PNG image")]
    UnsupportedType(String),
    #[error("The image must not be larger than 5MB")]
    TooLarge(u64),
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::new(ErrorKind::Validation, err.to_string())
    }
}

/// Checks a candidate file's declared MIME type and byte size. The type is
/// checked first, so an unsupported file is never reported as too large.
pub fn validate_image_file(mime_type: &str, size: u64) -> Result<(), ValidationError> {
    if !ALLOWED_TYPES.contains(&mime_type) {
        return Err(ValidationError::UnsupportedType(mime_type.to_string()));
    }

    if size > MAX_FILE_SIZE {
        return Err(ValidationError::TooLarge(size));
    }

    Ok(())
}
