pub mod encoder;
pub mod validator;

use crate::config::CompressionConfig;

pub use encoder::{EncodedImage, EncodingError};
pub use validator::{ValidationError, validate_image_file};

/// A file picked or captured by the user, before validation.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Turns an accepted upload into its inline form, recompressing it first
/// when `compression` is set.
pub fn encode_upload(
    file: &ImageFile,
    compression: Option<CompressionConfig>,
) -> Result<EncodedImage, EncodingError> {
    match compression {
        Some(c) => encoder::compress_image(&file.data, c.max_width, c.quality),
        None => EncodedImage::from_bytes(&file.mime_type, &file.data),
    }
}
