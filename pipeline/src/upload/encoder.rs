use base64::{Engine as _, engine::general_purpose::STANDARD};
use image::{DynamicImage, codecs::jpeg::JpegEncoder, imageops::FilterType};
use sha2::{Digest, Sha256};
use shared::{ApiError, ErrorKind};
use thiserror::Error;

const DATA_URI_MARKER: &str = ";base64,";

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Could not read the image file")]
    Empty,
    #[error("Could not process the image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Could not re-encode the image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("Quality must be between 0 and 1, got {0}")]
    InvalidQuality(f32),
    #[error("Maximum width must be greater than zero")]
    InvalidMaxWidth,
    #[error("Not an inline base64 image")]
    NotInline,
    #[error("Inline image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl From<&EncodingError> for ApiError {
    fn from(err: &EncodingError) -> Self {
        ApiError::new(ErrorKind::Encoding, err.to_string())
    }
}

impl From<EncodingError> for ApiError {
    fn from(err: EncodingError) -> Self {
        ApiError::from(&err)
    }
}

/// Self-contained `data:<mime>;base64,<payload>` form of an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    data_uri: String,
}

impl EncodedImage {
    /// Embeds the bytes as-is; no decoding or resizing happens here.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Result<Self, EncodingError> {
        if bytes.is_empty() {
            return Err(EncodingError::Empty);
        }
        Ok(Self {
            data_uri: format!("data:{}{}{}", mime_type, DATA_URI_MARKER, STANDARD.encode(bytes)),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.data_uri
    }

    pub fn mime_type(&self) -> Option<&str> {
        let rest = self.data_uri.strip_prefix("data:")?;
        rest.split_once(DATA_URI_MARKER).map(|(mime, _)| mime)
    }

    /// Recovers the embedded bytes from the payload.
    pub fn decode(&self) -> Result<Vec<u8>, EncodingError> {
        let (_, payload) = self
            .data_uri
            .split_once(DATA_URI_MARKER)
            .ok_or(EncodingError::NotInline)?;
        Ok(STANDARD.decode(payload)?)
    }

    /// Short SHA-256 of the inline string, used to tell uploads apart in logs.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.data_uri.as_bytes());
        let digest = hex::encode(hasher.finalize());
        digest[..12].to_string()
    }
}

/// Target size for an image bounded by `max_width` on both sides. One scale
/// factor is applied to width and height; images already inside the bound
/// keep their size.
pub fn scaled_dimensions(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }

    let max = f64::from(max_width);
    let ratio = (max / f64::from(width)).min(max / f64::from(height));
    if ratio >= 1.0 {
        return (width, height);
    }

    let scale = |side: u32| ((f64::from(side) * ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

fn jpeg_quality(quality: f32) -> Result<u8, EncodingError> {
    if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
        return Err(EncodingError::InvalidQuality(quality));
    }
    Ok(((quality * 100.0).round() as u8).max(1))
}

/// Downsizes an image to fit `max_width` and re-encodes it as JPEG.
pub fn compress_image(
    bytes: &[u8],
    max_width: u32,
    quality: f32,
) -> Result<EncodedImage, EncodingError> {
    if max_width == 0 {
        return Err(EncodingError::InvalidMaxWidth);
    }
    let jpeg_quality = jpeg_quality(quality)?;

    let img = image::load_from_memory(bytes).map_err(EncodingError::Decode)?;
    let (width, height) = (img.width(), img.height());
    let (new_width, new_height) = scaled_dimensions(width, height, max_width);

    let img = if (new_width, new_height) != (width, height) {
        img.resize_exact(new_width, new_height, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buffer = Vec::new();
    rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, jpeg_quality))
        .map_err(EncodingError::Encode)?;

    log::debug!(
        "Compressed image {}x{} -> {}x{} ({} bytes)",
        width,
        height,
        new_width,
        new_height,
        buffer.len()
    );

    EncodedImage::from_bytes("image/jpeg", &buffer)
}
