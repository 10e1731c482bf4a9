//! Error types for image handling.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// The bytes are not a PNG, JPEG or GIF image.
    #[error("Unsupported image format")]
    UnsupportedFormat,

    /// The format was recognised but decoding failed.
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// Re-encoding a downscaled image failed.
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    /// A `data:` URI without a base64 image payload.
    #[error("Malformed data URI: {0}")]
    DataUri(String),

    /// An image URL could not be fetched by the host.
    #[error("Failed to load image `{url}`: {reason}")]
    Load { url: String, reason: String },
}
