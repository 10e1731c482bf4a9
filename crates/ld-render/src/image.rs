//! Image decoding for image entities and user uploads.
//!
//! Only PNG, JPEG and GIF are accepted. Uploads are downscaled so their
//! longer side fits [`MAX_IMPORTED_IMAGE_SIDE`] and stored as base64 data
//! URIs, so an exported session never depends on a local file.

use crate::error::RenderError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};
use peniko::Blob;
use std::fmt;
use std::io::Cursor;

/// Longest side, in pixels, of an uploaded image after import.
pub const MAX_IMPORTED_IMAGE_SIDE: u32 = 400;

/// Decoded RGBA8 pixels, cheap to clone.
#[derive(Clone)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pixels: Blob<u8>,
}

impl Bitmap {
    /// Wrap straight RGBA8 pixel data (`width * height * 4` bytes).
    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels: Blob::from(data),
        }
    }

    fn from_dynamic(img: &DynamicImage) -> Self {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn pixels(&self) -> &[u8] {
        self.pixels.data()
    }

    /// A Vello-ready image sharing this bitmap's pixel blob.
    pub fn to_image(&self) -> peniko::Image {
        peniko::Image::new(
            self.pixels.clone(),
            peniko::ImageFormat::Rgba8,
            self.width,
            self.height,
        )
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap({}×{})", self.width, self.height)
    }
}

/// The accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    /// Detect the format from magic bytes.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match image::guess_format(data).ok()? {
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Gif => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }

    fn format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Gif => ImageFormat::Gif,
        }
    }
}

/// Decode PNG, JPEG or GIF bytes into a bitmap.
pub fn decode(data: &[u8]) -> Result<Bitmap, RenderError> {
    let kind = ImageKind::sniff(data).ok_or(RenderError::UnsupportedFormat)?;
    let img = image::load_from_memory_with_format(data, kind.format())?;
    Ok(Bitmap::from_dynamic(&img))
}

/// Decode a `data:<mime>;base64,<payload>` URI.
pub fn decode_data_uri(uri: &str) -> Result<Bitmap, RenderError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::DataUri("missing `data:` prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::DataUri("missing comma".into()))?;
    if !meta.ends_with(";base64") {
        return Err(RenderError::DataUri("payload is not base64".into()));
    }
    let bytes = STANDARD
        .decode(payload)
        .map_err(|e| RenderError::DataUri(e.to_string()))?;
    decode(&bytes)
}

pub fn data_uri(mime: &str, data: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(data))
}

/// Size after fitting the longer side within `max_side`, preserving aspect
/// ratio. Images already small enough are left alone.
pub fn fit_within(width: u32, height: u32, max_side: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_side {
        return (width, height);
    }
    let scale = max_side as f64 / longest as f64;
    let w = (width as f64 * scale).round().max(1.0) as u32;
    let h = (height as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// An upload ready to become an image entity.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub bitmap: Bitmap,
    pub data_uri: String,
}

/// Validate, decode and downscale an uploaded file.
///
/// Images that need no downscaling keep their original bytes; downscaled
/// ones are re-encoded as PNG.
pub fn prepare_upload(data: &[u8]) -> Result<PreparedImage, RenderError> {
    let kind = ImageKind::sniff(data).ok_or(RenderError::UnsupportedFormat)?;
    let img = image::load_from_memory_with_format(data, kind.format())?;
    let (w, h) = fit_within(img.width(), img.height(), MAX_IMPORTED_IMAGE_SIDE);

    if (w, h) == (img.width(), img.height()) {
        return Ok(PreparedImage {
            bitmap: Bitmap::from_dynamic(&img),
            data_uri: data_uri(kind.mime(), data),
        });
    }

    log::debug!(
        "downscaling upload {}×{} → {w}×{h}",
        img.width(),
        img.height()
    );
    let resized = img.resize_exact(w, h, FilterType::Triangle);
    let mut out = Cursor::new(Vec::new());
    resized
        .write_to(&mut out, ImageFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(PreparedImage {
        bitmap: Bitmap::from_dynamic(&resized),
        data_uri: data_uri(ImageKind::Png.mime(), &out.into_inner()),
    })
}
