//! # Image Loading and Decoding
//!
//! Two kinds of raster pass through here:
//!
//! - **Signatures** keep their colour. They are decoded to RGB with a
//!   separate alpha channel for SMask transparency, so the white pad
//!   background does not hide the form line underneath.
//! - **Receipt images** are turned upright from their EXIF orientation,
//!   flattened to grayscale and re-encoded as a single-channel JPEG. This
//!   exists purely to shrink the output; colour is discarded for good.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageEncoder, Luma, RgbaImage};

/// Default JPEG quality for re-encoded receipts.
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

/// A fully decoded/loaded image ready for PDF embedding.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone)]
pub enum ImagePixelData {
    /// Single-channel JPEG, embedded as-is with DCTDecode and DeviceGray.
    GrayJpeg { data: Vec<u8> },
    /// Decoded RGB pixels + optional alpha channel.
    Decoded {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// Decode the body of a `data:image/...;base64,` URL.
pub fn read_data_url(url: &str) -> Result<Vec<u8>, String> {
    let body = url
        .strip_prefix("data:image/")
        .ok_or_else(|| "Invalid data URI: expected data:image/ prefix".to_string())?;
    let (_, payload) = body
        .split_once(',')
        .ok_or_else(|| "Invalid data URI: missing comma".to_string())?;

    use base64::Engine;
    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| format!("Base64 decode error: {}", e))
}

/// Decode a signature raster (PNG from a drawing pad, or a JPEG/WebP
/// upload) into RGB plus alpha.
pub fn decode_signature(data: &[u8]) -> Result<LoadedImage, String> {
    let img = image::load_from_memory(data).map_err(|e| format!("Failed to decode signature image: {}", e))?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    let (rgb, alpha) = split_alpha(&rgba);

    Ok(LoadedImage {
        pixel_data: ImagePixelData::Decoded { rgb, alpha },
        width_px: width,
        height_px: height,
    })
}

fn split_alpha(rgba: &RgbaImage) -> (Vec<u8>, Option<Vec<u8>>) {
    let pixel_count = (rgba.width() * rgba.height()) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        alpha.push(pixel[3]);
        if pixel[3] != 255 {
            has_transparency = true;
        }
    }

    (rgb, has_transparency.then_some(alpha))
}

/// EXIF Orientation (tag 0x0112) of an encoded image, 1 when absent.
pub fn exif_orientation(data: &[u8]) -> u32 {
    let mut cursor = Cursor::new(data);
    let Ok(exif) = exif::Reader::new().read_from_container(&mut cursor) else {
        return 1;
    };
    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|f| f.value.get_uint(0))
        .unwrap_or(1)
}

/// Rotate or mirror `img` so an image tagged with `orientation` displays
/// upright. Unknown values leave it untouched.
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// ITU-R BT.601 luma of one pixel, rounded.
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let gray = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    gray.round().clamp(0.0, 255.0) as u8
}

/// Flatten to one luma channel. Alpha is dropped.
pub fn to_luma(img: &RgbaImage) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let p = img.get_pixel(x, y);
        Luma([luminance(p[0], p[1], p[2])])
    })
}

/// Decode any supported receipt image, turn it upright, flatten it to
/// grayscale and re-encode it as a JPEG at `quality`.
pub fn grayscale_jpeg(data: &[u8], quality: u8) -> Result<LoadedImage, String> {
    let img = image::load_from_memory(data).map_err(|e| format!("Failed to decode image: {}", e))?;
    let img = apply_orientation(img, exif_orientation(data));
    let gray = to_luma(&img.to_rgba8());
    let (width, height) = gray.dimensions();

    let mut buf = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder
        .write_image(gray.as_raw(), width, height, image::ColorType::L8)
        .map_err(|e| format!("Failed to encode JPEG: {}", e))?;

    Ok(LoadedImage {
        pixel_data: ImagePixelData::GrayJpeg { data: buf },
        width_px: width,
        height_px: height,
    })
}
