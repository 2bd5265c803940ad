use crate::error::AppError;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::ImageReader;
use std::io::Cursor;

#[derive(Debug, Clone, Copy)]
pub struct ThumbnailOptions {
    pub size: u32,
    pub quality: u8,
}

impl Default for ThumbnailOptions {
    fn default() -> Self {
        Self {
            size: 200,
            quality: 60,
        }
    }
}

/// Generate a JPEG thumbnail from encoded image bytes.
/// Respects EXIF orientation.
pub fn generate_thumbnail_bytes(data: &[u8], options: ThumbnailOptions) -> Result<Vec<u8>, AppError> {
    let orientation = read_orientation(data);

    let mut img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| AppError::Preview(e.to_string()))?
        .decode()
        .map_err(|e| AppError::Preview(format!("Failed to decode image: {}", e)))?;

    // Cheap pass first for very large scans, then a proper filter to the target box.
    if let Some(intermediate_size) = prescale_box(img.width(), img.height(), options.size) {
        img = img.resize(intermediate_size, intermediate_size, FilterType::Nearest);
    }
    img = img.resize(options.size, options.size, FilterType::Triangle);

    if orientation != 1 {
        img = apply_orientation(img, orientation);
    }

    encode_jpeg_thumbnail(&img, options.quality)
}

/// Box for the nearest-neighbour pass, when the source is big enough to need one.
fn prescale_box(width: u32, height: u32, size: u32) -> Option<u32> {
    let intermediate_size = size.saturating_mul(4);
    let threshold = intermediate_size.saturating_mul(2);
    (width > threshold || height > threshold).then_some(intermediate_size)
}

fn encode_jpeg_thumbnail(img: &image::DynamicImage, quality: u8) -> Result<Vec<u8>, AppError> {
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    // JPEG has no alpha channel.
    image::DynamicImage::ImageRgb8(img.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| AppError::Preview(format!("Failed to encode thumbnail: {}", e)))?;
    Ok(buffer.into_inner())
}

/// EXIF orientation tag, 1 when absent or unreadable.
fn read_orientation(data: &[u8]) -> u32 {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(data)) {
        Ok(e) => e,
        Err(_) => return 1,
    };

    match exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY) {
        Some(field) => match field.value {
            exif::Value::Short(ref v) => *v.first().unwrap_or(&1) as u32,
            exif::Value::Long(ref v) => *v.first().unwrap_or(&1),
            _ => 1,
        },
        None => 1,
    }
}

fn apply_orientation(img: image::DynamicImage, orientation: u32) -> image::DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.fliph().rotate90(),
        6 => img.rotate90(),
        7 => img.fliph().rotate270(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Generate a thumbnail and return it as a base64 data URI.
pub fn generate_thumbnail(data: &[u8], options: ThumbnailOptions) -> Result<String, AppError> {
    let bytes = generate_thumbnail_bytes(data, options)?;
    let b64 = base64::engine::general_purpose::STANDARD.encode(&bytes);
    Ok(format!("data:image/jpeg;base64,{}", b64))
}
