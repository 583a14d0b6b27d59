use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageResult};

/// Limits the browser form applies before submitting a photo.
#[derive(Debug, Clone, Copy)]
pub struct CompressionOptions {
    pub max_bytes: usize,
    pub max_edge: u32,
    pub initial_quality: u8,
    pub min_quality: u8,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_bytes: 1024 * 1024,
            max_edge: 1920,
            initial_quality: 80,
            min_quality: 40,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Compressed {
    /// Already within limits; send the original bytes.
    Original,
    /// Re-encoded JPEG.
    Jpeg(Vec<u8>),
}

/// Shrinks a photo so its longest edge and byte size fit `options`.
///
/// Quality steps down by 10 from `initial_quality` until the JPEG fits or
/// `min_quality` is reached; the last attempt is returned either way.
pub fn compress_image(data: &[u8], options: &CompressionOptions) -> ImageResult<Compressed> {
    let img = image::load_from_memory(data)?;
    let (width, height) = img.dimensions();
    let oversized = width.max(height) > options.max_edge;

    if !oversized && data.len() <= options.max_bytes {
        return Ok(Compressed::Original);
    }

    let img = if oversized {
        img.resize(options.max_edge, options.max_edge, FilterType::Triangle)
    } else {
        img
    };

    let mut quality = options.initial_quality;
    loop {
        let encoded = encode_jpeg(&img, quality)?;
        if encoded.len() <= options.max_bytes || quality <= options.min_quality {
            tracing::debug!(
                "Compressed image: {}x{} -> {}x{}, {} -> {} bytes, quality={}",
                width,
                height,
                img.width(),
                img.height(),
                data.len(),
                encoded.len(),
                quality
            );
            return Ok(Compressed::Jpeg(encoded));
        }
        quality = quality.saturating_sub(10).max(options.min_quality);
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> ImageResult<Vec<u8>> {
    let rgb = img.to_rgb8();
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode(
        rgb.as_raw(),
        rgb.width(),
        rgb.height(),
        ColorType::Rgb8,
    )?;
    Ok(out)
}
