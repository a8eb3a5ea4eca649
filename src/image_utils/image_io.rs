use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{self, DynamicImage, ImageResult, RgbImage};

/// Decodes an uploaded image from memory, sniffing the format from its bytes.
pub fn decode_image(bytes: &[u8]) -> ImageResult<DynamicImage> {
    image::load_from_memory(bytes)
}

/// Resizes any input to the canonical working resolution.
///
/// Aspect ratio is not preserved: every request lands on the same pixel grid so box coordinates
/// and label sizes are comparable across requests.
pub fn resize_to_canonical(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let rgb = image.to_rgb8();
    if rgb.dimensions() == (width, height) {
        return rgb;
    }
    imageops::resize(&rgb, width, height, FilterType::Triangle)
}

pub fn encode_jpeg(image: &RgbImage, quality: u8) -> ImageResult<Vec<u8>> {
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100)).encode_image(image)?;
    Ok(buffer)
}
