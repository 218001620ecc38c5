use anyhow::Result;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;

use crate::models::ImagePart;

/// Decodes an uploaded image and re-encodes it as RGB PNG for the model request
pub fn prepare_image(bytes: &[u8]) -> Result<ImagePart> {
    let decoded = image::load_from_memory(bytes)?;
    log::debug!(
        "🖼️ Decoded upload: {}x{} ({} bytes)",
        decoded.width(),
        decoded.height(),
        bytes.len()
    );

    let rgb = DynamicImage::ImageRgb8(decoded.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Png)?;

    Ok(ImagePart {
        mime_type: "image/png".to_string(),
        data: buf.into_inner(),
    })
}
