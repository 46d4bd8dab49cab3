//! Default canvas compositor: two JPEGs side by side on a white canvas.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

use crate::config::CanvasConfig;
use crate::error::{Error, Result};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);

/// Compose `left` and `right` into one JPEG.
///
/// Each image is scaled to cover its half of the canvas and center-cropped,
/// then the canvas is encoded as a baseline JPEG at `quality` (1-100).
pub fn compose_side_by_side(
    left: &[u8],
    right: &[u8],
    canvas: &CanvasConfig,
    quality: u8,
) -> Result<Vec<u8>> {
    let half_w = canvas.half_width();
    if half_w == 0 || canvas.height == 0 {
        return Err(Error::Compose(format!(
            "canvas {}x{} has no room for the images",
            canvas.width, canvas.height
        )));
    }

    let mut out = RgbImage::from_pixel(canvas.width, canvas.height, BACKGROUND);
    for (bytes, x) in [(left, 0), (right, canvas.right_x())] {
        let half = decode(bytes)?
            .resize_to_fill(half_w, canvas.height, FilterType::Triangle)
            .to_rgb8();
        imageops::overlay(&mut out, &half, i64::from(x), 0);
    }

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode_image(&out)
        .map_err(|e| Error::Compose(format!("JPEG encoding failed: {e}")))?;
    log::debug!(
        "Composed {}x{} canvas, {} bytes",
        canvas.width,
        canvas.height,
        buf.len()
    );
    Ok(buf)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| Error::Compose(format!("failed to decode source image: {e}")))
}
