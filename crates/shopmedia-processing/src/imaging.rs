//! Image decoding, metadata extraction and variant rendering.
//!
//! Rendering is synchronous and CPU-bound; the local backend drives it once
//! per variant spec. Failures here are per-variant: a spec that fails to
//! render is skipped by the caller, it never aborts the upload.

use std::io::Cursor;

use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};

use shopmedia_core::{AssetMetadata, VariantSpec};

/// Decode image bytes, guessing the format from content.
pub fn decode_image(data: &[u8]) -> Result<(DynamicImage, ImageFormat), anyhow::Error> {
    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader
        .format()
        .ok_or_else(|| anyhow::anyhow!("unrecognized image format"))?;
    let img = reader.decode()?;
    Ok((img, format))
}

/// Extract best-effort metadata from image bytes.
///
/// On decode failure only the byte length is reported; nothing is fabricated.
pub fn extract_metadata(data: &[u8]) -> AssetMetadata {
    match decode_image(data) {
        Ok((img, format)) => {
            let (width, height) = img.dimensions();
            AssetMetadata {
                format: Some(format!("{:?}", format).to_lowercase()),
                width: Some(width),
                height: Some(height),
                bytes: Some(data.len() as u64),
            }
        }
        Err(err) => {
            tracing::debug!(error = %err, "Metadata extraction failed, reporting size only");
            AssetMetadata {
                format: None,
                width: None,
                height: None,
                bytes: Some(data.len() as u64),
            }
        }
    }
}

/// Render one derived variant: aspect-preserving resize into the spec's
/// bounding box, re-encoded in the original's format. The quality knob only
/// applies to JPEG output; other formats use their default encoders.
pub fn render_variant(
    img: &DynamicImage,
    spec: &VariantSpec,
    format: ImageFormat,
) -> Result<Bytes, anyhow::Error> {
    let resized = img.resize(spec.width, spec.height, FilterType::Lanczos3);

    let (width, height) = resized.dimensions();
    let estimated_size = (width * height * 3) as usize;
    let mut buffer = Vec::with_capacity(estimated_size);
    let mut cursor = Cursor::new(&mut buffer);

    match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel; flatten before encoding.
            let encoder = JpegEncoder::new_with_quality(&mut cursor, spec.quality);
            resized.to_rgb8().write_with_encoder(encoder)?;
        }
        other => {
            resized.write_to(&mut cursor, other)?;
        }
    }

    Ok(Bytes::from(buffer))
}
