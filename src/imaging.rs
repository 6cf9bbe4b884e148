//! Image decode/encode helpers

use crate::error::MemeResult;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use std::io::Write;

/// Decode fetched bytes into a bitmap, guessing the format from its magic bytes
pub fn decode_image(bytes: &[u8]) -> MemeResult<DynamicImage> {
    let image = image::load_from_memory(bytes)?;
    log::debug!("Decoded image {}x{}", image.width(), image.height());
    Ok(image)
}

/// Encode a bitmap as PNG into any writer
pub fn write_png<W: Write>(image: &DynamicImage, writer: W) -> MemeResult<()> {
    image.write_with_encoder(PngEncoder::new(writer))?;
    Ok(())
}

/// Encode a bitmap as PNG bytes
pub fn encode_png(image: &DynamicImage) -> MemeResult<Vec<u8>> {
    let mut bytes = Vec::new();
    write_png(image, &mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;
    use image::{Rgba, RgbaImage};

    fn checkerboard(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        }))
    }

    #[test]
    fn test_encoded_png_decodes_with_same_dimensions() {
        let source = checkerboard(7, 3);
        let bytes = encode_png(&source).unwrap();

        assert_eq!(&bytes[..4], &[0x89, 0x50, 0x4E, 0x47]);
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 3));
        assert_eq!(decoded.to_rgba8(), source.to_rgba8());
    }

    #[test]
    fn test_decode_garbage_is_decode_failure() {
        let err = decode_image(b"<html>not an image</html>").unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeFailure);
    }

    #[test]
    fn test_decode_empty_is_decode_failure() {
        let err = decode_image(&[]).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeFailure);
    }

    #[test]
    fn test_decode_truncated_png_fails() {
        let bytes = encode_png(&checkerboard(16, 16)).unwrap();
        assert!(decode_image(&bytes[..bytes.len() / 2]).is_err());
    }
}
