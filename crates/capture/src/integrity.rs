//! JPEG integrity check for saved snapshots.
//!
//! The stream must end in an EOI marker and decode in strict mode. A body cut
//! short by a dropped connection fails one of the two.
use std::error::Error;
use std::io::{BufRead, Read, Seek};

use image::error::{DecodingError, ImageFormatHint};
use image::{ImageError, ImageFormat};
use zune_core::options::DecoderOptions;
use zune_jpeg::JpegDecoder;

/// End-of-image marker.
const EOI: [u8; 2] = [0xFF, 0xD9];

/// Fully decode `reader` as a JPEG and throw the pixels away.
///
/// Only decodability matters. Truncated streams, other formats, and corrupt
/// markers all come back as [`ImageError::Decoding`]; a failed read comes
/// back as [`ImageError::IoError`].
pub fn verify_image<R: BufRead + Seek>(mut reader: R) -> Result<(), ImageError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    if !ends_with_eoi(&bytes) {
        return Err(decoding("missing end-of-image marker"));
    }

    let options = DecoderOptions::default().set_strict_mode(true);
    let mut decoder = JpegDecoder::new_with_options(bytes.as_slice(), options);
    decoder
        .decode()
        .map(drop)
        .map_err(decoding)
}

/// Trailing NUL or whitespace padding after EOI is tolerated.
fn ends_with_eoi(bytes: &[u8]) -> bool {
    let end = bytes
        .iter()
        .rposition(|&b| b != 0 && !b.is_ascii_whitespace())
        .map_or(0, |i| i + 1);
    bytes[..end].ends_with(&EOI)
}

fn decoding(err: impl Into<Box<dyn Error + Send + Sync>>) -> ImageError {
    ImageError::Decoding(DecodingError::new(
        ImageFormatHint::Exact(ImageFormat::Jpeg),
        err,
    ))
}

#[cfg(test)]
pub(crate) fn sample_jpeg(width: u32, height: u32) -> Vec<u8> {
    use std::io::Cursor;

    let img = image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x * 20) as u8, (y * 20) as u8, ((x ^ y) * 7) as u8])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Jpeg)
        .expect("encoding a small RGB image cannot fail");
    out.into_inner()
}
