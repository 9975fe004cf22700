//! Encoding of uncompressed RGBA8 images.
//!
//! The encoder writes the smallest TIFF that a baseline reader understands: a header, one
//! directory and a single strip holding the samples verbatim.
//!
//! ```
//! use tiff_rgba::encoder::{encode, EncoderOptions};
//!
//! let pixels = [255u8, 0, 0, 255, 0, 0, 255, 128];
//! let file = encode(&pixels, 2, 1, &EncoderOptions::default()).unwrap();
//!
//! let image = tiff_rgba::decoder::decode_rgba(&file).unwrap();
//! assert_eq!(image.data, pixels);
//! ```
use std::io::Write;

use crate::{
    error::{TiffError, TiffResult, UsageError},
    tags::{
        ByteOrder, CompressionMethod, ExtraSamples, PhotometricInterpretation,
        PlanarConfiguration, Tag,
    },
};

mod directory_encoder;
mod tiff_value;
mod writer;

pub use self::directory_encoder::DirectoryEncoder;
pub use self::tiff_value::TiffValue;
pub use self::writer::TiffWriter;

/// Position of the only directory, right after the header.
const FIRST_IFD_OFFSET: u32 = 8;

/// Options of the encoder.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Byte order of the written file, little endian unless set.
    pub byte_order: ByteOrder,
}

/// Encoder for RGBA8 images.
///
/// # Examples
/// ```
/// use tiff_rgba::encoder::TiffEncoder;
///
/// let image_data = vec![0u8; 100 * 100 * 4];
///
/// let encoder = TiffEncoder::new(Vec::new());
/// let file = encoder.write_image(100, 100, &image_data).unwrap();
/// assert_eq!(&file[..2], b"II");
/// ```
pub struct TiffEncoder<W> {
    writer: TiffWriter<W>,
}

impl<W: Write> TiffEncoder<W> {
    pub fn new(writer: W) -> TiffEncoder<W> {
        TiffEncoder::new_with_options(writer, EncoderOptions::default())
    }

    pub fn new_with_options(writer: W, options: EncoderOptions) -> TiffEncoder<W> {
        TiffEncoder {
            writer: TiffWriter::new(writer, options.byte_order),
        }
    }

    /// Convenience function to write an entire image from memory.
    ///
    /// `data` holds `width * height` pixels of four samples each, row by row. Returns the
    /// underlying writer once the file is complete.
    pub fn write_image(mut self, width: u32, height: u32, data: &[u8]) -> TiffResult<W> {
        if width == 0 || height == 0 {
            return Err(TiffError::UsageError(UsageError::EmptyImage { width, height }));
        }

        let expected = u64::from(width)
            .checked_mul(u64::from(height))
            .and_then(|pixels| pixels.checked_mul(4))
            .ok_or(TiffError::LimitsExceeded)?;
        if expected != data.len() as u64 {
            return Err(TiffError::UsageError(UsageError::BufferSizeMismatch {
                expected: usize::try_from(expected).unwrap_or(usize::MAX),
                found: data.len(),
            }));
        }
        let strip_byte_count = u32::try_from(expected).map_err(|_| TiffError::LimitsExceeded)?;

        let byte_order = self.writer.byte_order();
        let mut ifd = DirectoryEncoder::new(byte_order);
        ifd.write_tag(Tag::ImageWidth, &width)?;
        ifd.write_tag(Tag::ImageLength, &height)?;
        ifd.write_tag(Tag::BitsPerSample, &[8u16, 8, 8, 8][..])?;
        ifd.write_tag(Tag::Compression, &CompressionMethod::None.to_u16())?;
        ifd.write_tag(
            Tag::PhotometricInterpretation,
            &PhotometricInterpretation::RGB.to_u16(),
        )?;
        // The real offset depends on the size of the directory, which does not depend on it.
        ifd.write_tag(Tag::StripOffsets, &0u32)?;
        ifd.write_tag(Tag::SamplesPerPixel, &4u16)?;
        ifd.write_tag(Tag::RowsPerStrip, &height)?;
        ifd.write_tag(Tag::StripByteCounts, &strip_byte_count)?;
        ifd.write_tag(
            Tag::PlanarConfiguration,
            &PlanarConfiguration::Chunky.to_u16(),
        )?;
        ifd.write_tag(
            Tag::ExtraSamples,
            &ExtraSamples::UnassociatedAlpha.to_u16(),
        )?;

        let strip_offset = u64::from(FIRST_IFD_OFFSET) + ifd.encoded_len();
        let strip_offset = u32::try_from(strip_offset).map_err(|_| TiffError::LimitsExceeded)?;
        if strip_offset.checked_add(strip_byte_count).is_none() {
            return Err(TiffError::LimitsExceeded);
        }
        ifd.write_tag(Tag::StripOffsets, &strip_offset)?;

        tracing::debug!(
            "Encoding {width}x{height} RGBA8 image, {byte_order:?}, strip at {strip_offset}"
        );

        self.writer.write_header(FIRST_IFD_OFFSET)?;
        ifd.write(&mut self.writer)?;
        debug_assert_eq!(self.writer.offset(), u64::from(strip_offset));
        self.writer.write_bytes(data)?;

        Ok(self.writer.into_inner())
    }
}

/// Encode an RGBA8 image into a complete TIFF file.
pub fn encode(
    data: &[u8],
    width: u32,
    height: u32,
    options: &EncoderOptions,
) -> TiffResult<Vec<u8>> {
    let capacity = data.len().saturating_add(256);
    TiffEncoder::new_with_options(Vec::with_capacity(capacity), *options)
        .write_image(width, height, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn le_u16(data: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([data[at], data[at + 1]])
    }

    fn le_u32(data: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }

    #[test]
    fn layout_of_a_small_image() {
        let pixels: Vec<u8> = (0..24).collect();
        let file = encode(&pixels, 3, 2, &EncoderOptions::default()).unwrap();

        assert_eq!(&file[..8], b"II\x2a\x00\x08\x00\x00\x00");
        assert_eq!(le_u16(&file, 8), 11);

        let tags: Vec<u16> = (0..11).map(|i| le_u16(&file, 10 + 12 * i)).collect();
        assert_eq!(
            tags,
            [256, 257, 258, 259, 262, 273, 277, 278, 279, 284, 338]
        );

        // BitsPerSample: SHORT x4, out of line after the next directory offset.
        let bps = 10 + 12 * 2;
        assert_eq!(le_u16(&file, bps + 2), 3);
        assert_eq!(le_u32(&file, bps + 4), 4);
        assert_eq!(le_u32(&file, bps + 8), 146);
        assert_eq!(le_u32(&file, 142), 0);
        assert_eq!(&file[146..154], &[8, 0, 8, 0, 8, 0, 8, 0]);

        // StripOffsets and StripByteCounts.
        assert_eq!(le_u32(&file, 10 + 12 * 5 + 8), 154);
        assert_eq!(le_u32(&file, 10 + 12 * 8 + 8), 24);
        assert_eq!(&file[154..], &pixels[..]);
    }

    #[test]
    fn big_endian_header() {
        let options = EncoderOptions {
            byte_order: ByteOrder::BigEndian,
        };
        let file = encode(&[1, 2, 3, 4], 1, 1, &options).unwrap();

        assert_eq!(&file[..8], b"MM\x00\x2a\x00\x00\x00\x08");
        assert_eq!(&file[8..10], &[0, 11]);
        assert_eq!(file.len(), 158);
    }

    #[test]
    fn usage_errors() {
        let options = EncoderOptions::default();
        assert!(matches!(
            encode(&[], 0, 1, &options),
            Err(TiffError::UsageError(UsageError::EmptyImage {
                width: 0,
                height: 1
            }))
        ));
        assert!(matches!(
            encode(&[0; 7], 1, 2, &options),
            Err(TiffError::UsageError(UsageError::BufferSizeMismatch {
                expected: 8,
                found: 7
            }))
        ));
    }

    #[test]
    fn huge_dimensions_exceed_limits() {
        let options = EncoderOptions::default();
        assert!(matches!(
            encode(&[], u32::MAX, u32::MAX, &options),
            Err(TiffError::LimitsExceeded)
        ));
        // Fits in 64 bits but not in a 32-bit strip byte count.
        assert!(matches!(
            encode(&[], 1 << 16, 1 << 16, &options),
            Err(TiffError::UsageError(UsageError::BufferSizeMismatch { found: 0, .. }))
        ));
    }

    #[test]
    fn writes_into_any_writer() {
        let mut out = Vec::new();
        TiffEncoder::new(&mut out)
            .write_image(1, 1, &[9, 9, 9, 9])
            .unwrap();
        assert_eq!(&out[out.len() - 4..], &[9, 9, 9, 9]);
    }
}
