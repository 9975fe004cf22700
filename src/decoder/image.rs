use super::stream::SmartReader;
use super::Limits;
use crate::directory::Directory;
use crate::tags::{
    CompressionMethod, PhotometricInterpretation, PlanarConfiguration, SampleFormat, Tag,
};
use crate::{ColorType, TiffError, TiffFormatError, TiffResult, TiffUnsupportedError};

/// A materialized image: 8-bit samples in R, G, B, A order, rows top to bottom.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// The layout of the samples in the file.
    pub source: ColorType,
}

impl RgbaImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}

/// Materialize the image described by `dir` from the file in `data`, with default limits.
pub fn materialize(data: &[u8], dir: &Directory) -> TiffResult<RgbaImage> {
    materialize_with_limits(data, dir, &Limits::default())
}

pub fn materialize_with_limits(
    data: &[u8],
    dir: &Directory,
    limits: &Limits,
) -> TiffResult<RgbaImage> {
    expand_strip(&SmartReader::wrap(data, dir.byte_order()), dir, limits)
}

/// Enumerated tags are SHORTs, anything wider can not name a known value.
fn get_u16(dir: &Directory, tag: Tag) -> Option<u16> {
    dir.get_u32(tag).map(|v| u16::try_from(v).unwrap_or(u16::MAX))
}

fn required(dir: &Directory, tag: Tag) -> TiffResult<u32> {
    dir.get_u32(tag)
        .ok_or(TiffError::FormatError(TiffFormatError::RequiredTagNotFound(tag)))
}

/// Validate that the directory describes a layout the strip can be copied from.
fn check_layout(reader: &SmartReader<'_>, dir: &Directory, samples: u32) -> TiffResult<ColorType> {
    if let Some(method) =
        get_u16(dir, Tag::Compression).map(CompressionMethod::from_u16_exhaustive)
    {
        if method != CompressionMethod::None {
            return Err(TiffUnsupportedError::Compression(method).into());
        }
    }

    if dir.contains(Tag::TileWidth)
        || dir.contains(Tag::TileLength)
        || dir.contains(Tag::TileOffsets)
    {
        return Err(TiffUnsupportedError::Tiled.into());
    }

    if let Some(strips) = dir.get(Tag::StripOffsets).map(|e| e.count()) {
        if strips > 1 {
            return Err(TiffUnsupportedError::MultipleStrips(strips).into());
        }
    }

    if let Some(config) =
        get_u16(dir, Tag::PlanarConfiguration).map(PlanarConfiguration::from_u16_exhaustive)
    {
        if config != PlanarConfiguration::Chunky {
            return Err(TiffUnsupportedError::PlanarConfiguration(config).into());
        }
    }

    if let Some(interpretation) =
        get_u16(dir, Tag::PhotometricInterpretation).map(PhotometricInterpretation::from_u16_exhaustive)
    {
        if interpretation != PhotometricInterpretation::RGB {
            return Err(TiffUnsupportedError::Interpretation(interpretation).into());
        }
    }

    if let Some(format) =
        get_u16(dir, Tag::SampleFormat).map(SampleFormat::from_u16_exhaustive)
    {
        if format != SampleFormat::Uint {
            return Err(TiffUnsupportedError::SampleFormat(format).into());
        }
    }

    if !(3..=4).contains(&samples) {
        return Err(TiffUnsupportedError::SamplesPerPixel(samples).into());
    }

    // Without the tag every sample is taken to be a byte.
    if let Some(entry) = dir.get(Tag::BitsPerSample) {
        let bits = entry.resolve_u32_vec(Tag::BitsPerSample, reader)?;
        if bits.is_empty() || bits.iter().any(|&b| b != 8) {
            return Err(TiffUnsupportedError::BitDepth(bits).into());
        }
    }

    Ok(if samples == 3 {
        ColorType::RGB(8)
    } else {
        ColorType::RGBA(8)
    })
}

pub(super) fn expand_strip(
    reader: &SmartReader<'_>,
    dir: &Directory,
    limits: &Limits,
) -> TiffResult<RgbaImage> {
    let width = required(dir, Tag::ImageWidth)?;
    let height = required(dir, Tag::ImageLength)?;
    let strip_offset = required(dir, Tag::StripOffsets)?;
    let samples = dir.get_u32(Tag::SamplesPerPixel).unwrap_or(3);

    let source = check_layout(reader, dir, samples)?;

    let pixels = u64::from(width) * u64::from(height);
    let output_len = pixels
        .checked_mul(4)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n <= limits.decoding_buffer_size)
        .ok_or(TiffError::LimitsExceeded)?;

    let strip_len = pixels * u64::from(samples);
    if let Some(byte_count) = dir.get_u32(Tag::StripByteCounts) {
        if u64::from(byte_count) < strip_len {
            return Err(TiffError::FormatError(
                TiffFormatError::InconsistentStripSize {
                    expected: strip_len,
                    found: byte_count.into(),
                },
            ));
        }
    }

    let strip = reader.bytes_at(strip_offset.into(), strip_len)?;
    tracing::debug!(
        "Materializing {width}x{height} {source:?} strip at byte {strip_offset}, {strip_len} bytes"
    );

    let samples = samples as usize;
    let mut data = vec![0u8; output_len];
    for (pixel, sample) in data.chunks_exact_mut(4).zip(strip.chunks_exact(samples)) {
        pixel[..samples].copy_from_slice(sample);
        if samples < 4 {
            pixel[3] = 0xff;
        }
    }

    Ok(RgbaImage {
        width,
        height,
        data,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::parse_directories;

    /// A little endian file with one directory of `(tag, type, count, value)` entries followed by
    /// `trailer`, which starts at byte `10 + 12 * entries.len() + 4`.
    fn le_file(entries: &[(u16, u16, u32, u32)], trailer: &[u8]) -> Vec<u8> {
        let mut data = b"II".to_vec();
        data.extend_from_slice(&42u16.to_le_bytes());
        data.extend_from_slice(&8u32.to_le_bytes());
        data.extend_from_slice(&(entries.len() as u16).to_le_bytes());
        for &(tag, ty, count, value) in entries {
            data.extend_from_slice(&tag.to_le_bytes());
            data.extend_from_slice(&ty.to_le_bytes());
            data.extend_from_slice(&count.to_le_bytes());
            data.extend_from_slice(&value.to_le_bytes());
        }
        data.extend_from_slice(&0u32.to_le_bytes());
        data.extend_from_slice(trailer);
        data
    }

    fn trailer_offset(entries: usize) -> u32 {
        10 + 12 * entries as u32 + 4
    }

    fn decode_first(data: &[u8]) -> TiffResult<RgbaImage> {
        let dirs = parse_directories(data)?;
        materialize(data, &dirs[0])
    }

    #[test]
    fn rgb_gets_opaque_alpha() {
        let strip = [10, 20, 30, 40, 50, 60];
        let data = le_file(
            &[(256, 4, 1, 2), (257, 4, 1, 1), (273, 4, 1, trailer_offset(3))],
            &strip,
        );

        let image = decode_first(&data).unwrap();
        assert_eq!(image.dimensions(), (2, 1));
        assert_eq!(image.source, ColorType::RGB(8));
        assert_eq!(image.data, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn rgba_is_copied_verbatim() {
        let strip = [1, 2, 3, 4, 5, 6, 7, 8];
        let data = le_file(
            &[
                (256, 3, 1, 1),
                (257, 3, 1, 2),
                (273, 4, 1, trailer_offset(4)),
                (277, 3, 1, 4),
            ],
            &strip,
        );

        let image = decode_first(&data).unwrap();
        assert_eq!(image.source, ColorType::RGBA(8));
        assert_eq!(image.into_raw(), strip.to_vec());
    }

    #[test]
    fn missing_strip_offset() {
        let data = le_file(&[(256, 4, 1, 2), (257, 4, 1, 1)], &[]);

        assert!(matches!(
            decode_first(&data),
            Err(TiffError::FormatError(TiffFormatError::RequiredTagNotFound(
                Tag::StripOffsets
            )))
        ));
    }

    #[test]
    fn strip_past_end_is_truncated() {
        let data = le_file(
            &[(256, 4, 1, 2), (257, 4, 1, 1), (273, 4, 1, trailer_offset(3))],
            &[1, 2, 3, 4, 5],
        );

        assert!(matches!(
            decode_first(&data),
            Err(TiffError::FormatError(TiffFormatError::Truncated))
        ));
    }

    #[test]
    fn short_strip_byte_count() {
        let data = le_file(
            &[
                (256, 4, 1, 2),
                (257, 4, 1, 1),
                (273, 4, 1, trailer_offset(4)),
                (279, 4, 1, 3),
            ],
            &[0; 6],
        );

        assert!(matches!(
            decode_first(&data),
            Err(TiffError::FormatError(
                TiffFormatError::InconsistentStripSize {
                    expected: 6,
                    found: 3
                }
            ))
        ));
    }

    #[test]
    fn out_of_line_bit_depth() {
        let offset = trailer_offset(4);
        let mut trailer = Vec::new();
        for _ in 0..3 {
            trailer.extend_from_slice(&16u16.to_le_bytes());
        }
        let data = le_file(
            &[
                (256, 4, 1, 1),
                (257, 4, 1, 1),
                (258, 3, 3, offset),
                (273, 4, 1, offset + 6),
            ],
            &trailer,
        );

        assert!(matches!(
            decode_first(&data),
            Err(TiffError::UnsupportedError(TiffUnsupportedError::BitDepth(ref bits)))
                if bits == &[16, 16, 16]
        ));
    }

    #[test]
    fn unsupported_layouts_fail_fast() {
        let base = [(256, 4, 1, 1), (257, 4, 1, 1)];
        let cases: [((u16, u16, u32, u32), fn(&TiffUnsupportedError) -> bool); 6] = [
            ((259, 3, 1, 5), |e| {
                matches!(e, TiffUnsupportedError::Compression(CompressionMethod::LZW))
            }),
            ((273, 4, 2, 100), |e| {
                matches!(e, TiffUnsupportedError::MultipleStrips(2))
            }),
            ((277, 3, 1, 1), |e| {
                matches!(e, TiffUnsupportedError::SamplesPerPixel(1))
            }),
            ((284, 3, 1, 2), |e| {
                matches!(
                    e,
                    TiffUnsupportedError::PlanarConfiguration(PlanarConfiguration::Planar)
                )
            }),
            ((262, 3, 1, 6), |e| {
                matches!(
                    e,
                    TiffUnsupportedError::Interpretation(PhotometricInterpretation::YCbCr)
                )
            }),
            ((322, 3, 1, 16), |e| matches!(e, TiffUnsupportedError::Tiled)),
        ];

        for (extra, check) in cases {
            let mut entries = base.to_vec();
            // Strip offset pointing into the header is fine, it is never read.
            if extra.0 != 273 {
                entries.push((273, 4, 1, 0));
            }
            entries.push(extra);
            let data = le_file(&entries, &[]);

            match decode_first(&data) {
                Err(TiffError::UnsupportedError(ref err)) if check(err) => {}
                other => panic!("unexpected result for tag {}: {:?}", extra.0, other),
            }
        }
    }

    #[test]
    fn oversized_image_exceeds_limits() {
        let data = le_file(
            &[(256, 4, 1, 1 << 16), (257, 4, 1, 1 << 16), (273, 4, 1, 0)],
            &[],
        );

        assert!(matches!(decode_first(&data), Err(TiffError::LimitsExceeded)));
    }

    #[test]
    fn empty_image() {
        let data = le_file(&[(256, 4, 1, 0), (257, 4, 1, 0), (273, 4, 1, 0)], &[]);

        let image = decode_first(&data).unwrap();
        assert!(image.data.is_empty());
    }
}
