use std::collections::HashSet;
use std::num::NonZeroU32;

use crate::directory::Directory;
use crate::tags::{ByteOrder, Tag, Type};
use crate::{TiffError, TiffFormatError, TiffResult, UsageError};

use self::stream::SmartReader;

pub mod ifd;
mod image;
mod stream;

pub use self::image::{materialize, materialize_with_limits, RgbaImage};

/// The version number every classic TIFF file carries after its byte order marker.
pub const TIFF_MAGIC: u16 = 42;

/// The byte order marker and the version, checked before the first directory offset is read.
const SIGNATURE_SIZE: u64 = 4;
const ENTRY_SIZE: u64 = 12;

/// Decoding limits
#[derive(Clone, Debug)]
pub struct Limits {
    /// The maximum size of a materialized RGBA buffer in bytes, the default is 256MiB.
    pub decoding_buffer_size: usize,
    /// The maximum number of directories followed in the chain, the default is 4096.
    pub max_directories: usize,
    /// Reject byte order markers other than `II` and `MM`. By default every marker that is not
    /// `II` is read as big endian.
    pub strict_byte_order: bool,
    /// The purpose of this is to prevent all the fields of the struct from
    /// being public, as this would make adding new fields a major version
    /// bump.
    _non_exhaustive: (),
}

impl Limits {
    /// A configuration that does not impose any limits.
    ///
    /// This is a good start if the caller only wants to impose selective limits, contrary to the
    /// default limits which allows selectively disabling limits.
    ///
    /// Note that this configuration is likely to crash on excessively large images since,
    /// naturally, the machine running the program does not have infinite memory.
    pub fn unlimited() -> Limits {
        Limits {
            decoding_buffer_size: usize::MAX,
            max_directories: usize::MAX,
            strict_byte_order: false,
            _non_exhaustive: (),
        }
    }
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            decoding_buffer_size: 256 * 1024 * 1024,
            max_directories: 4096,
            strict_byte_order: false,
            _non_exhaustive: (),
        }
    }
}

/// The 8-byte header at the start of every TIFF file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TiffHeader {
    pub byte_order: ByteOrder,
    pub version: u16,
    /// Position of the first directory, `0` if the file holds no image.
    pub first_ifd_offset: u32,
}

/// Read the header of a TIFF file.
pub fn read_header(data: &[u8], limits: &Limits) -> TiffResult<TiffHeader> {
    let signature =
        SmartReader::wrap(data, ByteOrder::LittleEndian).bytes_at(0, SIGNATURE_SIZE)?;
    let marker = [signature[0], signature[1]];

    let byte_order = match ByteOrder::from_marker(marker) {
        Some(bo) => bo,
        None if limits.strict_byte_order => {
            return Err(TiffError::FormatError(TiffFormatError::InvalidByteOrder(
                marker,
            )))
        }
        None => ByteOrder::BigEndian,
    };

    let reader = SmartReader::wrap(data, byte_order);
    let version = reader.read_u16(2)?;
    if version != TIFF_MAGIC {
        return Err(TiffError::FormatError(TiffFormatError::TiffSignatureInvalid));
    }

    let first_ifd_offset = reader.read_u32(4)?;
    tracing::debug!("TIFF header: {byte_order:?}, first directory at {first_ifd_offset}");

    Ok(TiffHeader {
        byte_order,
        version,
        first_ifd_offset,
    })
}

/// Parse the header and every directory of the chain with default limits.
pub fn parse_directories(data: &[u8]) -> TiffResult<Vec<Directory>> {
    Ok(Decoder::new(data)?.into_directories())
}

/// Decode and materialize the first image of a file.
pub fn decode_rgba(data: &[u8]) -> TiffResult<RgbaImage> {
    Decoder::new(data)?.read_image(0)
}

/// Reads a IFD entry.
// An IFD entry has four fields:
//
// Tag   2 bytes
// Type  2 bytes
// Count 4 bytes
// Value 4 bytes either a pointer the value itself
fn read_entry(reader: &SmartReader<'_>, offset: u64) -> TiffResult<(u16, ifd::Entry)> {
    let raw = reader.bytes_at(offset, ENTRY_SIZE)?;

    let tag = reader.read_u16(offset)?;
    let type_ = Type::from_u16_exhaustive(reader.read_u16(offset + 2)?);
    let count = reader.read_u32(offset + 4)?;
    let value = [raw[8], raw[9], raw[10], raw[11]];

    tracing::trace!("entry {tag} of type {type_:?}, count {count}");
    Ok((tag, ifd::Entry::new(type_, count, value, reader.byte_order())))
}

/// Reads the IFD at `offset`.
fn read_ifd(reader: &SmartReader<'_>, offset: u32) -> TiffResult<Directory> {
    let start = u64::from(offset);
    let num_tags = reader.read_u16(start)?;
    tracing::debug!("Reading IFD with {num_tags} entries at byte {offset}");

    let entries_start = start + 2;
    let entries_len = u64::from(num_tags) * ENTRY_SIZE;
    // Check the whole table at once, the count is not to be trusted.
    reader.bytes_at(entries_start, entries_len + 4)?;

    let mut dir = Directory::new(offset, reader.byte_order());
    for i in 0..u64::from(num_tags) {
        let (tag, entry) = read_entry(reader, entries_start + i * ENTRY_SIZE)?;
        // A repeated tag replaces the earlier entry.
        dir.insert(tag, entry);
    }

    dir.next_ifd = NonZeroU32::new(reader.read_u32(entries_start + entries_len)?);
    Ok(dir)
}

/// The representation of a parsed TIFF file.
///
/// All directories are read when the decoder is created. Pixel data is only touched when an image
/// is requested with [`Decoder::read_image`].
#[derive(Debug)]
pub struct Decoder<'a> {
    reader: SmartReader<'a>,
    header: TiffHeader,
    directories: Vec<Directory>,
    limits: Limits,
}

impl<'a> Decoder<'a> {
    /// Create a new decoder over the whole file in `data`.
    pub fn new(data: &'a [u8]) -> TiffResult<Decoder<'a>> {
        Decoder::new_with_limits(data, Limits::default())
    }

    pub fn new_with_limits(data: &'a [u8], limits: Limits) -> TiffResult<Decoder<'a>> {
        let header = read_header(data, &limits)?;
        let reader = SmartReader::wrap(data, header.byte_order);

        let mut directories = Vec::new();
        let mut seen = HashSet::new();
        let mut next = NonZeroU32::new(header.first_ifd_offset);

        while let Some(offset) = next {
            if !seen.insert(offset) {
                return Err(TiffError::FormatError(TiffFormatError::CycleInOffsets));
            }

            if directories.len() >= limits.max_directories {
                return Err(TiffError::LimitsExceeded);
            }

            let dir = read_ifd(&reader, offset.get())?;
            next = dir.next_ifd;
            directories.push(dir);
        }

        tracing::debug!("Read {} image file directories", directories.len());

        Ok(Decoder {
            reader,
            header,
            directories,
            limits,
        })
    }

    pub fn header(&self) -> &TiffHeader {
        &self.header
    }

    /// Returns the byte_order
    pub fn byte_order(&self) -> ByteOrder {
        self.header.byte_order
    }

    /// All directories in file order.
    pub fn directories(&self) -> &[Directory] {
        &self.directories
    }

    pub fn into_directories(self) -> Vec<Directory> {
        self.directories
    }

    /// The number of directories, an image per directory.
    pub fn image_count(&self) -> usize {
        self.directories.len()
    }

    /// Read a tag of the directory at `index`, narrowed to 32 bits.
    pub fn find_tag(&self, index: usize, tag: Tag) -> TiffResult<Option<u32>> {
        Ok(self.directory(index)?.get_u32(tag))
    }

    /// Read every value of an unsigned integer tag of the directory at `index`, following the
    /// offset of values stored out of line.
    pub fn find_tag_u32_vec(&self, index: usize, tag: Tag) -> TiffResult<Option<Vec<u32>>> {
        self.directory(index)?
            .get(tag)
            .map(|entry| entry.resolve_u32_vec(tag, &self.reader))
            .transpose()
    }

    /// Materialize the image of the directory at `index` as RGBA8.
    pub fn read_image(&self, index: usize) -> TiffResult<RgbaImage> {
        let dir = self.directory(index)?;
        image::expand_strip(&self.reader, dir, &self.limits)
    }

    fn directory(&self, index: usize) -> TiffResult<&Directory> {
        if self.directories.is_empty() {
            return Err(TiffError::FormatError(
                TiffFormatError::ImageFileDirectoryNotFound,
            ));
        }

        self.directories.get(index).ok_or_else(|| {
            TiffError::UsageError(UsageError::ImageIndexOutOfRange {
                index,
                count: self.directories.len(),
            })
        })
    }
}
