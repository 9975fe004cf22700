use std::collections::BTreeMap;
use std::io::Write;

use crate::{
    encoder::{TiffValue, TiffWriter},
    error::{TiffError, TiffResult},
    tags::{ByteOrder, Tag, Type},
};

/// An entry with its values already serialized in the byte order of the file.
#[derive(Clone, Debug)]
struct BufferedEntry {
    type_: Type,
    count: u32,
    data: Vec<u8>,
}

/// Size of the value field of an entry, larger values are written out of line.
const VALUE_FIELD_LEN: usize = 4;

/// Low level interface to encode a single ifd directory.
///
/// Entries are collected first and written in ascending tag order by [`DirectoryEncoder::write`].
/// Values that do not fit into the value field of their entry are written right after the
/// directory, so the whole block has a size known before anything is written.
pub struct DirectoryEncoder {
    byte_order: ByteOrder,
    ifd: BTreeMap<u16, BufferedEntry>,
}

impl DirectoryEncoder {
    pub fn new(byte_order: ByteOrder) -> Self {
        DirectoryEncoder {
            byte_order,
            ifd: BTreeMap::new(),
        }
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.ifd.contains_key(&tag.to_u16())
    }

    /// Write a single ifd tag, replacing a previous value of the same tag.
    pub fn write_tag<V: TiffValue + ?Sized>(&mut self, tag: Tag, value: &V) -> TiffResult<()> {
        let mut bytes = Vec::with_capacity(value.bytes());
        {
            let mut writer = TiffWriter::new(&mut bytes, self.byte_order);
            value.write(&mut writer)?;
        }

        self.ifd.insert(
            tag.to_u16(),
            BufferedEntry {
                type_: V::FIELD_TYPE,
                count: u32::try_from(value.count()).map_err(|_| TiffError::LimitsExceeded)?,
                data: bytes,
            },
        );

        Ok(())
    }

    /// The number of bytes [`DirectoryEncoder::write`] produces: the entry count, the entries, the
    /// next directory offset and the out of line values.
    pub fn encoded_len(&self) -> u64 {
        let table = 2 + 12 * self.ifd.len() as u64 + 4;
        let values: u64 = self
            .ifd
            .values()
            .filter(|entry| entry.data.len() > VALUE_FIELD_LEN)
            .map(|entry| word_aligned(entry.data.len()))
            .sum();

        table + values
    }

    /// Write out the directory at the current, word aligned, position of the writer.
    ///
    /// The directory is terminated, there is no next directory.
    pub fn write<W: Write>(self, writer: &mut TiffWriter<W>) -> TiffResult<()> {
        let ifd_offset = writer.offset();
        let count = u16::try_from(self.ifd.len()).map_err(|_| TiffError::LimitsExceeded)?;

        let mut value_offset = ifd_offset + 2 + 12 * u64::from(count) + 4;
        let mut out_of_line = Vec::new();

        writer.write_u16(count)?;
        for (tag, entry) in &self.ifd {
            writer.write_u16(*tag)?;
            writer.write_u16(entry.type_.to_u16())?;
            writer.write_u32(entry.count)?;

            if entry.data.len() > VALUE_FIELD_LEN {
                let offset = u32::try_from(value_offset).map_err(|_| TiffError::LimitsExceeded)?;
                writer.write_u32(offset)?;
                value_offset += word_aligned(entry.data.len());
                out_of_line.push(&entry.data);
            } else {
                // Pad the data with zeros to the correct length
                let mut field = [0u8; VALUE_FIELD_LEN];
                field[..entry.data.len()].copy_from_slice(&entry.data);
                writer.write_bytes(&field)?;
            }
        }
        writer.write_u32(0)?;

        for data in out_of_line {
            writer.write_bytes(data)?;
            writer.pad_word_boundary()?;
        }

        debug_assert_eq!(writer.offset(), ifd_offset + self.encoded_len());
        Ok(())
    }
}

fn word_aligned(len: usize) -> u64 {
    let len = len as u64;
    len + len % 2
}
