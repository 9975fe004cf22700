//! Function for reading TIFF tags

use std::fmt;

use super::stream::SmartReader;
use crate::tags::{ByteOrder, Tag, Type};
use crate::{TiffError, TiffFormatError, TiffResult};

/// The 4-byte value field of an entry, interpreted.
///
/// The field either holds the value itself, when all `count` values of the field type fit into
/// four bytes, or the offset at which the values are stored out of line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryValue {
    /// The first value of the field, read at the width of its type.
    Inline(u32),
    /// The position of the values in the file.
    Offset(u32),
}

impl EntryValue {
    /// Narrow to the single 32-bit value the directory mapping reports.
    pub fn into_u32(self) -> u32 {
        match self {
            EntryValue::Inline(val) | EntryValue::Offset(val) => val,
        }
    }
}

/// A single directory entry: tag type, count and the raw value field.
#[derive(Clone, PartialEq, Eq)]
pub struct Entry {
    type_: Type,
    count: u32,
    offset: [u8; 4],
    byte_order: ByteOrder,
}

impl fmt::Debug for Entry {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Entry")
            .field("type_", &self.type_)
            .field("count", &self.count)
            .field("value", &self.value())
            .finish()
    }
}

impl Entry {
    pub fn new(type_: Type, count: u32, offset: [u8; 4], byte_order: ByteOrder) -> Entry {
        Entry {
            type_,
            count,
            offset,
            byte_order,
        }
    }

    pub fn field_type(&self) -> Type {
        self.type_
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Whether the values are stored in the value field itself.
    ///
    /// Entries of unknown type are treated as inline, the parser can not know their size.
    pub fn is_inline(&self) -> bool {
        self.type_
            .value_bytes(self.count)
            .map_or(true, |len| len <= 4)
    }

    /// Interpret the value field.
    pub fn value(&self) -> EntryValue {
        let raw = self.byte_order.u32_from_bytes(self.offset);

        if !self.is_inline() {
            return EntryValue::Offset(raw);
        }

        EntryValue::Inline(match self.type_ {
            Type::BYTE | Type::SBYTE | Type::ASCII | Type::UNDEFINED => self.offset[0].into(),
            Type::SHORT | Type::SSHORT => self
                .byte_order
                .u16_from_bytes([self.offset[0], self.offset[1]])
                .into(),
            _ => raw,
        })
    }

    /// Read all values of an unsigned integer field, wherever they are stored.
    ///
    /// The `tag` is only used for error reporting.
    pub(crate) fn resolve_u32_vec(&self, tag: Tag, reader: &SmartReader<'_>) -> TiffResult<Vec<u32>> {
        let width = match self.type_ {
            Type::BYTE => 1,
            Type::SHORT => 2,
            Type::LONG | Type::IFD => 4,
            other => {
                return Err(TiffError::FormatError(
                    TiffFormatError::UnexpectedFieldType(tag, other),
                ))
            }
        };

        let len = u64::from(self.count) * width;
        let bytes = match self.value() {
            EntryValue::Inline(_) => &self.offset[..len as usize],
            EntryValue::Offset(offset) => reader.bytes_at(offset.into(), len)?,
        };

        let values: Vec<u32> = match width {
            1 => bytes.iter().copied().map(u32::from).collect(),
            2 => bytes
                .chunks_exact(2)
                .map(|c| u32::from(self.byte_order.u16_from_bytes([c[0], c[1]])))
                .collect(),
            _ => bytes
                .chunks_exact(4)
                .map(|c| self.byte_order.u32_from_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        };

        Ok(values)
    }
}
