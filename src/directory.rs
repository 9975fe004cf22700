use core::fmt;
use std::{collections::BTreeMap, num::NonZeroU32};

use crate::{
    decoder::ifd::{Entry, EntryValue},
    tags::{ByteOrder, Tag},
};

/// An Image File Directory (IFD).
///
/// A directory is a map of [`Tag`]s to [`Entry`]s. Most consumers only need the single 32-bit
/// value of an entry, see [`Directory::get_u32`]. The entry itself keeps the field type and count
/// so that values stored out of line can still be resolved against the file.
///
/// A directory is identified by its position in the file, see [`Directory::offset`].
#[doc(alias = "IFD")]
#[derive(Clone, PartialEq, Eq)]
pub struct Directory {
    /// There are at most `u16::MAX` entries in any single directory, the count is stored as a
    /// 2-byte value. The order in the file is implied to be ascending by tag value (the decoder
    /// does not mind unordered entries).
    pub(crate) entries: BTreeMap<u16, Entry>,
    pub(crate) offset: u32,
    pub(crate) byte_order: ByteOrder,
    pub(crate) next_ifd: Option<NonZeroU32>,
}

impl Directory {
    pub(crate) fn new(offset: u32, byte_order: ByteOrder) -> Self {
        Directory {
            entries: BTreeMap::new(),
            offset,
            byte_order,
            next_ifd: None,
        }
    }

    /// Retrieve the entry associated with a tag.
    pub fn get(&self, tag: Tag) -> Option<&Entry> {
        self.entries.get(&tag.to_u16())
    }

    /// Retrieve the value of a tag, narrowed to 32 bits.
    ///
    /// For values stored out of line this is the offset of the values.
    pub fn get_u32(&self, tag: Tag) -> Option<u32> {
        self.get(tag).map(Entry::value).map(EntryValue::into_u32)
    }

    /// Check if the directory contains a specified tag.
    pub fn contains(&self, tag: Tag) -> bool {
        self.entries.contains_key(&tag.to_u16())
    }

    /// Iterate over all known and unknown tags in this directory, by ascending tag.
    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Entry)> + '_ {
        self.entries
            .iter()
            .map(|(k, v)| (Tag::from_u16_exhaustive(*k), v))
    }

    /// Get the number of distinct tags.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The position of this directory in the file.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// The byte order of the file this directory was read from.
    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// Get the offset of the next IFD, if there is one.
    pub fn next(&self) -> Option<u32> {
        self.next_ifd.map(NonZeroU32::get)
    }

    /// Insert an entry, replacing any previous entry of the same tag.
    pub(crate) fn insert(&mut self, tag: u16, entry: Entry) {
        self.entries.insert(tag, entry);
    }
}

impl fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("offset", &self.offset)
            .field(
                "entries",
                &self
                    .entries
                    .iter()
                    .map(|(k, v)| (Tag::from_u16_exhaustive(*k), v))
                    .collect::<Vec<_>>(),
            )
            .field("next_ifd", &self.next_ifd)
            .finish()
    }
}
