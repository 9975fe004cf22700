//! Bounds checked, byte order aware access to the input buffer

use crate::tags::ByteOrder;
use crate::{TiffFormatError, TiffResult};

macro_rules! read_fn {
    ($name:ident, $type:ty, $convert:ident) => {
        /// Reads a value of the type at `offset` in the byte order of the file.
        #[inline(always)]
        pub fn $name(&self, offset: u64) -> TiffResult<$type> {
            const LEN: usize = std::mem::size_of::<$type>();
            let mut n = [0u8; LEN];
            n.copy_from_slice(self.bytes_at(offset, LEN as u64)?);
            Ok(self.byte_order.$convert(n))
        }
    };
}

/// Reader that is aware of the byte order.
///
/// All reads are random access: the parser follows offsets from the header and the directories,
/// so there is no cursor. Every read either yields exactly the requested bytes or fails with
/// [`TiffFormatError::Truncated`].
#[derive(Debug, Clone, Copy)]
pub struct SmartReader<'a> {
    data: &'a [u8],
    byte_order: ByteOrder,
}

impl<'a> SmartReader<'a> {
    /// Wraps a buffer
    pub fn wrap(data: &'a [u8], byte_order: ByteOrder) -> Self {
        SmartReader { data, byte_order }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn len(&self) -> u64 {
        self.data.len() as u64
    }

    /// The bytes in `offset..offset + len`.
    pub fn bytes_at(&self, offset: u64, len: u64) -> TiffResult<&'a [u8]> {
        let end = offset
            .checked_add(len)
            .ok_or(TiffFormatError::Truncated)?;

        if end > self.len() {
            return Err(TiffFormatError::Truncated.into());
        }

        // Both fit the slice length so they fit `usize`.
        Ok(&self.data[offset as usize..end as usize])
    }

    read_fn!(read_u16, u16, u16_from_bytes);
    read_fn!(read_u32, u32, u32_from_bytes);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::TiffError;

    #[test]
    fn reads_in_file_byte_order() {
        let data = [0x01, 0x02, 0x03, 0x04];

        let le = SmartReader::wrap(&data, ByteOrder::LittleEndian);
        assert_eq!(le.read_u16(0).unwrap(), 0x0201);
        assert_eq!(le.read_u32(0).unwrap(), 0x0403_0201);

        let be = SmartReader::wrap(&data, ByteOrder::BigEndian);
        assert_eq!(be.read_u16(2).unwrap(), 0x0304);
        assert_eq!(be.read_u32(0).unwrap(), 0x0102_0304);
    }

    #[test]
    fn out_of_bounds_is_truncated() {
        let data = [0u8; 4];
        let reader = SmartReader::wrap(&data, ByteOrder::LittleEndian);

        for result in [
            reader.read_u32(1).map(drop),
            reader.read_u16(3).map(drop),
            reader.bytes_at(4, 1).map(drop),
            reader.bytes_at(u64::MAX, 2).map(drop),
        ] {
            assert!(matches!(
                result,
                Err(TiffError::FormatError(TiffFormatError::Truncated))
            ));
        }

        assert_eq!(reader.bytes_at(4, 0).unwrap(), &[] as &[u8]);
    }
}
