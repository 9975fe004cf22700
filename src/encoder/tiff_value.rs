use std::io::{self, Write};

use crate::tags::Type;

use super::writer::TiffWriter;

/// Trait for types that can be encoded in a tiff file
pub trait TiffValue {
    const BYTE_LEN: u8;
    const FIELD_TYPE: Type;
    fn count(&self) -> usize;
    fn bytes(&self) -> usize {
        self.count() * usize::from(Self::BYTE_LEN)
    }

    /// Write this value in the byte order of the writer.
    fn write<W: Write>(&self, writer: &mut TiffWriter<W>) -> io::Result<()>;
}

impl TiffValue for [u8] {
    const BYTE_LEN: u8 = 1;
    const FIELD_TYPE: Type = Type::BYTE;

    fn count(&self) -> usize {
        self.len()
    }

    fn write<W: Write>(&self, writer: &mut TiffWriter<W>) -> io::Result<()> {
        writer.write_bytes(self)
    }
}

impl TiffValue for [u16] {
    const BYTE_LEN: u8 = 2;
    const FIELD_TYPE: Type = Type::SHORT;

    fn count(&self) -> usize {
        self.len()
    }

    fn write<W: Write>(&self, writer: &mut TiffWriter<W>) -> io::Result<()> {
        for &x in self {
            writer.write_u16(x)?;
        }
        Ok(())
    }
}

impl TiffValue for [u32] {
    const BYTE_LEN: u8 = 4;
    const FIELD_TYPE: Type = Type::LONG;

    fn count(&self) -> usize {
        self.len()
    }

    fn write<W: Write>(&self, writer: &mut TiffWriter<W>) -> io::Result<()> {
        for &x in self {
            writer.write_u32(x)?;
        }
        Ok(())
    }
}

impl TiffValue for u16 {
    const BYTE_LEN: u8 = 2;
    const FIELD_TYPE: Type = Type::SHORT;

    fn count(&self) -> usize {
        1
    }

    fn write<W: Write>(&self, writer: &mut TiffWriter<W>) -> io::Result<()> {
        writer.write_u16(*self)
    }
}

impl TiffValue for u32 {
    const BYTE_LEN: u8 = 4;
    const FIELD_TYPE: Type = Type::LONG;

    fn count(&self) -> usize {
        1
    }

    fn write<W: Write>(&self, writer: &mut TiffWriter<W>) -> io::Result<()> {
        writer.write_u32(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tags::ByteOrder;

    #[test]
    fn shorts_follow_the_writer_byte_order() {
        let mut writer = TiffWriter::new(Vec::new(), ByteOrder::BigEndian);
        [8u16, 8, 8, 8][..].write(&mut writer).unwrap();
        assert_eq!(writer.into_inner(), vec![0, 8, 0, 8, 0, 8, 0, 8]);

        assert_eq!([8u16; 4][..].bytes(), 8);
        assert_eq!(<[u16] as TiffValue>::FIELD_TYPE, Type::SHORT);
        assert_eq!(7u32.bytes(), 4);
    }
}
