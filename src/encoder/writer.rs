use std::io::{self, Write};

use crate::decoder::TIFF_MAGIC;
use crate::tags::ByteOrder;

/// Writer that tracks its position and writes numbers in the byte order of the file.
pub struct TiffWriter<W> {
    writer: W,
    byte_order: ByteOrder,
    offset: u64,
}

impl<W: Write> TiffWriter<W> {
    pub fn new(writer: W, byte_order: ByteOrder) -> Self {
        Self {
            writer,
            byte_order,
            offset: 0,
        }
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    /// The number of bytes written so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), io::Error> {
        self.writer.write_all(bytes)?;
        self.offset += bytes.len() as u64;
        Ok(())
    }

    pub fn write_u16(&mut self, n: u16) -> Result<(), io::Error> {
        self.write_bytes(&self.byte_order.u16_to_bytes(n))
    }

    pub fn write_u32(&mut self, n: u32) -> Result<(), io::Error> {
        self.write_bytes(&self.byte_order.u32_to_bytes(n))
    }

    /// Write the byte order marker, the version and the offset of the first directory.
    pub fn write_header(&mut self, first_ifd: u32) -> Result<(), io::Error> {
        self.write_bytes(&self.byte_order.marker())?;
        self.write_u16(TIFF_MAGIC)?;
        self.write_u32(first_ifd)
    }

    /// Pad with zeros to the next even offset, values in a TIFF start on a word boundary.
    pub fn pad_word_boundary(&mut self) -> Result<(), io::Error> {
        if self.offset % 2 != 0 {
            self.write_bytes(&[0])?;
        }

        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}
