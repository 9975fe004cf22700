use std::error::Error;
use std::fmt;
use std::io;

use quick_error::quick_error;

use crate::tags::{
    CompressionMethod, PhotometricInterpretation, PlanarConfiguration, SampleFormat, Tag, Type,
};

quick_error! {
    /// Tiff error kinds.
    #[derive(Debug)]
    pub enum TiffError {
        /// The Image is not formatted properly.
        FormatError(err: TiffFormatError) {
            from()
            display("format error: {}", err)
            source(err)
        }

        /// The Decoder does not support features required by the image.
        UnsupportedError(err: TiffUnsupportedError) {
            from()
            display("{}", err)
            source(err)
        }

        /// An I/O Error occurred while encoding the image.
        IoError(err: io::Error) {
            from()
            display("{}", err)
            source(err)
        }

        /// The Limits of the Decoder or the encoding format are exceeded.
        LimitsExceeded {
            display("the image exceeds the configured limits")
        }

        /// The codec was used incorrectly.
        UsageError(err: UsageError) {
            from()
            display("usage error: {}", err)
            source(err)
        }
    }
}

/// The image is not formatted properly.
///
/// This indicates that the encoder producing the image might behave incorrectly or that the input
/// file has been corrupted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TiffFormatError {
    /// The version field of the header is not 42.
    TiffSignatureInvalid,
    /// A read would go past the end of the buffer.
    Truncated,
    /// The byte order marker is neither `II` nor `MM` (strict mode only).
    InvalidByteOrder([u8; 2]),
    /// A tag required to materialize the image is absent.
    RequiredTagNotFound(Tag),
    /// The next-directory chain refers back to a directory that was already read.
    CycleInOffsets,
    /// `StripByteCounts` is smaller than the raster it is supposed to cover.
    InconsistentStripSize { expected: u64, found: u64 },
    /// A tag holds a field type that cannot be read as unsigned integers.
    UnexpectedFieldType(Tag, Type),
    /// The file does not contain any image file directory.
    ImageFileDirectoryNotFound,
}

impl fmt::Display for TiffFormatError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::TiffFormatError::*;
        match *self {
            TiffSignatureInvalid => write!(fmt, "not a TIFF"),
            Truncated => write!(fmt, "truncated"),
            InvalidByteOrder(marker) => write!(fmt, "invalid byte order marker {:02x?}", marker),
            RequiredTagNotFound(ref tag) => write!(fmt, "missing required tag {:?}", tag),
            CycleInOffsets => write!(fmt, "cycle in directory offsets"),
            InconsistentStripSize { expected, found } => write!(
                fmt,
                "inconsistent strip size: expected {} bytes, found {}",
                expected, found
            ),
            UnexpectedFieldType(ref tag, ref ty) => {
                write!(fmt, "tag {:?} has unexpected field type {:?}", tag, ty)
            }
            ImageFileDirectoryNotFound => write!(fmt, "image file directory not found"),
        }
    }
}

impl Error for TiffFormatError {}

/// The Decoder does not support features required by the image.
///
/// Only uncompressed, chunky, single strip images with 8-bit unsigned RGB or RGBA samples are
/// materialized. Everything else is rejected before a single pixel is copied.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TiffUnsupportedError {
    Compression(CompressionMethod),
    Tiled,
    MultipleStrips(u32),
    PlanarConfiguration(PlanarConfiguration),
    SamplesPerPixel(u32),
    BitDepth(Vec<u32>),
    SampleFormat(SampleFormat),
    Interpretation(PhotometricInterpretation),
}

impl fmt::Display for TiffUnsupportedError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::TiffUnsupportedError::*;
        match *self {
            Compression(method) => {
                write!(fmt, "unsupported layout: compression method {:?}", method)
            }
            Tiled => write!(fmt, "unsupported layout: tiled image"),
            MultipleStrips(count) => write!(fmt, "unsupported layout: {} strips", count),
            PlanarConfiguration(config) => {
                write!(fmt, "unsupported layout: planar configuration {:?}", config)
            }
            SamplesPerPixel(samples) => {
                write!(fmt, "unsupported layout: {} samples per pixel", samples)
            }
            BitDepth(ref bits) => write!(fmt, "unsupported bit depth {:?}", bits),
            SampleFormat(format) => write!(fmt, "unsupported layout: sample format {:?}", format),
            Interpretation(interpretation) => write!(
                fmt,
                "unsupported layout: photometric interpretation {:?}",
                interpretation
            ),
        }
    }
}

impl Error for TiffUnsupportedError {}

/// User attempted to use the codec in a way that is incompatible with its configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UsageError {
    /// Images must be at least one pixel wide and high.
    EmptyImage { width: u32, height: u32 },
    /// The pixel buffer length does not match `width * height * 4`.
    BufferSizeMismatch { expected: usize, found: usize },
    /// No directory exists at the requested index.
    ImageIndexOutOfRange { index: usize, count: usize },
}

impl fmt::Display for UsageError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        use self::UsageError::*;
        match *self {
            EmptyImage { width, height } => {
                write!(fmt, "cannot encode an image of {}x{} pixels", width, height)
            }
            BufferSizeMismatch { expected, found } => write!(
                fmt,
                "pixel buffer has {} bytes, {} expected for RGBA8",
                found, expected
            ),
            ImageIndexOutOfRange { index, count } => write!(
                fmt,
                "image index {} is out of range, the file holds {} directories",
                index, count
            ),
        }
    }
}

impl Error for UsageError {}

/// Result of an image decoding/encoding process
pub type TiffResult<T> = Result<T, TiffError>;
