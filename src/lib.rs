//! Decoding and Encoding of uncompressed RGB(A) TIFF Images
//!
//! TIFF (Tagged Image File Format) is a versatile image format. This crate reads and writes the
//! baseline subset most tools agree on: classic (32-bit offset) files holding 8-bit RGB or RGBA
//! samples in a single uncompressed strip. Every decoded image is materialized as RGBA8.
//!
//! ```
//! use tiff_rgba::encoder::{encode, EncoderOptions};
//!
//! let pixels = [10, 20, 30, 255, 40, 50, 60, 128];
//! let file = encode(&pixels, 2, 1, &EncoderOptions::default()).unwrap();
//!
//! let directories = tiff_rgba::parse_directories(&file).unwrap();
//! let image = tiff_rgba::materialize(&file, &directories[0]).unwrap();
//! assert_eq!(image.data, pixels);
//! ```
//!
//! # Related Links
//! * <https://web.archive.org/web/20210108073850/https://www.adobe.io/open/standards/TIFF.html> - The TIFF specification

pub mod cache;
pub mod decoder;
mod directory;
pub mod encoder;
mod error;
pub mod tags;

pub use self::cache::DecodedImageCache;
pub use self::decoder::{decode_rgba, materialize, parse_directories, RgbaImage};
pub use self::directory::Directory;
pub use self::encoder::encode;
pub use self::error::{TiffError, TiffFormatError, TiffResult, TiffUnsupportedError, UsageError};

/// The sample layouts a file may store, and their bit depths.
#[derive(Copy, PartialEq, Eq, Debug, Clone, Hash)]
#[non_exhaustive]
pub enum ColorType {
    /// Pixel contains R, G and B channels
    RGB(u8),

    /// Pixel is RGB with an alpha channel
    RGBA(u8),
}

impl ColorType {
    /// The number of samples per pixel.
    pub fn samples(&self) -> u16 {
        match *self {
            ColorType::RGB(_) => 3,
            ColorType::RGBA(_) => 4,
        }
    }

    pub fn bit_depth(&self) -> u8 {
        match *self {
            ColorType::RGB(b) | ColorType::RGBA(b) => b,
        }
    }
}
