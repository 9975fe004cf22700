//! Cache of materialized images.
//!
//! Decoding the same file twice costs a full copy of its pixels, callers that show the same image
//! repeatedly keep the result in a [`DecodedImageCache`]. Images are keyed by a caller chosen
//! name, usually the path they were read from, and evicted in least recently used order once the
//! pixel bytes held exceed the capacity.

use std::sync::Arc;

use lru::LruCache;

use crate::decoder::{self, RgbaImage};
use crate::error::TiffResult;

/// Default capacity: 64MiB of pixels.
pub const DEFAULT_CACHE_CAPACITY: usize = 64 * 1024 * 1024;

/// LRU cache of decoded images with a capacity in bytes.
///
/// The cache takes `&mut self`, wrap it in a lock to share it between threads.
///
/// ```
/// use tiff_rgba::cache::DecodedImageCache;
/// use tiff_rgba::encoder::{encode, EncoderOptions};
///
/// let file = encode(&[1, 2, 3, 4], 1, 1, &EncoderOptions::default()).unwrap();
///
/// let mut cache = DecodedImageCache::new(1024);
/// let image = cache.get_or_decode("pixel.tif", &file).unwrap();
/// assert_eq!(image.data, [1, 2, 3, 4]);
/// assert!(cache.get("pixel.tif").is_some());
/// ```
pub struct DecodedImageCache {
    cache: LruCache<String, Arc<RgbaImage>>,
    capacity: usize,
    size: usize,
}

impl DecodedImageCache {
    /// Create a cache holding at most `capacity` bytes of pixel data.
    pub fn new(capacity: usize) -> Self {
        DecodedImageCache {
            cache: LruCache::unbounded(),
            capacity,
            size: 0,
        }
    }

    /// The capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of pixel bytes currently held.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Look up an image, marking it as recently used.
    pub fn get(&mut self, name: &str) -> Option<Arc<RgbaImage>> {
        self.cache.get(name).cloned()
    }

    /// Check for an image without updating the LRU order.
    pub fn contains(&self, name: &str) -> bool {
        self.cache.contains(name)
    }

    /// Store an image under `name`, replacing any previous image of that name.
    ///
    /// Least recently used images are evicted until the cache is within its capacity. An image
    /// larger than the whole capacity is not stored, the returned handle is still usable.
    pub fn insert(&mut self, name: impl Into<String>, image: RgbaImage) -> Arc<RgbaImage> {
        let name = name.into();
        let image = Arc::new(image);
        let image_size = image.data.len();

        self.remove(&name);

        if image_size > self.capacity {
            tracing::debug!(
                "Not caching {name}: {image_size} bytes exceed the capacity of {}",
                self.capacity
            );
            return image;
        }

        while self.size + image_size > self.capacity {
            match self.cache.pop_lru() {
                Some((evicted, old)) => {
                    tracing::trace!("Evicting {evicted} from the image cache");
                    self.size = self.size.saturating_sub(old.data.len());
                }
                None => break,
            }
        }

        self.size += image_size;
        self.cache.put(name, Arc::clone(&image));
        image
    }

    /// Return the cached image, or decode the first image of `data` and cache it.
    ///
    /// Decoding errors are returned and leave the cache untouched.
    pub fn get_or_decode(&mut self, name: &str, data: &[u8]) -> TiffResult<Arc<RgbaImage>> {
        if let Some(image) = self.get(name) {
            return Ok(image);
        }

        let image = decoder::decode_rgba(data)?;
        Ok(self.insert(name, image))
    }

    /// Remove an image, returning it if it was cached.
    pub fn remove(&mut self, name: &str) -> Option<Arc<RgbaImage>> {
        let image = self.cache.pop(name)?;
        self.size = self.size.saturating_sub(image.data.len());
        Some(image)
    }

    /// The number of cached images.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn clear(&mut self) {
        self.cache.clear();
        self.size = 0;
    }
}

impl Default for DecodedImageCache {
    fn default() -> Self {
        DecodedImageCache::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode, EncoderOptions};
    use crate::ColorType;

    fn image(width: u32, fill: u8) -> RgbaImage {
        RgbaImage {
            width,
            height: 1,
            data: vec![fill; width as usize * 4],
            source: ColorType::RGBA(8),
        }
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = DecodedImageCache::new(24);
        cache.insert("a", image(2, 1));
        cache.insert("b", image(2, 2));
        cache.insert("c", image(2, 3));
        assert_eq!(cache.size(), 24);

        // Touch "a" so that "b" is the oldest.
        assert!(cache.get("a").is_some());
        cache.insert("d", image(1, 4));

        assert!(!cache.contains("b"));
        assert!(cache.contains("a"));
        assert!(cache.contains("c"));
        assert!(cache.contains("d"));
        assert_eq!(cache.size(), 20);
    }

    #[test]
    fn replacing_an_image_updates_the_size() {
        let mut cache = DecodedImageCache::new(100);
        cache.insert("a", image(4, 1));
        cache.insert("a", image(1, 2));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size(), 4);
        assert_eq!(cache.get("a").unwrap().data, [2; 4]);
    }

    #[test]
    fn oversized_image_is_returned_not_cached() {
        let mut cache = DecodedImageCache::new(8);
        cache.insert("small", image(1, 1));

        let big = cache.insert("big", image(3, 7));
        assert_eq!(big.data.len(), 12);
        assert!(!cache.contains("big"));
        assert!(cache.contains("small"));
    }

    #[test]
    fn decode_on_miss() {
        let file = encode(&[5, 6, 7, 8], 1, 1, &EncoderOptions::default()).unwrap();
        let mut cache = DecodedImageCache::default();

        let first = cache.get_or_decode("x.tif", &file).unwrap();
        // A hit does not look at the data.
        let second = cache.get_or_decode("x.tif", &[]).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.data, [5, 6, 7, 8]);
    }

    #[test]
    fn errors_leave_the_cache_unchanged() {
        let mut cache = DecodedImageCache::new(100);
        cache.insert("a", image(1, 1));

        assert!(cache.get_or_decode("broken.tif", b"II*\0").is_err());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.size(), 4);

        assert!(cache.remove("a").is_some());
        assert!(cache.remove("a").is_none());
        cache.insert("b", image(1, 1));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.size(), 0);
    }
}
