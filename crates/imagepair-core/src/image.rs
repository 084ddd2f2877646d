//! Image buffer types over borrowed and owned memory.
//!
//! This module provides the image containers used on the local side:
//! - [`ImageView`] - Immutable view over pixel memory with a known geometry
//! - [`ImageViewMut`] - Mutable view over pixel memory with a known geometry
//! - [`OwnedImage`] - Heap-backed image, used for copies and placeholders
//!
//! # Zero-copy views
//!
//! Views never own their memory. A view over foreign memory is created from a
//! raw pointer and borrows whatever owns that pointer, so it cannot outlive
//! the owner:
//!
//! ```rust
//! use imagepair_core::{BitmapGeometry, ImageViewMut, LocalFormat};
//!
//! let geometry = BitmapGeometry::packed(4, 2, LocalFormat::Argb32).unwrap();
//! let mut memory = vec![0u8; geometry.byte_len()];
//! let mut view = ImageViewMut::new(&mut memory, geometry).unwrap();
//! view.row_mut(1)[0] = 0xFF;
//! assert_eq!(memory[16], 0xFF);
//! ```
//!
//! # Memory Layout
//!
//! Rows are `stride` bytes apart; see [`crate::geometry`]. A view's slice is
//! trimmed to [`BitmapGeometry::byte_len`], so chunking it by `stride`
//! yields exactly `height` rows.

use crate::{BitmapGeometry, Error, LocalFormat, Result};

fn check_len(len: usize, geometry: &BitmapGeometry) -> Result<()> {
    let required = geometry.byte_len();
    if len < required {
        return Err(Error::BufferTooSmall { len, required });
    }
    Ok(())
}

/// Immutable view over pixel memory.
#[derive(Clone, Copy)]
pub struct ImageView<'a> {
    data: &'a [u8],
    geometry: BitmapGeometry,
}

impl<'a> ImageView<'a> {
    /// Wraps a byte slice with a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `data` cannot hold every row.
    pub fn new(data: &'a [u8], geometry: BitmapGeometry) -> Result<Self> {
        check_len(data.len(), &geometry)?;
        Ok(Self {
            data: &data[..geometry.byte_len()],
            geometry,
        })
    }

    /// Wraps raw memory with a geometry.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads of `geometry.byte_len()` bytes for `'a`,
    /// and nothing may write to that memory during `'a`.
    pub unsafe fn from_raw_parts(ptr: *const u8, geometry: BitmapGeometry) -> Self {
        // SAFETY: guaranteed by the caller.
        let data = unsafe { std::slice::from_raw_parts(ptr, geometry.byte_len()) };
        Self { data, geometry }
    }

    /// Returns the geometry.
    #[inline]
    pub fn geometry(&self) -> BitmapGeometry {
        self.geometry
    }

    /// Returns the view width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.geometry.width()
    }

    /// Returns the view height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.geometry.height()
    }

    /// Returns the view dimensions.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.geometry.dimensions()
    }

    /// Bytes per row including padding.
    #[inline]
    pub fn stride(&self) -> usize {
        self.geometry.stride()
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> LocalFormat {
        self.geometry.format()
    }

    /// Address of the first pixel.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// All bytes covered by the view, padding included.
    #[inline]
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        assert!(y < self.height(), "row {y} out of bounds for height {}", self.height());
        let start = y as usize * self.stride();
        &self.data[start..start + self.geometry.row_bytes()]
    }

    /// Iterates over rows top-to-bottom.
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + use<'a> {
        let row_bytes = self.geometry.row_bytes();
        self.data.chunks(self.stride()).map(move |row| &row[..row_bytes])
    }

    /// Returns the 32-bit pixel at (x, y), or `None` if out of bounds or the
    /// format is not 32-bit.
    pub fn pixel32(&self, x: u32, y: u32) -> Option<u32> {
        if !self.format().is_32bit() || x >= self.width() || y >= self.height() {
            return None;
        }
        let at = x as usize * 4;
        let bytes = &self.row(y)[at..at + 4];
        Some(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Returns the 16-bit pixel at (x, y), or `None` if out of bounds or the
    /// format is not 16-bit.
    pub fn pixel16(&self, x: u32, y: u32) -> Option<u16> {
        if self.format() != LocalFormat::Rgb16 || x >= self.width() || y >= self.height() {
            return None;
        }
        let at = x as usize * 2;
        let bytes = &self.row(y)[at..at + 2];
        Some(u16::from_ne_bytes([bytes[0], bytes[1]]))
    }

    /// Copies the pixels into a new packed [`OwnedImage`].
    pub fn to_owned_image(&self) -> OwnedImage {
        let mut out = OwnedImage::zeroed(
            BitmapGeometry::packed(self.width(), self.height(), self.format())
                .unwrap_or(self.geometry),
        );
        let row_bytes = self.geometry.row_bytes();
        for (dst, src) in out.data.chunks_mut(out.geometry.stride()).zip(self.rows()) {
            dst[..row_bytes].copy_from_slice(src);
        }
        out
    }
}

impl std::fmt::Debug for ImageView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageView")
            .field("ptr", &self.data.as_ptr())
            .field("geometry", &self.geometry)
            .finish()
    }
}

/// Mutable view over pixel memory.
pub struct ImageViewMut<'a> {
    data: &'a mut [u8],
    geometry: BitmapGeometry,
}

impl<'a> ImageViewMut<'a> {
    /// Wraps a mutable byte slice with a geometry.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BufferTooSmall`] if `data` cannot hold every row.
    pub fn new(data: &'a mut [u8], geometry: BitmapGeometry) -> Result<Self> {
        check_len(data.len(), &geometry)?;
        Ok(Self {
            data: &mut data[..geometry.byte_len()],
            geometry,
        })
    }

    /// Wraps raw memory with a geometry.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `geometry.byte_len()`
    /// bytes for `'a`, and no other access to that memory may happen
    /// during `'a`.
    pub unsafe fn from_raw_parts(ptr: *mut u8, geometry: BitmapGeometry) -> Self {
        // SAFETY: guaranteed by the caller.
        let data = unsafe { std::slice::from_raw_parts_mut(ptr, geometry.byte_len()) };
        Self { data, geometry }
    }

    /// Reborrows as an immutable view.
    #[inline]
    pub fn as_view(&self) -> ImageView<'_> {
        ImageView {
            data: &*self.data,
            geometry: self.geometry,
        }
    }

    /// Returns the geometry.
    #[inline]
    pub fn geometry(&self) -> BitmapGeometry {
        self.geometry
    }

    /// Returns the view width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.geometry.width()
    }

    /// Returns the view height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.geometry.height()
    }

    /// Returns the view dimensions.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.geometry.dimensions()
    }

    /// Bytes per row including padding.
    #[inline]
    pub fn stride(&self) -> usize {
        self.geometry.stride()
    }

    /// Pixel bytes per row.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.geometry.row_bytes()
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> LocalFormat {
        self.geometry.format()
    }

    /// Address of the first pixel.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// All bytes covered by the view, padding included.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &*self.data
    }

    /// All bytes covered by the view, padding included.
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut *self.data
    }

    /// Pixel bytes of row `y`, without padding.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        assert!(y < self.height(), "row {y} out of bounds for height {}", self.height());
        let start = y as usize * self.stride();
        let end = start + self.geometry.row_bytes();
        &mut self.data[start..end]
    }

    /// Iterates mutably over rows top-to-bottom.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut [u8]> + '_ {
        let row_bytes = self.geometry.row_bytes();
        let stride = self.stride();
        self.data.chunks_mut(stride).map(move |row| &mut row[..row_bytes])
    }

    /// Sets the 32-bit pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if out of bounds or the view is not 32-bit.
    pub fn set_pixel32(&mut self, x: u32, y: u32, value: u32) {
        assert!(self.format().is_32bit(), "set_pixel32 on {} view", self.format());
        assert!(x < self.width(), "column {x} out of bounds for width {}", self.width());
        let at = x as usize * 4;
        self.row_mut(y)[at..at + 4].copy_from_slice(&value.to_ne_bytes());
    }

    /// Sets the 16-bit pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if out of bounds or the view is not 16-bit.
    pub fn set_pixel16(&mut self, x: u32, y: u32, value: u16) {
        assert!(!self.format().is_32bit(), "set_pixel16 on {} view", self.format());
        assert!(x < self.width(), "column {x} out of bounds for width {}", self.width());
        let at = x as usize * 2;
        self.row_mut(y)[at..at + 2].copy_from_slice(&value.to_ne_bytes());
    }
}

impl std::fmt::Debug for ImageViewMut<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageViewMut")
            .field("ptr", &self.data.as_ptr())
            .field("geometry", &self.geometry)
            .finish()
    }
}

/// Heap-backed image with an explicit geometry.
///
/// Used where local code needs its own copy of a foreign buffer and as the
/// 1x1 placeholder of a disposed pair.
#[derive(Clone, PartialEq, Eq)]
pub struct OwnedImage {
    data: Vec<u8>,
    geometry: BitmapGeometry,
}

impl OwnedImage {
    /// Creates a zero-filled, packed image.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] for zero or overflowing sizes.
    pub fn new(width: u32, height: u32, format: LocalFormat) -> Result<Self> {
        Ok(Self::zeroed(BitmapGeometry::packed(width, height, format)?))
    }

    /// Creates a zero-filled image with the given geometry.
    pub fn zeroed(geometry: BitmapGeometry) -> Self {
        Self {
            data: vec![0; geometry.byte_len()],
            geometry,
        }
    }

    /// The 1x1 image standing in for a buffer that is not bound.
    pub fn placeholder(format: LocalFormat) -> Self {
        let stride = format.bytes_per_pixel();
        Self {
            data: vec![0; stride],
            geometry: match BitmapGeometry::new(1, 1, stride, format) {
                Ok(geometry) => geometry,
                Err(_) => unreachable!("1x1 geometry is always valid"),
            },
        }
    }

    /// Whether this is a 1x1 image.
    #[inline]
    pub fn is_placeholder(&self) -> bool {
        self.geometry.dimensions() == (1, 1)
    }

    /// Returns the geometry.
    #[inline]
    pub fn geometry(&self) -> BitmapGeometry {
        self.geometry
    }

    /// Returns the image dimensions.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        self.geometry.dimensions()
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> LocalFormat {
        self.geometry.format()
    }

    /// Raw bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Borrows as an immutable view.
    #[inline]
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data: &self.data,
            geometry: self.geometry,
        }
    }

    /// Borrows as a mutable view.
    #[inline]
    pub fn view_mut(&mut self) -> ImageViewMut<'_> {
        ImageViewMut {
            data: &mut self.data,
            geometry: self.geometry,
        }
    }
}

impl std::fmt::Debug for OwnedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnedImage")
            .field("geometry", &self.geometry)
            .field("len", &self.data.len())
            .finish()
    }
}
