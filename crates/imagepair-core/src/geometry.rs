//! Bitmap memory geometry.
//!
//! [`BitmapGeometry`] describes how pixels are laid out in a buffer:
//! dimensions, bytes per row and pixel format. Construction validates the
//! layout, so a geometry value can always be used to index its buffer.
//!
//! # Memory Layout
//!
//! Rows are stored top-to-bottom, each `stride` bytes apart. Only the first
//! `width * bytes_per_pixel` bytes of a row hold pixels; the rest is padding.
//! The last row does not need trailing padding:
//!
//! ```text
//! |<------------- stride ------------->|
//! |<--- row_bytes --->|                |
//! [ px px px px px px ][ padding ...   ]  <- row 0
//! [ px px px px px px ][ padding ...   ]  <- row 1
//! [ px px px px px px ]                   <- last row
//! ```

use crate::{Error, LocalFormat, Result};

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
}

impl Size {
    /// Creates a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Whether both sides are at least one pixel.
    #[inline]
    pub const fn is_valid(&self) -> bool {
        self.width >= 1 && self.height >= 1
    }
}

impl From<(i32, i32)> for Size {
    fn from((width, height): (i32, i32)) -> Self {
        Self { width, height }
    }
}

/// Validated layout of a pixel buffer.
///
/// Invariants:
/// - `width >= 1` and `height >= 1`
/// - `stride >= width * format.bytes_per_pixel()`
///
/// # Example
///
/// ```rust
/// use imagepair_core::{BitmapGeometry, LocalFormat};
///
/// let geometry = BitmapGeometry::new(100, 50, 400, LocalFormat::Argb32).unwrap();
/// assert_eq!(geometry.row_bytes(), 400);
/// assert!(BitmapGeometry::new(100, 50, 100, LocalFormat::Argb32).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BitmapGeometry {
    width: u32,
    height: u32,
    stride: usize,
    format: LocalFormat,
}

impl BitmapGeometry {
    /// Creates a geometry, validating dimensions and stride.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidDimensions`] if a side is zero or the buffer size
    ///   exceeds `isize::MAX` bytes
    /// - [`Error::InvalidStride`] if `stride` cannot hold a full row
    pub fn new(width: u32, height: u32, stride: usize, format: LocalFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_dimensions(width, height, "width and height must be > 0"));
        }
        let min_stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflows"))?;
        if stride < min_stride {
            return Err(Error::invalid_stride(stride, min_stride, width));
        }
        (height as usize - 1)
            .checked_mul(stride)
            .and_then(|v| v.checked_add(min_stride))
            .filter(|&len| len <= isize::MAX as usize)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))?;
        Ok(Self {
            width,
            height,
            stride,
            format,
        })
    }

    /// Creates a geometry whose rows have no padding.
    pub fn packed(width: u32, height: u32, format: LocalFormat) -> Result<Self> {
        let stride = (width as usize)
            .checked_mul(format.bytes_per_pixel())
            .ok_or_else(|| Error::invalid_dimensions(width, height, "row size overflows"))?;
        Self::new(width, height, stride, format)
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Bytes from the start of one row to the start of the next.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel format.
    #[inline]
    pub fn format(&self) -> LocalFormat {
        self.format
    }

    /// Bytes of pixel data in one row, excluding padding.
    #[inline]
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }

    /// Bytes a buffer must have to hold every row.
    ///
    /// Padding after the last row is not required.
    #[inline]
    pub fn byte_len(&self) -> usize {
        (self.height as usize - 1) * self.stride + self.row_bytes()
    }

    /// Number of pixels.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether rows are contiguous.
    #[inline]
    pub fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }
}
