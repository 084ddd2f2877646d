//! Boundary to the foreign graphics runtime.
//!
//! The runtime that owns bitmap memory is reached through two traits:
//!
//! - [`ForeignRuntime`] - allocates bitmaps
//! - [`ForeignBitmap`] - a handle to one allocated bitmap; reports its
//!   layout, locks its pixels, and releases everything when dropped
//!
//! Nothing in this crate frees foreign memory directly. Dropping the handle
//! is the only release path, and it implicitly unlocks the pixels.

use imagepair_core::PixelDepth;
use thiserror::Error;

/// Error raised by the runtime itself during a call, as opposed to a call
/// that completes and reports a failure status.
#[derive(Debug, Error)]
#[error("{call} failed: {message}")]
pub struct ForeignError {
    /// Name of the runtime call
    pub call: &'static str,
    /// Message reported by the runtime
    pub message: String,
}

impl ForeignError {
    /// Creates a new error for `call`.
    pub fn new(call: &'static str, message: impl Into<String>) -> Self {
        Self {
            call,
            message: message.into(),
        }
    }
}

/// Layout fields reported by a foreign bitmap.
///
/// Values are taken verbatim from the runtime and may be zero, transposed or
/// otherwise inconsistent; see [`crate::probe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawBitmapInfo {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Bytes per row
    pub stride: u32,
    /// Foreign format code, see [`imagepair_core::foreign_code`]
    pub format: u32,
    /// Runtime-specific flags; not interpreted
    pub flags: u32,
}

impl RawBitmapInfo {
    /// An info block with every field zero.
    pub const ZEROED: Self = Self {
        width: 0,
        height: 0,
        stride: 0,
        format: 0,
        flags: 0,
    };
}

/// A handle to one bitmap owned by the foreign runtime.
///
/// Dropping the handle releases the bitmap and its memory.
///
/// # Safety
///
/// Implementors guarantee that a non-null pointer returned by
/// [`lock_pixels`](Self::lock_pixels):
///
/// - stays valid for reads and writes until the handle is dropped, over at
///   least `height * stride` bytes of every layout
///   [`query_info`](Self::query_info) reports for this bitmap, and of the
///   packed layout of the size and depth it was allocated with;
/// - is not read or written by the runtime or any other code while the
///   handle is alive, except through that pointer.
pub unsafe trait ForeignBitmap {
    /// Whether the underlying foreign object still exists.
    ///
    /// A handle can be present while the object it refers to is gone; such
    /// a handle is never bound.
    fn is_live(&self) -> bool;

    /// Asks the runtime for the bitmap's layout.
    ///
    /// Returns the runtime's status code on failure.
    fn query_info(&self) -> Result<RawBitmapInfo, i32>;

    /// Locks the pixels for direct access.
    ///
    /// Returns the runtime's status code on failure. A successful call may
    /// still return a null pointer.
    fn lock_pixels(&mut self) -> Result<*mut u8, i32>;
}

/// A foreign graphics runtime able to allocate bitmaps.
pub trait ForeignRuntime {
    /// Handle type for bitmaps of this runtime.
    type Bitmap: ForeignBitmap;

    /// Allocates a bitmap of the given size and depth.
    ///
    /// `Ok(None)` is the runtime returning a null handle; `Err` is the
    /// runtime raising an error during the call.
    fn allocate(
        &self,
        width: u32,
        height: u32,
        depth: PixelDepth,
    ) -> Result<Option<Self::Bitmap>, ForeignError>;
}

impl<R: ForeignRuntime + ?Sized> ForeignRuntime for &R {
    type Bitmap = R::Bitmap;

    fn allocate(
        &self,
        width: u32,
        height: u32,
        depth: PixelDepth,
    ) -> Result<Option<Self::Bitmap>, ForeignError> {
        (**self).allocate(width, height, depth)
    }
}
