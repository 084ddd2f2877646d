//! Binding of locked foreign memory to local image views.
//!
//! [`BoundBitmap`] is the only owner of both the foreign handle and the raw
//! pixel pointer obtained from it. Views are handed out as borrows of the
//! `BoundBitmap`, so the compiler rejects any view that would outlive the
//! handle, and dropping the `BoundBitmap` drops the handle, which releases
//! the memory.

use crate::foreign::ForeignBitmap;
use imagepair_core::{BitmapGeometry, Error, ImageView, ImageViewMut, Result};
use std::ptr::NonNull;
use tracing::{debug, error};

/// A foreign bitmap with its pixels locked and described by a geometry.
pub struct BoundBitmap<B: ForeignBitmap> {
    pixels: NonNull<u8>,
    geometry: BitmapGeometry,
    bitmap: B,
}

impl<B: ForeignBitmap> BoundBitmap<B> {
    /// Locks `bitmap`'s pixels and pairs them with `geometry`.
    ///
    /// No pixels are copied. On failure `bitmap` is dropped, releasing it.
    ///
    /// # Safety
    ///
    /// The locked memory must hold at least `geometry.byte_len()` bytes.
    /// Any geometry returned by [`crate::probe::probe_layout`] for the same
    /// bitmap and its allocated size qualifies under the [`ForeignBitmap`]
    /// contract.
    ///
    /// # Errors
    ///
    /// - [`Error::LockFailed`] if the runtime reports an error status
    /// - [`Error::NullPixels`] if the lock succeeds with a null pointer
    ///
    /// # Example
    ///
    /// Binding is unsafe because nothing else checks `geometry` against
    /// the bitmap's storage:
    ///
    /// ```compile_fail,E0133
    /// use imagepair_bind::{heap::HeapRuntime, BoundBitmap, ForeignRuntime};
    /// use imagepair_core::{BitmapGeometry, LocalFormat, PixelDepth};
    ///
    /// let runtime = HeapRuntime::new();
    /// let bitmap = runtime.allocate(1, 1, PixelDepth::Bits32).unwrap().unwrap();
    /// let geometry = BitmapGeometry::packed(20000, 20000, LocalFormat::Argb32).unwrap();
    /// let _bound = BoundBitmap::bind(bitmap, geometry);
    /// ```
    pub unsafe fn bind(mut bitmap: B, geometry: BitmapGeometry) -> Result<Self> {
        let ptr = bitmap.lock_pixels().map_err(|status| {
            error!(status, "could not lock bitmap pixels");
            Error::lock_failed(status)
        })?;
        let pixels = NonNull::new(ptr).ok_or_else(|| {
            error!("could not lock bitmap pixels, null pointer returned");
            Error::NullPixels
        })?;
        debug!(
            ptr = ?pixels,
            width = geometry.width(),
            height = geometry.height(),
            stride = geometry.stride(),
            format = %geometry.format(),
            "bound view over foreign pixels"
        );
        Ok(Self {
            pixels,
            geometry,
            bitmap,
        })
    }

    /// Layout the view was built with.
    #[inline]
    pub fn geometry(&self) -> BitmapGeometry {
        self.geometry
    }

    /// The foreign handle.
    #[inline]
    pub fn bitmap(&self) -> &B {
        &self.bitmap
    }

    /// Whether the foreign object behind the handle still exists.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.bitmap.is_live()
    }

    /// Address of the first pixel in foreign memory.
    #[inline]
    pub fn as_ptr(&self) -> *const u8 {
        self.pixels.as_ptr()
    }

    /// Read-only view over the foreign pixels.
    #[inline]
    pub fn view(&self) -> ImageView<'_> {
        // SAFETY: `pixels` came from `lock_pixels` on `self.bitmap`, which is
        // alive for the borrow; the caller of `bind` guaranteed it covers
        // `geometry.byte_len()` bytes, and `ForeignBitmap` that nothing else
        // accesses them.
        unsafe { ImageView::from_raw_parts(self.pixels.as_ptr(), self.geometry) }
    }

    /// Read-write view over the foreign pixels.
    #[inline]
    pub fn view_mut(&mut self) -> ImageViewMut<'_> {
        // SAFETY: as in `view`; `&mut self` makes this the only view.
        unsafe { ImageViewMut::from_raw_parts(self.pixels.as_ptr(), self.geometry) }
    }
}

// SAFETY: the raw pointer is owned exclusively together with the handle, so
// sending the pair is sound whenever sending the handle is.
unsafe impl<B: ForeignBitmap + Send> Send for BoundBitmap<B> {}

impl<B: ForeignBitmap> std::fmt::Debug for BoundBitmap<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundBitmap")
            .field("pixels", &self.pixels)
            .field("geometry", &self.geometry)
            .field("live", &self.bitmap.is_live())
            .finish()
    }
}
