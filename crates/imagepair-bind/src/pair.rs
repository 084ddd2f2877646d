//! A foreign bitmap and its local view, kept valid together.
//!
//! [`ImagePair`] owns at most one bound foreign bitmap. It is either
//! disposed, showing a 1x1 placeholder image and holding no handle, or bound,
//! showing a zero-copy view of the foreign pixels.
//!
//! # Lifecycle
//!
//! ```text
//!            resize ok                 resize to same size (no-op)
//! Disposed ------------> Bound ------------------------------+
//!    ^  ^                  |  ^                               |
//!    |  |   dispose/fail   |  +-------------------------------+
//!    |  +------------------+
//!    +-- dispose (no-op)
//! ```
//!
//! A resize to a new size builds the new binding completely before the old
//! one is released. Any failure while building leaves the pair disposed,
//! never half bound.

use crate::binder::BoundBitmap;
use crate::foreign::{ForeignBitmap, ForeignRuntime};
use crate::probe::probe_layout;
use imagepair_core::{
    BitmapGeometry, Color, Error, ImageView, ImageViewMut, LocalFormat, OwnedImage, PixelDepth,
    Result, Size,
};
use imagepair_ops::swizzle;
use tracing::{debug, error};

/// Options for creating an [`ImagePair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairOptions {
    /// Bit depth of the foreign bitmaps.
    pub depth: PixelDepth,
    /// Log the reported and chosen layout of every new bitmap at debug level.
    pub log_geometry: bool,
}

impl PairOptions {
    /// Options for the given depth.
    pub fn new(depth: PixelDepth) -> Self {
        Self {
            depth,
            ..Self::default()
        }
    }

    /// Options for a raw bit count; see [`PixelDepth::from_bits`].
    pub fn from_bits(bits: i32) -> Self {
        Self::new(PixelDepth::from_bits(bits))
    }

    /// Sets geometry logging.
    pub fn log_geometry(mut self, enabled: bool) -> Self {
        self.log_geometry = enabled;
        self
    }
}

fn placeholder(depth: PixelDepth) -> OwnedImage {
    OwnedImage::placeholder(LocalFormat::default_for_depth(depth))
}

enum Surface<B: ForeignBitmap> {
    Disposed(OwnedImage),
    Bound(BoundBitmap<B>),
}

/// A foreign bitmap paired with a local image over the same memory.
///
/// All operations are synchronous and take `&mut self` when they may
/// rebind, so a view obtained from the pair cannot be held across
/// [`resize`](Self::resize) or [`dispose`](Self::dispose).
pub struct ImagePair<R: ForeignRuntime> {
    runtime: R,
    options: PairOptions,
    surface: Surface<R::Bitmap>,
}

impl<R: ForeignRuntime> ImagePair<R> {
    /// Creates a disposed pair.
    pub fn new(runtime: R, depth: PixelDepth) -> Self {
        Self::with_options(runtime, PairOptions::new(depth))
    }

    /// Creates a disposed pair with options.
    pub fn with_options(runtime: R, options: PairOptions) -> Self {
        Self {
            runtime,
            options,
            surface: Surface::Disposed(placeholder(options.depth)),
        }
    }

    /// Bit depth fixed at construction.
    #[inline]
    pub fn depth(&self) -> PixelDepth {
        self.options.depth
    }

    /// Options the pair was created with.
    #[inline]
    pub fn options(&self) -> PairOptions {
        self.options
    }

    /// The runtime bitmaps are allocated from.
    #[inline]
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Releases the foreign bitmap and resets the view to the placeholder.
    ///
    /// Does nothing if already disposed.
    pub fn dispose(&mut self) {
        if matches!(&self.surface, Surface::Disposed(image) if image.is_placeholder()) {
            return;
        }
        debug!("disposing image pair");
        self.surface = Surface::Disposed(placeholder(self.options.depth));
    }

    /// Makes the pair hold a bitmap of `width` x `height`.
    ///
    /// Returns immediately if already bound at that size. Otherwise
    /// allocates, probes and binds a new bitmap, and only then releases the
    /// old one.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidRequestedSize`] if a side is below 1; the pair is
    ///   left as it was
    /// - any allocation, probe or lock error; the pair is disposed
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        debug!(width, height, "resizing image pair");
        if !Size::new(width, height).is_valid() {
            error!(width, height, "supplied image dimensions are invalid");
            return Err(Error::invalid_requested_size(width, height));
        }
        let (width, height) = (width as u32, height as u32);

        if self.is_allocated() && self.view().dimensions() == (width, height) {
            return Ok(());
        }

        match self.build(width, height) {
            Ok(bound) => {
                // Assigning drops the previous surface, after the new one is complete.
                self.surface = Surface::Bound(bound);
                Ok(())
            }
            Err(e) => {
                self.dispose();
                Err(e)
            }
        }
    }

    /// [`resize`](Self::resize) taking a [`Size`].
    pub fn resize_to(&mut self, size: impl Into<Size>) -> Result<()> {
        let size = size.into();
        self.resize(size.width, size.height)
    }

    fn build(&self, width: u32, height: u32) -> Result<BoundBitmap<R::Bitmap>> {
        let depth = self.options.depth;
        let bitmap = match self.runtime.allocate(width, height, depth) {
            Ok(Some(bitmap)) if bitmap.is_live() => bitmap,
            Ok(Some(_)) => {
                error!(width, height, "could not create bitmap, object reference is null");
                return Err(Error::allocation_failed(width, height, "object reference is null"));
            }
            Ok(None) => {
                error!(width, height, "could not create bitmap, runtime returned null");
                return Err(Error::allocation_failed(width, height, "runtime returned null"));
            }
            Err(e) => {
                error!(width, height, error = %e, "failed to create bitmap");
                return Err(Error::allocation_failed(width, height, e.to_string()));
            }
        };

        let probed = probe_layout(&bitmap, width, height, depth)?;
        if self.options.log_geometry {
            debug!(
                reported = ?probed.reported,
                chosen = ?probed.geometry,
                source = ?probed.source,
                "bitmap geometry"
            );
        }
        // SAFETY: `probed.geometry` is either a layout the bitmap reported or
        // the packed layout of its allocated size and depth, both covered by
        // the `ForeignBitmap` contract.
        unsafe { BoundBitmap::bind(bitmap, probed.geometry) }
    }

    /// Whether a live bitmap is bound and viewable.
    pub fn is_allocated(&self) -> bool {
        matches!(&self.surface, Surface::Bound(bound) if bound.is_live())
    }

    /// Size of the bound bitmap, or `(0, 0)` when not allocated.
    pub fn size(&self) -> (u32, u32) {
        if !self.is_allocated() {
            return (0, 0);
        }
        self.view().dimensions()
    }

    /// Geometry of the bound bitmap, or `None` when not allocated.
    pub fn geometry(&self) -> Option<BitmapGeometry> {
        match &self.surface {
            Surface::Bound(bound) if bound.is_live() => Some(bound.geometry()),
            _ => None,
        }
    }

    /// The bound foreign handle, if any.
    pub fn bitmap(&self) -> Option<&R::Bitmap> {
        match &self.surface {
            Surface::Bound(bound) => Some(bound.bitmap()),
            Surface::Disposed(_) => None,
        }
    }

    /// Current view: the foreign pixels when bound, else the placeholder.
    pub fn view(&self) -> ImageView<'_> {
        match &self.surface {
            Surface::Bound(bound) => bound.view(),
            Surface::Disposed(image) => image.view(),
        }
    }

    /// Mutable current view: the foreign pixels when bound, else the
    /// placeholder.
    pub fn view_mut(&mut self) -> ImageViewMut<'_> {
        match &mut self.surface {
            Surface::Bound(bound) => bound.view_mut(),
            Surface::Disposed(image) => image.view_mut(),
        }
    }

    /// Sets every pixel to `color`; see [`imagepair_ops::fill`].
    pub fn fill(&mut self, color: Color, swap_for_foreign: bool) {
        imagepair_ops::fill(&mut self.view_mut(), color, swap_for_foreign);
    }

    /// Swaps red and blue of every 32-bit pixel in place.
    pub fn swap_red_blue(&mut self) {
        swizzle::swap_red_blue(&mut self.view_mut());
    }

    /// Converts the pixels from local ARGB32 to the foreign order in place.
    pub fn to_foreign_order(&mut self) {
        swizzle::to_foreign_order(&mut self.view_mut());
    }

    /// Converts the pixels from the foreign order to local ARGB32 in place.
    pub fn to_local_order(&mut self) {
        swizzle::to_local_order(&mut self.view_mut());
    }

    /// Writes a red/blue swapped copy of the pixels into `out`, leaving the
    /// shared memory untouched.
    pub fn swap_red_blue_into(&self, out: &mut OwnedImage) {
        swizzle::swap_red_blue_into(&self.view(), out);
    }

    /// Writes a foreign-order copy of the pixels into `out`.
    pub fn to_foreign_order_into(&self, out: &mut OwnedImage) {
        swizzle::to_foreign_order_into(&self.view(), out);
    }

    /// Writes a local-order copy of the pixels into `out`.
    pub fn to_local_order_into(&self, out: &mut OwnedImage) {
        swizzle::to_local_order_into(&self.view(), out);
    }
}

impl<R: ForeignRuntime> std::fmt::Debug for ImagePair<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut s = f.debug_struct("ImagePair");
        s.field("depth", &self.options.depth);
        match &self.surface {
            Surface::Bound(bound) => s.field("bound", bound),
            Surface::Disposed(_) => s.field("bound", &"disposed"),
        };
        s.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heap::{AllocQuirk, HeapRuntime, InfoQuirk, LockQuirk};
    use imagepair_core::foreign_code;

    #[test]
    fn test_starts_disposed() {
        let pair = ImagePair::new(HeapRuntime::new(), PixelDepth::Bits32);
        assert!(!pair.is_allocated());
        assert_eq!(pair.size(), (0, 0));
        assert_eq!(pair.view().dimensions(), (1, 1));
        assert_eq!(pair.view().format(), LocalFormat::Argb32);
        assert!(pair.bitmap().is_none());
    }

    #[test]
    fn test_placeholder_matches_depth() {
        let pair = ImagePair::new(HeapRuntime::new(), PixelDepth::Bits16);
        assert_eq!(pair.view().format(), LocalFormat::Rgb16);
    }

    #[test]
    fn test_resize_binds() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(100, 50).unwrap();
        assert!(pair.is_allocated());
        assert_eq!(pair.size(), (100, 50));
        assert_eq!(pair.geometry().unwrap().stride(), 400);
        assert_eq!(runtime.live_bitmaps(), 1);
    }

    #[test]
    fn test_resize_same_size_keeps_binding() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(20, 10).unwrap();
        let ptr = pair.view().as_ptr();
        pair.resize(20, 10).unwrap();
        assert_eq!(pair.view().as_ptr(), ptr);
        assert_eq!(runtime.total_allocations(), 1);
    }

    #[test]
    fn test_resize_replaces_binding() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(20, 10).unwrap();
        pair.resize(30, 10).unwrap();
        assert_eq!(pair.size(), (30, 10));
        assert_eq!(runtime.live_bitmaps(), 1);
        assert_eq!(runtime.total_allocations(), 2);
    }

    #[test]
    fn test_invalid_size_leaves_state() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(8, 8).unwrap();
        let ptr = pair.view().as_ptr();
        assert!(matches!(
            pair.resize(0, 5),
            Err(Error::InvalidRequestedSize { width: 0, height: 5 })
        ));
        assert!(pair.resize_to((5, -1)).is_err());
        assert!(pair.is_allocated());
        assert_eq!(pair.size(), (8, 8));
        assert_eq!(pair.view().as_ptr(), ptr);
        assert_eq!(runtime.total_allocations(), 1);
    }

    #[test]
    fn test_allocation_failures_dispose() {
        let quirks = [
            AllocQuirk::Null,
            AllocQuirk::Raise("no class".into()),
            AllocQuirk::DeadObject,
        ];
        for quirk in quirks {
            let runtime = HeapRuntime::new();
            let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
            pair.resize(4, 4).unwrap();
            runtime.set_alloc_quirk(quirk.clone());
            let err = pair.resize(5, 5).unwrap_err();
            assert!(err.is_allocation_error(), "{quirk:?}");
            assert!(!pair.is_allocated());
            assert_eq!(pair.size(), (0, 0));
            assert_eq!(runtime.live_bitmaps(), 0, "{quirk:?}");
        }
    }

    #[test]
    fn test_unrecognized_format_disposes() {
        let runtime = HeapRuntime::new().with_info_quirk(InfoQuirk::Format(foreign_code::A_8));
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        let err = pair.resize(4, 4).unwrap_err();
        assert!(matches!(err, Error::UnrecognizedFormat { code } if code == foreign_code::A_8));
        assert_eq!(pair.size(), (0, 0));
        assert_eq!(runtime.live_bitmaps(), 0);
    }

    #[test]
    fn test_lock_failure_disposes_bound_pair() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(4, 4).unwrap();
        assert_eq!(runtime.live_bitmaps(), 1);

        runtime.set_lock_quirk(LockQuirk::NullPointer);
        assert!(pair.resize(6, 6).unwrap_err().is_lock_error());
        assert!(!pair.is_allocated());
        assert_eq!(runtime.live_bitmaps(), 0);
    }

    #[test]
    fn test_dispose_idempotent() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(4, 4).unwrap();
        pair.dispose();
        assert_eq!(runtime.live_bitmaps(), 0);
        pair.dispose();
        assert!(!pair.is_allocated());
        assert_eq!(pair.size(), (0, 0));
        assert_eq!(pair.view().dimensions(), (1, 1));
    }

    #[test]
    fn test_fill_swapped_on_foreign_bytes() {
        let runtime = HeapRuntime::new();
        let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
        pair.resize(3, 2).unwrap();
        pair.fill(Color::rgb(255, 0, 0), true);
        let bytes = pair.bitmap().unwrap().bytes();
        let first = u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(first, 0xFF00_00FF);
    }

    #[test]
    fn test_copy_out_leaves_pair_untouched() {
        let mut pair = ImagePair::new(HeapRuntime::new(), PixelDepth::Bits32);
        pair.resize(2, 2).unwrap();
        pair.fill(Color::rgba(1, 2, 3, 4), false);
        let mut out = OwnedImage::placeholder(LocalFormat::Argb32);
        pair.to_foreign_order_into(&mut out);
        assert_eq!(out.view().pixel32(1, 1), Some(0x0403_0201));
        assert_eq!(pair.view().pixel32(1, 1), Some(0x0401_0203));

        let mut swapped = OwnedImage::placeholder(LocalFormat::Rgb16);
        pair.swap_red_blue_into(&mut swapped);
        assert_eq!(swapped, out);
    }
}
