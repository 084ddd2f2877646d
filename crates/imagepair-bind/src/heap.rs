//! In-process foreign runtime backed by the local heap.
//!
//! [`HeapRuntime`] behaves like a platform bitmap runtime without leaving the
//! process: bitmaps are plain heap blocks that only the handle frees. It can
//! be configured to misbehave the way real runtimes do (bogus layout
//! reports, failing locks, null allocations), and it counts live bitmaps so
//! callers can check exactly when memory is released.
//!
//! # Example
//!
//! ```rust
//! use imagepair_bind::heap::{HeapRuntime, InfoQuirk};
//! use imagepair_bind::ImagePair;
//! use imagepair_core::PixelDepth;
//!
//! let runtime = HeapRuntime::new().with_info_quirk(InfoQuirk::Transposed);
//! let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
//! pair.resize(64, 32).unwrap();
//! assert_eq!(pair.size(), (64, 32));
//! assert_eq!(runtime.live_bitmaps(), 1);
//! drop(pair);
//! assert_eq!(runtime.live_bitmaps(), 0);
//! ```

use crate::foreign::{ForeignBitmap, ForeignError, ForeignRuntime, RawBitmapInfo};
use imagepair_core::{LocalFormat, PixelDepth};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// How a bitmap answers layout queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InfoQuirk {
    /// Reports the true layout.
    #[default]
    Accurate,
    /// The query fails with the given status.
    QueryFails(i32),
    /// Every field is zero.
    Zeroed,
    /// Stride in the width slot, width in the height slot, zero stride.
    Transposed,
    /// True layout except for a zero format code.
    ZeroFormat,
    /// True layout except for a zero stride.
    ZeroStride,
    /// True layout with the given format code.
    Format(u32),
    /// Reports exactly this block; storage grows to cover it.
    Report(RawBitmapInfo),
}

/// How a bitmap answers lock requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockQuirk {
    /// Returns the storage address.
    #[default]
    Normal,
    /// Fails with the given status.
    Fails(i32),
    /// Succeeds with a null pointer.
    NullPointer,
}

/// How the runtime answers allocation requests.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AllocQuirk {
    /// Allocates normally.
    #[default]
    Normal,
    /// Returns a null handle.
    Null,
    /// Raises an error with the given message.
    Raise(String),
    /// Returns a handle whose object is already gone.
    DeadObject,
}

#[derive(Debug, Clone, Default)]
struct Quirks {
    info: InfoQuirk,
    lock: LockQuirk,
    alloc: AllocQuirk,
    row_padding: u32,
}

/// Heap-backed [`ForeignRuntime`].
///
/// Clones share configuration and counters, so a runtime handed to an
/// [`ImagePair`](crate::ImagePair) can still be reconfigured and inspected
/// through another clone or a shared reference.
#[derive(Debug, Clone, Default)]
pub struct HeapRuntime {
    quirks: Arc<RwLock<Quirks>>,
    live: Arc<AtomicUsize>,
    allocated: Arc<AtomicUsize>,
}

impl HeapRuntime {
    /// Creates a well-behaved runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how bitmaps answer layout queries.
    pub fn with_info_quirk(self, quirk: InfoQuirk) -> Self {
        self.set_info_quirk(quirk);
        self
    }

    /// Sets how bitmaps answer lock requests.
    pub fn with_lock_quirk(self, quirk: LockQuirk) -> Self {
        self.set_lock_quirk(quirk);
        self
    }

    /// Sets how allocation requests are answered.
    pub fn with_alloc_quirk(self, quirk: AllocQuirk) -> Self {
        self.set_alloc_quirk(quirk);
        self
    }

    /// Pads every row of new bitmaps by `bytes`.
    pub fn with_row_padding(self, bytes: u32) -> Self {
        self.write().row_padding = bytes;
        self
    }

    /// Changes the layout quirk of bitmaps allocated from now on.
    pub fn set_info_quirk(&self, quirk: InfoQuirk) {
        self.write().info = quirk;
    }

    /// Changes the lock quirk of bitmaps allocated from now on.
    pub fn set_lock_quirk(&self, quirk: LockQuirk) {
        self.write().lock = quirk;
    }

    /// Changes the allocation quirk.
    pub fn set_alloc_quirk(&self, quirk: AllocQuirk) {
        self.write().alloc = quirk;
    }

    /// Number of bitmaps currently alive.
    pub fn live_bitmaps(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of bitmaps handed out so far.
    pub fn total_allocations(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, Quirks> {
        self.quirks.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Quirks> {
        self.quirks.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn report_for(quirk: InfoQuirk, actual: RawBitmapInfo) -> Result<RawBitmapInfo, i32> {
    match quirk {
        InfoQuirk::Accurate => Ok(actual),
        InfoQuirk::QueryFails(status) => Err(status),
        InfoQuirk::Zeroed => Ok(RawBitmapInfo::ZEROED),
        InfoQuirk::Transposed => Ok(RawBitmapInfo {
            width: actual.stride,
            height: actual.width,
            stride: 0,
            ..actual
        }),
        InfoQuirk::ZeroFormat => Ok(RawBitmapInfo { format: 0, ..actual }),
        InfoQuirk::ZeroStride => Ok(RawBitmapInfo { stride: 0, ..actual }),
        InfoQuirk::Format(format) => Ok(RawBitmapInfo { format, ..actual }),
        InfoQuirk::Report(info) => Ok(info),
    }
}

impl ForeignRuntime for HeapRuntime {
    type Bitmap = HeapBitmap;

    fn allocate(
        &self,
        width: u32,
        height: u32,
        depth: PixelDepth,
    ) -> Result<Option<HeapBitmap>, ForeignError> {
        let quirks = self.read().clone();
        match &quirks.alloc {
            AllocQuirk::Normal | AllocQuirk::DeadObject => {}
            AllocQuirk::Null => return Ok(None),
            AllocQuirk::Raise(message) => {
                return Err(ForeignError::new("createBitmap", message.clone()));
            }
        }

        let stride = width
            .checked_mul(depth.bytes_per_pixel() as u32)
            .and_then(|v| v.checked_add(quirks.row_padding))
            .ok_or_else(|| ForeignError::new("createBitmap", "bitmap too large"))?;
        let actual = RawBitmapInfo {
            width,
            height,
            stride,
            format: LocalFormat::default_for_depth(depth).foreign_code(),
            flags: 0,
        };
        let reported = report_for(quirks.info, actual);

        let mut len = stride as usize * height as usize;
        if let Ok(info) = reported {
            len = len.max(info.stride as usize * info.height as usize);
        }

        let memory = NonNull::from(Box::leak(vec![0u8; len].into_boxed_slice()));
        self.live.fetch_add(1, Ordering::SeqCst);
        self.allocated.fetch_add(1, Ordering::SeqCst);
        trace!(width, height, stride, len, "heap bitmap allocated");

        Ok(Some(HeapBitmap {
            memory,
            actual,
            reported,
            lock: quirks.lock,
            live: !matches!(quirks.alloc, AllocQuirk::DeadObject),
            counter: Arc::clone(&self.live),
        }))
    }
}

/// Bitmap allocated by [`HeapRuntime`].
pub struct HeapBitmap {
    memory: NonNull<[u8]>,
    actual: RawBitmapInfo,
    reported: Result<RawBitmapInfo, i32>,
    lock: LockQuirk,
    live: bool,
    counter: Arc<AtomicUsize>,
}

impl HeapBitmap {
    /// True layout, whatever the bitmap reports.
    pub fn actual_info(&self) -> RawBitmapInfo {
        self.actual
    }

    /// Raw storage, as the foreign side sees it.
    pub fn bytes(&self) -> &[u8] {
        // SAFETY: `memory` is a leaked boxed slice owned by `self` and freed
        // only in `drop`.
        unsafe { self.memory.as_ref() }
    }
}

// SAFETY: `lock_pixels` returns the start of `memory`, which holds at least
// `stride * height` bytes of both the true and the reported layout, lives
// until `drop`, and is touched by nothing else.
unsafe impl ForeignBitmap for HeapBitmap {
    fn is_live(&self) -> bool {
        self.live
    }

    fn query_info(&self) -> Result<RawBitmapInfo, i32> {
        self.reported
    }

    fn lock_pixels(&mut self) -> Result<*mut u8, i32> {
        match self.lock {
            LockQuirk::Normal => Ok(self.memory.cast::<u8>().as_ptr()),
            LockQuirk::Fails(status) => Err(status),
            LockQuirk::NullPointer => Ok(std::ptr::null_mut()),
        }
    }
}

// SAFETY: the storage is owned exclusively by the handle.
unsafe impl Send for HeapBitmap {}

impl Drop for HeapBitmap {
    fn drop(&mut self) {
        // SAFETY: `memory` came from `Box::leak` in `allocate` and is freed
        // exactly once, here.
        drop(unsafe { Box::from_raw(self.memory.as_ptr()) });
        self.counter.fetch_sub(1, Ordering::SeqCst);
        trace!(width = self.actual.width, height = self.actual.height, "heap bitmap released");
    }
}

impl std::fmt::Debug for HeapBitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeapBitmap")
            .field("actual", &self.actual)
            .field("reported", &self.reported)
            .field("live", &self.live)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagepair_core::foreign_code;

    #[test]
    fn test_accurate_layout() {
        let runtime = HeapRuntime::new();
        let bmp = runtime.allocate(10, 4, PixelDepth::Bits16).unwrap().unwrap();
        let info = bmp.query_info().unwrap();
        assert_eq!(info.stride, 20);
        assert_eq!(info.format, foreign_code::RGB_565);
        assert_eq!(bmp.bytes().len(), 80);
    }

    #[test]
    fn test_transposed_report() {
        let runtime = HeapRuntime::new().with_info_quirk(InfoQuirk::Transposed);
        let bmp = runtime.allocate(100, 50, PixelDepth::Bits32).unwrap().unwrap();
        let info = bmp.query_info().unwrap();
        assert_eq!((info.width, info.height, info.stride), (400, 100, 0));
    }

    #[test]
    fn test_storage_covers_report() {
        let report = RawBitmapInfo {
            width: 10,
            height: 10,
            stride: 64,
            format: foreign_code::RGBA_8888,
            flags: 0,
        };
        let runtime = HeapRuntime::new().with_info_quirk(InfoQuirk::Report(report));
        let bmp = runtime.allocate(4, 4, PixelDepth::Bits32).unwrap().unwrap();
        assert_eq!(bmp.bytes().len(), 640);
    }

    #[test]
    fn test_live_accounting() {
        let runtime = HeapRuntime::new();
        let a = runtime.allocate(1, 1, PixelDepth::Bits32).unwrap().unwrap();
        let b = runtime.allocate(1, 1, PixelDepth::Bits32).unwrap().unwrap();
        assert_eq!(runtime.live_bitmaps(), 2);
        drop(a);
        assert_eq!(runtime.live_bitmaps(), 1);
        drop(b);
        assert_eq!(runtime.live_bitmaps(), 0);
        assert_eq!(runtime.total_allocations(), 2);
    }

    #[test]
    fn test_alloc_quirks() {
        let runtime = HeapRuntime::new().with_alloc_quirk(AllocQuirk::Null);
        assert!(runtime.allocate(1, 1, PixelDepth::Bits32).unwrap().is_none());

        let runtime = HeapRuntime::new().with_alloc_quirk(AllocQuirk::Raise("boom".into()));
        assert!(runtime.allocate(1, 1, PixelDepth::Bits32).is_err());

        let runtime = HeapRuntime::new().with_alloc_quirk(AllocQuirk::DeadObject);
        let bmp = runtime.allocate(1, 1, PixelDepth::Bits32).unwrap().unwrap();
        assert!(!bmp.is_live());
    }
}
