//! Discovery of a freshly allocated bitmap's memory layout.
//!
//! The runtime is asked for the bitmap's geometry, and the answer is used
//! only if it is plausible as a whole. Some runtimes report zeroed fields,
//! transposed fields (stride in place of width, width in place of height,
//! zero stride) or fail the query while the bitmap itself is usable.
//!
//! # Policy
//!
//! 1. A failed query counts as an all-zero answer.
//! 2. The answer is trusted only if format, stride, width and height are all
//!    non-zero and `stride >= width`. Otherwise every field is replaced by
//!    the standard layout for the requested size and depth. Fields are never
//!    patched one by one.
//! 3. A trusted answer with a format code that has no local counterpart
//!    fails the probe.
//! 4. A trusted answer whose stride cannot hold `width` pixels of the
//!    reported format is distrusted as a whole, as in step 2.
//! 5. A trusted size different from the requested one is logged and kept.

use crate::foreign::{ForeignBitmap, RawBitmapInfo};
use imagepair_core::{BitmapGeometry, LocalFormat, PixelDepth, Result};
use tracing::{debug, error, warn};

/// Where a probed geometry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    /// Reported by the runtime and found plausible.
    Reported,
    /// Computed from the requested size because the report was unusable.
    Fallback,
}

/// Result of a successful probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbedLayout {
    /// Layout to build the view with
    pub geometry: BitmapGeometry,
    /// Origin of `geometry`
    pub source: LayoutSource,
    /// What the runtime reported, after demoting a failed query to zeros
    pub reported: RawBitmapInfo,
}

/// Whether a reported layout is plausible enough to use at all.
///
/// Compares raw `stride` (bytes) against raw `width` (pixels); this only
/// catches grossly wrong answers, the format-aware check happens after the
/// format is known.
#[inline]
pub fn is_trustworthy(info: &RawBitmapInfo) -> bool {
    info.format != 0
        && info.stride != 0
        && info.width != 0
        && info.height != 0
        && info.stride >= info.width
}

/// Standard layout of a bitmap of the requested size and depth.
pub fn fallback_geometry(width: u32, height: u32, depth: PixelDepth) -> Result<BitmapGeometry> {
    let stride = width as usize * depth.bytes_per_pixel();
    BitmapGeometry::new(width, height, stride, LocalFormat::default_for_depth(depth))
}

/// Queries `bitmap` and settles on the geometry to bind with.
///
/// `width` and `height` are the size the bitmap was allocated with.
///
/// # Errors
///
/// - [`Error::UnrecognizedFormat`](imagepair_core::Error::UnrecognizedFormat)
///   if a plausible report names an unknown format
/// - [`Error::InvalidDimensions`](imagepair_core::Error::InvalidDimensions)
///   if even the fallback layout overflows
pub fn probe_layout<B: ForeignBitmap>(
    bitmap: &B,
    width: u32,
    height: u32,
    depth: PixelDepth,
) -> Result<ProbedLayout> {
    let reported = match bitmap.query_info() {
        Ok(info) => info,
        Err(status) => {
            warn!(status, "could not get bitmap info, falling back to standard layout");
            RawBitmapInfo::ZEROED
        }
    };

    let probed = if is_trustworthy(&reported) {
        let format = LocalFormat::from_foreign_code(reported.format)?;
        let stride = reported.stride as usize;
        match BitmapGeometry::new(reported.width, reported.height, stride, format) {
            Ok(geometry) => ProbedLayout {
                geometry,
                source: LayoutSource::Reported,
                reported,
            },
            Err(e) => {
                error!(
                    ?reported,
                    %format,
                    error = %e,
                    "reported stride cannot hold a row, falling back to standard layout"
                );
                fallback(width, height, depth, reported)?
            }
        }
    } else {
        error!(
            width = reported.width,
            height = reported.height,
            stride = reported.stride,
            format = reported.format,
            flags = reported.flags,
            "invalid bitmap info, falling back to standard layout"
        );
        fallback(width, height, depth, reported)?
    };

    if probed.geometry.dimensions() != (width, height) {
        warn!(
            actual = ?probed.geometry.dimensions(),
            requested = ?(width, height),
            "bitmap size differs from the requested size"
        );
    }
    debug!(
        width = probed.geometry.width(),
        height = probed.geometry.height(),
        stride = probed.geometry.stride(),
        format = %probed.geometry.format(),
        source = ?probed.source,
        "probed bitmap layout"
    );
    Ok(probed)
}

fn fallback(
    width: u32,
    height: u32,
    depth: PixelDepth,
    reported: RawBitmapInfo,
) -> Result<ProbedLayout> {
    Ok(ProbedLayout {
        geometry: fallback_geometry(width, height, depth)?,
        source: LayoutSource::Fallback,
        reported,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagepair_core::{foreign_code, Error};

    struct Reporting(std::result::Result<RawBitmapInfo, i32>);

    // SAFETY: never hands out a pointer.
    unsafe impl ForeignBitmap for Reporting {
        fn is_live(&self) -> bool {
            true
        }

        fn query_info(&self) -> std::result::Result<RawBitmapInfo, i32> {
            self.0
        }

        fn lock_pixels(&mut self) -> std::result::Result<*mut u8, i32> {
            Err(-1)
        }
    }

    fn info(width: u32, height: u32, stride: u32, format: u32) -> RawBitmapInfo {
        RawBitmapInfo {
            width,
            height,
            stride,
            format,
            flags: 0,
        }
    }

    #[test]
    fn test_accurate_report_is_used() {
        let bmp = Reporting(Ok(info(100, 50, 448, foreign_code::RGBA_8888)));
        let probed = probe_layout(&bmp, 100, 50, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Reported);
        assert_eq!(probed.geometry.stride(), 448);
        assert_eq!(probed.geometry.format(), LocalFormat::Argb32);
    }

    #[test]
    fn test_zero_stride_falls_back() {
        let bmp = Reporting(Ok(info(77, 33, 0, foreign_code::RGB_565)));
        let probed = probe_layout(&bmp, 100, 50, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Fallback);
        assert_eq!(probed.geometry.dimensions(), (100, 50));
        assert_eq!(probed.geometry.stride(), 400);
        assert_eq!(probed.geometry.format(), LocalFormat::Argb32);
    }

    #[test]
    fn test_zero_format_replaces_every_field() {
        let bmp = Reporting(Ok(info(64, 64, 512, 0)));
        let probed = probe_layout(&bmp, 40, 20, PixelDepth::Bits16).unwrap();
        assert_eq!(probed.source, LayoutSource::Fallback);
        assert_eq!(probed.geometry.dimensions(), (40, 20));
        assert_eq!(probed.geometry.stride(), 80);
        assert_eq!(probed.geometry.format(), LocalFormat::Rgb16);
    }

    #[test]
    fn test_transposed_report_falls_back() {
        // stride in the width slot, width in the height slot, zero stride
        let bmp = Reporting(Ok(info(400, 100, 0, foreign_code::RGBA_8888)));
        let probed = probe_layout(&bmp, 100, 50, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Fallback);
        assert_eq!(probed.geometry.dimensions(), (100, 50));
    }

    #[test]
    fn test_stride_below_width_falls_back() {
        let bmp = Reporting(Ok(info(100, 50, 99, foreign_code::RGBA_8888)));
        let probed = probe_layout(&bmp, 100, 50, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Fallback);
    }

    #[test]
    fn test_stride_too_short_for_format_falls_back() {
        let bmp = Reporting(Ok(info(100, 50, 100, foreign_code::RGBA_8888)));
        let probed = probe_layout(&bmp, 100, 50, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Fallback);
        assert_eq!(probed.geometry.stride(), 400);
    }

    #[test]
    fn test_failed_query_falls_back() {
        let bmp = Reporting(Err(-3));
        let probed = probe_layout(&bmp, 10, 10, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Fallback);
        assert_eq!(probed.reported, RawBitmapInfo::ZEROED);
    }

    #[test]
    fn test_unknown_format_fails() {
        let bmp = Reporting(Ok(info(10, 10, 40, foreign_code::RGBA_F16)));
        let err = probe_layout(&bmp, 10, 10, PixelDepth::Bits32).unwrap_err();
        assert!(matches!(
            err,
            Error::UnrecognizedFormat { code } if code == foreign_code::RGBA_F16
        ));
    }

    #[test]
    fn test_size_mismatch_is_kept() {
        let bmp = Reporting(Ok(info(128, 64, 512, foreign_code::RGBA_8888)));
        let probed = probe_layout(&bmp, 100, 50, PixelDepth::Bits32).unwrap();
        assert_eq!(probed.source, LayoutSource::Reported);
        assert_eq!(probed.geometry.dimensions(), (128, 64));
    }
}
