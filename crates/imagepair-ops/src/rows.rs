//! Row iteration shared by the pixel loops.
//!
//! With the `parallel` feature, rows are processed with Rayon's
//! `par_chunks_mut`; otherwise sequentially. Either way each closure call
//! receives one row's pixel bytes with padding excluded.

use imagepair_core::{ImageView, ImageViewMut};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Images below this many pixels are processed on the calling thread.
#[cfg(feature = "parallel")]
const PARALLEL_MIN_PIXELS: usize = 64 * 1024;

/// Applies `f` to the pixel bytes of every row of `view`.
pub(crate) fn for_each_row<F>(view: &mut ImageViewMut<'_>, f: F)
where
    F: Fn(&mut [u8]) + Sync + Send,
{
    let stride = view.stride();
    let row_bytes = view.row_bytes();

    #[cfg(feature = "parallel")]
    {
        if view.geometry().pixel_count() >= PARALLEL_MIN_PIXELS {
            view.as_bytes_mut()
                .par_chunks_mut(stride)
                .for_each(|row| f(&mut row[..row_bytes]));
            return;
        }
    }

    view.as_bytes_mut()
        .chunks_mut(stride)
        .for_each(|row| f(&mut row[..row_bytes]));
}

/// Applies `f` to paired source and destination rows.
///
/// Both views must have the same dimensions and format.
pub(crate) fn for_each_row_pair<F>(src: &ImageView<'_>, dst: &mut ImageViewMut<'_>, f: F)
where
    F: Fn(&[u8], &mut [u8]) + Sync + Send,
{
    debug_assert_eq!(src.dimensions(), dst.dimensions());
    debug_assert_eq!(src.format(), dst.format());
    let src_stride = src.stride();
    let dst_stride = dst.stride();
    let row_bytes = dst.row_bytes();
    let src_bytes = src.as_bytes();

    #[cfg(feature = "parallel")]
    {
        if dst.geometry().pixel_count() >= PARALLEL_MIN_PIXELS {
            dst.as_bytes_mut()
                .par_chunks_mut(dst_stride)
                .zip(src_bytes.par_chunks(src_stride))
                .for_each(|(d, s)| f(&s[..row_bytes], &mut d[..row_bytes]));
            return;
        }
    }

    dst.as_bytes_mut()
        .chunks_mut(dst_stride)
        .zip(src_bytes.chunks(src_stride))
        .for_each(|(d, s)| f(&s[..row_bytes], &mut d[..row_bytes]));
}
