//! Red/blue channel swizzle between local ARGB32 and foreign RGBA_8888.
//!
//! A local `Argb32` pixel is the native-endian `u32` `0xAARRGGBB`. The
//! foreign side stores R, G, B, A in memory. Exchanging the red and blue
//! bytes of the `u32` converts one into the other, and applying it again
//! converts back, so one primitive serves both directions:
//!
//! ```text
//! p' = (p & 0xFF00FF00) | ((p & 0x00FF0000) >> 16) | ((p & 0x000000FF) << 16)
//! ```
//!
//! [`to_foreign_order`] and [`to_local_order`] both call [`swap_red_blue`];
//! the names only document intent at call sites. Views in a 16-bit format
//! are left untouched.
//!
//! # Example
//!
//! ```rust
//! use imagepair_core::{LocalFormat, OwnedImage};
//! use imagepair_ops::swizzle::{to_foreign_order, to_local_order};
//!
//! let mut image = OwnedImage::new(2, 2, LocalFormat::Argb32).unwrap();
//! image.view_mut().set_pixel32(0, 0, 0x80FF_2010);
//!
//! to_foreign_order(&mut image.view_mut());
//! assert_eq!(image.view().pixel32(0, 0), Some(0x8010_20FF));
//!
//! to_local_order(&mut image.view_mut());
//! assert_eq!(image.view().pixel32(0, 0), Some(0x80FF_2010));
//! ```

use crate::rows::{for_each_row, for_each_row_pair};
use imagepair_core::{ImageView, ImageViewMut, OwnedImage};
use tracing::trace;

/// Exchanges the red and blue bytes of one ARGB32 pixel.
#[inline(always)]
pub const fn swap_red_blue_pixel(p: u32) -> u32 {
    (p & 0xFF00_FF00) | ((p & 0x00FF_0000) >> 16) | ((p & 0x0000_00FF) << 16)
}

#[inline]
fn swap_row_in_place(row: &mut [u8]) {
    for px in row.chunks_exact_mut(4) {
        let p = u32::from_ne_bytes([px[0], px[1], px[2], px[3]]);
        px.copy_from_slice(&swap_red_blue_pixel(p).to_ne_bytes());
    }
}

#[inline]
fn swap_row_into(src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        let p = u32::from_ne_bytes([s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&swap_red_blue_pixel(p).to_ne_bytes());
    }
}

/// Swaps red and blue of every pixel in place.
///
/// No-op unless the view is `Argb32`. Row padding is never touched.
/// Applying it twice restores the original bytes.
pub fn swap_red_blue(view: &mut ImageViewMut<'_>) {
    if !view.format().is_32bit() {
        return;
    }
    trace!(width = view.width(), height = view.height(), "swap_red_blue in place");
    for_each_row(view, swap_row_in_place);
}

/// Converts a local ARGB32 view to the foreign byte order in place.
#[inline]
pub fn to_foreign_order(view: &mut ImageViewMut<'_>) {
    swap_red_blue(view);
}

/// Converts a view in the foreign byte order back to local ARGB32 in place.
#[inline]
pub fn to_local_order(view: &mut ImageViewMut<'_>) {
    swap_red_blue(view);
}

/// Writes a red/blue swapped copy of `src` into `dest`.
///
/// `dest` is reallocated as a packed image when its dimensions or format
/// differ from `src`; otherwise its existing storage and stride are reused.
/// For non-32-bit formats `dest` receives an unmodified copy.
pub fn swap_red_blue_into(src: &ImageView<'_>, dest: &mut OwnedImage) {
    if dest.dimensions() != src.dimensions() || dest.format() != src.format() {
        trace!(
            from = ?dest.dimensions(),
            to = ?src.dimensions(),
            format = %src.format(),
            "reallocating swizzle destination"
        );
        *dest = OwnedImage::zeroed(packed_like(src));
    }
    let mut out = dest.view_mut();
    if src.format().is_32bit() {
        for_each_row_pair(src, &mut out, swap_row_into);
    } else {
        for_each_row_pair(src, &mut out, |s, d| d.copy_from_slice(s));
    }
}

/// Copy-out variant of [`to_foreign_order`].
#[inline]
pub fn to_foreign_order_into(src: &ImageView<'_>, dest: &mut OwnedImage) {
    swap_red_blue_into(src, dest);
}

/// Copy-out variant of [`to_local_order`].
#[inline]
pub fn to_local_order_into(src: &ImageView<'_>, dest: &mut OwnedImage) {
    swap_red_blue_into(src, dest);
}

fn packed_like(src: &ImageView<'_>) -> imagepair_core::BitmapGeometry {
    // A valid geometry always has a valid packed counterpart.
    imagepair_core::BitmapGeometry::packed(src.width(), src.height(), src.format())
        .unwrap_or(src.geometry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use imagepair_core::{BitmapGeometry, LocalFormat};

    fn patterned(
        width: u32,
        height: u32,
        stride: usize,
        format: LocalFormat,
    ) -> (Vec<u8>, BitmapGeometry) {
        let g = BitmapGeometry::new(width, height, stride, format).unwrap();
        let data = (0..g.byte_len()).map(|i| (i * 37 + 11) as u8).collect();
        (data, g)
    }

    #[test]
    fn test_pixel_formula() {
        assert_eq!(swap_red_blue_pixel(0x1122_3344), 0x1144_3322);
        assert_eq!(swap_red_blue_pixel(0xFFFF_0000), 0xFF00_00FF);
    }

    #[test]
    fn test_involution_padded() {
        let (mut data, g) = patterned(7, 5, 40, LocalFormat::Argb32);
        let original = data.clone();
        let mut view = ImageViewMut::new(&mut data, g).unwrap();
        swap_red_blue(&mut view);
        assert_ne!(view.as_bytes(), &original[..]);
        swap_red_blue(&mut view);
        assert_eq!(data, original);
    }

    #[test]
    fn test_padding_untouched() {
        let (mut data, g) = patterned(3, 2, 16, LocalFormat::Argb32);
        let original = data.clone();
        swap_red_blue(&mut ImageViewMut::new(&mut data, g).unwrap());
        assert_eq!(&data[12..16], &original[12..16]);
    }

    #[test]
    fn test_16bit_is_noop() {
        let (mut data, g) = patterned(9, 4, 18, LocalFormat::Rgb16);
        let original = data.clone();
        to_foreign_order(&mut ImageViewMut::new(&mut data, g).unwrap());
        assert_eq!(data, original);
    }

    #[test]
    fn test_copy_out_reallocates() {
        let (data, g) = patterned(4, 3, 20, LocalFormat::Argb32);
        let src = ImageView::new(&data, g).unwrap();
        let mut dest = OwnedImage::placeholder(LocalFormat::Rgb16);
        to_foreign_order_into(&src, &mut dest);
        assert_eq!(dest.dimensions(), (4, 3));
        assert_eq!(dest.format(), LocalFormat::Argb32);
        for y in 0..3 {
            for x in 0..4 {
                let p = src.pixel32(x, y).unwrap();
                assert_eq!(dest.view().pixel32(x, y), Some(swap_red_blue_pixel(p)));
            }
        }
    }

    #[test]
    fn test_copy_out_reuses_matching_storage() {
        let (data, g) = patterned(4, 3, 16, LocalFormat::Argb32);
        let src = ImageView::new(&data, g).unwrap();
        let mut dest = OwnedImage::new(4, 3, LocalFormat::Argb32).unwrap();
        let before = dest.as_bytes().as_ptr();
        swap_red_blue_into(&src, &mut dest);
        assert_eq!(dest.as_bytes().as_ptr(), before);
        let mut back = OwnedImage::placeholder(LocalFormat::Argb32);
        to_local_order_into(&dest.view(), &mut back);
        assert_eq!(back.as_bytes(), src.as_bytes());
    }

    #[test]
    fn test_copy_out_16bit_copies() {
        let (data, g) = patterned(5, 2, 10, LocalFormat::Rgb16);
        let src = ImageView::new(&data, g).unwrap();
        let mut dest = OwnedImage::placeholder(LocalFormat::Argb32);
        swap_red_blue_into(&src, &mut dest);
        assert_eq!(dest.as_bytes(), src.as_bytes());
    }
}
