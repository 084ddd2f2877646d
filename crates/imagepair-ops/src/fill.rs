//! Solid fills.

use crate::rows::for_each_row;
use imagepair_core::{Color, ImageViewMut, LocalFormat};
use tracing::trace;

/// Sets every pixel of `view` to `color`.
///
/// With `swap_for_foreign` on a 32-bit view, red and blue of `color` are
/// exchanged first, so the stored bytes equal a local fill followed by
/// [`swap_red_blue`](crate::swizzle::swap_red_blue). 16-bit views ignore the
/// flag and store the RGB565 packing of `color`.
///
/// # Example
///
/// ```rust
/// use imagepair_core::{Color, LocalFormat, OwnedImage};
/// use imagepair_ops::fill;
///
/// let mut image = OwnedImage::new(8, 8, LocalFormat::Argb32).unwrap();
/// fill(&mut image.view_mut(), Color::rgb(255, 0, 0), true);
/// assert_eq!(image.view().pixel32(3, 3), Some(0xFF00_00FF));
/// ```
pub fn fill(view: &mut ImageViewMut<'_>, color: Color, swap_for_foreign: bool) {
    trace!(
        width = view.width(),
        height = view.height(),
        ?color,
        swap_for_foreign,
        "fill"
    );
    match view.format() {
        LocalFormat::Argb32 => {
            let color = if swap_for_foreign { color.swap_red_blue() } else { color };
            let px = color.to_argb32().to_ne_bytes();
            for_each_row(view, |row| {
                for chunk in row.chunks_exact_mut(4) {
                    chunk.copy_from_slice(&px);
                }
            });
        }
        LocalFormat::Rgb16 => {
            let px = color.to_rgb565().to_ne_bytes();
            for_each_row(view, |row| {
                for chunk in row.chunks_exact_mut(2) {
                    chunk.copy_from_slice(&px);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::swizzle::swap_red_blue;
    use imagepair_core::{BitmapGeometry, OwnedImage};

    #[test]
    fn test_fill_argb() {
        let mut image = OwnedImage::new(5, 3, LocalFormat::Argb32).unwrap();
        fill(&mut image.view_mut(), Color::rgba(1, 2, 3, 4), false);
        for y in 0..3 {
            for x in 0..5 {
                assert_eq!(image.view().pixel32(x, y), Some(0x0401_0203));
            }
        }
    }

    #[test]
    fn test_swapped_fill_matches_swizzle() {
        let color = Color::rgba(200, 100, 50, 255);
        let mut a = OwnedImage::new(6, 4, LocalFormat::Argb32).unwrap();
        let mut b = a.clone();
        fill(&mut a.view_mut(), color, true);
        fill(&mut b.view_mut(), color, false);
        swap_red_blue(&mut b.view_mut());
        assert_eq!(a, b);
    }

    #[test]
    fn test_fill_rgb16_ignores_swap() {
        let mut image = OwnedImage::new(4, 4, LocalFormat::Rgb16).unwrap();
        fill(&mut image.view_mut(), Color::rgb(255, 0, 0), true);
        assert_eq!(image.view().pixel16(2, 2), Some(0xF800));
    }

    #[test]
    fn test_fill_keeps_padding() {
        let g = BitmapGeometry::new(2, 2, 12, LocalFormat::Argb32).unwrap();
        let mut data = vec![0xAAu8; g.byte_len()];
        fill(&mut ImageViewMut::new(&mut data, g).unwrap(), Color::BLACK, false);
        assert_eq!(&data[8..12], &[0xAA; 4]);
    }
}
