//! Fill colors and their packed pixel encodings.

/// An 8-bit per channel, non-premultiplied color.
///
/// # Example
///
/// ```rust
/// use imagepair_core::Color;
///
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.to_argb32(), 0xFFFF_0000);
/// assert_eq!(red.to_rgb565(), 0xF800);
/// assert_eq!(red.swap_red_blue(), Color::rgb(0, 0, 255));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color {
    /// Red
    pub r: u8,
    /// Green
    pub g: u8,
    /// Blue
    pub b: u8,
    /// Alpha, 255 is opaque
    pub a: u8,
}

impl Color {
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// Creates a color from all four channels.
    #[inline]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// Unpacks a `0xAARRGGBB` value.
    #[inline]
    pub const fn from_argb32(argb: u32) -> Self {
        Self {
            a: (argb >> 24) as u8,
            r: (argb >> 16) as u8,
            g: (argb >> 8) as u8,
            b: argb as u8,
        }
    }

    /// Packs into `0xAARRGGBB`.
    #[inline]
    pub const fn to_argb32(&self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }

    /// Packs into RGB 5-6-5, dropping alpha and the low channel bits.
    #[inline]
    pub const fn to_rgb565(&self) -> u16 {
        ((self.r as u16 >> 3) << 11) | ((self.g as u16 >> 2) << 5) | (self.b as u16 >> 3)
    }

    /// Returns the color with red and blue exchanged.
    #[inline]
    pub const fn swap_red_blue(&self) -> Self {
        Self::rgba(self.b, self.g, self.r, self.a)
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self::rgba(r, g, b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argb_pack_unpack() {
        let c = Color::rgba(0x12, 0x34, 0x56, 0x78);
        assert_eq!(c.to_argb32(), 0x7812_3456);
        assert_eq!(Color::from_argb32(0x7812_3456), c);
    }

    #[test]
    fn test_rgb565() {
        assert_eq!(Color::WHITE.to_rgb565(), 0xFFFF);
        assert_eq!(Color::rgb(0, 255, 0).to_rgb565(), 0x07E0);
        assert_eq!(Color::rgb(0, 0, 255).to_rgb565(), 0x001F);
    }

    #[test]
    fn test_swap_keeps_green_alpha() {
        let c = Color::rgba(1, 2, 3, 4).swap_red_blue();
        assert_eq!(c, Color::rgba(3, 2, 1, 4));
    }
}
