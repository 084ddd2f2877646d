//! Pixel depth and pixel format mapping.
//!
//! This module translates between the foreign bitmap runtime's pixel format
//! codes and the local image formats, and decides which local format a
//! requested bit depth produces.
//!
//! # Types
//!
//! - [`PixelDepth`] - Bit depth requested when a pair is created (16 or 32)
//! - [`LocalFormat`] - Memory layout of a locally viewed pixel
//! - [`foreign_code`] - Raw format codes reported by the foreign runtime
//!
//! # Usage
//!
//! ```rust
//! use imagepair_core::format::{foreign_code, LocalFormat, PixelDepth};
//!
//! let format = LocalFormat::from_foreign_code(foreign_code::RGBA_8888).unwrap();
//! assert_eq!(format, LocalFormat::Argb32);
//! assert_eq!(LocalFormat::default_for_depth(PixelDepth::Bits16), LocalFormat::Rgb16);
//! ```

use crate::{Error, Result};
use tracing::error;

/// Log target used when an unsupported bit depth is coerced to 32 bits.
pub const DEPTH_FALLBACK_TARGET: &str = "imagepair::depth_fallback";

/// Pixel format codes used by the foreign bitmap runtime.
///
/// Only [`RGBA_8888`](foreign_code::RGBA_8888) and
/// [`RGB_565`](foreign_code::RGB_565) have local counterparts; the others are
/// listed so that log output can name what a bitmap reported.
pub mod foreign_code {
    /// No format; also what a zeroed info block reports.
    pub const NONE: u32 = 0;
    /// 32-bit, byte order R, G, B, A.
    pub const RGBA_8888: u32 = 1;
    /// 16-bit packed 5-6-5.
    pub const RGB_565: u32 = 4;
    /// 16-bit, 4 bits per channel.
    pub const RGBA_4444: u32 = 7;
    /// 8-bit alpha only.
    pub const A_8: u32 = 8;
    /// 64-bit half float.
    pub const RGBA_F16: u32 = 9;

    /// Returns a readable name for a format code.
    pub fn name(code: u32) -> &'static str {
        match code {
            NONE => "NONE",
            RGBA_8888 => "RGBA_8888",
            RGB_565 => "RGB_565",
            RGBA_4444 => "RGBA_4444",
            A_8 => "A_8",
            RGBA_F16 => "RGBA_F16",
            _ => "UNKNOWN",
        }
    }
}

/// Bit depth of a pixel buffer, fixed for the lifetime of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PixelDepth {
    /// 16 bits per pixel, packed 5-6-5.
    Bits16,
    /// 32 bits per pixel, 8 bits per channel.
    #[default]
    Bits32,
}

impl PixelDepth {
    /// Converts a raw bit count into a depth.
    ///
    /// 16 and 32 map directly. Any other value is logged as an error under
    /// [`DEPTH_FALLBACK_TARGET`] and treated as 32 bits, so existing callers
    /// passing odd values keep working.
    ///
    /// # Example
    ///
    /// ```rust
    /// use imagepair_core::PixelDepth;
    ///
    /// assert_eq!(PixelDepth::from_bits(16), PixelDepth::Bits16);
    /// assert_eq!(PixelDepth::from_bits(24), PixelDepth::Bits32);
    /// ```
    pub fn from_bits(bits: i32) -> Self {
        match bits {
            16 => Self::Bits16,
            32 => Self::Bits32,
            other => {
                error!(
                    target: DEPTH_FALLBACK_TARGET,
                    bits = other,
                    "unsupported pixel depth, treating as 32-bit"
                );
                Self::Bits32
            }
        }
    }

    /// Returns `Some` only for the two supported bit counts.
    #[inline]
    pub const fn try_from_bits(bits: i32) -> Option<Self> {
        match bits {
            16 => Some(Self::Bits16),
            32 => Some(Self::Bits32),
            _ => None,
        }
    }

    /// Number of bits per pixel.
    #[inline]
    pub const fn bits(&self) -> u32 {
        match self {
            Self::Bits16 => 16,
            Self::Bits32 => 32,
        }
    }

    /// Number of bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Bits16 => 2,
            Self::Bits32 => 4,
        }
    }
}

/// Memory layout of a pixel as seen by local code.
///
/// `Argb32` pixels are native-endian `u32` values `0xAARRGGBB`; on a
/// little-endian machine the bytes are B, G, R, A. The foreign RGBA_8888
/// layout stores R, G, B, A, which is why 32-bit buffers need a red/blue
/// swap when crossing the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocalFormat {
    /// 16-bit packed RGB 5-6-5.
    Rgb16,
    /// 32-bit ARGB, one native-endian `u32` per pixel.
    Argb32,
}

impl LocalFormat {
    /// Maps a foreign pixel format code to a local format.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognizedFormat`] for any code other than
    /// RGB_565 or RGBA_8888. The failure is also logged; it is never
    /// silently replaced with a default.
    pub fn from_foreign_code(code: u32) -> Result<Self> {
        match code {
            foreign_code::RGB_565 => Ok(Self::Rgb16),
            foreign_code::RGBA_8888 => Ok(Self::Argb32),
            other => {
                error!(
                    code = other,
                    name = foreign_code::name(other),
                    "invalid foreign bitmap format"
                );
                Err(Error::unrecognized_format(other))
            }
        }
    }

    /// Returns the local format a bitmap of the given depth is created with.
    ///
    /// This is the format of the foreign layout the runtime allocates for
    /// that depth: RGBA_8888 for 32 bits, RGB_565 for 16.
    #[inline]
    pub const fn default_for_depth(depth: PixelDepth) -> Self {
        match depth {
            PixelDepth::Bits32 => Self::Argb32,
            PixelDepth::Bits16 => Self::Rgb16,
        }
    }

    /// Foreign code describing the same memory layout.
    #[inline]
    pub const fn foreign_code(&self) -> u32 {
        match self {
            Self::Rgb16 => foreign_code::RGB_565,
            Self::Argb32 => foreign_code::RGBA_8888,
        }
    }

    /// Number of bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb16 => 2,
            Self::Argb32 => 4,
        }
    }

    /// Whether pixels are 32-bit and thus subject to channel reordering.
    #[inline]
    pub const fn is_32bit(&self) -> bool {
        matches!(self, Self::Argb32)
    }

    /// Depth matching this format.
    #[inline]
    pub const fn depth(&self) -> PixelDepth {
        match self {
            Self::Rgb16 => PixelDepth::Bits16,
            Self::Argb32 => PixelDepth::Bits32,
        }
    }
}

impl std::fmt::Display for LocalFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rgb16 => write!(f, "RGB16"),
            Self::Argb32 => write!(f, "ARGB32"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let rgb16 = LocalFormat::from_foreign_code(foreign_code::RGB_565).unwrap();
        let argb32 = LocalFormat::from_foreign_code(foreign_code::RGBA_8888).unwrap();
        assert_eq!(rgb16, LocalFormat::Rgb16);
        assert_eq!(argb32, LocalFormat::Argb32);
    }

    #[test]
    fn test_unknown_codes_are_errors() {
        let codes = [
            foreign_code::NONE,
            foreign_code::RGBA_4444,
            foreign_code::A_8,
            foreign_code::RGBA_F16,
            42,
        ];
        for code in codes {
            let err = LocalFormat::from_foreign_code(code).unwrap_err();
            assert!(matches!(err, Error::UnrecognizedFormat { code: c } if c == code));
        }
    }

    #[test]
    fn test_default_for_depth() {
        assert_eq!(LocalFormat::default_for_depth(PixelDepth::Bits32), LocalFormat::Argb32);
        assert_eq!(LocalFormat::default_for_depth(PixelDepth::Bits16), LocalFormat::Rgb16);
    }

    #[test]
    fn test_depth_fallback() {
        assert_eq!(PixelDepth::from_bits(32), PixelDepth::Bits32);
        assert_eq!(PixelDepth::from_bits(16), PixelDepth::Bits16);
        assert_eq!(PixelDepth::from_bits(8), PixelDepth::Bits32);
        assert_eq!(PixelDepth::from_bits(-1), PixelDepth::Bits32);
        assert_eq!(PixelDepth::try_from_bits(24), None);
    }

    #[test]
    fn test_format_roundtrip_code() {
        for format in [LocalFormat::Rgb16, LocalFormat::Argb32] {
            assert_eq!(LocalFormat::from_foreign_code(format.foreign_code()).unwrap(), format);
            assert_eq!(format.depth().bytes_per_pixel(), format.bytes_per_pixel());
        }
    }
}
