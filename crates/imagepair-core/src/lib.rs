//! # imagepair-core
//!
//! Core types for pixel buffers that live on one side of a boundary and are
//! viewed from the other.
//!
//! This crate provides the foundational types used throughout imagepair:
//!
//! - [`PixelDepth`], [`LocalFormat`] - Bit depths and pixel formats, plus the
//!   mapping from foreign format codes
//! - [`BitmapGeometry`] - Validated width/height/stride/format layout
//! - [`ImageView`], [`ImageViewMut`] - Zero-copy views over pixel memory
//! - [`OwnedImage`] - Heap-backed image for copies and placeholders
//! - [`Color`] - Fill colors with ARGB32 and RGB565 packing
//!
//! ## Design Philosophy
//!
//! The core principle is that **a view can never outlive its memory**. Views
//! carry a lifetime tied to whatever owns the pixels, and geometry is
//! validated once at construction so pixel loops can index rows without
//! further checks:
//!
//! ```rust
//! use imagepair_core::{BitmapGeometry, LocalFormat, OwnedImage};
//!
//! let mut image = OwnedImage::new(64, 32, LocalFormat::Argb32).unwrap();
//! let mut view = image.view_mut();
//! view.set_pixel32(0, 0, 0xFF00_FF00);
//! assert_eq!(image.view().pixel32(0, 0), Some(0xFF00_FF00));
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! imagepair-core (this crate)
//!    ^
//!    |
//!    +-- imagepair-ops (red/blue swizzle, fill)
//!    +-- imagepair-bind (foreign runtime, layout probe, binder, ImagePair)
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for format, geometry and color types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod color;
pub mod error;
pub mod format;
pub mod geometry;
pub mod image;

// Re-exports for convenience
pub use color::Color;
pub use error::*;
pub use format::{foreign_code, LocalFormat, PixelDepth, DEPTH_FALLBACK_TARGET};
pub use geometry::{BitmapGeometry, Size};
pub use image::{ImageView, ImageViewMut, OwnedImage};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use imagepair_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::color::Color;
    pub use crate::error::{Error, Result};
    pub use crate::format::{LocalFormat, PixelDepth};
    pub use crate::geometry::{BitmapGeometry, Size};
    pub use crate::image::{ImageView, ImageViewMut, OwnedImage};
}
