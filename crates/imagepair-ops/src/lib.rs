//! # imagepair-ops
//!
//! Pixel operations applied to shared bitmaps.
//!
//! Everything here works on [`ImageViewMut`](imagepair_core::ImageViewMut),
//! so the same code runs over foreign-owned memory and over local
//! [`OwnedImage`](imagepair_core::OwnedImage) copies.
//!
//! # Modules
//!
//! - [`swizzle`] - Red/blue exchange between local ARGB32 and foreign RGBA_8888
//! - [`fill`](mod@fill) - Solid fills, optionally pre-swapped for the foreign side
//!
//! # Example
//!
//! ```rust
//! use imagepair_core::{Color, LocalFormat, OwnedImage};
//! use imagepair_ops::{fill, swizzle};
//!
//! let mut image = OwnedImage::new(16, 16, LocalFormat::Argb32).unwrap();
//! fill(&mut image.view_mut(), Color::rgb(0, 128, 255), false);
//! swizzle::to_foreign_order(&mut image.view_mut());
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Process rows of large images with Rayon

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod rows;
pub mod fill;
pub mod swizzle;

pub use fill::fill;
pub use swizzle::{swap_red_blue, swap_red_blue_into, swap_red_blue_pixel};
