//! # imagepair-bind
//!
//! Zero-copy pairing of bitmaps owned by a foreign graphics runtime with
//! local image views.
//!
//! The foreign runtime allocates the pixels and is the only party that may
//! free them. This crate locks those pixels, works out their real layout and
//! hands out [`ImageView`](imagepair_core::ImageView)s straight over the
//! foreign memory, with the handle and the view released together.
//!
//! # Modules
//!
//! - [`foreign`] - Traits a runtime binding implements
//! - [`probe`] - Layout discovery that tolerates bogus reports
//! - [`binder`] - Locked pixels plus geometry, owned with the handle
//! - [`pair`] - [`ImagePair`], the lifecycle of one shared bitmap
//! - [`heap`] - In-process runtime with configurable quirks
//!
//! # Example
//!
//! ```rust
//! use imagepair_bind::{heap::HeapRuntime, ImagePair};
//! use imagepair_core::{Color, PixelDepth};
//!
//! let runtime = HeapRuntime::new();
//! let mut pair = ImagePair::new(&runtime, PixelDepth::Bits32);
//! pair.resize(100, 50)?;
//! pair.fill(Color::rgb(255, 0, 0), true);
//! assert_eq!(pair.size(), (100, 50));
//!
//! pair.dispose();
//! assert_eq!(pair.size(), (0, 0));
//! # Ok::<(), imagepair_core::Error>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - Forwarded to `imagepair-ops`

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod binder;
pub mod foreign;
pub mod heap;
pub mod pair;
pub mod probe;

pub use binder::BoundBitmap;
pub use foreign::{ForeignBitmap, ForeignError, ForeignRuntime, RawBitmapInfo};
pub use pair::{ImagePair, PairOptions};
pub use probe::{probe_layout, LayoutSource, ProbedLayout};
