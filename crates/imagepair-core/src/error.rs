//! Error types for imagepair operations.
//!
//! This module provides the single error enum shared by every stage of a
//! bitmap binding: allocation, layout probing, pixel locking and view
//! construction.
//!
//! # Overview
//!
//! The [`Error`] enum covers the failure modes of:
//! - Requested sizes rejected before anything is touched
//! - Foreign bitmap allocation
//! - Pixel format translation
//! - Locking foreign memory for direct access
//! - Geometry validation when wrapping raw or owned memory
//!
//! # Usage
//!
//! ```rust
//! use imagepair_core::{Error, Result};
//!
//! fn check_request(width: i32, height: i32) -> Result<()> {
//!     if width < 1 || height < 1 {
//!         return Err(Error::InvalidRequestedSize { width, height });
//!     }
//!     Ok(())
//! }
//! assert!(check_request(0, 5).is_err());
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] - For derive macro error implementation

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while binding, probing or viewing a pixel buffer.
///
/// # Categories
///
/// - **Request errors**: [`InvalidRequestedSize`](Error::InvalidRequestedSize)
/// - **Allocation errors**: [`AllocationFailed`](Error::AllocationFailed)
/// - **Format errors**: [`UnrecognizedFormat`](Error::UnrecognizedFormat)
/// - **Lock errors**: [`LockFailed`](Error::LockFailed), [`NullPixels`](Error::NullPixels)
/// - **Geometry errors**: [`InvalidDimensions`](Error::InvalidDimensions),
///   [`InvalidStride`](Error::InvalidStride), [`BufferTooSmall`](Error::BufferTooSmall)
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height passed to a resize is below 1.
    ///
    /// Rejected at the boundary; existing state is left untouched.
    #[error("requested size {width}x{height} is invalid: both sides must be at least 1")]
    InvalidRequestedSize {
        /// Requested width
        width: i32,
        /// Requested height
        height: i32,
    },

    /// The foreign runtime did not produce a usable bitmap.
    ///
    /// Covers a null handle, a handle whose underlying object is gone, and
    /// an error raised by the runtime during the allocation call.
    #[error("failed to allocate {width}x{height} foreign bitmap: {reason}")]
    AllocationFailed {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Failure reason
        reason: String,
    },

    /// The foreign bitmap reported a plausible geometry with a pixel format
    /// code that has no local counterpart.
    #[error("unrecognized foreign pixel format code {code}")]
    UnrecognizedFormat {
        /// Raw foreign format code
        code: u32,
    },

    /// Locking the foreign pixels returned an error status.
    #[error("failed to lock foreign pixels, status {status}")]
    LockFailed {
        /// Status code returned by the foreign runtime
        status: i32,
    },

    /// Locking the foreign pixels succeeded but produced a null pointer.
    #[error("foreign pixel lock returned a null pointer")]
    NullPixels,

    /// Image dimensions are zero or overflow buffer size computations.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Width
        width: u32,
        /// Height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the given width and pixel size.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride in bytes
        stride: usize,
        /// Minimum required stride in bytes
        min_stride: usize,
        /// Image width
        width: u32,
    },

    /// Backing memory is shorter than the geometry requires.
    #[error("buffer of {len} bytes is too small, geometry needs {required}")]
    BufferTooSmall {
        /// Bytes available
        len: usize,
        /// Bytes required
        required: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidRequestedSize`] error.
    #[inline]
    pub fn invalid_requested_size(width: i32, height: i32) -> Self {
        Self::InvalidRequestedSize { width, height }
    }

    /// Creates an [`Error::AllocationFailed`] error.
    #[inline]
    pub fn allocation_failed(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::AllocationFailed {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnrecognizedFormat`] error.
    #[inline]
    pub fn unrecognized_format(code: u32) -> Self {
        Self::UnrecognizedFormat { code }
    }

    /// Creates an [`Error::LockFailed`] error.
    #[inline]
    pub fn lock_failed(status: i32) -> Self {
        Self::LockFailed { status }
    }

    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::InvalidStride`] error.
    #[inline]
    pub fn invalid_stride(stride: usize, min_stride: usize, width: u32) -> Self {
        Self::InvalidStride {
            stride,
            min_stride,
            width,
        }
    }

    /// Returns `true` if the foreign runtime failed to hand out a bitmap.
    #[inline]
    pub fn is_allocation_error(&self) -> bool {
        matches!(self, Self::AllocationFailed { .. })
    }

    /// Returns `true` if locking the pixels failed in either way.
    #[inline]
    pub fn is_lock_error(&self) -> bool {
        matches!(self, Self::LockFailed { .. } | Self::NullPixels)
    }

    /// Returns `true` if this is a geometry validation error.
    #[inline]
    pub fn is_geometry_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidDimensions { .. }
                | Self::InvalidStride { .. }
                | Self::BufferTooSmall { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_requested_size() {
        let err = Error::invalid_requested_size(0, 5);
        let msg = err.to_string();
        assert!(msg.contains("0x5"));
        assert!(!err.is_allocation_error());
    }

    #[test]
    fn test_allocation_failed() {
        let err = Error::allocation_failed(100, 50, "runtime returned null");
        assert!(err.to_string().contains("100x50"));
        assert!(err.to_string().contains("runtime returned null"));
        assert!(err.is_allocation_error());
    }

    #[test]
    fn test_lock_errors() {
        assert!(Error::lock_failed(-1).is_lock_error());
        assert!(Error::NullPixels.is_lock_error());
        assert!(!Error::unrecognized_format(7).is_lock_error());
    }

    #[test]
    fn test_geometry_errors() {
        let err = Error::invalid_stride(100, 400, 100);
        assert!(err.to_string().contains("400"));
        assert!(err.is_geometry_error());
    }
}
