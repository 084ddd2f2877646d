//! Integration tests for imagepair crates.
//!
//! This crate contains end-to-end tests that drive an
//! [`ImagePair`](imagepair_bind::ImagePair) against the in-process heap
//! runtime and check what ends up in the foreign memory.
