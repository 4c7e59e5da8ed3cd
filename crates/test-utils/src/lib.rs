//! Shared test utilities for the weather-overlay workspace.
//!
//! This crate provides common testing infrastructure including:
//! - Synthetic PNG generators
//! - Catalogue manifest fixtures
//! - Scratch directory helpers
//!
//! # Usage
//!
//! Add to your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! test-utils = { path = "../test-utils" }
//! ```
//!
//! Then import in your tests:
//!
//! ```ignore
//! use test_utils::{fixtures, solid_png};
//! ```

pub mod fixtures;
pub mod generators;
pub mod paths;

// Re-export commonly used items at the crate root
pub use fixtures::*;
pub use generators::*;
pub use paths::*;

/// Assert that every pixel of a decoded PNG equals `expected`.
///
/// # Usage
///
/// ```ignore
/// use test_utils::assert_all_pixels;
///
/// assert_all_pixels!(&png_bytes, [255, 255, 255, 0]);
/// ```
#[macro_export]
macro_rules! assert_all_pixels {
    ($png:expr, $expected:expr) => {{
        let decoded = $crate::decode_rgba($png);
        let expected: [u8; 4] = $expected;
        if let Some((x, y, px)) = decoded.enumerate_pixels().find(|(_, _, p)| p.0 != expected) {
            panic!(
                "assertion failed: pixel ({}, {}) is `{:?}`, expected `{:?}`",
                x, y, px.0, expected
            );
        }
    }};
}
