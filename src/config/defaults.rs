// SPDX-License-Identifier: MPL-2.0
//! Centralized default values for all configuration constants.
//!
//! # Categories
//!
//! - **Raster**: fallback viewport and pixel budget for the in-process renderer
//! - **Thumbnail**: external thumbnail tool invocation

// ==========================================================================
// Raster Defaults
// ==========================================================================

/// Width assumed when the root `<svg>` has no usable `width` attribute.
pub const DEFAULT_VIEWPORT_WIDTH: f64 = 300.0;

/// Height assumed when the root `<svg>` has no usable `height` attribute.
pub const DEFAULT_VIEWPORT_HEIGHT: f64 = 150.0;

/// Largest surface (in pixels) the raster renderer will allocate (2^28).
///
/// At 4 bytes per pixel this is 1 GiB of RGBA data.
pub const DEFAULT_MAX_PIXELS: u64 = 1 << 28;

/// Lower bound accepted for the configured pixel budget.
pub const MIN_MAX_PIXELS: u64 = 1;

// ==========================================================================
// Thumbnail Defaults
// ==========================================================================

/// The macOS Quick Look utility used by the thumbnail renderer.
pub const DEFAULT_THUMBNAIL_PROGRAM: &str = "/usr/bin/qlmanage";

/// Thumbnail edge length at scale 1, in pixels.
pub const THUMBNAIL_BASE_EDGE: u32 = 1000;

/// Prefix of the per-invocation working directory created next to the output.
pub const TEMP_DIR_PREFIX: &str = ".temp-";

// ==========================================================================
// Compile-time Validation
// ==========================================================================

const _: () = {
    assert!(DEFAULT_VIEWPORT_WIDTH > 0.0);
    assert!(DEFAULT_VIEWPORT_HEIGHT > 0.0);
    assert!(DEFAULT_MAX_PIXELS >= MIN_MAX_PIXELS);
    assert!(THUMBNAIL_BASE_EDGE > 0);
};
