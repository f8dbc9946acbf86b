// SPDX-License-Identifier: MPL-2.0
//! Output file naming.

use crate::domain::ScaleFactor;
use std::path::{Path, PathBuf};

/// Stem used when the input path has no usable file name.
const FALLBACK_STEM: &str = "image";

/// Generates the output filename for a conversion.
///
/// Format: `{input_stem}-{scale}x.png`
#[must_use]
pub fn output_file_name(input: &Path, scale: ScaleFactor) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_STEM.into());
    format!("{stem}-{scale}x.png")
}

/// Joins [`output_file_name`] onto `destination`.
///
/// Pure: nothing is checked on disk, and two conversions of the same file at
/// the same scale map to the same path.
#[must_use]
pub fn output_path(input: &Path, destination: &Path, scale: ScaleFactor) -> PathBuf {
    destination.join(output_file_name(input, scale))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scale(value: f64) -> ScaleFactor {
        ScaleFactor::new(value).unwrap()
    }

    #[test]
    fn icon_at_2x_lands_in_destination() {
        let path = output_path(Path::new("/src/icon.svg"), Path::new("/out"), scale(2.0));
        assert_eq!(path, PathBuf::from("/out/icon-2x.png"));
    }

    #[test]
    fn fractional_scale_keeps_decimal() {
        let name = output_file_name(Path::new("logo.svg"), scale(1.5));
        assert_eq!(name, "logo-1.5x.png");
    }

    #[test]
    fn only_last_extension_is_dropped() {
        let name = output_file_name(Path::new("/a/b/archive.min.svg"), scale(4.0));
        assert_eq!(name, "archive.min-4x.png");
    }

    #[test]
    fn uppercase_extension_is_dropped_too() {
        let name = output_file_name(Path::new("BADGE.SVG"), scale(1.0));
        assert_eq!(name, "BADGE-1x.png");
    }

    #[test]
    fn path_without_file_name_uses_fallback() {
        let name = output_file_name(Path::new("/"), scale(8.0));
        assert_eq!(name, "image-8x.png");
    }

    #[test]
    fn same_inputs_give_same_path() {
        let a = output_path(Path::new("x.svg"), Path::new("/o"), scale(16.0));
        let b = output_path(Path::new("x.svg"), Path::new("/o"), scale(16.0));
        assert_eq!(a, b);
    }
}
