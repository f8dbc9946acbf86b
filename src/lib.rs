// SPDX-License-Identifier: MPL-2.0
//! `svgscale` converts SVG images to PNG at a chosen scale factor.
//!
//! The output of converting `icon.svg` at scale 2 is `icon-2x.png` in the
//! configured output directory. Two interchangeable renderers are available:
//! an in-process rasterizer built on `resvg`, and an adapter around the OS
//! thumbnail utility (`qlmanage` on macOS).
//!
//! ```no_run
//! use svgscale::config::Config;
//! use svgscale::conversion::Converter;
//! use svgscale::domain::ScaleFactor;
//! use std::path::Path;
//!
//! let converter = Converter::from_config(&Config::default());
//! let result = converter.convert(Path::new("icon.svg"), ScaleFactor::new(2.0)?)?;
//! println!("{} ({}x{})", result.output_path.display(), result.width, result.height);
//! # Ok::<(), svgscale::error::Error>(())
//! ```

pub mod config;
pub mod conversion;
pub mod directory_scanner;
pub mod domain;
pub mod error;
pub mod paths;
