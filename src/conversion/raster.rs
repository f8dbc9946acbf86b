// SPDX-License-Identifier: MPL-2.0
//! In-process renderer: rewrite the root viewport, then rasterize with resvg.
//!
//! The SVG is first parsed as XML so its root `width`/`height` can be scaled
//! (see [`SvgDocument::scale_viewport`]). The rewritten markup is handed to
//! `usvg`, which sizes the tree from those attributes, and `resvg` draws the
//! tree at the origin onto a `tiny_skia` pixmap of exactly that size.

use super::svg_document::SvgDocument;
use super::{ConversionRequest, Renderer};
use crate::config::{Config, SizingPolicy, DEFAULT_MAX_PIXELS};
use crate::domain::ScaleFactor;
use crate::error::{Error, Result};
use resvg::usvg;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Tuning for [`RasterRenderer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub sizing: SizingPolicy,
    /// Upper bound on `width * height` of the output surface.
    pub max_pixels: u64,
    pub load_system_fonts: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            sizing: SizingPolicy::default(),
            max_pixels: DEFAULT_MAX_PIXELS,
            load_system_fonts: true,
        }
    }
}

impl RasterOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            sizing: config.sizing(),
            max_pixels: config.max_pixels(),
            load_system_fonts: config.load_system_fonts(),
        }
    }
}

/// PNG bytes plus the pixel size they encode.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedPng {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// The DOM-style strategy: scale the root viewport and rasterize.
#[derive(Debug, Clone, Default)]
pub struct RasterRenderer {
    options: RasterOptions,
}

impl RasterRenderer {
    #[must_use]
    pub fn new(options: RasterOptions) -> Self {
        Self { options }
    }

    /// Renders SVG markup at `scale` and returns PNG bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::Parse`] if `svg_content` is not a well-formed SVG document
    /// - [`Error::Render`] if the rasterizer rejects the scaled markup, the
    ///   surface would be empty or exceed the pixel budget, or PNG encoding fails
    pub fn render_svg(&self, svg_content: &str, scale: ScaleFactor) -> Result<RenderedPng> {
        self.render_svg_with_resources(svg_content, scale, None)
    }

    /// Like [`render_svg`](Self::render_svg), resolving relative `href`s
    /// against `resources_dir`.
    pub fn render_svg_with_resources(
        &self,
        svg_content: &str,
        scale: ScaleFactor,
        resources_dir: Option<&Path>,
    ) -> Result<RenderedPng> {
        let mut document = SvgDocument::parse(svg_content)?;
        let (width, height) = document.scale_viewport(scale, self.options.sizing);
        debug!(%width, %height, %scale, "scaled root viewport");
        let scaled = document.to_svg_string()?;

        let tree = usvg::Tree::from_str(&scaled, &self.usvg_options(resources_dir))
            .map_err(|e| Error::Render(e.to_string()))?;

        let pixmap_size = tree.size().to_int_size();
        let width = pixmap_size.width();
        let height = pixmap_size.height();
        if width == 0 || height == 0 {
            return Err(Error::Render("SVG has empty dimensions".into()));
        }
        let pixels = u64::from(width) * u64::from(height);
        if pixels > self.options.max_pixels {
            return Err(Error::Render(format!(
                "{width}x{height} exceeds the limit of {} pixels",
                self.options.max_pixels
            )));
        }

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::Render("Failed to allocate SVG pixmap".into()))?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        let data = pixmap
            .encode_png()
            .map_err(|e| Error::Render(e.to_string()))?;

        Ok(RenderedPng {
            data,
            width,
            height,
        })
    }

    fn usvg_options(&self, resources_dir: Option<&Path>) -> usvg::Options<'static> {
        let mut options = usvg::Options::default();
        options.resources_dir = resources_dir.and_then(|dir| fs::canonicalize(dir).ok());
        if self.options.load_system_fonts {
            options.fontdb_mut().load_system_fonts();
        }
        options
    }
}

impl Renderer for RasterRenderer {
    fn name(&self) -> &'static str {
        "raster"
    }

    fn render(&self, request: &ConversionRequest) -> Result<PathBuf> {
        let content = read_svg(&request.input_path)?;
        let png = self.render_svg_with_resources(
            &content,
            request.scale,
            request.input_path.parent(),
        )?;

        let output = request.output_path();
        fs::write(&output, &png.data)
            .map_err(|e| Error::FileSystem(format!("cannot write {}: {e}", output.display())))?;
        debug!(
            path = %output.display(),
            bytes = png.data.len(),
            "wrote PNG"
        );
        Ok(output)
    }
}

/// Reads the SVG source as UTF-8 text.
fn read_svg(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => Error::Parse(format!("{} is not UTF-8 text", path.display())),
        _ => Error::InputNotFound(format!("{}: {e}", path.display())),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image_rs::GenericImageView;

    fn renderer() -> RasterRenderer {
        RasterRenderer::new(RasterOptions {
            load_system_fonts: false,
            ..RasterOptions::default()
        })
    }

    fn scale(value: f64) -> ScaleFactor {
        ScaleFactor::new(value).unwrap()
    }

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="6" height="3" viewBox="0 0 6 3">
        <rect width="6" height="3" fill="blue" />
    </svg>"#;

    #[test]
    fn renders_declared_size_at_scale_one() {
        let png = renderer().render_svg(SQUARE, scale(1.0)).unwrap();
        assert_eq!((png.width, png.height), (6, 3));
    }

    #[test]
    fn output_bytes_decode_to_scaled_size() {
        let png = renderer().render_svg(SQUARE, scale(4.0)).unwrap();
        let decoded = image_rs::load_from_memory(&png.data).expect("valid png");
        assert_eq!(decoded.dimensions(), (24, 12));
    }

    #[test]
    fn content_follows_the_viewport() {
        let png = renderer().render_svg(SQUARE, scale(2.0)).unwrap();
        let decoded = image_rs::load_from_memory(&png.data).unwrap().to_rgba8();
        // The blue rect covers the whole 12x6 surface, bottom-right included.
        assert_eq!(decoded.get_pixel(11, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn missing_dimensions_use_default_viewport() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><circle cx="5" cy="5" r="5"/></svg>"#;
        let png = renderer().render_svg(svg, scale(4.0)).unwrap();
        assert_eq!((png.width, png.height), (1200, 600));
    }

    #[test]
    fn view_box_sizing_uses_view_box() {
        let renderer = RasterRenderer::new(RasterOptions {
            sizing: SizingPolicy::ViewBox,
            load_system_fonts: false,
            ..RasterOptions::default()
        });
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"/>"#;
        let png = renderer.render_svg(svg, scale(2.0)).unwrap();
        assert_eq!((png.width, png.height), (48, 48));
    }

    #[test]
    fn fractional_result_rounds_up() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="5" height="3"/>"#;
        let png = renderer().render_svg(svg, scale(1.5)).unwrap();
        assert_eq!((png.width, png.height), (8, 5));
    }

    #[test]
    fn malformed_markup_is_parse_error() {
        match renderer().render_svg("<svg>oops", scale(1.0)) {
            Err(Error::Parse(message)) => assert!(!message.is_empty()),
            other => panic!("expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn trailing_text_is_parse_error_not_render_error() {
        let svg = r"<svg xmlns='http://www.w3.org/2000/svg' width='2' height='2'/>junk";
        assert!(matches!(renderer().render_svg(svg, scale(1.0)), Err(Error::Parse(_))));
        let svg = r"junk<svg xmlns='http://www.w3.org/2000/svg' width='2' height='2'/>";
        assert!(matches!(renderer().render_svg(svg, scale(1.0)), Err(Error::Parse(_))));
    }

    #[test]
    fn zero_width_is_render_error() {
        let svg = r"<svg xmlns='http://www.w3.org/2000/svg' width='0' height='10'></svg>";
        match renderer().render_svg(svg, scale(2.0)) {
            Err(Error::Render(_)) => {}
            other => panic!("expected Render error, got {other:?}"),
        }
    }

    #[test]
    fn pixel_budget_is_enforced() {
        let renderer = RasterRenderer::new(RasterOptions {
            max_pixels: 100,
            load_system_fonts: false,
            ..RasterOptions::default()
        });
        match renderer.render_svg(SQUARE, scale(8.0)) {
            Err(Error::Render(message)) => assert!(message.contains("exceeds")),
            other => panic!("expected Render error, got {other:?}"),
        }
    }

    #[test]
    fn read_svg_reports_missing_file_as_input_not_found() {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        match read_svg(&temp_dir.path().join("nope.svg")) {
            Err(Error::InputNotFound(_)) => {}
            other => panic!("expected InputNotFound, got {other:?}"),
        }
    }

    #[test]
    fn read_svg_rejects_binary_content() {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let path = temp_dir.path().join("binary.svg");
        fs::write(&path, [0xff, 0xfe, 0x00, 0x80]).unwrap();
        assert!(matches!(read_svg(&path), Err(Error::Parse(_))));
    }
}
