// SPDX-License-Identifier: MPL-2.0
//! SVG to PNG conversion.
//!
//! A [`Converter`] owns one [`Renderer`] and the output directory. Each call to
//! [`Converter::convert`] builds a [`ConversionRequest`], checks the input,
//! hands the request to the renderer and inspects the file it produced.
//!
//! Two renderers are provided:
//! - [`RasterRenderer`]: scales the root viewport and rasterizes in-process
//! - [`ThumbnailRenderer`]: delegates to an OS thumbnail utility

pub mod output_path;
pub mod raster;
pub mod svg_document;
pub mod thumbnail;

pub use output_path::{output_file_name, output_path};
pub use raster::{RasterOptions, RasterRenderer, RenderedPng};
pub use svg_document::SvgDocument;
pub use thumbnail::ThumbnailRenderer;

use crate::config::{Config, RendererKind};
use crate::domain::ScaleFactor;
use crate::error::{Error, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One conversion to perform.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub input_path: PathBuf,
    pub scale: ScaleFactor,
    pub output_directory: PathBuf,
}

impl ConversionRequest {
    pub fn new(
        input_path: impl Into<PathBuf>,
        scale: ScaleFactor,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            scale,
            output_directory: output_directory.into(),
        }
    }

    /// `<output_directory>/<input-stem>-<scale>x.png`
    pub fn output_path(&self) -> PathBuf {
        output_path(&self.input_path, &self.output_directory, self.scale)
    }

    /// Fails with [`Error::InputNotFound`] unless the input is a readable file.
    pub fn validate(&self) -> Result<()> {
        match fs::metadata(&self.input_path) {
            Ok(meta) if meta.is_file() => Ok(()),
            Ok(_) => Err(Error::InputNotFound(format!(
                "{} is not a file",
                self.input_path.display()
            ))),
            Err(e) => Err(Error::InputNotFound(format!(
                "{}: {e}",
                self.input_path.display()
            ))),
        }
    }
}

/// A written PNG and its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub output_path: PathBuf,
    pub width: u32,
    pub height: u32,
}

impl ConversionResult {
    /// Checks that `output_path` holds a non-empty image and reads its size.
    pub fn inspect(output_path: PathBuf) -> Result<Self> {
        let meta = fs::metadata(&output_path).map_err(|e| {
            Error::Render(format!(
                "renderer reported {} but it cannot be read: {e}",
                output_path.display()
            ))
        })?;
        if meta.len() == 0 {
            return Err(Error::Render(format!(
                "renderer wrote an empty file at {}",
                output_path.display()
            )));
        }
        let (width, height) = image_rs::image_dimensions(&output_path).map_err(|e| {
            Error::Render(format!("{} is not a readable image: {e}", output_path.display()))
        })?;
        Ok(Self {
            output_path,
            width,
            height,
        })
    }
}

/// A strategy that turns a request into a PNG file on disk.
pub trait Renderer {
    /// Short name used in logs and CLI output.
    fn name(&self) -> &'static str;

    /// Writes the PNG for `request` and returns its path.
    ///
    /// The input has already been validated by the caller.
    fn render(&self, request: &ConversionRequest) -> Result<PathBuf>;
}

/// Builds the renderer selected in `config`.
pub fn build_renderer(config: &Config) -> Box<dyn Renderer> {
    build_renderer_of_kind(config.renderer(), config)
}

/// Builds a renderer of `kind`, tuned from `config`.
pub fn build_renderer_of_kind(kind: RendererKind, config: &Config) -> Box<dyn Renderer> {
    match kind {
        RendererKind::Raster => Box::new(RasterRenderer::new(RasterOptions::from_config(config))),
        RendererKind::Thumbnail => Box::new(ThumbnailRenderer::from_config(config)),
    }
}

/// Runs conversions into one output directory with one renderer.
pub struct Converter {
    renderer: Box<dyn Renderer>,
    output_directory: PathBuf,
}

impl Converter {
    pub fn new(renderer: Box<dyn Renderer>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            output_directory: output_directory.into(),
        }
    }

    /// Converter using the configured renderer and output directory.
    pub fn from_config(config: &Config) -> Self {
        Self::new(build_renderer(config), config.output_directory())
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.name()
    }

    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    #[must_use]
    pub fn request(&self, input: &Path, scale: ScaleFactor) -> ConversionRequest {
        ConversionRequest::new(input, scale, &self.output_directory)
    }

    /// Converts `input` at `scale`.
    ///
    /// An existing file at the output path is overwritten.
    ///
    /// # Errors
    ///
    /// - [`Error::InputNotFound`] if `input` is missing; nothing is written
    /// - [`Error::FileSystem`] if the output directory cannot be created
    /// - any error of the renderer
    /// - [`Error::Render`] if the renderer left no usable image behind
    pub fn convert(&self, input: &Path, scale: ScaleFactor) -> Result<ConversionResult> {
        let request = self.request(input, scale);
        request.validate()?;

        fs::create_dir_all(&self.output_directory).map_err(|e| {
            Error::FileSystem(format!(
                "cannot create {}: {e}",
                self.output_directory.display()
            ))
        })?;

        info!(
            input = %request.input_path.display(),
            %scale,
            renderer = self.renderer.name(),
            "converting"
        );
        let written = self.renderer.render(&request)?;
        let result = ConversionResult::inspect(written)?;
        debug!(
            output = %result.output_path.display(),
            width = result.width,
            height = result.height,
            "conversion finished"
        );
        Ok(result)
    }
}
