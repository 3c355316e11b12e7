//! Export the drawing as a PNG and hand it off.
//!
//! Producing the image can fail and surfaces [`ExportError`]. Sharing is best
//! effort: a rejected share is reported but is not an error and does not
//! fall back to a download.

use crate::raster::{PixmapRenderer, DEFAULT_LINE_WIDTH};
use crate::renderer::{render_frame, RenderContext, RendererError};
use peniko::Color;
use scrawl_core::{Drawing, SketchConfig};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name used when the image is downloaded.
pub const EXPORT_FILE_NAME: &str = "note.png";

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Nothing to export")]
    Empty,
    #[error("Surface error: {0}")]
    Surface(String),
    #[error("PNG encode failed: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(String),
}

impl From<RendererError> for ExportError {
    fn from(e: RendererError) -> Self {
        match e {
            RendererError::Surface(msg) => ExportError::Surface(msg),
        }
    }
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Export settings.
#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    /// Pixels per canvas unit.
    pub zoom: f64,
    /// Canvas units of blank space around the drawing.
    pub padding: f64,
    /// Ink width in canvas units.
    pub line_width: f64,
    pub background: Color,
    pub ink: Color,
    /// Strokes shorter than this are treated as noise and left out.
    pub noise_length_threshold: Option<f64>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            zoom: 2.0,
            padding: 8.0,
            line_width: DEFAULT_LINE_WIDTH,
            background: Color::WHITE,
            ink: Color::BLACK,
            noise_length_threshold: None,
        }
    }
}

impl ExportOptions {
    pub fn from_config(config: &SketchConfig) -> Self {
        Self {
            noise_length_threshold: config.noise_length_threshold,
            ..Self::default()
        }
    }
}

/// An encoded export.
#[derive(Debug, Clone)]
pub struct ExportImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Rasterize `drawing` and encode it as PNG.
pub fn render_png(drawing: &Drawing, options: &ExportOptions) -> ExportResult<ExportImage> {
    let mut kept = Drawing::new();
    for stroke in drawing.iter() {
        let is_noise = options
            .noise_length_threshold
            .is_some_and(|threshold| stroke.length() < threshold);
        if !is_noise && !stroke.is_empty() {
            kept.push(stroke.clone());
        }
    }
    let bounds = kept.bounds().ok_or(ExportError::Empty)?;
    let area = bounds.inflate(options.padding, options.padding);

    let width = (area.width() * options.zoom).ceil().max(1.0) as u32;
    let height = (area.height() * options.zoom).ceil().max(1.0) as u32;

    let mut renderer = PixmapRenderer::new(width, height)?
        .with_view(area.origin(), options.zoom)
        .with_line_width(options.line_width)
        .with_ink(options.ink);
    render_frame(&mut renderer, &RenderContext::new(&kept).with_background(options.background));

    let png = encode_png(&renderer.to_rgba(), width, height)?;
    log::info!(
        "Exported {} of {} strokes as {}x{} PNG ({} bytes)",
        kept.len(),
        drawing.len(),
        width,
        height,
        png.len()
    );
    Ok(ExportImage { width, height, png })
}

/// Encode straight RGBA8 pixels as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> ExportResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(format!("Failed to write PNG header: {}", e)))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| ExportError::Encode(format!("Failed to write PNG data: {}", e)))?;
    }
    Ok(png_data)
}

/// Platform share sheet.
pub trait ShareTarget {
    /// Offer the image. `Err` carries the rejection reason.
    fn share(&mut self, image: &ExportImage) -> Result<(), String>;
}

/// Download fallback used when no share target exists.
pub trait DownloadTarget {
    /// Deliver `data` under `file_name`, returning where it went.
    fn download(&mut self, file_name: &str, data: &[u8]) -> ExportResult<PathBuf>;
}

/// Downloads into a directory on disk.
pub struct DirectoryDownload {
    dir: PathBuf,
}

impl DirectoryDownload {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DownloadTarget for DirectoryDownload {
    fn download(&mut self, file_name: &str, data: &[u8]) -> ExportResult<PathBuf> {
        let path = self.dir.join(file_name);
        fs::write(&path, data)
            .map_err(|e| ExportError::Io(format!("Failed to write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// Where an export ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Shared,
    /// The share target declined. Nothing else was attempted.
    ShareRejected(String),
    Downloaded(PathBuf),
}

/// Render, encode and deliver the drawing.
pub fn export_drawing(
    drawing: &Drawing,
    options: &ExportOptions,
    share: Option<&mut dyn ShareTarget>,
    download: &mut dyn DownloadTarget,
) -> ExportResult<Delivery> {
    let image = render_png(drawing, options)?;
    match share {
        Some(target) => match target.share(&image) {
            Ok(()) => Ok(Delivery::Shared),
            Err(reason) => {
                log::warn!("Share rejected: {}", reason);
                Ok(Delivery::ShareRejected(reason))
            }
        },
        None => {
            let path = download.download(EXPORT_FILE_NAME, &image.png)?;
            log::info!("Downloaded export to {}", path.display());
            Ok(Delivery::Downloaded(path))
        }
    }
}
