//! Scrawl Render Library
//!
//! Polyline renderer abstraction, a CPU raster backend, and the PNG export
//! pipeline.

pub mod export;
pub mod raster;
mod renderer;

pub use export::{
    encode_png, export_drawing, render_png, Delivery, DirectoryDownload, DownloadTarget, ExportError,
    ExportImage, ExportOptions, ExportResult, ShareTarget, EXPORT_FILE_NAME,
};
pub use raster::PixmapRenderer;
pub use renderer::{render_frame, PolylineStyle, RenderContext, RenderResult, Renderer, RendererError};
