//! Scrawl Core Library
//!
//! Platform-agnostic engine for an infinite freehand sketchpad: stroke
//! capture, erase gestures, tile-based canvas growth, momentum scrolling and
//! session persistence.

pub mod config;
pub mod debounce;
pub mod erase;
pub mod geometry;
pub mod input;
pub mod momentum;
pub mod session;
pub mod storage;
pub mod stroke;
pub mod tiles;

pub use config::{EraseMode, ScrollAxis, SketchConfig, GRID_UNIT, TILE_SIZE};
pub use debounce::Debouncer;
pub use erase::{ErasePolicy, HoldEraser, LassoEraser, StrokeOutcome};
pub use input::{InputCapture, PointerId};
pub use momentum::MomentumScroller;
pub use session::{Session, TickReport};
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
pub use stroke::{Drawing, Stroke, StrokeId, StrokePoint};
pub use tiles::{CanvasExtent, Edge, Growth, TileCanvas, Viewport};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
