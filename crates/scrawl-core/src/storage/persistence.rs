//! Session persistence: canvas extent, session origin and strokes.
//!
//! Extent and origin are written as soon as they change. Stroke edits are
//! frequent, so the drawing is written through a debounce window instead.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::debounce::Debouncer;
use crate::stroke::Drawing;
use crate::tiles::CanvasExtent;
use serde::de::DeserializeOwned;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

pub const CANVAS_WIDTH_KEY: &str = "canvasWidth";
pub const CANVAS_HEIGHT_KEY: &str = "canvasHeight";
pub const MOUNTED_TIME_KEY: &str = "mountedTime";
pub const PATHS_KEY: &str = "paths";

/// Every key a session owns.
pub const SESSION_KEYS: [&str; 4] = [CANVAS_WIDTH_KEY, CANVAS_HEIGHT_KEY, MOUNTED_TIME_KEY, PATHS_KEY];

/// Values used when nothing (usable) is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionDefaults {
    pub extent: CanvasExtent,
    /// Epoch milliseconds.
    pub origin: i64,
}

/// State read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedSession {
    pub extent: CanvasExtent,
    pub origin: i64,
    pub drawing: Drawing,
    /// Keys whose stored value was unreadable and got replaced by a default.
    pub recovered: Vec<&'static str>,
}

impl LoadedSession {
    pub fn was_recovered(&self) -> bool {
        !self.recovered.is_empty()
    }
}

/// Reads and writes the session record.
pub struct Persistence<S: KeyValueStore> {
    store: S,
    save_timer: Debouncer,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S, save_debounce: Duration) -> Self {
        Self {
            store,
            save_timer: Debouncer::new(save_debounce),
        }
    }

    /// Get a reference to the storage backend.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the session, falling back to `defaults` for anything missing.
    ///
    /// Unparseable values are replaced by their default and listed in
    /// [`LoadedSession::recovered`]; only backend failures are errors.
    pub fn load(&self, defaults: SessionDefaults) -> StorageResult<LoadedSession> {
        let mut recovered = Vec::new();

        let width = self.read_value::<u32>(CANVAS_WIDTH_KEY, &mut recovered)?;
        let height = self.read_value::<u32>(CANVAS_HEIGHT_KEY, &mut recovered)?;
        let extent = match (width, height) {
            (Some(width), Some(height)) if width > 0 && height > 0 => CanvasExtent::new(width, height),
            _ => defaults.extent,
        };

        let origin = self
            .read_value::<i64>(MOUNTED_TIME_KEY, &mut recovered)?
            .unwrap_or(defaults.origin);

        let drawing = match self.store.get(PATHS_KEY)? {
            Some(json) => match Drawing::from_json(&json) {
                Ok(drawing) => drawing,
                Err(e) => {
                    log::warn!("Stored {} is corrupt, starting with an empty drawing: {}", PATHS_KEY, e);
                    recovered.push(PATHS_KEY);
                    Drawing::new()
                }
            },
            None => Drawing::new(),
        };

        log::info!(
            "Loaded session: {}x{} canvas, {} strokes",
            extent.width,
            extent.height,
            drawing.len()
        );

        Ok(LoadedSession {
            extent,
            origin,
            drawing,
            recovered,
        })
    }

    fn read_value<T: DeserializeOwned>(
        &self,
        key: &'static str,
        recovered: &mut Vec<&'static str>,
    ) -> StorageResult<Option<T>> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                log::warn!("Stored {} is corrupt ({:?}), using default: {}", key, raw, e);
                recovered.push(key);
                Ok(None)
            }
        }
    }

    fn write_value<T: serde::Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let json = serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(key, &json)
    }

    /// Write the canvas extent immediately.
    pub fn save_extent(&self, extent: CanvasExtent) -> StorageResult<()> {
        self.write_value(CANVAS_WIDTH_KEY, &extent.width)?;
        self.write_value(CANVAS_HEIGHT_KEY, &extent.height)
    }

    /// Write the session origin immediately.
    pub fn save_origin(&self, origin: i64) -> StorageResult<()> {
        self.write_value(MOUNTED_TIME_KEY, &origin)
    }

    /// Note a stroke edit; the drawing is written once edits settle.
    pub fn mark_drawing_dirty(&mut self, now: Instant) {
        self.save_timer.schedule(now);
    }

    /// Check if the drawing has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.save_timer.is_pending()
    }

    /// Write the drawing if the debounce window has elapsed.
    /// Returns true if a save was performed.
    pub fn flush_if_due(&mut self, now: Instant, drawing: &Drawing) -> StorageResult<bool> {
        if !self.save_timer.fire_if_due(now) {
            return Ok(false);
        }
        self.save_drawing(drawing)?;
        Ok(true)
    }

    /// Write the drawing now, dropping any pending debounced save.
    pub fn flush(&mut self, drawing: &Drawing) -> StorageResult<()> {
        self.save_timer.cancel();
        self.save_drawing(drawing)
    }

    fn save_drawing(&self, drawing: &Drawing) -> StorageResult<()> {
        let json = drawing
            .to_json()
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(PATHS_KEY, &json)?;
        log::info!("Saved {} strokes ({} bytes)", drawing.len(), json.len());
        Ok(())
    }

    /// Remove every session key. A pending save survives a failed clear.
    pub fn clear(&mut self) -> StorageResult<()> {
        for key in SESSION_KEYS {
            self.store.remove(key)?;
        }
        self.save_timer.cancel();
        log::info!("Cleared stored session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::stroke::{Stroke, StrokePoint};

    const SAVE_DELAY: Duration = Duration::from_millis(1000);

    fn defaults() -> SessionDefaults {
        SessionDefaults {
            extent: CanvasExtent::new(1024, 768),
            origin: 1_700_000_000_000,
        }
    }

    fn sample_drawing(strokes: usize, points: usize) -> Drawing {
        let mut drawing = Drawing::new();
        for s in 0..strokes {
            let points = (0..points)
                .map(|i| {
                    let f = (s * points + i) as f64;
                    StrokePoint::new(f * 1.1 + 0.123_456_789, f * 0.7 - 3.3, f * 16.6, (f * 0.013) % 1.0)
                })
                .collect();
            drawing.push(Stroke::from_points(points));
        }
        drawing
    }

    #[test]
    fn test_load_empty_store_uses_defaults() {
        let persistence = Persistence::new(MemoryStore::new(), SAVE_DELAY);
        let loaded = persistence.load(defaults()).unwrap();
        assert_eq!(loaded.extent, defaults().extent);
        assert_eq!(loaded.origin, defaults().origin);
        assert!(loaded.drawing.is_empty());
        assert!(!loaded.was_recovered());
    }

    #[test]
    fn test_round_trip_is_bit_identical() {
        let mut persistence = Persistence::new(MemoryStore::new(), SAVE_DELAY);
        let drawing = sample_drawing(5, 40);
        persistence.save_extent(CanvasExtent::new(1280, 1024)).unwrap();
        persistence.save_origin(42).unwrap();
        persistence.flush(&drawing).unwrap();

        let loaded = persistence.load(defaults()).unwrap();
        assert_eq!(loaded.extent, CanvasExtent::new(1280, 1024));
        assert_eq!(loaded.origin, 42);
        let original: Vec<Vec<StrokePoint>> = drawing.clone().into();
        let reloaded: Vec<Vec<StrokePoint>> = loaded.drawing.into();
        assert_eq!(original.len(), reloaded.len());
        for (a, b) in original.iter().flatten().zip(reloaded.iter().flatten()) {
            assert_eq!(
                (a.x.to_bits(), a.y.to_bits(), a.t.to_bits(), a.p.to_bits()),
                (b.x.to_bits(), b.y.to_bits(), b.t.to_bits(), b.p.to_bits())
            );
        }
        assert_eq!(original.iter().flatten().count(), 200);
    }

    #[test]
    fn test_drawing_save_is_debounced() {
        let mut persistence = Persistence::new(MemoryStore::new(), SAVE_DELAY);
        let drawing = sample_drawing(1, 3);
        let start = Instant::now();

        persistence.mark_drawing_dirty(start);
        persistence.mark_drawing_dirty(start + Duration::from_millis(600));
        assert!(!persistence.flush_if_due(start + Duration::from_millis(1200), &drawing).unwrap());
        assert!(persistence.store().get(PATHS_KEY).unwrap().is_none());

        assert!(persistence.flush_if_due(start + Duration::from_millis(1600), &drawing).unwrap());
        assert!(persistence.store().get(PATHS_KEY).unwrap().is_some());
        assert!(!persistence.is_dirty());
    }

    #[test]
    fn test_corrupt_values_fall_back_and_report() {
        let store = MemoryStore::new();
        store.set(CANVAS_WIDTH_KEY, "wide").unwrap();
        store.set(CANVAS_HEIGHT_KEY, "512").unwrap();
        store.set(MOUNTED_TIME_KEY, "99").unwrap();
        store.set(PATHS_KEY, "[[{\"x\":1").unwrap();

        let loaded = Persistence::new(store, SAVE_DELAY).load(defaults()).unwrap();
        assert_eq!(loaded.extent, defaults().extent);
        assert_eq!(loaded.origin, 99);
        assert!(loaded.drawing.is_empty());
        assert_eq!(loaded.recovered, vec![CANVAS_WIDTH_KEY, PATHS_KEY]);
    }

    #[test]
    fn test_clear_removes_all_keys() {
        let mut persistence = Persistence::new(MemoryStore::new(), SAVE_DELAY);
        persistence.save_extent(CanvasExtent::new(256, 256)).unwrap();
        persistence.save_origin(1).unwrap();
        persistence.flush(&sample_drawing(2, 2)).unwrap();
        persistence.mark_drawing_dirty(Instant::now());

        persistence.clear().unwrap();
        for key in SESSION_KEYS {
            assert!(!persistence.store().contains(key).unwrap(), "{} still present", key);
        }
        assert!(!persistence.is_dirty());
    }
}
