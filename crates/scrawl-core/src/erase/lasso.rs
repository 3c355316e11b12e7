//! Scribble-over erase.

use super::{ErasePolicy, StrokeOutcome};
use crate::config::EraseMode;
use crate::geometry::{self, contains_half_open};
use crate::stroke::{Drawing, Stroke, StrokeId};

/// Treats a stroke that crosses some existing stroke at least `threshold`
/// times as an eraser over its own bounding box.
#[derive(Debug, Clone)]
pub struct LassoEraser {
    threshold: usize,
}

impl LassoEraser {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Highest crossing count of `finished` against any single other stroke.
    pub fn max_crossings(drawing: &Drawing, finished: &Stroke) -> usize {
        let eraser = finished.positions();
        drawing
            .iter()
            .filter(|stroke| stroke.id() != finished.id())
            .map(|stroke| geometry::crossing_count(&stroke.positions(), &eraser))
            .max()
            .unwrap_or(0)
    }
}

impl ErasePolicy for LassoEraser {
    fn mode(&self) -> EraseMode {
        EraseMode::Lasso
    }

    fn finish_stroke(&mut self, drawing: &mut Drawing, finished: StrokeId) -> StrokeOutcome {
        let Some(stroke) = drawing.get(finished) else {
            return StrokeOutcome::Committed(finished);
        };
        if stroke.len() < 2 {
            return StrokeOutcome::Committed(finished);
        }

        let crossings = Self::max_crossings(drawing, stroke);
        if crossings < self.threshold {
            return StrokeOutcome::Committed(finished);
        }

        let Some(area) = stroke.bounds() else {
            return StrokeOutcome::Committed(finished);
        };

        let removed: Vec<StrokeId> = drawing
            .iter()
            .filter(|other| other.id() != finished)
            .filter(|other| {
                other
                    .centroid()
                    .is_some_and(|center| contains_half_open(area, center))
            })
            .map(Stroke::id)
            .collect();

        drawing.retain(|other| other.id() != finished && !removed.contains(&other.id()));
        log::debug!(
            "lasso with {} crossings erased {} strokes inside {:?}",
            crossings,
            removed.len(),
            area
        );

        StrokeOutcome::Erased {
            eraser: finished,
            removed,
        }
    }
}
