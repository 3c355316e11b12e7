//! Erase policies.
//!
//! A session runs exactly one policy, picked from [`EraseMode`]. The policy
//! sees every pointer event alongside input capture and gets the final word
//! on each finished stroke.

mod hold;
mod lasso;

pub use hold::HoldEraser;
pub use lasso::LassoEraser;

use crate::config::{EraseMode, SketchConfig};
use crate::input::PointerId;
use crate::stroke::{Drawing, StrokeId};
use kurbo::Point;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// What happened to a finished stroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrokeOutcome {
    /// The stroke stays in the drawing.
    Committed(StrokeId),
    /// The stroke was an erase gesture: it and `removed` are gone.
    Erased {
        eraser: StrokeId,
        removed: Vec<StrokeId>,
    },
}

/// Pluggable erase trigger.
pub trait ErasePolicy: Send {
    /// Which mode this policy implements.
    fn mode(&self) -> EraseMode;

    /// A pointer went down at `pos`. `drawing` already contains the stroke
    /// it started, identified by `in_progress`.
    fn on_press(
        &mut self,
        _drawing: &Drawing,
        _pointer: PointerId,
        _pos: Point,
        _in_progress: Option<StrokeId>,
        _now: Instant,
    ) {
    }

    fn on_move(&mut self, _drawing: &Drawing, _pointer: PointerId, _pos: Point) {}

    /// The pointer was lifted or cancelled.
    fn on_release(&mut self, _pointer: PointerId) {}

    /// Decide what a finished stroke (the drawing's topmost) means.
    fn finish_stroke(&mut self, drawing: &mut Drawing, finished: StrokeId) -> StrokeOutcome;

    /// Advance timers. Returns a stroke that should be deleted now.
    fn poll(&mut self, _now: Instant) -> Option<StrokeId> {
        None
    }

    /// Width of the invisible per-stroke hit region, if the policy uses one.
    fn hit_region_width(&self) -> Option<f64> {
        None
    }
}

/// Build the policy a config asks for.
pub fn policy_for(config: &SketchConfig) -> Box<dyn ErasePolicy> {
    match config.erase_mode {
        EraseMode::Lasso => Box::new(LassoEraser::new(config.intersection_threshold)),
        EraseMode::Hold => Box::new(HoldEraser::new(config.hold_duration(), config.hold_hit_width)),
    }
}
