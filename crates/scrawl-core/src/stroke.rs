//! Stroke recording: points, strokes and the ordered drawing (the path store).

use crate::geometry;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Runtime identifier of a stroke. Never persisted.
pub type StrokeId = Uuid;

/// One recorded pointer sample in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Milliseconds since the session origin.
    pub t: f64,
    /// Pen pressure in `[0, 1]`.
    pub p: f64,
}

impl StrokePoint {
    /// Create a point, clamping pressure into `[0, 1]`.
    pub fn new(x: f64, y: f64, t: f64, p: f64) -> Self {
        Self {
            x,
            y,
            t,
            p: p.clamp(0.0, 1.0),
        }
    }

    /// Position as a `kurbo` point.
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// A single continuous pointer-down-to-up gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct Stroke {
    id: StrokeId,
    /// Points in drawing order.
    pub points: Vec<StrokePoint>,
}

impl Stroke {
    /// Start a stroke from its first point.
    pub fn new(first: StrokePoint) -> Self {
        Self::from_points(vec![first])
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<StrokePoint>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
        }
    }

    pub fn id(&self) -> StrokeId {
        self.id
    }

    /// Add a point to the end of the stroke.
    pub fn push(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Point positions, for the geometry helpers.
    pub fn positions(&self) -> Vec<Point> {
        self.points.iter().map(StrokePoint::pos).collect()
    }

    pub fn bounds(&self) -> Option<Rect> {
        geometry::bounding_box(&self.positions())
    }

    pub fn centroid(&self) -> Option<Point> {
        geometry::centroid(&self.positions())
    }

    pub fn length(&self) -> f64 {
        geometry::path_length(&self.positions())
    }

    /// Shift every point by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for point in &mut self.points {
            point.x += dx;
            point.y += dy;
        }
    }
}

/// The ordered collection of strokes. Order is z-order.
///
/// Serialized as a plain JSON array of point arrays; stroke ids are
/// regenerated on load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Vec<StrokePoint>>", into = "Vec<Vec<StrokePoint>>")]
pub struct Drawing {
    strokes: Vec<Stroke>,
}

impl Drawing {
    /// Create an empty drawing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stroke on top of the z-order.
    pub fn push(&mut self, stroke: Stroke) {
        self.strokes.push(stroke);
    }

    /// Remove and return the topmost stroke.
    pub fn pop(&mut self) -> Option<Stroke> {
        self.strokes.pop()
    }

    pub fn last(&self) -> Option<&Stroke> {
        self.strokes.last()
    }

    pub fn last_mut(&mut self) -> Option<&mut Stroke> {
        self.strokes.last_mut()
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.strokes.iter().find(|stroke| stroke.id == id)
    }

    /// Remove a stroke by id.
    pub fn remove(&mut self, id: StrokeId) -> Option<Stroke> {
        let index = self.strokes.iter().position(|stroke| stroke.id == id)?;
        Some(self.strokes.remove(index))
    }

    /// Keep only the strokes matching `keep`, returning how many were removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&Stroke) -> bool) -> usize {
        let before = self.strokes.len();
        self.strokes.retain(|stroke| keep(stroke));
        before - self.strokes.len()
    }

    /// Strokes back to front.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Stroke> {
        self.strokes.iter()
    }

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Total number of recorded points.
    pub fn point_count(&self) -> usize {
        self.strokes.iter().map(Stroke::len).sum()
    }

    /// Shift every point of every stroke by `(dx, dy)`.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for stroke in &mut self.strokes {
            stroke.translate(dx, dy);
        }
    }

    /// Union bounding box of every point.
    pub fn bounds(&self) -> Option<Rect> {
        self.strokes
            .iter()
            .filter_map(Stroke::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }

    pub fn clear(&mut self) {
        self.strokes.clear();
    }

    /// Serialize to the persisted JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from the persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<Vec<Vec<StrokePoint>>> for Drawing {
    fn from(paths: Vec<Vec<StrokePoint>>) -> Self {
        Self {
            strokes: paths
                .into_iter()
                .filter(|points| !points.is_empty())
                .map(Stroke::from_points)
                .collect(),
        }
    }
}

impl From<Drawing> for Vec<Vec<StrokePoint>> {
    fn from(drawing: Drawing) -> Self {
        drawing
            .strokes
            .into_iter()
            .map(|stroke| stroke.points)
            .collect()
    }
}
