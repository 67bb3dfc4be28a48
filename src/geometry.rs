//! Wall geometry handed to display clients alongside each module load.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A vertex of the wall outline, in wall coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Build a point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Source of the wall outline currently in effect.
pub trait GeometryProvider: Send + Sync {
    /// Ordered outline points at the time of the call.
    fn current_geometry(&self) -> Vec<Point>;
}

/// [`GeometryProvider`] holding an outline that can be swapped at runtime.
#[derive(Debug, Default)]
pub struct StaticGeometry {
    points: RwLock<Vec<Point>>,
}

impl StaticGeometry {
    /// Build a provider serving `points`.
    pub fn new(points: Vec<Point>) -> Self {
        Self {
            points: RwLock::new(points),
        }
    }

    /// Replace the outline. Subsequent module loads observe the new value.
    pub fn replace(&self, points: Vec<Point>) {
        match self.points.write() {
            Ok(mut guard) => *guard = points,
            Err(poisoned) => *poisoned.into_inner() = points,
        }
    }
}

impl GeometryProvider for StaticGeometry {
    fn current_geometry(&self) -> Vec<Point> {
        match self.points.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Rectangular outline spanning `width` by `height` from the origin.
pub fn rectangle(width: f64, height: f64) -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(width, 0.0),
        Point::new(width, height),
        Point::new(0.0, height),
    ]
}
