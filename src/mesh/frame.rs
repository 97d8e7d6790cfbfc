use crate::foundation::core::{Canvas, Point};
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::mesh::topology::{BASE_LANDMARK_COUNT, REFINED_LANDMARK_COUNT};

/// One mesh vertex in normalized image coordinates.
///
/// `x` and `y` are fractions of the source frame width and height; values
/// slightly outside `[0, 1]` occur when the face is partially off-camera and
/// are kept as-is. `z` is relative depth, more negative toward the camera.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Landmark {
    /// Normalized horizontal position.
    pub x: f64,
    /// Normalized vertical position.
    pub y: f64,
    /// Relative depth.
    #[serde(default)]
    pub z: f64,
}

impl Landmark {
    /// Build a landmark from normalized coordinates.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Normalized 2D position as a point.
    pub fn to_point(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Position in pixel space for the given surface.
    pub fn to_px(self, canvas: Canvas) -> Point {
        Point::new(
            self.x * f64::from(canvas.width),
            self.y * f64::from(canvas.height),
        )
    }
}

/// A complete face mesh observation for one video frame.
///
/// Holds either the base mesh or the iris-refined mesh; the engine only reads
/// indices present in both, so the two counts are interchangeable downstream.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LandmarkFrame {
    /// Mesh vertices, indexed by the topology constants.
    pub points: Vec<Landmark>,
}

impl LandmarkFrame {
    /// Build a frame, rejecting unknown mesh sizes.
    pub fn new(points: Vec<Landmark>) -> FramefitResult<Self> {
        let frame = Self { points };
        frame.validate()?;
        Ok(frame)
    }

    /// Number of vertices in the mesh.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the frame holds no vertices. A validated frame never is.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Vertex at `index`, if the mesh has one.
    pub fn get(&self, index: usize) -> Option<Landmark> {
        self.points.get(index).copied()
    }

    /// Vertex at `index` in pixel space for the given surface.
    pub fn point_px(&self, index: usize, canvas: Canvas) -> Option<Point> {
        self.get(index).map(|lm| lm.to_px(canvas))
    }

    /// Check the vertex count against the known mesh topologies.
    pub fn validate(&self) -> FramefitResult<()> {
        let n = self.points.len();
        if n != BASE_LANDMARK_COUNT && n != REFINED_LANDMARK_COUNT {
            return Err(FramefitError::validation(format!(
                "LandmarkFrame has {n} points, expected {BASE_LANDMARK_COUNT} or {REFINED_LANDMARK_COUNT}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/mesh/frame.rs"]
mod tests;
