use crate::foundation::core::{Point, TimestampMs};

/// Most recent face sighting, kept across frames so short detection dropouts
/// do not blank the overlay.
///
/// `center` is the placement anchor in unmirrored canvas pixels: x is the
/// midpoint between the cheeks, y the midpoint between the outer eye corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FacePositionState {
    /// Placement anchor in canvas pixels.
    pub center: Point,
    /// Outer-corner eye distance in canvas pixels.
    pub eye_distance_px: f64,
    /// When the face was last seen.
    pub last_detection: TimestampMs,
}
