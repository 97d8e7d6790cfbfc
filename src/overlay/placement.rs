use crate::foundation::core::{Canvas, Point, Rect, TimestampMs};
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::mesh::frame::LandmarkFrame;
use crate::mesh::topology::landmark;
use crate::overlay::position::FacePositionState;

/// Overlay width as a multiple of cheek-to-cheek face width.
const BASE_WIDTH_RATIO: f64 = 1.1;

/// Fraction of overlay width that one unit of `offset_x` shifts.
const NUDGE_RATIO: f64 = 0.1;

/// User-adjustable placement controls.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Overall size multiplier on top of the face-width fit.
    pub size: f64,
    /// Vertical anchor as a fraction of overlay height above the eye line.
    pub offset_y: f64,
    /// Horizontal nudge in units of a tenth of the overlay width.
    pub offset_x: f64,
    /// How long the last placement is held after the face disappears.
    pub hold_ms: u64,
}

impl PlacementParams {
    /// Allowed range for [`PlacementParams::size`].
    pub const SIZE_RANGE: std::ops::RangeInclusive<f64> = 0.5..=1.5;
    /// Allowed range for [`PlacementParams::offset_y`].
    pub const OFFSET_Y_RANGE: std::ops::RangeInclusive<f64> = 0.3..=0.9;
    /// Allowed range for [`PlacementParams::offset_x`].
    pub const OFFSET_X_RANGE: std::ops::RangeInclusive<f64> = -0.5..=0.5;

    /// Reject out-of-range or non-finite controls.
    pub fn validate(&self) -> FramefitResult<()> {
        fn check(
            name: &str,
            v: f64,
            range: &std::ops::RangeInclusive<f64>,
        ) -> FramefitResult<()> {
            if !v.is_finite() || !range.contains(&v) {
                return Err(FramefitError::validation(format!(
                    "{name} must be within [{}, {}], got {v}",
                    range.start(),
                    range.end()
                )));
            }
            Ok(())
        }

        check("size", self.size, &Self::SIZE_RANGE)?;
        check("offset_y", self.offset_y, &Self::OFFSET_Y_RANGE)?;
        check("offset_x", self.offset_x, &Self::OFFSET_X_RANGE)?;
        Ok(())
    }

    /// Default size for a given display width: larger frames read better on
    /// small screens, smaller on very wide ones.
    pub fn default_size_for_canvas(canvas: Canvas) -> f64 {
        if canvas.width < 600 {
            0.95
        } else if canvas.width > 1200 {
            0.85
        } else {
            0.90
        }
    }

    /// Reset the user controls to canvas-appropriate defaults, keeping
    /// `hold_ms` as configured.
    pub fn reset_for_canvas(&mut self, canvas: Canvas) {
        self.size = Self::default_size_for_canvas(canvas);
        self.offset_y = 0.45;
        self.offset_x = 0.0;
    }
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            size: 0.95,
            offset_y: 0.45,
            offset_x: 0.0,
            hold_ms: 500,
        }
    }
}

/// Where one frame's overlay goes, in unmirrored canvas pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OverlayTransform {
    /// Top-left corner of the destination rectangle.
    pub origin: Point,
    /// Destination width in pixels.
    pub width: f64,
    /// Destination height in pixels.
    pub height: f64,
}

impl OverlayTransform {
    /// Destination rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.origin.x,
            self.origin.y,
            self.origin.x + self.width,
            self.origin.y + self.height,
        )
    }
}

/// Pixel-space anchor geometry read off one mesh observation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FaceAnchors {
    /// Midpoint between the outer eye corners.
    pub eyes_center: Point,
    /// Euclidean distance between the outer eye corners, in pixels.
    pub eye_distance_px: f64,
    /// Horizontal midpoint between the cheeks.
    pub face_center_x: f64,
    /// Cheek-to-cheek width, horizontal component only.
    pub face_width_px: f64,
}

/// Project the placement anchors into pixel space.
///
/// Face width deliberately uses only the horizontal cheek separation so head
/// roll does not inflate the fitted size.
pub fn face_anchors(frame: &LandmarkFrame, canvas: Canvas) -> Option<FaceAnchors> {
    let left_outer = frame.point_px(landmark::LEFT_EYE_OUTER, canvas)?;
    let right_outer = frame.point_px(landmark::RIGHT_EYE_OUTER, canvas)?;
    let left_cheek = frame.point_px(landmark::LEFT_CHEEK, canvas)?;
    let right_cheek = frame.point_px(landmark::RIGHT_CHEEK, canvas)?;

    Some(FaceAnchors {
        eyes_center: Point::new(
            (left_outer.x + right_outer.x) / 2.0,
            (left_outer.y + right_outer.y) / 2.0,
        ),
        eye_distance_px: left_outer.distance(right_outer),
        face_center_x: (left_cheek.x + right_cheek.x) / 2.0,
        face_width_px: (right_cheek.x - left_cheek.x).abs(),
    })
}

/// Fit the overlay to measured anchors.
///
/// The overlay keeps the asset's aspect ratio; `asset_w`/`asset_h` must be the
/// source dimensions of a decoded image and therefore nonzero.
pub fn place(
    anchors: &FaceAnchors,
    asset_w: u32,
    asset_h: u32,
    params: &PlacementParams,
) -> OverlayTransform {
    let width = anchors.face_width_px * BASE_WIDTH_RATIO * params.size;
    let aspect = f64::from(asset_h) / f64::from(asset_w);
    let height = width * aspect;

    let y = anchors.eyes_center.y - height * params.offset_y;
    let x = anchors.face_center_x - width / 2.0 + params.offset_x * width * NUDGE_RATIO;

    OverlayTransform {
        origin: Point::new(x, y),
        width,
        height,
    }
}

/// Per-session placement driver.
///
/// Wraps the pure fit with the detection-gap hold: when the face vanishes the
/// previous transform is reused until `hold_ms` elapses, then the overlay
/// hides until the next detection.
#[derive(Clone, Debug)]
pub struct OverlayPlanner {
    params: PlacementParams,
    position: Option<FacePositionState>,
    held: Option<OverlayTransform>,
}

impl OverlayPlanner {
    /// Build a planner with validated controls.
    pub fn new(params: PlacementParams) -> FramefitResult<Self> {
        params.validate()?;
        Ok(Self {
            params,
            position: None,
            held: None,
        })
    }

    /// Current controls.
    pub fn params(&self) -> &PlacementParams {
        &self.params
    }

    /// Replace the controls, rejecting out-of-range values.
    pub fn set_params(&mut self, params: PlacementParams) -> FramefitResult<()> {
        params.validate()?;
        self.params = params;
        Ok(())
    }

    /// Reset the controls to canvas-appropriate defaults.
    pub fn reset_for_canvas(&mut self, canvas: Canvas) {
        self.params.reset_for_canvas(canvas);
    }

    /// Last face sighting, if any. Survives past the hold window.
    pub fn last_position(&self) -> Option<FacePositionState> {
        self.position
    }

    /// Forget the tracked face and any held transform.
    pub fn clear(&mut self) {
        self.position = None;
        self.held = None;
    }

    /// Compute this frame's overlay placement.
    ///
    /// `landmarks` is `None` when no face was detected. Returns `None` when
    /// there is nothing to draw.
    pub fn plan(
        &mut self,
        canvas: Canvas,
        asset_w: u32,
        asset_h: u32,
        landmarks: Option<&LandmarkFrame>,
        now: TimestampMs,
    ) -> Option<OverlayTransform> {
        if let Some(anchors) = landmarks.and_then(|frame| face_anchors(frame, canvas)) {
            let transform = place(&anchors, asset_w, asset_h, &self.params);
            self.position = Some(FacePositionState {
                center: Point::new(anchors.face_center_x, anchors.eyes_center.y),
                eye_distance_px: anchors.eye_distance_px,
                last_detection: now,
            });
            self.held = Some(transform);
            return Some(transform);
        }

        let position = self.position?;
        if now.saturating_since(position.last_detection) <= self.params.hold_ms {
            self.held
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/placement.rs"]
mod tests;
