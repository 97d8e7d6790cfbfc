use crate::foundation::error::{FramefitError, FramefitResult};

/// Conversion constants from normalized mesh units to millimeters.
///
/// Landmark coordinates are fractions of the frame, so raw distances carry no
/// physical unit. The mapping chains a CSS-reference pixel size (25.4/96 mm)
/// with an empirically tuned scale that assumes the subject sits at a typical
/// webcam distance. Lengths use `pixel_to_mm * distance_factor`; areas use the
/// square of that, damped by `area_factor`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CalibrationConstants {
    /// Millimeters per reference pixel.
    pub pixel_to_mm: f64,
    /// Distance tuning scale for webcam-range subjects.
    pub distance_factor: f64,
    /// Extra damping applied to areas only.
    pub area_factor: f64,
}

impl Default for CalibrationConstants {
    fn default() -> Self {
        Self {
            pixel_to_mm: 0.264_583_333_3,
            distance_factor: 2100.0,
            area_factor: 0.2,
        }
    }
}

impl CalibrationConstants {
    /// Reject non-finite or non-positive constants.
    pub fn validate(&self) -> FramefitResult<()> {
        for (name, v) in [
            ("pixel_to_mm", self.pixel_to_mm),
            ("distance_factor", self.distance_factor),
            ("area_factor", self.area_factor),
        ] {
            if !v.is_finite() || v <= 0.0 {
                return Err(FramefitError::validation(format!(
                    "calibration {name} must be finite and > 0, got {v}"
                )));
            }
        }
        Ok(())
    }

    /// Convert a normalized distance to millimeters.
    pub fn to_millimeters(&self, normalized: f64) -> f64 {
        normalized * self.pixel_to_mm * self.distance_factor
    }

    /// Convert a normalized area to square millimeters.
    pub fn to_square_millimeters(&self, normalized_area: f64) -> f64 {
        let k = self.pixel_to_mm * self.distance_factor;
        normalized_area * k * k * self.area_factor
    }
}
