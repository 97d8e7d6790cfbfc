use crate::measure::calibration::CalibrationConstants;
use crate::mesh::frame::{Landmark, LandmarkFrame};
use crate::mesh::topology::landmark;

/// Face measurements in physical units, straight out of the mesh.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FaceMeasurements {
    /// Cheekbone-to-cheekbone width in mm.
    pub face_width_mm: f64,
    /// Distance between the inner eye corners in mm.
    pub eye_distance_mm: f64,
    /// Combined area of both cheek triangles in mm².
    pub cheek_area_mm2: f64,
    /// Nose bridge to nose tip distance in mm.
    pub nose_height_mm: f64,
    /// Eye-to-temple distance in mm.
    pub temple_position_mm: f64,
}

/// Whole-millimeter measurement report for display and fit lookups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MeasurementReport {
    /// Face width in mm.
    pub face_width: u32,
    /// Eye distance in mm.
    pub eye_distance: u32,
    /// Cheek area in mm².
    pub cheek_area: u32,
    /// Nose height in mm.
    pub nose_height: u32,
    /// Temple position in mm.
    pub temple_position: u32,
}

impl MeasurementReport {
    /// Stand-in report for sessions where no capture happened.
    pub fn typical() -> Self {
        Self {
            face_width: 140,
            eye_distance: 65,
            cheek_area: 45,
            nose_height: 45,
            temple_position: 82,
        }
    }
}

impl From<FaceMeasurements> for MeasurementReport {
    fn from(m: FaceMeasurements) -> Self {
        fn mm(v: f64) -> u32 {
            v.round().max(0.0) as u32
        }

        Self {
            face_width: mm(m.face_width_mm),
            eye_distance: mm(m.eye_distance_mm),
            cheek_area: mm(m.cheek_area_mm2),
            nose_height: mm(m.nose_height_mm),
            temple_position: mm(m.temple_position_mm),
        }
    }
}

fn normalized_distance(a: Landmark, b: Landmark) -> f64 {
    // 2D on purpose: depth is too noisy to contribute to sizing.
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    (dx * dx + dy * dy).sqrt()
}

fn normalized_triangle_area(p1: Landmark, p2: Landmark, p3: Landmark) -> f64 {
    ((p2.x - p1.x) * (p3.y - p1.y) - (p3.x - p1.x) * (p2.y - p1.y)).abs() / 2.0
}

fn pair_mm(
    frame: &LandmarkFrame,
    cal: &CalibrationConstants,
    a: usize,
    b: usize,
) -> Option<f64> {
    Some(cal.to_millimeters(normalized_distance(frame.get(a)?, frame.get(b)?)))
}

fn triangle_mm2(
    frame: &LandmarkFrame,
    cal: &CalibrationConstants,
    idx: [usize; 3],
) -> Option<f64> {
    let area = normalized_triangle_area(frame.get(idx[0])?, frame.get(idx[1])?, frame.get(idx[2])?);
    Some(cal.to_square_millimeters(area))
}

/// Measure a detected face.
///
/// Returns `None` when the frame is too short to contain the required
/// vertices; a frame that passed [`LandmarkFrame::validate`] always measures.
pub fn measure(frame: &LandmarkFrame, cal: &CalibrationConstants) -> Option<FaceMeasurements> {
    let face_width_mm = pair_mm(frame, cal, landmark::RIGHT_CHEEK, landmark::LEFT_CHEEK)?;
    let eye_distance_mm = pair_mm(frame, cal, landmark::RIGHT_EYE_INNER, landmark::LEFT_EYE_INNER)?;
    let cheek_area_mm2 = triangle_mm2(frame, cal, landmark::RIGHT_CHEEK_TRIANGLE)?
        + triangle_mm2(frame, cal, landmark::LEFT_CHEEK_TRIANGLE)?;
    let nose_height_mm = pair_mm(frame, cal, landmark::NOSE_BRIDGE, landmark::NOSE_TIP)?;
    let temple_position_mm = pair_mm(frame, cal, landmark::RIGHT_EYE_TOP, landmark::LEFT_TEMPLE)?;

    Some(FaceMeasurements {
        face_width_mm,
        eye_distance_mm,
        cheek_area_mm2,
        nose_height_mm,
        temple_position_mm,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/measure/engine.rs"]
mod tests;
