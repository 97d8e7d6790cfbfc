//! Session configuration boundary object.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::camera::capability::{CameraErrorKind, SourceOptions};
use crate::camera::platform::DeviceHints;
use crate::foundation::core::Canvas;
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::measure::calibration::CalibrationConstants;
use crate::overlay::placement::PlacementParams;

/// Declarative description of one try-on session.
///
/// This is the JSON-facing, human-edited representation the CLI consumes;
/// embedders can also build it directly. Every field has a default, so a
/// session file only states what differs. `validate` checks the invariants
/// the individual field types cannot see on their own.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Output canvas size in pixels.
    pub canvas: Canvas,
    /// Declared platform capabilities. Never sniffed at runtime.
    pub hints: DeviceHints,
    /// Millimeter calibration for the measurement engine.
    pub calibration: CalibrationConstants,
    /// Overlay fit controls.
    pub placement: PlacementParams,
    /// Detector options.
    pub source: SourceOptions,
    /// Product image path relative to the asset root. `None` selects the
    /// default frame.
    pub frame_asset: Option<String>,
    /// Mirror the preview horizontally (selfie view).
    pub mirrored: bool,
    /// Draw the landmark debug layer.
    pub debug_landmarks: bool,
    /// Scripted camera/detector timeline for deterministic replays.
    pub replay: Option<ReplayScript>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1280,
                height: 720,
            },
            hints: DeviceHints::default(),
            calibration: CalibrationConstants::default(),
            placement: PlacementParams::default(),
            source: SourceOptions::default(),
            frame_asset: None,
            mirrored: true,
            debug_landmarks: false,
            replay: None,
        }
    }
}

impl SessionConfig {
    /// Parse a session from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> FramefitResult<Self> {
        let config: SessionConfig = serde_json::from_reader(r)
            .map_err(|e| FramefitError::serde(format!("parse session JSON: {e}")))?;
        Ok(config)
    }

    /// Parse a session from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> FramefitResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            FramefitError::validation(format!("open session JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Validate the session invariants.
    pub fn validate(&self) -> FramefitResult<()> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(FramefitError::validation("canvas width/height must be > 0"));
        }
        self.calibration.validate()?;
        self.placement.validate()?;
        self.source.validate()?;
        if let Some(path) = &self.frame_asset
            && path.trim().is_empty()
        {
            return Err(FramefitError::validation(
                "frame_asset must be non-empty when set",
            ));
        }
        if let Some(replay) = &self.replay {
            replay.validate()?;
        }
        Ok(())
    }
}

/// Scripted camera and detector timeline.
///
/// Drives the scripted capture backends so a full session can run without
/// hardware: acquisition attempts resolve per `attempts`, the detector
/// becomes ready after `source_ready_after_ms`, and each processed frame
/// consumes the next entry of `faces` (`null` replays a frame in which no
/// face was detected).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReplayScript {
    /// Acquisition attempts in order. Empty means instant success.
    pub attempts: Vec<ReplayAttempt>,
    /// Detector readiness delay in milliseconds.
    pub source_ready_after_ms: u64,
    /// Per-frame detections. One camera frame is replayed per entry.
    pub faces: Vec<Option<ReplayFace>>,
    /// Captured frame cadence in milliseconds.
    pub frame_interval_ms: u64,
}

impl Default for ReplayScript {
    fn default() -> Self {
        Self {
            attempts: Vec::new(),
            source_ready_after_ms: 0,
            faces: Vec::new(),
            frame_interval_ms: 33,
        }
    }
}

impl ReplayScript {
    /// Validate the script invariants.
    pub fn validate(&self) -> FramefitResult<()> {
        if self.frame_interval_ms == 0 {
            return Err(FramefitError::validation(
                "replay frame_interval_ms must be > 0",
            ));
        }
        for face in self.faces.iter().flatten() {
            face.validate()?;
        }
        Ok(())
    }
}

/// One scripted acquisition attempt.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReplayAttempt {
    /// Milliseconds between the request and its resolution.
    pub after_ms: u64,
    /// `None` resolves to a stream, `Some` fails with the kind.
    pub error: Option<CameraErrorKind>,
}

impl Default for ReplayAttempt {
    fn default() -> Self {
        Self {
            after_ms: 0,
            error: None,
        }
    }
}

/// One synthesized face detection in a replay.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReplayFace {
    /// Face center, normalized x.
    pub center_x: f64,
    /// Face center, normalized y.
    pub center_y: f64,
    /// Cheek-to-center half width in normalized units.
    pub half_width: f64,
}

impl Default for ReplayFace {
    fn default() -> Self {
        Self {
            center_x: 0.5,
            center_y: 0.5,
            half_width: 0.15,
        }
    }
}

impl ReplayFace {
    /// Validate the face geometry.
    pub fn validate(&self) -> FramefitResult<()> {
        if !self.center_x.is_finite() || !self.center_y.is_finite() {
            return Err(FramefitError::validation(
                "replay face center must be finite",
            ));
        }
        if !self.half_width.is_finite() || self.half_width <= 0.0 {
            return Err(FramefitError::validation(
                "replay face half_width must be finite and > 0",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/config.rs"]
mod tests;
