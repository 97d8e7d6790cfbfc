use crate::foundation::core::{TimestampMs, VideoFrame};
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::mesh::frame::LandmarkFrame;

/// Platform failure kinds reported by capture and detector backends.
///
/// These are lifecycle conditions, not API errors: the state machine carries
/// them through its `Error`/`Failed` states. `Display` is the message shown
/// to the user.
#[derive(
    thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize,
)]
pub enum CameraErrorKind {
    /// The user or browser policy refused camera access.
    #[error("camera access was denied; allow camera access in your browser settings and reload")]
    PermissionDenied,
    /// No capture device exists on this machine.
    #[error("no camera device was found")]
    DeviceNotFound,
    /// The device exists but cannot be read right now.
    #[error("the camera is in use by another application or cannot be started")]
    DeviceBusy,
    /// The requested constraints cannot be satisfied by any device.
    #[error("this camera does not support the requested capture settings")]
    Overconstrained,
    /// The landmark detector cannot be loaded at all.
    #[error("the face tracking system could not be loaded; try another browser")]
    DetectorUnavailable,
    /// The landmark detector never finished starting.
    #[error("the face tracking system timed out while starting")]
    DetectorTimeout,
}

impl CameraErrorKind {
    /// Whether another acquisition attempt could plausibly succeed.
    pub fn retryable(self) -> bool {
        matches!(
            self,
            Self::DeviceBusy | Self::Overconstrained | Self::DetectorTimeout
        )
    }
}

/// One axis of a capture constraint, in the `min <= ideal <= max` shape
/// capture backends negotiate with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConstraintRange {
    /// Hard lower bound, if any.
    pub min: Option<u32>,
    /// Preferred value.
    pub ideal: u32,
    /// Hard upper bound, if any.
    pub max: Option<u32>,
}

impl ConstraintRange {
    /// A preference with no hard bounds.
    pub fn new(ideal: u32) -> Self {
        Self {
            min: None,
            ideal,
            max: None,
        }
    }

    /// A preference with hard bounds on both sides.
    pub fn bounded(min: u32, ideal: u32, max: u32) -> Self {
        Self {
            min: Some(min),
            ideal,
            max: Some(max),
        }
    }
}

/// Which way the requested camera faces.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Front camera, toward the subject.
    User,
    /// Rear camera.
    Environment,
}

/// Requested capture geometry and orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct StreamConstraints {
    /// Width constraint in pixels.
    pub width: ConstraintRange,
    /// Height constraint in pixels.
    pub height: ConstraintRange,
    /// Camera orientation.
    pub facing: FacingMode,
}

/// Outcome of polling an in-flight camera request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapturePoll {
    /// The request has not resolved yet.
    Pending,
    /// A stream is up and frames can be pulled.
    Ready,
    /// The platform rejected the request.
    Failed(CameraErrorKind),
}

/// Camera capture capability.
///
/// Backends adapt a real device API; tests substitute a scripted stub. A
/// request may never resolve on its own, so callers poll against their own
/// deadline. `stop` must be idempotent and must release the device.
pub trait CameraCapture {
    /// Begin an acquisition attempt with the given constraints.
    fn request(&mut self, constraints: &StreamConstraints);

    /// Poll the in-flight attempt.
    fn poll(&mut self, now: TimestampMs) -> CapturePoll;

    /// Pull the next available frame while the stream is up.
    fn next_frame(&mut self, now: TimestampMs) -> Option<VideoFrame>;

    /// Release the device and discard any in-flight attempt.
    fn stop(&mut self);
}

/// Detector options recognized by landmark source implementations.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SourceOptions {
    /// Number of faces to track. The engine follows exactly one.
    pub max_faces: u32,
    /// Whether the detector should produce the iris-refined mesh.
    pub refine_landmarks: bool,
    /// Minimum confidence for an initial detection.
    pub min_detection_confidence: f64,
    /// Minimum confidence to keep tracking between frames.
    pub min_tracking_confidence: f64,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            max_faces: 1,
            refine_landmarks: true,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
        }
    }
}

impl SourceOptions {
    /// Reject option combinations the engine does not support.
    pub fn validate(&self) -> FramefitResult<()> {
        if self.max_faces != 1 {
            return Err(FramefitError::validation(format!(
                "max_faces must be 1, got {}",
                self.max_faces
            )));
        }
        for (name, v) in [
            ("min_detection_confidence", self.min_detection_confidence),
            ("min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(FramefitError::validation(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Outcome of polling detector startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourcePoll {
    /// Still loading.
    Pending,
    /// Accepting frames.
    Ready,
    /// Cannot load at all on this platform.
    Unavailable,
}

/// One processed frame's detection output.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    /// The frame the detector consumed, passed through for compositing.
    pub frame: VideoFrame,
    /// At most one tracked face; `None` is the ordinary no-face condition.
    pub landmarks: Option<LandmarkFrame>,
}

/// Face landmark detection capability.
///
/// Implementations wrap a real detector; tests use
/// [`ScriptedSource`](crate::ScriptedSource). `configure` may be called
/// again after `close`.
pub trait LandmarkSource {
    /// Apply detector options. Called once per acquisition attempt, before
    /// the first `poll_ready`.
    fn configure(&mut self, options: &SourceOptions) -> FramefitResult<()>;

    /// Poll detector startup.
    fn poll_ready(&mut self, now: TimestampMs) -> SourcePoll;

    /// Run detection on one frame.
    fn process(&mut self, frame: VideoFrame, now: TimestampMs) -> FramefitResult<Detection>;

    /// Release detector resources. Idempotent.
    fn close(&mut self);
}
