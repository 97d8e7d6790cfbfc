use crate::camera::capability::{ConstraintRange, FacingMode, StreamConstraints};

/// Declared traits of the host device.
///
/// Hints are declared by the embedder, never sniffed here; the embedder is
/// the only party that can know what it is running on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DeviceHints {
    /// A constrained mobile browser (autoplay-restricted, slower startup).
    pub mobile: bool,
}

/// Platform-dependent acquisition behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlatformProfile {
    /// Whether camera start must wait for an explicit user gesture.
    pub gesture_gated_start: bool,
    /// How long a stream request may stay unresolved.
    pub stream_timeout_ms: u64,
    /// How long detector startup may take.
    pub detector_timeout_ms: u64,
    /// Capture constraints to request.
    pub constraints: StreamConstraints,
}

impl PlatformProfile {
    /// Desktop browsers: permissive autoplay, fast detector startup.
    pub fn desktop() -> Self {
        Self {
            gesture_gated_start: false,
            stream_timeout_ms: 10_000,
            detector_timeout_ms: 10_000,
            constraints: StreamConstraints {
                width: ConstraintRange::new(1280),
                height: ConstraintRange::new(720),
                facing: FacingMode::User,
            },
        }
    }

    /// Constrained mobile browsers (iOS Safari class): gesture-gated start,
    /// tiered constraints, and a detector that can take much longer to load.
    pub fn constrained_mobile() -> Self {
        Self {
            gesture_gated_start: true,
            stream_timeout_ms: 15_000,
            detector_timeout_ms: 20_000,
            constraints: StreamConstraints {
                width: ConstraintRange::bounded(640, 1280, 1920),
                height: ConstraintRange::bounded(480, 720, 1080),
                facing: FacingMode::User,
            },
        }
    }

    /// Pick a profile from declared device hints.
    pub fn from_hints(hints: DeviceHints) -> Self {
        if hints.mobile {
            Self::constrained_mobile()
        } else {
            Self::desktop()
        }
    }
}
