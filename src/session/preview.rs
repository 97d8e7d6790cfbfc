//! The try-on preview driver.
//!
//! Owns the full stack for one session: camera lifecycle, overlay planning,
//! measurement capture and compositing. The driver is generic over the two
//! capture capabilities; [`PreviewSession::replay`] wires in the scripted
//! backends so the CLI and tests can run a whole session from a config file.

use kurbo::Point;

use crate::assets::store::{AssetId, FrameAssetStore};
use crate::camera::capability::{CameraCapture, LandmarkSource};
use crate::camera::platform::PlatformProfile;
use crate::camera::session::{CameraPhase, CameraSession, StartDisposition};
use crate::detect::scripted::{ScriptedAttempt, ScriptedCamera, ScriptedSource, synthetic_face};
use crate::foundation::core::{Canvas, TimestampMs, VideoFrame};
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::measure::engine::{MeasurementReport, measure};
use crate::mesh::frame::LandmarkFrame;
use crate::overlay::placement::{OverlayPlanner, PlacementParams};
use crate::render::compositor::{
    ComposeSettings, FallbackSurface, FrameRGBA, OverlayDraw, compose_frame, fallback_surface,
};
use crate::session::config::{ReplayScript, SessionConfig};

/// Straight color of the stand-in camera pixels used by replays.
const REPLAY_VIDEO_RGBA: [u8; 4] = [32, 32, 32, 255];

/// One running try-on session.
pub struct PreviewSession<C: CameraCapture, S: LandmarkSource> {
    config: SessionConfig,
    store: FrameAssetStore,
    asset_id: AssetId,
    camera: CameraSession<C, S>,
    planner: OverlayPlanner,
    last_landmarks: Option<LandmarkFrame>,
}

impl<C: CameraCapture, S: LandmarkSource> PreviewSession<C, S> {
    /// Build a session over a prepared asset store and two capture backends.
    #[tracing::instrument(skip_all, fields(canvas_w = config.canvas.width, canvas_h = config.canvas.height))]
    pub fn new(
        config: SessionConfig,
        store: FrameAssetStore,
        capture: C,
        source: S,
    ) -> FramefitResult<Self> {
        config.validate()?;
        let asset_id = match &config.frame_asset {
            Some(path) => store.id_for_path(path),
            None => store.default_id(),
        };
        // Fail now rather than on the first frame.
        store.get(asset_id)?;

        let planner = OverlayPlanner::new(config.placement)?;
        let camera = CameraSession::new(
            capture,
            source,
            PlatformProfile::from_hints(config.hints),
            config.source,
        )?;
        Ok(Self {
            config,
            store,
            asset_id,
            camera,
            planner,
            last_landmarks: None,
        })
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current camera lifecycle phase.
    pub fn phase(&self) -> CameraPhase {
        self.camera.phase()
    }

    /// Current overlay fit controls.
    pub fn placement(&self) -> &PlacementParams {
        self.planner.params()
    }

    /// Replace the fit controls, rejecting out-of-range values.
    pub fn set_placement(&mut self, params: PlacementParams) -> FramefitResult<()> {
        self.planner.set_params(params)
    }

    /// Reset the fit controls to canvas-appropriate defaults.
    pub fn reset_placement(&mut self) {
        self.planner.reset_for_canvas(self.config.canvas);
    }

    /// Begin camera acquisition from an explicit user action.
    pub fn start(&mut self, now: TimestampMs) {
        self.camera.start(now);
    }

    /// Begin camera acquisition automatically where the platform allows it.
    pub fn start_auto(&mut self, now: TimestampMs) -> StartDisposition {
        self.camera.start_auto(now)
    }

    /// Advance lifecycle timeouts and scheduled retries. Call at frame rate.
    pub fn tick(&mut self, now: TimestampMs) {
        self.camera.tick(now);
    }

    /// Pull one captured frame through detection and composition.
    ///
    /// `Ok(None)` while the camera is not ready or no frame is available
    /// this tick.
    pub fn next_frame(&mut self, now: TimestampMs) -> FramefitResult<Option<FrameRGBA>> {
        if self.camera.phase() != CameraPhase::Ready {
            return Ok(None);
        }
        match self.camera.pump(now)? {
            None => Ok(None),
            Some(detection) => {
                let frame = self.on_frame(now, &detection.frame, detection.landmarks.as_ref())?;
                Ok(Some(frame))
            }
        }
    }

    /// The single per-frame path: update placement and compose.
    ///
    /// `landmarks` is `None` on frames where no face was detected; the
    /// overlay then holds its last transform within the grace window.
    pub fn on_frame(
        &mut self,
        now: TimestampMs,
        video: &VideoFrame,
        landmarks: Option<&LandmarkFrame>,
    ) -> FramefitResult<FrameRGBA> {
        if let Some(mesh) = landmarks {
            mesh.validate()?;
            self.last_landmarks = Some(mesh.clone());
        }

        let asset = self.store.get(self.asset_id)?;
        let image = &asset.transparent;
        let transform =
            self.planner
                .plan(self.config.canvas, image.width, image.height, landmarks, now);
        let overlay = transform.map(|transform| OverlayDraw { image, transform });

        compose_frame(
            self.config.canvas,
            video,
            overlay,
            landmarks,
            ComposeSettings {
                mirrored: self.config.mirrored,
                debug_landmarks: self.config.debug_landmarks,
            },
        )
    }

    /// One-shot measurement of the most recently detected face.
    #[tracing::instrument(skip_all)]
    pub fn capture(&self) -> FramefitResult<MeasurementReport> {
        let mesh = self.last_landmarks.as_ref().ok_or_else(|| {
            FramefitError::session("capture requires at least one detected face")
        })?;
        let measurements = measure(mesh, &self.config.calibration).ok_or_else(|| {
            FramefitError::session("the detected face is missing measurement anchors")
        })?;
        Ok(MeasurementReport::from(measurements))
    }

    /// The stateless no-camera surface, present once acquisition has
    /// permanently failed.
    pub fn fallback_frame(&self) -> FramefitResult<Option<FallbackSurface>> {
        let CameraPhase::Failed(kind) = self.camera.phase() else {
            return Ok(None);
        };
        let asset = self.store.get(self.asset_id)?;
        let surface = fallback_surface(self.config.canvas, &asset.source, kind)?;
        Ok(Some(surface))
    }

    /// Tear the session down. Idempotent.
    pub fn stop(&mut self) {
        self.camera.stop();
        self.planner.clear();
        self.last_landmarks = None;
    }
}

impl PreviewSession<ScriptedCamera, ScriptedSource> {
    /// Build a session driven entirely by the config's replay script.
    pub fn replay(config: SessionConfig, store: FrameAssetStore) -> FramefitResult<Self> {
        let script = config.replay.clone().unwrap_or_default();
        let (camera, source) = scripted_backends(&script, config.canvas);
        Self::new(config, store, camera, source)
    }
}

fn scripted_backends(script: &ReplayScript, canvas: Canvas) -> (ScriptedCamera, ScriptedSource) {
    let attempts = script
        .attempts
        .iter()
        .map(|a| ScriptedAttempt {
            resolve_after_ms: a.after_ms,
            error: a.error,
        })
        .collect();

    let frame = VideoFrame::solid(canvas.width, canvas.height, REPLAY_VIDEO_RGBA);
    let frames = vec![frame; script.faces.len()];

    let results = script
        .faces
        .iter()
        .map(|face| {
            face.map(|f| synthetic_face(Point::new(f.center_x, f.center_y), f.half_width))
        })
        .collect();

    (
        ScriptedCamera::new(attempts, frames),
        ScriptedSource::new(script.source_ready_after_ms, results),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
