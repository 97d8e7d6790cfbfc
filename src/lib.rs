//! Framefit is the geometry core of a virtual eyewear try-on.
//!
//! Framefit turns camera frames and face-mesh landmarks into a composed
//! preview (`FrameRGBA`) with a product overlay fitted to the detected face,
//! plus physical face measurements for frame sizing.
//!
//! # Pipeline overview
//!
//! 1. **Acquire**: `CameraSession` walks the capture and detector capabilities
//!    through `Requesting -> InitializingDetector -> Ready`, with
//!    platform-aware timeouts and a bounded retry budget
//! 2. **Detect**: each pumped frame yields at most one `LandmarkFrame`
//!    (the normalized face mesh)
//! 3. **Place**: `OverlayPlanner` fits an `OverlayTransform` to the face
//!    anchors, holding the last fit across short detection gaps
//! 4. **Compose**: `compose_frame` blends video, overlay and the optional
//!    landmark debug layer into a `FrameRGBA`, mirroring last
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Poll-driven**: nothing here spawns threads or owns a clock; the
//!   embedder calls `tick`/`next_frame` with its own timestamps.
//! - **No IO per frame**: decoding and transparency baking are front-loaded
//!   in [`FrameAssetStore`].
//! - **No device access**: cameras and detectors sit behind the
//!   [`CameraCapture`] and [`LandmarkSource`] traits; the scripted
//!   implementations replay whole sessions deterministically.
//! - **Premultiplied RGBA8** end-to-end: compositing operates on
//!   premultiplied pixels.
//!
//! # Getting started
//!
//! - For end-user usage, see the repository README.
//! - For a standalone walkthrough of the API and architecture, see
//!   [`crate::guide`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod assets;
mod camera;
mod detect;
mod foundation;
mod measure;
mod mesh;
mod overlay;
mod render;
mod session;

/// High-level, standalone documentation for Framefit's concepts and architecture.
pub mod guide;

pub use assets::decode::{bake_transparency, decode_frame_asset};
pub use assets::store::{
    AssetId, DEFAULT_FRAME_ASSET, FrameAsset, FrameAssetStore, PreparedImage, normalize_rel_path,
};
pub use camera::capability::{
    CameraCapture, CameraErrorKind, CapturePoll, ConstraintRange, Detection, FacingMode,
    LandmarkSource, SourceOptions, SourcePoll, StreamConstraints,
};
pub use camera::platform::{DeviceHints, PlatformProfile};
pub use camera::session::{CameraPhase, CameraSession, StartDisposition};
pub use detect::scripted::{ScriptedAttempt, ScriptedCamera, ScriptedSource, synthetic_face};
pub use foundation::core::{Affine, Canvas, Point, Rect, Rgba8Premul, TimestampMs, Vec2, VideoFrame};
pub use foundation::error::{FramefitError, FramefitResult};
pub use measure::calibration::CalibrationConstants;
pub use measure::engine::{FaceMeasurements, MeasurementReport, measure};
pub use mesh::frame::{Landmark, LandmarkFrame};
pub use mesh::topology::{BASE_LANDMARK_COUNT, REFINED_LANDMARK_COUNT, landmark};
pub use overlay::placement::{
    FaceAnchors, OverlayPlanner, OverlayTransform, PlacementParams, face_anchors, place,
};
pub use overlay::position::FacePositionState;
pub use render::compositor::{
    ComposeSettings, FallbackSurface, FrameRGBA, OverlayDraw, compose_frame, fallback_surface,
    mirror_in_place,
};
pub use session::config::{ReplayAttempt, ReplayFace, ReplayScript, SessionConfig};
pub use session::preview::PreviewSession;
