//! # Framefit guide
//!
//! This module is a standalone, end-to-end walkthrough of Framefit's architecture and public API.
//! It is intentionally detailed so embedders (and future phases of this crate) can build on a
//! shared mental model of what "a try-on session" means in this codebase.
//!
//! If you are looking for copy/paste commands, start with the repository `README.md`.
//! If you are integrating the engine, start here.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`SessionConfig`](crate::SessionConfig): the JSON-facing description of one session
//! - [`CameraSession`](crate::CameraSession): the acquisition state machine over two capabilities
//! - [`LandmarkFrame`](crate::LandmarkFrame): one detected face mesh in normalized coordinates
//! - [`OverlayPlanner`](crate::OverlayPlanner): fits the product overlay to the detected face
//! - [`FrameAssetStore`](crate::FrameAssetStore): the only place external IO is allowed
//! - [`FrameRGBA`](crate::FrameRGBA): the composed output pixels (RGBA8, premultiplied alpha)
//! - [`MeasurementReport`](crate::MeasurementReport): face dimensions in whole millimeters
//!
//! The per-frame pipeline is explicitly staged:
//!
//! 1. Acquire: [`CameraSession::tick`](crate::CameraSession::tick) walks the lifecycle to `Ready`
//! 2. Detect: [`CameraSession::pump`](crate::CameraSession::pump) yields a [`Detection`](crate::Detection)
//! 3. Place: [`OverlayPlanner::plan`](crate::OverlayPlanner::plan) produces an [`OverlayTransform`](crate::OverlayTransform)
//! 4. Compose: [`compose_frame`](crate::compose_frame) blends video, overlay and debug layer
//!
//! [`PreviewSession`](crate::PreviewSession) wires all four stages behind one driver; most
//! embedders only need it plus a clock.
//!
//! ---
//!
//! ## Poll-driven time (and why)
//!
//! Framefit never reads a clock and never spawns a thread. Every time-dependent operation takes
//! a [`TimestampMs`](crate::TimestampMs) supplied by the caller:
//!
//! - timeouts and retry backoff in the camera lifecycle
//! - the grace window that holds the overlay across short detection dropouts
//! - scripted capture backends resolving their timelines
//!
//! The embedder calls [`PreviewSession::tick`](crate::PreviewSession::tick) and
//! [`PreviewSession::next_frame`](crate::PreviewSession::next_frame) at its own frame rate with
//! its own timestamps. Two consequences fall out of this:
//!
//! - a whole session replays deterministically, which is how the crate tests itself
//! - the engine runs identically under a browser event loop, a native render loop, or a test
//!
//! ---
//!
//! ## "No IO per frame" (and why)
//!
//! Composing a preview frame must never block on the filesystem. All decoding happens up front:
//!
//! - [`FrameAssetStore::prepare`](crate::FrameAssetStore::prepare) loads the default overlay plus
//!   every listed product image, decodes them, and bakes transparency
//! - per-frame code looks overlays up by [`AssetId`](crate::AssetId); lookup never does IO
//! - [`FrameAssetStore::id_for_path`](crate::FrameAssetStore::id_for_path) never fails: unknown
//!   or broken product paths are served the default overlay and logged
//!
//! Each prepared overlay keeps two images:
//!
//! - `source`: the decoded product image, untouched; used by the no-camera fallback surface
//! - `transparent`: the same image with near-white pixels knocked out
//!   ([`bake_transparency`](crate::bake_transparency)), so product photos shot on white
//!   composite cleanly over video
//!
//! ---
//!
//! ## Premultiplied alpha (Framefit's pixel contract)
//!
//! Framefit's internal and output pixel convention is **premultiplied RGBA8**:
//!
//! - prepared overlays are premultiplied at ingest
//! - [`compose_frame`](crate::compose_frame) outputs premultiplied pixels in [`FrameRGBA`](crate::FrameRGBA)
//! - camera video is treated as opaque; its alpha is pinned to 255 during the blit
//!
//! If you hand composed frames to an external surface, treat `FrameRGBA.data` as premultiplied
//! unless the API states otherwise.
//!
//! ---
//!
//! ## Landmarks, anchors, mirroring
//!
//! A [`LandmarkFrame`](crate::LandmarkFrame) holds 468 vertices (478 with iris refinement) in
//! normalized `[0, 1]` coordinates, y growing downward. The engine only reads a handful of
//! indices, named in [`landmark`](crate::landmark):
//!
//! - cheeks (234, 454): face width and horizontal center
//! - outer eye corners (33, 263): eye line and eye distance
//! - inner eye corners (133, 362): eye distance measurement
//! - nose bridge and tip (168, 2): nose height measurement
//! - two cheek triangles: cheek area measurement
//!
//! Index names follow the subject's anatomy, not the screen: the subject's right eye sits on the
//! left half of an unmirrored frame. Selfie-style mirroring is applied to the *whole composed
//! frame* as the last step, so landmark indices and placement math never change with mirroring.
//!
//! ---
//!
//! ## Placement model
//!
//! [`place`](crate::place) fits the overlay from [`FaceAnchors`](crate::FaceAnchors):
//!
//! - overlay width is 1.1 times the horizontal cheek separation, scaled by the `size` control
//! - overlay height follows the asset's aspect ratio
//! - vertical position anchors on the eye line, raised by `offset_y` of the overlay height
//! - horizontal position centers between the cheeks, nudged by `offset_x`
//!
//! Face width uses only the horizontal cheek component so head roll does not inflate the fitted
//! size. The user-facing controls live in [`PlacementParams`](crate::PlacementParams) with
//! validated ranges; [`OverlayPlanner`](crate::OverlayPlanner) adds the detection-gap hold, which
//! reuses the last transform for `hold_ms` before hiding the overlay.
//!
//! ---
//!
//! ## Measurements
//!
//! [`measure`](crate::measure) reads anchor distances off the normalized mesh and converts them
//! with [`CalibrationConstants`](crate::CalibrationConstants):
//!
//! - `mm = normalized_distance * pixel_to_mm * distance_factor`
//! - areas square the same factor and then apply `area_factor`
//!
//! Distances are 2D; depth is too noisy to contribute to sizing. The public
//! [`MeasurementReport`](crate::MeasurementReport) rounds to whole millimeters, which is the
//! precision frame-size charts actually use.
//!
//! ---
//!
//! ## Scripted capture: sessions without hardware
//!
//! Real deployments implement [`CameraCapture`](crate::CameraCapture) and
//! [`LandmarkSource`](crate::LandmarkSource) over a device and a face tracker. The crate ships
//! scripted implementations ([`ScriptedCamera`](crate::ScriptedCamera),
//! [`ScriptedSource`](crate::ScriptedSource)) that replay a declared timeline instead, driven by
//! the `replay` block of [`SessionConfig`](crate::SessionConfig):
//!
//! - acquisition attempts that resolve to a stream or a [`CameraErrorKind`](crate::CameraErrorKind)
//!   after a delay
//! - detector readiness delay
//! - one synthesized face (or none) per captured frame
//!
//! ```rust,no_run
//! use framefit::{
//!     Canvas, FrameAssetStore, PreviewSession, ReplayFace, ReplayScript, SessionConfig,
//!     TimestampMs,
//! };
//!
//! # fn main() -> framefit::FramefitResult<()> {
//! let store = FrameAssetStore::prepare("assets", &[])?;
//!
//! let config = SessionConfig {
//!     canvas: Canvas { width: 640, height: 480 },
//!     replay: Some(ReplayScript {
//!         faces: vec![Some(ReplayFace::default()); 30],
//!         ..ReplayScript::default()
//!     }),
//!     ..SessionConfig::default()
//! };
//!
//! let mut session = PreviewSession::replay(config, store)?;
//! session.start(TimestampMs(0));
//!
//! let mut now = TimestampMs(0);
//! for _ in 0..40 {
//!     now = now.saturating_add(33);
//!     session.tick(now);
//!     if let Some(frame) = session.next_frame(now)? {
//!         assert_eq!(frame.data.len(), 640 * 480 * 4);
//!     }
//! }
//!
//! let report = session.capture()?;
//! println!("face width: {} mm", report.face_width);
//! # Ok(())
//! # }
//! ```
//!
//! The same scripts drive the integration tests, so the exact session an embedder replays is the
//! session the crate verifies.
//!
//! ---
//!
//! ## The no-camera fallback
//!
//! When acquisition fails terminally (permission denied, no device, detector unavailable) or the
//! retry budget is exhausted, the session parks in [`CameraPhase::Failed`](crate::CameraPhase).
//! [`PreviewSession::fallback_frame`](crate::PreviewSession::fallback_frame) then produces a
//! static surface: the untouched product image centered on a light background, slightly below
//! center, plus the user-facing message for the failure kind. Embedders present it where the
//! video would have been, so the product is still shown even when the camera never starts.
