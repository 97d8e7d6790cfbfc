//! Scripted capture and detection backends.
//!
//! Live sessions plug platform backends into [`CameraCapture`] and
//! [`LandmarkSource`]. The implementations here replay a recorded script
//! instead: acquisition attempts resolve after fixed delays, detection
//! results come from a queue, and every timing decision reads the caller's
//! clock rather than wall time. The same script always produces the same
//! session, which is what the preview CLI and the test suite need.

use std::collections::VecDeque;

use kurbo::Point;

use crate::camera::capability::{
    CameraCapture, CameraErrorKind, CapturePoll, Detection, LandmarkSource, SourceOptions,
    SourcePoll, StreamConstraints,
};
use crate::foundation::core::{TimestampMs, VideoFrame};
use crate::foundation::error::{FramefitError, FramefitResult};
use crate::mesh::frame::{Landmark, LandmarkFrame};
use crate::mesh::topology::{BASE_LANDMARK_COUNT, landmark};

/// One scripted acquisition attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScriptedAttempt {
    /// Milliseconds between the request and its resolution.
    pub resolve_after_ms: u64,
    /// `None` yields a stream, `Some` fails with the given kind.
    pub error: Option<CameraErrorKind>,
}

impl ScriptedAttempt {
    /// An attempt that yields a stream after `resolve_after_ms`.
    pub fn stream_after(resolve_after_ms: u64) -> Self {
        Self {
            resolve_after_ms,
            error: None,
        }
    }

    /// An attempt that fails with `kind` after `resolve_after_ms`.
    pub fn fail_after(resolve_after_ms: u64, kind: CameraErrorKind) -> Self {
        Self {
            resolve_after_ms,
            error: Some(kind),
        }
    }
}

/// Camera capture that replays scripted acquisition attempts.
///
/// Each `request` consumes the next attempt from the queue; once the queue
/// runs out, further requests resolve immediately with a stream. Delays are
/// measured from the first `poll` after the request.
#[derive(Debug, Default)]
pub struct ScriptedCamera {
    attempts: VecDeque<ScriptedAttempt>,
    frames: VecDeque<VideoFrame>,
    pending: Option<ScriptedAttempt>,
    polled_at: Option<TimestampMs>,
    streaming: bool,
    requests: u32,
    stops: u32,
}

impl ScriptedCamera {
    /// A camera that follows `attempts` and then serves `frames` in order.
    pub fn new(attempts: Vec<ScriptedAttempt>, frames: Vec<VideoFrame>) -> Self {
        Self {
            attempts: attempts.into(),
            frames: frames.into(),
            ..Self::default()
        }
    }

    /// A camera whose first request immediately yields a stream.
    pub fn always_ready(frames: Vec<VideoFrame>) -> Self {
        Self::new(Vec::new(), frames)
    }

    /// Queue another captured frame behind any already scripted.
    pub fn push_frame(&mut self, frame: VideoFrame) {
        self.frames.push_back(frame);
    }

    /// How many times `request` has been called.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    /// How many times `stop` has been called.
    pub fn stops(&self) -> u32 {
        self.stops
    }

    /// Whether a stream is currently live.
    pub fn streaming(&self) -> bool {
        self.streaming
    }
}

impl CameraCapture for ScriptedCamera {
    fn request(&mut self, _constraints: &StreamConstraints) {
        self.requests += 1;
        self.streaming = false;
        self.polled_at = None;
        self.pending = Some(
            self.attempts
                .pop_front()
                .unwrap_or_else(|| ScriptedAttempt::stream_after(0)),
        );
    }

    fn poll(&mut self, now: TimestampMs) -> CapturePoll {
        if self.streaming {
            return CapturePoll::Ready;
        }
        let Some(attempt) = self.pending else {
            return CapturePoll::Pending;
        };
        let started = *self.polled_at.get_or_insert(now);
        if now.saturating_since(started) < attempt.resolve_after_ms {
            return CapturePoll::Pending;
        }
        self.pending = None;
        self.polled_at = None;
        match attempt.error {
            None => {
                self.streaming = true;
                CapturePoll::Ready
            }
            Some(kind) => CapturePoll::Failed(kind),
        }
    }

    fn next_frame(&mut self, _now: TimestampMs) -> Option<VideoFrame> {
        if !self.streaming {
            return None;
        }
        self.frames.pop_front()
    }

    fn stop(&mut self) {
        self.stops += 1;
        self.streaming = false;
        self.pending = None;
        self.polled_at = None;
    }
}

/// Landmark source that replays recorded detection results.
///
/// The source must be configured before it reports ready; readiness arrives
/// `ready_after_ms` after the first readiness poll. Each processed frame
/// consumes the next scripted result, and an exhausted script keeps yielding
/// frames with no face rather than failing.
#[derive(Debug)]
pub struct ScriptedSource {
    ready_after_ms: u64,
    available: bool,
    reject_configure: bool,
    results: VecDeque<Option<LandmarkFrame>>,
    options: Option<SourceOptions>,
    polled_at: Option<TimestampMs>,
    closes: u32,
}

impl ScriptedSource {
    /// A source that becomes ready `ready_after_ms` after its first poll and
    /// then replays `results` in order.
    pub fn new(ready_after_ms: u64, results: Vec<Option<LandmarkFrame>>) -> Self {
        Self {
            ready_after_ms,
            available: true,
            reject_configure: false,
            results: results.into(),
            options: None,
            polled_at: None,
            closes: 0,
        }
    }

    /// A source that is ready as soon as it is configured.
    pub fn ready(results: Vec<Option<LandmarkFrame>>) -> Self {
        Self::new(0, results)
    }

    /// A source that never finishes loading.
    pub fn unavailable() -> Self {
        let mut source = Self::new(0, Vec::new());
        source.available = false;
        source
    }

    /// A source whose `configure` call fails.
    pub fn rejecting_configuration() -> Self {
        let mut source = Self::new(0, Vec::new());
        source.reject_configure = true;
        source
    }

    /// Queue another detection result.
    pub fn push_result(&mut self, landmarks: Option<LandmarkFrame>) {
        self.results.push_back(landmarks);
    }

    /// The options most recently accepted by `configure`.
    pub fn options(&self) -> Option<SourceOptions> {
        self.options
    }

    /// How many times `close` has been called.
    pub fn closes(&self) -> u32 {
        self.closes
    }
}

impl LandmarkSource for ScriptedSource {
    fn configure(&mut self, options: &SourceOptions) -> FramefitResult<()> {
        if self.reject_configure {
            return Err(FramefitError::session("scripted source rejects configuration"));
        }
        options.validate()?;
        self.options = Some(*options);
        self.polled_at = None;
        Ok(())
    }

    fn poll_ready(&mut self, now: TimestampMs) -> SourcePoll {
        if !self.available {
            return SourcePoll::Unavailable;
        }
        if self.options.is_none() {
            return SourcePoll::Pending;
        }
        let started = *self.polled_at.get_or_insert(now);
        if now.saturating_since(started) < self.ready_after_ms {
            SourcePoll::Pending
        } else {
            SourcePoll::Ready
        }
    }

    fn process(&mut self, frame: VideoFrame, _now: TimestampMs) -> FramefitResult<Detection> {
        let landmarks = self.results.pop_front().flatten();
        Ok(Detection { frame, landmarks })
    }

    fn close(&mut self) {
        self.closes += 1;
        self.options = None;
        self.polled_at = None;
    }
}

/// Build a synthetic landmark frame around `center`.
///
/// The mesh is flat filler except for the anchors the crate reads: cheeks at
/// `center.x ± half_width` and the eye, nose and temple points on a fixed
/// layout scaled by `half_width` (normalized units, y growing downward).
/// Enough to drive placement and measurement in replays that have no
/// recorded capture data.
pub fn synthetic_face(center: Point, half_width: f64) -> LandmarkFrame {
    let mut points = vec![Landmark::new(center.x, center.y, 0.0); BASE_LANDMARK_COUNT];
    let mut put = |index: usize, dx: f64, dy: f64| {
        points[index] = Landmark::new(
            center.x + dx * half_width,
            center.y + dy * half_width,
            0.0,
        );
    };
    put(landmark::RIGHT_CHEEK, -1.0, 0.0);
    put(landmark::LEFT_CHEEK, 1.0, 0.0);
    put(landmark::RIGHT_EYE_OUTER, -0.55, -0.10);
    put(landmark::LEFT_EYE_OUTER, 0.55, -0.10);
    put(landmark::RIGHT_EYE_INNER, -0.20, -0.10);
    put(landmark::LEFT_EYE_INNER, 0.20, -0.10);
    put(landmark::RIGHT_EYE_TOP, -0.375, -0.16);
    put(landmark::LEFT_TEMPLE, 0.85, -0.16);
    put(landmark::NOSE_BRIDGE, 0.0, -0.12);
    put(landmark::NOSE_TIP, 0.0, 0.18);
    let [a, b, c] = landmark::RIGHT_CHEEK_TRIANGLE;
    put(a, -0.80, 0.10);
    put(b, -0.65, 0.30);
    put(c, -0.90, 0.35);
    let [a, b, c] = landmark::LEFT_CHEEK_TRIANGLE;
    put(a, 0.80, 0.10);
    put(b, 0.65, 0.30);
    put(c, 0.90, 0.35);
    LandmarkFrame { points }
}

#[cfg(test)]
#[path = "../../tests/unit/detect/scripted.rs"]
mod tests;
