use super::*;

use std::cell::Cell;
use std::rc::Rc;

use kurbo::Point;

use crate::camera::capability::StreamConstraints;
use crate::detect::scripted::{ScriptedAttempt, ScriptedCamera, ScriptedSource, synthetic_face};
use crate::foundation::core::VideoFrame;

fn desktop_session(
    camera: ScriptedCamera,
    source: ScriptedSource,
) -> CameraSession<ScriptedCamera, ScriptedSource> {
    CameraSession::new(
        camera,
        source,
        PlatformProfile::desktop(),
        SourceOptions::default(),
    )
    .unwrap()
}

fn frame() -> VideoFrame {
    VideoFrame::solid(2, 2, [10, 20, 30, 255])
}

#[test]
fn reaches_ready_and_pumps_detections() {
    let face = synthetic_face(Point::new(0.5, 0.5), 0.12);
    let camera = ScriptedCamera::always_ready(vec![frame(), frame()]);
    let source = ScriptedSource::ready(vec![Some(face.clone()), None]);
    let mut session = desktop_session(camera, source);

    session.start(TimestampMs(0));
    assert_eq!(session.phase(), CameraPhase::Requesting);
    session.tick(TimestampMs(16));
    assert_eq!(session.phase(), CameraPhase::InitializingDetector);
    session.tick(TimestampMs(33));
    assert_eq!(session.phase(), CameraPhase::Ready);
    assert_eq!(session.retry_count(), 0);

    let detection = session.pump(TimestampMs(50)).unwrap().unwrap();
    assert_eq!(detection.landmarks, Some(face));
    let empty = session.pump(TimestampMs(66)).unwrap().unwrap();
    assert!(empty.landmarks.is_none());
    // capture exhausted, a frameless tick is not an error
    assert!(session.pump(TimestampMs(83)).unwrap().is_none());
}

#[test]
fn pump_outside_ready_is_a_session_error() {
    let mut session = desktop_session(
        ScriptedCamera::always_ready(Vec::new()),
        ScriptedSource::ready(Vec::new()),
    );
    let err = session.pump(TimestampMs(0)).unwrap_err();
    assert!(err.to_string().starts_with("session error:"));
}

#[test]
fn construction_validates_source_options() {
    let mut options = SourceOptions::default();
    options.max_faces = 0;
    assert!(
        CameraSession::new(
            ScriptedCamera::always_ready(Vec::new()),
            ScriptedSource::ready(Vec::new()),
            PlatformProfile::desktop(),
            options,
        )
        .is_err()
    );
}

#[test]
fn unresolved_stream_request_times_out_as_device_busy() {
    let camera = ScriptedCamera::new(vec![ScriptedAttempt::stream_after(60_000)], Vec::new());
    let mut session = desktop_session(camera, ScriptedSource::ready(Vec::new()));

    session.start(TimestampMs(0));
    session.tick(TimestampMs(9_999));
    assert_eq!(session.phase(), CameraPhase::Requesting);
    session.tick(TimestampMs(10_000));
    assert_eq!(session.phase(), CameraPhase::Error(CameraErrorKind::DeviceBusy));
    assert_eq!(session.retry_count(), 1);

    // the retry waits out the delay, then a fresh request begins
    session.tick(TimestampMs(10_500));
    assert_eq!(session.phase(), CameraPhase::Error(CameraErrorKind::DeviceBusy));
    session.tick(TimestampMs(11_000));
    assert_eq!(session.phase(), CameraPhase::Requesting);
    assert_eq!(session.capture.requests(), 2);
}

#[test]
fn persistent_busy_parks_failed_on_the_third_attempt() {
    let busy = ScriptedAttempt::fail_after(0, CameraErrorKind::DeviceBusy);
    let camera = ScriptedCamera::new(
        vec![busy, busy, busy, ScriptedAttempt::stream_after(0)],
        Vec::new(),
    );
    let mut session = desktop_session(camera, ScriptedSource::ready(Vec::new()));

    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    assert_eq!(session.phase(), CameraPhase::Error(CameraErrorKind::DeviceBusy));
    assert_eq!(session.retry_count(), 1);

    session.tick(TimestampMs(1_001));
    session.tick(TimestampMs(1_002));
    assert_eq!(session.phase(), CameraPhase::Error(CameraErrorKind::DeviceBusy));
    assert_eq!(session.retry_count(), 2);

    session.tick(TimestampMs(2_002));
    session.tick(TimestampMs(2_003));
    assert_eq!(session.phase(), CameraPhase::Failed(CameraErrorKind::DeviceBusy));
    assert_eq!(session.retry_count(), 3);
    assert_eq!(session.capture.requests(), 3);

    // parked: no further attempt without an explicit start
    session.tick(TimestampMs(60_000));
    assert_eq!(session.phase(), CameraPhase::Failed(CameraErrorKind::DeviceBusy));
    assert_eq!(session.capture.requests(), 3);

    // an explicit start is the retry affordance and resets the budget
    session.start(TimestampMs(61_000));
    assert_eq!(session.phase(), CameraPhase::Requesting);
    assert_eq!(session.retry_count(), 0);
    assert_eq!(session.capture.requests(), 4);
}

#[test]
fn terminal_kinds_fail_without_retrying() {
    let camera = ScriptedCamera::new(
        vec![ScriptedAttempt::fail_after(0, CameraErrorKind::PermissionDenied)],
        Vec::new(),
    );
    let mut session = desktop_session(camera, ScriptedSource::ready(Vec::new()));

    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    assert_eq!(
        session.phase(),
        CameraPhase::Failed(CameraErrorKind::PermissionDenied)
    );
    assert_eq!(session.capture.requests(), 1);
}

#[test]
fn detector_that_never_loads_times_out_retryably() {
    let camera = ScriptedCamera::always_ready(Vec::new());
    let source = ScriptedSource::new(60_000, Vec::new());
    let mut session = desktop_session(camera, source);

    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    assert_eq!(session.phase(), CameraPhase::InitializingDetector);
    session.tick(TimestampMs(2));
    session.tick(TimestampMs(10_000));
    assert_eq!(session.phase(), CameraPhase::InitializingDetector);
    session.tick(TimestampMs(10_001));
    assert_eq!(
        session.phase(),
        CameraPhase::Error(CameraErrorKind::DetectorTimeout)
    );
}

#[test]
fn detector_unavailable_is_terminal() {
    let camera = ScriptedCamera::always_ready(Vec::new());
    let mut session = desktop_session(camera, ScriptedSource::unavailable());

    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    session.tick(TimestampMs(2));
    assert_eq!(
        session.phase(),
        CameraPhase::Failed(CameraErrorKind::DetectorUnavailable)
    );
    assert!(session.source.closes() >= 1);
}

#[test]
fn rejected_configuration_maps_to_detector_unavailable() {
    let camera = ScriptedCamera::always_ready(Vec::new());
    let mut session = desktop_session(camera, ScriptedSource::rejecting_configuration());

    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    assert_eq!(
        session.phase(),
        CameraPhase::Failed(CameraErrorKind::DetectorUnavailable)
    );
}

#[test]
fn success_resets_the_retry_budget() {
    let busy = ScriptedAttempt::fail_after(0, CameraErrorKind::DeviceBusy);
    let camera = ScriptedCamera::new(vec![busy, busy], Vec::new());
    let mut session = desktop_session(camera, ScriptedSource::ready(Vec::new()));

    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    session.tick(TimestampMs(1_001));
    session.tick(TimestampMs(1_002));
    assert_eq!(session.retry_count(), 2);

    // third attempt exhausts the script and streams
    session.tick(TimestampMs(2_002));
    session.tick(TimestampMs(2_003));
    assert_eq!(session.phase(), CameraPhase::InitializingDetector);
    session.tick(TimestampMs(2_004));
    assert_eq!(session.phase(), CameraPhase::Ready);
    assert_eq!(session.retry_count(), 0);
}

#[test]
fn start_is_ignored_while_an_attempt_is_in_flight() {
    let camera = ScriptedCamera::new(vec![ScriptedAttempt::stream_after(5_000)], Vec::new());
    let mut session = desktop_session(camera, ScriptedSource::ready(Vec::new()));

    session.start(TimestampMs(0));
    session.start(TimestampMs(100));
    assert_eq!(session.capture.requests(), 1);
}

#[test]
fn gesture_gated_platforms_defer_automatic_start() {
    let mut session = CameraSession::new(
        ScriptedCamera::always_ready(Vec::new()),
        ScriptedSource::ready(Vec::new()),
        PlatformProfile::constrained_mobile(),
        SourceOptions::default(),
    )
    .unwrap();

    assert_eq!(
        session.start_auto(TimestampMs(0)),
        StartDisposition::AwaitingGesture
    );
    assert_eq!(session.phase(), CameraPhase::Idle);
    assert_eq!(session.capture.requests(), 0);

    // an explicit, gesture-driven start proceeds
    session.start(TimestampMs(5));
    assert_eq!(session.phase(), CameraPhase::Requesting);
}

#[test]
fn desktop_starts_automatically() {
    let mut session = desktop_session(
        ScriptedCamera::always_ready(Vec::new()),
        ScriptedSource::ready(Vec::new()),
    );
    assert_eq!(session.start_auto(TimestampMs(0)), StartDisposition::Started);
    assert_eq!(session.phase(), CameraPhase::Requesting);
}

#[test]
fn stop_releases_both_devices_and_returns_to_idle() {
    let mut session = desktop_session(
        ScriptedCamera::always_ready(vec![frame()]),
        ScriptedSource::ready(Vec::new()),
    );
    session.start(TimestampMs(0));
    session.tick(TimestampMs(1));
    session.tick(TimestampMs(2));
    assert_eq!(session.phase(), CameraPhase::Ready);

    session.stop();
    assert_eq!(session.phase(), CameraPhase::Idle);
    assert_eq!(session.capture.stops(), 1);
    assert_eq!(session.source.closes(), 1);

    session.stop();
    assert_eq!(session.phase(), CameraPhase::Idle);
}

struct CountingCamera {
    inner: ScriptedCamera,
    stops: Rc<Cell<u32>>,
}

impl CameraCapture for CountingCamera {
    fn request(&mut self, constraints: &StreamConstraints) {
        self.inner.request(constraints);
    }

    fn poll(&mut self, now: TimestampMs) -> CapturePoll {
        self.inner.poll(now)
    }

    fn next_frame(&mut self, now: TimestampMs) -> Option<VideoFrame> {
        self.inner.next_frame(now)
    }

    fn stop(&mut self) {
        self.stops.set(self.stops.get() + 1);
        self.inner.stop();
    }
}

struct CountingSource {
    inner: ScriptedSource,
    closes: Rc<Cell<u32>>,
}

impl LandmarkSource for CountingSource {
    fn configure(&mut self, options: &SourceOptions) -> FramefitResult<()> {
        self.inner.configure(options)
    }

    fn poll_ready(&mut self, now: TimestampMs) -> SourcePoll {
        self.inner.poll_ready(now)
    }

    fn process(&mut self, frame: VideoFrame, now: TimestampMs) -> FramefitResult<Detection> {
        self.inner.process(frame, now)
    }

    fn close(&mut self) {
        self.closes.set(self.closes.get() + 1);
        self.inner.close();
    }
}

#[test]
fn drop_tears_both_devices_down() {
    let stops = Rc::new(Cell::new(0));
    let closes = Rc::new(Cell::new(0));
    let camera = CountingCamera {
        inner: ScriptedCamera::always_ready(Vec::new()),
        stops: Rc::clone(&stops),
    };
    let source = CountingSource {
        inner: ScriptedSource::ready(Vec::new()),
        closes: Rc::clone(&closes),
    };
    let mut session = CameraSession::new(
        camera,
        source,
        PlatformProfile::desktop(),
        SourceOptions::default(),
    )
    .unwrap();

    session.start(TimestampMs(0));
    drop(session);
    assert_eq!(stops.get(), 1);
    assert_eq!(closes.get(), 1);
}
