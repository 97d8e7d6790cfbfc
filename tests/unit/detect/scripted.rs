use super::*;

use crate::camera::platform::PlatformProfile;
use crate::mesh::topology::REFINED_LANDMARK_COUNT;

fn constraints() -> StreamConstraints {
    PlatformProfile::desktop().constraints
}

fn frame_1x1() -> VideoFrame {
    VideoFrame::solid(1, 1, [0, 0, 0, 255])
}

#[test]
fn camera_resolves_an_attempt_on_the_session_clock() {
    let mut camera = ScriptedCamera::new(
        vec![ScriptedAttempt::stream_after(200)],
        vec![frame_1x1()],
    );
    camera.request(&constraints());
    assert_eq!(camera.poll(TimestampMs(100)), CapturePoll::Pending);
    assert_eq!(camera.poll(TimestampMs(250)), CapturePoll::Pending);
    assert_eq!(camera.poll(TimestampMs(300)), CapturePoll::Ready);
    assert!(camera.streaming());
    assert!(camera.next_frame(TimestampMs(300)).is_some());
    assert!(camera.next_frame(TimestampMs(333)).is_none());
}

#[test]
fn camera_reports_the_scripted_failure() {
    let mut camera = ScriptedCamera::new(
        vec![ScriptedAttempt::fail_after(0, CameraErrorKind::DeviceBusy)],
        Vec::new(),
    );
    camera.request(&constraints());
    assert_eq!(
        camera.poll(TimestampMs(5)),
        CapturePoll::Failed(CameraErrorKind::DeviceBusy)
    );
    assert!(!camera.streaming());
    // the failed attempt is spent, a new request starts the next one
    assert_eq!(camera.poll(TimestampMs(10)), CapturePoll::Pending);
}

#[test]
fn camera_with_no_script_streams_immediately() {
    let mut camera = ScriptedCamera::always_ready(vec![frame_1x1()]);
    assert_eq!(camera.poll(TimestampMs(0)), CapturePoll::Pending);
    camera.request(&constraints());
    assert_eq!(camera.requests(), 1);
    assert_eq!(camera.poll(TimestampMs(0)), CapturePoll::Ready);
}

#[test]
fn camera_holds_frames_until_streaming() {
    let mut camera = ScriptedCamera::new(
        vec![ScriptedAttempt::stream_after(100)],
        vec![frame_1x1()],
    );
    camera.request(&constraints());
    assert!(camera.next_frame(TimestampMs(0)).is_none());
    assert_eq!(camera.poll(TimestampMs(0)), CapturePoll::Pending);
    assert_eq!(camera.poll(TimestampMs(100)), CapturePoll::Ready);
    assert!(camera.next_frame(TimestampMs(100)).is_some());
}

#[test]
fn camera_stop_tears_the_stream_down() {
    let mut camera = ScriptedCamera::always_ready(vec![frame_1x1()]);
    camera.request(&constraints());
    assert_eq!(camera.poll(TimestampMs(0)), CapturePoll::Ready);
    camera.stop();
    assert_eq!(camera.stops(), 1);
    assert!(!camera.streaming());
    assert!(camera.next_frame(TimestampMs(1)).is_none());
    camera.stop();
    assert_eq!(camera.stops(), 2);
}

#[test]
fn source_is_pending_until_configured() {
    let mut source = ScriptedSource::ready(Vec::new());
    assert_eq!(source.poll_ready(TimestampMs(0)), SourcePoll::Pending);
    source.configure(&SourceOptions::default()).unwrap();
    assert_eq!(source.poll_ready(TimestampMs(1)), SourcePoll::Ready);
    assert_eq!(source.options(), Some(SourceOptions::default()));
}

#[test]
fn source_readiness_waits_out_the_scripted_delay() {
    let mut source = ScriptedSource::new(400, Vec::new());
    source.configure(&SourceOptions::default()).unwrap();
    assert_eq!(source.poll_ready(TimestampMs(1000)), SourcePoll::Pending);
    assert_eq!(source.poll_ready(TimestampMs(1399)), SourcePoll::Pending);
    assert_eq!(source.poll_ready(TimestampMs(1400)), SourcePoll::Ready);
}

#[test]
fn unavailable_source_never_becomes_ready() {
    let mut source = ScriptedSource::unavailable();
    source.configure(&SourceOptions::default()).unwrap();
    assert_eq!(source.poll_ready(TimestampMs(0)), SourcePoll::Unavailable);
    assert_eq!(source.poll_ready(TimestampMs(60_000)), SourcePoll::Unavailable);
}

#[test]
fn source_replays_results_and_then_reports_no_face() {
    let face = synthetic_face(Point::new(0.5, 0.5), 0.1);
    let mut source = ScriptedSource::ready(vec![Some(face.clone()), None]);
    source.configure(&SourceOptions::default()).unwrap();

    let first = source.process(frame_1x1(), TimestampMs(0)).unwrap();
    assert_eq!(first.landmarks, Some(face));
    let second = source.process(frame_1x1(), TimestampMs(33)).unwrap();
    assert!(second.landmarks.is_none());
    // exhausted script
    let third = source.process(frame_1x1(), TimestampMs(66)).unwrap();
    assert!(third.landmarks.is_none());
}

#[test]
fn source_rejects_invalid_options() {
    let mut source = ScriptedSource::ready(Vec::new());
    let mut options = SourceOptions::default();
    options.max_faces = 2;
    assert!(source.configure(&options).is_err());
    assert_eq!(source.options(), None);
}

#[test]
fn synthetic_face_is_a_valid_mesh_with_the_expected_anchors() {
    let face = synthetic_face(Point::new(0.5, 0.4), 0.15);
    assert_eq!(face.len(), BASE_LANDMARK_COUNT);
    assert_ne!(face.len(), REFINED_LANDMARK_COUNT);
    face.validate().unwrap();

    let right_cheek = face.points[landmark::RIGHT_CHEEK];
    let left_cheek = face.points[landmark::LEFT_CHEEK];
    assert!((right_cheek.x - 0.35).abs() < 1e-12);
    assert!((left_cheek.x - 0.65).abs() < 1e-12);

    let right_eye = face.points[landmark::RIGHT_EYE_OUTER];
    let left_eye = face.points[landmark::LEFT_EYE_OUTER];
    assert!(right_eye.x < left_eye.x);
    assert!((right_eye.y - left_eye.y).abs() < 1e-12);
    assert!(right_eye.y < right_cheek.y);
}
