use super::*;
use crate::mesh::frame::Landmark;
use crate::mesh::topology::BASE_LANDMARK_COUNT;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn face_at(cx: f64) -> LandmarkFrame {
    let mut points: Vec<Landmark> = (0..BASE_LANDMARK_COUNT)
        .map(|_| Landmark::new(0.5, 0.5, 0.0))
        .collect();
    points[landmark::LEFT_EYE_OUTER] = Landmark::new(cx + 0.10, 0.40, 0.0);
    points[landmark::RIGHT_EYE_OUTER] = Landmark::new(cx - 0.10, 0.40, 0.0);
    points[landmark::LEFT_CHEEK] = Landmark::new(cx + 0.15, 0.45, 0.0);
    points[landmark::RIGHT_CHEEK] = Landmark::new(cx - 0.15, 0.45, 0.0);
    LandmarkFrame::new(points).unwrap()
}

fn canvas() -> Canvas {
    Canvas {
        width: 1000,
        height: 800,
    }
}

fn params() -> PlacementParams {
    PlacementParams {
        size: 1.0,
        offset_y: 0.45,
        offset_x: 0.0,
        hold_ms: 500,
    }
}

#[test]
fn validate_enforces_control_ranges() {
    assert!(PlacementParams::default().validate().is_ok());

    let mut p = params();
    p.size = 0.49;
    assert!(p.validate().is_err());
    p.size = 1.51;
    assert!(p.validate().is_err());
    p.size = f64::NAN;
    assert!(p.validate().is_err());

    let mut p = params();
    p.offset_y = 0.29;
    assert!(p.validate().is_err());
    p.offset_y = 0.91;
    assert!(p.validate().is_err());

    let mut p = params();
    p.offset_x = -0.51;
    assert!(p.validate().is_err());
    p.offset_x = 0.51;
    assert!(p.validate().is_err());
}

#[test]
fn reset_picks_size_by_display_tier() {
    let mut p = PlacementParams {
        size: 1.4,
        offset_y: 0.8,
        offset_x: -0.3,
        hold_ms: 750,
    };

    p.reset_for_canvas(Canvas {
        width: 599,
        height: 800,
    });
    assert!(close(p.size, 0.95));

    p.reset_for_canvas(Canvas {
        width: 800,
        height: 600,
    });
    assert!(close(p.size, 0.90));

    p.reset_for_canvas(Canvas {
        width: 1201,
        height: 900,
    });
    assert!(close(p.size, 0.85));

    assert!(close(p.offset_y, 0.45));
    assert!(close(p.offset_x, 0.0));
    assert_eq!(p.hold_ms, 750);
}

#[test]
fn anchors_project_into_pixel_space() {
    let anchors = face_anchors(&face_at(0.5), canvas()).unwrap();
    assert!(close(anchors.eyes_center.x, 500.0));
    assert!(close(anchors.eyes_center.y, 320.0));
    assert!(close(anchors.eye_distance_px, 200.0));
    assert!(close(anchors.face_center_x, 500.0));
    assert!(close(anchors.face_width_px, 300.0));
}

#[test]
fn face_width_ignores_vertical_cheek_offset() {
    let mut frame = face_at(0.5);
    frame.points[landmark::LEFT_CHEEK] = Landmark::new(0.65, 0.70, 0.0);
    frame.points[landmark::RIGHT_CHEEK] = Landmark::new(0.35, 0.30, 0.0);

    let anchors = face_anchors(&frame, canvas()).unwrap();
    assert!(close(anchors.face_width_px, 300.0));
}

#[test]
fn fit_scales_with_face_and_keeps_aspect() {
    let anchors = face_anchors(&face_at(0.5), canvas()).unwrap();
    let t = place(&anchors, 200, 100, &params());

    assert!(close(t.width, 330.0));
    assert!(close(t.height, 165.0));
    assert!(close(t.origin.y, 320.0 - 165.0 * 0.45));
    assert!(close(t.origin.x, 500.0 - 165.0));
}

#[test]
fn offset_x_nudges_by_tenths_of_width() {
    let anchors = face_anchors(&face_at(0.5), canvas()).unwrap();
    let mut p = params();
    p.offset_x = 0.5;
    let nudged = place(&anchors, 200, 100, &p);
    p.offset_x = 0.0;
    let centered = place(&anchors, 200, 100, &p);

    assert!(close(nudged.origin.x - centered.origin.x, 0.5 * 330.0 * 0.1));
    assert!(close(nudged.origin.y, centered.origin.y));
}

#[test]
fn planner_holds_last_fit_through_short_gaps() {
    let mut planner = OverlayPlanner::new(params()).unwrap();
    let frame = face_at(0.5);

    let t1 = planner
        .plan(canvas(), 200, 100, Some(&frame), TimestampMs(1_000))
        .unwrap();

    // Face lost: the previous fit is held inside the window.
    let held = planner
        .plan(canvas(), 200, 100, None, TimestampMs(1_400))
        .unwrap();
    assert_eq!(held, t1);
    let held = planner
        .plan(canvas(), 200, 100, None, TimestampMs(1_500))
        .unwrap();
    assert_eq!(held, t1);

    // One past the window: hidden.
    assert!(
        planner
            .plan(canvas(), 200, 100, None, TimestampMs(1_501))
            .is_none()
    );

    // Reacquisition at a new position produces a fresh fit.
    let t2 = planner
        .plan(canvas(), 200, 100, Some(&face_at(0.45)), TimestampMs(2_000))
        .unwrap();
    assert!(close(t2.origin.x - t1.origin.x, -50.0));
}

#[test]
fn planner_records_the_sighting() {
    let mut planner = OverlayPlanner::new(params()).unwrap();
    assert!(planner.last_position().is_none());
    assert!(
        planner
            .plan(canvas(), 200, 100, None, TimestampMs(100))
            .is_none()
    );

    planner.plan(canvas(), 200, 100, Some(&face_at(0.5)), TimestampMs(250));
    let pos = planner.last_position().unwrap();
    assert!(close(pos.center.x, 500.0));
    assert!(close(pos.center.y, 320.0));
    assert!(close(pos.eye_distance_px, 200.0));
    assert_eq!(pos.last_detection, TimestampMs(250));
}

#[test]
fn planner_rejects_invalid_controls() {
    let mut bad = params();
    bad.size = 9.0;
    assert!(OverlayPlanner::new(bad).is_err());

    let mut planner = OverlayPlanner::new(params()).unwrap();
    assert!(planner.set_params(bad).is_err());
    // Rejected update leaves the old controls in place.
    assert!(close(planner.params().size, 1.0));
}

#[test]
fn clear_forgets_the_sighting_and_the_held_fit() {
    let mut planner = OverlayPlanner::new(params()).unwrap();
    planner.plan(canvas(), 200, 100, Some(&face_at(0.5)), TimestampMs(100));
    assert!(planner.last_position().is_some());

    planner.clear();
    assert!(planner.last_position().is_none());
    // Inside what would have been the hold window, nothing is held.
    assert!(
        planner
            .plan(canvas(), 200, 100, None, TimestampMs(150))
            .is_none()
    );
}
