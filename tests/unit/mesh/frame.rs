use super::*;
use crate::mesh::topology::landmark;

fn flat_mesh(n: usize) -> Vec<Landmark> {
    (0..n)
        .map(|i| Landmark::new(0.5, 0.5, -0.01 * (i as f64)))
        .collect()
}

#[test]
fn accepts_base_and_refined_counts_only() {
    assert!(LandmarkFrame::new(flat_mesh(BASE_LANDMARK_COUNT)).is_ok());
    assert!(LandmarkFrame::new(flat_mesh(REFINED_LANDMARK_COUNT)).is_ok());
    assert!(LandmarkFrame::new(flat_mesh(0)).is_err());
    assert!(LandmarkFrame::new(flat_mesh(467)).is_err());
    assert!(LandmarkFrame::new(flat_mesh(479)).is_err());
}

#[test]
fn get_is_none_past_the_mesh() {
    let frame = LandmarkFrame::new(flat_mesh(BASE_LANDMARK_COUNT)).unwrap();
    assert!(frame.get(BASE_LANDMARK_COUNT - 1).is_some());
    assert!(frame.get(BASE_LANDMARK_COUNT).is_none());
}

#[test]
fn pixel_projection_scales_by_canvas() {
    let mut points = flat_mesh(BASE_LANDMARK_COUNT);
    points[landmark::NOSE_TIP] = Landmark::new(0.25, 0.75, 0.0);
    let frame = LandmarkFrame::new(points).unwrap();
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };

    let px = frame.point_px(landmark::NOSE_TIP, canvas).unwrap();
    assert_eq!(px, Point::new(320.0, 540.0));
}

#[test]
fn serde_is_a_bare_point_array() {
    let frame = LandmarkFrame::new(flat_mesh(BASE_LANDMARK_COUNT)).unwrap();
    let json = serde_json::to_string(&frame).unwrap();
    assert!(json.starts_with('['));

    let back: LandmarkFrame = serde_json::from_str(&json).unwrap();
    assert_eq!(back, frame);

    // Missing z defaults to 0 so captures without depth still load.
    let lm: Landmark = serde_json::from_str(r#"{"x":0.1,"y":0.2}"#).unwrap();
    assert_eq!(lm, Landmark::new(0.1, 0.2, 0.0));
}
