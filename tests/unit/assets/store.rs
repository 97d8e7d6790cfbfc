use super::*;

#[test]
fn normalize_path_cross_platform() {
    assert_eq!(normalize_rel_path("frames/b.png").unwrap(), "frames/b.png");
    assert_eq!(normalize_rel_path("frames\\b.png").unwrap(), "frames/b.png");
    assert_eq!(
        normalize_rel_path("./frames//b.png").unwrap(),
        "frames/b.png"
    );
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs/x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./.").is_err());
}

#[test]
fn convention_requires_the_frames_prefix() {
    assert_eq!(
        conventional_path("frames/round.png").as_deref(),
        Some("frames/round.png")
    );
    assert_eq!(
        conventional_path(".\\frames\\round.png").as_deref(),
        Some("frames/round.png")
    );
    assert!(conventional_path("other/round.png").is_none());
    assert!(conventional_path("frames/../escape.png").is_none());
    assert!(conventional_path("/frames/abs.png").is_none());
}

#[test]
fn asset_ids_are_stable_and_distinct_per_path() {
    let a1 = FrameAssetStore::hash_id("frames/a.png");
    let a2 = FrameAssetStore::hash_id("frames/a.png");
    let b = FrameAssetStore::hash_id("frames/b.png");

    assert_eq!(a1, a2);
    assert_ne!(a1, b);
    assert_eq!(AssetId::from_u64(a1.as_u64()), a1);
}
