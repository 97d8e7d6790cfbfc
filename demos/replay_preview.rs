use framefit::{
    Canvas, FrameAssetStore, PreviewSession, ReplayFace, ReplayScript, SessionConfig, TimestampMs,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Generate a stand-in product overlay so the demo is self-contained.
    let root = std::env::temp_dir().join("framefit_demo_assets");
    std::fs::create_dir_all(root.join("frames"))?;
    let overlay = image::RgbaImage::from_pixel(240, 90, image::Rgba([40, 40, 48, 255]));
    overlay.save(root.join("frames/classic-round.png"))?;

    let store = FrameAssetStore::prepare(root, &[])?;
    let config = SessionConfig {
        canvas: Canvas {
            width: 640,
            height: 480,
        },
        replay: Some(ReplayScript {
            faces: vec![Some(ReplayFace::default()); 10],
            ..ReplayScript::default()
        }),
        ..SessionConfig::default()
    };

    let mut session = PreviewSession::replay(config, store)?;
    session.start(TimestampMs(0));

    let mut now = TimestampMs(0);
    let mut frames = 0u32;
    for _ in 0..64 {
        now = now.saturating_add(33);
        session.tick(now);
        if let Some(frame) = session.next_frame(now)? {
            frames += 1;
            println!(
                "frame {frames}: {}x{} at {} ms",
                frame.width, frame.height, now.0
            );
        }
    }

    let report = session.capture()?;
    println!("measured: {}", serde_json::to_string(&report)?);
    Ok(())
}
