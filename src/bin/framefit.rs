use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use framefit::{
    CameraPhase, FrameAssetStore, FrameRGBA, PreviewSession, ScriptedCamera, ScriptedSource,
    SessionConfig, TimestampMs,
};

/// Upper bound on replayed session time, so a script that never produces
/// its frames cannot spin the driver forever.
const REPLAY_TIME_CAP_MS: u64 = 60_000;

#[derive(Parser, Debug)]
#[command(name = "framefit", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a session JSON file without running it.
    Validate(ValidateArgs),
    /// Replay a scripted session and write the composed frames as PNGs.
    Preview(PreviewArgs),
    /// Replay a scripted session and print the measurement report as JSON.
    Measure(MeasureArgs),
}

#[derive(Parser, Debug)]
struct ValidateArgs {
    /// Input session JSON.
    #[arg(long)]
    session: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input session JSON.
    #[arg(long)]
    session: PathBuf,

    /// Output directory for PNG frames.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct MeasureArgs {
    /// Input session JSON.
    #[arg(long)]
    session: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Preview(args) => cmd_preview(args),
        Command::Measure(args) => cmd_measure(args),
    }
}

fn cmd_validate(args: ValidateArgs) -> anyhow::Result<()> {
    let config = SessionConfig::from_path(&args.session)?;
    config.validate()?;
    eprintln!("ok: {}", args.session.display());
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.session)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let out_dir = args.out_dir.clone();
    let written = drive_replay(&mut session, |index, frame| {
        let path = out_dir.join(format!("frame_{index:04}.png"));
        write_png(&path, frame)
    })?;

    if let Some(surface) = session.fallback_frame()? {
        let path = args.out_dir.join("fallback.png");
        write_png(&path, &surface.frame)?;
        eprintln!("camera failed: {}", surface.message);
        eprintln!("wrote {}", path.display());
        return Ok(());
    }

    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}

fn cmd_measure(args: MeasureArgs) -> anyhow::Result<()> {
    let mut session = open_session(&args.session)?;
    drive_replay(&mut session, |_, _| Ok(()))?;

    if let Some(surface) = session.fallback_frame()? {
        anyhow::bail!("camera failed: {}", surface.message);
    }

    let report = session.capture()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Build a replay-driven session; assets resolve relative to the session file.
fn open_session(
    path: &std::path::Path,
) -> anyhow::Result<PreviewSession<ScriptedCamera, ScriptedSource>> {
    let config = SessionConfig::from_path(path)?;
    let assets_root = path.parent().unwrap_or_else(|| std::path::Path::new("."));

    let products: Vec<String> = config.frame_asset.iter().cloned().collect();
    let store = FrameAssetStore::prepare(assets_root, &products)?;
    Ok(PreviewSession::replay(config, store)?)
}

/// Tick the session through its replay script, handing each composed frame
/// to `on_frame`. Returns the number of frames produced.
fn drive_replay(
    session: &mut PreviewSession<ScriptedCamera, ScriptedSource>,
    mut on_frame: impl FnMut(usize, &FrameRGBA) -> anyhow::Result<()>,
) -> anyhow::Result<usize> {
    let (interval, total) = match &session.config().replay {
        Some(replay) => (replay.frame_interval_ms, replay.faces.len()),
        None => (33, 0),
    };

    session.start(TimestampMs(0));
    let mut now = TimestampMs(0);
    let mut written = 0usize;
    loop {
        now = now.saturating_add(interval);
        session.tick(now);
        if matches!(session.phase(), CameraPhase::Failed(_)) {
            break;
        }
        if let Some(frame) = session.next_frame(now)? {
            on_frame(written, &frame)?;
            written += 1;
        }
        if (session.phase() == CameraPhase::Ready && written >= total) || now.0 > REPLAY_TIME_CAP_MS
        {
            break;
        }
    }
    Ok(written)
}

fn write_png(path: &std::path::Path, frame: &FrameRGBA) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        &frame.data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}
