//! Binary entrypoint: headless halo preview over an image sequence.

use std::path::PathBuf;
use std::rc::Rc;

use ambient_halo::config::{Configuration, LayoutChange, MAX_LAYOUT_PX};
use ambient_halo::preview::{self, PreviewPlatform, SequenceSource};
use ambient_halo::{AmbilightController, Rect, SourceId};
use anyhow::{Context, Result, bail, ensure};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Debug, Parser)]
#[command(name = "ambient-halo", about = "Preview an ambient halo around a frame sequence")]
struct Cli {
    /// Directory of still images played back as the video
    #[arg(long, value_name = "DIR")]
    frames: PathBuf,

    /// Path to YAML config file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Rendered size of the video box
    #[arg(long, value_name = "WxH", default_value = "640x360")]
    layout: String,

    /// Resize the video box before refresh N
    #[arg(long, value_name = "N:WxH")]
    resize_at: Option<String>,

    /// Override the output directory
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ambient_halo={}", level).parse()?);
    fmt().with_env_filter(filter).with_target(true).init();
    Ok(())
}

fn parse_layout(s: &str) -> Result<Rect> {
    let Some((w, h)) = s.split_once(['x', 'X']) else {
        bail!("layout must look like WIDTHxHEIGHT, got {s:?}");
    };
    let w: f32 = w.trim().parse().context("layout width")?;
    let h: f32 = h.trim().parse().context("layout height")?;
    ensure!(
        (0.0..=MAX_LAYOUT_PX).contains(&w) && (0.0..=MAX_LAYOUT_PX).contains(&h),
        "layout {s:?} must be within [0, {MAX_LAYOUT_PX}] on both axes"
    );
    Ok(Rect::new(0.0, 0.0, w, h))
}

fn parse_resize_at(s: &str) -> Result<LayoutChange> {
    let Some((frame, size)) = s.split_once(':') else {
        bail!("resize must look like FRAME:WIDTHxHEIGHT, got {s:?}");
    };
    let at_frame: u32 = frame.trim().parse().context("resize frame")?;
    let rect = parse_layout(size)?;
    Ok(LayoutChange {
        at_frame,
        width: rect.width,
        height: rect.height,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut cfg = match &cli.config {
        Some(path) => Configuration::from_yaml_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Configuration::default(),
    };
    if let Some(out) = cli.out {
        cfg.preview.output_dir = out;
    }
    if let Some(step) = &cli.resize_at {
        cfg.preview.resize = Some(parse_resize_at(step)?);
    }
    let cfg = cfg.validated().context("validating configuration")?;

    let layout = parse_layout(&cli.layout)?;
    let source = Rc::new(SequenceSource::from_dir(SourceId(1), &cli.frames, layout)?);
    let glow = cfg.halo.glow;
    let margin = (glow.offset_px.max(0.0) as u32).saturating_add(glow.spread_px.max(0.0) as u32);
    let mut controller = AmbilightController::new(PreviewPlatform::default(), cfg.halo.clone());

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building runtime")?;
    let cancel = CancellationToken::new();
    let written = runtime.block_on(async {
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                on_signal.cancel();
            }
        });
        preview::run(&mut controller, source, &cfg.preview, margin, cancel).await
    })?;

    info!(written, dir = %cfg.preview.output_dir.display(), "done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_layout_in_either_case() {
        let r = parse_layout("640X360").unwrap();
        assert_eq!((r.width, r.height), (640.0, 360.0));
        assert!(parse_layout("640").is_err());
    }

    #[test]
    fn oversized_layout_is_rejected() {
        assert!(parse_layout("1e12x10").is_err());
        assert!(parse_layout("-5x10").is_err());
    }

    #[test]
    fn parses_resize_at() {
        let change = parse_resize_at("12:320x180").unwrap();
        assert_eq!(
            change,
            LayoutChange {
                at_frame: 12,
                width: 320.0,
                height: 180.0,
            }
        );
        assert!(parse_resize_at("320x180").is_err());
        assert!(parse_resize_at("x:320x180").is_err());
    }
}
