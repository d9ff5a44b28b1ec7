use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::Level;

use bottlefill::detection::load_image;
use bottlefill::config::{DetectorOverrides, SegmentationKind};
use bottlefill::{AppConfig, FillDetector, Overlay};

#[derive(Parser)]
#[command(name = "bottlefill")]
#[command(about = "Estimate how full a water bottle is from an image or a camera")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file; command line flags take precedence
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Estimate the fill level of a still image
    Estimate {
        /// Path to input image file
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Segmentation strategy
        #[arg(long, value_enum)]
        strategy: Option<Strategy>,

        /// Smallest contour area accepted as a bottle
        #[arg(long)]
        min_area: Option<f64>,

        /// Grey level separating water from background in the bottle region
        #[arg(long)]
        threshold: Option<u8>,

        /// Run on the image as-is instead of the 400x600 processing frame
        #[arg(long)]
        no_resize: bool,

        /// Print the detection as JSON
        #[arg(long)]
        json: bool,

        /// Write an annotated copy of the processing frame
        #[arg(long, value_name = "OUT")]
        annotate: Option<PathBuf>,

        /// TrueType font for annotation labels
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Save debug outputs to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,
    },

    /// Run a headless live session on a camera
    #[cfg(feature = "camera")]
    Watch {
        /// Camera index
        #[arg(long)]
        device: Option<u32>,

        /// Stop after this many frames (runs until interrupted otherwise)
        #[arg(long)]
        frames: Option<u64>,

        /// Directory for saved frames
        #[arg(long, value_name = "DIR")]
        snapshot_dir: Option<PathBuf>,

        /// Save a frame every N captured frames
        #[arg(long, value_name = "N")]
        save_every: Option<u64>,
    },

    /// Open the desktop application
    #[cfg(feature = "gui")]
    Gui {
        /// TrueType font for live overlay labels
        #[arg(long, value_name = "FILE")]
        font: Option<PathBuf>,

        /// Image shown while the application starts
        #[arg(long, value_name = "IMAGE")]
        splash: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Edge,
    Color,
}

impl From<Strategy> for SegmentationKind {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::Edge => SegmentationKind::Edge,
            Strategy::Color => SegmentationKind::Color,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();

    let mut config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match args.command {
        Command::Estimate {
            image_path,
            strategy,
            min_area,
            threshold,
            no_resize,
            json,
            annotate,
            font,
            debug_out,
        } => {
            config.detector.apply_overrides(&DetectorOverrides {
                strategy: strategy.map(SegmentationKind::from),
                min_area,
                threshold,
                no_resize,
            });
            if font.is_some() {
                config.gui.font = font;
            }

            let mut detector = FillDetector::new(config.detector.clone());
            if let Some(debug_dir) = debug_out {
                detector = detector.with_debug(debug_dir)?;
            }

            let img = load_image(&image_path)?;
            tracing::debug!("Image loaded: {}x{}", img.width(), img.height());

            let detection = detector
                .detect(&img)
                .with_context(|| format!("Failed to process {}", image_path.display()))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detection)?);
            } else {
                println!("{}", detection.message());
            }

            if let Some(out) = annotate {
                let overlay = Overlay::load(config.gui.font.as_deref())?;
                let frame = detector.prepare_frame(&img).to_rgb8();
                overlay
                    .annotate(&frame, &detection)
                    .save(&out)
                    .with_context(|| format!("Failed to write {}", out.display()))?;
                tracing::info!("Annotated image written to {}", out.display());
            }
        }

        #[cfg(feature = "camera")]
        Command::Watch {
            device,
            frames,
            snapshot_dir,
            save_every,
        } => {
            if let Some(device) = device {
                config.session.device_index = device;
            }
            if let Some(dir) = snapshot_dir {
                config.session.snapshot_dir = dir;
            }
            watch(config, frames, save_every)?;
        }

        #[cfg(feature = "gui")]
        Command::Gui { font, splash } => {
            if font.is_some() {
                config.gui.font = font;
            }
            if splash.is_some() {
                config.gui.splash = splash;
            }
            bottlefill::gui::run(config)?;
        }
    }

    Ok(())
}

#[cfg(feature = "camera")]
fn watch(config: AppConfig, frames: Option<u64>, save_every: Option<u64>) -> anyhow::Result<()> {
    use bottlefill::capture::{LiveSession, WebcamCapture};

    let (width, height) = config.session.capture_size;
    let camera = WebcamCapture::new(config.session.device_index, width, height)
        .context("Failed to open camera")?;
    let detector = FillDetector::new(config.detector.clone());

    let mut session =
        LiveSession::new(camera, detector, Overlay::without_text(), config.session).without_display();
    session.start()?;

    while frames.is_none_or(|limit| session.frame_count() < limit) {
        let live = session.next_frame()?;

        if let Some(detection) = &live.detection {
            match detection.status() {
                Some(status) => tracing::info!(
                    frame = live.index,
                    "{} ({})",
                    detection.message(),
                    status.label()
                ),
                None => tracing::info!(frame = live.index, "{}", detection.message()),
            }
        }

        if let Some(every) = save_every.filter(|n| *n > 0) {
            if (live.index + 1) % every == 0 {
                session.handle_key('s')?;
            }
        }
    }

    session.stop();
    Ok(())
}
