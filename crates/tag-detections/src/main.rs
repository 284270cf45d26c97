mod utils;
use anyhow::{Context, Result};
use centroid_tracker::{
    load_detections_from_path, tagged_records, write_json, write_mot, ClassTable, Tracker,
};
use clap::Parser;
use std::{
    fs::File,
    io::{self, BufReader, BufWriter},
    num::NonZeroU32,
    path::PathBuf,
};
use tracing::info;
use tracing_subscriber::EnvFilter;
use utils::*;

/// Assign persistent track ids to per-frame object detections
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The detections JSON file
    #[arg(short, long)]
    input: PathBuf,

    /// Class parameter table JSON. Defaults to the built in table
    #[arg(short, long)]
    classes: Option<PathBuf>,

    /// Write tagged detections JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write MOT challenge format output
    #[arg(short, long)]
    mot: Option<PathBuf>,

    /// Drop tracks that can no longer match every n frames
    #[arg(long)]
    compact_every: Option<NonZeroU32>,

    /// Glob of frame images named by frame index, e.g. `frames/*.jpg`, to draw tracks on
    #[arg(short, long)]
    frames: Option<String>,

    /// TrueType font for drawing track ids. Ids are not drawn without one
    #[arg(long, requires = "frames")]
    font: Option<PathBuf>,

    /// Directory to write drawn frames to
    #[arg(long, default_value = "./out")]
    out_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let classes = match &args.classes {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("opening class table {}", path.display()))?;
            ClassTable::from_reader(BufReader::new(file))?
        }
        None => ClassTable::default(),
    };

    let frames = load_detections_from_path(&args.input)
        .with_context(|| format!("loading detections {}", args.input.display()))?;
    info!(
        frames = frames.len(),
        classes = classes.len(),
        "loaded detections"
    );

    let mut tracker = Tracker::new(classes);
    tracker.with_compact_every(args.compact_every);
    let tagged = tracker.run(frames)?;
    info!(
        tracks = tracker.store().peek_id(),
        resident = tracker.store().len(),
        "tagged detections"
    );

    let records = tagged_records(&tagged, tracker.classes())?;
    match &args.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating output {}", path.display()))?;
            write_json(BufWriter::new(file), &records)?;
        }
        None => write_json(io::stdout().lock(), &records)?,
    }

    if let Some(path) = &args.mot {
        let file =
            File::create(path).with_context(|| format!("creating output {}", path.display()))?;
        write_mot(BufWriter::new(file), &tagged)?;
    }

    if let Some(pattern) = &args.frames {
        let font = args.font.as_deref().map(overlay::load_font).transpose()?;
        let written = overlay::write_images(pattern, &args.out_dir, &records, font.as_ref())?;
        info!(written, out_dir = %args.out_dir.display(), "wrote frames");
    }

    Ok(())
}
