use std::path::PathBuf;

use clap::Parser;
use log::{debug, info};

use tramos::batch_processor::{discover_tracks, ensure_any_segments, plan_sheets, process_batch, write_report};
use tramos::output_target::{classify_input, resolve_output, InputKind};
use tramos::plan_writer::{write_plan_to_path, DEFAULT_EVERY_MINUTES, DEFAULT_REST_MINUTES};
use tramos::segment_pipeline::{
    DEFAULT_ELEVATION_THRESHOLD, DEFAULT_MAX_SLOPE, DEFAULT_MIN_ELEVATION, DEFAULT_MIN_HORIZONTAL,
    DEFAULT_MIN_SEGMENT_LENGTH,
};
use tramos::{PlanSettings, Preparation, Section, Thresholds, TramosError};

/// Turn a GPX track (or a folder of them) into a trip-planning segment sheet.
///
/// Lower thresholds give more segments and a more precise plan.
#[derive(Parser, Debug)]
#[command(name = "tramos", version)]
struct Cli {
    /// GPX file, or a folder whose .gpx files each become one sheet.
    input: PathBuf,

    /// Plan file to write (.csv). Defaults next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Runs climbing less than this (m) are merged into the previous run.
    #[arg(long, default_value_t = DEFAULT_ELEVATION_THRESHOLD)]
    elevation_threshold: f64,

    /// Steeper segments (fraction, 0.6 = 60%) are treated as bad readings. 1 disables.
    #[arg(long, default_value_t = DEFAULT_MAX_SLOPE)]
    max_slope: f64,

    /// Segments shorter than this (m) are merged into the previous one. 0 disables.
    #[arg(long, default_value_t = DEFAULT_MIN_SEGMENT_LENGTH)]
    min_segment_length: f64,

    /// Combined rule: horizontal length (m) under which a low segment is merged. 0 disables.
    #[arg(long, default_value_t = DEFAULT_MIN_HORIZONTAL)]
    min_horizontal: f64,

    /// Combined rule: elevation (m) under which a short segment is merged. 0 disables.
    #[arg(long, default_value_t = DEFAULT_MIN_ELEVATION)]
    min_elevation: f64,

    #[arg(long, value_enum, default_value_t = Section::Scout)]
    section: Section,

    #[arg(long, value_enum, default_value_t = Preparation::Media)]
    preparation: Preparation,

    /// Rest length (minutes).
    #[arg(long, default_value_t = DEFAULT_REST_MINUTES)]
    rest: i64,

    /// Walking time between rests (minutes).
    #[arg(long, default_value_t = DEFAULT_EVERY_MINUTES)]
    every: i64,

    /// Worker threads for folder input.
    #[arg(short, long, default_value_t = num_cpus::get())]
    jobs: usize,

    /// Also write a per-file processing report (.csv).
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let thresholds = Thresholds {
        elevation_threshold: cli.elevation_threshold,
        max_slope: cli.max_slope,
        min_segment_length: cli.min_segment_length,
        min_horizontal_for_combined: cli.min_horizontal,
        min_elevation_for_combined: cli.min_elevation,
    };
    thresholds.validate()?;
    debug!("{:?}", thresholds);

    let settings = PlanSettings::new(cli.section, cli.preparation, cli.rest, cli.every);
    let input = classify_input(&cli.input)?;
    let output = resolve_output(&cli.input, cli.output.as_deref())?;

    let paths = match input {
        InputKind::SingleTrack(path) => vec![path],
        InputKind::Folder(folder) => {
            let paths = discover_tracks(&folder)?;
            info!("🔍 Found {} GPX files in {}", paths.len(), folder.display());
            paths
        }
    };
    if paths.is_empty() {
        return Err(TramosError::InvalidInput(format!("no .gpx files in {}", cli.input.display())).into());
    }

    let outcomes = process_batch(&paths, &thresholds, cli.jobs)?;

    if let Some(report) = &cli.report {
        write_report(report, &outcomes)?;
        info!("📄 Report saved to: {}", report.display());
    }

    // A single track has no siblings to fall back on, so surface its own error.
    if let [single] = outcomes.as_slice() {
        if let Err(e) = &single.result {
            return Err(format!("{}: {}", single.path.display(), e).into());
        }
    }
    ensure_any_segments(&outcomes, &cli.input)?;

    let sheets = plan_sheets(&outcomes);
    write_plan_to_path(&output, &sheets, &settings)?;

    println!("\n📊 TRAMOS SUMMARY");
    println!("================");
    for outcome in &outcomes {
        match &outcome.result {
            Ok(processed) => println!(
                "  {} ({}): {} segments from {} points",
                outcome.sheet_name,
                processed.track_name,
                processed.segments.len(),
                processed.points
            ),
            Err(e) => println!("  {}: skipped ({})", outcome.sheet_name, e),
        }
    }
    println!("📁 Plan saved to: {}", output.display());

    Ok(())
}
