use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use ply_points::prelude::*;
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// point cloud file(s) in ascii ply format
    #[clap(long, required = true, num_args = 1..)]
    input: Vec<PathBuf>,

    /// handling of data lines with an unparsable coordinate
    #[clap(long, value_enum, default_value_t = ErrorMode::Strict)]
    error_mode: ErrorMode,

    /// result of an input file that cannot be opened
    #[clap(long, value_enum, default_value_t = MissingSource::Empty)]
    missing_source: MissingSource,

    /// json lines file to write points to; points are listed on stdout when omitted
    #[clap(long)]
    output: Option<PathBuf>,

    /// json file to write the per-input load summary and the feed report to
    #[clap(long)]
    summary: Option<PathBuf>,
}

impl Args {
    fn options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_error_mode(self.error_mode)
            .with_missing_source(self.missing_source)
    }
}

/// One input of the summary file
#[derive(Serialize, Debug)]
struct InputSummary<'a> {
    path: &'a Path,
    points: usize,
    declared_vertex_count: Option<i64>,
    skipped_lines: usize,
    complete: bool,
    bounds: Option<BoundingBox>,
    error: Option<String>,
}

impl<'a> InputSummary<'a> {
    fn new(path: &'a Path, load: &PointLoad) -> Self {
        let bounds = BoundingBox::from_iter(load.points());
        Self {
            path,
            points: load.len(),
            declared_vertex_count: load.declared_vertex_count(),
            skipped_lines: load.skipped_lines(),
            complete: load.is_complete(),
            bounds: (!bounds.is_empty()).then_some(bounds),
            error: load
                .fault()
                .or_else(|| load.unavailable_reason())
                .map(|e| e.to_string()),
        }
    }
}

#[derive(Serialize, Debug)]
struct Summary<'a> {
    inputs: Vec<InputSummary<'a>>,
    feed: FeedReport,
}

fn write_summary(
    path: &Path,
    loads: &[(PathBuf, PointLoad)],
    feed: FeedReport,
) -> anyhow::Result<()> {
    let summary = Summary {
        inputs: loads
            .iter()
            .map(|(path, load)| InputSummary::new(path, load))
            .collect(),
        feed,
    };
    let json = serde_json::to_string(&summary)?;
    let mut f = File::create(path).with_context(|| format!("failed to create {:?}", path))?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

fn report_load(path: &Path, load: &PointLoad) {
    if let Some(reason) = load.unavailable_reason() {
        warn!("Skipping point cloud file: {}", reason);
    }
    if let Some(fault) = load.fault() {
        warn!("Error reading point cloud file {:?}: {}", path, fault);
    }

    if load.is_empty() {
        info!("No points loaded from {:?}.", path);
        return;
    }

    let bounds = BoundingBox::from_iter(load.points());
    info!(
        declared = load.declared_vertex_count(),
        skipped = load.skipped_lines(),
        "Loaded {} points from {:?} (min: {:?}, max: {:?}, center: {:?}, size: {:?})",
        load.len(),
        path,
        bounds.min(),
        bounds.max(),
        bounds.center(),
        bounds.size()
    );
}

fn feed_all<S: PointSink>(loads: &[(PathBuf, PointLoad)], sink: &mut S) -> FeedReport {
    let mut report = FeedReport::default();
    for (_, load) in loads {
        report += feed_points(load.points(), sink);
    }
    report
}

fn run(args: &Args) -> anyhow::Result<FeedReport> {
    let options = args.options();

    let loads: Vec<(PathBuf, PointLoad)> = args
        .input
        .par_iter()
        .map(|path| load_points(path, &options).map(|load| (path.clone(), load)))
        .collect::<Result<_, _>>()?;

    for (path, load) in &loads {
        report_load(path, load);
    }

    let report = match &args.output {
        Some(output) => {
            let file = File::create(output)
                .with_context(|| format!("failed to create {:?}", output))?;
            let mut sink = JsonLinesSink::new(BufWriter::new(file));
            let report = feed_all(&loads, &mut sink);
            sink.flush()?;
            report
        }
        None => {
            let stdout = io::stdout();
            let mut sink = ListingSink::new(BufWriter::new(stdout.lock()));
            let report = feed_all(&loads, &mut sink);
            sink.flush()?;
            report
        }
    };

    info!(
        "Point cloud feed complete: {} accepted, {} failed",
        report.accepted, report.failed
    );

    if let Some(summary) = &args.summary {
        write_summary(summary, &loads, report)?;
    }

    Ok(report)
}

async fn handler() -> anyhow::Result<()> {
    let args: Args = Args::parse();
    tokio::task::spawn_blocking(move || run(&args)).await??;
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match handler().await {
        Ok(_) => {
            eprintln!("success");
        }
        Err(e) => {
            eprintln!("error: {:?}", e);
            std::process::exit(1);
        }
    }
}
