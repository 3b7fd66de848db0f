mod config;
mod timers;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use catalog::axis_label;
use clap::{Args as ClapArgs, Parser, Subcommand};
use runtime::{ManualTimers, StatusEvent, StatusLevel};
use scene::{ActiveRegions, Frame};
use serde::Serialize;
use session::{Controls, Dataset, Session, TickOutcome};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::ViewerConfig;
use crate::timers::TokioTimers;

#[derive(Parser, Debug)]
#[command(author, version, about = "Beeswarm chart of development indicators")]
struct Args {
    /// Indicator table (Country, Year, indicator columns...)
    #[arg(long, default_value = "data/global_development.csv")]
    indicators: PathBuf,

    /// Country to region table
    #[arg(long, default_value = "data/countries_regions.csv")]
    regions: PathBuf,

    /// JSON config file (default: $BEESWARM_CONFIG, else built-in defaults)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print regions, years and attributes of the loaded data
    Info,

    /// Lay out one frame and print it as JSON
    Frame(SelectionArgs),

    /// Play through the years from the selected one, one JSON frame per line
    Play {
        #[command(flatten)]
        selection: SelectionArgs,

        /// Override the delay between years
        #[arg(long)]
        delay_ms: Option<u64>,
    },
}

#[derive(ClapArgs, Debug, Clone, Default)]
struct SelectionArgs {
    /// Year to draw (default: first year in the data)
    #[arg(long)]
    year: Option<String>,

    /// Region to include; repeat for several (default: all regions)
    #[arg(long = "region")]
    regions: Vec<String>,

    /// Attribute placed on the x axis
    #[arg(long)]
    position: Option<String>,

    /// Attribute encoded as circle area
    #[arg(long)]
    size: Option<String>,
}

impl SelectionArgs {
    fn controls(&self, dataset: &Dataset) -> Controls {
        let mut controls = Controls::defaults_for(dataset);
        if !self.regions.is_empty() {
            controls.active = ActiveRegions::from_regions(self.regions.iter().cloned());
        }
        if let Some(year) = &self.year {
            controls.year = year.clone();
        }
        if let Some(position) = &self.position {
            controls.attributes.position = position.clone();
        }
        if let Some(size) = &self.size {
            controls.attributes.size = size.clone();
        }
        for attribute in [&controls.attributes.position, &controls.attributes.size] {
            if !dataset.has_attribute(attribute) {
                warn!(%attribute, "unknown attribute, all its values count as missing");
            }
        }
        controls
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    x_label: String,
    size_label: String,
    #[serde(flatten)]
    frame: &'a Frame,
}

#[derive(Serialize)]
struct DatasetInfo<'a> {
    records: usize,
    countries: usize,
    regions: Vec<String>,
    years: &'a [String],
    attributes: &'a [String],
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = ViewerConfig::load(args.config.as_deref())?;
    let dataset = Arc::new(load_dataset(&args, &config)?);

    match args.command {
        Command::Info => print_info(&dataset),
        Command::Frame(selection) => draw_frame(dataset, &config, &selection),
        Command::Play {
            selection,
            delay_ms,
        } => play(dataset, config, &selection, delay_ms).await,
    }
}

fn load_dataset(args: &Args, config: &ViewerConfig) -> anyhow::Result<Dataset> {
    let table = formats::load_indicators(&args.indicators)
        .with_context(|| format!("loading indicators from {}", args.indicators.display()))?;
    let regions = formats::load_regions(&args.regions, &config.region_columns)
        .with_context(|| format!("loading regions from {}", args.regions.display()))?;
    let attributes = table.attributes();
    Ok(Dataset::new(table.records, attributes, &regions))
}

fn print_info(dataset: &Dataset) -> anyhow::Result<()> {
    let info = DatasetInfo {
        records: dataset.records.len(),
        countries: dataset.index.len(),
        regions: dataset.regions(),
        years: dataset.years.as_slice(),
        attributes: &dataset.attributes,
    };
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn draw_frame(
    dataset: Arc<Dataset>,
    config: &ViewerConfig,
    selection: &SelectionArgs,
) -> anyhow::Result<()> {
    let controls = selection.controls(&dataset);
    let mut session =
        Session::new(dataset, ManualTimers::new(), config.session()).with_controls(controls);
    let drawn = session.refresh();
    print_status(session.drain_status());
    match drawn {
        Ok(frame) => print_frame(&frame),
        Err(empty) => bail!("nothing to draw: {empty}"),
    }
}

async fn play(
    dataset: Arc<Dataset>,
    mut config: ViewerConfig,
    selection: &SelectionArgs,
    delay_ms: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(ms) = delay_ms {
        config.playback.tick_delay_ms = ms;
    }
    let controls = selection.controls(&dataset);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut session =
        Session::new(dataset, TokioTimers::new(tx), config.session()).with_controls(controls);

    let mut outcome = session.on_play_toggle();
    loop {
        if let Some(frame) = outcome.frame() {
            print_frame(frame)?;
        }
        print_status(session.drain_status());
        if !session.playback().is_running() {
            break;
        }

        tokio::select! {
            Some(id) = rx.recv() => outcome = session.on_timer(id),
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping playback");
                session.stop_playback();
                outcome = TickOutcome::Ignored;
            }
        }
    }
    Ok(())
}

fn print_frame(frame: &Frame) -> anyhow::Result<()> {
    let out = FrameOutput {
        x_label: axis_label(&frame.attributes.position),
        size_label: axis_label(&frame.attributes.size),
        frame,
    };
    println!("{}", serde_json::to_string(&out)?);
    Ok(())
}

fn print_status(events: Vec<StatusEvent>) {
    for event in events {
        let level = match event.level {
            StatusLevel::Info => "info",
            StatusLevel::Warning => "warning",
        };
        eprintln!("[{level}] {}", event.message);
    }
}
