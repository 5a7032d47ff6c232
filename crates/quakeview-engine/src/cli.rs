//! Command-line surface of the `quakeview` binary.
//!
//! Every flag maps onto a field of [`AppConfig`], so the YAML file supplies
//! the baseline and the command line only overrides what it names.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use quakeview_core::config::{AppConfig, FilterConfig};

/// Explore an earthquake catalogue as bars on a globe.
#[derive(Debug, Parser)]
#[command(name = "quakeview", version)]
pub struct Cli {
    /// YAML configuration file. Defaults are used if it does not exist.
    #[arg(long, global = true, default_value = "quakeview-config.yaml")]
    pub config: PathBuf,

    /// Event catalogue CSV, overriding `data.events_path`.
    #[arg(long, global = true)]
    pub events: Option<PathBuf>,

    /// What to do with the catalogue.
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the headless frame loop, rebuilding bars whenever settings change.
    Run(RunArgs),
    /// Print the events matching a filter as JSON lines.
    Query(QueryArgs),
    /// Print one line per catalogue day, newest day first.
    Playback,
}

/// Overrides for the initial filter.
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct FilterArgs {
    /// Region preset, by slug or name (`japan`, `latin-america`, `world`).
    #[arg(long)]
    pub region: Option<String>,

    /// Year window such as `2010-2014`, or a single year.
    #[arg(long, value_parser = parse_years)]
    pub years: Option<(i32, i32)>,

    /// Magnitude window such as `5-9`.
    #[arg(long, value_parser = parse_magnitudes)]
    pub magnitude: Option<[f64; 2]>,
}

impl FilterArgs {
    /// Write the given overrides into `filter`.
    pub fn apply(&self, filter: &mut FilterConfig) {
        if let Some(region) = &self.region {
            filter.region = Some(region.clone());
        }
        if let Some((start, end)) = self.years {
            filter.start_year = start;
            filter.end_year = end;
        }
        if let Some(magnitude) = self.magnitude {
            filter.magnitude = Some(magnitude);
        }
    }
}

/// Arguments of `quakeview run`.
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Stop after this many frames. Without it the loop runs until
    /// interrupted, or until history playback ends.
    #[arg(long)]
    pub frames: Option<u64>,

    /// Bar scale.
    #[arg(long)]
    pub scale: Option<f64>,

    /// Size bars by magnitude instead of depth.
    #[arg(long)]
    pub show_by_magnitude: bool,

    /// Replay the catalogue day by day while the loop runs.
    #[arg(long)]
    pub history: bool,
}

impl RunArgs {
    /// Write the given overrides into `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        self.filter.apply(&mut config.filter);
        if let Some(scale) = self.scale {
            config.display.scale = scale;
        }
        if self.show_by_magnitude {
            config.display.show_by_magnitude = true;
        }
    }
}

/// Arguments of `quakeview query`.
#[derive(Debug, Clone, Default, PartialEq, Args)]
pub struct QueryArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Keep only events whose place contains this text (case-sensitive).
    #[arg(long)]
    pub place: Option<String>,
}

/// Parse `2010-2014` or `2011`.
fn parse_years(raw: &str) -> Result<(i32, i32), String> {
    let year = |text: &str| {
        text.trim()
            .parse::<i32>()
            .map_err(|err| format!("invalid year {text:?}: {err}"))
    };
    match raw.split_once('-') {
        Some((start, end)) => Ok((year(start)?, year(end)?)),
        None => {
            let single = year(raw)?;
            Ok((single, single))
        }
    }
}

/// Parse `5-9` or `5.5-7`.
fn parse_magnitudes(raw: &str) -> Result<[f64; 2], String> {
    let (low, high) = raw
        .split_once('-')
        .ok_or_else(|| format!("expected LOW-HIGH, got {raw:?}"))?;
    let magnitude = |text: &str| {
        text.trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| format!("invalid magnitude {text:?}"))
    };
    let (low, high) = (magnitude(low)?, magnitude(high)?);
    if low > high {
        return Err(format!("magnitude window {low}-{high} is inverted"));
    }
    Ok([low, high])
}
