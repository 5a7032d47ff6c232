//! QuakeView binary.
//!
//! Loads an earthquake catalogue and either drives the bar pipeline through
//! a headless frame loop, prints a filtered slice of the catalogue, or walks
//! it day by day.
//!
//! # Startup Sequence
//!
//! 1. Parse the command line
//! 2. Load configuration from `quakeview-config.yaml` (or `--config`)
//! 3. Initialize structured logging (tracing) to stderr
//! 4. Open the event catalogue
//! 5. Dispatch the subcommand
//!
//! `run` additionally seeds the config registry, starts the bar pipeline,
//! and polls the presenter once per frame until the frame limit, an
//! interrupt, or the end of history playback.

mod cli;
mod error;
mod scene;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use quakeview_core::config::AppConfig;
use quakeview_core::geometry::BarBuilder;
use quakeview_core::history::{HistoryHandle, HistoryPlayer, mean_location};
use quakeview_core::pipeline::{BarPipeline, PipelineStatus};
use quakeview_core::presenter::BarPresenter;
use quakeview_core::registry::{ActiveFilter, ConfigRegistry};
use quakeview_filter::Filter;
use quakeview_store::EventStore;
use quakeview_types::Event;
use tokio::runtime::Handle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command, QueryArgs, RunArgs};
use crate::error::EngineError;
use crate::scene::HeadlessScene;

#[tokio::main]
async fn main() -> Result<(), EngineError> {
    let cli = Cli::parse();

    let (mut config, from_file) = load_config(&cli.config)?;
    if let Some(events) = &cli.events {
        config.data.events_path.clone_from(events);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(io::stderr)
        .with_target(true)
        .init();

    if from_file {
        info!(path = %cli.config.display(), "Configuration loaded");
    } else {
        info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    let store = Arc::new(EventStore::open(&config.data.events_path)?);

    match cli.command {
        Command::Run(args) => run(store, config, &args).await,
        Command::Query(args) => query(&store, config, &args),
        Command::Playback => playback(&store),
    }
}

/// Load configuration from `path`, falling back to defaults when the file
/// does not exist. The flag reports whether the file was read.
fn load_config(path: &Path) -> Result<(AppConfig, bool), EngineError> {
    if path.exists() {
        Ok((AppConfig::from_file(path)?, true))
    } else {
        Ok((AppConfig::parse("")?, false))
    }
}

/// Headless frame loop.
async fn run(
    store: Arc<EventStore>,
    mut config: AppConfig,
    args: &RunArgs,
) -> Result<(), EngineError> {
    args.apply(&mut config);

    let registry = Arc::new(ConfigRegistry::from_config(&config)?);
    if let Some(stats) = store.stats() {
        registry.seed_extrema(&stats);
    }

    let builder = Arc::new(BarBuilder::from_config(&config.pipeline));
    let pipeline = Arc::new(BarPipeline::new(
        Arc::clone(&store),
        Arc::clone(&registry),
        builder,
        &config.pipeline,
        Handle::current(),
    ));
    let initial = pipeline.start();
    info!(
        generation = %initial,
        filter = %registry.get::<ActiveFilter>(),
        scale = config.display.scale,
        show_by_magnitude = config.display.show_by_magnitude,
        "Initial build requested"
    );

    let history = args.history.then(|| {
        HistoryPlayer::new(
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&pipeline),
            Duration::from_millis(config.playback.day_interval_ms),
        )
        .spawn()
    });

    let mut presenter = BarPresenter::new(
        pipeline.queue(),
        HeadlessScene::default(),
        config.pipeline.poll_interval_ticks,
    );
    let frame_interval = Duration::from_millis(config.frame.frame_interval_ms.max(1));
    let mut ticker = tokio::time::interval(frame_interval);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut frames = 0_u64;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            result = &mut shutdown => {
                if let Err(err) = result {
                    warn!(error = %err, "Interrupt handler failed");
                }
                info!(frames, "Interrupted");
                break;
            }
        }

        presenter.poll();
        frames = frames.saturating_add(1);

        if args.frames.is_some_and(|limit| frames >= limit) {
            break;
        }
        let history_done = history.as_ref().is_some_and(HistoryHandle::is_finished);
        if history_done && pipeline.status() == PipelineStatus::Idle {
            break;
        }
    }

    if let Some(handle) = history {
        handle.stop();
        let summary = handle.join().await?;
        info!(days = summary.days, events = summary.events, "History playback ended");
    }
    pipeline.join_builds().await;

    let scene = presenter.parent();
    info!(
        frames,
        swaps = scene.swaps(),
        displayed = ?scene.displayed().map(|id| id.0),
        bars = scene.bars(),
        status = ?pipeline.status(),
        "Frame loop finished"
    );
    Ok(())
}

/// Print matching events as JSON lines on stdout.
fn query(store: &EventStore, mut config: AppConfig, args: &QueryArgs) -> Result<(), EngineError> {
    args.filter.apply(&mut config.filter);
    let filter = config.filter.composite()?;

    let events: Vec<Event> = match &args.place {
        Some(needle) => store
            .query_by_text(needle)
            .into_iter()
            .filter(|event| filter.evaluate(event))
            .collect(),
        None => store.query_by_predicate(&filter),
    };

    let mut out = io::stdout().lock();
    for event in &events {
        serde_json::to_writer(&mut out, event)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!(matched = events.len(), total = store.len(), %filter, "Query finished");
    Ok(())
}

/// Print one line per day: date, event count, and mean location.
fn playback(store: &EventStore) -> Result<(), EngineError> {
    let mut out = io::stdout().lock();
    let mut days = 0_usize;
    for batch in store.init_playback() {
        let Some(day) = batch.first().map(Event::date) else {
            continue;
        };
        match mean_location(&batch) {
            Some(centre) => writeln!(out, "{day}\t{}\t{centre}", batch.len())?,
            None => writeln!(out, "{day}\t{}", batch.len())?,
        }
        days = days.saturating_add(1);
    }
    out.flush()?;

    info!(days, events = store.len(), "Playback listing finished");
    Ok(())
}
