use std::fs;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use serde::Serialize;

use tailview_kernel::record::Level;
use tailview_kernel::stream::{MockStream, MockStreamConfig, StreamTransport};
use tailview_kernel::viewer::{LogViewer, ViewSummary, ViewerConfig};

/// Tailview log pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "tailview")]
#[command(about = "Bounded log buffer with filtering and a windowed view", long_about = None)]
struct Cli {
    /// Path to a JSON array of record payloads
    #[arg(long, conflicts_with = "mock")]
    records: Option<String>,

    /// Generate this many records with the mock stream instead
    #[arg(long)]
    mock: Option<usize>,

    /// Seed for the mock stream
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Comma-separated enabled levels (debug,info,warn,error); default all
    #[arg(long)]
    levels: Option<String>,

    /// Substring query applied to messages
    #[arg(long)]
    query: Option<String>,

    /// Match the query case-sensitively
    #[arg(long, default_value_t = false)]
    case_sensitive: bool,

    /// Buffer capacity (oldest records evicted beyond this)
    #[arg(long, default_value_t = 50_000)]
    cap: usize,

    /// Viewport height in rows
    #[arg(long, default_value_t = 40)]
    rows: u32,

    /// Row height in pixels
    #[arg(long, default_value_t = 1)]
    row_height: u32,
}

/// Wrapper for JSON output
#[derive(Debug, Serialize)]
struct CliOutput {
    summary: ViewSummary,
    dropped_payloads: usize,
    pinned: bool,
    window: Vec<WindowRow>,
}

#[derive(Debug, Serialize)]
struct WindowRow {
    timestamp_ms: u64,
    level: &'static str,
    message: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ----------------------------
    // Build the viewer
    // ----------------------------
    let mut viewer = LogViewer::new(ViewerConfig {
        capacity: cli.cap,
        row_height: cli.row_height,
        viewport_height: cli.rows * cli.row_height.max(1),
        ..ViewerConfig::default()
    });

    // ----------------------------
    // Ingest records
    // ----------------------------
    let mut dropped = 0usize;
    match (&cli.records, cli.mock) {
        (Some(path), _) => {
            let data = fs::read_to_string(path)?;
            let payloads: Vec<serde_json::Value> = serde_json::from_str(&data)?;
            for payload in payloads {
                if !viewer.ingest_json(&payload.to_string()) {
                    dropped += 1;
                }
            }
        }
        (None, Some(count)) => {
            let mut stream = MockStream::new(MockStreamConfig {
                seed: cli.seed,
                ..MockStreamConfig::default()
            });
            let start = Instant::now();
            stream.open(start);

            // Step simulated time; no real waiting.
            let mut now = start;
            let mut produced = 0;
            while produced < count {
                now += Duration::from_millis(50);
                let mut batch = stream.poll(now);
                batch.truncate(count - produced);
                produced += batch.len();
                viewer.ingest_batch(batch);
            }
            stream.close();
        }
        (None, None) => bail!("either --records or --mock is required"),
    }

    // ----------------------------
    // Apply filters
    // ----------------------------
    if let Some(levels) = &cli.levels {
        for level in Level::ALL {
            viewer.set_level_enabled(level, false);
        }
        for name in levels.split(',') {
            let level = Level::parse(name.trim())?;
            viewer.set_level_enabled(level, true);
        }
    }

    viewer.set_case_sensitive(cli.case_sensitive);

    if let Some(query) = &cli.query {
        // Step past the debounce deadline so the query takes effect.
        let now = Instant::now();
        viewer.set_query(query.clone(), now);
        viewer.tick(now + Duration::from_secs(1));
    }

    // ----------------------------
    // Output
    // ----------------------------
    let window = viewer
        .window_records()
        .into_iter()
        .map(|record| WindowRow {
            timestamp_ms: record.timestamp_ms,
            level: record.level.label(),
            message: record.message.clone(),
        })
        .collect();

    let output = CliOutput {
        summary: viewer.summary(),
        dropped_payloads: dropped,
        pinned: viewer.viewport().is_pinned(),
        window,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    viewer.close();

    Ok(())
}
