mod output;
mod telemetry;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use gantry_core::config::Config;
use gantry_core::ids::SpanId;
use gantry_core::model::span::Trace;
use gantry_view::{Viewport, visible_rows};
use gantry_wire::model::TraceResponse;

#[derive(Parser, Debug)]
#[command(name = "gantry")]
#[command(about = "Terminal Gantt viewer for distributed trace payloads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Render the projected span rows as a Gantt chart")]
    Rows {
        file: PathBuf,
        #[arg(long, help = "Span ids whose children are hidden")]
        collapse: Vec<String>,
        #[arg(long, help = "Viewport start, unix nanoseconds")]
        start_ns: Option<u64>,
        #[arg(long, help = "Viewport end, unix nanoseconds")]
        end_ns: Option<u64>,
        #[arg(long, help = "Bar area width in columns")]
        width: Option<usize>,
    },
    #[command(about = "Render the compressed overview strip")]
    Overview {
        file: PathBuf,
        #[arg(long)]
        width: Option<usize>,
        #[arg(long)]
        height: Option<usize>,
    },
    #[command(about = "List spans flat, for scripting")]
    Spans { file: PathBuf },
}

fn main() -> anyhow::Result<()> {
    telemetry::init_cli_tracing();
    let cli = Cli::parse();
    let cfg = Config::load().context("load config")?;

    match cli.command {
        Commands::Rows {
            file,
            collapse,
            start_ns,
            end_ns,
            width,
        } => {
            let trace = load_trace(&file, &cfg)?;
            let viewport = resolve_viewport(&trace, start_ns, end_ns)?;
            let collapsed = parse_collapse(&collapse)?;
            let rows = visible_rows(&trace, &collapsed);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::rows_payload(&trace, &rows, &viewport))?
                );
            } else {
                print!(
                    "{}",
                    output::render_rows(&trace, &rows, &viewport, width.unwrap_or(cfg.row_width))
                );
            }
            Ok(())
        }
        Commands::Overview {
            file,
            width,
            height,
        } => {
            let trace = load_trace(&file, &cfg)?;
            let width = width.unwrap_or(cfg.overview_width);
            let height = height.unwrap_or(cfg.overview_height);
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::overview_payload(&trace, width, height))?
                );
            } else {
                print!("{}", output::render_overview(&trace, width, height));
            }
            Ok(())
        }
        Commands::Spans { file } => {
            let trace = load_trace(&file, &cfg)?;
            let rows = visible_rows(&trace, &HashSet::new());
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::spans_payload(&trace, &rows))?
                );
            } else {
                print!("{}", output::render_spans(&trace, &rows));
            }
            Ok(())
        }
    }
}

fn load_trace(file: &Path, cfg: &Config) -> anyhow::Result<Trace> {
    let raw = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
    let response: TraceResponse =
        serde_json::from_str(&raw).context("parse trace payload")?;
    let trace = gantry_wire::build_trace(&response, &cfg.palette)?;
    tracing::debug!(spans = trace.span_count(), file = %file.display(), "loaded trace");
    Ok(trace)
}

fn resolve_viewport(
    trace: &Trace,
    start_ns: Option<u64>,
    end_ns: Option<u64>,
) -> anyhow::Result<Viewport> {
    let full = Viewport::full(trace)?;
    if start_ns.is_none() && end_ns.is_none() {
        return Ok(full);
    }
    Ok(Viewport::new(
        start_ns.unwrap_or_else(|| full.start_time_unix_nano()),
        end_ns.unwrap_or_else(|| full.end_time_unix_nano()),
    )?)
}

fn parse_collapse(ids: &[String]) -> anyhow::Result<HashSet<SpanId>> {
    let mut collapsed = HashSet::new();
    for id in ids {
        collapsed.insert(SpanId::parse(id)?);
    }
    Ok(collapsed)
}
