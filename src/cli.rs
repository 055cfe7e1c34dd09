use crate::config::{Config, load_config};
use crate::ir::{NodeDocument, load_nodes, parse_nodes};
use crate::layout::text::indent;
use crate::layout::{
    ExpandedSet, HierarchyIndex, Layout, TimelineData, compute_layout_with_index, range_caption,
};
use crate::layout_dump::write_layout_json;
use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "tasktree",
    version,
    about = "Resolve a ticket hierarchy and lay it out on a timeline"
)]
pub struct Args {
    /// Nodes file (JSON array, or {"nodes": [...], "expanded": [...]}); '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "json")]
    pub output_format: OutputFormat,

    /// Config file (JSON or JSON5)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Expand a node (repeatable); merged with the document's expanded ids
    #[arg(short = 'x', long = "expand")]
    pub expand: Vec<String>,

    /// Expand every node that has children
    #[arg(long = "expandAll")]
    pub expand_all: bool,

    /// Date used in place of today for missing start dates
    #[arg(long = "referenceDate")]
    pub reference_date: Option<NaiveDate>,

    /// Duration in days substituted for missing due dates
    #[arg(long = "defaultDuration")]
    pub default_duration: Option<u32>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Outline,
}

pub fn run() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let document = read_input(args.input.as_deref())?;
    let index = HierarchyIndex::new(&document.nodes, config.layout.sibling_order);
    let expanded = resolve_expanded(&args, &document, &index);

    let layout = compute_layout_with_index(&index, &expanded, &config.layout);
    tracing::info!(
        nodes = document.nodes.len(),
        visible = layout.rows.len(),
        issues = layout.issues.len(),
        "computed layout"
    );

    match args.output.as_deref() {
        Some(path) => {
            let mut writer = BufWriter::new(File::create(path)?);
            write_output(&mut writer, &layout, args.output_format)?;
            writer.flush()?;
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            write_output(&mut writer, &layout, args.output_format)?;
            writer.flush()?;
        }
    }
    Ok(())
}

fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(date) = args.reference_date {
        config.layout.reference_date = Some(date);
    }
    if let Some(days) = args.default_duration {
        config.layout.default_duration_days = days;
    }
    Ok(config)
}

fn resolve_expanded(
    args: &Args,
    document: &NodeDocument,
    index: &HierarchyIndex<'_>,
) -> ExpandedSet {
    let mut expanded: ExpandedSet = document
        .expanded
        .iter()
        .chain(args.expand.iter())
        .cloned()
        .collect();
    if args.expand_all {
        expanded.extend(index.expandable_ids());
    }
    expanded
}

fn read_input(path: Option<&Path>) -> Result<NodeDocument> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return load_nodes(path);
        }
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    parse_nodes(&buf)
}

fn write_output<W: Write>(writer: &mut W, layout: &Layout, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            write_layout_json(&mut *writer, layout)?;
            writeln!(writer)?;
        }
        OutputFormat::Outline => writer.write_all(render_outline(layout).as_bytes())?,
    }
    Ok(())
}

fn status_marker(layout_row: &crate::layout::RowLayout) -> &'static str {
    match (layout_row.has_children, layout_row.expanded) {
        (true, true) => "▼",
        (true, false) => "▶",
        (false, _) => " ",
    }
}

/// Plain-text view: summary line, tree rows with date captions, then the
/// timeline bars as percentages of the span.
pub fn render_outline(layout: &Layout) -> String {
    let mut out = String::new();
    let summary = &layout.summary;
    let _ = writeln!(
        out,
        "Tickets: {}  Epics: {}  Done: {}  In Progress: {}",
        summary.total, summary.epics, summary.done, summary.in_progress
    );
    for issue in &layout.issues {
        let _ = writeln!(out, "! {issue}");
    }
    out.push('\n');

    for row in &layout.rows {
        let pad = indent(row.level);
        let rag = row.rag.map(|rag| format!(" [{}]", rag.label())).unwrap_or_default();
        let _ = writeln!(
            out,
            "{pad}{} {} | {} ({}){rag}",
            status_marker(row),
            row.id,
            row.label,
            row.status.label()
        );
        let _ = writeln!(
            out,
            "{pad}    {} → {}",
            crate::layout::format_date(row.start_date),
            crate::layout::format_date(row.due_date)
        );
    }
    out.push('\n');

    match &layout.timeline {
        TimelineData::Gantt(gantt) => {
            let _ = writeln!(
                out,
                "Timeline {} → {} ({} days)",
                gantt.span.start,
                gantt.span.end,
                gantt.span.duration_days()
            );
            for bar in &gantt.bars {
                let _ = writeln!(
                    out,
                    "{}{} left {:.1}% width {:.1}%  {}",
                    indent(bar.level),
                    bar.id,
                    bar.geometry.offset_fraction * 100.0,
                    bar.geometry.width_fraction * 100.0,
                    range_caption(&bar.range)
                );
            }
        }
        TimelineData::Empty => out.push_str("No valid dates found for Gantt chart.\n"),
    }
    out
}
