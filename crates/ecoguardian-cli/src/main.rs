//! EcoGuardian - memory bank inspector
//!
//! The `ecoguardian` command reads and maintains exported memory bank files.
//!
//! ## Commands
//!
//! - `stats`: Show occupancy and access statistics
//! - `search`: Find entries whose key or value contains a string
//! - `context`: List entries carrying every given context tag
//! - `recent`: List entries written within a time window
//! - `get`: Print one entry and its metadata
//! - `compact`: Evict the lowest-scoring entries and save the result
//! - `delete`: Remove one entry and save the result

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{info, Level};

use ecoguardian_core::memory::{Context, EntrySnapshot};
use ecoguardian_core::{MemoryBank, MemoryBankConfig, MemoryStatistics, METRICS};

/// Longest value preview printed in text listings.
const PREVIEW_CHARS: usize = 80;

#[derive(Parser)]
#[command(name = "ecoguardian")]
#[command(author = "EcoGuardian Contributors")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and maintain EcoGuardian memory bank exports", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Format for command results
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Exported memory bank file
    #[arg(
        short,
        long,
        global = true,
        env = "ECOGUARDIAN_MEMORY_FILE",
        default_value = "memory_bank.json"
    )]
    file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show occupancy and access statistics
    Stats,

    /// Find entries whose key or value contains a string (case-insensitive)
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List entries carrying every given context tag
    Context {
        /// Context tag as key=value (repeatable)
        #[arg(short, long = "tag", value_parser = parse_tag, required = true)]
        tags: Vec<(String, String)>,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// List entries written within the last N hours, newest first
    Recent {
        /// Window size in hours
        #[arg(long, default_value = "24")]
        hours: u64,

        /// Maximum number of results
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Print one entry and its metadata (does not count as an access)
    Get { key: String },

    /// Evict the lowest-scoring entries and save the result
    Compact {
        /// Fraction of entries to remove (default: configured target)
        #[arg(short, long)]
        target: Option<f64>,

        /// Write the compacted bank here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Remove one entry and save the result
    Delete {
        key: String,

        /// Write the bank here instead of overwriting the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    ecoguardian_core::init_tracing(cli.json, level);

    let mut bank = load_bank(&cli.file)?;
    let mut out = std::io::stdout().lock();
    let format = cli.format;

    let result = match cli.command {
        Commands::Stats => cmd_stats(&bank, format, &mut out),
        Commands::Search { query, limit } => cmd_search(&bank, &query, limit, format, &mut out),
        Commands::Context { tags, limit } => cmd_context(&bank, tags, limit, format, &mut out),
        Commands::Recent { hours, limit } => cmd_recent(&bank, hours, limit, format, &mut out),
        Commands::Get { key } => cmd_get(&bank, &key, format, &mut out),
        Commands::Compact { target, output } => {
            let dest = output.unwrap_or_else(|| cli.file.clone());
            cmd_compact(&mut bank, target, &dest, format, &mut out)
        }
        Commands::Delete { key, output } => {
            let dest = output.unwrap_or_else(|| cli.file.clone());
            cmd_delete(&mut bank, &key, &dest, &mut out)
        }
    };

    METRICS.flush();
    result
}

/// Load an export into a bank configured from `ECOGUARDIAN_*` variables.
fn load_bank(path: &Path) -> Result<MemoryBank> {
    let config = MemoryBankConfig::from_env().context("Invalid memory bank configuration")?;
    let mut bank = MemoryBank::new(config)?;
    bank.import(path, false)
        .with_context(|| format!("Failed to load memory file: {}", path.display()))?;
    info!(path = %path.display(), entries = bank.len(), "memory file loaded");
    Ok(bank)
}

fn parse_tag(raw: &str) -> std::result::Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

fn preview(value: &serde_json::Value) -> String {
    let text = value.to_string();
    if text.chars().count() <= PREVIEW_CHARS {
        return text;
    }
    let cut: String = text.chars().take(PREVIEW_CHARS - 3).collect();
    format!("{cut}...")
}

fn write_snapshots(out: &mut dyn Write, snapshots: &[EntrySnapshot]) -> Result<()> {
    if snapshots.is_empty() {
        writeln!(out, "No matching entries")?;
        return Ok(());
    }
    for snap in snapshots {
        writeln!(
            out,
            "{}  [{}]  {}",
            snap.key,
            snap.metadata.timestamp.format("%Y-%m-%d %H:%M:%S"),
            preview(&snap.value)
        )?;
    }
    Ok(())
}

fn render_stats(stats: &MemoryStatistics) -> String {
    let mut text = format!(
        "Entries:        {} / {} ({:.2}%)\n\
         Size:           {} bytes\n\
         Context slots:  {}\n\
         Total accesses: {}\n\
         Compactions:    {}",
        stats.total_entries,
        stats.max_capacity,
        stats.utilization_percent,
        stats.total_size_bytes,
        stats.context_indices,
        stats.total_accesses,
        stats.compaction_events,
    );
    if !stats.most_accessed_entries.is_empty() {
        text.push_str("\nMost accessed:");
        for entry in &stats.most_accessed_entries {
            text.push_str(&format!("\n  {} ({})", entry.key, entry.access_count));
        }
    }
    text
}

fn cmd_stats(bank: &MemoryBank, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let stats = bank.get_statistics();
    match format {
        OutputFormat::Json => write_json(out, &stats),
        OutputFormat::Text => {
            writeln!(out, "{}", render_stats(&stats))?;
            Ok(())
        }
    }
}

fn cmd_search(
    bank: &MemoryBank,
    query: &str,
    limit: usize,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let hits = bank.search(query, limit);
    if format == OutputFormat::Json {
        return write_json(out, &hits);
    }

    if hits.is_empty() {
        writeln!(out, "No entries match '{query}'")?;
    }
    for hit in &hits {
        writeln!(
            out,
            "{} ({} match)  {}",
            hit.key,
            hit.match_type,
            preview(&hit.value)
        )?;
    }
    Ok(())
}

fn cmd_context(
    bank: &MemoryBank,
    tags: Vec<(String, String)>,
    limit: usize,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let query: Context = tags.into_iter().collect();
    let results = bank.retrieve_by_context(&query, limit);
    match format {
        OutputFormat::Json => write_json(out, &results),
        OutputFormat::Text => write_snapshots(out, &results),
    }
}

fn cmd_recent(
    bank: &MemoryBank,
    hours: u64,
    limit: usize,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let results = bank.retrieve_recent(hours, limit);
    match format {
        OutputFormat::Json => write_json(out, &results),
        OutputFormat::Text => write_snapshots(out, &results),
    }
}

fn cmd_get(bank: &MemoryBank, key: &str, format: OutputFormat, out: &mut dyn Write) -> Result<()> {
    let (Some(value), Some(metadata)) = (bank.peek(key), bank.metadata(key)) else {
        bail!("No entry with key '{key}'");
    };

    match format {
        OutputFormat::Json => write_json(
            out,
            &serde_json::json!({ "key": key, "value": value, "metadata": metadata }),
        ),
        OutputFormat::Text => {
            writeln!(out, "{key}")?;
            writeln!(out, "Stored:   {}", metadata.timestamp.to_rfc3339())?;
            if let Some(category) = &metadata.category {
                writeln!(out, "Category: {category}")?;
            }
            for (tag, tag_value) in &metadata.context {
                writeln!(out, "Tag:      {tag}={tag_value}")?;
            }
            writeln!(out, "Accesses: {}", metadata.access_count)?;
            writeln!(out, "Size:     {} bytes", metadata.size)?;
            writeln!(out)?;
            writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
            Ok(())
        }
    }
}

fn cmd_compact(
    bank: &mut MemoryBank,
    target: Option<f64>,
    dest: &Path,
    format: OutputFormat,
    out: &mut dyn Write,
) -> Result<()> {
    let target = target.unwrap_or(bank.config().compaction_target_reduction);
    if !(target > 0.0 && target <= 1.0) {
        bail!("--target must be in (0, 1], got {target}");
    }

    let Some(event) = bank.compact(target) else {
        writeln!(out, "Memory bank is empty; nothing to compact")?;
        return Ok(());
    };
    bank.export(dest)
        .with_context(|| format!("Failed to write memory file: {}", dest.display()))?;

    match format {
        OutputFormat::Json => write_json(out, &event),
        OutputFormat::Text => {
            writeln!(
                out,
                "Removed {} of {} entries ({:.2}%), {} remain",
                event.entries_removed, event.before_size, event.reduction_percent, event.after_size
            )?;
            writeln!(out, "Saved to {}", dest.display())?;
            Ok(())
        }
    }
}

fn cmd_delete(bank: &mut MemoryBank, key: &str, dest: &Path, out: &mut dyn Write) -> Result<()> {
    if !bank.delete(key) {
        bail!("No entry with key '{key}'");
    }
    bank.export(dest)
        .with_context(|| format!("Failed to write memory file: {}", dest.display()))?;
    writeln!(out, "Deleted '{key}'; saved to {}", dest.display())?;
    Ok(())
}
