use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use banfinator::creator::{CreatorMetadata, CreatorSource, Session, Side};
use banfinator::exif::NomExifSource;
use banfinator::pipeline::{self, ExportOutcome};
use banfinator::{compose, config};

#[derive(Parser, Debug)]
#[command(
    name = "banfinator",
    version,
    about = "Combine two JPEGs side by side and carry both photographers' IPTC credits into the result"
)]
struct Cli {
    /// Left image
    #[arg(value_name = "LEFT", required_unless_present = "init")]
    left: Option<PathBuf>,

    /// Right image
    #[arg(value_name = "RIGHT", required_unless_present = "init")]
    right: Option<PathBuf>,

    /// Output file (default: export.file_name from the config)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Use this caption instead of the merged creators
    #[arg(long, value_name = "TEXT")]
    caption: Option<String>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Print the extracted creators and merged caption, then exit
    #[arg(long)]
    show: bool,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Write the combined image without IPTC metadata
    #[arg(long = "no-metadata")]
    no_metadata: bool,

    /// Swap the left and right images after loading
    #[arg(long)]
    swap: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    let (Some(mut left), Some(mut right)) = (cli.left.clone(), cli.right.clone()) else {
        anyhow::bail!("Two input images are required. Use --help for usage.");
    };

    // Reject non-JPEG input before touching the files
    pipeline::accept_path(&left)?;
    pipeline::accept_path(&right)?;

    let config = config::Config::load(cli.config.as_deref())?;

    // Extract both creators
    let mut session = Session::new(config.caption_policy);
    pipeline::load_sides(
        &mut session,
        left.clone(),
        right.clone(),
        Arc::new(NomExifSource),
        config.exif_fallback,
    )
    .await?;

    if cli.swap {
        session.swap();
        std::mem::swap(&mut left, &mut right);
        log::info!("Swapped images, caption now {:?}", session.caption());
    }

    if let Some(ref caption) = cli.caption {
        session.set_caption(caption.clone());
    }

    // Handle --show
    if cli.show {
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&session_json(&session))?);
        } else {
            print_session(&session, [left.as_path(), right.as_path()]);
        }
        return Ok(());
    }

    // Compose
    let left_bytes = pipeline::read_bytes(&left)
        .await
        .with_context(|| format!("Failed to read {}", left.display()))?;
    let right_bytes = pipeline::read_bytes(&right)
        .await
        .with_context(|| format!("Failed to read {}", right.display()))?;
    let canvas = config.canvas;
    let quality = config.export.jpeg_quality;
    let composed = tokio::task::spawn_blocking(move || {
        compose::compose_side_by_side(&left_bytes, &right_bytes, &canvas, quality)
    })
    .await
    .context("Compositor task failed")??;

    // Embed
    let outcome = if config.export.embed_metadata && !cli.no_metadata {
        pipeline::embed_caption(composed, session.caption())
    } else {
        log::info!("Metadata embedding disabled");
        ExportOutcome {
            bytes: composed,
            embedded: false,
            truncation: None,
        }
    };
    if let Some(t) = outcome.truncation {
        log::warn!(
            "Caption truncated from {} to {} bytes",
            t.original_len,
            t.kept_len
        );
    }

    // Write
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.export.file_name));
    pipeline::write_output(&output, &outcome.bytes).await?;

    if cli.json {
        let mut summary = session_json(&session);
        summary["output"] = serde_json::json!(output.display().to_string());
        summary["bytes"] = serde_json::json!(outcome.bytes.len());
        summary["embedded"] = serde_json::json!(outcome.embedded);
        summary["truncated"] = serde_json::json!(outcome.truncation.is_some());
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    log::info!("Done: {}", output.display());
    Ok(())
}

fn session_json(session: &Session) -> serde_json::Value {
    serde_json::json!({
        "left": session.creator(Side::Left),
        "right": session.creator(Side::Right),
        "merged": session.merged(),
        "caption": session.caption(),
        "caption_overridden": session.is_overridden(),
    })
}

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";

/// Max width for the value column before wrapping.
const VAL_WIDTH: usize = 46;
/// Indent for continuation lines (tag column width + " : " = 25 chars + 2 leading spaces).
const INDENT: &str = "                           ";

/// Print each side's creator and the resulting caption.
fn print_session(session: &Session, paths: [&Path; 2]) {
    for (side, path) in Side::BOTH.into_iter().zip(paths) {
        println!();
        println!("{BOLD}{side}:{RESET} {}", path.display());
        println!("  {DIM}{}{RESET}", "─".repeat(70));
        match session.creator(side) {
            Some(m) if !m.is_empty() => print_creator(m),
            _ => println!("  {DIM}(no creator metadata found){RESET}"),
        }
    }

    println!();
    println!("{BOLD}Caption{RESET}");
    println!("  {DIM}{}{RESET}", "─".repeat(70));
    print_row("Merged", &session.merged());
    if session.is_overridden() {
        print_row("Override", session.caption());
    }
    if !session.caption().is_empty() {
        let tag_col = format!("{:<22}", "Embedded as");
        println!("  {GREEN}{tag_col} : {}{RESET}", session.caption());
    }
    println!();
}

fn print_creator(m: &CreatorMetadata) {
    let source = match m.source {
        CreatorSource::Iptc => "IPTC By-line (2:80)",
        CreatorSource::ExifArtist => "EXIF Artist",
        CreatorSource::ExifCopyright => "EXIF Copyright",
        CreatorSource::None => "none",
    };
    print_row("Source", source);
    if m.raw_value != m.cleaned_value {
        print_row("Raw", &m.raw_value.escape_debug().to_string());
    }
    print_row("Creator", &m.cleaned_value);
}

/// Print a single row in the display table.
fn print_row(tag: &str, val: &str) {
    let tag_col = format!("{:<22}", tag);
    let lines = wrap_text(val, VAL_WIDTH);
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("  {tag_col} : {line}");
        } else {
            println!("  {INDENT}{line}");
        }
    }
}

/// Wrap text at spaces to fit within max_width characters.
///
/// The lines concatenate back to `s` exactly; runs of spaces are kept so the
/// display matches the embedded bytes.
fn wrap_text(s: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for piece in s.split_inclusive(' ') {
        let visible = piece.trim_end_matches(' ').chars().count();
        if current_width > 0 && current_width + visible > max_width {
            lines.push(std::mem::take(&mut current_line));
            current_width = 0;
        }
        current_line.push_str(piece);
        current_width += piece.chars().count();
    }

    if !current_line.is_empty() || lines.is_empty() {
        lines.push(current_line);
    }

    lines
}
