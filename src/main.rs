use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::BufReader;
use std::path::PathBuf;

use versepack::build::{build_from_reader, write_file};
use versepack::parser;
use versepack::text::tokenize;

#[derive(Parser)]
#[command(name = "versepack")]
#[command(about = "Binary archive builder for book/chapter/verse text corpora")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a binary archive from canonical text
    Build {
        /// Canonical text input file
        input: PathBuf,

        /// Output archive path
        #[arg(short, long)]
        output: PathBuf,

        /// Extra-markup blob to embed verbatim
        #[arg(short, long)]
        markup: Option<PathBuf>,

        /// Print build statistics after writing
        #[arg(long)]
        stats: bool,

        /// Emit build statistics as JSON instead of a text report
        #[arg(long)]
        json: bool,

        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
    },
    /// Parse and validate canonical text without writing an archive
    Check {
        /// Canonical text input file
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            output,
            markup,
            stats,
            json,
            quiet,
        } => build(input, output, markup, stats, json, quiet),
        Commands::Check { input } => check(input),
    }
}

fn build(
    input: PathBuf,
    output: PathBuf,
    markup: Option<PathBuf>,
    stats: bool,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let markup_bytes = match markup {
        Some(path) => fs::read(&path)
            .with_context(|| format!("failed to read markup file {}", path.display()))?,
        None => Vec::new(),
    };

    let spinner = if quiet {
        None
    } else {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap(),
        );
        spinner.set_message(format!("Building {}...", input.display()));
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Some(spinner)
    };

    let file = fs::File::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let out = build_from_reader(BufReader::new(file), &markup_bytes)
        .with_context(|| format!("build failed for {}", input.display()))?;

    write_file(&output, &out.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;

    if let Some(spinner) = spinner {
        spinner.finish_with_message(format!(
            "Wrote {} ({} bytes)",
            output.display(),
            out.bytes.len()
        ));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&out.stats)?);
    } else if stats {
        out.stats.print();
    }
    Ok(())
}

fn check(input: PathBuf) -> Result<()> {
    let file = fs::File::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?;
    let doc = parser::Parser::new()
        .parse(BufReader::new(file))
        .with_context(|| format!("validation failed for {}", input.display()))?;

    let mut tokens = 0usize;
    let mut words = 0usize;
    for id in doc.walk_units() {
        for tok in tokenize(&doc.unit(id).text) {
            tokens += 1;
            if tok.is_word {
                words += 1;
            }
        }
    }

    println!("OK: {}", input.display());
    println!("  Books:    {}", doc.books().count());
    println!("  Chapters: {}", doc.chapter_count());
    println!("  Verses:   {}", doc.verse_count());
    println!("  Units:    {}", doc.unit_count());
    println!("  Tokens:   {tokens} ({words} words)");
    Ok(())
}
