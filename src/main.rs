use std::fs;
use std::fs::OpenOptions;
use std::io::{BufReader, BufWriter};

use anyhow::{bail, Context};
use clap::Parser;
use log::warn;

use uci_annotate::analysis::analyzer::UciAnalyzer;
use uci_annotate::analysis::annotation::{annotate, BookMode};
use uci_annotate::analysis::args::Args;

/// Annotates the games of a PGN file with a UCI engine, writing them to a new PGN file.

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    println!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    if !args.input.is_file() {
        bail!("input file {} was not found", args.input.display());
    }
    if !args.engine.is_file() {
        bail!("engine {} was not found", args.engine.display());
    }

    if args.output.exists() {
        fs::remove_file(&args.output)
            .with_context(|| format!("failed to remove old output {}", args.output.display()))?;
    }

    let mut options = args.annotate_options();
    if options.book_mode == BookMode::Cerebellum && !args.book_path.is_file() {
        warn!("book file {} was not found, {} book is disabled", args.book_path.display(), options.book_mode);
        options.book_mode = BookMode::Off;
    }

    let input = fs::File::open(&args.input)
        .with_context(|| format!("failed to open {}", args.input.display()))?;
    let output = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.output)
        .with_context(|| format!("failed to open {}", args.output.display()))?;

    let mut analyzer = UciAnalyzer::new(args.engine_config(), args.book_probe());
    let mut writer = BufWriter::new(output);

    let summary = annotate(BufReader::new(input), &mut writer, &mut analyzer, &options)
        .with_context(|| format!("annotating {} stopped", args.input.display()))?;

    println!(
        "Done! {} games ({} moves, {} book moves) annotated by {}, written to {}",
        summary.games, summary.moves, summary.book_hits, summary.engine_name, args.output.display(),
    );

    Ok(())
}
