use std::fs;
use std::path::PathBuf;
use std::process::Command;

use uci_annotate::analysis::analyzer::UciAnalyzer;
use uci_annotate::analysis::annotation::{annotate, AnnotateOptions, AnnotationError, AnnotationWarning, BookMode};
use uci_annotate::engine::book::BookProbe;
use uci_annotate::engine::session::TimeoutPolicy;
use uci_annotate::engine::{EngineConfig, EngineError};

const ENGINE: &str = env!("CARGO_BIN_EXE_scripted_engine");
const SINGLE_MOVE: &str = "[Event \"?\"]\n[Site \"?\"]\n[Date \"????.??.??\"]\n[Round \"?\"]\n[White \"?\"]\n[Black \"?\"]\n[Result \"*\"]\n\n1. e4 *\n";

fn analyzer(args: &[&str]) -> UciAnalyzer {
    let config = EngineConfig::new(ENGINE).with_args(args.iter().copied());
    UciAnalyzer::new(config, BookProbe::default())
}

fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("uci_annotate-{}-{test}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn annotates_with_static_evaluation() -> anyhow::Result<()> {
    let mut analyzer = analyzer(&["--name", "Brainfish test", "--eval", "0.25"]);
    let options = AnnotateOptions {
        static_eval: true,
        ..AnnotateOptions::default()
    };

    let mut output = Vec::new();
    let summary = annotate(SINGLE_MOVE.as_bytes(), &mut output, &mut analyzer, &options)?;

    let output = String::from_utf8(output)?;
    assert!(output.ends_with("[Result \"*\"]\n[Annotator \"Brainfish test\"]\n\n1. e4 {+0.25} *\n\n"));
    assert_eq!(summary.moves, 1);

    Ok(())
}

#[test]
fn book_is_disabled_for_other_engines() -> anyhow::Result<()> {
    let mut analyzer = analyzer(&["--name", "Stockfish 16", "--eval", "0.25"]);
    let options = AnnotateOptions {
        book_mode: BookMode::Cerebellum,
        static_eval: true,
        ..AnnotateOptions::default()
    };

    let mut output = Vec::new();
    let summary = annotate(SINGLE_MOVE.as_bytes(), &mut output, &mut analyzer, &options)?;

    assert!(matches!(summary.warnings[0], AnnotationWarning::EngineIdentityMismatch { .. }));
    assert!(String::from_utf8(output)?.contains("1. e4 {+0.25} *"));

    Ok(())
}

#[test]
fn book_moves_from_a_real_process() -> anyhow::Result<()> {
    let mut analyzer = analyzer(&["--name", "Brainfish test", "--book-until", "1", "--think-ms", "150"]);
    let options = AnnotateOptions {
        book_mode: BookMode::Cerebellum,
        ..AnnotateOptions::default()
    };

    let mut output = Vec::new();
    let summary = annotate("1. e4 e5 2. Nf3 *\n".as_bytes(), &mut output, &mut analyzer, &options)?;

    let output = String::from_utf8(output)?;
    assert_eq!(summary.book_hits, 2);
    assert!(output.contains("{cerebellum book}) 1... e5 (1... "));
    assert!(output.contains("\n2. Nf3 *\n\n"));

    Ok(())
}

#[test]
fn silent_engine_aborts_before_the_result() {
    let mut analyzer = analyzer(&["--name", "Brainfish test", "--eval", "0.25", "--silent-ready"]);
    analyzer.config.handshake_timeout = TimeoutPolicy::from_millis(300);
    let options = AnnotateOptions {
        static_eval: true,
        ..AnnotateOptions::default()
    };

    let mut output = Vec::new();
    let result = annotate(SINGLE_MOVE.as_bytes(), &mut output, &mut analyzer, &options);

    assert!(matches!(result, Err(AnnotationError::Engine(EngineError::Timeout { .. }))));
    assert!(String::from_utf8_lossy(&output).ends_with("[Annotator \"Brainfish test\"]\n\n"));
}

#[test]
fn silent_engine_aborts_a_book_run_before_the_result() {
    let mut analyzer = analyzer(&["--name", "Brainfish 250418", "--silent-ready"]);
    analyzer.config.handshake_timeout = TimeoutPolicy::from_millis(300);
    let options = AnnotateOptions {
        book_mode: BookMode::Cerebellum,
        ..AnnotateOptions::default()
    };

    let mut output = Vec::new();
    let result = annotate(SINGLE_MOVE.as_bytes(), &mut output, &mut analyzer, &options);

    assert!(matches!(result, Err(AnnotationError::Engine(EngineError::Timeout { .. }))));
    assert!(String::from_utf8_lossy(&output).ends_with("[Annotator \"Brainfish 250418\"]\n\n"));
}

#[test]
fn command_line_writes_the_output_file() -> anyhow::Result<()> {
    let dir = scratch_dir("cli");
    let input = dir.join("src.pgn");
    let output = dir.join("out_src.pgn");
    fs::write(&input, SINGLE_MOVE)?;
    fs::write(&output, "stale output\n")?;

    let status = Command::new(env!("CARGO_BIN_EXE_uci_annotate"))
        .arg("--input").arg(&input)
        .arg("--output").arg(&output)
        .arg("--engine").arg(ENGINE)
        .arg("--engine-arg=--eval=-0.5")
        .arg("--static-eval")
        .arg("--book").arg("cerebellum")
        .arg("--book-path").arg(dir.join("missing.bin"))
        .status()?;
    assert!(status.success());

    let written = fs::read_to_string(&output)?;
    assert!(!written.contains("stale output"));
    assert!(written.contains("[Annotator \"Scripted Engine 1.0\"]\n\n1. e4 {-0.50} *\n\n"));

    Ok(())
}

#[test]
fn command_line_fails_without_input() -> anyhow::Result<()> {
    let dir = scratch_dir("no-input");

    let status = Command::new(env!("CARGO_BIN_EXE_uci_annotate"))
        .arg("--input").arg(dir.join("absent.pgn"))
        .arg("--output").arg(dir.join("out.pgn"))
        .arg("--engine").arg(ENGINE)
        .status()?;
    assert!(!status.success());
    assert!(!dir.join("out.pgn").exists());

    Ok(())
}
