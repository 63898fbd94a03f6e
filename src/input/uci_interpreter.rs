use itertools::Itertools;
use lazy_static::lazy_static;
use regex::Regex;

use super::protocol_interpreter::{EngineCommand, EngineReply, ProtocolInterpreter};

lazy_static! {
    static ref ID_NAME: Regex = Regex::new(r"id name\s+(\S.*)$").unwrap();
    static ref BEST_MOVE: Regex = Regex::new(r"bestmove\s+(\S+)(?:\s+ponder\s+(\S+))?").unwrap();
    // Stockfish derived engines append the point of view: `Total Evaluation: 0.25 (white side)`
    static ref TOTAL_EVALUATION: Regex = Regex::new(r"Total Evaluation:\s+([^\s(]+)").unwrap();
}

const TOTAL_EVALUATION_LABEL: &str = "Total Evaluation: ";

// Interpreter for the Universal Chess Interface protocol, plus the `eval` extension
pub struct UciInterpreter;

impl UciInterpreter {
    fn determine_option<'a>(mut args: impl Iterator<Item=&'a str>) -> Option<EngineCommand> {
        if args.next() != Some("name") {
            return None;
        }

        let mut name = Vec::new();
        for arg in args.by_ref() {
            if arg == "value" {
                break;
            }
            name.push(arg);
        }

        Some(EngineCommand::SetOption {
            name: name.join(" "),
            value: args.join(" "),
        })
    }

    fn determine_position<'a>(mut args: impl Iterator<Item=&'a str>) -> Option<EngineCommand> {
        match args.next() {
            Some("fen") => Some(EngineCommand::PositionFen(args.join(" "))),
            _ => None,  // only FEN positions are ever sent
        }
    }

    fn determine_go<'a>(mut args: impl Iterator<Item=&'a str>) -> Option<EngineCommand> {
        match args.next() {
            Some("movetime") => args.next()?.parse::<u64>().ok().map(EngineCommand::GoMoveTime),
            _ => None,
        }
    }

    fn determine_score(line: &str) -> Option<f64> {
        let captures = TOTAL_EVALUATION.captures(line)?;

        captures[1]
            .parse::<f64>()
            .ok()
            .filter(|score| score.is_finite())
    }
}

impl ProtocolInterpreter for UciInterpreter {
    fn command_to_line(command: &EngineCommand) -> String {
        match command {
            EngineCommand::Uci => "uci".to_string(),
            EngineCommand::SetOption { name, value } => format!("setoption name {name} value {value}"),
            EngineCommand::IsReady => "isready".to_string(),
            EngineCommand::UciNewGame => "ucinewgame".to_string(),
            EngineCommand::PositionFen(fen) => format!("position fen {fen}"),
            EngineCommand::GoMoveTime(millis) => format!("go movetime {millis}"),
            EngineCommand::Eval => "eval".to_string(),
            EngineCommand::Quit => "quit".to_string(),
        }
    }

    fn line_to_command(line: &str) -> Option<EngineCommand> {
        let mut split = line.split_whitespace();

        let command_word = split.next()?;

        match command_word {
            "uci" => Some(EngineCommand::Uci),
            "setoption" => UciInterpreter::determine_option(split),
            "isready" => Some(EngineCommand::IsReady),
            "ucinewgame" => Some(EngineCommand::UciNewGame),
            "position" => UciInterpreter::determine_position(split),
            "go" => UciInterpreter::determine_go(split),
            "eval" => Some(EngineCommand::Eval),
            "quit" => Some(EngineCommand::Quit),
            _ => None,
        }
    }

    fn line_to_reply(line: &str) -> Option<EngineReply> {
        if let Some(captures) = BEST_MOVE.captures(line) {
            return Some(EngineReply::BestMove {
                mv: captures[1].to_string(),
                ponder: captures.get(2).map(|x| x.as_str().to_string()),
            });
        }

        if line.contains(TOTAL_EVALUATION_LABEL) {
            return Some(EngineReply::TotalEvaluation(UciInterpreter::determine_score(line)));
        }

        if let Some(captures) = ID_NAME.captures(line) {
            return Some(EngineReply::Id {
                name: captures[1].split_whitespace().join(" "),
            });
        }

        if line.contains("uciok") {
            return Some(EngineReply::UciOk);
        }

        if line.contains("readyok") {
            return Some(EngineReply::ReadyOk);
        }

        None
    }
}

#[test]
fn check_id_name() {
    let expected = Some(EngineReply::Id { name: "Brainfish 250418 64 POPCNT".to_string() });

    assert_eq!(UciInterpreter::line_to_reply("id name Brainfish 250418  64 POPCNT"), expected);
}

#[test]
fn check_id_author_is_noise() {
    assert_eq!(UciInterpreter::line_to_reply("id author T. Romstad, M. Costalba"), None);
    assert_eq!(UciInterpreter::line_to_reply("option name Threads type spin default 1 min 1 max 512"), None);
}

#[test]
fn check_handshake_tokens() {
    assert_eq!(UciInterpreter::line_to_reply("uciok"), Some(EngineReply::UciOk));
    assert_eq!(UciInterpreter::line_to_reply("readyok\r"), Some(EngineReply::ReadyOk));
}

#[test]
fn check_bestmove() {
    let expected = Some(EngineReply::BestMove { mv: "e2e4".to_string(), ponder: None });
    assert_eq!(UciInterpreter::line_to_reply("bestmove e2e4"), expected);

    let expected = Some(EngineReply::BestMove {
        mv: "g1f3".to_string(),
        ponder: Some("d7d5".to_string()),
    });
    assert_eq!(UciInterpreter::line_to_reply("bestmove g1f3 ponder d7d5"), expected);
}

#[test]
fn check_info_line_is_not_bestmove() {
    assert_eq!(UciInterpreter::line_to_reply("info depth 12 score cp 31 pv e2e4 e7e5"), None);
}

#[test]
fn check_total_evaluation() {
    let reply = UciInterpreter::line_to_reply("Total Evaluation: +0.25 (white side)");
    assert_eq!(reply, Some(EngineReply::TotalEvaluation(Some(0.25))));

    let reply = UciInterpreter::line_to_reply("Total Evaluation: -1.07(white side)");
    assert_eq!(reply, Some(EngineReply::TotalEvaluation(Some(-1.07))));
}

#[test]
fn check_total_evaluation_without_number() {
    let reply = UciInterpreter::line_to_reply("Total Evaluation: none (in check)");
    assert_eq!(reply, Some(EngineReply::TotalEvaluation(None)));
}

#[test]
fn check_commands_to_lines() {
    assert_eq!(UciInterpreter::command_to_line(&EngineCommand::set_option("Threads", 1)), "setoption name Threads value 1");
    assert_eq!(UciInterpreter::command_to_line(&EngineCommand::GoMoveTime(200)), "go movetime 200");

    let fen = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq - 0 1";
    assert_eq!(UciInterpreter::command_to_line(&EngineCommand::PositionFen(fen.to_string())), format!("position fen {fen}"));
}

#[test]
fn check_setoption_command() {
    let expected = Some(EngineCommand::set_option("BookPath", "Cerebellum_Light.bin"));
    assert_eq!(UciInterpreter::line_to_command("setoption name BookPath value Cerebellum_Light.bin"), expected);

    let expected = Some(EngineCommand::set_option("Move Overhead", "10"));
    assert_eq!(UciInterpreter::line_to_command("setoption name Move Overhead value 10"), expected);
}

#[test]
fn check_position_fen_command() {
    let fen = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";
    let expected = Some(EngineCommand::PositionFen(fen.to_string()));

    assert_eq!(UciInterpreter::line_to_command(&format!("position fen {fen}\n")), expected);
    assert_eq!(UciInterpreter::line_to_command("position startpos"), None);
}

#[test]
fn check_go_movetime() {
    assert_eq!(UciInterpreter::line_to_command("go movetime 2000"), Some(EngineCommand::GoMoveTime(2000)));
    assert_eq!(UciInterpreter::line_to_command("go movetime -1"), None);
    assert_eq!(UciInterpreter::line_to_command("go infinite"), None);
}
