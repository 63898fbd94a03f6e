use std::io;
use std::io::Write;

use shakmaty::Color;

use crate::engine::score::StaticEval;

// Moves per output line, by what the moves carry
pub const MOVES_PER_LINE_WITH_BOOK: u32 = 2;
pub const MOVES_PER_LINE_WITH_EVAL: u32 = 4;
pub const MOVES_PER_LINE: u32 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct BookVariation {
    pub san: String,
    pub comment: String,
}

/// Everything written for one move of a game.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationRecord {
    pub move_number: u32,
    pub side: Color,
    pub san: String,
    pub eval: Option<StaticEval>,
    pub book: Option<BookVariation>,
}

/// Counts the moves written on the current output line.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct LineCounter {
    written: u32,
}

impl LineCounter {
    pub fn written(&self) -> u32 {
        self.written
    }
}

impl AnnotationRecord {
    fn number_prefix(&self) -> String {
        match self.side {
            Color::White => format!("{}. ", self.move_number),
            Color::Black => format!("{}... ", self.move_number),
        }
    }

    fn moves_per_line(&self) -> u32 {
        match (&self.book, &self.eval) {
            (Some(_), _) => MOVES_PER_LINE_WITH_BOOK,
            (None, Some(_)) => MOVES_PER_LINE_WITH_EVAL,
            (None, None) => MOVES_PER_LINE,
        }
    }

    /// The movetext for this move. Lines only ever break after a black move.
    pub fn render(&self, line: &mut LineCounter) -> String {
        let mut text = String::new();

        if self.side == Color::White || self.book.is_some() {
            text.push_str(&self.number_prefix());
        }
        text.push_str(&self.san);
        text.push(' ');

        if let Some(eval) = self.eval {
            text.push_str(&format!("{{{eval}}} "));
        }

        if let Some(book) = &self.book {
            text.push_str(&format!("({}{} {{{}}}) ", self.number_prefix(), book.san, book.comment));
        }

        line.written += 1;
        if self.side == Color::Black && line.written >= self.moves_per_line() {
            line.written = 0;
            text.push('\n');
        }

        text
    }
}

fn escape_tag_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// The tag section, the annotator tag and the blank line separating it from the moves.
pub fn write_tags<W: Write>(output: &mut W, tags: &[(String, String)], annotator: &str) -> io::Result<()> {
    for (key, value) in tags {
        writeln!(output, "[{} \"{}\"]", key, escape_tag_value(value))?;
    }
    writeln!(output, "[Annotator \"{}\"]", escape_tag_value(annotator))?;
    writeln!(output)
}

/// The termination marker, and the blank line before the next game.
pub fn write_result<W: Write>(output: &mut W, marker: &str) -> io::Result<()> {
    write!(output, "{marker}\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(move_number: u32, side: Color, san: &str) -> AnnotationRecord {
        AnnotationRecord {
            move_number,
            side,
            san: san.to_string(),
            eval: None,
            book: None,
        }
    }

    fn book(san: &str) -> Option<BookVariation> {
        Some(BookVariation {
            san: san.to_string(),
            comment: "cerebellum book".to_string(),
        })
    }

    #[test]
    fn white_moves_are_numbered_black_moves_are_not() {
        let mut line = LineCounter::default();

        assert_eq!(record(1, Color::White, "e4").render(&mut line), "1. e4 ");
        assert_eq!(record(1, Color::Black, "e5").render(&mut line), "e5 ");
        assert_eq!(line.written(), 2);
    }

    #[test]
    fn evaluation_follows_the_move() {
        let mut line = LineCounter::default();

        let white = AnnotationRecord { eval: Some(StaticEval::new(0.25)), ..record(1, Color::White, "e4") };
        assert_eq!(white.render(&mut line), "1. e4 {+0.25} ");

        let black = AnnotationRecord { eval: Some(StaticEval::new(-0.5)), ..record(1, Color::Black, "c5") };
        assert_eq!(black.render(&mut line), "c5 {-0.50} ");
    }

    #[test]
    fn book_variation_numbers_both_sides() {
        let mut line = LineCounter::default();

        let white = AnnotationRecord {
            eval: Some(StaticEval::new(0.25)),
            book: book("d4"),
            ..record(1, Color::White, "e4")
        };
        assert_eq!(white.render(&mut line), "1. e4 {+0.25} (1. d4 {cerebellum book}) ");

        let black = AnnotationRecord { book: book("e5"), ..record(1, Color::Black, "c5") };
        assert_eq!(black.render(&mut line), "1... c5 (1... e5 {cerebellum book}) \n");
    }

    #[test]
    fn plain_moves_wrap_after_ten() {
        let mut line = LineCounter::default();
        let mut text = String::new();

        for number in 1..=6 {
            text.push_str(&record(number, Color::White, "Nf3").render(&mut line));
            text.push_str(&record(number, Color::Black, "Nf6").render(&mut line));
        }

        let lines: Vec<&str> = text.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split_whitespace().filter(|token| *token == "Nf3" || *token == "Nf6").count(), 10);
        assert!(lines[1].starts_with("6. Nf3"));
    }

    #[test]
    fn evaluated_moves_wrap_after_four() {
        let mut line = LineCounter::default();
        let mut text = String::new();

        for number in 1..=3 {
            let white = AnnotationRecord { eval: Some(StaticEval::new(0.1)), ..record(number, Color::White, "Nf3") };
            let black = AnnotationRecord { eval: Some(StaticEval::new(0.1)), ..record(number, Color::Black, "Nf6") };
            text.push_str(&white.render(&mut line));
            text.push_str(&black.render(&mut line));
        }

        assert_eq!(text, "1. Nf3 {+0.10} Nf6 {+0.10} 2. Nf3 {+0.10} Nf6 {+0.10} \n3. Nf3 {+0.10} Nf6 {+0.10} ");
        assert_eq!(line.written(), 2);
    }

    #[test]
    fn white_moves_never_break_the_line() {
        let mut line = LineCounter::default();

        for number in 1..=12 {
            let text = record(number, Color::White, "Kf1").render(&mut line);
            assert!(!text.ends_with('\n'));
        }
    }

    #[test]
    fn writes_tags_and_annotator() {
        let mut output = Vec::new();
        let tags = vec![
            ("Event".to_string(), "Say \"hi\"".to_string()),
            ("Site".to_string(), "?".to_string()),
        ];

        write_tags(&mut output, &tags, "Brainfish 250418").unwrap();
        write_result(&mut output, "1-0").unwrap();

        let text = String::from_utf8(output).unwrap();
        assert_eq!(text, "[Event \"Say \\\"hi\\\"\"]\n[Site \"?\"]\n[Annotator \"Brainfish 250418\"]\n\n1-0\n\n");
    }
}
