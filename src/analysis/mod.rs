//! Reading games, annotating them move by move, and writing them back out.

pub mod args;
pub mod game_record;
pub mod movetext;
pub mod analyzer;
pub mod annotation;
