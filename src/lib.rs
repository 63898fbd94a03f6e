//! Annotates PGN games with the help of an external UCI engine.
//!
//! Every query spawns its own engine process, talks to it over the line
//! protocol in [`input`], and tears it down again ([`engine`]). The
//! [`analysis`] module walks the games and writes the annotated PGN.

pub mod input;
pub mod engine;
pub mod analysis;

#[cfg(test)]
mod tests;
