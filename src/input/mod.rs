//! The wire layer: what goes over the engine's pipes, and what comes back.

pub mod protocol_interpreter;
pub mod uci_interpreter;
pub mod listener;
