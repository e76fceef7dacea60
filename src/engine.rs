//! SOCD resolution engine.
//!
//! Raw physical key state goes in, a conflict-free resolved state comes out.
//! Nothing here performs I/O or can fail.

pub mod resolve;
pub mod state;

pub use resolve::ResolutionEngine;
pub use state::{KeyStates, RawKeyState, Recency, StateSnapshot};
