//! Command-line adapter over the transaction store.

mod commands;
pub mod io;
pub mod output;

pub use commands::{run, run_cli};
