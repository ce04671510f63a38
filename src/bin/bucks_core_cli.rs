use std::process;

use bucks_core::cli::{self, output};

fn main() {
    if let Err(err) = cli::run_cli() {
        output::error(err);
        process::exit(1);
    }
}
