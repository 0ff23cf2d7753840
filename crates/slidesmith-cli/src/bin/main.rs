//! slidesmith binary entry point

use anyhow::Result;
use slidesmith_cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
