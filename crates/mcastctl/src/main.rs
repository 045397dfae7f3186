//! mcastctl - collect multicast state from a router and summarize it

use clap::Parser;
use mcastctl::cli::Cli;
use mcastctl::errors::EXIT_GENERAL_ERROR;
use mcastctl::{app, logging};
use tracing::error;

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let code = match app::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("Error during analysis: {:#}", e);
            EXIT_GENERAL_ERROR
        }
    };

    std::process::exit(code);
}
