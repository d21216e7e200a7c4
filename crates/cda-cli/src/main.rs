//! CDA extractor CLI.

use clap::Parser;

use cda_cli::cli::{Cli, Command};
use cda_cli::commands::{run_detect, run_extract, sections_table};
use cda_cli::logging::init_logging;

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = cli.log_config();
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match &cli.command {
        Command::Extract(args) => match run_extract(args) {
            Ok(json) => {
                println!("{json}");
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Detect(args) => match run_detect(args) {
            Ok(kind) => {
                println!("{kind}");
                0
            }
            Err(error) => {
                eprintln!("error: {error:#}");
                1
            }
        },
        Command::Sections => {
            println!("{}", sections_table());
            0
        }
    };
    std::process::exit(exit_code);
}
