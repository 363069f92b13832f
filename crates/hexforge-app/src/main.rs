//! Main application entry point.

use clap::Parser;
use hexforge_app::{App, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Starting HexForge");

    let cli = Cli::parse();
    match App::from_cli(&cli).and_then(|app| pollster::block_on(app.run(cli.command))) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
