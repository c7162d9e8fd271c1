//! nowplaying - follow and control an MPRIS media player from the terminal.

use std::process;

use clap::Parser;
use nowplaying::{
    cli::{Cli, formatting::format_error},
    tracing_config,
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = cli.load_config();

    let log_level = config
        .as_ref()
        .map(|config| config.general.log_level)
        .unwrap_or_default();

    let logging = if cli.command.is_long_running() {
        tracing_config::init_with_file(log_level)
    } else {
        tracing_config::init(log_level)
    };
    if let Err(e) = logging {
        eprintln!("{}", format_error(&format!("Logging unavailable: {e}")));
    }

    debug!(command = ?cli.command, "Running");

    match cli.run(config).await {
        Ok(output) => {
            if !output.trim().is_empty() {
                println!("{output}");
            }
            // Exit explicitly: a pending stdin read would otherwise hold the
            // runtime open.
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", format_error(&e.to_string()));
            process::exit(1);
        }
    }
}
