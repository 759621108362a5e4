mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI and dispatch; API commands load config and logging.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("scalepad error: {:#}", err);
        std::process::exit(1);
    }
}
