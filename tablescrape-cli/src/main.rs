use clap::Parser;
use std::process::ExitCode;

use tablescrape::observability::init_tracing;
use tablescrape_cli::{run, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, false);

    let mut stdout = std::io::stdout();
    match run(&cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
