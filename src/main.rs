use clap::Parser;
use lhmon::{cli::Cli, config, run_command};
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> lhmon::Result<()> {
    // kube's rustls backend needs a process-wide crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // Load configuration
    let file_config = config::load_config(cli.config.as_deref())?;

    run_command(cli, file_config).await
}
