//! Growthcast entry point

use clap::Parser;
use growthcast::cli::{cmd_predict, cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "growthcast=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data, output, trees } => {
            cmd_train(&data, output.as_deref(), trees)?;
        }
        Commands::Predict { model, data, output } => {
            cmd_predict(&model, &data, output.as_deref())?;
        }
        Commands::Serve { port, host } => {
            cmd_serve(&host, port).await?;
        }
    }

    Ok(())
}
