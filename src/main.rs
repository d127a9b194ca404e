//! Wine quality pipeline - Main Entry Point

use clap::Parser;
use winequality::cli::{cmd_predict, cmd_serve, cmd_stages, Cli, Commands};
use winequality::pipeline::Stage;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "winequality=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config_dir = cli.config_dir.as_deref();

    match cli.command {
        Commands::Run => cmd_stages(config_dir, &Stage::ALL)?,
        Commands::Ingest => cmd_stages(config_dir, &[Stage::Ingestion])?,
        Commands::Validate => cmd_stages(config_dir, &[Stage::Validation])?,
        Commands::Prepare => cmd_stages(config_dir, &[Stage::Preparation])?,
        Commands::Transform => cmd_stages(config_dir, &[Stage::Transformation])?,
        Commands::Train => cmd_stages(config_dir, &[Stage::Training])?,
        Commands::Evaluate => cmd_stages(config_dir, &[Stage::Evaluation])?,
        Commands::Predict(args) => {
            cmd_predict(config_dir, args)?;
        }
        Commands::Serve { port, host } => cmd_serve(config_dir, &host, port).await?,
    }

    Ok(())
}
