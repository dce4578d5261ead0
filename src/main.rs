//! Delivery ETA - main entry point

use clap::Parser;
use delivery_eta::cli::{cmd_info, cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "delivery_eta=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            samples,
            trees,
            max_depth,
            seed,
            output,
            metadata,
        } => {
            cmd_train(samples, trees, max_depth, seed, &output, &metadata)?;
        }
        Commands::Predict { model, input } => {
            cmd_predict(&model, &input)?;
        }
        Commands::Info { model } => {
            cmd_info(&model)?;
        }
    }

    Ok(())
}
