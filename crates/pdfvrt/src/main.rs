mod cli;
mod commands;

use clap::Parser;
use pdfvrt::config::CliOverrides;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pdfvrt=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Init { engine, force } => {
            commands::init(engine, force)?;
        }
        cli::Command::Compare(args) => {
            let overrides = CliOverrides {
                config: args.config.clone(),
                image_engine: args.engine,
                threshold: args.threshold,
                tolerance: args.tolerance,
                density: args.density,
                password: args.password.clone(),
                no_match_page_count: args.no_match_page_count,
                keep_pngs: args.keep_pngs,
            };
            let config = pdfvrt::config::resolve(overrides)?;
            let code = commands::compare(config, args).await?;
            std::process::exit(code);
        }
    }

    Ok(())
}
