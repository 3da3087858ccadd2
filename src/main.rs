use clap::Parser;
use tracing_subscriber::EnvFilter;

use jbrowse_config_sync::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("jbrowse_config_sync=debug,info")
    } else {
        EnvFilter::new("jbrowse_config_sync=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Import(args) => {
            cli::import::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Export(args) => {
            cli::export::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Merge(args) => {
            cli::merge::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Roundtrip(args) => {
            cli::roundtrip::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
