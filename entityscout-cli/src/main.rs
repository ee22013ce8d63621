use clap::Parser;
use entityscout_cli::handlers::{
    handle_analyze_command, handle_process_command, handle_stats_command,
};
use entityscout_cli::commands::log_directive;
use entityscout_cli::{Cli, Commands, EntityScoutCliContext, output_error};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli_args = Cli::parse();

    // Environment overrides the flag so scripts can force machine output
    let output_format =
        std::env::var("ENTITYSCOUT_OUTPUT").unwrap_or_else(|_| cli_args.output.clone());

    let is_quiet = cli_args.quiet
        || std::env::var("ENTITYSCOUT_QUIET")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(log_directive(is_quiet, cli_args.verbose, &output_format))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli_args, &output_format).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output_error(&e, &output_format);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli_args: Cli, output_format: &str) -> entityscout::Result<()> {
    let config_path = cli_args.config.as_deref();

    match cli_args.command {
        Commands::Version => {
            println!("EntityScout CLI v{}", entityscout::VERSION);
        }

        Commands::Process(args) => {
            let ctx = EntityScoutCliContext::new(config_path, !args.no_enrich)?;
            handle_process_command(args, &ctx, output_format).await?;
        }

        Commands::Analyze(args) => {
            let ctx = EntityScoutCliContext::new(config_path, !args.no_enrich)?;
            handle_analyze_command(args, &ctx, output_format).await?;
        }

        Commands::Stats(args) => {
            let ctx = EntityScoutCliContext::new(config_path, !args.no_enrich)?;
            handle_stats_command(args, &ctx, output_format).await?;
        }
    }

    Ok(())
}
