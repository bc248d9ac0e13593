//! Quotawatch CLI - subscription tier and model quota monitor
//!
//! This is the main entry point for the Quotawatch CLI application. It
//! stands where a dashboard would: it supplies the access token and the
//! settings snapshot, calls the core adapters and renders their results.

mod cli;
mod config;
mod countdown;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::{Config, FileSettingsProvider, Loaded};
use error::Result;
use handlers::CommandContext;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();

    // Config is loaded up front so its logging section can shape the subscriber
    let loaded = load_config(&cli);
    let config = loaded.as_ref().ok().map(|l| &l.config);

    control::set_override(cli.use_color() && config.map_or(true, |c| c.output.color));

    if let Err(e) = init_logging(&cli, config) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match loaded {
        Ok(loaded) => {
            loaded.log_fallback();
            run(cli, loaded.config).await
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Config commands may target a file that does not exist yet
fn load_config(cli: &Cli) -> Result<Loaded> {
    match cli.command {
        Commands::Config(_) => Config::load_for_editing(cli.config.as_deref()),
        _ => Config::load_with_file(cli.config.as_deref()),
    }
}

/// Main application logic
#[instrument(skip_all, fields(command = ?cli.command))]
async fn run(cli: Cli, config: Config) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let use_color = control::SHOULD_COLORIZE.should_colorize();
    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet, config.output.progress);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    match cli.command {
        Commands::Config(args) => {
            handlers::handle_config(args, cli.config.as_deref(), &config, &mut output).await
        }
        Commands::Completions(args) => handlers::handle_completions(args),
        command => {
            let token_file = cli.token_file.as_deref().or(config.credentials.token_file.as_deref());
            let token = handlers::resolve_token(cli.token.as_deref(), token_file)?;
            let provider = FileSettingsProvider::new(cli.config.as_deref());
            tracing::debug!(settings_file = ?provider.path(), "Settings provider ready");
            let ctx = CommandContext::new(config.network.client_config(), Box::new(provider), token, cli.raw)?;

            match command {
                Commands::Tier(args) => handlers::handle_tier(args, &ctx, &mut output).await,
                Commands::Models(args) => handlers::handle_models(args, &ctx, &mut output).await,
                Commands::Whoami => handlers::handle_whoami(&ctx, &mut output).await,
                Commands::Status => handlers::handle_status(&ctx, &mut output).await,
                Commands::Watch(args) => handlers::handle_watch(args, &ctx, &mut output).await,
                Commands::Config(_) | Commands::Completions(_) => Ok(()),
            }
        }
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<()> {
    let verbosity = cli.verbosity_level();
    let mut logging_config = LoggingConfig::from_verbosity(verbosity);

    if let Some(config) = config {
        logging_config.merge_with_file(&config.logging, verbosity);
    }
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use quotawatch_core::HostMode;
    use tempfile::TempDir;

    async fn run_args(args: &[&str]) -> Result<()> {
        let cli = Cli::parse_from(args.iter().copied());
        let config = load_config(&cli)?.config;
        run(cli, config).await
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["quotawatch", "-vv", "status"]);
        assert_eq!(cli.verbosity_level(), 2);
        assert!(matches!(cli.command, Commands::Status));

        let cli = Cli::parse_from(["quotawatch", "--quiet", "tier", "--duet-project", "p"]);
        assert_eq!(cli.verbosity_level(), 0);
        match cli.command {
            Commands::Tier(args) => assert_eq!(args.duet_project.as_deref(), Some("p")),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_config_commands_accept_a_file_not_created_yet() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("new.yaml");
        let file = path.to_str().unwrap();

        run_args(&["quotawatch", "--quiet", "--config", file, "config", "path"])
            .await
            .unwrap();
        assert!(!path.exists());

        run_args(&["quotawatch", "--quiet", "--config", file, "config", "init"])
            .await
            .unwrap();
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        std::fs::remove_file(&path).unwrap();
        run_args(&["quotawatch", "--quiet", "--config", file, "config", "set", "settings.hostMode", "daily"])
            .await
            .unwrap();
        assert_eq!(Config::from_file(&path).unwrap().settings.host_mode, HostMode::Daily);
    }

    #[test]
    fn test_lookup_commands_require_an_explicit_file_to_exist() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yaml");
        let cli = Cli::parse_from(["quotawatch", "--config", path.to_str().unwrap(), "status"]);
        assert!(matches!(load_config(&cli), Err(error::Error::FileNotFound { .. })));
    }
}
