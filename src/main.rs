/*!
 * lineage-sync CLI - Command Line Interface
 *
 * Version: 0.1.0
 * Author: Shane Wall <shaneawall@gmail.com>
 */

use clap::{Parser, Subcommand, ValueEnum};
use lineage_sync::{
    cli_style,
    config::{DeploymentMode, ErrorMode, LogLevel, RunConfig, DEFAULT_CONFIG_FILE},
    error::{LineageError, Result, EXIT_PARTIAL, EXIT_SUCCESS},
    logging,
    runner::run_and_write,
    stats::TraversalStats,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lineage-sync")]
#[command(version, about = "Extract dataset lineage from a REST data catalog into a JSON document", long_about = None)]
struct Cli {
    /// Path to config file (default: ./lineage-sync.toml when present)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Catalog service URL
    #[arg(long)]
    url: Option<String>,

    /// Login user (self-hosted)
    #[arg(long, short = 'u')]
    username: Option<String>,

    /// Login password, or personal access token in cloud mode
    #[arg(long, env = "LINEAGE_SYNC_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Deployment kind (self-hosted, cloud)
    #[arg(long, value_enum)]
    deployment: Option<DeploymentArg>,

    /// Project identifier (cloud mode)
    #[arg(long)]
    project_id: Option<String>,

    /// Where to write the lineage document
    #[arg(short = 'o', long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Indent the lineage document
    #[arg(long)]
    pretty: bool,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, value_enum, global = true)]
    log_level: Option<LogLevelArg>,

    /// Path to log file (default: stderr)
    #[arg(long, value_name = "FILE", global = true)]
    log: Option<PathBuf>,

    /// Enable verbose logging (equivalent to --log-level=debug)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Retries per request after the first attempt
    #[arg(long)]
    retry_attempts: Option<u32>,

    /// Initial retry delay in milliseconds
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Error handling mode (abort, skip)
    #[arg(long, value_enum)]
    error_mode: Option<ErrorModeArg>,

    /// Do not emit parents that were already recorded as primary datasets
    #[arg(long)]
    reconcile_primary_ids: bool,

    /// Disable TLS certificate verification (use with caution)
    #[arg(long)]
    insecure: bool,

    /// Hide progress spinner
    #[arg(long)]
    no_progress: bool,

    /// Show run statistics summary at end of run
    #[arg(long)]
    stat: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    InitConfig {
        /// Destination file
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum DeploymentArg {
    SelfHosted,
    Cloud,
}

impl From<DeploymentArg> for DeploymentMode {
    fn from(arg: DeploymentArg) -> Self {
        match arg {
            DeploymentArg::SelfHosted => DeploymentMode::SelfHosted,
            DeploymentArg::Cloud => DeploymentMode::Cloud,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum ErrorModeArg {
    Abort,
    Skip,
}

impl From<ErrorModeArg> for ErrorMode {
    fn from(arg: ErrorModeArg) -> Self {
        match arg {
            ErrorModeArg::Abort => ErrorMode::Abort,
            ErrorModeArg::Skip => ErrorMode::Skip,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LogLevel {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LogLevel::Error,
            LogLevelArg::Warn => LogLevel::Warn,
            LogLevelArg::Info => LogLevel::Info,
            LogLevelArg::Debug => LogLevel::Debug,
            LogLevelArg::Trace => LogLevel::Trace,
        }
    }
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            cli_style::print_error(&e.to_string(), hint_for(&e));
            e.exit_code()
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();

    if let Some(Commands::InitConfig { path, force }) = &cli.command {
        return init_config(path, *force);
    }

    let config = build_config(&cli)?;

    if let Err(e) = logging::init_logging(&config) {
        cli_style::print_warning(&format!("Failed to initialize logging: {}", e));
    }

    let run = run_and_write(&config)?;

    if cli.stat {
        run.stats.print();
    }
    report(&run.stats, &config.output);

    if run.is_complete() {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_PARTIAL)
    }
}

/// Load the config file, then let explicit CLI flags override it
fn build_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::from_file(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
            RunConfig::from_file(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => RunConfig::default(),
    };

    if let Some(url) = &cli.url {
        config.url = url.clone();
    }
    if let Some(username) = &cli.username {
        config.username = username.clone();
    }
    if let Some(password) = &cli.password {
        config.password = password.clone();
    }
    if let Some(deployment) = cli.deployment {
        config.deployment = deployment.into();
    }
    if let Some(project_id) = &cli.project_id {
        config.project_id = project_id.clone();
    }
    if let Some(output) = &cli.output {
        config.output = output.clone();
    }
    if cli.pretty {
        config.pretty = true;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    if let Some(log) = &cli.log {
        config.log_file = Some(log.clone());
    }
    if cli.verbose {
        config.verbose = true;
    }
    if let Some(attempts) = cli.retry_attempts {
        config.retry.max_attempts = attempts;
    }
    if let Some(delay) = cli.retry_delay_ms {
        config.retry.initial_delay_ms = delay;
    }
    if let Some(mode) = cli.error_mode {
        config.error_mode = mode.into();
    }
    if cli.reconcile_primary_ids {
        config.reconcile_primary_ids = true;
    }
    if cli.insecure {
        config.accept_invalid_certs = true;
    }
    if cli.no_progress {
        config.show_progress = false;
    }

    Ok(config)
}

fn init_config(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        return Err(LineageError::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let template = RunConfig {
        url: "https://localhost:9047".to_string(),
        username: "admin".to_string(),
        ..Default::default()
    };
    template.to_file(path)?;
    cli_style::print_success(&format!("Wrote {}", path.display()));
    Ok(EXIT_SUCCESS)
}

fn report(stats: &TraversalStats, output: &Path) {
    cli_style::print_success(&format!(
        "Wrote {} lineage record(s) to {}",
        stats.total_records(),
        output.display()
    ));
    if !stats.is_complete() {
        cli_style::print_warning(&format!(
            "{} node(s) could not be fetched and are missing from the document",
            stats.skipped.len()
        ));
    }
}

fn hint_for(err: &LineageError) -> Option<&'static str> {
    match err {
        LineageError::Auth(_) => Some("Check the username/password, or the access token in cloud mode"),
        LineageError::Config(_) => Some("Run `lineage-sync init-config` to generate a starting config"),
        LineageError::Transport { .. } => {
            Some("Check the service URL; use --insecure only for self-signed certificates")
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn cloud_config_file(dir: &Path) -> PathBuf {
        let path = dir.join("cloud.toml");
        std::fs::write(
            &path,
            "url = \"https://api.dremio.cloud\"\ndeployment = \"cloud\"\nproject_id = \"p1\"\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_deployment_flag_overrides_config_file() {
        let dir = tempdir().unwrap();
        let file = cloud_config_file(dir.path());

        let cli = Cli::parse_from([
            "lineage-sync",
            "--config",
            file.to_str().unwrap(),
            "--deployment",
            "self-hosted",
            "-u",
            "admin",
        ]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.deployment, DeploymentMode::SelfHosted);
        assert_eq!(config.username, "admin");
        assert_eq!(config.url, "https://api.dremio.cloud");
    }

    #[test]
    fn test_config_file_deployment_kept_without_flag() {
        let dir = tempdir().unwrap();
        let file = cloud_config_file(dir.path());

        let cli = Cli::parse_from(["lineage-sync", "--config", file.to_str().unwrap()]);
        let config = build_config(&cli).unwrap();

        assert_eq!(config.deployment, DeploymentMode::Cloud);
        assert_eq!(config.project_id, "p1");
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "lineage-sync",
            "--config",
            "/nonexistent/lineage-sync.toml",
        ]);
        assert!(matches!(build_config(&cli), Err(LineageError::Config(_))));

        let dir = tempdir().unwrap();
        let file = cloud_config_file(dir.path());
        let cli = Cli::parse_from([
            "lineage-sync",
            "--config",
            file.to_str().unwrap(),
            "--error-mode",
            "skip",
            "--retry-attempts",
            "7",
            "--no-progress",
        ]);
        let config = build_config(&cli).unwrap();
        assert_eq!(config.error_mode, ErrorMode::Skip);
        assert_eq!(config.retry.max_attempts, 7);
        assert!(!config.show_progress);
    }
}
