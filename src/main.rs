//! gemini-client - a minimal command-line client for the Gemini gateway.
//!
//! Reads prompts from the terminal, POSTs each one to the inference gateway as
//! `{"prompt": ...}` and prints the `response` field of the reply.

mod client;
mod config;
mod error;
mod protocol;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client::{GatewayClient, ReplOptions};
use config::{Config, Overrides};
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command as ProcessCommand;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gemini-client")]
#[command(author, version, about = "A minimal command-line client for the Gemini gateway")]
#[command(long_about = "Sends prompts to the Gemini inference gateway and prints the replies.\n\nRun without arguments for an interactive session; type 'exit' to quit.")]
struct Cli {
    /// Ask a single question and exit
    #[arg(value_name = "PROMPT")]
    prompt: Option<String>,

    /// Gateway URL (overrides environments and config)
    #[arg(long, value_name = "URL", global = true)]
    url: Option<String>,

    /// Named environment to take the gateway URL from
    #[arg(short = 'e', long = "env", value_name = "NAME", global = true)]
    environment: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long, global = true)]
    insecure: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    timeout: Option<u64>,

    /// Path to the config file
    #[arg(short = 'c', long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Do not print the input label
    #[arg(short = 'q', long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open configuration file in $EDITOR
    Config {
        /// Print the resolved connection settings instead
        #[arg(long)]
        show: bool,
    },
    /// List configured environments
    Environments,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let load = || Config::load(cli.config.as_deref()).context("Failed to load configuration");
    let overrides = Overrides {
        url: cli.url.clone(),
        environment: cli.environment.clone(),
        insecure: cli.insecure,
        timeout_secs: cli.timeout,
    };

    // The editor command must work even when the file does not parse.
    match cli.command {
        Some(Commands::Config { show: true }) => {
            handle_show_config(&load()?, &overrides, cli.config.clone())
        }
        Some(Commands::Config { show: false }) => handle_config(cli.config.clone()),
        Some(Commands::Environments) => handle_environments(&load()?),
        None => handle_prompt(&load()?, &overrides, cli.prompt.clone(), cli.quiet).await,
    }
}

/// Log to stderr so stdout only carries gateway replies.
fn init_logging(verbose: bool) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(verbose, rust_log.as_deref())?)
        .init();
    Ok(())
}

/// `RUST_LOG` wins when set and valid; `-v` always forces debug for this crate.
fn log_filter(verbose: bool, rust_log: Option<&str>) -> Result<EnvFilter> {
    let filter = rust_log
        .filter(|spec| !spec.trim().is_empty())
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| EnvFilter::new("gemini_client=warn,reqwest=warn"));

    if verbose {
        Ok(filter.add_directive("gemini_client=debug".parse()?))
    } else {
        Ok(filter)
    }
}

fn resolve(config: &Config, overrides: &Overrides) -> Result<config::ConnectionSettings> {
    config.resolve(overrides, |key| std::env::var(key).ok())
}

/// Interactive session, or a single question when a prompt was given.
async fn handle_prompt(
    config: &Config,
    overrides: &Overrides,
    prompt: Option<String>,
    quiet: bool,
) -> Result<()> {
    let settings = resolve(config, overrides)?;
    let gateway = GatewayClient::new(&settings).context("Failed to create gateway client")?;
    info!(
        "Using gateway {} (from {}, verify_tls={})",
        gateway.url(),
        settings.source,
        settings.verify_tls
    );

    let mut stdout = io::stdout().lock();

    if let Some(prompt) = prompt {
        return client::ask_once(&gateway, &prompt, &mut stdout).await;
    }

    let options = ReplOptions {
        show_label: !quiet && atty::is(atty::Stream::Stdin),
    };
    let stdin = io::stdin().lock();
    let sent = client::run_repl(&gateway, stdin, &mut stdout, options).await?;
    debug!("Session finished after {} prompt(s)", sent);
    Ok(())
}

/// Print the resolved connection settings.
fn handle_show_config(
    config: &Config,
    overrides: &Overrides,
    path: Option<PathBuf>,
) -> Result<()> {
    let settings = resolve(config, overrides)?;
    let config_path = match path {
        Some(p) => p,
        None => Config::config_path()?,
    };
    println!("Config file: {}", config_path.display());
    println!("Gateway: {}", settings.url);
    println!("Source: {}", settings.source);
    println!("Verify TLS: {}", settings.verify_tls);
    println!("Timeout: {}s", settings.timeout.as_secs());
    Ok(())
}

/// Handle the config command.
fn handle_config(path: Option<PathBuf>) -> Result<()> {
    let config_path = match path {
        Some(p) => p,
        None => Config::config_path()?,
    };

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    edit_config(&config_path, &editor)
}

/// Open `config_path` in `editor`, writing defaults first if it is missing.
fn edit_config(config_path: &Path, editor: &str) -> Result<()> {
    if !config_path.exists() {
        Config::default().save(config_path)?;
        println!("Created default config at {}", config_path.display());
    }

    let status = ProcessCommand::new(editor)
        .arg(config_path)
        .status()
        .context("Failed to open editor")?;

    if !status.success() {
        eprintln!("Editor exited with non-zero status");
    }

    Ok(())
}

/// List configured environments.
fn handle_environments(config: &Config) -> Result<()> {
    println!("Environments");
    println!("============\n");

    let default_env = config.gateway.environment.as_deref().unwrap_or("");
    for (name, url) in &config.environments {
        let marker = if name.eq_ignore_ascii_case(default_env) {
            " (default)"
        } else {
            ""
        };
        println!("  {}{}\n    url: {}\n", name, marker, url);
    }

    println!("Select with:");
    println!("  gemini-client --env local");
    println!("  RUNNING_PLATFORM=docker gemini-client");

    Ok(())
}
