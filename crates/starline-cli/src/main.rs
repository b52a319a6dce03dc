//! StarLine CLI - command-line tool for StarLine telematics
//!
//! Authenticates against SLID/SLNET on every invocation, then lists devices
//! or sends device commands.

mod commands;
mod config;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use starline_client::{
    LoginParams, ReqwestTransport, StarlineClient, TracingLogger, TransportOptions,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{ArgOverrides, Config, MergedConfig};
use crate::output::{OutputContext, OutputFormat};

#[derive(Parser)]
#[command(name = "starline-cli")]
#[command(author, version, about = "StarLine telematics CLI")]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "STARLINE_CONFIG")]
    config: Option<PathBuf>,

    /// StarLine account login
    #[arg(long, env = "STARLINE_LOGIN")]
    login: Option<String>,

    /// StarLine account password
    #[arg(long, env = "STARLINE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Application id from the developer portal
    #[arg(long, env = "STARLINE_APP_ID")]
    app_id: Option<String>,

    /// Application secret from the developer portal
    #[arg(long, env = "STARLINE_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// End-user IP address sent with the login request
    #[arg(long)]
    user_ip: Option<String>,

    /// Verify TLS certificates (off by default, the StarLine hosts fail verification)
    #[arg(long)]
    verify_tls: bool,

    /// Output format
    #[arg(short, long, value_enum)]
    output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Minimal output (for scripting)
    #[arg(short, long)]
    quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate and print the SLNET session
    Login,

    /// List devices of the account
    Devices,

    /// Send a command to a device
    Exec {
        /// Device ID
        device_id: String,

        /// Command type, e.g. arm, ign, poke
        #[arg(value_name = "TYPE")]
        command_type: String,

        /// Command parameters as name=value (repeatable)
        #[arg(short, long = "param")]
        params: Vec<String>,
    },

    /// Arm (or disarm) the security system of a device
    Arm {
        /// Device ID
        device_id: String,

        /// Disarm instead
        #[arg(long)]
        off: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    // Load config file
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load().unwrap_or_default()
    };

    // Merge CLI args with config
    let merged = config.merge_with_args(&ArgOverrides {
        login: cli.login.as_deref(),
        password: cli.password.as_deref(),
        app_id: cli.app_id.as_deref(),
        secret: cli.secret.as_deref(),
        user_ip: cli.user_ip.as_deref(),
        no_color: cli.no_color,
        verify_tls: cli.verify_tls,
    });
    let format = cli
        .output
        .or_else(|| config.output.as_deref().and_then(OutputFormat::from_name))
        .unwrap_or_default();

    // Create output context
    let ctx = OutputContext::new(format, merged.no_color, cli.quiet);

    let client = create_client(&merged)?;
    let extra = login_params(&merged);

    // Execute command
    match &cli.command {
        Commands::Login => {
            commands::login(&client, &extra, &ctx).await?;
        }

        Commands::Devices => {
            commands::devices(&client, &extra, &ctx).await?;
        }

        Commands::Exec {
            device_id,
            command_type,
            params,
        } => {
            commands::exec(&client, &extra, device_id, command_type, params, &ctx).await?;
        }

        Commands::Arm { device_id, off } => {
            commands::arm(&client, &extra, device_id, *off, &ctx).await?;
        }
    }

    Ok(())
}

/// Create a StarLine client from the merged configuration
fn create_client(merged: &MergedConfig) -> Result<StarlineClient> {
    let options = TransportOptions {
        accept_invalid_certs: !merged.verify_tls,
        ..Default::default()
    };
    let client = StarlineClient::with_transport(
        merged.credentials()?,
        Arc::new(ReqwestTransport::new(options)),
    )
    .context("Failed to create StarLine client")?;
    Ok(client.with_logger(Arc::new(TracingLogger)))
}

fn login_params(merged: &MergedConfig) -> LoginParams {
    match &merged.user_ip {
        Some(ip) => LoginParams::new().user_ip(ip.clone()),
        None => LoginParams::new(),
    }
}
