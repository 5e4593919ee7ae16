//! Resolve the service config once at startup and report the result.

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::path::PathBuf;
use strata_rs::config::{ConfigFormat, ConfigResolver, ServiceConfig};
use strata_rs::{DEFAULT_CONFIG_PATH, init_logging};

/// Command-line options for the strata binary.
#[derive(Debug, Parser)]
#[command(
    name = "strata",
    version,
    about = "Resolve service config from a file and the environment"
)]
struct Cli {
    /// Config file to load
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Config format (yaml, json, json5); inferred from the extension when omitted
    #[arg(short, long)]
    format: Option<ConfigFormat>,
    /// Only honor environment variables starting with `<PREFIX>_`
    #[arg(long)]
    env_prefix: Option<String>,
    /// Print the resolved config as JSON
    #[arg(long)]
    json: bool,
    /// Print the environment variables the config accepts and exit
    #[arg(long)]
    list_env: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let mut resolver = ConfigResolver::new();
    if let Some(prefix) = cli.env_prefix.as_deref() {
        resolver = resolver.with_env_prefix(prefix);
    }

    if cli.list_env {
        for (key, var) in resolver.env_keys::<ServiceConfig>()? {
            println!("{var}\t{key}");
        }
        return Ok(());
    }

    let format = cli
        .format
        .or_else(|| ConfigFormat::from_path(&cli.config))
        .unwrap_or_default();
    debug!(
        "resolving config (path={}, format={format}, env_prefix={:?})",
        cli.config.display(),
        cli.env_prefix
    );
    let resolved = resolver
        .load::<ServiceConfig>(&cli.config, format)
        .context("error reading configuration")?;
    for applied in &resolved.overrides {
        info!("{} set from {}", applied.key, applied.var);
    }

    let config = resolved.config;
    report(&config, cli.json)
}

fn report(config: &ServiceConfig, json: bool) -> anyhow::Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(config).context("failed to render config")?;
        println!("{rendered}");
    } else {
        println!("Config: {}", config.name);
    }
    Ok(())
}
