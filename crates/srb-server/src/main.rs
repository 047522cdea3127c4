//! `srb-server` binary: resolves configuration and serves the SRB API

use anyhow::Context;
use clap::{value_parser, Arg, ArgAction, Command};
use srb_server::{AppState, LogFormat, ServerConfig};
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("srb-server")
        .version(srb_server::VERSION)
        .about("Safety Review Board record service")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("bind")
                .long("bind")
                .help("Listen address, overrides config and SRB_BIND"),
        )
        .arg(
            Arg::new("snapshot")
                .long("snapshot")
                .value_parser(value_parser!(PathBuf))
                .help("JSON snapshot file, overrides config and SRB_SNAPSHOT"),
        )
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .value_parser(["pretty", "json"])
                .help("Log output format"),
        )
        .arg(
            Arg::new("print-config")
                .long("print-config")
                .action(ArgAction::SetTrue)
                .help("Print the resolved configuration as TOML and exit"),
        )
}

fn resolve_config(matches: &clap::ArgMatches) -> anyhow::Result<ServerConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ServerConfig::new(),
    };
    config = config.with_env(|key| std::env::var(key).ok());
    if let Some(bind) = matches.get_one::<String>("bind") {
        config = config.with_bind(bind.clone());
    }
    if let Some(path) = matches.get_one::<PathBuf>("snapshot") {
        config = config.with_snapshot_path(path.clone());
    }
    if let Some(format) = matches.get_one::<String>("log-format") {
        config = config.with_log_format(format.parse::<LogFormat>()?);
    }
    config.validate()?;
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    let config = resolve_config(&matches)?;

    if matches.get_flag("print-config") {
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    srb_server::telemetry::init(&config)
        .map_err(|e| anyhow::anyhow!(e))
        .context("installing tracing subscriber")?;

    let state = AppState::from_config(&config)
        .await
        .context("opening SRB record store")?;
    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;

    srb_server::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}
