// src/main.rs

use std::process::ExitCode;

use bodega_console::{
    cli::Cli,
    config::{AppConfig, AppState},
    handlers,
};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env();
    cli.apply(&mut config);

    let state = AppState::new(config).await?;

    match handlers::run(cli.command, &state).await {
        Ok(output) => {
            if output.is_failure() {
                eprintln!("{}", output.render(cli.json));
                return Ok(ExitCode::FAILURE);
            }
            println!("{}", output.render(cli.json));
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("comando falló: {:?}", e);
            let notice = e.to_notice();
            if cli.json {
                eprintln!("{}", serde_json::json!(notice));
            } else {
                eprintln!("{}", notice);
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
