pub mod cli;
pub mod core;
pub mod providers;

use crate::core::RateProvider;
use crate::core::config::AppConfig;
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
    },
    Rates,
    Interactive,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("xrate starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let provider: Arc<dyn RateProvider> = Arc::new(providers::OpenErApiProvider::new(
        &config.provider.base_url,
        config.request_timeout(),
    )?);

    match command {
        AppCommand::Convert { amount, from, to } => {
            cli::convert::run(
                provider.as_ref(),
                &config,
                &amount,
                from.as_deref(),
                to.as_deref(),
            )
            .await
        }
        AppCommand::Rates => cli::rates::run(provider.as_ref(), &config).await,
        AppCommand::Interactive => cli::interactive::run(provider, &config).await,
    }
}
