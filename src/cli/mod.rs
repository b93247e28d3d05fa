pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::app::AppState;
use crate::config::AppConfig;
use crate::database::PgStore;

#[derive(Parser)]
#[command(name = "crm")]
#[command(about = "Tenant CRM admin CLI - schema setup and account bootstrap against the configured database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Create collections and indexes")]
    Migrate,

    #[command(about = "Tenant management")]
    Tenant {
        #[command(subcommand)]
        cmd: commands::tenant::TenantCommands,
    },

    #[command(about = "User management")]
    User {
        #[command(subcommand)]
        cmd: commands::user::UserCommands,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env().validate()?;
    let store = Arc::new(PgStore::connect(&config.database).await?);

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&store, output_format).await,
        Commands::Tenant { cmd } => {
            let state = AppState::new(config, store.clone())?;
            commands::tenant::handle(cmd, &state, output_format).await
        }
        Commands::User { cmd } => {
            let state = AppState::new(config, store.clone())?;
            commands::user::handle(cmd, &state, output_format).await
        }
    };

    crate::database::DocumentStore::close(store.as_ref()).await;
    result
}
