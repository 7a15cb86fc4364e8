pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthService;
use crate::client::{HttpClient, Navigator, ReqwestTransport, RouteTracker};
use crate::config::AppConfig;
use crate::session::{FileStore, SessionStore};

#[derive(Parser)]
#[command(name = "erp")]
#[command(about = "ERP client - passwordless login, session and role tooling")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Authentication and session management")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Show the landing route for a role (all roles when omitted)")]
    Routes {
        #[arg(help = "Role identifier, e.g. procurement")]
        role: Option<String>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
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

/// Everything a command needs, wired once per invocation. Collaborators are
/// injected explicitly rather than reached for as globals.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn SessionStore>,
    pub navigator: Arc<dyn Navigator>,
    pub auth: Arc<AuthService>,
}

impl AppContext {
    pub fn build(config: AppConfig) -> anyhow::Result<Self> {
        let store: Arc<dyn SessionStore> = Arc::new(FileStore::open_default()?);
        let navigator: Arc<dyn Navigator> = Arc::new(RouteTracker::default());
        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(
            config.api.request_timeout_secs,
        ))?);

        let http = HttpClient::new(
            transport,
            Arc::clone(&store),
            Arc::clone(&navigator),
            config.api.base_url.clone(),
        );
        let auth = Arc::new(AuthService::new(
            http,
            Arc::clone(&store),
            Arc::clone(&navigator),
            config.environment,
        ));

        Ok(Self {
            config,
            store,
            navigator,
            auth,
        })
    }
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let ctx = AppContext::build(config)?;

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &ctx, output_format).await,
        Commands::Routes { role } => commands::routes::handle(role, output_format),
    }
}
