//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::ApiServer;
use crate::core::banner;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_NAME_LOWER, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::{PipelineClient, ProfileClient};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub pipeline: Arc<PipelineClient>,
    pub profile: Option<Arc<ProfileClient>>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let cli_config = cli::parse();
        let app = Self::init(&cli_config)?;
        Self::start_server(app).await
    }

    fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let pipeline = Arc::new(
            PipelineClient::new(config.pipeline.clone(), config.debug)
                .context("Failed to build pipeline client")?,
        );

        let profile = match &config.profile {
            Some(profile_config) => Some(Arc::new(
                ProfileClient::new(profile_config.clone())
                    .context("Failed to build profile client")?,
            )),
            None => {
                tracing::info!("Profile store not configured, personalization disabled");
                None
            }
        };

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            pipeline,
            profile,
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_NAME_LOWER);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        app.shutdown.install_signal_handlers();

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            app.profile.is_some(),
        );

        ApiServer::new(app).start().await
    }
}
