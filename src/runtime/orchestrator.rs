use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use crate::{
    app::{load_config, load_config_file, Config},
    cli::{handle_command, Cli},
    gateway::{Backend, HttpBackend},
    runtime::NonInteractiveRunner,
    tui::{run_ui, App},
    utils::{log_info, log_warn},
};

/// Main runtime orchestrator
pub struct Orchestrator {
    cli: Cli,
    config: Config,
    backend: Arc<dyn Backend>,
    backend_url: String,
}

impl Orchestrator {
    /// Create a new orchestrator from CLI args
    pub fn new(cli: Cli) -> Result<Self> {
        // Load configuration
        let mut config = if let Some(config_path) = &cli.config {
            load_config_file(config_path)?
        } else {
            match load_config() {
                Ok(cfg) => cfg,
                Err(e) => {
                    log_warn("⚠️", format!("Failed to load config: {}. Using defaults.", e));
                    Config::default()
                }
            }
        };

        if let Some(url) = &cli.backend_url {
            config.backend.base_url = url.clone();
        }

        let http = HttpBackend::new(&config.backend)?;
        let backend_url = http.api_root().to_string();
        log_info("🔗", format!("Backend: {}", backend_url));

        Ok(Self {
            cli,
            config,
            backend: Arc::new(http),
            backend_url,
        })
    }

    /// Run the orchestrator
    pub async fn run(self) -> Result<()> {
        // Handle subcommands
        if let Some(command) = &self.cli.command {
            if handle_command(
                command,
                self.backend.clone(),
                &self.backend_url,
                self.cli.output_format,
            )
            .await?
            {
                return Ok(()); // Command handled, exit
            }
            // Continue to chat for Commands::Chat
        }

        if let (Some(file), Some(prompt)) = (&self.cli.file, &self.cli.prompt) {
            let mut runner = NonInteractiveRunner::new(self.backend.clone(), self.backend_url.clone());
            let result = runner.run(file, prompt.clone()).await;
            println!("{}", runner.format_result(&result, self.cli.output_format));

            // Exit with appropriate code
            if !result.errors.is_empty() {
                std::process::exit(1);
            }
            return Ok(());
        }

        println!("📄 Starting docqa against {}", self.backend_url.green());
        if !self.backend.status().await.unwrap_or(false) {
            log_warn("⚠️", format!("Backend at {} is not responding", self.backend_url));
        }

        let mut app = App::new(self.backend, self.config, self.backend_url);
        if let Some(file) = &self.cli.file {
            app.upload.path_input = file.display().to_string();
        }

        run_ui(app).await
    }
}
