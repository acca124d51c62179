use anyhow::Result;
use colored::Colorize;
use std::sync::Arc;

use crate::{
    app::init_config,
    gateway::{Backend, DocumentHandle, PdfUpload},
    runtime::NonInteractiveRunner,
};

use super::{Commands, OutputFormat};

/// Handle CLI subcommands; returns false when the chat UI should start
pub async fn handle_command(
    command: &Commands,
    backend: Arc<dyn Backend>,
    backend_url: &str,
    format: OutputFormat,
) -> Result<bool> {
    match command {
        Commands::Init => {
            println!("Initializing docqa configuration...");
            init_config()?;
            println!("Configuration initialized successfully!");
            Ok(true)
        }
        Commands::Upload { path } => {
            let upload = PdfUpload::from_path(path).await?;
            println!(
                "📤 Uploading {} ({:.2} MB)...",
                upload.file_name(),
                upload.size() as f64 / (1024.0 * 1024.0)
            );
            let handle = backend.ingest(&upload).await?;
            println!("{} {}", "✅ Ready:".green(), handle);
            Ok(true)
        }
        Commands::Ask { document, question } => {
            let mut runner = NonInteractiveRunner::new(backend, backend_url.to_string());
            runner.attach(DocumentHandle::new(document.as_str()));
            let result = runner.execute(question.clone()).await;
            println!("{}", runner.format_result(&result, format));
            if !result.errors.is_empty() {
                std::process::exit(1);
            }
            Ok(true)
        }
        Commands::Status => {
            show_status(backend.as_ref(), backend_url).await;
            Ok(true)
        }
        Commands::Version => {
            show_version();
            Ok(true)
        }
        Commands::Chat => Ok(false), // Continue to chat interface
    }
}

/// Show version information
pub fn show_version() {
    println!("docqa v{}", env!("CARGO_PKG_VERSION"));
    println!("   Chat with your PDF documents");
}

/// Report whether the backend answers
async fn show_status(backend: &dyn Backend, backend_url: &str) {
    println!("docqa Status:");
    println!();

    match backend.status().await {
        Ok(true) => println!("  {} Backend: {}", "✓".green(), backend_url),
        _ => {
            println!("  {} Backend: {} (unreachable)", "✗".red(), backend_url);
            println!("    Start the backend or pass --backend-url");
        }
    }
}
