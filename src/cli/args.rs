use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "docqa")]
#[command(version)]
#[command(about = "Ask questions about a PDF using a retrieval-augmented backend", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides configuration)
    #[arg(short, long, env = "DOCQA_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// PDF to upload on start
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Non-interactive question to ask about --file
    #[arg(short, long, requires = "file")]
    pub prompt: Option<String>,

    /// Output format for non-interactive mode
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output_format: OutputFormat,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize configuration
    Init,
    /// Start a chat session (default)
    Chat,
    /// Upload a PDF and print the handle to ask against
    Upload {
        /// PDF file to upload
        path: PathBuf,
    },
    /// Ask one question about a document the backend already has
    Ask {
        /// Document handle returned by a previous upload
        #[arg(short, long)]
        document: String,
        /// The question
        question: String,
    },
    /// Check that the backend is reachable
    Status,
    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    Text,
    /// JSON structured output
    Json,
    /// Markdown formatted output
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_requires_file() {
        assert!(Cli::try_parse_from(["docqa", "-p", "What is this?"]).is_err());

        let cli = Cli::try_parse_from(["docqa", "-f", "notes.pdf", "-p", "What is this?"]).unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("notes.pdf")));
        assert_eq!(cli.prompt.as_deref(), Some("What is this?"));
        assert_eq!(cli.output_format, OutputFormat::Text);
    }

    #[test]
    fn test_ask_subcommand() {
        let cli = Cli::try_parse_from([
            "docqa",
            "ask",
            "--document",
            "notes.pdf",
            "Summarize chapter 1",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Ask { document, question }) => {
                assert_eq!(document, "notes.pdf");
                assert_eq!(question, "Summarize chapter 1");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_output_format_values() {
        let cli = Cli::try_parse_from([
            "docqa",
            "-f",
            "a.pdf",
            "-p",
            "q",
            "--output-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.output_format, OutputFormat::Json);
    }
}
