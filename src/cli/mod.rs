use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "subtitle-enhancer",
    about = "Subtitle Enhancer - Fetch YouTube captions, correct them with an LLM and translate them",
    version,
    long_about = "Fetches a YouTube video's captions, corrects grammar and punctuation with an OpenAI-compatible chat model, and translates the result. Runs as a small web UI or as a one-shot terminal command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, value_name = "FILE", env = "SUBTITLE_ENHANCER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web UI
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long, value_name = "HOST")]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long, value_name = "PORT")]
        port: Option<u16>,
    },

    /// Fetch, correct and translate the captions of one video
    Process {
        /// YouTube video URL
        #[arg(value_name = "URL")]
        url: String,

        /// Target language name (English, Spanish, French, German, Italian, Portuguese, Turkish)
        #[arg(short, long, value_name = "LANGUAGE")]
        language: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Show or create the configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported target languages
    Languages,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text panels
    Text,
    /// Full run report as JSON
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process_command() {
        let cli = Cli::try_parse_from([
            "subtitle-enhancer",
            "--quiet",
            "process",
            "https://youtu.be/dQw4w9WgXcQ",
            "--language",
            "Turkish",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(cli.quiet);
        match cli.command {
            Commands::Process { url, language, format, output } => {
                assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");
                assert_eq!(language.as_deref(), Some("Turkish"));
                assert!(matches!(format, OutputFormat::Json));
                assert!(output.is_none());
            }
            _ => panic!("expected process command"),
        }
    }
}
