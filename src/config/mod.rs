use anyhow::{Context, Result};
use aws_config::Region;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::language::Language;

const APP_DIR: &str = "subtitle-enhancer";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Text correction service settings
    pub correction: CorrectionConfig,

    /// Translation service settings
    pub translation: TranslationConfig,

    /// Caption retrieval settings
    pub captions: CaptionConfig,

    /// Where credentials are looked up besides the environment
    pub secrets: SecretsConfig,

    /// Web UI listener
    pub server: ServerConfig,

    /// Outbound HTTP settings
    pub http: HttpConfig,

    /// Defaults preselected in the UI
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,

    /// Chat model used for correction
    pub model: String,

    /// Sampling temperature (0 keeps output deterministic)
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_tokens: u32,

    /// Credential name looked up in the environment and secrets file
    pub api_key_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    Google,
    Aws,
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationProvider::Google => write!(f, "google"),
            TranslationProvider::Aws => write!(f, "aws"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Which translation backend to call
    pub provider: TranslationProvider,

    /// Google Cloud Translation v2 endpoint
    pub google_endpoint: String,

    /// Credential name holding the Google API key
    pub google_api_key_name: String,

    /// AWS region for Amazon Translate
    pub aws_region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionConfig {
    /// Preferred caption languages, most preferred first
    pub languages: Vec<String>,

    /// Watch page URL template (`{video_id}` is substituted)
    pub watch_url: String,

    /// InnerTube player endpoint template (`{api_key}` is substituted)
    pub player_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecretsConfig {
    /// Secrets file path (defaults to the config directory)
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub default_language: String,
    pub default_font: String,
    pub default_theme: String,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.0,
            max_tokens: 1024,
            api_key_name: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Google,
            google_endpoint: "https://translation.googleapis.com/language/translate/v2".to_string(),
            google_api_key_name: "GOOGLE_TRANSLATE_API_KEY".to_string(),
            aws_region: "us-east-1".to_string(),
        }
    }
}

impl Default for CaptionConfig {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string()],
            watch_url: "https://www.youtube.com/watch?v={video_id}".to_string(),
            player_url: "https://www.youtube.com/youtubei/v1/player?key={api_key}".to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 60 }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_language: Language::English.name().to_string(),
            default_font: "Roboto".to_string(),
            default_theme: "Light Mode".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from `path` (or the default location), creating it if missing
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_path()?,
        };

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Created default configuration at {}", config_path.display());
            Ok(config)
        }
    }

    /// Read and validate an existing configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = serde_yaml::from_str(&content)
            .context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        Ok(Self::app_dir()?.join("config.yaml"))
    }

    /// Secrets file consulted after the environment
    pub fn secrets_path(&self) -> Option<PathBuf> {
        self.secrets
            .path
            .clone()
            .or_else(|| Self::app_dir().ok().map(|dir| dir.join("secrets.yaml")))
    }

    fn app_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join(APP_DIR))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.correction.max_tokens == 0 {
            anyhow::bail!("correction.max_tokens must be greater than zero");
        }

        if !(0.0..=2.0).contains(&self.correction.temperature) {
            anyhow::bail!(
                "correction.temperature must be between 0.0 and 2.0, got {}",
                self.correction.temperature
            );
        }

        if self.server.port == 0 {
            anyhow::bail!("server.port must be non-zero");
        }

        if self.captions.languages.is_empty() {
            anyhow::bail!("captions.languages must list at least one language code");
        }

        if Language::from_name(&self.ui.default_language).is_none() {
            anyhow::bail!("ui.default_language '{}' is not a supported language", self.ui.default_language);
        }

        Ok(())
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  Correction Endpoint: {}", self.correction.endpoint);
        println!("  Correction Model: {}", self.correction.model);
        println!("  Max Tokens: {}", self.correction.max_tokens);
        println!("  Translation Provider: {}", self.translation.provider);
        if self.translation.provider == TranslationProvider::Aws {
            println!("  AWS Region: {}", self.translation.aws_region);
        }
        println!("  Caption Languages: {}", self.captions.languages.join(", "));
        if let Some(path) = self.secrets_path() {
            println!("  Secrets File: {}", path.display());
        }
        println!("  Listen Address: {}", self.socket_addr());
    }

    /// Get AWS region
    pub fn aws_region(&self) -> Region {
        Region::new(self.translation.aws_region.clone())
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.correction.model, "gpt-3.5-turbo");
        assert_eq!(config.correction.max_tokens, 1024);
        assert_eq!(config.correction.temperature, 0.0);
        assert_eq!(config.translation.provider, TranslationProvider::Google);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "translation:\n  provider: aws\n  aws_region: eu-west-1\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.translation.provider, TranslationProvider::Aws);
        assert_eq!(config.translation.aws_region, "eu-west-1");
        assert_eq!(config.translation.google_api_key_name, "GOOGLE_TRANSLATE_API_KEY");
        assert_eq!(config.server.port, 8501);
        assert_eq!(config.captions.languages, vec!["en".to_string()]);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.correction.max_tokens = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.correction.temperature = 3.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.captions.languages.clear();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.ui.default_language = "Latin".to_string();
        assert!(config.validate().is_err());
    }

    #[tokio::test]
    async fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load(Some(&path)).await.unwrap();
        assert!(path.exists());
        assert_eq!(config.server.port, 8501);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.correction.model, config.correction.model);
    }

    #[test]
    fn test_load_reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "translation:\n  provider: aws\n  aws_region: eu-west-1\n").unwrap();

        let config = tokio_test::block_on(Config::load(Some(&path))).unwrap();
        assert_eq!(config.translation.provider, TranslationProvider::Aws);
        assert_eq!(config.translation.aws_region, "eu-west-1");
        assert_eq!(config.correction.model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "server:\n  host: 0.0.0.0\n  port: 0\n").unwrap();

        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_explicit_secrets_path_wins() {
        let mut config = Config::default();
        config.secrets.path = Some(PathBuf::from("/tmp/secrets.yaml"));
        assert_eq!(config.secrets_path(), Some(PathBuf::from("/tmp/secrets.yaml")));
    }
}
