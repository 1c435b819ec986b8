//! TOML configuration parsing and validation.
//!
//! Every command reads one configuration file (default
//! `./config/insight.toml`). Sections with sensible defaults may be omitted;
//! `[db]` and `[server]` are required.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

/// Limits applied by the offline analyzer and the input layer.
#[derive(Debug, Deserialize, Clone)]
pub struct AnalysisConfig {
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,
    #[serde(default = "default_summary_max_chars")]
    pub summary_max_chars: usize,
    #[serde(default = "default_max_text_chars")]
    pub max_text_chars: usize,
    /// Optional TOML lexicon replacing the built-in word lists.
    #[serde(default)]
    pub lexicon_path: Option<PathBuf>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            title_max_chars: default_title_max_chars(),
            summary_max_chars: default_summary_max_chars(),
            max_text_chars: default_max_text_chars(),
            lexicon_path: None,
        }
    }
}

fn default_title_max_chars() -> usize {
    60
}
fn default_summary_max_chars() -> usize {
    300
}
fn default_max_text_chars() -> usize {
    10_000
}

/// External AI provider settings.
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_tokens() -> u32 {
    500
}

impl UpstreamConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Checks cross-field constraints that serde defaults cannot express.
pub fn validate(config: &Config) -> Result<()> {
    // Validate analysis limits
    if config.analysis.title_max_chars < 10 {
        anyhow::bail!("analysis.title_max_chars must be >= 10");
    }
    if config.analysis.summary_max_chars < 20 {
        anyhow::bail!("analysis.summary_max_chars must be >= 20");
    }
    if config.analysis.max_text_chars == 0 {
        anyhow::bail!("analysis.max_text_chars must be > 0");
    }

    // Validate upstream
    if config.upstream.timeout_secs == 0 {
        anyhow::bail!("upstream.timeout_secs must be > 0");
    }
    if config.upstream.is_enabled() && config.upstream.model.is_none() {
        anyhow::bail!(
            "upstream.model must be specified when provider is '{}'",
            config.upstream.provider
        );
    }

    match config.upstream.provider.as_str() {
        "disabled" | "openai" => {}
        other => anyhow::bail!(
            "Unknown upstream provider: '{}'. Must be disabled or openai.",
            other
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &str) -> Config {
        let content = format!(
            "[db]\npath = \"/tmp/insight.sqlite\"\n\n[server]\nbind = \"127.0.0.1:8000\"\n\n{}",
            extra
        );
        toml::from_str(&content).unwrap()
    }

    #[test]
    fn test_defaults_apply() {
        let cfg = parse("");
        assert_eq!(cfg.analysis.title_max_chars, 60);
        assert_eq!(cfg.analysis.summary_max_chars, 300);
        assert_eq!(cfg.analysis.max_text_chars, 10_000);
        assert_eq!(cfg.upstream.provider, "disabled");
        assert_eq!(cfg.upstream.timeout_secs, 30);
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_openai_requires_model() {
        let cfg = parse("[upstream]\nprovider = \"openai\"\n");
        let err = validate(&cfg).unwrap_err().to_string();
        assert!(err.contains("upstream.model"), "got: {}", err);

        let cfg = parse("[upstream]\nprovider = \"openai\"\nmodel = \"gpt-3.5-turbo\"\n");
        assert!(validate(&cfg).is_ok());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let cfg = parse("[upstream]\nprovider = \"llama\"\nmodel = \"x\"\n");
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let cfg = parse("[upstream]\ntimeout_secs = 0\n");
        assert!(validate(&cfg).is_err());
    }

    #[test]
    fn test_tiny_title_limit_rejected() {
        let cfg = parse("[analysis]\ntitle_max_chars = 3\n");
        assert!(validate(&cfg).is_err());
    }
}
