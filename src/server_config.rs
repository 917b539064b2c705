use std::{env, path::Path};

use config::Config;
use lazy_static::lazy_static;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model_id")]
    pub id: String,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: default_model_id(),
            temperature: default_temperature(),
        }
    }
}

/// External analysis provider configuration. API keys come from the
/// environment and decide which strategies the fallback chain attempts;
/// endpoints are overridable so tests can point at a dead address.
#[derive(Debug, Clone, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub huggingface_api_key: Option<String>,
    #[serde(default = "default_openai_endpoint")]
    pub openai_endpoint: String,
    #[serde(default = "default_huggingface_endpoint")]
    pub huggingface_endpoint: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_summarization_model")]
    pub summarization_model: String,
    #[serde(default = "default_sentiment_model")]
    pub sentiment_model: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            huggingface_api_key: None,
            openai_endpoint: default_openai_endpoint(),
            huggingface_endpoint: default_huggingface_endpoint(),
            timeout_ms: default_timeout_ms(),
            summarization_model: default_summarization_model(),
            sentiment_model: default_sentiment_model(),
        }
    }
}

fn default_max_batch_size() -> usize {
    100
}

fn default_model_id() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_temperature() -> f64 {
    0.3
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_huggingface_endpoint() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_summarization_model() -> String {
    "facebook/bart-large-cnn".to_string()
}

fn default_sentiment_model() -> String {
    "cardiffnlp/twitter-roberta-base-sentiment-latest".to_string()
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    settings: Settings,
    #[serde(default)]
    model: ModelConfig,
    #[serde(default)]
    providers: ProvidersConfig,
}

#[derive(Debug)]
pub struct ServerConfig {
    pub settings: Settings,
    pub model: ModelConfig,
    pub providers: ProvidersConfig,
}

impl std::fmt::Display for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server Config:\n{:?}\n\nModel: {:?}\n\nProviders: openai={} huggingface={} timeout={}ms",
            self.settings,
            self.model,
            self.providers.openai_api_key.is_some(),
            self.providers.huggingface_api_key.is_some(),
            self.providers.timeout_ms,
        )
    }
}

lazy_static! {
    pub static ref cfg: ServerConfig = {
        let root = env::var("APP_DIR").unwrap_or_else(|_| {
            env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string())
        });
        let path = Path::new(&root).join("config").display().to_string();

        let cfg_file: ConfigFile = Config::builder()
            .add_source(config::File::with_name(&path).required(false))
            .build()
            .expect("config.toml could not be read")
            .try_deserialize()
            .expect("config.toml is invalid");

        let ConfigFile {
            settings,
            model,
            mut providers,
        } = cfg_file;

        // Environment always wins for credentials.
        if let Ok(key) = env::var("OPENAI_API_KEY") {
            providers.openai_api_key = Some(key);
        }
        if let Ok(key) = env::var("HUGGINGFACE_API_KEY") {
            providers.huggingface_api_key = Some(key);
        }

        ServerConfig {
            settings,
            model,
            providers,
        }
    };
}
