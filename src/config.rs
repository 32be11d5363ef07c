use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

/// Runtime configuration, merged from three layers in increasing precedence:
/// built-in defaults, `config.toml` in the data directory, environment
/// variables (`DEBRIEF_*`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_host: String,
    pub api_port: u16,
    pub data_dir: PathBuf,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Global deadline for one analysis job, all steps included.
    pub analysis_timeout_ms: u64,
    pub social_write_attempts: u32,
    pub social_write_base_delay_ms: u64,
    pub notify_endpoint: Option<String>,
    pub notify_api_key: Option<String>,
    pub notify_from: String,
    pub token_secret: String,
    pub token_ttl_secs: u64,
    /// Per-provider webhook signing secrets, keyed by source ("zoom", "google").
    pub webhook_secrets: HashMap<String, String>,
}

/// Optional on-disk overrides. Every field is optional so a partial file works.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    api_host: Option<String>,
    api_port: Option<u16>,
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    analysis_timeout_ms: Option<u64>,
    social_write_attempts: Option<u32>,
    social_write_base_delay_ms: Option<u64>,
    notify_endpoint: Option<String>,
    notify_api_key: Option<String>,
    notify_from: Option<String>,
    token_secret: Option<String>,
    token_ttl_secs: Option<u64>,
    #[serde(default)]
    webhook_secrets: HashMap<String, String>,
}

fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("DEBRIEF_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("debrief")
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let data_dir = default_data_dir();

        let file: FileConfig = {
            let path = data_dir.join("config.toml");
            if path.exists() {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed reading {}", path.display()))?;
                info!("Loaded configuration from {}", path.display());
                toml::from_str(&raw)
                    .with_context(|| format!("Invalid TOML in {}", path.display()))?
            } else {
                FileConfig::default()
            }
        };

        let mut webhook_secrets = file.webhook_secrets;
        for source in ["zoom", "google"] {
            let var = format!("DEBRIEF_WEBHOOK_SECRET_{}", source.to_uppercase());
            if let Some(secret) = env_var(&var) {
                webhook_secrets.insert(source.to_string(), secret);
            }
        }

        Ok(Self {
            api_host: env_var("DEBRIEF_API_HOST")
                .or(file.api_host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            api_port: env_var("DEBRIEF_API_PORT")
                .and_then(|v| v.parse().ok())
                .or(file.api_port)
                .unwrap_or(8790),
            data_dir,
            openai_api_key: env_var("DEBRIEF_OPENAI_API_KEY").or(file.openai_api_key),
            openai_model: env_var("DEBRIEF_OPENAI_MODEL")
                .or(file.openai_model)
                .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            analysis_timeout_ms: env_var("DEBRIEF_ANALYSIS_TIMEOUT_MS")
                .and_then(|v| v.parse().ok())
                .or(file.analysis_timeout_ms)
                .unwrap_or(180_000),
            social_write_attempts: file.social_write_attempts.unwrap_or(3),
            social_write_base_delay_ms: file.social_write_base_delay_ms.unwrap_or(500),
            notify_endpoint: env_var("DEBRIEF_NOTIFY_ENDPOINT").or(file.notify_endpoint),
            notify_api_key: env_var("DEBRIEF_NOTIFY_API_KEY").or(file.notify_api_key),
            notify_from: env_var("DEBRIEF_NOTIFY_FROM")
                .or(file.notify_from)
                .unwrap_or_else(|| "debrief <noreply@debrief.app>".to_string()),
            token_secret: env_var("DEBRIEF_TOKEN_SECRET")
                .or(file.token_secret)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            token_ttl_secs: file.token_ttl_secs.unwrap_or(7 * 24 * 3600),
            webhook_secrets,
        })
    }
}
