use serde::{Deserialize, Serialize};

/// Top-level configuration for the PDPO delivery subsystem.
///
/// Channel presence is a deployment-time choice: a deployment may wire the
/// queue channel, the direct HTTP channel, or both.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    pub async_channel: Option<AsyncChannelConfig>,
    pub sync_channel: Option<SyncChannelConfig>,
}

/// Configuration for the queue-backed (asynchronous) channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AsyncChannelConfig {
    #[serde(default = "default_protocol")]
    pub protocol: String,
    pub connection_string: String,
    pub queue_name: String,
    #[serde(default = "default_log_type")]
    pub log_type: String,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_async_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_send_timeout_seconds")]
    pub send_timeout_seconds: u64,
}

/// Configuration for the direct-call (synchronous) channel.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SyncChannelConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_sync_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_connect_timeout_seconds")]
    pub connect_timeout_seconds: u64,
    #[serde(default = "default_read_timeout_seconds")]
    pub read_timeout_seconds: u64,
}

fn default_protocol() -> String {
    "amqps".to_string()
}

fn default_log_type() -> String {
    "PDPO".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_async_retry_delay_ms() -> u64 {
    1_000
}

fn default_send_timeout_seconds() -> u64 {
    10
}

fn default_base_url() -> String {
    "http://localhost:9999".to_string()
}

fn default_endpoint() -> String {
    "/log/pdpo".to_string()
}

fn default_max_attempts() -> u32 {
    4
}

fn default_sync_retry_delay_ms() -> u64 {
    15_000
}

fn default_connect_timeout_seconds() -> u64 {
    2
}

fn default_read_timeout_seconds() -> u64 {
    5
}

pub fn load_config() -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::with_name("pdpo-logging").required(false))
        .add_source(config::Environment::with_prefix("PDPO_LOGGING").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

pub fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if let Some(async_channel) = &cfg.async_channel {
        if async_channel.connection_string.trim().is_empty() {
            anyhow::bail!("Async channel connection_string must not be blank");
        }
        if async_channel.queue_name.trim().is_empty() {
            anyhow::bail!("Async channel queue_name must not be blank");
        }
        if async_channel.log_type.trim().is_empty() {
            anyhow::bail!("Async channel log_type must not be blank");
        }
        if async_channel.max_retries < 1 {
            anyhow::bail!("Async channel max_retries must be at least 1");
        }
    }

    if let Some(sync_channel) = &cfg.sync_channel {
        if sync_channel.base_url.trim().is_empty() {
            anyhow::bail!("Sync channel base_url must not be blank");
        }
        if sync_channel.endpoint.trim().is_empty() {
            anyhow::bail!("Sync channel endpoint must not be blank");
        }
        if sync_channel.max_attempts < 1 {
            anyhow::bail!("Sync channel max_attempts must be at least 1");
        }
    }

    Ok(())
}
