use serde::Deserialize;

/// Which key-value backend the store talks to
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Redis,
    /// In-process map, nothing survives a restart
    Memory,
}

/// What listing all users does when a stored value cannot be decoded
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CorruptRecordPolicy {
    /// Fail the whole listing, naming the offending key
    #[default]
    Abort,
    /// Log the offending key and leave it out of the listing
    Skip,
}

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    #[serde(default = "default_store_backend")]
    pub store_backend: BackendKind,

    /// Optimistic write attempts per add/remove before reporting a conflict
    #[serde(default = "default_max_write_attempts")]
    pub max_write_attempts: u32,

    #[serde(default, rename = "corrupt_records")]
    pub corrupt_record_policy: CorruptRecordPolicy,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_redis_url() -> String {
    "redis://redis-service:6379/0".to_string()
}

fn default_store_backend() -> BackendKind {
    BackendKind::Redis
}

fn default_max_write_attempts() -> u32 {
    5
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
