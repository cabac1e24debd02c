use async_trait::async_trait;
use std::{env, path::PathBuf};
use tracing::{debug, info};

pub const LOG_LEVEL_KEY: &str = "PACKETDECODE_LOG_LEVEL";
pub const LOG_DIR_KEY: &str = "PACKETDECODE_LOG_DIR";
pub const SCRIPT_KEY: &str = "PACKETDECODE_SCRIPT";
pub const ENV_FILE_KEY: &str = "PACKETDECODE_ENV_FILE";

#[async_trait]
pub trait ConfigManagerType: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    fn clone_box(&self) -> Box<dyn ConfigManagerType>;
    fn debug_box(&self) -> String;
}

pub struct ConfigManager(pub Box<dyn ConfigManagerType>);

impl Clone for ConfigManager {
    fn clone(&self) -> Self {
        ConfigManager(self.0.clone_box())
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0.debug_box())
    }
}

/// Configuration from the process environment, seeded from a `.env` file.
#[derive(Clone, Debug)]
pub struct EnvConfigManager {
    env_file: PathBuf,
}

impl EnvConfigManager {
    /// Loads `env_file` into the environment if it exists. Variables that are
    /// already set win over the file.
    pub fn new(env_file: PathBuf) -> Box<Self> {
        if env_file.exists() {
            dotenvy::from_path(&env_file).ok();
            info!("Loaded .env from {}", env_file.display());
        } else {
            debug!("no .env at {}", env_file.display());
        }

        Box::new(Self { env_file })
    }
}

#[async_trait]
impl ConfigManagerType for EnvConfigManager {
    async fn get(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }

    fn clone_box(&self) -> Box<dyn ConfigManagerType> {
        Box::new(self.clone())
    }

    fn debug_box(&self) -> String {
        format!("EnvConfigManager({})", self.env_file.display())
    }
}

/// Where the `.env` file lives: `$PACKETDECODE_ENV_FILE`, else `./.env`.
pub fn resolve_env_file() -> PathBuf {
    env::var(ENV_FILE_KEY)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".env"))
}

/// Settings the command line tool needs, before flag overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
    pub script: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
            script: None,
        }
    }
}

impl Settings {
    pub async fn load(config: &ConfigManager) -> Self {
        let defaults = Settings::default();
        Self {
            log_level: config.0.get(LOG_LEVEL_KEY).await.unwrap_or(defaults.log_level),
            log_dir: config.0.get(LOG_DIR_KEY).await.map(PathBuf::from),
            script: config.0.get(SCRIPT_KEY).await.map(PathBuf::from),
        }
    }
}
