use thiserror::Error;

pub const ENV_PROJECT_ID: &str = "BASE_CONNECT_PROJECT_ID";
pub const ENV_RUNTIME_PROFILE: &str = "BASE_CONNECT_RUNTIME_PROFILE";
pub const ENV_EIP1193_PROXY_URL: &str = "BASE_CONNECT_EIP1193_PROXY_URL";
pub const ENV_BLOCKCHAIN_API_URL: &str = "BASE_CONNECT_BLOCKCHAIN_API_URL";
pub const ENV_RPC_TIMEOUT_MS: &str = "BASE_CONNECT_RPC_TIMEOUT_MS";
pub const ENV_DEV_PRIVATE_KEY: &str = "BASE_CONNECT_DEV_PRIVATE_KEY";

const DEFAULT_BLOCKCHAIN_API_URL: &str = "https://rpc.walletconnect.org/v1/";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("BASE_CONNECT_PROJECT_ID is not set")]
    MissingProjectId,
    #[error("invalid {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RuntimeProfile {
    #[default]
    Development,
    Production,
}

#[derive(Debug, Clone)]
pub struct AdapterConfig {
    /// Cloud project id; keys the blockchain API used for balance reads.
    pub project_id: String,
    pub runtime_profile: RuntimeProfile,
    pub eip1193_proxy_url: Option<String>,
    pub blockchain_api_url: String,
    pub rpc_timeout_ms: u64,
    pub dev_private_key: Option<String>,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            runtime_profile: RuntimeProfile::Development,
            eip1193_proxy_url: None,
            blockchain_api_url: DEFAULT_BLOCKCHAIN_API_URL.to_owned(),
            rpc_timeout_ms: 15_000,
            dev_private_key: None,
        }
    }
}

impl AdapterConfig {
    /// Reads the process environment on native targets. On wasm32 the values
    /// are baked in at compile time.
    pub fn from_env() -> Result<Self, ConfigError> {
        #[cfg(target_arch = "wasm32")]
        {
            Self::from_lookup(compile_time_env)
        }
        #[cfg(not(target_arch = "wasm32"))]
        {
            Self::from_lookup(|key| std::env::var(key).ok())
        }
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let project_id = get(ENV_PROJECT_ID).ok_or(ConfigError::MissingProjectId)?;

        let runtime_profile = match get(ENV_RUNTIME_PROFILE).as_deref() {
            None | Some("development") | Some("dev") => RuntimeProfile::Development,
            Some("production") | Some("prod") => RuntimeProfile::Production,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: ENV_RUNTIME_PROFILE,
                    value: other.to_owned(),
                })
            }
        };

        let defaults = Self::default();
        let rpc_timeout_ms = match get(ENV_RPC_TIMEOUT_MS) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: ENV_RPC_TIMEOUT_MS,
                value: raw,
            })?,
            None => defaults.rpc_timeout_ms,
        };

        Ok(Self {
            project_id,
            runtime_profile,
            eip1193_proxy_url: get(ENV_EIP1193_PROXY_URL),
            blockchain_api_url: get(ENV_BLOCKCHAIN_API_URL)
                .unwrap_or(defaults.blockchain_api_url),
            rpc_timeout_ms,
            dev_private_key: get(ENV_DEV_PRIVATE_KEY),
        })
    }

    pub fn strict_runtime_required(&self) -> bool {
        self.runtime_profile == RuntimeProfile::Production
    }
}

#[cfg(target_arch = "wasm32")]
fn compile_time_env(key: &str) -> Option<String> {
    let value = match key {
        ENV_PROJECT_ID => option_env!("BASE_CONNECT_PROJECT_ID"),
        ENV_RUNTIME_PROFILE => option_env!("BASE_CONNECT_RUNTIME_PROFILE"),
        ENV_BLOCKCHAIN_API_URL => option_env!("BASE_CONNECT_BLOCKCHAIN_API_URL"),
        ENV_RPC_TIMEOUT_MS => option_env!("BASE_CONNECT_RPC_TIMEOUT_MS"),
        _ => None,
    };
    value.map(str::to_owned)
}
