use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, U256};
use serde_json::Value;

use base_connect_core::{Balance, ChainInfo, PortError};

use crate::AdapterConfig;

/// Reads native balances through the project-keyed blockchain API.
#[derive(Debug, Clone)]
pub struct BalanceAdapter {
    mode: BalanceMode,
}

#[derive(Debug, Clone)]
enum BalanceMode {
    InMemory(Arc<Mutex<HashMap<(u64, Address), U256>>>),
    Http(HttpRuntime),
}

#[derive(Debug, Clone)]
struct HttpRuntime {
    api_url: String,
    project_id: String,
    client: reqwest::Client,
}

impl BalanceAdapter {
    pub fn in_memory() -> Self {
        Self {
            mode: BalanceMode::InMemory(Arc::new(Mutex::new(HashMap::new()))),
        }
    }

    pub fn with_config(config: &AdapterConfig) -> Result<Self, PortError> {
        if config.project_id.trim().is_empty() {
            return Err(PortError::Validation(
                "blockchain API requires a project id".to_owned(),
            ));
        }

        let builder = reqwest::Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(std::time::Duration::from_millis(config.rpc_timeout_ms));
        let client = builder
            .build()
            .map_err(|e| PortError::Transport(format!("balance client init failed: {e}")))?;

        Ok(Self {
            mode: BalanceMode::Http(HttpRuntime {
                api_url: config.blockchain_api_url.clone(),
                project_id: config.project_id.clone(),
                client,
            }),
        })
    }

    pub fn set_balance(&self, chain_id: u64, address: Address, value: U256) -> Result<(), PortError> {
        match &self.mode {
            BalanceMode::InMemory(balances) => {
                balances
                    .lock()
                    .map_err(|e| PortError::Transport(format!("balance lock poisoned: {e}")))?
                    .insert((chain_id, address), value);
                Ok(())
            }
            BalanceMode::Http(_) => Err(PortError::NotImplemented(
                "set_balance is only available in memory",
            )),
        }
    }

    pub async fn fetch_balance(
        &self,
        chain: &ChainInfo,
        address: Address,
    ) -> Result<Balance, PortError> {
        let value = match &self.mode {
            BalanceMode::InMemory(balances) => balances
                .lock()
                .map_err(|e| PortError::Transport(format!("balance lock poisoned: {e}")))?
                .get(&(chain.chain_id, address))
                .copied()
                .unwrap_or(U256::ZERO),
            BalanceMode::Http(http) => http.get_balance(chain.chain_id, address).await?,
        };
        Ok(Balance::native(chain, value))
    }
}

impl HttpRuntime {
    async fn get_balance(&self, chain_id: u64, address: Address) -> Result<U256, PortError> {
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "eth_getBalance",
            "params": [address.to_string(), "latest"],
        });
        let chain_param = format!("eip155:{chain_id}");
        tracing::debug!(%address, chain = %chain_param, "fetching balance");

        let response = self
            .client
            .post(&self.api_url)
            .query(&[
                ("chainId", chain_param.as_str()),
                ("projectId", self.project_id.as_str()),
            ])
            .json(&payload)
            .send()
            .await
            .map_err(|e| PortError::Transport(format!("balance request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("balance json decode failed: {e}")))?;
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "balance status {status}: {body}"
            )));
        }
        if let Some(err) = body.get("error") {
            return Err(PortError::Transport(format!("balance rpc error: {err}")));
        }
        let raw = body
            .get("result")
            .and_then(Value::as_str)
            .ok_or_else(|| PortError::Transport("eth_getBalance missing result".to_owned()))?;
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid balance quantity {raw}: {e}")))
    }
}
