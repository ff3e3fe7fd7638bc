use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use serde_json::Value;

use base_connect_core::{ChainInfo, PortError, ProviderEvent, ProviderEventKind, ProviderPort};

use crate::AdapterConfig;

/// Chain a fresh local signer starts on. Not Base, so the switch flow is
/// reachable in development.
const LOCAL_SIGNER_START_CHAIN: u64 = 1;

#[derive(Debug, Clone)]
pub struct Eip1193Adapter {
    mode: ProviderMode,
    state: Arc<Mutex<ProviderState>>,
    #[cfg(target_arch = "wasm32")]
    hooks: Arc<Mutex<BrowserHooks>>,
}

#[derive(Debug, Clone)]
enum ProviderMode {
    Disabled(String),
    LocalSigner(PrivateKeySigner),
    #[cfg(not(target_arch = "wasm32"))]
    Proxy(ProxyRuntime),
    #[cfg(target_arch = "wasm32")]
    Browser,
}

#[derive(Debug, Clone)]
#[cfg(not(target_arch = "wasm32"))]
struct ProxyRuntime {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Debug, Clone)]
struct ProviderState {
    accounts: Vec<Address>,
    chain_id: u64,
    authorized: bool,
    event_seq: u64,
    events: Vec<ProviderEvent>,
}

impl Default for ProviderState {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            chain_id: LOCAL_SIGNER_START_CHAIN,
            authorized: false,
            event_seq: 0,
            events: Vec::new(),
        }
    }
}

impl ProviderState {
    fn push_event(&mut self, kind: ProviderEventKind, value: String) {
        self.event_seq = self.event_seq.saturating_add(1);
        let sequence = self.event_seq;
        self.events.push(ProviderEvent {
            sequence,
            kind,
            value,
        });
    }

    fn set_accounts(&mut self, accounts: Vec<Address>) {
        if self.accounts != accounts {
            let payload = accounts_payload(&accounts);
            self.accounts = accounts;
            self.push_event(ProviderEventKind::AccountsChanged, payload);
        }
    }

    fn set_chain_id(&mut self, chain_id: u64) {
        if self.chain_id != chain_id {
            self.chain_id = chain_id;
            self.push_event(ProviderEventKind::ChainChanged, chain_id.to_string());
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default)]
struct BrowserHooks {
    accounts_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    chain_changed: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
    disconnect: Option<wasm_bindgen::closure::Closure<dyn FnMut(wasm_bindgen::JsValue)>>,
}

impl Default for Eip1193Adapter {
    fn default() -> Self {
        Self::with_config(&AdapterConfig::default())
    }
}

impl Eip1193Adapter {
    pub fn with_config(config: &AdapterConfig) -> Self {
        #[cfg(target_arch = "wasm32")]
        let mode = if browser_provider_available() {
            ProviderMode::Browser
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 browser provider not found in production runtime profile".to_owned(),
            )
        } else {
            local_signer_mode(config)
        };

        #[cfg(not(target_arch = "wasm32"))]
        let mode = if let Some(ref base_url) = config.eip1193_proxy_url {
            let timeout = std::time::Duration::from_millis(config.rpc_timeout_ms);
            match reqwest::blocking::Client::builder().timeout(timeout).build() {
                Ok(client) => ProviderMode::Proxy(ProxyRuntime {
                    base_url: base_url.clone(),
                    client,
                }),
                Err(e) => ProviderMode::Disabled(format!(
                    "failed to initialize EIP-1193 proxy client: {e}"
                )),
            }
        } else if config.strict_runtime_required() {
            ProviderMode::Disabled(
                "EIP-1193 proxy URL not configured in production runtime profile".to_owned(),
            )
        } else {
            local_signer_mode(config)
        };

        if let ProviderMode::Disabled(ref reason) = mode {
            tracing::warn!("wallet provider disabled: {reason}");
        }

        let adapter = Self {
            mode,
            state: Arc::new(Mutex::new(ProviderState::default())),
            #[cfg(target_arch = "wasm32")]
            hooks: Arc::new(Mutex::new(BrowserHooks::default())),
        };

        #[cfg(target_arch = "wasm32")]
        if matches!(adapter.mode, ProviderMode::Browser) {
            let _ = adapter.refresh_browser_snapshot();
        }

        adapter
    }

    /// Local signer mode with a caller-supplied key. Used by tests and demos
    /// that need signatures which really verify.
    pub fn with_local_signer(signer: PrivateKeySigner) -> Self {
        Self {
            mode: ProviderMode::LocalSigner(signer),
            state: Arc::new(Mutex::new(ProviderState::default())),
            #[cfg(target_arch = "wasm32")]
            hooks: Arc::new(Mutex::new(BrowserHooks::default())),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        match self.mode {
            ProviderMode::Disabled(_) => "disabled",
            ProviderMode::LocalSigner(_) => "local signer",
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => "JSON-RPC proxy",
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => "browser wallet",
        }
    }

    fn check_mode(&self) -> Result<(), PortError> {
        if let ProviderMode::Disabled(reason) = &self.mode {
            return Err(PortError::Policy(reason.clone()));
        }
        Ok(())
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, ProviderState>, PortError> {
        self.state
            .lock()
            .map_err(|e| PortError::Transport(format!("provider lock poisoned: {e}")))
    }

    pub fn debug_inject_accounts_changed(&self, accounts: Vec<Address>) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.authorized = !accounts.is_empty();
        g.set_accounts(accounts);
        Ok(())
    }

    pub fn debug_inject_chain_changed(&self, chain_id: u64) -> Result<(), PortError> {
        self.lock_state()?.set_chain_id(chain_id);
        Ok(())
    }

    pub fn debug_inject_disconnect(&self) -> Result<(), PortError> {
        let mut g = self.lock_state()?;
        g.authorized = false;
        g.accounts.clear();
        g.push_event(ProviderEventKind::Disconnected, String::new());
        Ok(())
    }

    fn local_accounts(&self, signer: &PrivateKeySigner, prompt: bool) -> Result<Vec<Address>, PortError> {
        let mut g = self.lock_state()?;
        if prompt {
            g.authorized = true;
        }
        if !g.authorized {
            return Ok(Vec::new());
        }
        g.set_accounts(vec![signer.address()]);
        Ok(g.accounts.clone())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn proxy_call(&self, method: &str, params: Value) -> Result<Value, PortError> {
        let proxy = match &self.mode {
            ProviderMode::Proxy(proxy) => proxy,
            ProviderMode::Disabled(reason) => return Err(PortError::Policy(reason.clone())),
            _ => {
                return Err(PortError::NotImplemented(
                    "eip1193 proxy runtime not enabled",
                ))
            }
        };

        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });
        tracing::debug!(method, "eip1193 proxy request");
        let response = proxy
            .client
            .post(&proxy.base_url)
            .json(&payload)
            .send()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy request failed: {e}")))?;
        let status = response.status();
        let body: Value = response
            .json()
            .map_err(|e| PortError::Transport(format!("eip1193 proxy json decode failed: {e}")))?;
        if let Some(err) = body.get("error") {
            return Err(rpc_error(err));
        }
        if !status.is_success() {
            return Err(PortError::Transport(format!(
                "eip1193 proxy status {}: {}",
                status, body
            )));
        }
        body.get("result")
            .cloned()
            .ok_or_else(|| PortError::Transport("eip1193 proxy missing result".to_owned()))
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn proxy_accounts(&self, method: &str) -> Result<Vec<Address>, PortError> {
        let result = self.proxy_call(method, serde_json::json!([]))?;
        let accounts = parse_accounts(method, &result)?;
        let mut g = self.lock_state()?;
        g.authorized = !accounts.is_empty();
        g.set_accounts(accounts.clone());
        Ok(accounts)
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn proxy_switch_chain(&self, chain: &ChainInfo) -> Result<(), PortError> {
        let switch_params = serde_json::json!([{ "chainId": hex_chain_id(chain.chain_id) }]);
        match self.proxy_call("wallet_switchEthereumChain", switch_params.clone()) {
            Ok(_) => {}
            Err(e) if e.is_unrecognized_chain() => {
                tracing::info!(chain_id = chain.chain_id, "wallet does not know chain; adding it");
                self.proxy_call("wallet_addEthereumChain", add_chain_params(chain))?;
                self.proxy_call("wallet_switchEthereumChain", switch_params)?;
            }
            Err(e) => return Err(e),
        }
        self.lock_state()?.set_chain_id(chain.chain_id);
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    pub fn is_browser(&self) -> bool {
        matches!(self.mode, ProviderMode::Browser)
    }

    #[cfg(target_arch = "wasm32")]
    async fn wasm_accounts(&self, method: &str) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        let result = self.wasm_request(method, serde_json::json!([])).await?;
        let accounts = parse_accounts(method, &result)?;
        let mut g = self.lock_state()?;
        g.authorized = !accounts.is_empty();
        g.set_accounts(accounts.clone());
        Ok(accounts)
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_request_accounts_async(&self) -> Result<Vec<Address>, PortError> {
        self.wasm_accounts("eth_requestAccounts").await
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_accounts_async(&self) -> Result<Vec<Address>, PortError> {
        self.wasm_accounts("eth_accounts").await
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_chain_id_async(&self) -> Result<u64, PortError> {
        self.check_mode()?;
        let result = self
            .wasm_request("eth_chainId", serde_json::json!([]))
            .await?;
        let chain_id = json_chain_id_to_u64(&result)?;
        self.lock_state()?.set_chain_id(chain_id);
        Ok(chain_id)
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_personal_sign_async(
        &self,
        message: &str,
        signer: Address,
    ) -> Result<Bytes, PortError> {
        self.check_mode()?;
        let params = personal_sign_params(message, signer);
        let result = self.wasm_request("personal_sign", params).await?;
        parse_signature(&result)
    }

    #[cfg(target_arch = "wasm32")]
    pub async fn wasm_switch_chain_async(&self, chain: &ChainInfo) -> Result<(), PortError> {
        self.check_mode()?;
        let switch_params = serde_json::json!([{ "chainId": hex_chain_id(chain.chain_id) }]);
        match self
            .wasm_request("wallet_switchEthereumChain", switch_params.clone())
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_unrecognized_chain() => {
                self.wasm_request("wallet_addEthereumChain", add_chain_params(chain))
                    .await?;
                self.wasm_request("wallet_switchEthereumChain", switch_params)
                    .await?;
            }
            Err(e) => return Err(e),
        }
        self.lock_state()?.set_chain_id(chain.chain_id);
        Ok(())
    }

    #[cfg(target_arch = "wasm32")]
    async fn wasm_request(&self, method: &str, params: Value) -> Result<Value, PortError> {
        use wasm_bindgen::JsCast;

        let provider = browser_provider()?;
        let request_fn = get_prop(&provider, "request")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .ok_or(PortError::NotImplemented(
                "window.ethereum.request is unavailable",
            ))?;

        let request = serde_json::json!({
            "method": method,
            "params": params,
        });
        let request_js = serde_wasm_bindgen::to_value(&request)
            .map_err(|e| PortError::Transport(format!("failed to encode wasm request: {e}")))?;
        let promise_js = request_fn.call1(&provider, &request_js).map_err(|e| {
            PortError::Transport(format!("provider request dispatch failed: {e:?}"))
        })?;
        let promise = promise_js.dyn_into::<js_sys::Promise>().map_err(|_| {
            PortError::Transport("provider request did not return Promise".to_owned())
        })?;
        let result_js = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(js_rpc_error)?;
        if result_js.is_null() || result_js.is_undefined() {
            return Ok(Value::Null);
        }
        serde_wasm_bindgen::from_value(result_js)
            .map_err(|e| PortError::Transport(format!("failed to decode wasm response: {e}")))
    }

    #[cfg(target_arch = "wasm32")]
    fn refresh_browser_snapshot(&self) -> Result<(), PortError> {
        use wasm_bindgen::JsValue;

        let provider = browser_provider()?;
        let selected = get_prop(&provider, "selectedAddress").unwrap_or(JsValue::NULL);
        let chain = get_prop(&provider, "chainId").unwrap_or(JsValue::NULL);

        let mut g = self.lock_state()?;
        if let Some(s) = selected.as_string() {
            let parsed: Address = s
                .parse()
                .map_err(|e| PortError::Validation(format!("invalid selectedAddress: {e}")))?;
            g.set_accounts(vec![parsed]);
        }
        if !chain.is_null() && !chain.is_undefined() {
            g.set_chain_id(js_chain_id_to_u64(chain)?);
        }
        Ok(())
    }

    /// Subscribes to `accountsChanged`, `chainChanged` and `disconnect`.
    /// Registration is deferred until after the first connect; some wallets
    /// leave `eth_requestAccounts` pending when listeners are attached at load.
    #[cfg(target_arch = "wasm32")]
    pub fn register_browser_hooks(&self) -> Result<(), PortError> {
        use wasm_bindgen::{closure::Closure, JsCast, JsValue};

        let provider = browser_provider()?;
        let on_fn = get_prop(&provider, "on")
            .ok()
            .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            .or_else(|| {
                get_prop(&provider, "addListener")
                    .ok()
                    .and_then(|v| v.dyn_into::<js_sys::Function>().ok())
            })
            .ok_or(PortError::NotImplemented(
                "provider does not expose on/addListener",
            ))?;

        let mut hooks = self
            .hooks
            .lock()
            .map_err(|e| PortError::Transport(format!("provider hooks lock poisoned: {e}")))?;
        if hooks.accounts_changed.is_some() {
            return Ok(());
        }

        let state_for_accounts = Arc::clone(&self.state);
        let accounts_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            let mut accounts = Vec::new();
            if js_sys::Array::is_array(&value) {
                for item in js_sys::Array::from(&value).iter() {
                    if let Some(addr) = item.as_string().and_then(|s| s.parse::<Address>().ok()) {
                        accounts.push(addr);
                    }
                }
            }
            if let Ok(mut g) = state_for_accounts.lock() {
                g.authorized = !accounts.is_empty();
                g.set_accounts(accounts);
            }
        });

        let state_for_chain = Arc::clone(&self.state);
        let chain_cb = Closure::<dyn FnMut(JsValue)>::new(move |value: JsValue| {
            if let Ok(chain_id) = js_chain_id_to_u64(value) {
                if let Ok(mut g) = state_for_chain.lock() {
                    g.set_chain_id(chain_id);
                }
            }
        });

        let state_for_disconnect = Arc::clone(&self.state);
        let disconnect_cb = Closure::<dyn FnMut(JsValue)>::new(move |_value: JsValue| {
            if let Ok(mut g) = state_for_disconnect.lock() {
                g.authorized = false;
                g.accounts.clear();
                g.push_event(ProviderEventKind::Disconnected, String::new());
            }
        });

        for (event, cb) in [
            ("accountsChanged", &accounts_cb),
            ("chainChanged", &chain_cb),
            ("disconnect", &disconnect_cb),
        ] {
            on_fn
                .call2(&provider, &JsValue::from_str(event), cb.as_ref().unchecked_ref())
                .map_err(|e| PortError::Transport(format!("register {event} failed: {e:?}")))?;
        }

        hooks.accounts_changed = Some(accounts_cb);
        hooks.chain_changed = Some(chain_cb);
        hooks.disconnect = Some(disconnect_cb);
        Ok(())
    }
}

impl ProviderPort for Eip1193Adapter {
    fn request_accounts(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        match &self.mode {
            ProviderMode::LocalSigner(signer) => self.local_accounts(signer, true),
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => self.proxy_accounts("eth_requestAccounts"),
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => {
                self.refresh_browser_snapshot()?;
                let g = self.lock_state()?;
                if g.accounts.is_empty() {
                    return Err(PortError::Policy(
                        "no provider accounts available; unlock/connect wallet".to_owned(),
                    ));
                }
                Ok(g.accounts.clone())
            }
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
        }
    }

    fn accounts(&self) -> Result<Vec<Address>, PortError> {
        self.check_mode()?;
        match &self.mode {
            ProviderMode::LocalSigner(signer) => self.local_accounts(signer, false),
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => self.proxy_accounts("eth_accounts"),
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => {
                self.refresh_browser_snapshot()?;
                Ok(self.lock_state()?.accounts.clone())
            }
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
        }
    }

    fn chain_id(&self) -> Result<u64, PortError> {
        self.check_mode()?;

        #[cfg(target_arch = "wasm32")]
        if matches!(self.mode, ProviderMode::Browser) {
            self.refresh_browser_snapshot()?;
        }

        #[cfg(not(target_arch = "wasm32"))]
        if matches!(self.mode, ProviderMode::Proxy(_)) {
            let result = self.proxy_call("eth_chainId", serde_json::json!([]))?;
            let chain_id = json_chain_id_to_u64(&result)?;
            self.lock_state()?.set_chain_id(chain_id);
            return Ok(chain_id);
        }

        Ok(self.lock_state()?.chain_id)
    }

    fn personal_sign(&self, message: &str, signer: Address) -> Result<Bytes, PortError> {
        self.check_mode()?;
        match &self.mode {
            ProviderMode::LocalSigner(local) => {
                if local.address() != signer {
                    return Err(PortError::Policy(format!(
                        "local signer {} cannot sign for {signer}",
                        local.address()
                    )));
                }
                let signature = local
                    .sign_message_sync(message.as_bytes())
                    .map_err(|e| PortError::Transport(format!("local signing failed: {e}")))?;
                Ok(Bytes::from(signature.as_bytes().to_vec()))
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => {
                let result = self.proxy_call("personal_sign", personal_sign_params(message, signer))?;
                parse_signature(&result)
            }
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => Err(PortError::NotImplemented(
                "wasm sync personal_sign is unavailable; use wasm_personal_sign_async",
            )),
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
        }
    }

    fn switch_chain(&self, chain: &ChainInfo) -> Result<(), PortError> {
        self.check_mode()?;
        match &self.mode {
            ProviderMode::LocalSigner(_) => {
                self.lock_state()?.set_chain_id(chain.chain_id);
                Ok(())
            }
            #[cfg(not(target_arch = "wasm32"))]
            ProviderMode::Proxy(_) => self.proxy_switch_chain(chain),
            #[cfg(target_arch = "wasm32")]
            ProviderMode::Browser => Err(PortError::NotImplemented(
                "wasm sync switch_chain is unavailable; use wasm_switch_chain_async",
            )),
            ProviderMode::Disabled(reason) => Err(PortError::Policy(reason.clone())),
        }
    }

    fn drain_events(&self) -> Result<Vec<ProviderEvent>, PortError> {
        self.check_mode()?;
        Ok(std::mem::take(&mut self.lock_state()?.events))
    }
}

fn local_signer_mode(config: &AdapterConfig) -> ProviderMode {
    let signer = match config.dev_private_key.as_deref() {
        Some(raw) => match raw.parse::<PrivateKeySigner>() {
            Ok(signer) => signer,
            Err(e) => {
                return ProviderMode::Disabled(format!("invalid dev private key: {e}"));
            }
        },
        None => PrivateKeySigner::random(),
    };
    tracing::info!(address = %signer.address(), "using local development signer");
    ProviderMode::LocalSigner(signer)
}

fn accounts_payload(accounts: &[Address]) -> String {
    serde_json::to_string(accounts).unwrap_or_else(|_| "[]".to_owned())
}

fn parse_accounts(method: &str, result: &Value) -> Result<Vec<Address>, PortError> {
    let arr = result
        .as_array()
        .ok_or_else(|| PortError::Transport(format!("{method}: array expected")))?;
    arr.iter()
        .map(|item| {
            let raw = item
                .as_str()
                .ok_or_else(|| PortError::Transport(format!("{method}: string expected")))?;
            raw.parse()
                .map_err(|e| PortError::Validation(format!("invalid account address: {e}")))
        })
        .collect()
}

fn parse_signature(result: &Value) -> Result<Bytes, PortError> {
    let sig_raw = result
        .as_str()
        .ok_or_else(|| PortError::Transport("personal_sign must return hex string".to_owned()))?;
    // Length is not checked here: contract wallets return ERC-1271 or
    // ERC-6492 signatures longer than 65 bytes. Verification rejects them.
    sig_raw
        .parse()
        .map_err(|e| PortError::Validation(format!("invalid signature hex: {e}")))
}

pub(crate) fn personal_sign_params(message: &str, signer: Address) -> Value {
    let payload_hex = format!("0x{}", alloy::hex::encode(message.as_bytes()));
    serde_json::json!([payload_hex, signer.to_string()])
}

pub(crate) fn hex_chain_id(chain_id: u64) -> String {
    format!("0x{chain_id:x}")
}

fn add_chain_params(chain: &ChainInfo) -> Value {
    serde_json::json!([{
        "chainId": hex_chain_id(chain.chain_id),
        "chainName": chain.name,
        "nativeCurrency": {
            "name": "Ether",
            "symbol": chain.symbol,
            "decimals": chain.decimals,
        },
        "rpcUrls": [chain.rpc_url],
        "blockExplorerUrls": [chain.explorer_url],
    }])
}

/// Maps a JSON-RPC error object to [`PortError::Rejected`].
fn rpc_error(err: &Value) -> PortError {
    let code = err.get("code").and_then(Value::as_i64);
    let message = err
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown provider error")
        .to_owned();
    match code {
        Some(code) => PortError::Rejected { code, message },
        None => PortError::Transport(format!("provider returned error: {err}")),
    }
}

pub(crate) fn json_chain_id_to_u64(value: &Value) -> Result<u64, PortError> {
    if let Some(n) = value.as_u64() {
        return Ok(n);
    }
    if let Some(n) = value.as_f64() {
        return chain_id_from_f64(n);
    }
    let s = value
        .as_str()
        .ok_or_else(|| PortError::Validation("chain id must be string or number".to_owned()))?;
    parse_chain_id_str(s)
}

/// JS numbers are doubles. Only non-negative integral values are chain ids.
fn chain_id_from_f64(num: f64) -> Result<u64, PortError> {
    if num.is_finite() && num >= 0.0 && num.fract() == 0.0 && num < u64::MAX as f64 {
        Ok(num as u64)
    } else {
        Err(PortError::Validation(format!("invalid numeric chain id: {num}")))
    }
}

fn parse_chain_id_str(raw: &str) -> Result<u64, PortError> {
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
            .map_err(|e| PortError::Validation(format!("invalid hex chain id: {e}")))
    } else {
        raw.parse()
            .map_err(|e| PortError::Validation(format!("invalid chain id: {e}")))
    }
}

#[cfg(target_arch = "wasm32")]
fn js_rpc_error(err: wasm_bindgen::JsValue) -> PortError {
    let code = get_prop(&err, "code").ok().and_then(|v| v.as_f64());
    let message = get_prop(&err, "message")
        .ok()
        .and_then(|v| v.as_string())
        .unwrap_or_else(|| format!("{err:?}"));
    match code {
        Some(code) => PortError::Rejected {
            code: code as i64,
            message,
        },
        None => PortError::Transport(format!("provider request rejected: {message}")),
    }
}

#[cfg(target_arch = "wasm32")]
fn browser_provider_available() -> bool {
    browser_provider().is_ok()
}

#[cfg(target_arch = "wasm32")]
fn browser_provider() -> Result<wasm_bindgen::JsValue, PortError> {
    let window =
        web_sys::window().ok_or_else(|| PortError::Transport("missing window".to_owned()))?;
    let provider = get_prop(&window.into(), "ethereum")?;
    if provider.is_null() || provider.is_undefined() {
        return Err(PortError::NotFound("window.ethereum missing".to_owned()));
    }
    Ok(provider)
}

#[cfg(target_arch = "wasm32")]
fn get_prop(target: &wasm_bindgen::JsValue, key: &str) -> Result<wasm_bindgen::JsValue, PortError> {
    js_sys::Reflect::get(target, &wasm_bindgen::JsValue::from_str(key))
        .map_err(|e| PortError::Transport(format!("read provider property {key} failed: {e:?}")))
}

#[cfg(target_arch = "wasm32")]
fn js_chain_id_to_u64(value: wasm_bindgen::JsValue) -> Result<u64, PortError> {
    if let Some(s) = value.as_string() {
        return parse_chain_id_str(&s);
    }
    if let Some(num) = value.as_f64() {
        return chain_id_from_f64(num);
    }
    Err(PortError::Validation("invalid JS chain id".to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_parse_from_hex_decimal_and_number() {
        assert_eq!(json_chain_id_to_u64(&serde_json::json!("0x2105")).expect("hex"), 8453);
        assert_eq!(json_chain_id_to_u64(&serde_json::json!("0X14A34")).expect("hex upper"), 84532);
        assert_eq!(json_chain_id_to_u64(&serde_json::json!("8453")).expect("decimal"), 8453);
        assert_eq!(json_chain_id_to_u64(&serde_json::json!(84532)).expect("number"), 84532);
        assert!(json_chain_id_to_u64(&serde_json::json!(null)).is_err());
        assert!(json_chain_id_to_u64(&serde_json::json!("0xzz")).is_err());
    }

    #[test]
    fn hex_chain_id_is_lowercase_without_padding() {
        assert_eq!(hex_chain_id(8453), "0x2105");
        assert_eq!(hex_chain_id(84532), "0x14a34");
    }

    #[test]
    fn personal_sign_params_hex_encode_utf8() {
        let signer = Address::ZERO;
        let params = personal_sign_params("hi", signer);
        assert_eq!(params[0], "0x6869");
        assert_eq!(params[1], signer.to_string());
    }

    #[test]
    fn rpc_error_with_code_is_rejection() {
        let err = rpc_error(&serde_json::json!({"code": 4902, "message": "Unrecognized chain"}));
        assert!(err.is_unrecognized_chain());
        let err = rpc_error(&serde_json::json!({"message": "boom"}));
        assert!(matches!(err, PortError::Transport(_)));
    }

    #[test]
    fn add_chain_params_describe_base() {
        let params = add_chain_params(&base_connect_core::BASE);
        assert_eq!(params[0]["chainId"], "0x2105");
        assert_eq!(params[0]["chainName"], "Base");
        assert_eq!(params[0]["rpcUrls"][0], "https://mainnet.base.org");
    }

    #[test]
    fn signature_accepts_any_valid_hex_length() {
        let eoa = format!("0x{}", "11".repeat(65));
        assert_eq!(parse_signature(&serde_json::json!(eoa)).expect("eoa sig").len(), 65);
        let wrapped = format!("0x{}", "22".repeat(232));
        assert_eq!(parse_signature(&serde_json::json!(wrapped)).expect("long sig").len(), 232);
        assert!(parse_signature(&serde_json::json!("0xzz")).is_err());
        assert!(parse_signature(&serde_json::json!(42)).is_err());
    }

    #[test]
    fn fractional_or_negative_chain_ids_are_rejected() {
        assert!(json_chain_id_to_u64(&serde_json::json!(8453.5)).is_err());
        assert!(json_chain_id_to_u64(&serde_json::json!(-1)).is_err());
        assert_eq!(json_chain_id_to_u64(&serde_json::json!(8453.0)).expect("integral"), 8453);
        assert!(chain_id_from_f64(f64::NAN).is_err());
        assert!(chain_id_from_f64(f64::INFINITY).is_err());
        assert_eq!(chain_id_from_f64(84532.0).expect("integral"), 84532);
    }
}
