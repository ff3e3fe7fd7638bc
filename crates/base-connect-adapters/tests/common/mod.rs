#![allow(dead_code)]

use std::collections::HashSet;
use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use alloy::signers::SignerSync;
use serde_json::{json, Value};
use tiny_http::{Response, Server, StatusCode};

use base_connect_adapters::{AdapterConfig, Eip1193Adapter};

pub const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn dev_signer() -> PrivateKeySigner {
    DEV_KEY.parse().expect("valid dev key")
}

pub fn local_adapter() -> Eip1193Adapter {
    Eip1193Adapter::with_local_signer(dev_signer())
}

/// What the mock wallet saw and what it currently believes.
#[derive(Debug)]
pub struct MockWallet {
    pub calls: Vec<String>,
    pub urls: Vec<String>,
    pub chain_id: u64,
    pub known_chains: HashSet<u64>,
    pub reject_sign: bool,
    pub reject_switch: bool,
    /// Pads signatures like an ERC-6492 smart wallet would.
    pub wrapped_signature_len: Option<usize>,
    pub balance_wei: String,
}

impl Default for MockWallet {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            urls: Vec::new(),
            chain_id: 1,
            known_chains: HashSet::from([1]),
            reject_sign: false,
            reject_switch: false,
            wrapped_signature_len: None,
            balance_wei: "0x0".to_owned(),
        }
    }
}

pub fn proxy_adapter(base_url: String) -> Eip1193Adapter {
    Eip1193Adapter::with_config(&AdapterConfig {
        eip1193_proxy_url: Some(base_url),
        rpc_timeout_ms: 5_000,
        ..AdapterConfig::default()
    })
}

/// JSON-RPC wallet stand-in. Signs with [`DEV_KEY`] so signatures verify.
pub fn spawn_mock_wallet(wallet: Arc<Mutex<MockWallet>>) -> (String, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").expect("start server");
    let addr = format!("http://{}", server.server_addr());
    let signer = dev_signer();

    let join = thread::spawn(move || {
        for _ in 0..32 {
            let mut req = match server.recv() {
                Ok(r) => r,
                Err(_) => break,
            };
            let mut body = String::new();
            let _ = req.as_reader().read_to_string(&mut body);
            let call: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
            let method = call["method"].as_str().unwrap_or_default().to_owned();
            let params = call["params"].clone();

            let reply = {
                let mut g = wallet.lock().expect("wallet lock");
                g.calls.push(method.clone());
                g.urls.push(req.url().to_owned());
                handle_call(&mut g, &signer, &method, &params)
            };
            let payload = match reply {
                Ok(result) => json!({"jsonrpc": "2.0", "id": 1, "result": result}),
                Err((code, message)) => json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "error": {"code": code, "message": message}
                }),
            };
            let response =
                Response::from_string(payload.to_string()).with_status_code(StatusCode(200));
            let _ = req.respond(response);
        }
    });

    (addr, join)
}

fn handle_call(
    wallet: &mut MockWallet,
    signer: &PrivateKeySigner,
    method: &str,
    params: &Value,
) -> Result<Value, (i64, String)> {
    let account: Address = signer.address();
    match method {
        "eth_requestAccounts" | "eth_accounts" => Ok(json!([account.to_string()])),
        "eth_chainId" => Ok(json!(format!("0x{:x}", wallet.chain_id))),
        "personal_sign" => {
            if wallet.reject_sign {
                return Err((4001, "User rejected the request.".to_owned()));
            }
            let raw = params[0].as_str().unwrap_or_default();
            let message = alloy::hex::decode(raw).map_err(|e| (-32602, e.to_string()))?;
            let signature = signer
                .sign_message_sync(&message)
                .map_err(|e| (-32603, e.to_string()))?;
            let mut bytes = signature.as_bytes().to_vec();
            if let Some(len) = wallet.wrapped_signature_len {
                bytes.resize(len, 0x49);
            }
            Ok(json!(format!("0x{}", alloy::hex::encode(bytes))))
        }
        "wallet_switchEthereumChain" => {
            if wallet.reject_switch {
                return Err((4001, "User rejected the request.".to_owned()));
            }
            let chain_id = parse_hex_chain(&params[0]["chainId"])?;
            if !wallet.known_chains.contains(&chain_id) {
                return Err((4902, "Unrecognized chain ID".to_owned()));
            }
            wallet.chain_id = chain_id;
            Ok(Value::Null)
        }
        "wallet_addEthereumChain" => {
            let chain_id = parse_hex_chain(&params[0]["chainId"])?;
            wallet.known_chains.insert(chain_id);
            Ok(Value::Null)
        }
        "eth_getBalance" => Ok(json!(wallet.balance_wei.clone())),
        other => Err((-32601, format!("method not found: {other}"))),
    }
}

fn parse_hex_chain(value: &Value) -> Result<u64, (i64, String)> {
    let raw = value.as_str().unwrap_or_default();
    u64::from_str_radix(raw.trim_start_matches("0x"), 16).map_err(|e| (-32602, e.to_string()))
}
