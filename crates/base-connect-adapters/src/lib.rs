pub mod balance;
pub mod config;
pub mod eip1193;

pub use balance::BalanceAdapter;
pub use config::{AdapterConfig, ConfigError, RuntimeProfile};
pub use eip1193::Eip1193Adapter;
