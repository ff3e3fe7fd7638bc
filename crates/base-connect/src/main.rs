//! Base Connect: connect a wallet to Base, sign a message and verify the signature

use base_connect_adapters::AdapterConfig;

mod app;
mod state;
mod ui;
mod wallet_bridge;

use wallet_bridge::WalletBridge;

const APP_NAME: &str = "Base Wallet Connect";

/// Reads configuration and builds the wallet bridge. Fails fast when the
/// project id is missing.
fn init_bridge() -> eyre::Result<WalletBridge> {
    let config = AdapterConfig::from_env()?;
    tracing::info!(
        profile = ?config.runtime_profile,
        proxy = config.eip1193_proxy_url.is_some(),
        "configuration loaded"
    );
    Ok(WalletBridge::new(&config)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eyre::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting {APP_NAME}");
    let bridge = init_bridge()?;

    let native_options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title(APP_NAME)
            .with_inner_size([760.0, 820.0])
            .with_min_inner_size([480.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        native_options,
        Box::new(move |cc| Ok(Box::new(app::App::new(cc, bridge)))),
    )
    .map_err(|e| eyre::eyre!("eframe exited with error: {e}"))
}

#[cfg(target_arch = "wasm32")]
fn main() {
    tracing_wasm::set_as_global_default();
    tracing::info!("Starting {APP_NAME}");

    wasm_bindgen_futures::spawn_local(async {
        if let Err(e) = start_web().await {
            tracing::error!("failed to start {APP_NAME}: {e:#}");
        }
    });
}

#[cfg(target_arch = "wasm32")]
async fn start_web() -> eyre::Result<()> {
    use wasm_bindgen::JsCast;

    let bridge = init_bridge()?;
    let canvas = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("the_canvas_id"))
        .ok_or_else(|| eyre::eyre!("canvas element the_canvas_id not found"))?
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .map_err(|_| eyre::eyre!("the_canvas_id is not a canvas"))?;

    eframe::WebRunner::new()
        .start(
            canvas,
            eframe::WebOptions::default(),
            Box::new(move |cc| Ok(Box::new(app::App::new(cc, bridge)))),
        )
        .await
        .map_err(|e| eyre::eyre!("web runner failed: {e:?}"))
}
