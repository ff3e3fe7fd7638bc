//! Main application state and update loop

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy::primitives::{Address, Bytes};
use eframe::egui;

use base_connect_core::{
    AppMetadata, Balance, PortError, SignFlow, VerifyError, WalletSession, DEFAULT_CHAIN,
};

use crate::state::{balance_label, short_address, PersistedState};
use crate::ui;
use crate::wallet_bridge::WalletBridge;

/// Hand-off slot filled by a background task and drained once per frame.
type Slot<T> = Arc<Mutex<Option<T>>>;

/// How often a connected page drains wallet events while idle.
const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConnectKind {
    /// User clicked connect; the wallet may prompt.
    Prompt,
    /// Restoring the previous session; never prompts.
    Restore,
}

/// The main application state
pub struct App {
    bridge: WalletBridge,
    metadata: AppMetadata,
    /// Copy of the controller's session, refreshed after every command
    session: WalletSession,
    flow: SignFlow,
    connecting: Option<ConnectKind>,
    switching: bool,
    balance_loading: bool,
    /// Account and chain whose balance read already failed. Not retried.
    balance_failed: Option<(Address, u64)>,
    connect_result: Slot<(ConnectKind, Result<(), PortError>)>,
    switch_result: Slot<Result<(), PortError>>,
    sign_result: Slot<(String, Result<Bytes, PortError>)>,
    verify_result: Slot<Result<bool, VerifyError>>,
    balance_result: Slot<(Address, u64, Result<Balance, PortError>)>,
}

impl App {
    pub fn new(cc: &eframe::CreationContext<'_>, bridge: WalletBridge) -> Self {
        let persisted = PersistedState::load(cc.storage);

        let mut app = Self {
            bridge,
            metadata: AppMetadata::default(),
            session: WalletSession::default(),
            flow: SignFlow::with_message(persisted.message_draft),
            connecting: None,
            switching: false,
            balance_loading: false,
            balance_failed: None,
            connect_result: Arc::new(Mutex::new(None)),
            switch_result: Arc::new(Mutex::new(None)),
            sign_result: Arc::new(Mutex::new(None)),
            verify_result: Arc::new(Mutex::new(None)),
            balance_result: Arc::new(Mutex::new(None)),
        };

        if let Some(last) = persisted.last_account {
            tracing::info!(address = %last.address, chain_id = last.chain_id, "restoring previous session");
            app.start_connect(&cc.egui_ctx, ConnectKind::Restore);
        }
        app
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.check_connect_result();
        self.check_switch_result();
        self.check_sign_result();
        self.check_verify_result();
        self.check_balance_result();
        self.poll_provider_events();
        self.maybe_fetch_balance(ctx);

        let alert = self.flow.alert().map(str::to_owned);
        let interactive = alert.is_none();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| self.render_header(ui));
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            self.render_footer(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.add_enabled_ui(interactive, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(16.0);
                    self.render_body(ui);
                    ui.add_space(20.0);
                });
            });
        });

        if let Some(message) = alert {
            self.render_alert(ctx, &message);
        }

        if self.session.is_connected() {
            ctx.request_repaint_after(EVENT_POLL_INTERVAL);
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        PersistedState {
            last_account: self.session.snapshot(),
            message_draft: self.flow.message.clone(),
        }
        .store(storage);
    }
}

// =============================================================================
// RENDERING
// =============================================================================

impl App {
    fn render_header(&mut self, ui: &mut egui::Ui) {
        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            ui::styled_heading(ui, &self.metadata.name);
            ui.label(egui::RichText::new(&self.metadata.description).size(15.0).weak());
            ui.add_space(10.0);

            if self.session.is_connected() {
                let address = self
                    .session
                    .address
                    .map(|a| a.to_string())
                    .unwrap_or_default();
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new(short_address(&address)).monospace());
                    if ui::secondary_button(ui, "Disconnect").clicked() {
                        self.disconnect();
                    }
                });
            } else {
                let label = if self.connecting.is_some() {
                    "Connecting..."
                } else {
                    "Connect Wallet"
                };
                if ui::accent_button(ui, label, self.connecting.is_none()).clicked() {
                    self.start_connect(ui.ctx(), ConnectKind::Prompt);
                }
            }
        });
        ui.add_space(8.0);
    }

    fn render_body(&mut self, ui: &mut egui::Ui) {
        if !self.session.is_connected() {
            self.render_connect_prompt(ui);
            return;
        }
        if self.session.wrong_network() {
            self.render_wrong_network(ui);
            return;
        }
        self.render_account(ui);
        ui.add_space(16.0);
        self.render_sign_card(ui);
    }

    fn render_wrong_network(&mut self, ui: &mut egui::Ui) {
        let chain_name = self.session.chain_name();
        let mut switch_clicked = false;
        ui::card_warning(ui, |ui| {
            ui::warning_message(ui, "Wrong Network");
            ui.label(format!(
                "You are connected to {chain_name}. Please switch to Base network to continue."
            ));
            ui.add_space(8.0);
            let label = if self.switching { "Switching..." } else { "Switch to Base" };
            switch_clicked = ui::accent_button(ui, label, !self.switching).clicked();
        });
        if switch_clicked {
            self.start_switch(ui.ctx());
        }
    }

    fn render_account(&mut self, ui: &mut egui::Ui) {
        let session = &self.session;
        ui::card(ui, |ui| {
            ui::section_header(ui, "👤 Account Information");

            ui::field_label(ui, "Connected Address");
            if let (Some(address), Some(chain_id)) = (session.address, session.chain_id) {
                ui::address_link(ui, chain_id, &address.to_string());
            }
            ui.add_space(8.0);

            ui::field_label(ui, "Balance");
            ui.label(
                egui::RichText::new(balance_label(session.balance.as_ref()))
                    .strong()
                    .size(15.0),
            );
            ui.add_space(8.0);

            ui::field_label(ui, "Network");
            ui.label(egui::RichText::new(session.chain_name()).strong().size(15.0));
        });
    }

    fn render_sign_card(&mut self, ui: &mut egui::Ui) {
        let mut sign_clicked = false;
        let mut verify_clicked = false;
        let flow = &mut self.flow;

        ui::card(ui, |ui| {
            ui::section_header(ui, "🔑 Sign Message");

            ui.label("Enter your message");
            ui::multiline_input(ui, &mut flow.message, "Type your message here...", 4);
            ui.add_space(8.0);

            let label = if flow.is_signing { "Signing..." } else { "Sign Message" };
            sign_clicked = ui::primary_button_enabled(ui, label, flow.can_sign()).clicked();

            let Some(signature) = flow.signature.as_ref() else {
                return;
            };
            ui.add_space(12.0);
            ui::card_highlighted(ui, |ui| {
                ui::field_label(ui, "Signed Message");
                ui.add(egui::Label::new(&flow.signed_message).wrap());
            });
            ui.add_space(6.0);
            ui::card_highlighted(ui, |ui| {
                ui::field_label(ui, "Signature");
                ui::copyable_text(ui, &signature.to_string());
            });
            ui.add_space(8.0);

            let label = if flow.is_verifying {
                "Verifying..."
            } else {
                "Verify Signature"
            };
            verify_clicked = ui::primary_button_enabled(ui, label, !flow.is_verifying).clicked();

            match flow.verified {
                Some(true) => ui::success_message(ui, "Signature Verified!"),
                Some(false) => ui::error_message(ui, "Verification Failed"),
                None => {}
            }
        });

        if sign_clicked {
            self.start_sign(ui.ctx());
        }
        if verify_clicked {
            self.start_verify(ui.ctx());
        }
    }

    fn render_connect_prompt(&mut self, ui: &mut egui::Ui) {
        ui::card(ui, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.label(egui::RichText::new("🔒").size(40.0));
                ui.label(egui::RichText::new("Connect Your Wallet").strong().size(22.0));
                ui.label("Click the button above to connect your wallet and start using the app");
                ui.add_space(12.0);
            });
        });
    }

    fn render_footer(&self, ui: &mut egui::Ui) {
        ui.add_space(6.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("Built with alloy + egui + Base Network")
                    .small()
                    .weak(),
            );
            ui.label(
                egui::RichText::new(format!(
                    "wallet: {} · build {} · {}",
                    self.bridge.provider_label(),
                    build_commit(),
                    env!("BUILD_TIME"),
                ))
                .small()
                .weak(),
            );
        });
        ui.add_space(6.0);
    }

    fn render_alert(&mut self, ctx: &egui::Context, message: &str) {
        let mut dismissed = false;
        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                ui.label(message);
                ui.add_space(8.0);
                ui.vertical_centered(|ui| {
                    dismissed = ui.button("OK").clicked();
                });
            });
        if dismissed || ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.flow.take_alert();
        }
    }
}

// =============================================================================
// ACTIONS
// =============================================================================

impl App {
    fn start_connect(&mut self, ctx: &egui::Context, kind: ConnectKind) {
        if self.connecting.is_some() {
            return;
        }
        self.connecting = Some(kind);
        let bridge = self.bridge.clone();

        #[cfg(target_arch = "wasm32")]
        spawn_task(ctx, &self.connect_result, async move {
            let result = match kind {
                ConnectKind::Prompt => bridge.connect_async().await,
                ConnectKind::Restore => bridge.reconnect_async().await,
            };
            (kind, result.map(|_| ()))
        });

        #[cfg(not(target_arch = "wasm32"))]
        spawn_task(ctx, &self.connect_result, move || {
            let result = match kind {
                ConnectKind::Prompt => bridge.connect(),
                ConnectKind::Restore => bridge.reconnect(),
            };
            (kind, result.map(|_| ()))
        });
    }

    fn disconnect(&mut self) {
        if let Err(e) = self.bridge.disconnect() {
            tracing::error!("Error disconnecting wallet: {e}");
        }
        self.refresh_session();
    }

    fn start_switch(&mut self, ctx: &egui::Context) {
        if self.switching {
            return;
        }
        self.switching = true;
        let bridge = self.bridge.clone();
        let chain_id = DEFAULT_CHAIN.chain_id;

        #[cfg(target_arch = "wasm32")]
        spawn_task(ctx, &self.switch_result, async move {
            bridge.switch_chain_async(chain_id).await.map(|_| ())
        });

        #[cfg(not(target_arch = "wasm32"))]
        spawn_task(ctx, &self.switch_result, move || {
            bridge.switch_chain(chain_id).map(|_| ())
        });
    }

    fn start_sign(&mut self, ctx: &egui::Context) {
        if self.flow.is_signing {
            return;
        }
        let Some(message) = self.flow.begin_sign() else {
            return;
        };
        let bridge = self.bridge.clone();

        #[cfg(target_arch = "wasm32")]
        spawn_task(ctx, &self.sign_result, async move {
            let result = bridge.sign_message_async(message.clone()).await;
            (message, result)
        });

        #[cfg(not(target_arch = "wasm32"))]
        spawn_task(ctx, &self.sign_result, move || {
            let result = bridge.sign_message(message.clone());
            (message, result)
        });
    }

    fn start_verify(&mut self, ctx: &egui::Context) {
        if self.flow.is_verifying {
            return;
        }
        let Some(request) = self.flow.begin_verify(self.session.address) else {
            return;
        };

        #[cfg(target_arch = "wasm32")]
        spawn_task(ctx, &self.verify_result, async move { request.run() });

        #[cfg(not(target_arch = "wasm32"))]
        spawn_task(ctx, &self.verify_result, move || request.run());
    }

    fn maybe_fetch_balance(&mut self, ctx: &egui::Context) {
        if self.balance_loading
            || !self.session.is_connected()
            || self.session.wrong_network()
            || self.session.balance.is_some()
        {
            return;
        }
        let (Some(address), Some(chain_id)) = (self.session.address, self.session.chain_id) else {
            return;
        };
        if self.balance_failed == Some((address, chain_id)) {
            return;
        }
        self.balance_loading = true;
        let bridge = self.bridge.clone();

        #[cfg(target_arch = "wasm32")]
        spawn_task(ctx, &self.balance_result, async move {
            let result = bridge.fetch_balance(address, chain_id).await;
            (address, chain_id, result)
        });

        #[cfg(not(target_arch = "wasm32"))]
        spawn_task(ctx, &self.balance_result, move || {
            let result = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(bridge.fetch_balance(address, chain_id)),
                Err(e) => Err(PortError::Transport(format!("tokio runtime init failed: {e}"))),
            };
            (address, chain_id, result)
        });
    }

    fn poll_provider_events(&mut self) {
        if !self.session.is_connected() {
            return;
        }
        match self.bridge.recover_provider_events() {
            Ok(result) if !result.events.is_empty() => {
                tracing::debug!(count = result.events.len(), "applied wallet events");
                self.refresh_session();
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("failed to recover wallet events: {e}"),
        }
    }

    fn refresh_session(&mut self) {
        match self.bridge.session() {
            Ok(session) => {
                if self.session.is_connected() && !session.is_connected() {
                    self.flow.reset_signature();
                    self.balance_failed = None;
                }
                self.session = session;
            }
            Err(e) => tracing::error!("failed to read wallet session: {e}"),
        }
    }
}

// =============================================================================
// RESULT HANDLING
// =============================================================================

impl App {
    fn check_connect_result(&mut self) {
        let Some((kind, result)) = take(&self.connect_result) else {
            return;
        };
        self.connecting = None;
        match result {
            Ok(()) => {}
            Err(e) if kind == ConnectKind::Restore => {
                tracing::warn!("could not restore previous session: {e}");
            }
            Err(e) if e.is_user_rejection() => {
                tracing::info!("connection request rejected in wallet");
            }
            Err(e) => {
                tracing::error!("Error connecting wallet: {e}");
                self.flow.raise_alert(format!("Failed to connect wallet: {e}"));
            }
        }
        self.refresh_session();
    }

    fn check_switch_result(&mut self) {
        let Some(result) = take(&self.switch_result) else {
            return;
        };
        self.switching = false;
        if let Err(e) = result {
            self.flow.alert_switch_failed(&e);
        }
        self.refresh_session();
    }

    fn check_sign_result(&mut self) {
        if let Some((message, result)) = take(&self.sign_result) {
            self.flow.finish_sign(message, result);
        }
    }

    fn check_verify_result(&mut self) {
        if let Some(result) = take(&self.verify_result) {
            self.flow.finish_verify(result);
        }
    }

    fn check_balance_result(&mut self) {
        let Some((address, chain_id, result)) = take(&self.balance_result) else {
            return;
        };
        self.balance_loading = false;
        match result {
            Ok(balance) => match self.bridge.record_balance(address, chain_id, balance) {
                Ok(true) => self.refresh_session(),
                Ok(false) => tracing::debug!(%address, chain_id, "discarded stale balance"),
                Err(e) => tracing::error!("failed to store balance: {e}"),
            },
            Err(e) => {
                tracing::warn!(%address, chain_id, "balance read failed: {e}");
                self.balance_failed = Some((address, chain_id));
            }
        }
    }
}

fn take<T>(slot: &Slot<T>) -> Option<T> {
    match slot.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}

fn put<T>(slot: &Slot<T>, value: T) {
    match slot.lock() {
        Ok(mut guard) => *guard = Some(value),
        Err(poisoned) => *poisoned.into_inner() = Some(value),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_task<T, F>(ctx: &egui::Context, slot: &Slot<T>, job: F)
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let slot = Arc::clone(slot);
    let ctx = ctx.clone();
    std::thread::spawn(move || {
        put(&slot, job());
        ctx.request_repaint();
    });
}

#[cfg(target_arch = "wasm32")]
fn spawn_task<T, F>(ctx: &egui::Context, slot: &Slot<T>, job: F)
where
    T: 'static,
    F: std::future::Future<Output = T> + 'static,
{
    let slot = Arc::clone(slot);
    let ctx = ctx.clone();
    wasm_bindgen_futures::spawn_local(async move {
        put(&slot, job.await);
        ctx.request_repaint();
    });
}

fn build_commit() -> &'static str {
    let hash = env!("GIT_HASH");
    hash.get(..7).unwrap_or(hash)
}
