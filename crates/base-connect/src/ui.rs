//! UI helper components

use eframe::egui;

use base_connect_core::{chain_by_id, DEFAULT_CHAIN};

pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0, 82, 255);
pub const WARNING: egui::Color32 = egui::Color32::from_rgb(220, 180, 50);

/// Block explorer page for an address. Chains without a known explorer fall
/// back to Basescan.
pub fn explorer_address_url(chain_id: u64, address: &str) -> String {
    let base = chain_by_id(chain_id)
        .map(|c| c.explorer_url)
        .unwrap_or(DEFAULT_CHAIN.explorer_url);
    format!("{}/address/{}", base, address)
}

/// Open URL in a new browser tab
#[cfg(target_arch = "wasm32")]
pub fn open_url_new_tab(url: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.open_with_url_and_target(url, "_blank");
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn open_url_new_tab(url: &str) {
    if let Err(e) = open::that(url) {
        tracing::warn!("failed to open {url}: {e}");
    }
}

/// Address as a link to the block explorer, followed by a copy button
pub fn address_link(ui: &mut egui::Ui, chain_id: u64, address: &str) {
    ui.horizontal_wrapped(|ui| {
        let response = ui
            .link(egui::RichText::new(address).monospace().size(15.0))
            .on_hover_text("Open in block explorer");
        if response.clicked() {
            open_url_new_tab(&explorer_address_url(chain_id, address));
        }
        copy_button(ui, address);
    });
}

/// Styled heading with accent color
pub fn styled_heading(ui: &mut egui::Ui, text: &str) {
    ui.heading(egui::RichText::new(text).size(30.0).strong().color(ACCENT));
}

/// Section header with separator
pub fn section_header(ui: &mut egui::Ui, text: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(text).strong().size(18.0));
    });
    ui.separator();
    ui.add_space(6.0);
}

/// Small caption above a value
pub fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).small().weak());
}

/// Copy to clipboard (platform-specific)
#[cfg(not(target_arch = "wasm32"))]
pub fn copy_to_clipboard(text: &str) {
    if let Ok(mut clipboard) = arboard::Clipboard::new() {
        let _ = clipboard.set_text(text);
    }
}

#[cfg(target_arch = "wasm32")]
pub fn copy_to_clipboard(text: &str) {
    if let Some(window) = web_sys::window() {
        let navigator = window.navigator();
        let clipboard = navigator.clipboard();
        let _ = clipboard.write_text(text);
    }
}

fn copy_button(ui: &mut egui::Ui, text: &str) {
    if ui
        .small_button("📋")
        .on_hover_text("Copy to clipboard")
        .clicked()
    {
        copy_to_clipboard(text);
    }
}

/// Long monospace value (signature) that wraps, with a copy button
pub fn copyable_text(ui: &mut egui::Ui, text: &str) {
    ui.horizontal_wrapped(|ui| {
        ui.add(egui::Label::new(egui::RichText::new(text).monospace().small()).wrap());
        copy_button(ui, text);
    });
}

/// Create a styled multiline text edit with fixed height and internal scrolling
pub fn multiline_input(
    ui: &mut egui::Ui,
    value: &mut String,
    hint: &str,
    rows: usize,
) -> egui::Response {
    let row_height = ui.text_style_height(&egui::TextStyle::Body);
    let height = row_height * rows as f32 + ui.spacing().item_spacing.y * 5.0;

    egui::ScrollArea::vertical()
        .max_height(height)
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::multiline(value)
                    .hint_text(hint)
                    .desired_rows(rows)
                    .desired_width(f32::INFINITY),
            )
        })
        .inner
}

/// Error message display
pub fn error_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("❌").size(16.0));
        ui.label(
            egui::RichText::new(message)
                .strong()
                .color(egui::Color32::from_rgb(220, 80, 80)),
        );
    });
}

/// Success message display
pub fn success_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("✅").size(16.0));
        ui.label(
            egui::RichText::new(message)
                .strong()
                .color(egui::Color32::from_rgb(80, 200, 120)),
        );
    });
}

/// Warning message display
pub fn warning_message(ui: &mut egui::Ui, message: &str) {
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("⚠️").size(16.0));
        ui.label(egui::RichText::new(message).strong().color(WARNING));
    });
}

// =============================================================================
// STYLED BUTTONS
// =============================================================================

/// Primary button with enabled state, stretched to the available width
pub fn primary_button_enabled(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0).color(egui::Color32::WHITE))
        .min_size(egui::vec2(ui.available_width(), 36.0))
        .fill(ACCENT);
    ui.add_enabled(enabled, btn)
}

/// Compact accent button for the header and warning card
pub fn accent_button(ui: &mut egui::Ui, text: &str, enabled: bool) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0).color(egui::Color32::WHITE))
        .min_size(egui::vec2(130.0, 34.0))
        .fill(ACCENT);
    ui.add_enabled(enabled, btn)
}

/// Secondary action button - subdued, outline style
pub fn secondary_button(ui: &mut egui::Ui, text: &str) -> egui::Response {
    let btn = egui::Button::new(egui::RichText::new(text).size(14.0))
        .min_size(egui::vec2(90.0, 34.0));
    ui.add(btn)
}

// =============================================================================
// VISUAL GROUPING
// =============================================================================

/// Render content in a subtle card/frame
pub fn card(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .rounding(8.0)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
}

/// Render content in a highlighted card (slightly brighter)
pub fn card_highlighted(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    let bg = ui.visuals().faint_bg_color.linear_multiply(1.3);
    egui::Frame::none()
        .fill(bg)
        .rounding(6.0)
        .inner_margin(12.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
}

/// Card with a warning-colored outline
pub fn card_warning(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui)) {
    egui::Frame::none()
        .fill(ui.visuals().faint_bg_color)
        .stroke(egui::Stroke::new(1.0, WARNING))
        .rounding(8.0)
        .inner_margin(16.0)
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            add_contents(ui);
        });
}
