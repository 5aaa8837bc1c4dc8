//! Palette and visuals for the dashboard.

use client_core::NoticeSeverity;
use eframe::egui;
use shared::domain::Difficulty;

pub const PRIMARY: egui::Color32 = egui::Color32::from_rgb(0x8b, 0x5c, 0xf6);
pub const SECONDARY: egui::Color32 = egui::Color32::from_rgb(0x0e, 0xa5, 0xe9);
pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(0x10, 0xb9, 0x81);
pub const DESTRUCTIVE: egui::Color32 = egui::Color32::from_rgb(0xef, 0x44, 0x44);
pub const MUTED_TEXT: egui::Color32 = egui::Color32::from_rgb(0x94, 0xa3, 0xb8);
const CARD_FILL: egui::Color32 = egui::Color32::from_rgb(0x1e, 0x1b, 0x2e);
const PANEL_FILL: egui::Color32 = egui::Color32::from_rgb(0x14, 0x12, 0x20);

pub fn difficulty_color(difficulty: Difficulty) -> egui::Color32 {
    match difficulty {
        Difficulty::Easy => ACCENT,
        Difficulty::Medium => SECONDARY,
        Difficulty::Hard => DESTRUCTIVE,
    }
}

pub fn severity_color(severity: NoticeSeverity) -> egui::Color32 {
    match severity {
        NoticeSeverity::Info => PRIMARY,
        NoticeSeverity::Error => DESTRUCTIVE,
    }
}

/// Mixes `c` toward white by `t` in 0..=1.
pub fn lighten_color(c: egui::Color32, t: f32) -> egui::Color32 {
    let t = t.clamp(0.0, 1.0);
    let mix = |channel: u8| -> u8 {
        let channel = channel as f32;
        (channel + (255.0 - channel) * t).round().clamp(0.0, 255.0) as u8
    };
    egui::Color32::from_rgba_unmultiplied(mix(c.r()), mix(c.g()), mix(c.b()), c.a())
}

pub fn dashboard_visuals() -> egui::Visuals {
    let mut visuals = egui::Visuals::dark();
    visuals.panel_fill = PANEL_FILL;
    visuals.window_fill = CARD_FILL;
    visuals.extreme_bg_color = CARD_FILL;
    visuals.selection.bg_fill = PRIMARY;
    visuals.hyperlink_color = lighten_color(PRIMARY, 0.3);
    visuals
}

pub fn card_frame(selected: bool) -> egui::Frame {
    let stroke = if selected {
        egui::Stroke::new(2.0, PRIMARY)
    } else {
        egui::Stroke::new(1.0, egui::Color32::from_gray(60))
    };
    egui::Frame::new()
        .fill(CARD_FILL)
        .stroke(stroke)
        .corner_radius(egui::CornerRadius::same(8))
        .inner_margin(egui::Margin::symmetric(12, 10))
}

pub fn badge(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    egui::Frame::new()
        .fill(color.gamma_multiply(0.2))
        .corner_radius(egui::CornerRadius::same(6))
        .inner_margin(egui::Margin::symmetric(6, 2))
        .show(ui, |ui| {
            ui.label(egui::RichText::new(text).color(color).small().strong());
        });
}
