use std::path::PathBuf;

mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::config::{load_settings, Settings};
use crossbeam_channel::bounded;
use eframe::egui;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::ui::{load_persisted_settings, DashboardApp, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(about = "Marich.gen desktop dashboard")]
struct Args {
    /// Settings file; defaults to ./marich.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let (settings, startup_error) = match load_settings(args.config.as_deref()) {
        Ok(settings) => (settings, None),
        Err(err) => {
            tracing::warn!("failed to load settings, using defaults: {err:#}");
            (
                Settings::default(),
                Some(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("settings file could not be loaded: {err:#}"),
                )),
            )
        }
    };

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    backend_bridge::runtime::launch(cmd_rx, ui_tx, settings);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Marich.gen")
            .with_inner_size([1200.0, 780.0])
            .with_min_inner_size([860.0, 560.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };
    eframe::run_native(
        "Marich.gen",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(ui::theme::dashboard_visuals());
            let persisted_settings = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| load_persisted_settings(&text))
            });
            Ok(Box::new(DashboardApp::new(
                cmd_tx,
                ui_rx,
                persisted_settings,
                startup_error,
            )))
        }),
    )
}
