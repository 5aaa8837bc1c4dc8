use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use arboard::Clipboard;
use client_core::{
    export::{export_to_path, ExportError},
    DashboardController, DashboardSeed, Notice,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{
    DashboardTab, ExportFormat, GenerationSettings, SUPPORTED_MATERIAL_EXTENSIONS,
};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{context_label, err_label, UiError, UiErrorContext, UiEvent};
use crate::controller::reducer::{apply_ui_event, GenerationSlot};
use crate::ui::panels::{self, UiAction};
use crate::ui::theme;

pub const SETTINGS_STORAGE_KEY: &str = "marich_gen.settings";
const TOAST_LIFETIME: Duration = Duration::from_secs(5);
const EXPORT_FILE_NAME: &str = "marich-export.json";

struct Toast {
    notice: Notice,
    shown_at: Instant,
}

pub struct DashboardApp {
    dashboard: DashboardController,
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    generation: GenerationSlot,
    status: String,
    status_banner: Option<UiError>,
    toasts: Vec<Toast>,
    saved_settings: GenerationSettings,
}

impl DashboardApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        persisted_settings: Option<GenerationSettings>,
        startup_error: Option<UiError>,
    ) -> Self {
        let mut dashboard = DashboardController::new(DashboardSeed::sample());
        let saved_settings = persisted_settings.unwrap_or_default();
        dashboard.replace_settings(saved_settings);

        let status = startup_error
            .as_ref()
            .map(|err| err.message().to_string())
            .unwrap_or_else(|| "Ready".to_string());

        Self {
            dashboard,
            cmd_tx,
            ui_rx,
            generation: GenerationSlot::default(),
            status,
            status_banner: startup_error,
            toasts: Vec::new(),
            saved_settings,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(
                &mut self.dashboard,
                &mut self.generation,
                &mut self.status,
                &mut self.status_banner,
                event,
            );
        }
        self.collect_notices();
    }

    fn collect_notices(&mut self) {
        let now = Instant::now();
        self.toasts
            .extend(self.dashboard.drain_notices().into_iter().map(|notice| Toast {
                notice,
                shown_at: now,
            }));
    }

    fn push_toast(&mut self, notice: Notice) {
        self.toasts.push(Toast {
            notice,
            shown_at: Instant::now(),
        });
    }

    fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::PickFiles => {
                if let Some(files) = rfd::FileDialog::new()
                    .add_filter("Materials", &SUPPORTED_MATERIAL_EXTENSIONS)
                    .pick_files()
                {
                    self.apply_action(UiAction::AddFiles(files));
                }
            }
            UiAction::AddFiles(files) => self.add_files(files),
            UiAction::SelectMaterial(id) => self.dashboard.select_material(id),
            UiAction::Generate => {
                self.generation
                    .start(&mut self.dashboard, &self.cmd_tx, &mut self.status);
            }
            UiAction::CancelGeneration => {
                self.generation.cancel(&self.cmd_tx, &mut self.status);
            }
            UiAction::SwitchTab(tab) => self.dashboard.set_active_tab(tab),
            UiAction::UpdateSettings {
                question_count,
                difficulty_level,
            } => self
                .dashboard
                .update_settings(question_count, difficulty_level),
            UiAction::SetLanguage(language) => self.dashboard.set_language(language),
            UiAction::SetExportFormat(format) => self.dashboard.set_export_format(format),
            UiAction::ResetSettings => {
                self.dashboard.reset_settings();
                self.status = "Settings reset to defaults".to_string();
            }
            UiAction::SaveSettings => {
                self.saved_settings = self.dashboard.settings();
                self.status = "Settings saved".to_string();
                self.push_toast(Notice::info(
                    "Settings saved",
                    "Generation settings will be restored on next launch.",
                ));
            }
            UiAction::Export => self.export(),
            UiAction::CopyText(text) => match Clipboard::new().and_then(|mut c| c.set_text(text)) {
                Ok(()) => self.status = "Question copied to clipboard".to_string(),
                Err(err) => self.status = format!("Failed to copy question: {err}"),
            },
        }
    }

    fn add_files(&mut self, files: Vec<PathBuf>) {
        let (accepted, rejected): (Vec<PathBuf>, Vec<PathBuf>) = files
            .into_iter()
            .partition(|path| panels::is_supported_material(path));

        if !rejected.is_empty() {
            let names = rejected
                .iter()
                .filter_map(|path| path.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(", ");
            self.push_toast(Notice::error("Unsupported files skipped", names));
        }
        if accepted.is_empty() {
            return;
        }

        let added = self.dashboard.add_materials(&accepted);
        self.status = format!("Added {} material(s) to the library", added.len());
        self.push_toast(Notice::info(
            "Materials uploaded",
            format!("{} file(s) added to the library.", added.len()),
        ));
    }

    fn export(&mut self) {
        let format = self.dashboard.settings().export_format;
        if format != ExportFormat::Json {
            self.report_export_error(ExportError::UnsupportedFormat(format));
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(EXPORT_FILE_NAME)
            .save_file()
        else {
            return;
        };

        match export_to_path(&self.dashboard, format, &path) {
            Ok(()) => {
                self.status = format!("Exported library to {}", path.display());
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "export failed: {err}");
                self.report_export_error(err);
            }
        }
    }

    fn report_export_error(&mut self, err: ExportError) {
        let err = UiError::from_message(UiErrorContext::Export, err.to_string());
        self.status = err.message().to_string();
        self.status_banner = Some(err);
    }

    fn collect_dropped_files(&self, ctx: &egui::Context) -> Option<UiAction> {
        let dropped: Vec<PathBuf> = ctx.input(|input| {
            input
                .raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .collect()
        });
        (!dropped.is_empty()).then_some(UiAction::AddFiles(dropped))
    }

    fn show_header(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        egui::TopBottomPanel::top("dashboard_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.label(
                    egui::RichText::new("Marich.gen")
                        .size(22.0)
                        .strong()
                        .color(theme::PRIMARY),
                );
                ui.label(
                    egui::RichText::new("AI question generator").color(theme::MUTED_TEXT),
                );
            });
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let active = self.dashboard.active_tab();
                for tab in DashboardTab::ALL {
                    if ui.selectable_label(active == tab, tab.label()).clicked() && active != tab {
                        actions.push(UiAction::SwitchTab(tab));
                    }
                }
            });
            ui.add_space(6.0);
        });
    }

    fn show_status_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("dashboard_status").show(ctx, |ui| {
            if let Some(banner) = &self.status_banner {
                let mut dismissed = false;
                ui.horizontal(|ui| {
                    theme::badge(ui, err_label(banner.category()), theme::DESTRUCTIVE);
                    ui.label(
                        egui::RichText::new(context_label(banner.context())).color(theme::MUTED_TEXT),
                    );
                    ui.label(banner.message());
                    if ui.small_button("Dismiss").clicked() {
                        dismissed = true;
                    }
                });
                if dismissed {
                    self.status_banner = None;
                }
            }
            ui.horizontal(|ui| {
                if self.dashboard.is_generating() {
                    ui.spinner();
                }
                ui.label(egui::RichText::new(&self.status).color(theme::MUTED_TEXT));
            });
        });
    }

    fn show_toasts(&mut self, ctx: &egui::Context) {
        self.toasts
            .retain(|toast| toast.shown_at.elapsed() < TOAST_LIFETIME);
        if self.toasts.is_empty() {
            return;
        }

        let mut dismissed = None;
        egui::Area::new(egui::Id::new("dashboard_toasts"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-16.0, -48.0))
            .show(ctx, |ui| {
                for (index, toast) in self.toasts.iter().enumerate() {
                    let color = theme::severity_color(toast.notice.severity);
                    egui::Frame::popup(ui.style())
                        .stroke(egui::Stroke::new(1.0, color))
                        .show(ui, |ui| {
                            ui.set_max_width(320.0);
                            ui.horizontal(|ui| {
                                ui.label(
                                    egui::RichText::new(&toast.notice.title).strong().color(color),
                                );
                                if ui.small_button("x").clicked() {
                                    dismissed = Some(index);
                                }
                            });
                            if !toast.notice.description.is_empty() {
                                ui.label(&toast.notice.description);
                            }
                        });
                    ui.add_space(4.0);
                }
            });

        if let Some(index) = dismissed {
            self.toasts.remove(index);
        }
    }

    fn show_active_tab(&self, ctx: &egui::Context, actions: &mut Vec<UiAction>) {
        let snapshot = self.dashboard.analytics();
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::stat_cards(ui, &snapshot);
            ui.add_space(12.0);
            match self.dashboard.active_tab() {
                DashboardTab::Upload => panels::upload_tab(ui, actions),
                DashboardTab::Library => panels::library_tab(ui, &self.dashboard, actions),
                DashboardTab::Generator => panels::generator_tab(ui, &self.dashboard, actions),
                DashboardTab::Exams => panels::exams_tab(ui, &self.dashboard),
                DashboardTab::Analytics => {
                    panels::analytics_tab(ui, &snapshot, self.dashboard.settings().language)
                }
                DashboardTab::Settings => panels::settings_tab(ui, &self.dashboard, actions),
            }
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        let mut actions = Vec::new();
        actions.extend(self.collect_dropped_files(ctx));
        self.show_header(ctx, &mut actions);
        self.show_status_bar(ctx);
        self.show_active_tab(ctx, &mut actions);

        for action in actions {
            self.apply_action(action);
        }
        self.collect_notices();
        self.show_toasts(ctx);

        if self.dashboard.is_generating() || !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        if let Ok(serialized) = serde_json::to_string(&self.saved_settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}

pub fn load_persisted_settings(raw: &str) -> Option<GenerationSettings> {
    serde_json::from_str::<GenerationSettings>(raw)
        .ok()
        .filter(GenerationSettings::is_within_bounds)
}
