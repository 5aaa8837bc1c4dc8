//! One renderer per dashboard tab. Renderers only read state and collect
//! [`UiAction`]s; the app applies them after the frame is laid out.

use std::path::PathBuf;

use client_core::{AnalyticsSnapshot, DashboardController};
use eframe::egui;
use shared::domain::{
    DashboardTab, ExportFormat, GenerationLanguage, MaterialId, DIFFICULTY_LEVEL_MAX,
    DIFFICULTY_LEVEL_STEP, QUESTION_COUNT_MAX, QUESTION_COUNT_MIN, QUESTION_COUNT_STEP,
    SUPPORTED_MATERIAL_EXTENSIONS,
};

use crate::ui::theme;

#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    PickFiles,
    AddFiles(Vec<PathBuf>),
    SelectMaterial(MaterialId),
    Generate,
    CancelGeneration,
    SwitchTab(DashboardTab),
    UpdateSettings {
        question_count: u32,
        difficulty_level: u32,
    },
    SetLanguage(GenerationLanguage),
    SetExportFormat(ExportFormat),
    ResetSettings,
    SaveSettings,
    Export,
    CopyText(String),
}

pub fn is_supported_material(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_MATERIAL_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}

fn section_heading(ui: &mut egui::Ui, title: &str, subtitle: &str) {
    ui.heading(title);
    ui.label(egui::RichText::new(subtitle).color(theme::MUTED_TEXT));
    ui.add_space(8.0);
}

pub fn stat_cards(ui: &mut egui::Ui, snapshot: &AnalyticsSnapshot) {
    let success = snapshot
        .performance
        .success_rate
        .map(|rate| format!("{:.0}%", rate * 100.0))
        .unwrap_or_else(|| "n/a".to_string());
    let cards = [
        ("Materials", snapshot.material_count.to_string()),
        ("Questions", snapshot.question_count.to_string()),
        ("Exams", snapshot.exam_count.to_string()),
        ("Success rate", success),
    ];

    ui.columns(cards.len(), |columns| {
        for (column, (label, value)) in columns.iter_mut().zip(cards) {
            theme::card_frame(false).show(column, |ui| {
                ui.set_min_width(ui.available_width());
                ui.label(egui::RichText::new(value).size(26.0).strong());
                ui.label(egui::RichText::new(label).color(theme::MUTED_TEXT));
            });
        }
    });
}

pub fn upload_tab(ui: &mut egui::Ui, actions: &mut Vec<UiAction>) {
    section_heading(
        ui,
        "Upload materials",
        "Add PDF, Word, Excel, PowerPoint or text files to the library",
    );

    theme::card_frame(false).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.vertical_centered(|ui| {
            ui.add_space(16.0);
            ui.label(egui::RichText::new("Drop files here").size(18.0).strong());
            ui.label(egui::RichText::new("or pick them from disk").color(theme::MUTED_TEXT));
            ui.add_space(8.0);
            if ui.button("Choose files…").clicked() {
                actions.push(UiAction::PickFiles);
            }
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                for label in ["PDF", "Word", "Excel", "PowerPoint", "TXT"] {
                    theme::badge(ui, label, theme::MUTED_TEXT);
                }
            });
            ui.add_space(16.0);
        });
    });
}

pub fn library_tab(ui: &mut egui::Ui, dashboard: &DashboardController, actions: &mut Vec<UiAction>) {
    section_heading(ui, "Material library", "Click a material to generate questions from it");

    let selected = dashboard.selected_material();
    egui::ScrollArea::vertical()
        .id_salt("library_scroll")
        .max_height((ui.available_height() - 90.0).max(120.0))
        .show(ui, |ui| {
            for material in dashboard.materials() {
                let is_selected = selected == Some(&material.id);
                let response = theme::card_frame(is_selected)
                    .show(ui, |ui| {
                        ui.set_min_width(ui.available_width());
                        ui.horizontal(|ui| {
                            ui.vertical(|ui| {
                                ui.label(egui::RichText::new(&material.name).strong());
                                ui.horizontal(|ui| {
                                    theme::badge(ui, &material.kind, theme::MUTED_TEXT);
                                    ui.label(material.upload_date.to_string());
                                    ui.label(format!("{} questions", material.questions_generated));
                                });
                            });
                            if is_selected {
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    theme::badge(ui, "Selected", theme::PRIMARY);
                                });
                            }
                        });
                    })
                    .response
                    .interact(egui::Sense::click());
                if response.clicked() {
                    actions.push(UiAction::SelectMaterial(material.id.clone()));
                }
                ui.add_space(6.0);
            }
        });

    let Some(selected) = selected else {
        return;
    };
    let name = dashboard
        .material(selected)
        .map(|material| material.name.as_str())
        .unwrap_or("unknown material");

    ui.add_space(8.0);
    theme::card_frame(true).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                ui.label(egui::RichText::new("Ready to generate?").strong());
                ui.label(format!("Selected material: {name}"));
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if dashboard.is_generating() {
                    if ui.button("Cancel").clicked() {
                        actions.push(UiAction::CancelGeneration);
                    }
                    ui.add_enabled(false, egui::Button::new("Generating…"));
                    ui.spinner();
                } else if ui.button("Generate questions").clicked() {
                    actions.push(UiAction::Generate);
                }
            });
        });
    });
}

pub fn generator_tab(
    ui: &mut egui::Ui,
    dashboard: &DashboardController,
    actions: &mut Vec<UiAction>,
) {
    section_heading(ui, "AI question generator", "Questions generated from your materials");
    let language = dashboard.settings().language;

    if dashboard.questions().is_empty() {
        ui.vertical_centered(|ui| {
            ui.add_space(24.0);
            ui.label(egui::RichText::new("No questions yet").size(18.0).strong());
            ui.label("Open the library, select a material and press \"Generate questions\".");
            if ui.button("Go to library").clicked() {
                actions.push(UiAction::SwitchTab(DashboardTab::Library));
            }
        });
        return;
    }

    egui::ScrollArea::vertical()
        .id_salt("questions_scroll")
        .show(ui, |ui| {
            for question in dashboard.questions() {
                theme::card_frame(false).show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.horizontal(|ui| {
                        theme::badge(
                            ui,
                            question.difficulty.label(language),
                            theme::difficulty_color(question.difficulty),
                        );
                        ui.label(
                            egui::RichText::new(format!("Material #{}", question.material_id))
                                .color(theme::MUTED_TEXT),
                        );
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.small_button("Copy").clicked() {
                                actions.push(UiAction::CopyText(question.text.clone()));
                            }
                        });
                    });
                    ui.label(&question.text);
                });
                ui.add_space(6.0);
            }
        });
}

pub fn exams_tab(ui: &mut egui::Ui, dashboard: &DashboardController) {
    section_heading(ui, "Exam tickets", "Exams assembled for testing");
    let language = dashboard.settings().language;

    for exam in dashboard.exams() {
        theme::card_frame(false).show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new(&exam.name).strong());
            ui.horizontal(|ui| {
                theme::badge(
                    ui,
                    exam.difficulty.label(language),
                    theme::difficulty_color(exam.difficulty),
                );
                ui.label(exam.created_date.to_string());
                ui.label(format!("{} questions", exam.question_count));
            });
        });
        ui.add_space(6.0);
    }
}

pub fn analytics_tab(ui: &mut egui::Ui, snapshot: &AnalyticsSnapshot, language: GenerationLanguage) {
    section_heading(ui, "Analytics", "Figures computed from the current library");

    ui.columns(2, |columns| {
        theme::card_frame(false).show(&mut columns[0], |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new("Questions by difficulty").strong());
            for share in &snapshot.difficulty_distribution {
                ui.horizontal(|ui| {
                    ui.label(share.difficulty.label(language));
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("{}%", share.percent));
                    });
                });
                ui.add(
                    egui::ProgressBar::new(share.percent as f32 / 100.0)
                        .fill(theme::difficulty_color(share.difficulty)),
                );
            }
        });

        theme::card_frame(false).show(&mut columns[1], |ui| {
            ui.set_min_width(ui.available_width());
            ui.label(egui::RichText::new("Generation activity").strong());
            for (label, count) in [
                ("Today", snapshot.activity.today),
                ("Last 7 days", snapshot.activity.last_7_days),
                ("Last 30 days", snapshot.activity.last_30_days),
            ] {
                ui.horizontal(|ui| {
                    ui.label(label);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(format!("{count} questions"));
                    });
                });
            }
        });
    });

    ui.add_space(8.0);
    let performance = &snapshot.performance;
    theme::card_frame(false).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.label(egui::RichText::new("AI performance").strong());
        ui.horizontal(|ui| {
            let rate = performance
                .success_rate
                .map(|rate| format!("{:.0}%", rate * 100.0))
                .unwrap_or_else(|| "n/a".to_string());
            let latency = performance
                .mean_latency
                .map(|latency| format!("{:.1}s", latency.as_secs_f32()))
                .unwrap_or_else(|| "n/a".to_string());
            for (value, label) in [
                (rate, "success rate"),
                (latency, "avg. generation time"),
                (performance.attempts.to_string(), "requests"),
                (performance.generated_questions.to_string(), "questions generated"),
            ] {
                ui.vertical(|ui| {
                    ui.label(egui::RichText::new(value).size(22.0).strong().color(theme::PRIMARY));
                    ui.label(egui::RichText::new(label).color(theme::MUTED_TEXT));
                });
                ui.add_space(24.0);
            }
        });
    });
}

pub fn settings_tab(
    ui: &mut egui::Ui,
    dashboard: &DashboardController,
    actions: &mut Vec<UiAction>,
) {
    section_heading(ui, "Generation settings", "Tune how questions are generated");
    let settings = dashboard.settings();

    let mut question_count = settings.question_count;
    let mut difficulty_level = settings.difficulty_level;

    ui.label("Questions per generation");
    ui.add(
        egui::Slider::new(&mut question_count, QUESTION_COUNT_MIN..=QUESTION_COUNT_MAX)
            .step_by(f64::from(QUESTION_COUNT_STEP)),
    );
    ui.add_space(8.0);

    ui.label("Difficulty level");
    ui.add(
        egui::Slider::new(&mut difficulty_level, 0..=DIFFICULTY_LEVEL_MAX)
            .step_by(f64::from(DIFFICULTY_LEVEL_STEP))
            .suffix("%"),
    );
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("Resolves to").color(theme::MUTED_TEXT));
        let difficulty = shared::domain::Difficulty::from_level(difficulty_level);
        theme::badge(
            ui,
            difficulty.label(settings.language),
            theme::difficulty_color(difficulty),
        );
    });

    if question_count != settings.question_count || difficulty_level != settings.difficulty_level {
        actions.push(UiAction::UpdateSettings {
            question_count,
            difficulty_level,
        });
    }

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        let mut language = settings.language;
        egui::ComboBox::from_id_salt("generation_language")
            .selected_text(language.label())
            .show_ui(ui, |ui| {
                for option in GenerationLanguage::ALL {
                    ui.selectable_value(&mut language, option, option.label());
                }
            });
        ui.label("Generation language");
        if language != settings.language {
            actions.push(UiAction::SetLanguage(language));
        }
    });

    ui.horizontal(|ui| {
        let mut export_format = settings.export_format;
        egui::ComboBox::from_id_salt("export_format")
            .selected_text(export_format.label())
            .show_ui(ui, |ui| {
                for option in ExportFormat::ALL {
                    ui.selectable_value(&mut export_format, option, option.label());
                }
            });
        ui.label("Export format");
        if export_format != settings.export_format {
            actions.push(UiAction::SetExportFormat(export_format));
        }
    });

    ui.add_space(12.0);
    ui.horizontal(|ui| {
        if ui.button("Reset").clicked() {
            actions.push(UiAction::ResetSettings);
        }
        if ui.button("Save settings").clicked() {
            actions.push(UiAction::SaveSettings);
        }
        if ui.button("Export library…").clicked() {
            actions.push(UiAction::Export);
        }
    });
}
