use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::{
    config::load_settings, export::export_to_path, AnalyticsSnapshot, DashboardController,
    HttpGenerationClient, NoticeSeverity,
};
use shared::domain::{
    ExportFormat, GenerationLanguage, MaterialId, Question, DIFFICULTY_LEVEL_MAX,
    DIFFICULTY_LEVEL_STEP, QUESTION_COUNT_MAX, QUESTION_COUNT_MIN, QUESTION_COUNT_STEP,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Generate exam questions from study materials")]
struct Cli {
    /// Settings file; defaults to ./marich.toml when present.
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the library, questions, exams and analytics.
    Show,
    /// Add files, pick a material and ask the generation service for questions.
    Generate {
        #[arg(long = "file")]
        files: Vec<PathBuf>,
        /// Material id to generate for; defaults to the first added file.
        #[arg(long)]
        material: Option<String>,
        #[arg(long, default_value_t = 20, value_parser = parse_question_count)]
        count: u32,
        #[arg(long, default_value_t = 50, value_parser = parse_difficulty_level)]
        difficulty: u32,
        #[arg(long)]
        english: bool,
        /// Write the resulting dashboard as JSON.
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

fn parse_question_count(raw: &str) -> Result<u32, String> {
    let value: u32 = raw.parse().map_err(|err| format!("{err}"))?;
    if !(QUESTION_COUNT_MIN..=QUESTION_COUNT_MAX).contains(&value) || value % QUESTION_COUNT_STEP != 0
    {
        return Err(format!(
            "question count must be {QUESTION_COUNT_MIN}..={QUESTION_COUNT_MAX} in steps of {QUESTION_COUNT_STEP}"
        ));
    }
    Ok(value)
}

fn parse_difficulty_level(raw: &str) -> Result<u32, String> {
    let value: u32 = raw.parse().map_err(|err| format!("{err}"))?;
    if value > DIFFICULTY_LEVEL_MAX || value % DIFFICULTY_LEVEL_STEP != 0 {
        return Err(format!(
            "difficulty level must be 0..={DIFFICULTY_LEVEL_MAX} in steps of {DIFFICULTY_LEVEL_STEP}"
        ));
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        Command::Show => {
            let dashboard = DashboardController::default();
            print_library(&dashboard);
            print_questions(&dashboard, dashboard.questions());
            print_exams(&dashboard);
            print_analytics(&dashboard.analytics());
        }
        Command::Generate {
            files,
            material,
            count,
            difficulty,
            english,
            export,
        } => {
            let settings = load_settings(cli.config.as_deref())?;
            let client = HttpGenerationClient::from_settings(&settings)?;
            tracing::info!(endpoint = %client.endpoint(), "using generation endpoint");

            let mut dashboard = DashboardController::default();
            let added = dashboard.add_materials(&files);
            let target = material
                .map(MaterialId)
                .or_else(|| added.first().cloned())
                .unwrap_or_else(|| MaterialId::from("1"));
            dashboard.select_material(target.clone());
            dashboard.update_settings(count, difficulty);
            if english {
                dashboard.set_language(GenerationLanguage::English);
            }

            let result = dashboard.generate_questions(&client).await;
            for notice in dashboard.drain_notices() {
                let marker = match notice.severity {
                    NoticeSeverity::Info => "info",
                    NoticeSeverity::Error => "error",
                };
                println!("[{marker}] {}: {}", notice.title, notice.description);
            }
            result.with_context(|| format!("generation for material {target} failed"))?;

            let generated: Vec<Question> = dashboard
                .questions()
                .iter()
                .filter(|question| question.material_id == target)
                .cloned()
                .collect();
            print_library(&dashboard);
            print_questions(&dashboard, &generated);

            if let Some(path) = export {
                export_to_path(&dashboard, ExportFormat::Json, &path)
                    .with_context(|| format!("failed to export to '{}'", path.display()))?;
                println!("Exported dashboard to {}", path.display());
            }
        }
    }

    Ok(())
}

fn print_library(dashboard: &DashboardController) {
    println!("Materials:");
    for material in dashboard.materials() {
        let selected = if dashboard.selected_material() == Some(&material.id) {
            " (selected)"
        } else {
            ""
        };
        println!(
            "  #{} {} [{}] uploaded {} - {} questions{selected}",
            material.id, material.name, material.kind, material.upload_date, material.questions_generated
        );
    }
}

fn print_questions(dashboard: &DashboardController, questions: &[Question]) {
    let language = dashboard.settings().language;
    println!("Questions:");
    if questions.is_empty() {
        println!("  (none yet)");
    }
    for question in questions {
        println!(
            "  [{}] material #{}: {}",
            question.difficulty.label(language),
            question.material_id,
            question.text
        );
    }
}

fn print_exams(dashboard: &DashboardController) {
    let language = dashboard.settings().language;
    println!("Exams:");
    for exam in dashboard.exams() {
        println!(
            "  {} [{}] created {} - {} questions",
            exam.name,
            exam.difficulty.label(language),
            exam.created_date,
            exam.question_count
        );
    }
}

fn print_analytics(snapshot: &AnalyticsSnapshot) {
    println!(
        "Analytics: {} materials, {} questions, {} exams",
        snapshot.material_count, snapshot.question_count, snapshot.exam_count
    );
    for share in &snapshot.difficulty_distribution {
        println!(
            "  {:<6} {:>3}% ({})",
            share.difficulty, share.percent, share.count
        );
    }
    match snapshot.performance.success_rate {
        Some(rate) => println!("  success rate {:.0}%", rate * 100.0),
        None => println!("  success rate n/a"),
    }
}
