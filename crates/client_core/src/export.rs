use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use serde::Serialize;
use shared::domain::{Exam, ExportFormat, Material, Question};
use thiserror::Error;

use crate::dashboard::DashboardController;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export format {} is not supported yet", .0.label())]
    UnsupportedFormat(ExportFormat),
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Serialize)]
struct ExportDocument<'a> {
    materials: &'a [Material],
    questions: &'a [Question],
    exams: &'a [Exam],
}

pub fn export_to_writer<W: Write>(
    dashboard: &DashboardController,
    format: ExportFormat,
    writer: W,
) -> Result<(), ExportError> {
    if format != ExportFormat::Json {
        return Err(ExportError::UnsupportedFormat(format));
    }

    let document = ExportDocument {
        materials: dashboard.materials(),
        questions: dashboard.questions(),
        exams: dashboard.exams(),
    };
    serde_json::to_writer_pretty(writer, &document)?;
    Ok(())
}

pub fn export_to_path(
    dashboard: &DashboardController,
    format: ExportFormat,
    path: &Path,
) -> Result<(), ExportError> {
    if format != ExportFormat::Json {
        return Err(ExportError::UnsupportedFormat(format));
    }

    let mut writer = BufWriter::new(File::create(path)?);
    export_to_writer(dashboard, format, &mut writer)?;
    writer.flush()?;
    tracing::info!(path = %path.display(), "exported dashboard");
    Ok(())
}
