use std::fmt::Write as _;

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use serde::{Deserialize, Serialize};

use super::domain::ProcessId;
use super::ranking::RankingEntry;

/// Column order of every ranking export.
pub const EXPORT_HEADERS: [&str; 5] = [
    "Posição",
    "Nome do Candidato",
    "Cargo",
    "Pontuação",
    "Data da Avaliação",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Csv,
    Table,
}

impl ExportFormat {
    pub fn sink(self) -> Box<dyn ExportSink> {
        match self {
            ExportFormat::Csv => Box::new(CsvExport),
            ExportFormat::Table => Box::new(TableExport),
        }
    }
}

/// Ranking row with every cell already formatted for output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub position: String,
    pub candidate_name: String,
    pub position_title: String,
    pub score: String,
    pub evaluated_on: String,
}

impl ExportRow {
    fn cells(&self) -> [&str; 5] {
        [
            self.position.as_str(),
            self.candidate_name.as_str(),
            self.position_title.as_str(),
            self.score.as_str(),
            self.evaluated_on.as_str(),
        ]
    }
}

/// Downloadable export payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no approved candidates to export for process '{0}'")]
    EmptyRanking(String),
    #[error("invalid export date format '{0}'")]
    DateFormat(String),
    #[error("failed to write csv export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to render export: {0}")]
    Render(String),
}

/// Renderer for a ranked list; rasterizing sinks plug in here.
pub trait ExportSink: Send + Sync {
    fn render(&self, process_id: &ProcessId, rows: &[ExportRow])
        -> Result<ExportArtifact, ExportError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvExport;

impl ExportSink for CsvExport {
    fn render(
        &self,
        process_id: &ProcessId,
        rows: &[ExportRow],
    ) -> Result<ExportArtifact, ExportError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(EXPORT_HEADERS)?;
        for row in rows {
            writer.write_record(row.cells())?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|err| ExportError::Render(err.to_string()))?;

        Ok(ExportArtifact {
            file_name: format!("ranking-{}.csv", process_id.0),
            content_type: mime::TEXT_CSV_UTF_8.to_string(),
            bytes,
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TableExport;

impl ExportSink for TableExport {
    fn render(
        &self,
        process_id: &ProcessId,
        rows: &[ExportRow],
    ) -> Result<ExportArtifact, ExportError> {
        let mut table = Table::new();
        table
            .load_preset(presets::ASCII_FULL)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(EXPORT_HEADERS.iter().map(|header| Cell::new(header)));

        for row in rows {
            table.add_row(vec![
                Cell::new(&row.position).set_alignment(CellAlignment::Right),
                Cell::new(&row.candidate_name),
                Cell::new(&row.position_title),
                Cell::new(&row.score).set_alignment(CellAlignment::Right),
                Cell::new(&row.evaluated_on),
            ]);
        }

        let mut rendered = table.to_string();
        rendered.push('\n');

        Ok(ExportArtifact {
            file_name: format!("ranking-{}.txt", process_id.0),
            content_type: mime::TEXT_PLAIN_UTF_8.to_string(),
            bytes: rendered.into_bytes(),
        })
    }
}

pub fn project_rows(
    entries: &[RankingEntry],
    date_format: &str,
) -> Result<Vec<ExportRow>, ExportError> {
    entries
        .iter()
        .map(|entry| {
            let mut evaluated_on = String::new();
            write!(evaluated_on, "{}", entry.evaluated_on.format(date_format))
                .map_err(|_| ExportError::DateFormat(date_format.to_string()))?;

            Ok(ExportRow {
                position: entry.position.to_string(),
                candidate_name: entry.candidate_name.clone(),
                position_title: entry.position_title.clone(),
                score: format!("{:.1}", entry.score),
                evaluated_on,
            })
        })
        .collect()
}

/// Refuses to produce an artifact for an empty ranking.
pub fn export_ranking(
    process_id: &ProcessId,
    entries: &[RankingEntry],
    sink: &dyn ExportSink,
    date_format: &str,
) -> Result<ExportArtifact, ExportError> {
    if entries.is_empty() {
        return Err(ExportError::EmptyRanking(process_id.0.clone()));
    }

    let rows = project_rows(entries, date_format)?;
    sink.render(process_id, &rows)
}
