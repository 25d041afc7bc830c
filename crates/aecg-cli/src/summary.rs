//! Terminal and JSON summaries of documents and validation outcomes.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use aecg_model::{AnnotationCode, Code, Document, Series};
use aecg_validate::Defect;

/// What `aecg inspect` reports about a document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub id: Option<String>,
    pub subject: Option<String>,
    pub series: Vec<SeriesSummary>,
    pub total_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    /// Series code, `-` when absent.
    pub kind: String,
    pub sample_rate: Option<f64>,
    pub leads: Vec<LeadSummary>,
    /// Global heart rate from the first annotation set, in its own unit.
    pub heart_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeadSummary {
    pub code: String,
    pub samples: usize,
}

pub fn summarize(document: &Document) -> DocumentSummary {
    DocumentSummary {
        id: document.id.as_ref().map(ToString::to_string),
        subject: document
            .subject()
            .and_then(|subject| subject.id.as_ref())
            .map(ToString::to_string),
        series: document.series.iter().map(summarize_series).collect(),
        total_samples: document.sample_count(),
    }
}

fn summarize_series(series: &Series) -> SeriesSummary {
    let heart_rate = series
        .annotation_sets
        .first()
        .and_then(|set| set.find_by_code(AnnotationCode::HeartRate.as_str()))
        .and_then(|annotation| annotation.value_as_f64());
    SeriesSummary {
        kind: series
            .series_code()
            .map_or_else(|| "-".to_string(), |code| code.as_str().to_string()),
        sample_rate: series.sample_rate(),
        leads: series
            .leads()
            .map(|(lead, samples)| LeadSummary {
                code: lead.as_str().to_string(),
                samples: samples.len(),
            })
            .collect(),
        heart_rate,
    }
}

/// One row per series.
pub fn series_table(summary: &DocumentSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Series"),
        header_cell("Rate (Hz)"),
        header_cell("Leads"),
        header_cell("Samples"),
        header_cell("Heart rate"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    align_column(&mut table, 5, CellAlignment::Right);
    for (index, series) in summary.series.iter().enumerate() {
        let leads = series
            .leads
            .iter()
            .map(|lead| lead.code.trim_start_matches("MDC_ECG_LEAD_"))
            .collect::<Vec<_>>()
            .join(" ");
        let samples: usize = series.leads.iter().map(|lead| lead.samples).sum();
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&series.kind)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            optional_cell(series.sample_rate),
            Cell::new(leads),
            Cell::new(samples),
            optional_cell(series.heart_rate),
        ]);
    }
    table
}

/// Defects in reporting order.
pub fn defect_table(defects: &[Defect]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Rule"),
        header_cell("Path"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for defect in defects {
        table.add_row(vec![
            Cell::new(defect.rule_id()).fg(Color::Red),
            Cell::new(&defect.path),
            Cell::new(defect.message()),
        ]);
    }
    table
}

pub fn print_summary(summary: &DocumentSummary) {
    println!("Document: {}", summary.id.as_deref().unwrap_or("-"));
    println!("Series: {}", summary.series.len());
    println!("Samples: {}", summary.total_samples);
    if !summary.series.is_empty() {
        println!("{}", series_table(summary));
    }
}

pub fn print_defects(defects: &[Defect]) {
    println!("{} defect(s)", defects.len());
    println!("{}", defect_table(defects));
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn optional_cell(value: Option<f64>) -> Cell {
    match value {
        Some(value) => Cell::new(value),
        None => Cell::new("-").fg(Color::DarkGrey),
    }
}
