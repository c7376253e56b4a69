use std::fmt::{self, Write};

use _model::{ResultRecord, SearchParams, UNAVAILABLE};
use clap::ValueEnum;
use itertools::Itertools;
use serde::Serialize;

use crate::error::ExportError;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Json,
    Csv,
}

impl ExportFormat {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Txt => "resultados.txt",
            Self::Json => "resultados.json",
            Self::Csv => "resultados.csv",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Txt => "text/plain",
            Self::Json => "application/json",
            Self::Csv => "text/csv",
        }
    }
}

/// A rendered export, ready to be handed to whatever delivers the file.
#[derive(Debug)]
pub struct Export {
    pub file_name: &'static str,
    pub mime_type: &'static str,
    pub contents: String,
}

pub fn export(
    format: ExportFormat,
    params: &SearchParams,
    results: &[ResultRecord],
) -> Result<Export, ExportError> {
    let contents = match format {
        ExportFormat::Txt => export_text(params, results)?,
        ExportFormat::Json => export_json(params, results)?,
        ExportFormat::Csv => export_csv(params, results)?,
    };

    Ok(Export {
        file_name: format.file_name(),
        mime_type: format.mime_type(),
        contents,
    })
}

const LABELS: [&str; 12] = [
    "Nome",
    "Tipo",
    "Endereço",
    "Telefone",
    "Website",
    "Horário",
    "Avaliação Média",
    "Contagem de Avaliações",
    "Introdução",
    "Compras na Loja",
    "Retirada na Loja",
    "Entrega",
];

enum Field<'a> {
    Text(&'a str),
    Number(String),
    Flag(bool),
}

impl fmt::Display for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(x) => write!(f, "{x}"),
            Self::Number(x) => write!(f, "{x}"),
            Self::Flag(true) => write!(f, "Sim"),
            Self::Flag(false) => write!(f, "Não"),
        }
    }
}

impl Field<'_> {
    /// Text is always quoted with inner quotes doubled, and line breaks are
    /// flattened so a record never spans lines. Numbers and flags go bare.
    fn csv(&self) -> String {
        match self {
            Self::Text(x) => format!(
                "\"{}\"",
                x.replace(['\r', '\n'], " ").replace('"', "\"\"")
            ),
            x => x.to_string(),
        }
    }
}

/// Fields in `LABELS` order.
fn fields(record: &ResultRecord) -> [Field<'_>; 12] {
    [
        Field::Text(&record.name),
        Field::Text(&record.kind),
        Field::Text(&record.address),
        Field::Text(&record.phone),
        Field::Text(&record.website),
        Field::Text(&record.opening_hours),
        Field::Number(
            record
                .average_rating
                .clone()
                .unwrap_or_else(|| UNAVAILABLE.to_string()),
        ),
        Field::Number(
            record
                .review_count
                .map_or_else(|| UNAVAILABLE.to_string(), |x| x.to_string()),
        ),
        Field::Text(&record.introduction),
        Field::Flag(record.store_shopping),
        Field::Flag(record.in_store_pickup),
        Field::Flag(record.delivery),
    ]
}

pub fn export_text(params: &SearchParams, results: &[ResultRecord]) -> Result<String, ExportError> {
    if results.is_empty() {
        return Err(ExportError::EmptyResultSet);
    }

    let mut out = String::new();
    writeln!(
        out,
        "Resultados da busca por: {} em {}",
        params.establishment_type, params.location
    )?;
    writeln!(out, "Total de estabelecimentos encontrados: {}", results.len())?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out)?;

    for record in results {
        for (label, field) in LABELS.iter().zip(fields(record)) {
            writeln!(out, "{label}: {field}")?;
        }
        writeln!(out, "{}", "-".repeat(30))?;
        writeln!(out)?;
    }

    Ok(out)
}

#[derive(Serialize)]
struct JsonExport<'a> {
    search_params: &'a SearchParams,
    total_found: usize,
    results: &'a [ResultRecord],
}

pub fn export_json(params: &SearchParams, results: &[ResultRecord]) -> Result<String, ExportError> {
    if results.is_empty() {
        return Err(ExportError::EmptyResultSet);
    }

    let mut out = serde_json::to_string_pretty(&JsonExport {
        search_params: params,
        total_found: results.len(),
        results,
    })?;
    out.push('\n');
    Ok(out)
}

pub fn export_csv(_params: &SearchParams, results: &[ResultRecord]) -> Result<String, ExportError> {
    if results.is_empty() {
        return Err(ExportError::EmptyResultSet);
    }

    let mut out = String::new();
    writeln!(out, "{}", LABELS.iter().join(","))?;
    for record in results {
        writeln!(out, "{}", fields(record).iter().map(Field::csv).join(","))?;
    }
    Ok(out)
}
