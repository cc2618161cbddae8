//! Output formatters for canonical record sequences.

use serde::Serialize;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{PulsarDbError, PulsarDbResult};
use crate::models::{Observation, Pulsar, Telescope};
use crate::query::RecordSet;

/// Rendering selected by a `get` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `{"count": n, "results": [...]}`
    #[default]
    Json,
    /// Aligned plain-text table.
    Table,
    /// Column-oriented frame.
    Frame,
}

impl FromStr for OutputFormat {
    type Err = PulsarDbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            "frame" | "pandas" | "dataframe" => Ok(Self::Frame),
            other => Err(PulsarDbError::invalid_parameter(format!(
                "unknown output format '{}' (accepted: json, table, frame)",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Table => "table",
            Self::Frame => "frame",
        })
    }
}

/// Records with a fixed column layout.
pub trait Columnar: Serialize {
    const COLUMNS: &'static [&'static str];
}

impl Columnar for Pulsar {
    const COLUMNS: &'static [&'static str] = &["name", "ra", "dec", "aliases"];
}

impl Columnar for Telescope {
    const COLUMNS: &'static [&'static str] = &["name", "aliases", "receivers", "backends"];
}

impl Columnar for Observation {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "pulsar",
        "telescope",
        "frequency",
        "project",
        "submitter",
        "backend",
        "receiver",
        "start",
        "stop",
        "notes",
    ];
}

/// Column-oriented view of a record sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordFrame {
    pub columns: Vec<String>,
    pub data: BTreeMap<String, Vec<Value>>,
}

impl RecordFrame {
    pub fn len(&self) -> usize {
        self.data.values().next().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.data.get(name).map(Vec::as_slice)
    }
}

/// A rendered result.
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    Json(Value),
    Table(String),
    Frame(RecordFrame),
}

impl fmt::Display for Rendered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(value) => write!(f, "{:#}", value),
            Self::Table(text) => f.write_str(text),
            Self::Frame(frame) => match serde_json::to_string_pretty(frame) {
                Ok(text) => f.write_str(&text),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

/// Render `records` in `format`.
pub fn render<T: Columnar>(records: &RecordSet<T>, format: OutputFormat) -> PulsarDbResult<Rendered> {
    let rows = records
        .iter()
        .map(to_object)
        .collect::<PulsarDbResult<Vec<_>>>()?;

    Ok(match format {
        OutputFormat::Json => Rendered::Json(json!({
            "count": rows.len(),
            "results": rows.into_iter().map(Value::Object).collect::<Vec<_>>(),
        })),
        OutputFormat::Table => Rendered::Table(table(T::COLUMNS, &rows)),
        OutputFormat::Frame => Rendered::Frame(frame(T::COLUMNS, rows)),
    })
}

fn to_object<T: Serialize>(record: &T) -> PulsarDbResult<Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(PulsarDbError::validation(format!(
            "record rendered as {} instead of an object",
            other
        ))),
        Err(e) => Err(PulsarDbError::validation(format!("cannot render record: {}", e))),
    }
}

fn frame(columns: &[&str], rows: Vec<Map<String, Value>>) -> RecordFrame {
    let mut data: BTreeMap<String, Vec<Value>> = columns
        .iter()
        .map(|c| (c.to_string(), Vec::with_capacity(rows.len())))
        .collect();
    for mut row in rows {
        for column in columns {
            let cell = row.remove(*column).unwrap_or(Value::Null);
            if let Some(values) = data.get_mut(*column) {
                values.push(cell);
            }
        }
    }
    RecordFrame {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        data,
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| cell_text(Some(v)))
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
    }
}

fn table(columns: &[&str], rows: &[Map<String, Value>]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|c| cell_text(row.get(*c))).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.len()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(cells.len() + 2);
    out.push(line(columns.to_vec()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &cells {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
