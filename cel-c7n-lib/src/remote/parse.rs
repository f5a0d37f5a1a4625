use super::DocumentFormat;
use crate::Result;
use csv::ReaderBuilder;
use ohno::IntoAppError;
use serde_json::{Map, Value as JsonValue};

/// Parse document text according to its format
///
/// - `json`: one document
/// - `txt`: a list with one trimmed string per line
/// - `ldjson`: a list with one document per non-blank line
/// - `csv`: a list of rows, each a list of strings
/// - `csv2dict`: a list of rows, each a map keyed by the header row; short rows are
///   padded with `null` and surplus fields are dropped
///
/// # Errors
///
/// Returns an error when the text is not valid for the format.
pub fn parse_text(text: &str, format: DocumentFormat) -> Result<JsonValue> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text).into_app_err("unable to parse JSON document"),
        DocumentFormat::Txt => Ok(JsonValue::Array(text.lines().map(|line| JsonValue::String(line.trim().to_string())).collect())),
        DocumentFormat::Ldjson => parse_lines(text),
        DocumentFormat::Csv => parse_csv_rows(text),
        DocumentFormat::Csv2dict => parse_csv_records(text),
    }
}

fn parse_lines(text: &str) -> Result<JsonValue> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| serde_json::from_str(line).into_app_err_with(|| format!("unable to parse JSON on line {}", index + 1)))
        .collect::<Result<Vec<_>>>()
        .map(JsonValue::Array)
}

fn parse_csv_rows(text: &str) -> Result<JsonValue> {
    let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.into_app_err("unable to parse CSV row")?;
        rows.push(JsonValue::Array(record.iter().map(|field| JsonValue::String(field.to_string())).collect()));
    }

    Ok(JsonValue::Array(rows))
}

fn parse_csv_records(text: &str) -> Result<JsonValue> {
    let mut reader = ReaderBuilder::new().has_headers(true).flexible(true).from_reader(text.as_bytes());
    let headers = reader.headers().into_app_err("unable to parse CSV header row")?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.into_app_err("unable to parse CSV row")?;
        let row: Map<String, JsonValue> = headers
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let value = record.get(index).map_or(JsonValue::Null, |field| JsonValue::String(field.to_string()));
                (name.to_string(), value)
            })
            .collect();
        rows.push(JsonValue::Object(row));
    }

    Ok(JsonValue::Array(rows))
}
