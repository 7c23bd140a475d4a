use std::io::Read;

use super::domain::{ClientId, Column, ColumnKind, FeatureValue};
use super::CatalogError;

/// Raw table pulled out of the CSV before column kinds are known.
#[derive(Debug)]
pub(crate) struct RawTable {
    pub(crate) feature_names: Vec<String>,
    pub(crate) rows: Vec<RawRow>,
}

#[derive(Debug)]
pub(crate) struct RawRow {
    pub(crate) line: usize,
    pub(crate) id: ClientId,
    pub(crate) cells: Vec<String>,
}

pub(crate) fn parse_table<R: Read>(reader: R, id_column: &str) -> Result<RawTable, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let id_index = headers
        .iter()
        .position(|name| strip_bom(name) == id_column)
        .ok_or_else(|| CatalogError::MissingIdColumn(id_column.to_string()))?;

    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(index, _)| *index != id_index)
        .map(|(_, name)| strip_bom(name).to_string())
        .collect();

    let mut rows = Vec::new();
    for (offset, record) in csv_reader.records().enumerate() {
        let record = record?;
        // header occupies line 1
        let line = offset + 2;
        let raw_id = record.get(id_index).unwrap_or_default();
        let id = ClientId::parse_cell(raw_id).ok_or_else(|| CatalogError::InvalidIdentifier {
            row: line,
            value: raw_id.to_string(),
        })?;

        let cells = record
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != id_index)
            .map(|(_, cell)| cell.to_string())
            .collect();

        rows.push(RawRow { line, id, cells });
    }

    Ok(RawTable {
        feature_names,
        rows,
    })
}

/// A column is numeric when every non-missing cell parses as a finite float.
pub(crate) fn infer_columns(table: &RawTable) -> Vec<Column> {
    table
        .feature_names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let numeric = table
                .rows
                .iter()
                .filter_map(|row| row.cells.get(index))
                .filter(|cell| !is_missing(cell))
                .all(|cell| parse_number(cell).is_some());
            Column {
                name: name.clone(),
                kind: if numeric {
                    ColumnKind::Numeric
                } else {
                    ColumnKind::Categorical
                },
            }
        })
        .collect()
}

pub(crate) fn convert_cell(raw: &str, kind: ColumnKind) -> FeatureValue {
    if is_missing(raw) {
        return FeatureValue::Missing;
    }

    match kind {
        ColumnKind::Numeric => parse_number(raw)
            .map(FeatureValue::Number)
            .unwrap_or(FeatureValue::Missing),
        ColumnKind::Categorical => FeatureValue::Category(raw.to_string()),
    }
}

/// Default pandas NA markers; matching is case-sensitive, so `na` stays a value.
const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || MISSING_MARKERS.contains(&trimmed)
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|value| value.is_finite())
}

fn strip_bom(value: &str) -> &str {
    value.trim_start_matches('\u{feff}')
}

#[cfg(test)]
pub(crate) fn is_missing_for_tests(raw: &str) -> bool {
    is_missing(raw)
}
