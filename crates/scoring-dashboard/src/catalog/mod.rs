//! Read-only client catalog loaded once from the applicant CSV.

mod domain;
mod parser;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use rand::Rng;
use tracing::info;

pub use domain::{
    ApplicantRecord, ClientId, ClientInfo, Column, ColumnKind, FeatureRow, FeatureValue,
};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read client catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid client catalog CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("identifier column '{0}' not found in catalog header")]
    MissingIdColumn(String),
    #[error("line {row}: '{value}' is not a positive integer client identifier")]
    InvalidIdentifier { row: usize, value: String },
    #[error("line {row}: duplicate client identifier {id}")]
    DuplicateIdentifier { row: usize, id: ClientId },
    #[error("client catalog contains no records")]
    Empty,
}

/// In-memory applicant table. Never empty, identifiers unique.
#[derive(Debug, Clone)]
pub struct Catalog {
    id_column: String,
    columns: Vec<Column>,
    records: Vec<ApplicantRecord>,
    index: HashMap<ClientId, usize>,
}

impl Catalog {
    pub fn from_path<P: AsRef<Path>>(path: P, id_column: &str) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file, id_column)?;
        info!(
            path = %path.display(),
            clients = catalog.len(),
            features = catalog.columns.len(),
            "client catalog loaded"
        );
        Ok(catalog)
    }

    pub fn from_reader<R: Read>(reader: R, id_column: &str) -> Result<Self, CatalogError> {
        let table = parser::parse_table(reader, id_column)?;
        let columns = parser::infer_columns(&table);

        let mut records = Vec::with_capacity(table.rows.len());
        let mut index = HashMap::with_capacity(table.rows.len());
        for row in table.rows {
            if index.contains_key(&row.id) {
                return Err(CatalogError::DuplicateIdentifier {
                    row: row.line,
                    id: row.id,
                });
            }

            let values = columns
                .iter()
                .zip(row.cells.iter())
                .map(|(column, cell)| parser::convert_cell(cell, column.kind))
                .collect();

            index.insert(row.id, records.len());
            records.push(ApplicantRecord { id: row.id, values });
        }

        if records.is_empty() {
            return Err(CatalogError::Empty);
        }

        Ok(Self {
            id_column: id_column.to_string(),
            columns,
            records,
            index,
        })
    }

    pub fn id_column(&self) -> &str {
        &self.id_column
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[ApplicantRecord] {
        &self.records
    }

    pub fn ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.records.iter().map(|record| record.id)
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: ClientId) -> Option<&ApplicantRecord> {
        self.index.get(&id).map(|&position| &self.records[position])
    }

    /// Rows matching `id`: one row, or an empty slice when the client is unknown.
    pub fn filter_by_id(&self, id: ClientId) -> &[ApplicantRecord] {
        match self.index.get(&id) {
            Some(&position) => std::slice::from_ref(&self.records[position]),
            None => &[],
        }
    }

    /// Feature columns in file order. The identifier column is not included.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        self.columns
            .iter()
            .find(|column| column.name == name)
            .map(|column| column.kind)
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(|column| column.kind == ColumnKind::Numeric)
    }

    pub fn categorical_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.columns
            .iter()
            .filter(|column| column.kind == ColumnKind::Categorical)
    }

    pub fn value<'a>(&self, record: &'a ApplicantRecord, name: &str) -> Option<&'a FeatureValue> {
        self.column_index(name)
            .and_then(|position| record.values.get(position))
    }

    /// Transposed single-row view of a client, identifier first.
    pub fn describe(&self, id: ClientId) -> Option<ClientInfo> {
        let record = self.get(id)?;
        let mut rows = Vec::with_capacity(self.columns.len() + 1);
        rows.push(FeatureRow {
            feature: self.id_column.clone(),
            value: FeatureValue::Number(id.get() as f64),
        });
        rows.extend(
            self.columns
                .iter()
                .zip(record.values.iter())
                .map(|(column, value)| FeatureRow {
                    feature: column.name.clone(),
                    value: value.clone(),
                }),
        );

        Some(ClientInfo {
            client_id: id,
            rows,
        })
    }

    /// Uniform draw over the catalog's identifiers.
    pub fn random_id<R: Rng + ?Sized>(&self, rng: &mut R) -> ClientId {
        let position = rng.random_range(0..self.records.len());
        self.records[position].id
    }
}
