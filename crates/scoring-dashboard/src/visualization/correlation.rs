use serde::Serialize;

use super::stats::pearson;
use crate::catalog::Catalog;

/// Only the leading numeric columns are correlated, matching the dashboard layout.
pub const MAX_CORRELATION_COLUMNS: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationCell {
    pub row: usize,
    pub column: usize,
    /// `None` when the pair has fewer than two complete observations or no variance.
    pub value: Option<f64>,
    pub emphasized: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationHeatmap {
    pub title: String,
    pub features: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emphasized: Option<usize>,
    pub cells: Vec<CorrelationCell>,
}

impl CorrelationHeatmap {
    /// Build the matrix over the first [`MAX_CORRELATION_COLUMNS`] numeric columns.
    ///
    /// The identifier column is not a feature, so it never takes one of those slots.
    ///
    /// Returns `None` when the catalog has no numeric feature at all.
    pub fn build(catalog: &Catalog, emphasize: Option<&str>) -> Option<Self> {
        let features: Vec<String> = catalog
            .numeric_columns()
            .take(MAX_CORRELATION_COLUMNS)
            .map(|column| column.name.clone())
            .collect();
        if features.is_empty() {
            return None;
        }

        let series: Vec<Vec<Option<f64>>> = features
            .iter()
            .map(|name| {
                catalog
                    .records()
                    .iter()
                    .map(|record| catalog.value(record, name).and_then(|v| v.as_number()))
                    .collect()
            })
            .collect();

        let emphasized =
            emphasize.and_then(|name| features.iter().position(|feature| feature == name));

        let size = features.len();
        let mut cells = Vec::with_capacity(size * size);
        for row in 0..size {
            for column in 0..size {
                let value = if row == column {
                    pearson(&series[row], &series[column]).map(|_| 1.0)
                } else {
                    pearson(&series[row], &series[column])
                };
                cells.push(CorrelationCell {
                    row,
                    column,
                    value,
                    emphasized: emphasized.is_some_and(|index| index == row || index == column),
                });
            }
        }

        let title = match emphasized {
            Some(index) => format!("Matrice de corrélation - {} mis en évidence", features[index]),
            None => "Matrice de corrélation des features numériques".to_string(),
        };

        Some(Self {
            title,
            features,
            emphasized,
            cells,
        })
    }

    pub fn size(&self) -> usize {
        self.features.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CorrelationCell> {
        if row >= self.size() || column >= self.size() {
            return None;
        }
        self.cells.get(row * self.size() + column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn catalog(csv: &str) -> Catalog {
        Catalog::from_reader(Cursor::new(csv.to_string()), "id").expect("catalog parses")
    }

    #[test]
    fn emphasizes_selected_row_and_column_only() {
        let catalog = catalog("id,income,credit\n100,50000,20000\n200,80000,30000\n");
        let heatmap = CorrelationHeatmap::build(&catalog, Some("income")).expect("heatmap");

        assert_eq!(heatmap.features, ["income", "credit"]);
        assert_eq!(heatmap.emphasized, Some(0));
        let emphasized: Vec<(usize, usize)> = heatmap
            .cells
            .iter()
            .filter(|cell| cell.emphasized)
            .map(|cell| (cell.row, cell.column))
            .collect();
        assert_eq!(emphasized, [(0, 0), (0, 1), (1, 0)]);
        assert!(!heatmap.cell(1, 1).expect("cell").emphasized);
        assert_eq!(heatmap.cell(0, 1).expect("cell").value, Some(1.0));
        assert!(heatmap.title.contains("income"));
    }

    #[test]
    fn identifier_column_is_not_correlated() {
        let catalog = catalog("id,income,credit\n100,50000,20000\n200,80000,30000\n");
        let heatmap = CorrelationHeatmap::build(&catalog, Some("id")).expect("heatmap");

        assert_eq!(heatmap.features, ["income", "credit"]);
        assert!(heatmap.emphasized.is_none());
    }

    #[test]
    fn limits_matrix_to_leading_numeric_columns() {
        let header: Vec<String> = (0..20).map(|index| format!("f{index}")).collect();
        let row_a: Vec<String> = (0..20).map(|index| index.to_string()).collect();
        let row_b: Vec<String> = (0..20).map(|index| (index * index).to_string()).collect();
        let csv = format!(
            "id,label,{}\n1,a,{}\n2,b,{}\n",
            header.join(","),
            row_a.join(","),
            row_b.join(",")
        );
        let heatmap = CorrelationHeatmap::build(&catalog(&csv), Some("f19")).expect("heatmap");

        assert_eq!(heatmap.size(), MAX_CORRELATION_COLUMNS);
        assert_eq!(heatmap.features.first().map(String::as_str), Some("f0"));
        assert!(heatmap.emphasized.is_none());
        assert!(heatmap.cells.iter().all(|cell| !cell.emphasized));
    }

    #[test]
    fn constant_columns_have_undefined_correlation() {
        let heatmap = CorrelationHeatmap::build(
            &catalog("id,flat,rising\n1,3,1\n2,3,2\n3,3,4\n"),
            None,
        )
        .expect("heatmap");
        assert_eq!(heatmap.cell(0, 0).expect("cell").value, None);
        assert_eq!(heatmap.cell(0, 1).expect("cell").value, None);
        assert_eq!(heatmap.cell(1, 1).expect("cell").value, Some(1.0));
    }

    #[test]
    fn no_numeric_columns_yields_none() {
        let catalog = catalog("id,contract\n1,Cash loans\n2,Revolving loans\n");
        assert!(CorrelationHeatmap::build(&catalog, None).is_none());
    }
}
