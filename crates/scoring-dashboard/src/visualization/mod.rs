//! Chart models comparing the selected client against the whole catalog.
//!
//! Only data is produced here; drawing is left to whichever front-end consumes the view.

mod correlation;
mod stats;

use serde::Serialize;

use crate::catalog::{Catalog, ClientId, ColumnKind, FeatureValue};

pub use correlation::{CorrelationCell, CorrelationHeatmap, MAX_CORRELATION_COLUMNS};
pub use stats::BoxSummary;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisualizationError {
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureChart {
    Scatter(ScatterChart),
    Distribution(DistributionChart),
    Counts(CountChart),
}

impl FeatureChart {
    pub fn title(&self) -> &str {
        match self {
            FeatureChart::Scatter(chart) => &chart.title,
            FeatureChart::Distribution(chart) => &chart.title,
            FeatureChart::Counts(chart) => &chart.title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScatterPoint {
    pub client_id: ClientId,
    pub x: f64,
    pub y: f64,
}

/// Numeric × numeric: every client, plus the selected one overlaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_feature: String,
    pub y_feature: String,
    pub points: Vec<ScatterPoint>,
    pub highlight: Option<ScatterPoint>,
}

/// Which axis carries the categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Categories along x, values along y.
    Vertical,
    /// Categories along y, values along x.
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: String,
    pub count: usize,
    pub summary: BoxSummary,
    pub outliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryPoint {
    pub client_id: ClientId,
    pub category: String,
    /// Index of `category` within the chart's groups.
    pub position: usize,
    pub value: f64,
}

/// Numeric × categorical: one box per category, selected client overlaid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionChart {
    pub title: String,
    pub numeric_feature: String,
    pub category_feature: String,
    pub orientation: Orientation,
    pub groups: Vec<CategoryGroup>,
    pub highlight: Option<CategoryPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HueCount {
    pub hue: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountGroup {
    pub category: String,
    pub total: usize,
    pub counts: Vec<HueCount>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountHighlight {
    pub client_id: ClientId,
    pub category: String,
    pub hue: String,
}

/// Categorical × categorical: counts of the second feature within each category of the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountChart {
    pub title: String,
    pub x_feature: String,
    pub hue_feature: String,
    pub hues: Vec<String>,
    pub groups: Vec<CountGroup>,
    pub highlight: Option<CountHighlight>,
}

/// Pick the chart kind from the two features' column kinds and build it.
pub fn feature_chart(
    catalog: &Catalog,
    first: &str,
    second: &str,
    selected: ClientId,
) -> Result<FeatureChart, VisualizationError> {
    let first_kind = catalog
        .column_kind(first)
        .ok_or_else(|| VisualizationError::UnknownFeature(first.to_string()))?;
    let second_kind = catalog
        .column_kind(second)
        .ok_or_else(|| VisualizationError::UnknownFeature(second.to_string()))?;

    let chart = match (first_kind, second_kind) {
        (ColumnKind::Numeric, ColumnKind::Numeric) => {
            FeatureChart::Scatter(scatter(catalog, first, second, selected))
        }
        (ColumnKind::Categorical, ColumnKind::Numeric) => FeatureChart::Distribution(
            distribution(catalog, first, second, Orientation::Vertical, selected),
        ),
        (ColumnKind::Numeric, ColumnKind::Categorical) => FeatureChart::Distribution(
            distribution(catalog, second, first, Orientation::Horizontal, selected),
        ),
        (ColumnKind::Categorical, ColumnKind::Categorical) => {
            FeatureChart::Counts(counts(catalog, first, second, selected))
        }
    };

    Ok(chart)
}

/// `(client, first, second)` for every record with both values present.
fn paired_values<'a>(
    catalog: &'a Catalog,
    first: &'a str,
    second: &'a str,
) -> impl Iterator<Item = (ClientId, &'a FeatureValue, &'a FeatureValue)> + 'a {
    catalog.records().iter().filter_map(move |record| {
        let a = catalog.value(record, first)?;
        let b = catalog.value(record, second)?;
        if a.is_missing() || b.is_missing() {
            None
        } else {
            Some((record.id, a, b))
        }
    })
}

fn scatter(catalog: &Catalog, x: &str, y: &str, selected: ClientId) -> ScatterChart {
    let points: Vec<ScatterPoint> = paired_values(catalog, x, y)
        .filter_map(|(client_id, a, b)| {
            Some(ScatterPoint {
                client_id,
                x: a.as_number()?,
                y: b.as_number()?,
            })
        })
        .collect();
    let highlight = points
        .iter()
        .find(|point| point.client_id == selected)
        .copied();

    ScatterChart {
        title: format!("Relation entre {x} et {y}"),
        x_feature: x.to_string(),
        y_feature: y.to_string(),
        points,
        highlight,
    }
}

fn distribution(
    catalog: &Catalog,
    category_feature: &str,
    numeric_feature: &str,
    orientation: Orientation,
    selected: ClientId,
) -> DistributionChart {
    // categories keep first-appearance order
    let mut buckets: Vec<(String, Vec<f64>)> = Vec::new();
    let mut highlight = None;
    for (client_id, category, value) in paired_values(catalog, category_feature, numeric_feature)
    {
        let (Some(category), Some(value)) = (category.as_category(), value.as_number()) else {
            continue;
        };
        let position = match buckets.iter().position(|(name, _)| name == category) {
            Some(position) => position,
            None => {
                buckets.push((category.to_string(), Vec::new()));
                buckets.len() - 1
            }
        };
        buckets[position].1.push(value);

        if client_id == selected {
            highlight = Some(CategoryPoint {
                client_id,
                category: category.to_string(),
                position,
                value,
            });
        }
    }

    let groups = buckets
        .into_iter()
        .filter_map(|(category, values)| {
            let (summary, outliers) = BoxSummary::from_values(&values)?;
            Some(CategoryGroup {
                category,
                count: values.len(),
                summary,
                outliers,
            })
        })
        .collect();

    DistributionChart {
        title: format!("Distribution de {numeric_feature} en fonction de {category_feature}"),
        numeric_feature: numeric_feature.to_string(),
        category_feature: category_feature.to_string(),
        orientation,
        groups,
        highlight,
    }
}

fn counts(catalog: &Catalog, x: &str, hue: &str, selected: ClientId) -> CountChart {
    let mut hues: Vec<String> = Vec::new();
    let mut groups: Vec<CountGroup> = Vec::new();
    let mut highlight = None;

    for (client_id, category, hue_value) in paired_values(catalog, x, hue) {
        let (Some(category), Some(hue_value)) = (category.as_category(), hue_value.as_category())
        else {
            continue;
        };
        if !hues.iter().any(|known| known == hue_value) {
            hues.push(hue_value.to_string());
        }

        let group_index = match groups.iter().position(|group| group.category == category) {
            Some(index) => index,
            None => {
                groups.push(CountGroup {
                    category: category.to_string(),
                    total: 0,
                    counts: Vec::new(),
                });
                groups.len() - 1
            }
        };
        let group = &mut groups[group_index];
        group.total += 1;
        match group.counts.iter_mut().find(|entry| entry.hue == hue_value) {
            Some(entry) => entry.count += 1,
            None => group.counts.push(HueCount {
                hue: hue_value.to_string(),
                count: 1,
            }),
        }

        if client_id == selected {
            highlight = Some(CountHighlight {
                client_id,
                category: category.to_string(),
                hue: hue_value.to_string(),
            });
        }
    }

    // every group lists every hue, zero-filled, in first-appearance order
    for group in &mut groups {
        let counts = hues
            .iter()
            .map(|hue| HueCount {
                hue: hue.clone(),
                count: group
                    .counts
                    .iter()
                    .find(|entry| &entry.hue == hue)
                    .map_or(0, |entry| entry.count),
            })
            .collect();
        group.counts = counts;
    }

    CountChart {
        title: format!("Répartition de {hue} en fonction de {x}"),
        x_feature: x.to_string(),
        hue_feature: hue.to_string(),
        hues,
        groups,
        highlight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV: &str = "id,income,credit,contract,gender\n\
100,50000,20000,Cash loans,F\n\
200,80000,30000,Revolving loans,M\n\
300,65000,,Cash loans,F\n\
400,72000,41000,Cash loans,M\n";

    fn catalog() -> Catalog {
        Catalog::from_reader(Cursor::new(CSV), "id").expect("catalog parses")
    }

    fn id(raw: u64) -> ClientId {
        ClientId::new(raw).expect("positive id")
    }

    #[test]
    fn numeric_pair_builds_scatter_with_single_highlight() {
        let chart = feature_chart(&catalog(), "income", "credit", id(100)).expect("chart");
        let FeatureChart::Scatter(scatter) = chart else {
            panic!("expected scatter");
        };
        // client 300 has no credit value
        assert_eq!(scatter.points.len(), 3);
        assert_eq!(
            scatter.highlight,
            Some(ScatterPoint {
                client_id: id(100),
                x: 50000.0,
                y: 20000.0,
            })
        );
        assert_eq!(scatter.title, "Relation entre income et credit");
    }

    #[test]
    fn scatter_has_no_highlight_for_unknown_client() {
        let chart = feature_chart(&catalog(), "income", "credit", id(999)).expect("chart");
        let FeatureChart::Scatter(scatter) = chart else {
            panic!("expected scatter");
        };
        assert!(scatter.highlight.is_none());
    }

    #[test]
    fn categorical_then_numeric_builds_vertical_boxes() {
        let chart = feature_chart(&catalog(), "contract", "income", id(200)).expect("chart");
        let FeatureChart::Distribution(distribution) = chart else {
            panic!("expected distribution");
        };
        assert_eq!(distribution.orientation, Orientation::Vertical);
        assert_eq!(distribution.numeric_feature, "income");
        let categories: Vec<&str> = distribution
            .groups
            .iter()
            .map(|group| group.category.as_str())
            .collect();
        assert_eq!(categories, ["Cash loans", "Revolving loans"]);
        assert_eq!(distribution.groups[0].count, 3);
        assert_eq!(distribution.groups[0].summary.median, 65000.0);

        let highlight = distribution.highlight.expect("selected client overlaid");
        assert_eq!(highlight.category, "Revolving loans");
        assert_eq!(highlight.position, 1);
        assert_eq!(highlight.value, 80000.0);
    }

    #[test]
    fn numeric_then_categorical_builds_horizontal_boxes() {
        let chart = feature_chart(&catalog(), "credit", "gender", id(300)).expect("chart");
        let FeatureChart::Distribution(distribution) = chart else {
            panic!("expected distribution");
        };
        assert_eq!(distribution.orientation, Orientation::Horizontal);
        assert_eq!(distribution.category_feature, "gender");
        assert_eq!(
            distribution.title,
            "Distribution de credit en fonction de gender"
        );
        // client 300 is missing credit, so nothing is overlaid
        assert!(distribution.highlight.is_none());
    }

    #[test]
    fn categorical_pair_builds_zero_filled_counts() {
        let chart = feature_chart(&catalog(), "contract", "gender", id(400)).expect("chart");
        let FeatureChart::Counts(counts) = chart else {
            panic!("expected counts");
        };
        assert_eq!(counts.hues, ["F", "M"]);
        assert_eq!(counts.groups.len(), 2);

        let cash = &counts.groups[0];
        assert_eq!(cash.category, "Cash loans");
        assert_eq!(cash.total, 3);
        assert_eq!(
            cash.counts,
            [
                HueCount {
                    hue: "F".to_string(),
                    count: 2
                },
                HueCount {
                    hue: "M".to_string(),
                    count: 1
                },
            ]
        );

        let revolving = &counts.groups[1];
        assert_eq!(revolving.counts[0].count, 0);
        assert_eq!(revolving.counts[1].count, 1);

        let highlight = counts.highlight.expect("selected pair flagged");
        assert_eq!(highlight.category, "Cash loans");
        assert_eq!(highlight.hue, "M");
    }

    #[test]
    fn unknown_feature_is_reported() {
        let error = feature_chart(&catalog(), "income", "nope", id(100)).expect_err("unknown");
        assert_eq!(error, VisualizationError::UnknownFeature("nope".to_string()));
    }
}
