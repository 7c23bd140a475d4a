use crate::catalog::{Catalog, ClientId};
use crate::gateway::PredictionOutcome;
use crate::selection::{Selection, SelectionOrigin};
use crate::visualization::{feature_chart, CorrelationHeatmap, MAX_CORRELATION_COLUMNS};

use super::view::{
    ChartPanel, ClientInfoPanel, ControlsView, CorrelationPanel, DashboardView, FeatureOption,
    PredictionPanel, SelectionPanel, ViewQuery, NO_CLIENT_INFO, NO_FEATURES, NO_NUMERIC_COLUMNS,
};

/// Preferred defaults for the two feature selectors when the columns exist.
const DEFAULT_FEATURE_X: &str = "num__AMT_INCOME_TOTAL";
const DEFAULT_FEATURE_Y: &str = "num__AMT_CREDIT";

/// Build the whole dashboard frame. Pure: same inputs, same view.
pub fn render(
    catalog: &Catalog,
    selection: Selection,
    query: &ViewQuery,
    last_result: Option<&PredictionOutcome>,
) -> DashboardView {
    let resolved = ResolvedQuery::resolve(catalog, query);
    let selected = selection.client_id;

    let message = match selection.origin {
        SelectionOrigin::Random => format!("Un client ID a été tiré au sort : {selected}"),
        SelectionOrigin::Entered => format!("Client ID saisi : {selected}"),
    };
    let selection = SelectionPanel {
        client_id: selected,
        origin: selection.origin,
        in_catalog: catalog.contains(selected),
        message,
    };

    let client_info = match catalog.describe(selected) {
        Some(info) => ClientInfoPanel::Found { rows: info.rows },
        None => ClientInfoPanel::NotFound {
            message: NO_CLIENT_INFO,
        },
    };

    let feature_chart = match (&resolved.feature_x, &resolved.feature_y) {
        (Some(x), Some(y)) => match feature_chart(catalog, x, y, selected) {
            Ok(chart) => ChartPanel::Chart { chart },
            Err(error) => ChartPanel::Notice {
                message: error.to_string(),
            },
        },
        _ => ChartPanel::Notice {
            message: NO_FEATURES.to_string(),
        },
    };

    let correlation =
        match CorrelationHeatmap::build(catalog, resolved.correlation_feature.as_deref()) {
            Some(heatmap) => CorrelationPanel::Heatmap { heatmap },
            None => CorrelationPanel::Notice {
                message: NO_NUMERIC_COLUMNS,
            },
        };

    let controls = ControlsView {
        min_client_id: ClientId::MIN,
        features: catalog
            .columns()
            .iter()
            .map(|column| FeatureOption {
                name: column.name.clone(),
                kind: column.kind,
            })
            .collect(),
        correlation_features: correlation_candidates(catalog),
        feature_x: resolved.feature_x,
        feature_y: resolved.feature_y,
        correlation_feature: resolved.correlation_feature,
    };

    DashboardView {
        selection,
        prediction: last_result.map(PredictionPanel::from_outcome),
        client_info,
        feature_chart,
        correlation,
        controls,
    }
}

fn correlation_candidates(catalog: &Catalog) -> Vec<String> {
    catalog
        .numeric_columns()
        .take(MAX_CORRELATION_COLUMNS)
        .map(|column| column.name.clone())
        .collect()
}

/// Query with defaults filled in from the catalog layout.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedQuery {
    feature_x: Option<String>,
    feature_y: Option<String>,
    correlation_feature: Option<String>,
}

impl ResolvedQuery {
    fn resolve(catalog: &Catalog, query: &ViewQuery) -> Self {
        let columns = catalog.columns();
        let preferred = |name: &str, fallback: usize| {
            if catalog.column_kind(name).is_some() {
                Some(name.to_string())
            } else {
                columns
                    .get(fallback)
                    .or_else(|| columns.first())
                    .map(|column| column.name.clone())
            }
        };

        let feature_x = query
            .feature_x
            .clone()
            .or_else(|| preferred(DEFAULT_FEATURE_X, 0));
        let feature_y = query
            .feature_y
            .clone()
            .or_else(|| preferred(DEFAULT_FEATURE_Y, 1));
        let correlation_feature = query
            .correlation_feature
            .clone()
            .or_else(|| correlation_candidates(catalog).into_iter().next());

        Self {
            feature_x,
            feature_y,
            correlation_feature,
        }
    }
}
