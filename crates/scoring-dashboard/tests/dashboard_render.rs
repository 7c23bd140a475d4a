use rand::rngs::StdRng;
use rand::SeedableRng;
use scoring_dashboard::catalog::{Catalog, ClientId, FeatureValue};
use scoring_dashboard::dashboard::{
    render, ChartPanel, ClientInfoPanel, CorrelationPanel, PredictionPanel, ViewQuery,
    NO_CLIENT_INFO,
};
use scoring_dashboard::gateway::{Decision, GatewayError, PredictionResult};
use scoring_dashboard::selection::{Selection, SelectionOrigin, SelectionState};
use scoring_dashboard::visualization::FeatureChart;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data/client_data.csv");

fn load_catalog() -> Catalog {
    Catalog::from_path(FIXTURE, "num__SK_ID_CURR").expect("fixture catalog loads")
}

fn client(raw: u64) -> ClientId {
    ClientId::new(raw).expect("positive id")
}

#[test]
fn fixture_catalog_infers_column_kinds() {
    let catalog = load_catalog();
    assert_eq!(catalog.len(), 12);

    let numeric: Vec<&str> = catalog
        .numeric_columns()
        .map(|column| column.name.as_str())
        .collect();
    assert_eq!(
        numeric,
        vec![
            "num__AMT_INCOME_TOTAL",
            "num__AMT_CREDIT",
            "num__DAYS_BIRTH"
        ]
    );
    assert_eq!(catalog.categorical_columns().count(), 2);

    let record = catalog.get(client(100014)).expect("client present");
    assert_eq!(
        catalog.value(record, "num__AMT_CREDIT"),
        Some(&FeatureValue::Missing)
    );
}

#[test]
fn random_client_flow_renders_full_frame() {
    let catalog = load_catalog();
    let mut rng = StdRng::seed_from_u64(7);
    let mut selection = SelectionState::new();

    let selected = selection.current(&catalog, &mut rng);
    let view = render(&catalog, selected, &ViewQuery::default(), None);

    assert!(view.selection.in_catalog);
    assert_eq!(view.selection.origin, SelectionOrigin::Random);
    assert!(view.prediction.is_none());
    match &view.client_info {
        ClientInfoPanel::Found { rows } => {
            assert_eq!(rows[0].feature, "num__SK_ID_CURR");
            assert_eq!(
                rows[0].value,
                FeatureValue::Number(selected.client_id.get() as f64)
            );
            assert_eq!(rows.len(), 6);
        }
        other => panic!("expected client info, got {other:?}"),
    }
    match &view.feature_chart {
        ChartPanel::Chart {
            chart: FeatureChart::Scatter(chart),
        } => {
            assert_eq!(chart.x_feature, "num__AMT_INCOME_TOTAL");
            assert_eq!(chart.y_feature, "num__AMT_CREDIT");
            // the client without a credit amount is left out
            assert_eq!(chart.points.len(), 11);
        }
        other => panic!("expected scatter chart, got {other:?}"),
    }
    match &view.correlation {
        CorrelationPanel::Heatmap { heatmap } => {
            assert_eq!(heatmap.size(), 3);
            assert!(!heatmap.features.iter().any(|name| name == "num__SK_ID_CURR"));
        }
        other => panic!("expected heatmap, got {other:?}"),
    }
}

#[test]
fn entered_client_with_granted_prediction() {
    let catalog = load_catalog();
    let mut selection = SelectionState::new();
    let selected = selection.submit(100004).expect("valid identifier");

    let outcome = Ok(PredictionResult {
        client_id: selected.client_id,
        prediction: 1,
        prediction_proba: 0.1234567,
    });
    let query = ViewQuery {
        feature_x: Some("cat__NAME_CONTRACT_TYPE".to_string()),
        feature_y: Some("num__AMT_INCOME_TOTAL".to_string()),
        correlation_feature: Some("num__AMT_CREDIT".to_string()),
    };
    let view = render(&catalog, selected, &query, Some(&outcome));

    match view.prediction.expect("prediction shown") {
        PredictionPanel::Scored {
            decision,
            probability_display,
            headline,
            ..
        } => {
            assert_eq!(decision, Decision::Granted);
            assert_eq!(probability_display, "0.1235");
            assert_eq!(headline, "Prêt accordé: 😊");
        }
        other => panic!("expected scored prediction, got {other:?}"),
    }
    match &view.feature_chart {
        ChartPanel::Chart {
            chart: FeatureChart::Distribution(chart),
        } => {
            let highlight = chart.highlight.as_ref().expect("client overlaid");
            assert_eq!(highlight.category, "Revolving loans");
            assert_eq!(highlight.value, 67500.0);
            assert_eq!(chart.groups.len(), 2);
        }
        other => panic!("expected distribution chart, got {other:?}"),
    }
    match &view.correlation {
        CorrelationPanel::Heatmap { heatmap } => assert_eq!(heatmap.emphasized, Some(1)),
        other => panic!("expected heatmap, got {other:?}"),
    }
}

#[test]
fn unknown_client_shows_notice_and_gateway_message() {
    let catalog = load_catalog();
    let mut selection = SelectionState::new();
    let selected = selection.submit(999999).expect("valid identifier");

    let outcome = Err(GatewayError::Server {
        status: 404,
        message: "Client ID 999999 not found".to_string(),
    });
    let view = render(&catalog, selected, &ViewQuery::default(), Some(&outcome));

    assert!(!view.selection.in_catalog);
    assert_eq!(view.selection.message, "Client ID saisi : 999999");
    assert_eq!(
        view.client_info,
        ClientInfoPanel::NotFound {
            message: NO_CLIENT_INFO
        }
    );
    assert_eq!(
        view.prediction,
        Some(PredictionPanel::Failed {
            message: "Client ID 999999 not found".to_string()
        })
    );
    match &view.feature_chart {
        ChartPanel::Chart {
            chart: FeatureChart::Scatter(chart),
        } => assert!(chart.highlight.is_none()),
        other => panic!("expected scatter chart, got {other:?}"),
    }
}

#[test]
fn categorical_pair_counts_each_combination() {
    let catalog = load_catalog();
    let query = ViewQuery {
        feature_x: Some("cat__NAME_CONTRACT_TYPE".to_string()),
        feature_y: Some("cat__CODE_GENDER".to_string()),
        correlation_feature: None,
    };
    let view = render(&catalog, Selection::entered(client(100002)), &query, None);

    match &view.feature_chart {
        ChartPanel::Chart {
            chart: FeatureChart::Counts(chart),
        } => {
            let total: usize = chart.groups.iter().map(|group| group.total).sum();
            assert_eq!(total, 12);
            let highlight = chart.highlight.as_ref().expect("client overlaid");
            assert_eq!(highlight.category, "Cash loans");
            assert_eq!(highlight.hue, "M");
        }
        other => panic!("expected count chart, got {other:?}"),
    }
}
