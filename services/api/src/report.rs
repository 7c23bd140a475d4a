use crate::cli::SourceArgs;
use crate::infra::{load_config, parse_client_id};
use clap::Args;
use scoring_dashboard::catalog::{Catalog, ClientId, ClientInfo};
use scoring_dashboard::dashboard::{
    render, ChartPanel, ClientInfoPanel, CorrelationPanel, DashboardView, PredictionPanel,
    ViewQuery, NO_CLIENT_INFO,
};
use scoring_dashboard::error::AppError;
use scoring_dashboard::gateway::{GatewayError, HttpScoringGateway, ScoringGateway};
use scoring_dashboard::selection::{Selection, SelectionState};
use scoring_dashboard::telemetry;
use scoring_dashboard::visualization::FeatureChart;

#[derive(Args, Debug, Default)]
pub(crate) struct ViewArgs {
    /// First feature of the comparison chart
    #[arg(long)]
    pub(crate) feature_x: Option<String>,
    /// Second feature of the comparison chart
    #[arg(long)]
    pub(crate) feature_y: Option<String>,
    /// Feature to emphasize in the correlation matrix
    #[arg(long)]
    pub(crate) correlation_feature: Option<String>,
}

impl From<ViewArgs> for ViewQuery {
    fn from(args: ViewArgs) -> Self {
        ViewQuery {
            feature_x: args.feature_x,
            feature_y: args.feature_y,
            correlation_feature: args.correlation_feature,
        }
    }
}

#[derive(Args, Debug)]
pub(crate) struct ShowArgs {
    /// Client identifier; a random catalog client is drawn when omitted
    #[arg(long, value_parser = parse_client_id)]
    pub(crate) id: Option<ClientId>,
    #[command(flatten)]
    pub(crate) view: ViewArgs,
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Client identifier to score
    #[arg(long, value_parser = parse_client_id)]
    pub(crate) id: ClientId,
    #[command(flatten)]
    pub(crate) view: ViewArgs,
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

#[derive(Args, Debug)]
pub(crate) struct RemoteInfoArgs {
    /// Client identifier to look up on the scoring service
    #[arg(long, value_parser = parse_client_id)]
    pub(crate) id: ClientId,
    #[command(flatten)]
    pub(crate) sources: SourceArgs,
}

pub(crate) fn run_show(args: ShowArgs) -> Result<(), AppError> {
    let ShowArgs { id, view, sources } = args;
    let config = load_config(sources)?;
    telemetry::init(&config.telemetry)?;

    let catalog = Catalog::from_path(&config.dashboard.catalog_path, &config.dashboard.id_column)?;
    let selected = match id {
        Some(id) => Selection::entered(id),
        None => SelectionState::new().current(&catalog, &mut rand::rng()),
    };

    let frame = render(&catalog, selected, &view.into(), None);
    print_view(&frame);
    Ok(())
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs { id, view, sources } = args;
    let config = load_config(sources)?;
    telemetry::init(&config.telemetry)?;

    let catalog = Catalog::from_path(&config.dashboard.catalog_path, &config.dashboard.id_column)?;
    let gateway = HttpScoringGateway::new(config.gateway.base_url.clone());
    let outcome = gateway.predict(id);

    let frame = render(&catalog, Selection::entered(id), &view.into(), Some(&outcome));
    print_view(&frame);
    Ok(())
}

pub(crate) fn run_remote_info(args: RemoteInfoArgs) -> Result<(), AppError> {
    let RemoteInfoArgs { id, sources } = args;
    let config = load_config(sources)?;
    telemetry::init(&config.telemetry)?;

    let gateway = HttpScoringGateway::new(config.gateway.base_url.clone());
    let outcome = gateway.get_client_info(id);
    for line in remote_info_lines(gateway.base_url().as_str(), &outcome) {
        println!("{line}");
    }
    Ok(())
}

/// Every failure ends with the no-information notice; the command itself succeeds.
pub(crate) fn remote_info_lines(
    source: &str,
    outcome: &Result<ClientInfo, GatewayError>,
) -> Vec<String> {
    match outcome {
        Ok(info) if !info.is_empty() => {
            let mut lines = vec![format!(
                "Informations du client {} ({source})",
                info.client_id
            )];
            lines.extend(
                info.rows
                    .iter()
                    .map(|row| format!("- {}: {}", row.feature, row.value)),
            );
            lines
        }
        Ok(_) => vec![NO_CLIENT_INFO.to_string()],
        Err(error) => {
            tracing::warn!(%error, "client info lookup failed");
            vec![format!("Erreur: {error}"), NO_CLIENT_INFO.to_string()]
        }
    }
}

pub(crate) fn print_view(view: &DashboardView) {
    println!("{}", view.selection.message);
    if !view.selection.in_catalog {
        println!("(client absent du catalogue local)");
    }

    match &view.prediction {
        Some(PredictionPanel::Scored {
            prediction,
            probability_display,
            headline,
            ..
        }) => {
            println!("\nPrédiction: {prediction}");
            println!("Probabilité: {probability_display}");
            println!("{headline}");
        }
        Some(PredictionPanel::Failed { message }) => println!("\nErreur: {message}"),
        None => {}
    }

    println!("\nInformations du client");
    match &view.client_info {
        ClientInfoPanel::Found { rows } => {
            for row in rows {
                println!("- {}: {}", row.feature, row.value);
            }
        }
        ClientInfoPanel::NotFound { message } => println!("{message}"),
    }

    match &view.feature_chart {
        ChartPanel::Chart { chart } => print_chart(chart),
        ChartPanel::Notice { message } => println!("\n{message}"),
    }

    match &view.correlation {
        CorrelationPanel::Heatmap { heatmap } => {
            println!("\n{}", heatmap.title);
            for (row, feature) in heatmap.features.iter().enumerate() {
                let marker = if heatmap.emphasized == Some(row) { "*" } else { " " };
                let values: Vec<String> = (0..heatmap.size())
                    .map(|column| match heatmap.cell(row, column).and_then(|c| c.value) {
                        Some(value) => format!("{value:>6.2}"),
                        None => format!("{:>6}", "-"),
                    })
                    .collect();
                println!("{marker} {feature}: {}", values.join(" "));
            }
        }
        CorrelationPanel::Notice { message } => println!("\n{message}"),
    }
}

fn print_chart(chart: &FeatureChart) {
    println!("\n{}", chart.title());
    match chart {
        FeatureChart::Scatter(scatter) => {
            println!("{} points", scatter.points.len());
            match &scatter.highlight {
                Some(point) => println!(
                    "Client {}: {} = {}, {} = {}",
                    point.client_id, scatter.x_feature, point.x, scatter.y_feature, point.y
                ),
                None => println!("Client sélectionné hors graphique"),
            }
        }
        FeatureChart::Distribution(distribution) => {
            for group in &distribution.groups {
                println!(
                    "- {} (n={}): médiane {:.2}, Q1 {:.2}, Q3 {:.2}",
                    group.category,
                    group.count,
                    group.summary.median,
                    group.summary.q1,
                    group.summary.q3
                );
            }
            if let Some(point) = &distribution.highlight {
                println!(
                    "Client {}: {} = {}, {} = {}",
                    point.client_id,
                    distribution.category_feature,
                    point.category,
                    distribution.numeric_feature,
                    point.value
                );
            }
        }
        FeatureChart::Counts(counts) => {
            for group in &counts.groups {
                let breakdown: Vec<String> = group
                    .counts
                    .iter()
                    .map(|entry| format!("{}={}", entry.hue, entry.count))
                    .collect();
                println!(
                    "- {} ({}): {}",
                    group.category,
                    group.total,
                    breakdown.join(", ")
                );
            }
            if let Some(point) = &counts.highlight {
                println!(
                    "Client {}: {} = {}, {} = {}",
                    point.client_id, counts.x_feature, point.category, counts.hue_feature, point.hue
                );
            }
        }
    }
}
