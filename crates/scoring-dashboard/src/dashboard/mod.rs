//! Dashboard frame rendering, the session-aware service, and its HTTP router.

mod render;
pub mod router;
pub mod service;
pub mod view;

#[cfg(test)]
mod tests;

pub use render::render;
pub use router::dashboard_router;
pub use service::{DashboardService, DashboardServiceError, PredictRequest, SelectionRequest};
pub use view::{
    ChartPanel, ClientInfoPanel, ControlsView, CorrelationPanel, DashboardView, FeatureOption,
    PredictionPanel, SelectionPanel, ViewQuery, NO_CLIENT_INFO, NO_FEATURES, NO_NUMERIC_COLUMNS,
};
