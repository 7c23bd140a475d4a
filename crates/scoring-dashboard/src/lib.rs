pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod gateway;
pub mod selection;
pub mod telemetry;
pub mod visualization;
