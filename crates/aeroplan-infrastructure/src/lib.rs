pub mod config_service;
pub mod csv_plan_store;
pub mod html_visualization_store;
pub mod paths;

pub use crate::config_service::ConfigService;
pub use crate::csv_plan_store::CsvPlanStore;
pub use crate::html_visualization_store::{HtmlVisualizationStore, SweepReport};
pub use crate::paths::AeroplanPaths;
