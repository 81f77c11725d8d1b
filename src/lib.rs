pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{CostExplorerBilling, SnsAlertSink};
pub use app::{AlertDispatch, CostMonitorApp, RunMode, RunOutcome};
pub use config::{cli::LocalStorage, settings::Settings};
pub use core::{aggregator::CostAggregator, monitor::CostMonitor};
pub use utils::error::{MonitorError, Result};
