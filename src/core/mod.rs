pub mod aggregator;
pub mod evaluator;
pub mod monitor;
pub mod report;

pub use crate::domain::model::{CostSummary, LimitCheck};
pub use crate::domain::ports::{AlertSink, BillingApi, Storage};
pub use crate::utils::error::Result;
