// Adapters layer: AWS implementations of the domain ports.

pub mod cost_explorer;
pub mod sns;

pub use cost_explorer::CostExplorerBilling;
pub use sns::SnsAlertSink;
