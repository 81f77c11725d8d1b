pub mod console;
pub mod runner;

pub use runner::{AlertDispatch, CostMonitorApp, RunMode, RunOutcome};
