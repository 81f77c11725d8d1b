pub mod cli;
pub mod settings;

#[cfg(feature = "cli")]
use crate::app::runner::RunMode;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "cost-monitor")]
#[command(about = "Monitor AWS costs, compare months and raise limit alerts")]
pub struct CliConfig {
    #[arg(long, help = "Generate the full cost report (default mode)")]
    pub report: bool,

    #[arg(long, help = "Only check the monthly limit and alert threshold")]
    pub check_alerts: bool,

    #[arg(long, help = "Costs of the last N days")]
    pub days: Option<u32>,

    #[arg(long, help = "Compare with the previous month")]
    pub compare: bool,

    #[arg(long, default_value = settings::DEFAULT_SETTINGS_PATH)]
    pub config: String,

    #[arg(long, help = "Directory for report files (overrides output_dir)")]
    pub output_dir: Option<String>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// First match wins: --days, --compare, --check-alerts, then the report.
    pub fn mode(&self) -> RunMode {
        if let Some(days) = self.days {
            RunMode::Daily { days }
        } else if self.compare {
            RunMode::Compare
        } else if self.check_alerts {
            RunMode::CheckAlerts
        } else {
            RunMode::Report
        }
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(days) = self.days {
            validation::validate_positive_number("days", u64::from(days), 1)?;
        }

        validation::validate_path("config", &self.config)?;
        validation::validate_file_extensions(
            "config",
            std::slice::from_ref(&self.config),
            &["json", "toml"],
        )?;

        if let Some(dir) = &self.output_dir {
            validation::validate_path("output_dir", dir)?;
        }

        Ok(())
    }
}
