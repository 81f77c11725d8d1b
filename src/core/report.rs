use crate::config::settings::ReportFormat;
use crate::domain::model::CostSummary;
use crate::domain::ports::Storage;
use crate::utils::error::{MonitorError, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct CostReport<'a> {
    pub generated_at: DateTime<Local>,
    pub cost_summary: &'a CostSummary,
    pub report_type: &'static str,
}

pub fn render_json(summary: &CostSummary, generated_at: DateTime<Local>) -> Result<String> {
    let report = CostReport {
        generated_at,
        cost_summary: summary,
        report_type: "monthly_costs",
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

/// `Service,Cost,Percentage` rows, a blank spacer row, then the TOTAL row.
pub fn render_csv(summary: &CostSummary) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(["Service", "Cost", "Percentage"])?;
    for service in &summary.services {
        writer.write_record([
            service.name.clone(),
            format!("{:.2}", service.cost),
            format!("{:.1}%", service.percentage),
        ])?;
    }
    writer.write_record(["", "", ""])?;
    writer.write_record([
        "TOTAL".to_string(),
        format!("{:.2}", summary.total),
        "100.0%".to_string(),
    ])?;

    let bytes = writer.into_inner().map_err(|e| MonitorError::OutputError {
        path: "<csv buffer>".to_string(),
        message: e.to_string(),
    })?;
    String::from_utf8(bytes).map_err(|e| MonitorError::OutputError {
        path: "<csv buffer>".to_string(),
        message: e.to_string(),
    })
}

pub fn report_file_name(generated_at: DateTime<Local>, format: ReportFormat) -> String {
    format!(
        "cost_report_{}.{}",
        generated_at.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

pub struct ReportWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> ReportWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    async fn write_one(
        &self,
        summary: &CostSummary,
        generated_at: DateTime<Local>,
        format: ReportFormat,
    ) -> Result<String> {
        let file_name = report_file_name(generated_at, format);
        let content = match format {
            ReportFormat::Json => render_json(summary, generated_at)?,
            ReportFormat::Csv => render_csv(summary)?,
        };

        self.storage
            .write_file(&file_name, content.as_bytes())
            .await
            .map_err(|e| MonitorError::OutputError {
                path: file_name.clone(),
                message: e.to_string(),
            })
    }

    /// Writes one file per requested format. A failed file is logged and
    /// skipped; the paths that were written are returned.
    pub async fn write_reports(
        &self,
        summary: &CostSummary,
        generated_at: DateTime<Local>,
        formats: &[ReportFormat],
    ) -> Vec<String> {
        let mut written = Vec::new();

        for &format in formats {
            match self.write_one(summary, generated_at, format).await {
                Ok(path) => {
                    tracing::info!("📄 {} report saved: {}", format, path);
                    written.push(path);
                }
                Err(e) => {
                    tracing::error!("❌ {} (Category: {:?})", e, e.category());
                    tracing::error!("💡 {}", e.recovery_suggestion());
                }
            }
        }

        written
    }
}
