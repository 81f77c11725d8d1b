use crate::config::settings::Settings;
use crate::core::evaluator;
use crate::core::monitor::CostMonitor;
use crate::core::report::ReportWriter;
use crate::domain::model::{ComparisonResult, CostSummary, DailyCostSummary, LimitCheck};
use crate::domain::ports::{AlertSink, BillingApi, Storage};
use crate::utils::error::Result;
use chrono::{DateTime, Local};

pub const ALERT_SUBJECT: &str = "AWS Cost Alert";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Report,
    Daily { days: u32 },
    Compare,
    CheckAlerts,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertDispatch {
    NotTriggered,
    /// Threshold crossed but `email_alerts` is off.
    Disabled,
    /// Threshold crossed but the sink has no destination.
    Unconfigured,
    Dispatched,
    Failed(String),
}

#[derive(Debug, Clone)]
pub enum RunOutcome {
    Report {
        summary: CostSummary,
        limit: LimitCheck,
        files: Vec<String>,
        alert: AlertDispatch,
    },
    Daily {
        days: u32,
        summary: DailyCostSummary,
    },
    Compare(ComparisonResult),
    CheckAlerts {
        check: LimitCheck,
        triggered: bool,
        alert: AlertDispatch,
    },
}

pub fn alert_message(check: &LimitCheck, currency: &str) -> String {
    format!(
        "AWS month-to-date spend is {:.2} {} against a monthly limit of {:.2} {} ({:.1}% used).\nStatus: {}",
        check.current_cost,
        currency,
        check.limit,
        currency,
        check.percentage_used,
        check.status
    )
}

pub struct CostMonitorApp<B: BillingApi, S: Storage, A: AlertSink> {
    monitor: CostMonitor<B>,
    settings: Settings,
    reports: ReportWriter<S>,
    alerts: A,
}

impl<B: BillingApi, S: Storage, A: AlertSink> CostMonitorApp<B, S, A> {
    pub fn new(monitor: CostMonitor<B>, settings: Settings, storage: S, alerts: A) -> Self {
        Self {
            monitor,
            settings,
            reports: ReportWriter::new(storage),
            alerts,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub async fn run(&self, mode: RunMode, now: DateTime<Local>) -> Result<RunOutcome> {
        tracing::debug!("Running {:?} at {}", mode, now);

        match mode {
            RunMode::Report => self.report(now).await,
            RunMode::Daily { days } => self.daily(now, days).await,
            RunMode::Compare => self.compare(now).await,
            RunMode::CheckAlerts => self.check_alerts(now).await,
        }
    }

    async fn report(&self, now: DateTime<Local>) -> Result<RunOutcome> {
        let today = now.date_naive();
        let summary = self.monitor.monthly_costs(today, None, None).await?;
        let limit = self
            .monitor
            .check_cost_limit(today, self.settings.cost_limit_monthly, Some(summary.total))
            .await?;

        let files = self
            .reports
            .write_reports(&summary, now, &self.settings.report_format)
            .await;
        let alert = self.dispatch_alert(&limit).await;

        Ok(RunOutcome::Report {
            summary,
            limit,
            files,
            alert,
        })
    }

    async fn daily(&self, now: DateTime<Local>, days: u32) -> Result<RunOutcome> {
        let summary = self.monitor.daily_costs(now.date_naive(), days).await?;
        Ok(RunOutcome::Daily { days, summary })
    }

    async fn compare(&self, now: DateTime<Local>) -> Result<RunOutcome> {
        let comparison = self
            .monitor
            .compare_with_previous_month(now.date_naive())
            .await?;
        Ok(RunOutcome::Compare(comparison))
    }

    async fn check_alerts(&self, now: DateTime<Local>) -> Result<RunOutcome> {
        let check = self
            .monitor
            .check_cost_limit(now.date_naive(), self.settings.cost_limit_monthly, None)
            .await?;
        let triggered = evaluator::alert_triggered(&check, self.settings.alert_threshold);
        let alert = self.dispatch_alert(&check).await;

        Ok(RunOutcome::CheckAlerts {
            check,
            triggered,
            alert,
        })
    }

    /// Failures are logged and reported in the outcome, never returned.
    async fn dispatch_alert(&self, check: &LimitCheck) -> AlertDispatch {
        if !evaluator::alert_triggered(check, self.settings.alert_threshold) {
            return AlertDispatch::NotTriggered;
        }
        if !self.settings.email_alerts {
            tracing::debug!("Alert threshold reached but email_alerts is disabled");
            return AlertDispatch::Disabled;
        }
        if !self.alerts.is_configured() {
            tracing::warn!("⚠️  Alert threshold reached but no alert destination is configured");
            return AlertDispatch::Unconfigured;
        }

        let message = alert_message(check, &self.settings.currency);
        match self.alerts.send_alert(&message, ALERT_SUBJECT).await {
            Ok(()) => AlertDispatch::Dispatched,
            Err(e) => {
                tracing::error!("❌ {}", e);
                tracing::error!("💡 {}", e.recovery_suggestion());
                AlertDispatch::Failed(e.to_string())
            }
        }
    }
}
