use crate::app::runner::{AlertDispatch, RunMode, RunOutcome};
use crate::config::settings::Settings;
use crate::domain::model::{
    ComparisonResult, CostSummary, DailyCostSummary, LimitCheck, LimitStatus,
};
use std::fmt::Write;

const WIDE_RULE: &str = "==================================================";
const NARROW_RULE: &str = "----------------------------------------";
const TOP_SERVICES: usize = 5;

pub fn mode_banner(mode: RunMode) -> String {
    match mode {
        RunMode::Report => "📊 Generating cost report...".to_string(),
        RunMode::Daily { days } => format!("📅 Fetching costs for the last {} days...", days),
        RunMode::Compare => "🔄 Comparing with previous month...".to_string(),
        RunMode::CheckAlerts => "⚠️  Checking alerts...".to_string(),
    }
}

pub fn status_badge(status: LimitStatus) -> &'static str {
    match status {
        LimitStatus::LimitExceeded => "🚨 LIMIT EXCEEDED!",
        LimitStatus::NearLimit => "⚠️  ALERT: Near the limit!",
        LimitStatus::Caution => "⚠️  CAUTION: 80% of the limit reached",
        LimitStatus::HalfUsed => "👀 Half of the limit used",
        LimitStatus::WithinLimit => "✅ Within limit",
    }
}

pub fn money(amount: f64, currency: &str) -> String {
    if currency.eq_ignore_ascii_case("USD") {
        format!("${:.2}", amount)
    } else {
        format!("{:.2} {}", amount, currency)
    }
}

pub fn render(outcome: &RunOutcome, settings: &Settings) -> String {
    match outcome {
        RunOutcome::Report {
            summary,
            limit,
            files,
            alert,
        } => {
            let mut out = render_cost_report(summary, limit);
            for file in files {
                let _ = writeln!(out, "📄 Report saved: {}", file);
            }
            out.push_str(&render_alert_dispatch(alert));
            out
        }
        RunOutcome::Daily { days, summary } => render_daily(summary, *days, &settings.currency),
        RunOutcome::Compare(comparison) => render_comparison(comparison),
        RunOutcome::CheckAlerts {
            check,
            triggered,
            alert,
        } => {
            let mut out = format!("Status: {}\n", status_badge(check.status));
            let _ = writeln!(
                out,
                "📊 Usage: {:.1}% of {}",
                check.percentage_used,
                money(check.limit, &settings.currency)
            );
            if *triggered {
                out.push_str("🚨 ALERT TRIGGERED!\n");
            }
            out.push_str(&render_alert_dispatch(alert));
            out
        }
    }
}

pub fn render_cost_report(summary: &CostSummary, limit: &LimitCheck) -> String {
    let currency = summary.currency.as_str();
    let mut out = String::new();

    let _ = writeln!(out, "{}", WIDE_RULE);
    let _ = writeln!(out, "🏆 AWS COST MONITOR");
    let _ = writeln!(out, "{}", WIDE_RULE);
    let _ = writeln!(out, "💰 Total Cost: {}", money(summary.total, currency));
    let _ = writeln!(out, "📅 Period: {}", summary.period);
    let _ = writeln!(out, "🎯 Monthly Limit: {}", money(limit.limit, currency));
    let _ = writeln!(out, "📊 Usage: {:.1}%", limit.percentage_used);
    let _ = writeln!(out, "📈 Status: {}", status_badge(limit.status));

    if !summary.services.is_empty() {
        let _ = writeln!(out, "\n🔝 TOP {} SERVICES:", TOP_SERVICES);
        let _ = writeln!(out, "{}", NARROW_RULE);
        for (i, service) in summary.services.iter().take(TOP_SERVICES).enumerate() {
            let _ = writeln!(
                out,
                "{}. {:<20} {:>9} ({:>5.1}%)",
                i + 1,
                service.name,
                money(service.cost, currency),
                service.percentage
            );
        }
    }

    let _ = writeln!(out, "{}", WIDE_RULE);
    out
}

pub fn render_daily(summary: &DailyCostSummary, days: u32, currency: &str) -> String {
    let mut out = String::new();

    for day in &summary.daily_costs {
        let _ = writeln!(out, "   {}  {:>10}", day.date, money(day.cost, currency));
    }
    let _ = writeln!(
        out,
        "💰 Total ({}): {}",
        summary.period,
        money(summary.total, currency)
    );
    let _ = writeln!(
        out,
        "📊 Daily average: {}",
        money(summary.daily_average(days), currency)
    );
    out
}

pub fn render_comparison(comparison: &ComparisonResult) -> String {
    let currency = comparison.current.currency.as_str();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "📊 Current month: {}",
        money(comparison.current.total, currency)
    );
    let _ = writeln!(
        out,
        "📊 Previous month: {}",
        money(comparison.previous.total, currency)
    );
    let _ = writeln!(
        out,
        "📈 Change: {:+.1}% ({})",
        comparison.percentage_change, comparison.trend
    );
    out
}

fn render_alert_dispatch(alert: &AlertDispatch) -> String {
    match alert {
        AlertDispatch::NotTriggered => String::new(),
        AlertDispatch::Disabled => {
            "🔕 Alert threshold reached (email_alerts disabled, nothing sent)\n".to_string()
        }
        AlertDispatch::Unconfigured => {
            "⚠️  Alert not sent: sns_topic_arn is not configured\n".to_string()
        }
        AlertDispatch::Dispatched => "📨 Alert dispatched\n".to_string(),
        AlertDispatch::Failed(reason) => format!("❌ Alert could not be sent: {}\n", reason),
    }
}
