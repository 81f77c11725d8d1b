use crate::utils::error::{MonitorError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Billing metric requested from the provider.
pub const BLENDED_COST: &str = "BlendedCost";

/// Closed date window of a cost query. `start <= end` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CostPeriod {
    start: NaiveDate,
    end: NaiveDate,
}

impl CostPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MonitorError::ValidationError {
                message: format!("period start {} is after end {}", start, end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

impl fmt::Display for CostPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceCost {
    pub name: String,
    pub cost: f64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub total: f64,
    pub currency: String,
    /// Sorted by cost, highest first.
    pub services: Vec<ServiceCost>,
    pub period: CostPeriod,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCost {
    pub date: NaiveDate,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyCostSummary {
    pub period: String,
    pub daily_costs: Vec<DailyCost>,
    pub total: f64,
}

impl DailyCostSummary {
    /// Average over the requested window, not over the buckets returned.
    pub fn daily_average(&self, days: u32) -> f64 {
        if days == 0 {
            0.0
        } else {
            self.total / f64::from(days)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Trend {
    pub fn from_difference(difference: f64) -> Self {
        if difference > 0.0 {
            Trend::Up
        } else if difference < 0.0 {
            Trend::Down
        } else {
            Trend::Stable
        }
    }
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Trend::Up => "up",
            Trend::Down => "down",
            Trend::Stable => "stable",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub current: CostSummary,
    pub previous: CostSummary,
    pub difference: f64,
    pub percentage_change: f64,
    pub trend: Trend,
}

/// Severity ladder of a limit check, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitStatus {
    WithinLimit,
    HalfUsed,
    Caution,
    NearLimit,
    LimitExceeded,
}

impl LimitStatus {
    pub fn label(&self) -> &'static str {
        match self {
            LimitStatus::WithinLimit => "within limit",
            LimitStatus::HalfUsed => "half of limit used",
            LimitStatus::Caution => "caution, 80% reached",
            LimitStatus::NearLimit => "near limit",
            LimitStatus::LimitExceeded => "limit exceeded",
        }
    }
}

impl fmt::Display for LimitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitCheck {
    pub current_cost: f64,
    pub limit: f64,
    pub percentage_used: f64,
    pub over_limit: bool,
    pub status: LimitStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupDimension {
    Service,
}

/// Request shape handed to the billing API.
#[derive(Debug, Clone, PartialEq)]
pub struct CostQuery {
    pub period: CostPeriod,
    pub granularity: Granularity,
    pub metric: &'static str,
    pub group_by: Option<GroupDimension>,
}

impl CostQuery {
    pub fn monthly_by_service(period: CostPeriod) -> Self {
        Self {
            period,
            granularity: Granularity::Monthly,
            metric: BLENDED_COST,
            group_by: Some(GroupDimension::Service),
        }
    }

    pub fn daily(period: CostPeriod) -> Self {
        Self {
            period,
            granularity: Granularity::Daily,
            metric: BLENDED_COST,
            group_by: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawCostResponse {
    pub results_by_time: Vec<RawTimeBucket>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTimeBucket {
    pub period: CostPeriod,
    /// Aggregate amount of the bucket. Grouped queries may leave it empty.
    pub total: Option<f64>,
    pub groups: Vec<RawGroup>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawGroup {
    pub keys: Vec<String>,
    pub amount: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cost_period_rejects_inverted_window() {
        assert!(CostPeriod::new(date(2024, 3, 1), date(2024, 3, 1)).is_ok());
        assert!(CostPeriod::new(date(2024, 3, 2), date(2024, 3, 1)).is_err());
    }

    #[test]
    fn test_trend_from_difference() {
        assert_eq!(Trend::from_difference(12.5), Trend::Up);
        assert_eq!(Trend::from_difference(-0.01), Trend::Down);
        assert_eq!(Trend::from_difference(0.0), Trend::Stable);
    }

    #[test]
    fn test_limit_status_ordering_and_labels() {
        assert!(LimitStatus::LimitExceeded > LimitStatus::NearLimit);
        assert!(LimitStatus::HalfUsed > LimitStatus::WithinLimit);
        assert_eq!(LimitStatus::Caution.to_string(), "caution, 80% reached");
    }

    #[test]
    fn test_period_serializes_as_iso_dates() {
        let period = CostPeriod::new(date(2024, 1, 1), date(2024, 1, 15)).unwrap();
        let json = serde_json::to_value(period).unwrap();
        assert_eq!(json["start"], "2024-01-01");
        assert_eq!(json["end"], "2024-01-15");
    }
}
