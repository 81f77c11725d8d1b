use crate::core::aggregator::CostAggregator;
use crate::core::evaluator;
use crate::domain::model::{ComparisonResult, CostSummary, DailyCostSummary, LimitCheck};
use crate::domain::ports::BillingApi;
use crate::utils::error::Result;
use chrono::NaiveDate;

/// Entry point for the four cost operations. Holds no state between calls
/// beyond the billing client.
pub struct CostMonitor<B: BillingApi> {
    aggregator: CostAggregator<B>,
}

impl<B: BillingApi> CostMonitor<B> {
    pub fn new(aggregator: CostAggregator<B>) -> Self {
        Self { aggregator }
    }

    pub async fn monthly_costs(
        &self,
        today: NaiveDate,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<CostSummary> {
        self.aggregator.monthly_costs(today, start, end).await
    }

    pub async fn daily_costs(&self, today: NaiveDate, days: u32) -> Result<DailyCostSummary> {
        self.aggregator.daily_costs(today, days).await
    }

    pub async fn compare_with_previous_month(&self, today: NaiveDate) -> Result<ComparisonResult> {
        self.aggregator.compare_with_previous_month(today).await
    }

    /// Checks spend against `limit`. When `current_cost` is `None` the
    /// month-to-date total is fetched first; `Some(0.0)` is taken as given.
    pub async fn check_cost_limit(
        &self,
        today: NaiveDate,
        limit: f64,
        current_cost: Option<f64>,
    ) -> Result<LimitCheck> {
        let current_cost = match current_cost {
            Some(cost) => cost,
            None => {
                tracing::debug!("No current cost supplied, fetching month-to-date total");
                self.aggregator.monthly_costs(today, None, None).await?.total
            }
        };

        let check = evaluator::evaluate_limit(limit, current_cost);
        tracing::debug!(
            "Limit check: {:.2} of {:.2} ({:.1}%) -> {}",
            check.current_cost,
            check.limit,
            check.percentage_used,
            check.status
        );
        Ok(check)
    }
}
