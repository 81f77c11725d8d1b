use crate::core::evaluator;
use crate::domain::model::{
    ComparisonResult, CostPeriod, CostQuery, CostSummary, DailyCost, DailyCostSummary,
    RawCostResponse, ServiceCost,
};
use crate::domain::ports::BillingApi;
use crate::utils::error::{MonitorError, Result};
use chrono::{Datelike, Days, NaiveDate};
use std::time::Duration;

/// Fetches spend from a [`BillingApi`] and normalizes it into summaries.
pub struct CostAggregator<B: BillingApi> {
    api: B,
    currency: String,
    query_timeout: Option<Duration>,
}

impl<B: BillingApi> CostAggregator<B> {
    pub fn new(api: B, currency: impl Into<String>) -> Self {
        Self {
            api,
            currency: currency.into(),
            query_timeout: None,
        }
    }

    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }

    async fn fetch(&self, query: &CostQuery) -> Result<RawCostResponse> {
        tracing::debug!(
            "Querying {:?} costs for {} (group by {:?})",
            query.granularity,
            query.period,
            query.group_by
        );

        let response = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, self.api.fetch_cost_and_usage(query))
                .await
                .map_err(|_| {
                    MonitorError::query(format!("no response from billing API within {:?}", limit))
                })??,
            None => self.api.fetch_cost_and_usage(query).await?,
        };

        tracing::debug!(
            "Billing API returned {} time bucket(s)",
            response.results_by_time.len()
        );
        Ok(response)
    }

    /// Month-to-date spend grouped by service. `start` defaults to the first
    /// day of `today`'s month and `end` to `today`.
    pub async fn monthly_costs(
        &self,
        today: NaiveDate,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<CostSummary> {
        let period = CostPeriod::new(
            start.unwrap_or_else(|| first_day_of_month(today)),
            end.unwrap_or(today),
        )?;

        let response = self.fetch(&CostQuery::monthly_by_service(period)).await?;
        Ok(summarize(&response, &self.currency, period))
    }

    pub async fn daily_costs(&self, today: NaiveDate, days: u32) -> Result<DailyCostSummary> {
        if days == 0 {
            return Err(MonitorError::ValidationError {
                message: "days must be a positive number".to_string(),
            });
        }

        let start = today
            .checked_sub_days(Days::new(u64::from(days)))
            .ok_or_else(|| MonitorError::ValidationError {
                message: format!("{} days before {} is out of range", days, today),
            })?;
        let period = CostPeriod::new(start, today)?;

        let response = self.fetch(&CostQuery::daily(period)).await?;

        let daily_costs: Vec<DailyCost> = response
            .results_by_time
            .iter()
            .map(|bucket| DailyCost {
                date: bucket.period.start(),
                cost: bucket.total.unwrap_or(0.0),
            })
            .collect();
        let total = daily_costs.iter().map(|day| day.cost).sum();

        Ok(DailyCostSummary {
            period: period.to_string(),
            daily_costs,
            total,
        })
    }

    /// Month-to-date against the whole previous calendar month. The two
    /// fetches run one after the other.
    pub async fn compare_with_previous_month(&self, today: NaiveDate) -> Result<ComparisonResult> {
        let (current_period, previous_period) = month_windows(today)?;

        let current = self
            .monthly_costs(
                today,
                Some(current_period.start()),
                Some(current_period.end()),
            )
            .await?;
        let previous = self
            .monthly_costs(
                today,
                Some(previous_period.start()),
                Some(previous_period.end()),
            )
            .await?;

        Ok(evaluator::compare(current, previous))
    }
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

/// Returns (current month to date, full previous month).
pub fn month_windows(today: NaiveDate) -> Result<(CostPeriod, CostPeriod)> {
    let current_start = first_day_of_month(today);
    let previous_end = current_start
        .pred_opt()
        .ok_or_else(|| MonitorError::ValidationError {
            message: format!("no month precedes {}", current_start),
        })?;
    let previous_start = first_day_of_month(previous_end);

    Ok((
        CostPeriod::new(current_start, today)?,
        CostPeriod::new(previous_start, previous_end)?,
    ))
}

/// Normalizes a grouped monthly response. Only the first time bucket is
/// considered; an empty response yields a zero summary over `requested`.
pub fn summarize(response: &RawCostResponse, currency: &str, requested: CostPeriod) -> CostSummary {
    let Some(bucket) = response.results_by_time.first() else {
        return CostSummary {
            total: 0.0,
            currency: currency.to_string(),
            services: Vec::new(),
            period: requested,
        };
    };

    // 分組查詢時 AWS 可能回傳空的 Total，改用各服務加總
    let total = bucket
        .total
        .unwrap_or_else(|| bucket.groups.iter().map(|group| group.amount).sum());

    let mut services: Vec<ServiceCost> = bucket
        .groups
        .iter()
        .filter(|group| group.amount > 0.0)
        .map(|group| ServiceCost {
            name: group
                .keys
                .first()
                .cloned()
                .unwrap_or_else(|| "Unknown".to_string()),
            cost: group.amount,
            percentage: if total > 0.0 {
                group.amount / total * 100.0
            } else {
                0.0
            },
        })
        .collect();

    // sort_by 是穩定排序，同額時保留原本順序
    services.sort_by(|a, b| b.cost.total_cmp(&a.cost));

    CostSummary {
        total,
        currency: currency.to_string(),
        services,
        period: bucket.period,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Granularity, GroupDimension, RawGroup, RawTimeBucket, Trend};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period(start: NaiveDate, end: NaiveDate) -> CostPeriod {
        CostPeriod::new(start, end).unwrap()
    }

    fn grouped(total: Option<f64>, groups: &[(&str, f64)]) -> RawCostResponse {
        RawCostResponse {
            results_by_time: vec![RawTimeBucket {
                period: period(date(2024, 5, 1), date(2024, 5, 20)),
                total,
                groups: groups
                    .iter()
                    .map(|(name, amount)| RawGroup {
                        keys: vec![name.to_string()],
                        amount: *amount,
                    })
                    .collect(),
            }],
        }
    }

    /// Replays canned responses in order and records every query it sees.
    #[derive(Clone, Default)]
    struct ScriptedBilling {
        responses: Arc<Mutex<VecDeque<Result<RawCostResponse>>>>,
        queries: Arc<Mutex<Vec<CostQuery>>>,
    }

    impl ScriptedBilling {
        fn new(responses: Vec<Result<RawCostResponse>>) -> Self {
            Self {
                responses: Arc::new(Mutex::new(responses.into())),
                queries: Arc::default(),
            }
        }

        fn queries(&self) -> Vec<CostQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BillingApi for ScriptedBilling {
        async fn fetch_cost_and_usage(&self, query: &CostQuery) -> Result<RawCostResponse> {
            self.queries.lock().unwrap().push(query.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(RawCostResponse::default()))
        }
    }

    #[test]
    fn test_summarize_computes_percentages() {
        let response = grouped(
            Some(250.0),
            &[("EC2", 150.0), ("S3", 75.0), ("Lambda", 25.0)],
        );
        let summary = summarize(&response, "USD", period(date(2024, 5, 1), date(2024, 5, 20)));

        let names: Vec<&str> = summary.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["EC2", "S3", "Lambda"]);
        for (service, expected) in summary.services.iter().zip([60.0, 30.0, 10.0]) {
            assert!((service.percentage - expected).abs() < 1e-9);
        }
        assert_eq!(summary.total, 250.0);
        assert_eq!(summary.currency, "USD");
    }

    #[test]
    fn test_summarize_sorts_descending_and_drops_zero_costs() {
        let response = grouped(
            Some(100.0),
            &[
                ("Tax", 0.0),
                ("S3", 20.0),
                ("Credits", -5.0),
                ("EC2", 70.0),
                ("SQS", 5.0),
                ("SNS", 5.0),
            ],
        );
        let summary = summarize(&response, "USD", period(date(2024, 5, 1), date(2024, 5, 20)));

        let names: Vec<&str> = summary.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["EC2", "S3", "SQS", "SNS"]);
        assert!(summary.services.iter().all(|s| s.cost > 0.0));
        assert!(summary
            .services
            .windows(2)
            .all(|pair| pair[0].cost >= pair[1].cost));
    }

    #[test]
    fn test_summarize_percentages_sum_to_hundred() {
        let response = grouped(None, &[("EC2", 33.33), ("S3", 33.33), ("RDS", 33.34)]);
        let summary = summarize(&response, "USD", period(date(2024, 5, 1), date(2024, 5, 20)));

        let sum: f64 = summary.services.iter().map(|s| s.percentage).sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_summarize_zero_total_yields_zero_percentages() {
        let response = grouped(Some(0.0), &[("EC2", 4.0)]);
        let summary = summarize(&response, "USD", period(date(2024, 5, 1), date(2024, 5, 20)));

        assert_eq!(summary.services.len(), 1);
        assert_eq!(summary.services[0].percentage, 0.0);
    }

    #[test]
    fn test_summarize_empty_response() {
        let requested = period(date(2024, 5, 1), date(2024, 5, 20));
        let summary = summarize(&RawCostResponse::default(), "USD", requested);

        assert_eq!(summary.total, 0.0);
        assert!(summary.services.is_empty());
        assert_eq!(summary.period, requested);
    }

    #[test]
    fn test_month_windows_mid_year() {
        let (current, previous) = month_windows(date(2024, 3, 15)).unwrap();
        assert_eq!(current, period(date(2024, 3, 1), date(2024, 3, 15)));
        assert_eq!(previous, period(date(2024, 2, 1), date(2024, 2, 29)));
    }

    #[test]
    fn test_month_windows_january_rolls_back_to_december() {
        let (current, previous) = month_windows(date(2025, 1, 10)).unwrap();
        assert_eq!(current, period(date(2025, 1, 1), date(2025, 1, 10)));
        assert_eq!(previous, period(date(2024, 12, 1), date(2024, 12, 31)));
    }

    #[tokio::test]
    async fn test_monthly_costs_default_window() {
        let billing = ScriptedBilling::new(vec![Ok(grouped(Some(10.0), &[("EC2", 10.0)]))]);
        let aggregator = CostAggregator::new(billing.clone(), "USD");

        let summary = aggregator
            .monthly_costs(date(2024, 5, 20), None, None)
            .await
            .unwrap();
        assert_eq!(summary.total, 10.0);

        let queries = billing.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].period, period(date(2024, 5, 1), date(2024, 5, 20)));
        assert_eq!(queries[0].granularity, Granularity::Monthly);
        assert_eq!(queries[0].group_by, Some(GroupDimension::Service));
        assert_eq!(queries[0].metric, "BlendedCost");
    }

    #[tokio::test]
    async fn test_monthly_costs_propagates_query_error() {
        let billing = ScriptedBilling::new(vec![Err(MonitorError::query("ThrottlingException"))]);
        let aggregator = CostAggregator::new(billing, "USD");

        let err = aggregator
            .monthly_costs(date(2024, 5, 20), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::QueryError { .. }));
    }

    #[tokio::test]
    async fn test_daily_costs_sums_buckets() {
        let buckets = (1..=3)
            .map(|day| RawTimeBucket {
                period: period(date(2024, 5, day), date(2024, 5, day + 1)),
                total: Some(f64::from(day) * 1.5),
                groups: vec![],
            })
            .collect();
        let billing = ScriptedBilling::new(vec![Ok(RawCostResponse {
            results_by_time: buckets,
        })]);
        let aggregator = CostAggregator::new(billing.clone(), "USD");

        let daily = aggregator.daily_costs(date(2024, 5, 4), 3).await.unwrap();

        assert_eq!(daily.period, "2024-05-01 to 2024-05-04");
        assert_eq!(daily.daily_costs.len(), 3);
        assert_eq!(daily.daily_costs[1].date, date(2024, 5, 2));
        assert_eq!(daily.total, 9.0);

        let queries = billing.queries();
        assert_eq!(queries[0].granularity, Granularity::Daily);
        assert_eq!(queries[0].group_by, None);
    }

    #[tokio::test]
    async fn test_daily_costs_rejects_zero_days() {
        let billing = ScriptedBilling::default();
        let aggregator = CostAggregator::new(billing.clone(), "USD");

        assert!(aggregator.daily_costs(date(2024, 5, 4), 0).await.is_err());
        assert!(billing.queries().is_empty());
    }

    #[tokio::test]
    async fn test_compare_queries_current_then_previous_month() {
        let billing = ScriptedBilling::new(vec![
            Ok(grouped(Some(50.0), &[("EC2", 50.0)])),
            Ok(RawCostResponse::default()),
        ]);
        let aggregator = CostAggregator::new(billing.clone(), "USD");

        let comparison = aggregator
            .compare_with_previous_month(date(2025, 1, 10))
            .await
            .unwrap();

        assert_eq!(comparison.difference, 50.0);
        assert_eq!(comparison.percentage_change, 0.0);
        assert_eq!(comparison.trend, Trend::Up);

        let queries = billing.queries();
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].period, period(date(2025, 1, 1), date(2025, 1, 10)));
        assert_eq!(queries[1].period, period(date(2024, 12, 1), date(2024, 12, 31)));
    }

    #[tokio::test]
    async fn test_compare_fails_when_previous_month_fails() {
        let billing = ScriptedBilling::new(vec![
            Ok(grouped(Some(50.0), &[("EC2", 50.0)])),
            Err(MonitorError::query("AccessDeniedException")),
        ]);
        let aggregator = CostAggregator::new(billing, "USD");

        let result = aggregator.compare_with_previous_month(date(2024, 6, 3)).await;
        assert!(matches!(result, Err(MonitorError::QueryError { .. })));
    }

    #[tokio::test]
    async fn test_query_timeout_becomes_query_error() {
        struct SlowBilling;

        #[async_trait]
        impl BillingApi for SlowBilling {
            async fn fetch_cost_and_usage(&self, _query: &CostQuery) -> Result<RawCostResponse> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(RawCostResponse::default())
            }
        }

        let aggregator = CostAggregator::new(SlowBilling, "USD")
            .with_query_timeout(Some(Duration::from_millis(10)));

        let err = aggregator
            .monthly_costs(date(2024, 5, 20), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MonitorError::QueryError { .. }));
    }
}
