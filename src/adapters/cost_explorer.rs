use crate::domain::model::{
    CostPeriod, CostQuery, Granularity, GroupDimension, RawCostResponse, RawGroup, RawTimeBucket,
};
use crate::domain::ports::BillingApi;
use crate::utils::error::{MonitorError, Result};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_costexplorer::config::retry::RetryConfig;
use aws_sdk_costexplorer::error::DisplayErrorContext;
use aws_sdk_costexplorer::operation::get_cost_and_usage::GetCostAndUsageOutput;
use aws_sdk_costexplorer::types::{
    DateInterval, Granularity as CeGranularity, GroupDefinition, GroupDefinitionType, MetricValue,
};
use aws_sdk_costexplorer::Client as CostExplorerClient;
use chrono::NaiveDate;
use std::collections::HashMap;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// [`BillingApi`] backed by AWS Cost Explorer `GetCostAndUsage`.
#[derive(Debug, Clone)]
pub struct CostExplorerBilling {
    client: CostExplorerClient,
}

impl CostExplorerBilling {
    pub fn new(client: CostExplorerClient) -> Self {
        Self { client }
    }

    /// Builds a client from the shared SDK config with SDK retries turned off.
    pub fn from_sdk_config(config: &SdkConfig, endpoint_url: Option<&str>) -> Self {
        let mut builder =
            aws_sdk_costexplorer::config::Builder::from(config).retry_config(RetryConfig::disabled());
        if let Some(url) = endpoint_url {
            builder = builder.endpoint_url(url);
        }
        Self::new(CostExplorerClient::from_conf(builder.build()))
    }
}

#[async_trait]
impl BillingApi for CostExplorerBilling {
    async fn fetch_cost_and_usage(&self, query: &CostQuery) -> Result<RawCostResponse> {
        let time_period = DateInterval::builder()
            .start(query.period.start().format(DATE_FORMAT).to_string())
            .end(query.period.end().format(DATE_FORMAT).to_string())
            .build()
            .map_err(|e| MonitorError::query(format!("invalid time period: {}", e)))?;

        let granularity = match query.granularity {
            Granularity::Daily => CeGranularity::Daily,
            Granularity::Monthly => CeGranularity::Monthly,
        };

        let mut request = self
            .client
            .get_cost_and_usage()
            .time_period(time_period)
            .granularity(granularity)
            .metrics(query.metric);

        if let Some(GroupDimension::Service) = query.group_by {
            request = request.group_by(
                GroupDefinition::builder()
                    .r#type(GroupDefinitionType::Dimension)
                    .key("SERVICE")
                    .build(),
            );
        }

        let output = request
            .send()
            .await
            .map_err(|e| MonitorError::query(DisplayErrorContext(&e).to_string()))?;

        convert_output(&output, query.metric)
    }
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| MonitorError::query(format!("unexpected date '{}': {}", value, e)))
}

fn metric_amount(metrics: Option<&HashMap<String, MetricValue>>, metric: &str) -> Result<Option<f64>> {
    let Some(amount) = metrics
        .and_then(|metrics| metrics.get(metric))
        .and_then(|value| value.amount())
    else {
        return Ok(None);
    };

    amount
        .parse::<f64>()
        .map(Some)
        .map_err(|e| MonitorError::query(format!("unparseable {} amount '{}': {}", metric, amount, e)))
}

/// Translates the SDK output into the provider-neutral response shape.
pub fn convert_output(output: &GetCostAndUsageOutput, metric: &str) -> Result<RawCostResponse> {
    let mut results_by_time = Vec::new();

    for result in output.results_by_time() {
        let interval = result
            .time_period()
            .ok_or_else(|| MonitorError::query("result without a time period"))?;
        let period = CostPeriod::new(parse_date(interval.start())?, parse_date(interval.end())?)?;

        let mut groups = Vec::new();
        for group in result.groups() {
            groups.push(RawGroup {
                keys: group.keys().to_vec(),
                amount: metric_amount(group.metrics(), metric)?.unwrap_or(0.0),
            });
        }

        results_by_time.push(RawTimeBucket {
            period,
            total: metric_amount(result.total(), metric)?,
            groups,
        });
    }

    Ok(RawCostResponse { results_by_time })
}
