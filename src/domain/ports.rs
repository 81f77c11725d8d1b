use crate::domain::model::{CostQuery, RawCostResponse};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Source of aggregated spend data.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn fetch_cost_and_usage(&self, query: &CostQuery) -> Result<RawCostResponse>;
}

#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Whether the sink has a destination to deliver to.
    fn is_configured(&self) -> bool {
        true
    }

    async fn send_alert(&self, message: &str, subject: &str) -> Result<()>;
}
