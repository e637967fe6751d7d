//! Backing stores for the API facade.
//!
//! The mock/live decision is made once in [`select`]; nothing downstream
//! branches on the flag.

mod fixture;
mod http;

pub use fixture::FixtureDataSource;
pub use http::HttpDataSource;

use crate::config::Config;
use crate::errors::AppError;
use crate::models::*;
use crate::session::Session;
use async_trait::async_trait;
use std::sync::Arc;

/// Every request the facade can issue, answered by one backend.
///
/// Implementations perform no input validation; unknown ids surface as
/// `AppError::NotFound` from whichever backend answers.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Short name used in logs ("fixture", "http").
    fn name(&self) -> &'static str;

    // auth
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError>;
    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError>;
    async fn login_with_gmail(&self) -> Result<AuthResponse, AppError>;
    async fn login_with_wallet(&self, wallet_address: &str) -> Result<AuthResponse, AppError>;
    async fn profile(&self) -> Result<User, AppError>;

    // properties
    async fn list_properties(&self, filter: &PropertyFilter) -> Result<PropertyPage, AppError>;
    async fn get_property(&self, id: &str) -> Result<Property, AppError>;
    async fn create_property(&self, draft: &PropertyDraft) -> Result<Property, AppError>;
    async fn update_property(&self, id: &str, draft: &PropertyDraft)
        -> Result<Property, AppError>;
    async fn delete_property(&self, id: &str) -> Result<DeleteResult, AppError>;

    // reports
    async fn reports_for_property(&self, property_id: &str) -> Result<Vec<Report>, AppError>;
    async fn purchase_report(
        &self,
        report_id: &str,
        payment: &PaymentRequest,
    ) -> Result<PurchaseRecord, AppError>;
    async fn report_content(&self, report_id: &str) -> Result<ReportContent, AppError>;

    // blockchain
    async fn chain_register_property(
        &self,
        property_id: &str,
        owner: &str,
    ) -> Result<ChainPropertyRecord, AppError>;
    async fn chain_property(&self, property_id: &str) -> Result<ChainPropertyRecord, AppError>;
    async fn chain_add_report(&self, report: &NewChainReport)
        -> Result<ChainReportRecord, AppError>;
    async fn chain_report(&self, report_id: &str) -> Result<ChainReportRecord, AppError>;
    async fn chain_report_content(&self, report_id: &str) -> Result<ReportContent, AppError>;
}

/// Picks the backend from the resolved configuration.
pub fn select(config: &Config, session: Session) -> Result<Arc<dyn DataSource>, AppError> {
    if config.use_mock_data {
        tracing::info!(
            "Using fixture data source ({} ms simulated latency)",
            config.mock_latency.as_millis()
        );
        Ok(Arc::new(FixtureDataSource::new(config.mock_latency)))
    } else {
        tracing::info!("Using HTTP data source: {}", config.api_base_url);
        Ok(Arc::new(HttpDataSource::new(&config.api_base_url, session)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_follows_mock_flag() {
        let config = Config::for_tests();
        let source = select(&config, Session::in_memory()).unwrap();
        assert_eq!(source.name(), "fixture");

        let mut config = Config::for_tests();
        config.use_mock_data = false;
        let source = select(&config, Session::in_memory()).unwrap();
        assert_eq!(source.name(), "http");
    }
}
