//! Uniform request surface over the selected [`DataSource`].
//!
//! Four namespaces mirror the resource families: [`AuthApi`],
//! [`PropertiesApi`], [`ReportsApi`] and [`BlockchainApi`]. The facade owns
//! the only durable side effects of the layer: writing the token after a
//! successful sign-in and removing it on logout.

use crate::config::Config;
use crate::data_source::{self, DataSource};
use crate::errors::AppError;
use crate::models::*;
use crate::session::Session;
use moka::sync::Cache;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How long an in-flight key blocks duplicates if its request never settles.
const IN_FLIGHT_TTL: Duration = Duration::from_secs(300);

/// Facade handed to views and the onboarding flow.
#[derive(Clone)]
pub struct ApiClient {
    source: Arc<dyn DataSource>,
    session: Session,
    in_flight: Cache<String, i64>,
}

impl ApiClient {
    /// Builds the client, choosing fixture or HTTP backend from `config`.
    pub fn from_config(config: &Config, session: Session) -> Result<Self, AppError> {
        let source = data_source::select(config, session.clone())?;
        Ok(Self::new(source, session))
    }

    pub fn new(source: Arc<dyn DataSource>, session: Session) -> Self {
        let in_flight = Cache::builder()
            .time_to_live(IN_FLIGHT_TTL)
            .max_capacity(10_000)
            .build();

        Self {
            source,
            session,
            in_flight,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub fn auth(&self) -> AuthApi<'_> {
        AuthApi { client: self }
    }

    pub fn properties(&self) -> PropertiesApi<'_> {
        PropertiesApi { client: self }
    }

    pub fn reports(&self) -> ReportsApi<'_> {
        ReportsApi { client: self }
    }

    pub fn blockchain(&self) -> BlockchainApi<'_> {
        BlockchainApi { client: self }
    }

    /// Runs `fut` unless another call with the same key is still pending.
    ///
    /// The key is claimed with an atomic insert-if-absent, so two racing
    /// callers cannot both pass. It is released when `fut` settles or when
    /// the caller drops the call before it does.
    async fn at_most_once<T, F>(&self, key: String, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        let now = chrono::Utc::now().timestamp_millis();
        let entry = self.in_flight.entry(key.clone()).or_insert(now);
        if !entry.is_fresh() {
            let seconds_ago = (now - *entry.value()) / 1000;
            tracing::warn!(
                "Duplicate request blocked: {} already in flight ({} seconds ago)",
                key,
                seconds_ago
            );
            return Err(AppError::Duplicate(key));
        }

        let _claim = InFlightClaim {
            cache: &self.in_flight,
            key,
        };
        fut.await
    }

    fn store_token(&self, auth: &AuthResponse) -> Result<(), AppError> {
        if auth.token.is_empty() {
            return Err(AppError::Unauthorized(
                "Backend returned an empty token".to_string(),
            ));
        }
        self.session.set_token(&auth.token)
    }
}

/// Holds an in-flight key until dropped.
struct InFlightClaim<'a> {
    cache: &'a Cache<String, i64>,
    key: String,
}

impl Drop for InFlightClaim<'_> {
    fn drop(&mut self) {
        self.cache.invalidate(&self.key);
    }
}

pub struct AuthApi<'a> {
    client: &'a ApiClient,
}

impl AuthApi<'_> {
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let auth = self.client.source.login(email, password).await?;
        self.client.store_token(&auth)?;
        tracing::info!("Signed in as {}", email);
        Ok(auth)
    }

    /// Registers a new account. A second registration for the same email
    /// while the first is pending fails with `AppError::Duplicate`.
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        let key = format!("register:{}", request.email.to_lowercase());
        let auth = self
            .client
            .at_most_once(key, self.client.source.register(request))
            .await?;
        self.client.store_token(&auth)?;
        tracing::info!("Registered {}", request.email);
        Ok(auth)
    }

    pub async fn login_with_gmail(&self) -> Result<AuthResponse, AppError> {
        let auth = self.client.source.login_with_gmail().await?;
        self.client.store_token(&auth)?;
        Ok(auth)
    }

    pub async fn login_with_wallet(&self, wallet_address: &str) -> Result<AuthResponse, AppError> {
        let auth = self.client.source.login_with_wallet(wallet_address).await?;
        self.client.store_token(&auth)?;
        tracing::info!("Signed in with wallet {}", wallet_address);
        Ok(auth)
    }

    pub fn logout(&self) -> Result<(), AppError> {
        self.client.session.clear_token()?;
        tracing::info!("Signed out");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.session.token().is_some()
    }

    pub async fn profile(&self) -> Result<User, AppError> {
        self.client.source.profile().await
    }
}

pub struct PropertiesApi<'a> {
    client: &'a ApiClient,
}

impl PropertiesApi<'_> {
    pub async fn get_all(&self, filter: &PropertyFilter) -> Result<PropertyPage, AppError> {
        self.client.source.list_properties(filter).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Property, AppError> {
        self.client.source.get_property(id).await
    }

    pub async fn create(&self, draft: &PropertyDraft) -> Result<Property, AppError> {
        self.client.source.create_property(draft).await
    }

    pub async fn update(&self, id: &str, draft: &PropertyDraft) -> Result<Property, AppError> {
        self.client.source.update_property(id, draft).await
    }

    pub async fn delete(&self, id: &str) -> Result<DeleteResult, AppError> {
        self.client.source.delete_property(id).await
    }
}

pub struct ReportsApi<'a> {
    client: &'a ApiClient,
}

impl ReportsApi<'_> {
    pub async fn get_by_property_id(&self, property_id: &str) -> Result<Vec<Report>, AppError> {
        self.client.source.reports_for_property(property_id).await
    }

    /// Pays for a report. Concurrent purchases of the same report id collapse
    /// into one request; the losers get `AppError::Duplicate`.
    pub async fn purchase(
        &self,
        report_id: &str,
        payment: &PaymentRequest,
    ) -> Result<PurchaseRecord, AppError> {
        let key = format!("purchase:{}", report_id);
        self.client
            .at_most_once(key, self.client.source.purchase_report(report_id, payment))
            .await
    }

    /// Like [`purchase`](Self::purchase), but scoped to the property the
    /// report is listed on. Report ids repeat across properties, so buying
    /// report "1" of two different properties does not collide.
    pub async fn purchase_listed(
        &self,
        property_id: &str,
        report_id: &str,
        payment: &PaymentRequest,
    ) -> Result<PurchaseRecord, AppError> {
        let key = format!("purchase:{}:{}", property_id, report_id);
        self.client
            .at_most_once(key, self.client.source.purchase_report(report_id, payment))
            .await
    }

    pub async fn get_content(&self, report_id: &str) -> Result<ReportContent, AppError> {
        self.client.source.report_content(report_id).await
    }
}

pub struct BlockchainApi<'a> {
    client: &'a ApiClient,
}

impl BlockchainApi<'_> {
    pub async fn register_property(
        &self,
        property_id: &str,
        owner: &str,
    ) -> Result<ChainPropertyRecord, AppError> {
        self.client
            .source
            .chain_register_property(property_id, owner)
            .await
    }

    pub async fn get_property(&self, property_id: &str) -> Result<ChainPropertyRecord, AppError> {
        self.client.source.chain_property(property_id).await
    }

    pub async fn add_report(&self, report: &NewChainReport) -> Result<ChainReportRecord, AppError> {
        self.client.source.chain_add_report(report).await
    }

    pub async fn get_report(&self, report_id: &str) -> Result<ChainReportRecord, AppError> {
        self.client.source.chain_report(report_id).await
    }

    pub async fn get_report_content(&self, report_id: &str) -> Result<ReportContent, AppError> {
        self.client.source.chain_report_content(report_id).await
    }
}
