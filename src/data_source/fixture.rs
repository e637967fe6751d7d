use super::DataSource;
use crate::errors::AppError;
use crate::fixtures::{FixtureStore, MOCK_TOKEN};
use crate::models::*;
use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use uuid::Uuid;

const MOCK_ITEMS_PER_PAGE: usize = 10;

struct ChainLedger {
    properties: HashMap<String, ChainPropertyRecord>,
    reports: HashMap<String, (ChainReportRecord, String)>,
}

/// Answers every request from the in-memory [`FixtureStore`] after a fixed delay.
///
/// Writes return synthesized copies and are never applied to the catalogue.
/// The simulated chain ledger lives for the lifetime of this value only.
pub struct FixtureDataSource {
    store: FixtureStore,
    latency: Duration,
    ledger: RwLock<ChainLedger>,
}

fn tx_hash(seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(seed.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

fn mock_user(id: &str, name: &str) -> UserSummary {
    UserSummary {
        id: id.to_string(),
        name: name.to_string(),
    }
}

impl FixtureDataSource {
    pub fn new(latency: Duration) -> Self {
        Self::with_store(FixtureStore::new(), latency)
    }

    pub fn with_store(store: FixtureStore, latency: Duration) -> Self {
        let mut properties = HashMap::new();
        let mut reports = HashMap::new();

        // Verified fixtures start out anchored.
        for property in store.properties().iter().filter(|p| p.is_verified) {
            properties.insert(
                property.id.clone(),
                ChainPropertyRecord {
                    property_id: property.id.clone(),
                    owner: crate::config::ZERO_ADDRESS.to_string(),
                    metadata_uri: format!("ethstorage://homefax/properties/{}", property.id),
                    transaction_hash: tx_hash(&format!("property:{}", property.id)),
                    created_at: property.created_at,
                },
            );
        }
        if let Ok(seeded) = store.reports_for("1") {
            for report in seeded {
                let content = store.report_content(&report.id).content;
                reports.insert(
                    report.id.clone(),
                    (
                        ChainReportRecord {
                            report_id: report.id.clone(),
                            property_id: report.property_id.clone(),
                            report_type: report.report_type,
                            content_hash: tx_hash(&content),
                            transaction_hash: tx_hash(&format!("report:{}", report.id)),
                            is_verified: report.is_verified,
                            created_at: report.created_at,
                        },
                        content,
                    ),
                );
            }
        }

        Self {
            store,
            latency,
            ledger: RwLock::new(ChainLedger {
                properties,
                reports,
            }),
        }
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn auth_response(user: User) -> AuthResponse {
        AuthResponse {
            token: MOCK_TOKEN.to_string(),
            user,
        }
    }

    fn ledger_poisoned() -> AppError {
        AppError::Internal("chain ledger lock poisoned".to_string())
    }
}

#[async_trait]
impl DataSource for FixtureDataSource {
    fn name(&self) -> &'static str {
        "fixture"
    }

    async fn login(&self, email: &str, _password: &str) -> Result<AuthResponse, AppError> {
        self.simulate_latency().await;
        tracing::debug!("Mock login for {}", email);
        Ok(Self::auth_response(User {
            id: "1".to_string(),
            email: Some(email.to_string()),
            name: Some("Mock User".to_string()),
            wallet_address: None,
        }))
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        self.simulate_latency().await;
        tracing::debug!("Mock registration for {}", request.email);
        Ok(Self::auth_response(User {
            id: "1".to_string(),
            email: Some(request.email.clone()),
            name: request.name.clone(),
            wallet_address: None,
        }))
    }

    async fn login_with_gmail(&self) -> Result<AuthResponse, AppError> {
        self.simulate_latency().await;
        Ok(Self::auth_response(User {
            id: "1".to_string(),
            email: Some("user@gmail.com".to_string()),
            name: Some("Gmail User".to_string()),
            wallet_address: None,
        }))
    }

    async fn login_with_wallet(&self, wallet_address: &str) -> Result<AuthResponse, AppError> {
        self.simulate_latency().await;
        Ok(Self::auth_response(User {
            id: "1".to_string(),
            email: None,
            name: Some("Wallet User".to_string()),
            wallet_address: Some(wallet_address.to_string()),
        }))
    }

    async fn profile(&self) -> Result<User, AppError> {
        self.simulate_latency().await;
        Ok(User {
            id: "1".to_string(),
            email: Some("user@example.com".to_string()),
            name: Some("Mock User".to_string()),
            wallet_address: None,
        })
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<PropertyPage, AppError> {
        self.simulate_latency().await;
        let items = self.store.filter(filter);
        tracing::debug!(
            "Fixture filter {:?} matched {} of {} properties",
            filter,
            items.len(),
            self.store.len()
        );

        Ok(PropertyPage {
            meta: PageMeta {
                total_items: items.len(),
                item_count: items.len(),
                items_per_page: MOCK_ITEMS_PER_PAGE,
                total_pages: 1,
                current_page: 1,
            },
            items,
        })
    }

    async fn get_property(&self, id: &str) -> Result<Property, AppError> {
        self.simulate_latency().await;
        self.store.get(id)
    }

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Property, AppError> {
        self.simulate_latency().await;
        let now = Utc::now();
        let blank = Property {
            id: (self.store.len() + 1).to_string(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            year_built: 0,
            total_reports: 0,
            image_url: String::new(),
            price: 0.0,
            bedrooms: 0.0,
            bathrooms: 0.0,
            square_feet: 0,
            description: String::new(),
            is_verified: false,
            created_at: now,
            updated_at: now,
        };
        Ok(blank.merged_with(draft))
    }

    async fn update_property(
        &self,
        id: &str,
        draft: &PropertyDraft,
    ) -> Result<Property, AppError> {
        self.simulate_latency().await;
        let mut updated = self.store.get(id)?.merged_with(draft);
        updated.updated_at = Utc::now();
        Ok(updated)
    }

    async fn delete_property(&self, id: &str) -> Result<DeleteResult, AppError> {
        self.simulate_latency().await;
        self.store.get(id)?;
        Ok(DeleteResult { success: true })
    }

    async fn reports_for_property(&self, property_id: &str) -> Result<Vec<Report>, AppError> {
        self.simulate_latency().await;
        self.store.reports_for(property_id)
    }

    async fn purchase_report(
        &self,
        report_id: &str,
        payment: &PaymentRequest,
    ) -> Result<PurchaseRecord, AppError> {
        self.simulate_latency().await;

        // Report ids repeat across properties; any property's listing gives the price.
        let report = self
            .store
            .properties()
            .first()
            .map(|p| self.store.reports_for(&p.id))
            .transpose()?
            .unwrap_or_default()
            .into_iter()
            .find(|r| r.id == report_id)
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;

        Ok(PurchaseRecord {
            id: Uuid::new_v4().to_string(),
            report_id: report_id.to_string(),
            user: mock_user("1", "Mock User"),
            amount: report.price,
            payment_method: payment.payment_method,
            transaction_hash: payment
                .transaction
                .transaction_hash
                .clone()
                .unwrap_or_else(|| "mock-transaction-hash".to_string()),
            created_at: Utc::now(),
        })
    }

    async fn report_content(&self, report_id: &str) -> Result<ReportContent, AppError> {
        self.simulate_latency().await;
        Ok(self.store.report_content(report_id))
    }

    async fn chain_register_property(
        &self,
        property_id: &str,
        owner: &str,
    ) -> Result<ChainPropertyRecord, AppError> {
        self.simulate_latency().await;
        self.store.get(property_id)?;

        let record = ChainPropertyRecord {
            property_id: property_id.to_string(),
            owner: owner.to_string(),
            metadata_uri: format!("ethstorage://homefax/properties/{}", property_id),
            transaction_hash: tx_hash(&format!("property:{}:{}", property_id, owner)),
            created_at: Utc::now(),
        };
        self.ledger
            .write()
            .map_err(|_| Self::ledger_poisoned())?
            .properties
            .insert(property_id.to_string(), record.clone());

        tracing::info!(
            "Property {} anchored (tx {})",
            property_id,
            record.transaction_hash
        );
        Ok(record)
    }

    async fn chain_property(&self, property_id: &str) -> Result<ChainPropertyRecord, AppError> {
        self.simulate_latency().await;
        self.ledger
            .read()
            .map_err(|_| Self::ledger_poisoned())?
            .properties
            .get(property_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Property not registered on chain".to_string()))
    }

    async fn chain_add_report(
        &self,
        report: &NewChainReport,
    ) -> Result<ChainReportRecord, AppError> {
        self.simulate_latency().await;
        self.store.get(&report.property_id)?;

        let mut ledger = self.ledger.write().map_err(|_| Self::ledger_poisoned())?;
        let report_id = format!("chain-{}", ledger.reports.len() + 1);
        let record = ChainReportRecord {
            report_id: report_id.clone(),
            property_id: report.property_id.clone(),
            report_type: report.report_type,
            content_hash: tx_hash(&report.content),
            transaction_hash: tx_hash(&format!("report:{}", report_id)),
            is_verified: false,
            created_at: Utc::now(),
        };
        ledger
            .reports
            .insert(report_id, (record.clone(), report.content.clone()));
        Ok(record)
    }

    async fn chain_report(&self, report_id: &str) -> Result<ChainReportRecord, AppError> {
        self.simulate_latency().await;
        self.ledger
            .read()
            .map_err(|_| Self::ledger_poisoned())?
            .reports
            .get(report_id)
            .map(|(record, _)| record.clone())
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))
    }

    async fn chain_report_content(&self, report_id: &str) -> Result<ReportContent, AppError> {
        self.simulate_latency().await;
        let ledger = self.ledger.read().map_err(|_| Self::ledger_poisoned())?;
        let (_, content) = ledger
            .reports
            .get(report_id)
            .ok_or_else(|| AppError::NotFound("Report not found".to_string()))?;
        Ok(ReportContent {
            content: content.clone(),
            content_type: "text/markdown".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> FixtureDataSource {
        FixtureDataSource::new(Duration::ZERO)
    }

    #[tokio::test]
    async fn test_create_assigns_next_id() {
        let draft = PropertyDraft {
            address: Some("404 Gas Fee Road".into()),
            state: Some("OR".into()),
            ..Default::default()
        };
        let created = source().create_property(&draft).await.unwrap();
        assert_eq!(created.id, "7");
        assert_eq!(created.address, "404 Gas Fee Road");
        assert_eq!(created.state, "OR");
    }

    #[tokio::test]
    async fn test_update_returns_copy_without_mutating_store() {
        let source = source();
        let draft = PropertyDraft {
            price: Some(1.0),
            ..Default::default()
        };
        let updated = source.update_property("2", &draft).await.unwrap();
        assert_eq!(updated.price, 1.0);

        let original = source.get_property("2").await.unwrap();
        assert_eq!(original.price, 1_250_000.0);
    }

    #[tokio::test]
    async fn test_delete_unknown_property() {
        let err = source().delete_property("99").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_purchase_uses_report_price() {
        let payment = PaymentRequest {
            payment_method: PaymentMethod::Card,
            transaction: TransactionData {
                transaction_id: Some("card-1".into()),
                status: "completed".into(),
                ..Default::default()
            },
        };
        let record = source().purchase_report("2", &payment).await.unwrap();
        assert_eq!(record.amount, 29.99);
        assert_eq!(record.transaction_hash, "mock-transaction-hash");
        assert_eq!(record.payment_method, PaymentMethod::Card);
    }

    #[tokio::test]
    async fn test_chain_ledger_roundtrip() {
        let source = source();
        assert!(source.chain_property("3").await.unwrap_err().is_not_found());

        let record = source
            .chain_register_property("3", "0xowner")
            .await
            .unwrap();
        assert!(record.transaction_hash.starts_with("0x"));
        assert_eq!(source.chain_property("3").await.unwrap().owner, "0xowner");

        let added = source
            .chain_add_report(&NewChainReport {
                property_id: "3".into(),
                report_type: ReportType::Valuation,
                content: "# Valuation".into(),
            })
            .await
            .unwrap();
        let content = source.chain_report_content(&added.report_id).await.unwrap();
        assert_eq!(content.content, "# Valuation");
    }

    #[tokio::test]
    async fn test_seeded_chain_report_content() {
        let content = source().chain_report_content("1").await.unwrap();
        assert!(content.content.contains("HomeFax Property Inspection Report"));
    }
}
