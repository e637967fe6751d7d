use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============ Properties ============

/// A property listed in the HomeFax catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Stable unique identifier.
    pub id: String,
    pub address: String,
    pub city: String,
    /// Two-letter state code (e.g. "CA").
    pub state: String,
    pub zip_code: String,
    pub year_built: i32,
    /// Number of reports filed for this property.
    pub total_reports: i32,
    #[serde(default)]
    pub image_url: String,
    pub price: f64,
    pub bedrooms: f32,
    pub bathrooms: f32,
    pub square_feet: i32,
    pub description: String,
    /// Whether the property record has been anchored on chain.
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Returns a copy with every field present in `draft` overwritten.
    pub fn merged_with(&self, draft: &PropertyDraft) -> Property {
        let mut updated = self.clone();
        if let Some(ref v) = draft.address {
            updated.address = v.clone();
        }
        if let Some(ref v) = draft.city {
            updated.city = v.clone();
        }
        if let Some(ref v) = draft.state {
            updated.state = v.clone();
        }
        if let Some(ref v) = draft.zip_code {
            updated.zip_code = v.clone();
        }
        if let Some(v) = draft.year_built {
            updated.year_built = v;
        }
        if let Some(ref v) = draft.image_url {
            updated.image_url = v.clone();
        }
        if let Some(v) = draft.price {
            updated.price = v;
        }
        if let Some(v) = draft.bedrooms {
            updated.bedrooms = v;
        }
        if let Some(v) = draft.bathrooms {
            updated.bathrooms = v;
        }
        if let Some(v) = draft.square_feet {
            updated.square_feet = v;
        }
        if let Some(ref v) = draft.description {
            updated.description = v.clone();
        }
        if let Some(v) = draft.is_verified {
            updated.is_verified = v;
        }
        updated
    }

    /// "123 Blockchain Street, Crypto City, CA"
    pub fn full_address(&self) -> String {
        format!("{}, {}, {}", self.address, self.city, self.state)
    }
}

/// Partial property payload used for create and update calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDraft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year_built: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bedrooms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bathrooms: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub square_feet: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
}

/// Listing filter. Empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    /// Case-insensitive substring over address, city and zip code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Exact state code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl PropertyFilter {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Default::default()
        }
    }

    pub fn state(code: impl Into<String>) -> Self {
        Self {
            state: Some(code.into()),
            ..Default::default()
        }
    }

    /// Evaluates the filter against a property.
    pub fn matches(&self, property: &Property) -> bool {
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let hit = property.address.to_lowercase().contains(&needle)
                || property.city.to_lowercase().contains(&needle)
                || property.zip_code.contains(&needle);
            if !hit {
                return false;
            }
        }

        if let Some(state) = self.state.as_deref().filter(|s| !s.is_empty()) {
            if property.state != state {
                return false;
            }
        }

        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total_items: usize,
    pub item_count: usize,
    pub items_per_page: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyPage {
    pub items: Vec<Property>,
    pub meta: PageMeta,
}

// ============ Reports ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Inspection,
    Title,
    Renovation,
    Environmental,
    Valuation,
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportType::Inspection => "inspection",
            ReportType::Title => "title",
            ReportType::Renovation => "renovation",
            ReportType::Environmental => "environmental",
            ReportType::Valuation => "valuation",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportCreator {
    pub id: String,
    pub name: String,
}

/// A report attached to a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: String,
    /// Foreign key into `Property::id`.
    pub property_id: String,
    pub title: String,
    pub report_type: ReportType,
    pub description: String,
    pub creator: ReportCreator,
    pub price: f64,
    pub created_at: DateTime<Utc>,
    pub is_verified: bool,
    #[serde(default)]
    pub purchased: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportContent {
    pub content: String,
    pub content_type: String,
}

// ============ Payments ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    ApplePay,
    Card,
    Crypto,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentMethod::ApplePay => "apple-pay",
            PaymentMethod::Card => "card",
            PaymentMethod::Crypto => "crypto",
        };
        f.write_str(s)
    }
}

/// Transaction details produced by the payment step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last4: Option<String>,
    pub status: String,
}

/// Body of `POST /reports/:id/purchase`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub transaction: TransactionData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
    pub id: String,
    pub report_id: String,
    pub user: UserSummary,
    pub amount: f64,
    pub payment_method: PaymentMethod,
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
}

// ============ Auth ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wallet_address: Option<String>,
}

/// Login/registration answer. Live backends may call the token `access_token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(alias = "access_token")]
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub success: bool,
}

// ============ Blockchain ============

/// Property record as anchored by the HomeFax contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainPropertyRecord {
    pub property_id: String,
    pub owner: String,
    pub metadata_uri: String,
    pub transaction_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainReportRecord {
    pub report_id: String,
    pub property_id: String,
    pub report_type: ReportType,
    pub content_hash: String,
    pub transaction_hash: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Body for anchoring a new report on chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewChainReport {
    pub property_id: String,
    pub report_type: ReportType,
    pub content: String,
}
