use super::DataSource;
use crate::errors::AppError;
use crate::models::*;
use crate::session::Session;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use url::Url;

/// Client for the HomeFax REST backend.
///
/// Attaches `Authorization: Bearer <token>` whenever the session holds a
/// token. Non-success statuses become `AppError::Api`. Requests carry no
/// timeout and are never retried; callers cancel by dropping the future.
#[derive(Clone)]
pub struct HttpDataSource {
    client: Client,
    base_url: Url,
    session: Session,
}

impl HttpDataSource {
    /// Creates a new `HttpDataSource`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the API, e.g. `http://localhost:3001/api`.
    /// * `session` - Source of the bearer token.
    pub fn new(base_url: &str, session: Session) -> Result<Self, AppError> {
        let client = Client::builder().build().map_err(|e| {
            AppError::Internal(format!("Failed to create HTTP client: {}", e))
        })?;

        // Single trailing slash; endpoint() pops the empty segment it leaves
        let normalized = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalized)
            .map_err(|e| AppError::Internal(format!("Invalid API base URL {}: {}", base_url, e)))?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Appends `segments` to the base path, each percent-encoded as a single
    /// segment. Ids that would collapse into a different path are refused.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(AppError::NotFound(format!("Invalid resource id {:?}", bad)));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                AppError::Internal(format!("API base URL {} cannot hold a path", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, path: &[&str]) -> Result<RequestBuilder, AppError> {
        let url = self.endpoint(path)?;
        tracing::debug!("{} {}", method, url);

        let mut builder = self
            .client
            .request(method, url)
            .header("Content-Type", "application/json");
        if let Some(token) = self.session.token() {
            builder = builder.header("Authorization", format!("Bearer {}", token));
        }
        Ok(builder)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, AppError> {
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::warn!("API returned {}: {}", status, error_text);
            return Err(match status {
                StatusCode::NOT_FOUND => AppError::NotFound(error_text),
                StatusCode::UNAUTHORIZED => AppError::Unauthorized(error_text),
                _ => AppError::Api {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Failed to parse API response: {}", e)))
    }

    async fn get<T: DeserializeOwned>(&self, path: &[&str]) -> Result<T, AppError> {
        let builder = self.request(Method::GET, path)?;
        self.send(builder).await
    }

    async fn post<B: Serialize + ?Sized + Sync, T: DeserializeOwned>(
        &self,
        path: &[&str],
        body: &B,
    ) -> Result<T, AppError> {
        let builder = self.request(Method::POST, path)?.json(body);
        self.send(builder).await
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        tracing::info!("Logging in {}", email);
        self.post(&["auth", "login"], &json!({ "email": email, "password": password }))
            .await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse, AppError> {
        tracing::info!("Registering {}", request.email);
        self.post(&["auth", "register"], request).await
    }

    async fn login_with_gmail(&self) -> Result<AuthResponse, AppError> {
        // The OAuth redirect never reaches this layer; the backend has no
        // endpoint for it, so the live path answers like the demo did.
        Ok(AuthResponse {
            token: crate::fixtures::MOCK_TOKEN.to_string(),
            user: User {
                id: "1".to_string(),
                email: Some("user@gmail.com".to_string()),
                name: Some("Gmail User".to_string()),
                wallet_address: None,
            },
        })
    }

    async fn login_with_wallet(&self, wallet_address: &str) -> Result<AuthResponse, AppError> {
        tracing::info!("Wallet login for {}", wallet_address);
        self.post(&["auth", "wallet"], &json!({ "walletAddress": wallet_address }))
            .await
    }

    async fn profile(&self) -> Result<User, AppError> {
        self.get(&["auth", "profile"]).await
    }

    async fn list_properties(&self, filter: &PropertyFilter) -> Result<PropertyPage, AppError> {
        let builder = self.request(Method::GET, &["properties"])?.query(filter);
        self.send(builder).await
    }

    async fn get_property(&self, id: &str) -> Result<Property, AppError> {
        self.get(&["properties", id]).await
    }

    async fn create_property(&self, draft: &PropertyDraft) -> Result<Property, AppError> {
        self.post(&["properties"], draft).await
    }

    async fn update_property(
        &self,
        id: &str,
        draft: &PropertyDraft,
    ) -> Result<Property, AppError> {
        let builder = self
            .request(Method::PATCH, &["properties", id])?
            .json(draft);
        self.send(builder).await
    }

    async fn delete_property(&self, id: &str) -> Result<DeleteResult, AppError> {
        let builder = self.request(Method::DELETE, &["properties", id])?;
        let response = builder
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Request failed: {}", e)))?;

        // The body of a successful delete is not part of the contract.
        match response.status() {
            s if s.is_success() => Ok(DeleteResult { success: true }),
            StatusCode::NOT_FOUND => Err(AppError::NotFound("Property not found".to_string())),
            s => Err(AppError::Api {
                status: s.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn reports_for_property(&self, property_id: &str) -> Result<Vec<Report>, AppError> {
        let builder = self
            .request(Method::GET, &["reports"])?
            .query(&[("propertyId", property_id)]);
        self.send(builder).await
    }

    async fn purchase_report(
        &self,
        report_id: &str,
        payment: &PaymentRequest,
    ) -> Result<PurchaseRecord, AppError> {
        tracing::info!(
            "Purchasing report {} via {}",
            report_id,
            payment.payment_method
        );
        self.post(&["reports", report_id, "purchase"], payment)
            .await
    }

    async fn report_content(&self, report_id: &str) -> Result<ReportContent, AppError> {
        self.get(&["reports", report_id, "content"]).await
    }

    async fn chain_register_property(
        &self,
        property_id: &str,
        owner: &str,
    ) -> Result<ChainPropertyRecord, AppError> {
        self.post(
            &["blockchain", "property"],
            &json!({ "propertyId": property_id, "owner": owner }),
        )
        .await
    }

    async fn chain_property(&self, property_id: &str) -> Result<ChainPropertyRecord, AppError> {
        self.get(&["blockchain", "property", property_id])
            .await
    }

    async fn chain_add_report(
        &self,
        report: &NewChainReport,
    ) -> Result<ChainReportRecord, AppError> {
        self.post(&["blockchain", "report"], report).await
    }

    async fn chain_report(&self, report_id: &str) -> Result<ChainReportRecord, AppError> {
        self.get(&["blockchain", "report", report_id]).await
    }

    async fn chain_report_content(&self, report_id: &str) -> Result<ReportContent, AppError> {
        self.get(&["blockchain", "report", report_id, "content"])
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_keeps_base_path() {
        let source = HttpDataSource::new(
            "http://localhost:3001/api",
            Session::in_memory(),
        )
        .unwrap();
        assert_eq!(
            source.endpoint(&["properties", "1"]).unwrap().as_str(),
            "http://localhost:3001/api/properties/1"
        );
    }

    #[test]
    fn test_ids_are_encoded_as_one_segment() {
        let source = HttpDataSource::new(
            "http://localhost:3001/api/",
            Session::in_memory(),
        )
        .unwrap();
        assert_eq!(
            source
                .endpoint(&["reports", "../auth/profile", "content"])
                .unwrap()
                .as_str(),
            "http://localhost:3001/api/reports/..%2Fauth%2Fprofile/content"
        );
        assert_eq!(
            source.endpoint(&["properties", "a?b#c"]).unwrap().as_str(),
            "http://localhost:3001/api/properties/a%3Fb%23c"
        );
    }

    #[test]
    fn test_dot_segments_are_not_found() {
        let source = HttpDataSource::new(
            "http://localhost:3001/api",
            Session::in_memory(),
        )
        .unwrap();
        for id in ["..", ".", ""] {
            let err = source.endpoint(&["properties", id]).unwrap_err();
            assert!(err.is_not_found());
        }
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let result = HttpDataSource::new("not a url", Session::in_memory());
        assert!(result.is_err());
    }
}
