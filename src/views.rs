//! Page-level orchestration for the property listing and detail screens.

use crate::api::ApiClient;
use crate::async_state::{AsyncState, AsyncTask};
use crate::errors::AppError;
use crate::models::*;

pub const LOAD_DETAILS_ERROR: &str = "Failed to load property details. Please try again later.";

/// Listing screen: one filter, one in-flight load at a time.
pub struct PropertyListView {
    api: ApiClient,
    task: AsyncTask<PropertyPage>,
}

impl PropertyListView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            task: AsyncTask::new(),
        }
    }

    pub async fn load(&self, filter: &PropertyFilter) -> Result<PropertyPage, AppError> {
        self.task.run(self.api.properties().get_all(filter)).await
    }

    pub fn state(&self) -> AsyncState<PropertyPage> {
        self.task.snapshot()
    }

    /// Drops interest in any pending load.
    pub fn close(&self) {
        self.task.cancel();
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDetails {
    pub property: Property,
    pub reports: Vec<Report>,
}

/// Report opened in the reader.
#[derive(Debug, Clone)]
pub struct OpenReport {
    pub title: String,
    pub content: ReportContent,
}

impl OpenReport {
    /// "Home Inspection Report" -> "Home_Inspection_Report_Report.pdf"
    pub fn download_file_name(&self) -> String {
        let joined = self.title.split_whitespace().collect::<Vec<_>>().join("_");
        format!("{}_Report.pdf", joined)
    }
}

/// Detail screen for one property and its reports.
pub struct PropertyDetailsView {
    api: ApiClient,
    task: AsyncTask<PropertyDetails>,
    open_report: Option<OpenReport>,
}

impl PropertyDetailsView {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            task: AsyncTask::new(),
            open_report: None,
        }
    }

    /// Loads the property, then its reports.
    pub async fn load(&self, property_id: &str) -> Result<PropertyDetails, AppError> {
        let api = &self.api;
        self.task
            .run(async move {
                let property = api.properties().get_by_id(property_id).await?;
                let reports = api.reports().get_by_property_id(property_id).await?;
                Ok(PropertyDetails { property, reports })
            })
            .await
    }

    pub fn state(&self) -> AsyncState<PropertyDetails> {
        self.task.snapshot()
    }

    /// Full-page error text when loading failed.
    pub fn error(&self) -> Option<&'static str> {
        match self.task.snapshot() {
            AsyncState::Failure(_) => Some(LOAD_DETAILS_ERROR),
            _ => None,
        }
    }

    pub fn reports(&self) -> Vec<Report> {
        self.task
            .snapshot()
            .value()
            .map(|d| d.reports.clone())
            .unwrap_or_default()
    }

    /// Pays for a report and marks it purchased.
    ///
    /// Only the matching report flips; a report that is already purchased is
    /// rejected without contacting the backend.
    pub async fn purchase(
        &self,
        report_id: &str,
        payment: &PaymentRequest,
    ) -> Result<PurchaseRecord, AppError> {
        let details = self
            .task
            .snapshot()
            .value()
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Report {} is not listed", report_id)))?;
        let report = details
            .reports
            .iter()
            .find(|r| r.id == report_id)
            .ok_or_else(|| AppError::NotFound(format!("Report {} is not listed", report_id)))?;
        if report.purchased {
            tracing::warn!("Report {} already purchased, ignoring", report_id);
            return Err(AppError::Duplicate(format!(
                "purchase:{}:{}",
                details.property.id, report_id
            )));
        }

        let record = self
            .api
            .reports()
            .purchase_listed(&details.property.id, report_id, payment)
            .await?;

        let updated = self.task.update(|details| {
            for report in details.reports.iter_mut().filter(|r| r.id == report_id) {
                report.purchased = true;
            }
        });
        if !updated {
            tracing::debug!("View closed before purchase of {} settled", report_id);
        }
        tracing::info!("Report {} purchased ({})", report_id, record.transaction_hash);
        Ok(record)
    }

    /// Fetches a report's content and opens it in the reader.
    pub async fn view_report(&mut self, report_id: &str) -> Result<&OpenReport, AppError> {
        let title = self
            .reports()
            .into_iter()
            .find(|r| r.id == report_id)
            .map(|r| r.title)
            .unwrap_or_default();
        let content = self.api.reports().get_content(report_id).await?;
        Ok(&*self.open_report.insert(OpenReport { title, content }))
    }

    pub fn open_report(&self) -> Option<&OpenReport> {
        self.open_report.as_ref()
    }

    pub fn close_report(&mut self) {
        self.open_report = None;
    }

    /// The page is going away; pending loads must not write back.
    pub fn close(&self) {
        self.task.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_file_name_collapses_whitespace() {
        let open = OpenReport {
            title: "Home  Inspection\tReport".into(),
            content: ReportContent {
                content: String::new(),
                content_type: "text/plain".into(),
            },
        };
        assert_eq!(open.download_file_name(), "Home_Inspection_Report_Report.pdf");
    }
}
