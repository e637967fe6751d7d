//! Hand-authored demo data answering every call in mock mode.

use crate::errors::AppError;
use crate::models::{Property, PropertyFilter, Report, ReportContent, ReportCreator, ReportType};
use chrono::{DateTime, TimeZone, Utc};

pub const MOCK_TOKEN: &str = "mock-jwt-token";

fn ts(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

#[allow(clippy::too_many_arguments)]
fn property(
    id: &str,
    address: &str,
    city: &str,
    state: &str,
    zip_code: &str,
    year_built: i32,
    total_reports: i32,
    image: &str,
    price: f64,
    bedrooms: f32,
    bathrooms: f32,
    square_feet: i32,
    description: &str,
    is_verified: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
) -> Property {
    Property {
        id: id.to_string(),
        address: address.to_string(),
        city: city.to_string(),
        state: state.to_string(),
        zip_code: zip_code.to_string(),
        year_built,
        total_reports,
        image_url: format!(
            "https://images.unsplash.com/{}?ixlib=rb-1.2.1&auto=format&fit=crop&w=800&q=60",
            image
        ),
        price,
        bedrooms,
        bathrooms,
        square_feet,
        description: description.to_string(),
        is_verified,
        created_at,
        updated_at,
    }
}

/// In-memory property catalogue plus report generators.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    properties: Vec<Property>,
}

impl Default for FixtureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureStore {
    pub fn new() -> Self {
        let properties = vec![
            property(
                "1",
                "123 Blockchain Street",
                "Crypto City",
                "CA",
                "94105",
                2005,
                3,
                "photo-1568605114967-8130f3a36994",
                750_000.0,
                3.0,
                2.0,
                2100,
                "Beautiful home in a quiet neighborhood with modern amenities and recent renovations.",
                true,
                ts(2025, 1, 15),
                ts(2025, 2, 10),
            ),
            property(
                "2",
                "456 Ethereum Avenue",
                "Blockchain Heights",
                "NY",
                "10001",
                1998,
                5,
                "photo-1564013799919-ab600027ffc6",
                1_250_000.0,
                4.0,
                3.0,
                2800,
                "Spacious family home with large backyard and updated kitchen.",
                true,
                ts(2025, 1, 10),
                ts(2025, 2, 5),
            ),
            property(
                "3",
                "789 Bitcoin Boulevard",
                "DeFi District",
                "TX",
                "75001",
                2015,
                2,
                "photo-1580587771525-78b9dba3b914",
                550_000.0,
                3.0,
                2.0,
                1800,
                "Modern townhouse with smart home features and energy-efficient design.",
                false,
                ts(2025, 1, 20),
                ts(2025, 1, 20),
            ),
            property(
                "4",
                "101 NFT Lane",
                "Metaverse City",
                "CA",
                "90210",
                1985,
                7,
                "photo-1576941089067-2de3c901e126",
                895_000.0,
                5.0,
                3.0,
                3200,
                "Classic California home with pool and recently renovated interior.",
                true,
                ts(2024, 12, 5),
                ts(2025, 1, 15),
            ),
            property(
                "5",
                "202 Smart Contract Court",
                "Token Town",
                "WA",
                "98101",
                2020,
                1,
                "photo-1512917774080-9991f1c4c750",
                1_100_000.0,
                4.0,
                3.5,
                2600,
                "Newly built luxury home with high-end finishes and mountain views.",
                true,
                ts(2025, 1, 25),
                ts(2025, 2, 15),
            ),
            property(
                "6",
                "303 Wallet Way",
                "Crypto City",
                "CA",
                "94107",
                2000,
                4,
                "photo-1583608205776-bfd35f0d9f83",
                680_000.0,
                3.0,
                2.0,
                1950,
                "Charming home with character in a desirable neighborhood.",
                false,
                ts(2025, 1, 5),
                ts(2025, 2, 1),
            ),
        ];

        Self { properties }
    }

    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Copies of every property accepted by `filter`, in fixture order.
    pub fn filter(&self, filter: &PropertyFilter) -> Vec<Property> {
        self.properties
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }

    pub fn find(&self, id: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    pub fn get(&self, id: &str) -> Result<Property, AppError> {
        self.find(id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))
    }

    /// Reports filed for `property_id`. Unknown properties are an error.
    pub fn reports_for(&self, property_id: &str) -> Result<Vec<Report>, AppError> {
        if self.find(property_id).is_none() {
            return Err(AppError::NotFound("Property not found".to_string()));
        }

        let report = |id: &str,
                      title: &str,
                      report_type: ReportType,
                      description: &str,
                      creator: (&str, &str),
                      price: f64,
                      created_at: DateTime<Utc>| Report {
            id: id.to_string(),
            property_id: property_id.to_string(),
            title: title.to_string(),
            report_type,
            description: description.to_string(),
            creator: ReportCreator {
                id: creator.0.to_string(),
                name: creator.1.to_string(),
            },
            price,
            created_at,
            is_verified: true,
            purchased: false,
        };

        Ok(vec![
            report(
                "1",
                "Home Inspection Report",
                ReportType::Inspection,
                "Comprehensive inspection of the property structure, systems, and components.",
                ("2", "Inspector Joe"),
                49.99,
                ts(2024, 12, 15),
            ),
            report(
                "2",
                "Title History",
                ReportType::Title,
                "Complete ownership history and title status verification.",
                ("3", "Title Company Inc."),
                29.99,
                ts(2024, 12, 10),
            ),
            report(
                "3",
                "Renovation Records",
                ReportType::Renovation,
                "Detailed records of all major renovations and improvements.",
                ("4", "Previous Owner"),
                19.99,
                ts(2024, 11, 28),
            ),
        ])
    }

    /// Report body keyed by report id.
    pub fn report_content(&self, report_id: &str) -> ReportContent {
        let content = match report_id {
            "1" => INSPECTION_REPORT.to_string(),
            "2" => TITLE_REPORT.to_string(),
            "3" => RENOVATION_REPORT.to_string(),
            _ => "This is a mock report content. In a real application, this would be the actual report content or a link to download the report.".to_string(),
        };

        ReportContent {
            content,
            content_type: if matches!(report_id, "1" | "2" | "3") {
                "text/markdown".to_string()
            } else {
                "text/plain".to_string()
            },
        }
    }
}

const INSPECTION_REPORT: &str = "# HomeFax Property Inspection Report

## Property Information
- **Address:** 123 Blockchain Street, Crypto City, CA 94105
- **Inspection Date:** December 15, 2024
- **Inspector:** Inspector Joe

---

## Summary
The property is in **good overall condition**. No structural defects were found.

| System | Condition | Notes |
|---|---|---|
| Roof | Good | Replaced 2019 |
| Electrical | Good | 200A panel |
| Plumbing | Fair | Minor leak under kitchen sink |
| HVAC | Good | Serviced annually |

## Recommendations
1. Repair the kitchen sink supply line.
2. Re-caulk bathroom fixtures.
3. Schedule a chimney sweep before winter.
";

const TITLE_REPORT: &str = "# HomeFax Title History Report

## Ownership Chain
| Owner | From | To |
|---|---|---|
| Original Builder LLC | 2005 | 2008 |
| J. Nakamoto | 2008 | 2019 |
| Current Owner | 2019 | present |

**Title status:** clear, no outstanding liens.
";

const RENOVATION_REPORT: &str = "# HomeFax Renovation Records

- 2012: Kitchen remodel
- 2017: Bathroom upgrades
- 2019: Roof replacement
- 2023: Solar panel installation
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let store = FixtureStore::new();
        let mut ids: Vec<_> = store.properties().iter().map(|p| p.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), store.len());
    }

    #[test]
    fn test_reports_reference_requested_property() {
        let store = FixtureStore::new();
        let reports = store.reports_for("4").unwrap();
        assert_eq!(reports.len(), 3);
        assert!(reports.iter().all(|r| r.property_id == "4" && !r.purchased));
    }

    #[test]
    fn test_reports_for_missing_property() {
        let store = FixtureStore::new();
        assert!(store.reports_for("404").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unknown_report_content_is_generic() {
        let store = FixtureStore::new();
        let content = store.report_content("99");
        assert_eq!(content.content_type, "text/plain");
        assert!(content.content.contains("mock report content"));
    }
}
