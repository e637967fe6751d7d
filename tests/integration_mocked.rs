/// End-to-end scenarios against the fixture backend
/// Exercises the facade and the page views exactly as the CLI drives them
use homefax_client::api::ApiClient;
use homefax_client::config::Config;
use homefax_client::errors::AppError;
use homefax_client::models::{PaymentMethod, PaymentRequest, PropertyFilter, TransactionData};
use homefax_client::session::Session;
use homefax_client::views::{PropertyDetailsView, PropertyListView, LOAD_DETAILS_ERROR};

/// Helper function to create a fixture-backed client with no latency
fn mock_client() -> ApiClient {
    ApiClient::from_config(&Config::for_tests(), Session::in_memory()).unwrap()
}

fn apple_pay() -> PaymentRequest {
    PaymentRequest {
        payment_method: PaymentMethod::ApplePay,
        transaction: TransactionData {
            transaction_id: Some("apple-1700000000000".into()),
            status: "completed".into(),
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn test_mock_mode_selects_fixture_source() {
    assert_eq!(mock_client().source_name(), "fixture");
}

#[tokio::test]
async fn test_search_blockchain_returns_first_property() {
    let client = mock_client();
    let page = client
        .properties()
        .get_all(&PropertyFilter::search("Blockchain"))
        .await
        .unwrap();

    let ids: Vec<&str> = page.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1"]);
    assert_eq!(page.meta.total_items, 1);
}

#[tokio::test]
async fn test_state_filter_returns_california() {
    let client = mock_client();
    let page = client
        .properties()
        .get_all(&PropertyFilter::state("CA"))
        .await
        .unwrap();

    let ids: Vec<&str> = page.items.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "4", "6"]);
}

#[tokio::test]
async fn test_empty_filter_returns_all_six() {
    let page = mock_client()
        .properties()
        .get_all(&PropertyFilter::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 6);
}

#[tokio::test]
async fn test_get_by_id_unknown_is_not_found() {
    let err = mock_client()
        .properties()
        .get_by_id("nonexistent")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_report_one_content() {
    let content = mock_client().reports().get_content("1").await.unwrap();
    assert!(content.content.contains("HomeFax Property Inspection Report"));
    assert_eq!(content.content_type, "text/markdown");
}

#[tokio::test]
async fn test_login_then_logout_manages_token() {
    let client = mock_client();
    assert!(!client.auth().is_authenticated());

    let auth = client
        .auth()
        .login("someone@example.com", "hunter2")
        .await
        .unwrap();
    assert_eq!(auth.token, "mock-jwt-token");
    assert_eq!(client.session().token().as_deref(), Some("mock-jwt-token"));

    client.auth().logout().unwrap();
    assert!(client.session().token().is_none());
}

#[tokio::test]
async fn test_details_view_loads_property_and_reports() {
    let view = PropertyDetailsView::new(mock_client());
    let details = view.load("1").await.unwrap();

    assert_eq!(details.property.id, "1");
    assert_eq!(details.reports.len(), 3);
    assert!(details.reports.iter().all(|r| r.property_id == "1"));
    assert!(view.error().is_none());
}

#[tokio::test]
async fn test_details_view_failure_message() {
    let view = PropertyDetailsView::new(mock_client());
    assert!(view.load("999").await.is_err());
    assert_eq!(view.error(), Some(LOAD_DETAILS_ERROR));
}

#[tokio::test]
async fn test_purchase_flips_only_matching_report() {
    let view = PropertyDetailsView::new(mock_client());
    view.load("1").await.unwrap();

    let record = view.purchase("2", &apple_pay()).await.unwrap();
    assert_eq!(record.report_id, "2");

    let purchased: Vec<(String, bool)> = view
        .reports()
        .into_iter()
        .map(|r| (r.id, r.purchased))
        .collect();
    assert_eq!(
        purchased,
        vec![
            ("1".to_string(), false),
            ("2".to_string(), true),
            ("3".to_string(), false)
        ]
    );
}

#[tokio::test]
async fn test_purchase_twice_is_rejected_locally() {
    let view = PropertyDetailsView::new(mock_client());
    view.load("1").await.unwrap();

    view.purchase("1", &apple_pay()).await.unwrap();
    let err = view.purchase("1", &apple_pay()).await.unwrap_err();
    assert!(matches!(err, AppError::Duplicate(_)));
}

#[tokio::test]
async fn test_purchase_unlisted_report_is_not_found() {
    let view = PropertyDetailsView::new(mock_client());
    view.load("1").await.unwrap();
    assert!(view
        .purchase("77", &apple_pay())
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_view_report_sets_download_name() {
    let mut view = PropertyDetailsView::new(mock_client());
    let details = view.load("1").await.unwrap();
    let title = details.reports[0].title.clone();

    let open = view.view_report("1").await.unwrap();
    assert_eq!(open.title, title);
    assert!(open.download_file_name().ends_with("_Report.pdf"));
    assert!(!open.download_file_name().contains(' '));

    view.close_report();
    assert!(view.open_report().is_none());
}

#[tokio::test]
async fn test_closed_list_view_ignores_late_results() {
    let view = PropertyListView::new(mock_client());
    view.close();
    let err = view.load(&PropertyFilter::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Cancelled));
    assert!(view.state().value().is_none());
}

#[tokio::test]
async fn test_chain_record_for_verified_property() {
    let record = mock_client().blockchain().get_property("1").await.unwrap();
    assert_eq!(record.property_id, "1");
    assert!(record.transaction_hash.starts_with("0x"));
}

#[tokio::test]
async fn test_closed_details_view_is_not_written_after_purchase() {
    let view = PropertyDetailsView::new(mock_client());
    view.load("1").await.unwrap();
    view.close();

    view.purchase("3", &apple_pay()).await.unwrap();
    assert!(view.reports().iter().all(|r| !r.purchased));
}

#[tokio::test]
async fn test_same_report_on_two_properties_can_be_bought() {
    let client = mock_client();
    let first = PropertyDetailsView::new(client.clone());
    let second = PropertyDetailsView::new(client);
    first.load("1").await.unwrap();
    second.load("4").await.unwrap();

    let pay_a = apple_pay();
    let pay_b = apple_pay();
    let (a, b) = tokio::join!(
        first.purchase("1", &pay_a),
        second.purchase("1", &pay_b)
    );
    assert!(a.is_ok());
    assert!(b.is_ok());
}
