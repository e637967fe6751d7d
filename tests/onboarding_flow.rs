/// Wallet onboarding walkthroughs against the fixture backend
use homefax_client::api::ApiClient;
use homefax_client::config::Config;
use homefax_client::errors::AppError;
use homefax_client::navigation::{RecordingNavigator, Route};
use homefax_client::onboarding::{AuthFlow, AuthMode, AuthOption, OnboardingStep};
use homefax_client::session::Session;
use homefax_client::wallet::{BasenameRegistrar, InMemoryBasenameDirectory};
use std::sync::Arc;
use std::time::Duration;

fn flow_with(session: Session) -> (AuthFlow, RecordingNavigator) {
    let api = ApiClient::from_config(&Config::for_tests(), session).unwrap();
    let navigator = RecordingNavigator::new();
    let flow = AuthFlow::new(api, Arc::new(navigator.clone()), Duration::ZERO);
    (flow, navigator)
}

fn assert_monotonic(history: &[OnboardingStep]) {
    assert!(history.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_new_wallet_takes_two_transitions() {
    let session = Session::in_memory();
    let (mut flow, navigator) = flow_with(session.clone());
    flow.start_wallet_auth();

    assert_eq!(flow.create_wallet().await.unwrap(), OnboardingStep::Basename);
    let address = flow.wallet_address().unwrap().to_string();
    assert_eq!(session.wallet_address().as_deref(), Some(address.as_str()));

    let mut registrar = BasenameRegistrar::new(
        address,
        session.clone(),
        Arc::new(InMemoryBasenameDirectory::default()),
        Duration::ZERO,
    );
    registrar.set_input("Maple Cottage");
    registrar.check_availability().await.unwrap();
    assert_eq!(
        flow.register_basename(&mut registrar).await.unwrap(),
        OnboardingStep::Complete
    );

    assert_eq!(
        flow.step_history(),
        &[
            OnboardingStep::Wallet,
            OnboardingStep::Basename,
            OnboardingStep::Complete
        ]
    );
    assert_monotonic(flow.step_history());
    assert_eq!(session.basename().as_deref(), Some("maplecottage"));
    assert_eq!(navigator.history(), vec![Route::Dashboard]);
}

#[tokio::test]
async fn test_cached_basename_takes_one_transition() {
    let session = Session::in_memory();
    session.set_wallet("0xfeed", "0xkey").unwrap();
    session.set_basename("returning").unwrap();

    let (mut flow, navigator) = flow_with(session);
    flow.start_wallet_auth();

    assert_eq!(flow.connect_wallet().await.unwrap(), OnboardingStep::Complete);
    assert_eq!(
        flow.step_history(),
        &[OnboardingStep::Wallet, OnboardingStep::Complete]
    );
    assert_eq!(flow.basename(), Some("returning"));
    assert_eq!(navigator.current(), Some(Route::Dashboard));
}

#[tokio::test]
async fn test_saved_wallet_resumes_without_basename() {
    let session = Session::in_memory();
    session.set_wallet("0xfeed", "0xkey").unwrap();

    let (mut flow, navigator) = flow_with(session);
    flow.start_wallet_auth();

    assert_eq!(
        flow.resume_saved_wallet().await.unwrap(),
        Some(OnboardingStep::Basename)
    );
    assert!(navigator.history().is_empty());
}

#[tokio::test]
async fn test_connect_without_saved_wallet_stays_put() {
    let (mut flow, _) = flow_with(Session::in_memory());
    flow.start_wallet_auth();

    assert!(flow.connect_wallet().await.is_err());
    assert_eq!(flow.step(), OnboardingStep::Wallet);
    assert_eq!(flow.error(), Some("No accounts found"));
}

#[tokio::test]
async fn test_steps_never_regress() {
    let (mut flow, _) = flow_with(Session::in_memory());
    flow.start_wallet_auth();
    flow.create_wallet().await.unwrap();

    let err = flow.wallet_created("0xother").unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
    flow.basename_registered("first").await.unwrap();

    let err = flow.basename_registered("second").await.unwrap_err();
    assert!(matches!(err, AppError::InvalidTransition(_)));
    assert_eq!(flow.basename(), Some("first"));
    assert_monotonic(flow.step_history());
}

#[tokio::test]
async fn test_email_sign_up_validates_before_request() {
    let session = Session::in_memory();
    let (mut flow, navigator) = flow_with(session.clone());
    flow.toggle_mode();
    assert_eq!(flow.mode(), AuthMode::SignUp);

    flow.set_email("new@example.com");
    flow.set_password("secret");
    flow.set_confirm_password("different");
    let err = flow.submit_email().await.unwrap_err();
    assert_eq!(err.user_message(), "Passwords do not match");
    assert!(session.token().is_none());

    flow.set_confirm_password("secret");
    flow.submit_email().await.unwrap();
    assert_eq!(session.token().as_deref(), Some("mock-jwt-token"));
    assert_eq!(navigator.current(), Some(Route::Dashboard));
}

#[tokio::test]
async fn test_social_options_use_google_sign_in() {
    let session = Session::in_memory();
    let (mut flow, navigator) = flow_with(session.clone());

    flow.social_auth(AuthOption::Twitter).await.unwrap();
    assert_eq!(flow.option(), AuthOption::Twitter);
    assert!(session.token().is_some());
    assert_eq!(navigator.history(), vec![Route::Dashboard]);
}
