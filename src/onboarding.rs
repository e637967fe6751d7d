//! Sign-in page state: the auth option selector, the email form and the
//! wallet onboarding machine (Wallet → Basename → Complete).

use crate::api::ApiClient;
use crate::errors::AppError;
use crate::models::RegisterRequest;
use crate::navigation::{Navigator, Route};
use crate::wallet::{BasenameRegistrar, SmartWallet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

/// Mutually exclusive sign-in method shown on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOption {
    Email,
    Gmail,
    Facebook,
    Twitter,
    Github,
    Apple,
    Linkedin,
    Discord,
    Wallet,
}

impl AuthOption {
    pub fn is_social(&self) -> bool {
        matches!(
            self,
            AuthOption::Facebook
                | AuthOption::Twitter
                | AuthOption::Github
                | AuthOption::Apple
                | AuthOption::Linkedin
                | AuthOption::Discord
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OnboardingStep {
    Wallet,
    Basename,
    Complete,
}

impl fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OnboardingStep::Wallet => "wallet",
            OnboardingStep::Basename => "basename",
            OnboardingStep::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// State owned by the sign-in page for its lifetime.
pub struct AuthFlow {
    api: ApiClient,
    navigator: Arc<dyn Navigator>,
    redirect_delay: Duration,

    mode: AuthMode,
    option: AuthOption,
    email: String,
    password: String,
    confirm_password: String,
    loading: bool,
    error: Option<String>,

    wallet_address: Option<String>,
    basename: Option<String>,
    step: OnboardingStep,
    history: Vec<OnboardingStep>,
    redirected: bool,
}

impl AuthFlow {
    pub fn new(api: ApiClient, navigator: Arc<dyn Navigator>, redirect_delay: Duration) -> Self {
        Self {
            api,
            navigator,
            redirect_delay,
            mode: AuthMode::SignIn,
            option: AuthOption::Email,
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            loading: false,
            error: None,
            wallet_address: None,
            basename: None,
            step: OnboardingStep::Wallet,
            history: vec![OnboardingStep::Wallet],
            redirected: false,
        }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    pub fn option(&self) -> AuthOption {
        self.option
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    /// Every step entered since the last reset, starting with `Wallet`.
    pub fn step_history(&self) -> &[OnboardingStep] {
        &self.history
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn wallet_address(&self) -> Option<&str> {
        self.wallet_address.as_deref()
    }

    pub fn basename(&self) -> Option<&str> {
        self.basename.as_deref()
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = password.into();
    }

    pub fn set_confirm_password(&mut self, confirm: impl Into<String>) {
        self.confirm_password = confirm.into();
    }

    pub fn select_option(&mut self, option: AuthOption) {
        self.option = option;
        self.error = None;
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.error = None;
    }

    /// Records an inline error. The onboarding step does not move.
    pub fn fail(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("Auth step {} failed: {}", self.step, message);
        self.error = Some(message);
        self.loading = false;
    }

    // ============ Email / social ============

    /// Validates the email form, then signs in or registers.
    pub async fn submit_email(&mut self) -> Result<(), AppError> {
        if self.option != AuthOption::Email {
            return Err(AppError::InvalidTransition(
                "email form submitted while another auth option is active".to_string(),
            ));
        }
        if self.email.is_empty() || self.password.is_empty() {
            return Err(self.reject("Please fill in all fields"));
        }
        if self.mode == AuthMode::SignUp && self.password != self.confirm_password {
            return Err(self.reject("Passwords do not match"));
        }

        self.loading = true;
        tracing::info!("Attempting {:?} with email: {}", self.mode, self.email);

        let result = match self.mode {
            AuthMode::SignIn => self.api.auth().login(&self.email, &self.password).await,
            AuthMode::SignUp => {
                let request = RegisterRequest {
                    email: self.email.clone(),
                    password: self.password.clone(),
                    name: None,
                };
                self.api.auth().register(&request).await
            }
        };

        match result {
            Ok(_) => {
                self.email.clear();
                self.password.clear();
                self.confirm_password.clear();
                self.error = None;
                self.loading = false;
                self.navigator.navigate(Route::Dashboard);
                Ok(())
            }
            Err(e) => {
                self.fail(e.user_message());
                Err(e)
            }
        }
    }

    pub async fn gmail_auth(&mut self) -> Result<(), AppError> {
        self.select_option(AuthOption::Gmail);
        self.google_sign_in().await
    }

    /// Social providers all go through the Google flow.
    pub async fn social_auth(&mut self, provider: AuthOption) -> Result<(), AppError> {
        if !provider.is_social() {
            return Err(AppError::InvalidTransition(format!(
                "{:?} is not a social provider",
                provider
            )));
        }
        self.select_option(provider);
        tracing::info!("Preparing to authenticate with {:?}", provider);
        self.google_sign_in().await
    }

    async fn google_sign_in(&mut self) -> Result<(), AppError> {
        self.loading = true;
        let result = self.api.auth().login_with_gmail().await;
        match result {
            Ok(_) => {
                self.loading = false;
                self.navigator.navigate(Route::Dashboard);
                Ok(())
            }
            Err(e) => {
                self.fail("Failed to authenticate with Google. Please try again.");
                Err(e)
            }
        }
    }

    fn reject(&mut self, message: &str) -> AppError {
        self.error = Some(message.to_string());
        AppError::Validation(message.to_string())
    }

    // ============ Wallet onboarding ============

    /// Switches to the wallet option and restarts onboarding at `Wallet`.
    pub fn start_wallet_auth(&mut self) {
        self.select_option(AuthOption::Wallet);
        self.step = OnboardingStep::Wallet;
        self.history = vec![OnboardingStep::Wallet];
        self.wallet_address = None;
        self.basename = None;
        self.redirected = false;
    }

    /// Wallet → Basename.
    pub fn wallet_created(&mut self, address: &str) -> Result<OnboardingStep, AppError> {
        self.expect_step(OnboardingStep::Wallet)?;
        self.wallet_address = Some(address.to_string());
        self.error = None;
        self.advance(OnboardingStep::Basename);
        Ok(self.step)
    }

    /// Wallet → Complete when a basename is cached, otherwise Wallet → Basename.
    pub async fn wallet_connected(&mut self, address: &str) -> Result<OnboardingStep, AppError> {
        self.expect_step(OnboardingStep::Wallet)?;
        self.wallet_address = Some(address.to_string());
        self.error = None;

        let cached = self.api.session().basename();
        match cached {
            Some(saved) => {
                self.basename = Some(saved);
                self.advance(OnboardingStep::Complete);
                self.redirect_after_delay().await;
            }
            None => self.advance(OnboardingStep::Basename),
        }
        Ok(self.step)
    }

    /// Basename → Complete.
    pub async fn basename_registered(&mut self, name: &str) -> Result<OnboardingStep, AppError> {
        self.expect_step(OnboardingStep::Basename)?;
        self.basename = Some(name.to_string());
        self.error = None;
        self.advance(OnboardingStep::Complete);
        self.redirect_after_delay().await;
        Ok(self.step)
    }

    /// Creates a smart wallet and feeds the result into the machine.
    pub async fn create_wallet(&mut self) -> Result<OnboardingStep, AppError> {
        self.expect_step(OnboardingStep::Wallet)?;
        let created = SmartWallet::create(self.api.session());
        match created {
            Ok(wallet) => self.wallet_created(&wallet.address),
            Err(e) => {
                self.fail("Failed to create smart wallet. Please try again.");
                Err(e)
            }
        }
    }

    /// Connects the wallet saved in the session, if any.
    pub async fn connect_wallet(&mut self) -> Result<OnboardingStep, AppError> {
        self.expect_step(OnboardingStep::Wallet)?;
        let existing = SmartWallet::connect_existing(self.api.session());
        match existing {
            Ok(address) => self.wallet_connected(&address).await,
            Err(e) => {
                self.fail(e.user_message());
                Err(e)
            }
        }
    }

    /// Mount-time check: a wallet already in the session connects itself.
    pub async fn resume_saved_wallet(&mut self) -> Result<Option<OnboardingStep>, AppError> {
        let saved = self.api.session().wallet_address();
        match saved {
            Some(address) => self.wallet_connected(&address).await.map(Some),
            None => Ok(None),
        }
    }

    /// Runs the registrar's register call and feeds the result into the machine.
    pub async fn register_basename(
        &mut self,
        registrar: &mut BasenameRegistrar,
    ) -> Result<OnboardingStep, AppError> {
        self.expect_step(OnboardingStep::Basename)?;
        match registrar.register().await {
            Ok(name) => self.basename_registered(&name).await,
            Err(e) => {
                self.fail(e.user_message());
                Err(e)
            }
        }
    }

    fn expect_step(&self, expected: OnboardingStep) -> Result<(), AppError> {
        if self.option != AuthOption::Wallet {
            return Err(AppError::InvalidTransition(
                "wallet onboarding is not active".to_string(),
            ));
        }
        if self.step != expected {
            return Err(AppError::InvalidTransition(format!(
                "expected step {}, currently at {}",
                expected, self.step
            )));
        }
        Ok(())
    }

    fn advance(&mut self, next: OnboardingStep) {
        tracing::info!("Onboarding {} -> {}", self.step, next);
        self.step = next;
        self.history.push(next);
    }

    async fn redirect_after_delay(&mut self) {
        if self.redirected {
            return;
        }
        if !self.redirect_delay.is_zero() {
            tokio::time::sleep(self.redirect_delay).await;
        }
        self.redirected = true;
        self.navigator.navigate(Route::Dashboard);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::navigation::RecordingNavigator;
    use crate::session::Session;

    fn flow() -> (AuthFlow, RecordingNavigator) {
        let config = Config::for_tests();
        let api = ApiClient::from_config(&config, Session::in_memory()).unwrap();
        let nav = RecordingNavigator::new();
        let flow = AuthFlow::new(api, Arc::new(nav.clone()), config.redirect_delay);
        (flow, nav)
    }

    #[tokio::test]
    async fn test_empty_fields_rejected_before_any_call() {
        let (mut flow, nav) = flow();
        flow.set_email("a@b.com");
        let err = flow.submit_email().await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(flow.error(), Some("Please fill in all fields"));
        assert!(nav.history().is_empty());
        assert!(flow.api.session().token().is_none());
    }

    #[tokio::test]
    async fn test_signup_password_mismatch() {
        let (mut flow, _) = flow();
        flow.toggle_mode();
        flow.set_email("a@b.com");
        flow.set_password("one");
        flow.set_confirm_password("two");
        flow.submit_email().await.unwrap_err();
        assert_eq!(flow.error(), Some("Passwords do not match"));
    }

    #[tokio::test]
    async fn test_switching_option_clears_error() {
        let (mut flow, _) = flow();
        flow.fail("boom");
        flow.select_option(AuthOption::Gmail);
        assert!(flow.error().is_none());
    }

    #[tokio::test]
    async fn test_out_of_order_event_is_rejected() {
        let (mut flow, _) = flow();
        flow.start_wallet_auth();
        let err = flow.basename_registered("alice").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition(_)));
        assert_eq!(flow.step(), OnboardingStep::Wallet);
    }

    #[tokio::test]
    async fn test_wallet_events_require_wallet_option() {
        let (mut flow, _) = flow();
        assert!(flow.wallet_created("0xabc").is_err());
    }

    #[tokio::test]
    async fn test_failure_keeps_step() {
        let (mut flow, _) = flow();
        flow.start_wallet_auth();
        flow.wallet_created("0xabc").unwrap();
        flow.fail("The basename \"base\" is already taken. Please try another.");
        assert_eq!(flow.step(), OnboardingStep::Basename);
        assert!(flow.error().is_some());
    }

    #[tokio::test]
    async fn test_social_auth_rejects_non_social_option() {
        let (mut flow, _) = flow();
        assert!(flow.social_auth(AuthOption::Wallet).await.is_err());
    }
}
