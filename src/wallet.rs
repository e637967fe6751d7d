//! Smart-wallet creation and basename registration used by wallet onboarding.
//!
//! Both are simulations: the key pair never touches a chain and basenames are
//! claimed in an in-process directory.

use crate::errors::AppError;
use crate::session::Session;
use rand::rngs::OsRng;
use rand::RngCore;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

pub const PRIVATE_KEY_BYTES: usize = 32;
pub const BASENAME_SUFFIX: &str = ".base";

/// Freshly generated wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct SmartWallet {
    pub address: String,
    pub private_key: String,
}

impl SmartWallet {
    /// Generates a wallet from the OS RNG.
    pub fn generate() -> Self {
        let mut rng = OsRng;
        Self::generate_with(&mut rng)
    }

    pub fn generate_with<R: RngCore>(rng: &mut R) -> Self {
        let mut key = [0u8; PRIVATE_KEY_BYTES];
        rng.fill_bytes(&mut key);
        Self {
            address: derive_address(&key),
            private_key: format!("0x{}", hex::encode(key)),
        }
    }

    /// Generates a wallet and stores it in the session.
    pub fn create(session: &Session) -> Result<Self, AppError> {
        let wallet = Self::generate();
        session.set_wallet(&wallet.address, &wallet.private_key)?;
        tracing::info!("Smart wallet created: {}", wallet.address);
        Ok(wallet)
    }

    /// Address of a previously created wallet, if the session has one.
    pub fn connect_existing(session: &Session) -> Result<String, AppError> {
        session
            .wallet_address()
            .ok_or_else(|| AppError::Validation("No accounts found".to_string()))
    }
}

/// 20-byte address taken from the tail of the key's SHA-256 digest.
fn derive_address(key: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key);
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[12..]))
}

/// Lowercases and strips everything outside `[a-z0-9]`.
pub fn sanitize_basename(raw: &str) -> String {
    static DISALLOWED: OnceLock<Regex> = OnceLock::new();
    let re = DISALLOWED.get_or_init(|| Regex::new(r"[^a-z0-9]").expect("static regex"));
    re.replace_all(&raw.to_lowercase(), "").into_owned()
}

/// Registry answering availability and recording claims.
pub trait BasenameDirectory: Send + Sync {
    fn is_available(&self, name: &str) -> bool;
    fn claim(&self, name: &str, owner: &str) -> Result<(), AppError>;
}

/// In-process directory seeded with a few reserved names.
pub struct InMemoryBasenameDirectory {
    taken: RwLock<HashSet<String>>,
}

impl Default for InMemoryBasenameDirectory {
    fn default() -> Self {
        Self::with_taken(["admin", "base", "homefax", "coinbase", "vitalik"])
    }
}

impl InMemoryBasenameDirectory {
    pub fn with_taken<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: RwLock::new(names.into_iter().map(Into::into).collect()),
        }
    }
}

impl BasenameDirectory for InMemoryBasenameDirectory {
    fn is_available(&self, name: &str) -> bool {
        self.taken
            .read()
            .map(|taken| !taken.contains(name))
            .unwrap_or(false)
    }

    fn claim(&self, name: &str, owner: &str) -> Result<(), AppError> {
        let mut taken = self
            .taken
            .write()
            .map_err(|_| AppError::Internal("basename directory lock poisoned".to_string()))?;
        if !taken.insert(name.to_string()) {
            return Err(AppError::Validation(format!(
                "The basename \"{}\" is already taken. Please try another.",
                name
            )));
        }
        tracing::info!("Basename {}{} claimed by {}", name, BASENAME_SUFFIX, owner);
        Ok(())
    }
}

/// Check-then-register flow for one wallet's basename.
pub struct BasenameRegistrar {
    wallet_address: String,
    session: Session,
    directory: Arc<dyn BasenameDirectory>,
    delay: Duration,
    name: String,
    available: Option<bool>,
}

impl BasenameRegistrar {
    pub fn new(
        wallet_address: impl Into<String>,
        session: Session,
        directory: Arc<dyn BasenameDirectory>,
        delay: Duration,
    ) -> Self {
        Self {
            wallet_address: wallet_address.into(),
            session,
            directory,
            delay,
            name: String::new(),
            available: None,
        }
    }

    /// Replaces the draft name. Any earlier availability answer is discarded.
    pub fn set_input(&mut self, raw: &str) {
        self.name = sanitize_basename(raw);
        self.available = None;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn availability(&self) -> Option<bool> {
        self.available
    }

    pub async fn check_availability(&mut self) -> Result<bool, AppError> {
        if self.name.is_empty() {
            return Err(AppError::Validation("Please enter a basename".to_string()));
        }

        self.pause().await;
        let available = self.directory.is_available(&self.name);
        self.available = Some(available);

        if !available {
            return Err(AppError::Validation(format!(
                "The basename \"{}\" is already taken. Please try another.",
                self.name
            )));
        }
        Ok(true)
    }

    /// Claims the checked name and caches it in the session.
    pub async fn register(&mut self) -> Result<String, AppError> {
        if self.name.is_empty() {
            return Err(AppError::Validation("Please enter a basename".to_string()));
        }
        if self.available != Some(true) {
            return Err(AppError::Validation(
                "Please check basename availability first".to_string(),
            ));
        }

        self.pause().await;
        if let Err(e) = self.directory.claim(&self.name, &self.wallet_address) {
            self.available = Some(false);
            return Err(e);
        }
        self.session.set_basename(&self.name)?;
        Ok(self.name.clone())
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn registrar(session: &Session) -> BasenameRegistrar {
        BasenameRegistrar::new(
            "0xabc",
            session.clone(),
            Arc::new(InMemoryBasenameDirectory::default()),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_wallet_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let wallet = SmartWallet::generate_with(&mut rng);
        assert_eq!(wallet.address.len(), 42);
        assert_eq!(wallet.private_key.len(), 66);
        assert!(wallet.address.starts_with("0x"));

        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(SmartWallet::generate_with(&mut rng), wallet);
    }

    #[test]
    fn test_create_persists_wallet() {
        let session = Session::in_memory();
        let wallet = SmartWallet::create(&session).unwrap();
        assert_eq!(
            SmartWallet::connect_existing(&session).unwrap(),
            wallet.address
        );
        assert_eq!(session.wallet_private_key(), Some(wallet.private_key));
    }

    #[test]
    fn test_connect_without_wallet() {
        let err = SmartWallet::connect_existing(&Session::in_memory()).unwrap_err();
        assert_eq!(err.user_message(), "No accounts found");
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize_basename("My-House_42!"), "myhouse42");
        assert_eq!(sanitize_basename("---"), "");
    }

    #[tokio::test]
    async fn test_register_requires_check() {
        let session = Session::in_memory();
        let mut reg = registrar(&session);
        reg.set_input("alice");

        let err = reg.register().await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "Please check basename availability first"
        );

        assert!(reg.check_availability().await.unwrap());
        assert_eq!(reg.register().await.unwrap(), "alice");
        assert_eq!(session.basename().as_deref(), Some("alice"));
    }

    #[tokio::test]
    async fn test_taken_name() {
        let session = Session::in_memory();
        let mut reg = registrar(&session);
        reg.set_input("HomeFax");

        let err = reg.check_availability().await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "The basename \"homefax\" is already taken. Please try another."
        );
        assert_eq!(reg.availability(), Some(false));
        assert!(session.basename().is_none());
    }

    #[tokio::test]
    async fn test_editing_resets_availability() {
        let session = Session::in_memory();
        let mut reg = registrar(&session);
        reg.set_input("bob");
        reg.check_availability().await.unwrap();
        reg.set_input("bobby");
        assert_eq!(reg.availability(), None);
    }

    #[tokio::test]
    async fn test_empty_name() {
        let mut reg = registrar(&Session::in_memory());
        reg.set_input("!!!");
        let err = reg.check_availability().await.unwrap_err();
        assert_eq!(err.user_message(), "Please enter a basename");
    }
}
