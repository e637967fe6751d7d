use serde::Deserialize;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
pub const ZERO_ADDRESS: &str = "0x0000000000000000000000000000000000000000";

static CONFIG: OnceLock<Config> = OnceLock::new();

/// Returns the process-wide configuration, resolving it from the environment
/// on first access.
pub fn get() -> &'static Config {
    CONFIG.get_or_init(Config::from_env)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockchainConfig {
    pub contract_address: String,
    pub rpc_url: String,
    pub chain_id: u64,
    pub network_name: String,
    pub block_explorer_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeatureFlags {
    pub enable_blockchain_verification: bool,
    pub enable_report_purchase: bool,
    pub enable_property_search: bool,
    pub enable_wallet_connection: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            enable_blockchain_verification: true,
            enable_report_purchase: true,
            enable_property_search: true,
            enable_wallet_connection: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub use_mock_data: bool,
    pub api_base_url: String,
    pub s3_bucket: String,
    pub s3_region: String,
    pub blockchain: BlockchainConfig,
    pub ethstorage_rpc_url: String,
    pub features: FeatureFlags,
    pub app_version: String,
    pub environment: Environment,
    /// Artificial delay applied to every fixture-backed call.
    pub mock_latency: Duration,
    /// Pause between onboarding completion and the dashboard redirect.
    pub redirect_delay: Duration,
    /// When set, the session is persisted to this JSON file.
    pub session_file: Option<PathBuf>,
}

impl Config {
    /// Resolves configuration from the process environment (and `.env`).
    ///
    /// Never fails: every key has a literal default.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration from an arbitrary lookup function.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| -> String {
            lookup(key)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let config = Self {
            use_mock_data: lookup("HOMEFAX_USE_MOCK_DATA").as_deref() == Some("true"),
            api_base_url: var("HOMEFAX_API_URL", DEFAULT_API_BASE_URL),
            s3_bucket: var("HOMEFAX_S3_BUCKET", "homefax-assets"),
            s3_region: var("HOMEFAX_S3_REGION", "us-east-1"),
            blockchain: BlockchainConfig {
                contract_address: var("HOMEFAX_CONTRACT_ADDRESS", ZERO_ADDRESS),
                rpc_url: var("HOMEFAX_RPC_URL", "https://goerli.base.org"),
                chain_id: parse_or(&lookup, "HOMEFAX_CHAIN_ID", 84531),
                network_name: var("HOMEFAX_NETWORK_NAME", "Base Goerli"),
                block_explorer_url: var(
                    "HOMEFAX_BLOCK_EXPLORER_URL",
                    "https://goerli.basescan.org",
                ),
            },
            ethstorage_rpc_url: var(
                "HOMEFAX_ETHSTORAGE_RPC_URL",
                "https://rpc.beta.testnet.l2.quarkchain.io:8545",
            ),
            features: FeatureFlags::default(),
            app_version: var("HOMEFAX_VERSION", "0.1.0"),
            environment: Environment::parse(&var("HOMEFAX_ENV", "development")),
            mock_latency: Duration::from_millis(parse_or(
                &lookup,
                "HOMEFAX_MOCK_LATENCY_MS",
                1000,
            )),
            redirect_delay: Duration::from_millis(parse_or(
                &lookup,
                "HOMEFAX_REDIRECT_DELAY_MS",
                1500,
            )),
            session_file: lookup("HOMEFAX_SESSION_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        };

        if config.is_development() {
            tracing::info!(
                use_mock_data = config.use_mock_data,
                api_base_url = %config.api_base_url,
                environment = ?config.environment,
                contract_address = %config.blockchain.contract_address,
                chain_id = config.blockchain.chain_id,
                network = %config.blockchain.network_name,
                version = %config.app_version,
                "App configuration resolved"
            );
        }

        config
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Configuration for tests: mock mode, no artificial delays.
    pub fn for_tests() -> Self {
        let mut config = Self::from_lookup(|key| match key {
            "HOMEFAX_USE_MOCK_DATA" => Some("true".to_string()),
            "HOMEFAX_ENV" => Some("test".to_string()),
            _ => None,
        });
        config.mock_latency = Duration::ZERO;
        config.redirect_delay = Duration::ZERO;
        config
    }
}

fn parse_or<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} is not a valid number ({}), using {}", key, raw, default);
            default
        }),
        _ => default,
    }
}
