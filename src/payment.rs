use crate::errors::AppError;
use crate::models::{PaymentMethod, PaymentRequest, TransactionData};
use rand::rngs::OsRng;
use rand::RngCore;
use std::time::Duration;

/// Card fields collected by the payment form.
#[derive(Debug, Clone, Default)]
pub struct CardDetails {
    pub card_number: String,
    pub expiry_date: String,
    pub cvv: String,
    pub cardholder_name: String,
}

/// Simulated checkout for a single report.
///
/// No processor is contacted; transaction data is synthesised locally after
/// a fixed delay.
pub struct PaymentProcessor {
    delay: Duration,
    wallet_address: Option<String>,
}

impl PaymentProcessor {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            wallet_address: None,
        }
    }

    /// Connects the wallet used by crypto payments.
    pub fn connect_wallet(&mut self, address: Option<String>) -> Result<&str, AppError> {
        match address.filter(|a| !a.is_empty()) {
            Some(addr) => Ok(self.wallet_address.insert(addr).as_str()),
            None => Err(AppError::Validation(
                "No crypto wallet found. Please install MetaMask or another wallet provider."
                    .to_string(),
            )),
        }
    }

    pub fn wallet_connected(&self) -> bool {
        self.wallet_address.is_some()
    }

    /// Produces the payment payload for `method`.
    pub async fn process(
        &self,
        method: PaymentMethod,
        card: Option<&CardDetails>,
    ) -> Result<PaymentRequest, AppError> {
        let millis = chrono::Utc::now().timestamp_millis();

        let transaction = match method {
            PaymentMethod::ApplePay => TransactionData {
                transaction_id: Some(format!("apple-{}", millis)),
                status: "completed".to_string(),
                ..Default::default()
            },
            PaymentMethod::Card => {
                let number = card.map(|c| c.card_number.as_str()).unwrap_or_default();
                let digits: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
                let last4 = digits[digits.len().saturating_sub(4)..].to_string();
                TransactionData {
                    transaction_id: Some(format!("card-{}", millis)),
                    last4: Some(last4),
                    status: "completed".to_string(),
                    ..Default::default()
                }
            }
            PaymentMethod::Crypto => {
                let wallet = self.wallet_address.clone().ok_or_else(|| {
                    AppError::Validation("Please connect your wallet first".to_string())
                })?;
                TransactionData {
                    wallet_address: Some(wallet),
                    transaction_hash: Some(random_tx_hash()),
                    status: "completed".to_string(),
                    ..Default::default()
                }
            }
        };

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        tracing::info!("Payment via {} completed", method);
        Ok(PaymentRequest {
            payment_method: method,
            transaction,
        })
    }
}

fn random_tx_hash() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    format!("0x{}", hex::encode(bytes))
}
