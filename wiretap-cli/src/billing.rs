//! Demo billing client used by `wiretap demo`.
//!
//! Every public call goes through `#[intercepted]`, so running the demo shows
//! one log entry per call on whatever sinks are configured.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use wiretap_intercept::{Interceptor, intercepted};

pub const SETTLEMENT_CURRENCY: &str = "USD";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub charge_id: String,
    pub amount: u64,
    pub currency: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum BillingError {
    #[error("400 Bad Request: invalid currency {0}")]
    InvalidCurrency(String),
    #[error("amount must be greater than zero")]
    ZeroAmount,
}

/// In-process stand-in for a remote billing service.
pub struct BillingClient {
    interceptor: Interceptor,
    ledger: Mutex<HashMap<String, Receipt>>,
    next_id: AtomicU64,
}

impl BillingClient {
    pub fn new(interceptor: Interceptor) -> Self {
        Self {
            interceptor,
            ledger: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    #[intercepted(target = "billing", via = self.interceptor)]
    pub fn charge(&self, amount: u64, currency: &str) -> Result<Receipt, BillingError> {
        if currency != SETTLEMENT_CURRENCY {
            return Err(BillingError::InvalidCurrency(currency.to_string()));
        }
        if amount == 0 {
            return Err(BillingError::ZeroAmount);
        }

        let receipt = Receipt {
            charge_id: format!("ch_{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
            amount,
            currency: currency.to_string(),
        };
        self.ledger()
            .insert(receipt.charge_id.clone(), receipt.clone());
        Ok(receipt)
    }

    /// Refund a charge. Unknown charge ids are not an error: there is simply
    /// nothing to refund.
    #[intercepted(target = "billing", via = self.interceptor)]
    pub async fn refund(&self, charge_id: &str) -> Result<Option<Receipt>, BillingError> {
        tokio::task::yield_now().await;
        Ok(self.ledger().remove(charge_id))
    }

    #[intercepted(target = "billing", via = self.interceptor)]
    pub fn ping(&self) {}

    fn ledger(&self) -> MutexGuard<'_, HashMap<String, Receipt>> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
