//! Payment status polling
//!
//! Fixed-interval, bounded-attempt polling after the gateway redirect
//! returns. Exhausting the attempts is not an error: the payment may
//! still land, so the caller gets a "still processing" terminal state.

use crate::error::ApiError;
use crate::services::{PaymentGateway, PaymentState};
use std::time::Duration;
use tracing::{debug, warn};

/// Default poll interval between status checks
pub const POLL_INTERVAL: Duration = Duration::from_millis(3000);

/// Default maximum status checks before giving up
pub const MAX_ATTEMPTS: u32 = 10;

/// Terminal outcome of a polling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Payment confirmed; token unlocks the final document
    Completed { download_token: String },
    /// User cancelled at the gateway
    Cancelled,
    /// Gateway reported failure
    Failed,
    /// Attempts exhausted while the gateway still reports pending
    StillProcessing,
}

/// Poll the gateway until a terminal state or the attempt budget runs
/// out.
///
/// # Errors
/// Transport/server failure from a status check is surfaced
/// immediately; the caller may re-run the poll.
pub async fn poll_payment(
    gateway: &dyn PaymentGateway,
    payment_id: &str,
    interval: Duration,
    max_attempts: u32,
) -> Result<PaymentOutcome, ApiError> {
    for attempt in 1..=max_attempts {
        let status = gateway.status(payment_id).await?;
        debug!(payment_id, attempt, status = ?status.status, "payment status poll");

        match status.status {
            PaymentState::Completed => {
                let download_token = status.download_token.unwrap_or_default();
                return Ok(PaymentOutcome::Completed { download_token });
            }
            PaymentState::Cancelled => return Ok(PaymentOutcome::Cancelled),
            PaymentState::Failed => return Ok(PaymentOutcome::Failed),
            PaymentState::Pending | PaymentState::Processing => {
                if attempt < max_attempts {
                    tokio::time::sleep(interval).await;
                }
            }
        }
    }

    warn!(payment_id, max_attempts, "payment still processing after poll budget");
    Ok(PaymentOutcome::StillProcessing)
}
