//! Request timeouts
//!
//! Every model call is bounded so a stalled provider surfaces as a
//! generation failure instead of leaving the pipeline stuck in flight.
//!
//! ```ignore
//! let outline = with_timeout(
//!     Duration::from_secs(120),
//!     provider.generate(&prompt, &schema),
//!     "outline generation",
//! )
//! .await?;
//! ```

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::types::{LeadError, Result};

/// Run `future`, failing with [`LeadError::Timeout`] after `timeout`.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} timed out after {:?}", operation_name, timeout);
            Err(LeadError::timeout(operation_name, timeout))
        }
    }
}
