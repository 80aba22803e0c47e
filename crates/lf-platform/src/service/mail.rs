//! Mail Delivery
//!
//! Outbound email seam. The platform only composes messages; delivery
//! belongs to the configured `Mailer` backend.

use async_trait::async_trait;
use tracing::info;

use crate::error::Result;

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one HTML email. A fatal delivery failure is surfaced to the
    /// caller; the platform never retries.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()>;
}

/// Development backend: logs that a message was dispatched without logging
/// its body (reset links embed tokens).
#[derive(Debug, Default)]
pub struct TracingMailer;

impl TracingMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Mailer for TracingMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> Result<()> {
        info!(to = %to, subject = %subject, "email dispatched");
        Ok(())
    }
}
