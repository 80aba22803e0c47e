//! Password Reset Flow
//!
//! Orchestrates reset-token issuance and email dispatch. The reset token is
//! a capability hint carried in the emailed link for the client-side reset
//! form; it never grants API access on its own - the actual password change
//! goes through the authenticated change-password endpoint.

use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::service::account;
use crate::service::auth::AuthService;
use crate::service::mail::Mailer;
use crate::store::UserStore;

pub struct PasswordResetService {
    auth_service: Arc<AuthService>,
    user_store: Arc<dyn UserStore>,
    mailer: Arc<dyn Mailer>,
    /// Base URL of the frontend reset form, e.g. `https://app.example.com`.
    reset_base_url: String,
}

impl PasswordResetService {
    pub fn new(
        auth_service: Arc<AuthService>,
        user_store: Arc<dyn UserStore>,
        mailer: Arc<dyn Mailer>,
        reset_base_url: impl Into<String>,
    ) -> Self {
        Self {
            auth_service,
            user_store,
            mailer,
            reset_base_url: reset_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Issue a reset token for the account and email the reset link.
    ///
    /// Unknown emails and non-active accounts surface distinguishable
    /// errors (see DESIGN.md on the enumeration hardening gap). Nothing is
    /// sent unless every step before it succeeded.
    pub async fn request_reset(&self, email: &str) -> Result<()> {
        let user = self
            .user_store
            .find_by_email(email)
            .await?
            .ok_or(crate::error::PlatformError::UserNotFound)?;
        account::ensure_active(&user)?;

        let token = self.auth_service.issue_reset(&user.email, user.role)?;
        let link = format!(
            "{}/reset-password?token={}&email={}",
            self.reset_base_url, token, user.email
        );
        let html_body = format!(
            "<p>Hello {},</p>\
             <p>We received a request to reset your password. The link below \
             is valid for 10 minutes:</p>\
             <p><a href=\"{link}\">Reset your password</a></p>\
             <p>If you did not request this, you can ignore this email.</p>",
            user.name
        );

        self.mailer
            .send(&user.email, "Reset your password", &html_body)
            .await?;

        info!(user_id = %user.id, "password reset email dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AccountStatus, User};
    use crate::error::PlatformError;
    use crate::service::auth::AuthConfig;
    use crate::store::InMemoryUserStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<(String, String, String)>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<()> {
            self.sent
                .lock()
                .push((to.to_string(), subject.to_string(), html_body.to_string()));
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _html_body: &str) -> Result<()> {
            Err(PlatformError::internal("smtp connection refused"))
        }
    }

    fn setup(mailer: Arc<dyn Mailer>) -> (PasswordResetService, Arc<InMemoryUserStore>, Arc<AuthService>) {
        let store = Arc::new(InMemoryUserStore::new());
        let auth = Arc::new(AuthService::new(AuthConfig::new("access", "refresh")));
        let svc = PasswordResetService::new(
            auth.clone(),
            store.clone(),
            mailer,
            "https://app.example.com/",
        );
        (svc, store, auth)
    }

    #[tokio::test]
    async fn test_reset_email_carries_verifiable_token() {
        let mailer = Arc::new(RecordingMailer::default());
        let (svc, store, auth) = setup(mailer.clone());
        store
            .insert(&User::new("user@example.com", "hash", "User"))
            .await
            .unwrap();

        svc.request_reset("user@example.com").await.unwrap();

        let sent = mailer.sent.lock();
        assert_eq!(sent.len(), 1);
        let (to, _subject, body) = &sent[0];
        assert_eq!(to, "user@example.com");

        // Pull the token back out of the emailed link and verify it.
        let token = body
            .split("token=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap();
        let claims = auth.verify_reset(token).unwrap();
        assert_eq!(claims.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_unknown_email_is_rejected() {
        let (svc, _store, _auth) = setup(Arc::new(RecordingMailer::default()));
        assert!(matches!(
            svc.request_reset("nobody@example.com").await.unwrap_err(),
            PlatformError::UserNotFound
        ));
    }

    #[tokio::test]
    async fn test_blocked_account_gets_no_email() {
        let mailer = Arc::new(RecordingMailer::default());
        let (svc, store, _auth) = setup(mailer.clone());
        store
            .insert(
                &User::new("blocked@example.com", "hash", "B")
                    .with_status(AccountStatus::Blocked),
            )
            .await
            .unwrap();

        assert!(matches!(
            svc.request_reset("blocked@example.com").await.unwrap_err(),
            PlatformError::AccountBlocked
        ));
        assert!(mailer.sent.lock().is_empty());
    }

    #[tokio::test]
    async fn test_mailer_failure_surfaces() {
        let (svc, store, _auth) = setup(Arc::new(FailingMailer));
        store
            .insert(&User::new("user@example.com", "hash", "User"))
            .await
            .unwrap();

        assert!(matches!(
            svc.request_reset("user@example.com").await.unwrap_err(),
            PlatformError::Internal { .. }
        ));
    }
}
