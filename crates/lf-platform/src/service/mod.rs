//! Service Layer
//!
//! Business logic for the identity core: token issuance and verification,
//! password hashing, account-status policy, and the password reset flow.

pub mod account;
pub mod auth;
pub mod mail;
pub mod password;
pub mod reset;

pub use auth::{
    extract_bearer_token, AccessTokenClaims, AuthConfig, AuthService, ResetTokenClaims, TokenKind,
};
pub use mail::{Mailer, TracingMailer};
pub use password::{Argon2Config, PasswordService};
pub use reset::PasswordResetService;
