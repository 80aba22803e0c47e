//! Token Service
//!
//! Stateless JWT issuance and verification. Three token kinds, each signed
//! with its own secret so that possession of one kind can never forge
//! another:
//!
//! - **Access**: short-lived, authorizes API calls
//! - **Refresh**: long-lived, exchanged for a new token pair
//! - **Reset**: ~10 minutes, carried only inside a password-reset link
//!
//! Expiry is embedded in the token itself, so verification needs no external
//! state: the trade is horizontal scalability against instant revocation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::{Principal, UserRole};
use crate::error::{PlatformError, Result};

/// Token signing configuration.
///
/// Secrets come from process configuration and are never logged
/// (deliberately no `Debug` derive).
#[derive(Clone)]
pub struct AuthConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    /// Defaults to the access secret when not configured separately.
    pub reset_secret: String,
    pub access_token_ttl_secs: i64,
    pub refresh_token_ttl_secs: i64,
    pub reset_token_ttl_secs: i64,
}

impl AuthConfig {
    pub fn new(access_secret: impl Into<String>, refresh_secret: impl Into<String>) -> Self {
        let access_secret = access_secret.into();
        Self {
            reset_secret: access_secret.clone(),
            access_secret,
            refresh_secret: refresh_secret.into(),
            access_token_ttl_secs: 3600,
            refresh_token_ttl_secs: 86400 * 30,
            reset_token_ttl_secs: 600,
        }
    }

    pub fn with_reset_secret(mut self, reset_secret: impl Into<String>) -> Self {
        self.reset_secret = reset_secret.into();
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
    Reset,
}

/// Claims carried by access and refresh tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject - user ID
    pub sub: String,
    pub email: String,
    pub role: UserRole,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiry (unix timestamp)
    pub exp: i64,
}

/// Claims carried by password-reset tokens.
///
/// No `sub`, and unknown fields are rejected: even with the reset secret
/// shared with the access secret, neither kind deserializes as the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResetTokenClaims {
    pub email: String,
    pub role: UserRole,
    pub iat: i64,
    pub exp: i64,
}

pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    pub fn access_token_ttl_secs(&self) -> i64 {
        self.config.access_token_ttl_secs
    }

    pub fn issue_access(&self, principal: &Principal) -> Result<String> {
        self.issue_identity(principal, TokenKind::Access)
    }

    pub fn issue_refresh(&self, principal: &Principal) -> Result<String> {
        self.issue_identity(principal, TokenKind::Refresh)
    }

    pub fn issue_reset(&self, email: &str, role: UserRole) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = ResetTokenClaims {
            email: email.to_string(),
            role,
            iat: now,
            exp: now + self.config.reset_token_ttl_secs,
        };
        self.encode_claims(&claims, TokenKind::Reset)
    }

    pub fn verify_access(&self, token: &str) -> Result<AccessTokenClaims> {
        self.decode_claims(token, TokenKind::Access)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<AccessTokenClaims> {
        self.decode_claims(token, TokenKind::Refresh)
    }

    pub fn verify_reset(&self, token: &str) -> Result<ResetTokenClaims> {
        self.decode_claims(token, TokenKind::Reset)
    }

    fn issue_identity(&self, principal: &Principal, kind: TokenKind) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: principal.id.clone(),
            email: principal.email.clone(),
            role: principal.role,
            iat: now,
            exp: now + self.ttl_for(kind),
        };
        self.encode_claims(&claims, kind)
    }

    fn secret_for(&self, kind: TokenKind) -> &str {
        match kind {
            TokenKind::Access => &self.config.access_secret,
            TokenKind::Refresh => &self.config.refresh_secret,
            TokenKind::Reset => &self.config.reset_secret,
        }
    }

    fn ttl_for(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.config.access_token_ttl_secs,
            TokenKind::Refresh => self.config.refresh_token_ttl_secs,
            TokenKind::Reset => self.config.reset_token_ttl_secs,
        }
    }

    fn encode_claims<T: Serialize>(&self, claims: &T, kind: TokenKind) -> Result<String> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret_for(kind).as_bytes()),
        )
        .map_err(|e| PlatformError::internal(format!("token signing failed: {e}")))
    }

    /// Validate signature and expiry against the kind-specific secret.
    ///
    /// Bad signature, wrong kind, malformed structure, and expiry all
    /// collapse to `InvalidToken`; the specific cryptographic cause is not
    /// surfaced to callers.
    fn decode_claims<T: DeserializeOwned>(&self, token: &str, kind: TokenKind) -> Result<T> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is strict: a token is invalid the second it expires.
        validation.leeway = 0;

        decode::<T>(
            token,
            &DecodingKey::from_secret(self.secret_for(kind).as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|_| PlatformError::InvalidToken)
    }
}

/// Extract the token from an `Authorization` header value.
///
/// The format must be exactly `Bearer <token>`.
pub fn extract_bearer_token(header: &str) -> Option<&str> {
    let token = header.strip_prefix("Bearer ")?;
    if token.is_empty() || token.contains(' ') {
        return None;
    }
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> AuthService {
        AuthService::new(AuthConfig::new("access-secret", "refresh-secret"))
    }

    fn principal() -> Principal {
        Principal {
            id: "user-1".to_string(),
            email: "user@example.com".to_string(),
            role: UserRole::Student,
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let svc = service();
        let token = svc.issue_access(&principal()).unwrap();
        let claims = svc.verify_access(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, UserRole::Student);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let svc = service();
        let token = svc.issue_refresh(&principal()).unwrap();
        let claims = svc.verify_refresh(&token).unwrap();
        assert_eq!(claims.email, "user@example.com");
    }

    #[test]
    fn test_access_and_refresh_are_not_interchangeable() {
        let svc = service();
        let access = svc.issue_access(&principal()).unwrap();
        let refresh = svc.issue_refresh(&principal()).unwrap();

        assert!(matches!(
            svc.verify_refresh(&access).unwrap_err(),
            PlatformError::InvalidToken
        ));
        assert!(matches!(
            svc.verify_access(&refresh).unwrap_err(),
            PlatformError::InvalidToken
        ));
    }

    #[test]
    fn test_reset_token_round_trip() {
        let svc = service();
        let token = svc
            .issue_reset("user@example.com", UserRole::Student)
            .unwrap();
        let claims = svc.verify_reset(&token).unwrap();
        assert_eq!(claims.email, "user@example.com");
        assert_eq!(claims.role, UserRole::Student);
    }

    #[test]
    fn test_reset_token_never_verifies_as_access() {
        // The reset secret defaults to the access secret, so the shape of
        // the claims is what keeps the kinds apart.
        let svc = service();
        let reset = svc
            .issue_reset("user@example.com", UserRole::Student)
            .unwrap();
        assert!(svc.verify_access(&reset).is_err());
    }

    #[test]
    fn test_access_token_never_verifies_as_reset() {
        let svc = service();
        let access = svc.issue_access(&principal()).unwrap();
        assert!(svc.verify_reset(&access).is_err());
    }

    #[test]
    fn test_expired_token_rejected_strictly() {
        let svc = service();
        let now = Utc::now().timestamp();
        let expired = AccessTokenClaims {
            sub: "user-1".to_string(),
            email: "user@example.com".to_string(),
            role: UserRole::Student,
            iat: now - 120,
            exp: now - 2,
        };
        let token = svc.encode_claims(&expired, TokenKind::Access).unwrap();
        assert!(matches!(
            svc.verify_access(&token).unwrap_err(),
            PlatformError::InvalidToken
        ));

        let valid = AccessTokenClaims {
            exp: now + 60,
            ..expired
        };
        let token = svc.encode_claims(&valid, TokenKind::Access).unwrap();
        assert!(svc.verify_access(&token).is_ok());
    }

    #[test]
    fn test_malformed_token_rejected() {
        let svc = service();
        assert!(svc.verify_access("not.a.jwt").is_err());
        assert!(svc.verify_access("").is_err());
        assert!(svc.verify_access("abc").is_err());
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let mut token = svc.issue_access(&principal()).unwrap();
        // Flip a character in the signature segment.
        let flipped = if token.ends_with('a') { 'b' } else { 'a' };
        token.pop();
        token.push(flipped);
        assert!(svc.verify_access(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer_token("bearer abc"), None);
        assert_eq!(extract_bearer_token("Token abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Bearer a b"), None);
        assert_eq!(extract_bearer_token("abc"), None);
    }
}
