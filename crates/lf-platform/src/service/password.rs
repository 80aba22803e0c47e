//! Password Service
//!
//! One-way credential hashing and verification using Argon2id. Hashing is
//! deliberately slow; the async wrappers run it on the blocking pool so a
//! hash never stalls the request dispatcher.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{PlatformError, Result};

/// Cost parameters for Argon2id.
///
/// This is the only tunable trading verification latency against brute-force
/// resistance. Defaults follow the argon2 crate's recommended parameters.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Config {
    /// Memory cost in KiB
    pub memory_kib: u32,
    /// Number of iterations
    pub iterations: u32,
    /// Degree of parallelism
    pub parallelism: u32,
}

impl Default for Argon2Config {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordService {
    config: Argon2Config,
}

impl PasswordService {
    pub fn new(config: Argon2Config) -> Self {
        Self { config }
    }

    fn hasher(&self) -> Result<Argon2<'static>> {
        let params = Params::new(
            self.config.memory_kib,
            self.config.iterations,
            self.config.parallelism,
            None,
        )
        .map_err(|e| PlatformError::internal(format!("invalid argon2 parameters: {e}")))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password with a fresh random salt.
    ///
    /// Two calls on the same input produce different hashes. A hashing
    /// failure is a fatal internal error, never a silent fallback.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PlatformError::internal(format!("password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash.
    ///
    /// Constant-time comparison via the argon2 verifier. A malformed hash
    /// verifies as `false`, never as an error.
    pub fn verify(&self, password: &str, password_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(password_hash) else {
            return false;
        };
        let Ok(hasher) = self.hasher() else {
            return false;
        };
        hasher
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// `hash` on the blocking pool.
    pub async fn hash_async(&self, password: String) -> Result<String> {
        let svc = *self;
        tokio::task::spawn_blocking(move || svc.hash(&password))
            .await
            .map_err(|e| PlatformError::internal(format!("password hashing task failed: {e}")))?
    }

    /// `verify` on the blocking pool.
    pub async fn verify_async(&self, password: String, password_hash: String) -> Result<bool> {
        let svc = *self;
        tokio::task::spawn_blocking(move || svc.verify(&password, &password_hash))
            .await
            .map_err(|e| PlatformError::internal(format!("password verify task failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Small cost so the suite stays fast; production uses the defaults.
    fn fast_service() -> PasswordService {
        PasswordService::new(Argon2Config {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
    }

    #[test]
    fn test_hash_is_salted() {
        let svc = fast_service();
        let h1 = svc.hash("password123").unwrap();
        let h2 = svc.hash("password123").unwrap();
        assert_ne!(h1, h2);
        assert!(svc.verify("password123", &h1));
        assert!(svc.verify("password123", &h2));
    }

    #[test]
    fn test_verify_rejects_wrong_password() {
        let svc = fast_service();
        let hash = svc.hash("correct horse").unwrap();
        assert!(!svc.verify("wrong horse", &hash));
    }

    #[test]
    fn test_malformed_hash_verifies_false() {
        let svc = fast_service();
        assert!(!svc.verify("anything", "not-a-phc-string"));
        assert!(!svc.verify("anything", ""));
    }

    #[tokio::test]
    async fn test_async_wrappers() {
        let svc = fast_service();
        let hash = svc.hash_async("password123".to_string()).await.unwrap();
        assert!(svc
            .verify_async("password123".to_string(), hash.clone())
            .await
            .unwrap());
        assert!(!svc
            .verify_async("other".to_string(), hash)
            .await
            .unwrap());
    }
}
