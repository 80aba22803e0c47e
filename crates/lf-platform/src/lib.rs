//! LearnForge Platform
//!
//! Identity and access-control core for the LearnForge learning platform:
//! - Credential storage (argon2 password hashing)
//! - Stateless token issuance and verification (access, refresh, reset)
//! - Account lifecycle enforcement (active/blocked/deleted)
//! - Role-based authorization with per-route role requirements
//! - Password reset orchestration over pluggable mail delivery

pub mod api;
pub mod domain;
pub mod error;
pub mod service;
pub mod store;

pub use domain::*;
pub use error::PlatformError;
