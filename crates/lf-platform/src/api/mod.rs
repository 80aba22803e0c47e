//! API Layer
//!
//! REST endpoints and the access-control pipeline middleware.

pub mod auth;
pub mod common;
pub mod middleware;
pub mod openapi;
pub mod users;

pub use common::*;
pub use middleware::{with_role_requirement, AppState, AuthLayer, Authenticated};

pub use auth::{auth_router, AuthState};
pub use openapi::PlatformApiDoc;
pub use users::{users_router, UsersState};
