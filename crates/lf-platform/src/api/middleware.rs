//! API Middleware
//!
//! The access-control pipeline for Axum: bearer extraction, access-token
//! verification, live account-status lookup, and per-route role
//! requirements. Rejections surface as `ApiError` JSON; token contents are
//! never logged.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::{FromRequestParts, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower::{Layer, Service};

use crate::domain::{Principal, RoleRequirement};
use crate::error::{PlatformError, Result};
use crate::service::auth::{extract_bearer_token, AuthService};
use crate::service::account;
use crate::store::UserStore;

/// Application state shared with the pipeline via request extensions.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_store: Arc<dyn UserStore>,
}

/// Layer that makes [`AppState`] available to every request.
#[derive(Clone)]
pub struct AuthLayer {
    state: AppState,
}

impl AuthLayer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthStateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthStateService {
            inner,
            state: self.state.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AuthStateService<S> {
    inner: S,
    state: AppState,
}

impl<S, B> Service<axum::http::Request<B>> for AuthStateService<S>
where
    S: Service<axum::http::Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(self.state.clone());
        self.inner.call(req)
    }
}

/// Run the pipeline up to (and including) the status check.
///
/// 1. `Authorization` must be exactly `Bearer <token>`
/// 2. The token must verify as an access token (all cryptographic failure
///    modes collapse to `InvalidToken`)
/// 3. The user must resolve by the claims' email
/// 4. The account must be `ACTIVE`
///
/// The principal's role comes from the verified claims, not a fresh store
/// read; a role change only takes effect at the next refresh (see
/// DESIGN.md), while a status change takes effect here, on the next
/// request.
pub(crate) async fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<Principal> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(PlatformError::MissingToken)?;
    let token = extract_bearer_token(header).ok_or(PlatformError::MissingToken)?;

    let claims = state.auth_service.verify_access(token)?;

    let user = state
        .user_store
        .find_by_email(&claims.email)
        .await?
        .ok_or(PlatformError::UserNotFound)?;
    account::ensure_active(&user)?;

    Ok(Principal {
        id: claims.sub,
        email: claims.email,
        role: claims.role,
    })
}

/// Extractor for authenticated requests.
pub struct Authenticated(pub Principal);

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        // A role guard earlier in the stack may already have resolved the
        // principal for this request.
        if let Some(principal) = parts.extensions.get::<Principal>() {
            return Ok(Authenticated(principal.clone()));
        }

        let state = parts
            .extensions
            .get::<AppState>()
            .cloned()
            .ok_or_else(|| PlatformError::internal("AppState not found").into_response())?;

        let principal = authenticate(&parts.headers, &state)
            .await
            .map_err(|e| e.into_response())?;

        Ok(Authenticated(principal))
    }
}

/// Attach a role requirement to every route of the router.
///
/// The requirement is assembled once here, at registration time, and never
/// mutated afterwards. The guard authenticates, applies the single pure
/// role check, and stores the principal in request extensions so handlers
/// do not re-run the pipeline.
pub fn with_role_requirement(router: Router, requirement: RoleRequirement) -> Router {
    router.route_layer(from_fn(move |req: Request, next: Next| {
        let requirement = requirement.clone();
        async move { enforce_requirement(requirement, req, next).await }
    }))
}

async fn enforce_requirement(
    requirement: RoleRequirement,
    mut req: Request,
    next: Next,
) -> std::result::Result<Response, PlatformError> {
    let state = req
        .extensions()
        .get::<AppState>()
        .cloned()
        .ok_or_else(|| PlatformError::internal("AppState not found"))?;

    let principal = authenticate(req.headers(), &state).await?;

    if !requirement.allows(principal.role) {
        let allowed: Vec<&str> = requirement.roles().iter().map(|r| r.as_str()).collect();
        return Err(PlatformError::forbidden(format!(
            "Requires one of: {}",
            allowed.join(", ")
        )));
    }

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}
