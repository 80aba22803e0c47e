//! LearnForge Platform Server
//!
//! Production server for the identity and access-control APIs:
//! - Auth APIs: register, login, refresh, forgot/change password, me
//! - Admin APIs: user administration (status, role)
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `LF_API_PORT` | `8080` | HTTP API port |
//! | `LF_ACCESS_TOKEN_SECRET` | - | Access token signing secret (required) |
//! | `LF_REFRESH_TOKEN_SECRET` | - | Refresh token signing secret (required) |
//! | `LF_RESET_TOKEN_SECRET` | access secret | Reset token signing secret |
//! | `LF_ACCESS_TOKEN_TTL_SECS` | `3600` | Access token lifetime |
//! | `LF_REFRESH_TOKEN_TTL_SECS` | `2592000` | Refresh token lifetime |
//! | `LF_RESET_TOKEN_TTL_SECS` | `600` | Reset token lifetime |
//! | `LF_RESET_BASE_URL` | `http://localhost:3000` | Frontend reset form base URL |
//! | `LF_DEV_MODE` | `false` | Seed development accounts |
//! | `LF_DEV_PASSWORD` | `password123` | Password for seeded accounts |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, response::Json, Router};
use tokio::{net::TcpListener, signal};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use lf_platform::api::{
    auth_router, users_router, AppState, AuthLayer, AuthState, PlatformApiDoc, UsersState,
};
use lf_platform::domain::{RoleRequirement, User, UserRole};
use lf_platform::service::{
    AuthConfig, AuthService, PasswordResetService, PasswordService, TracingMailer,
};
use lf_platform::store::{InMemoryUserStore, UserStore};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn required_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{} must be set", key))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting LearnForge Platform Server");

    // Configuration from environment; signing secrets are required and are
    // never logged.
    let api_port: u16 = env_or_parse("LF_API_PORT", 8080);
    let access_secret = required_env("LF_ACCESS_TOKEN_SECRET")?;
    let refresh_secret = required_env("LF_REFRESH_TOKEN_SECRET")?;
    let reset_base_url = env_or("LF_RESET_BASE_URL", "http://localhost:3000");

    let mut auth_config = AuthConfig::new(access_secret, refresh_secret);
    auth_config.access_token_ttl_secs = env_or_parse("LF_ACCESS_TOKEN_TTL_SECS", 3600);
    auth_config.refresh_token_ttl_secs = env_or_parse("LF_REFRESH_TOKEN_TTL_SECS", 86400 * 30);
    auth_config.reset_token_ttl_secs = env_or_parse("LF_RESET_TOKEN_TTL_SECS", 600);
    if let Ok(reset_secret) = std::env::var("LF_RESET_TOKEN_SECRET") {
        auth_config = auth_config.with_reset_secret(reset_secret);
    }

    // Initialize store and services
    let user_store: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let auth_service = Arc::new(AuthService::new(auth_config));
    let password_service = Arc::new(PasswordService::default());
    let mailer = Arc::new(TracingMailer::new());
    let reset_service = Arc::new(PasswordResetService::new(
        auth_service.clone(),
        user_store.clone(),
        mailer,
        reset_base_url,
    ));
    info!("Auth services initialized");

    // Seed development accounts if in dev mode
    let dev_mode = std::env::var("LF_DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if dev_mode {
        seed_dev_users(user_store.as_ref(), &password_service).await?;
    }

    // Create AppState for the access-control pipeline
    let app_state = AppState {
        auth_service: auth_service.clone(),
        user_store: user_store.clone(),
    };

    // Build API states
    let auth_state = AuthState::new(
        auth_service,
        user_store.clone(),
        password_service,
        reset_service,
    );
    let users_state = UsersState { user_store };

    // Build platform API router; the admin router carries its role
    // requirement, attached at registration.
    let app = Router::new()
        .nest("/auth", auth_router(auth_state))
        .nest(
            "/api/admin/users",
            users_router(
                users_state,
                RoleRequirement::of([UserRole::Admin, UserRole::SuperAdmin]),
            ),
        )
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        // OpenAPI / Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", PlatformApiDoc::openapi()))
        // Auth middleware
        .layer(AuthLayer::new(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;

    info!("LearnForge Platform Server started");
    info!("Press Ctrl+C to shutdown");

    axum::serve(api_listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("LearnForge Platform Server shutdown complete");
    Ok(())
}

/// Seed one account per role for local development.
async fn seed_dev_users(store: &dyn UserStore, passwords: &PasswordService) -> Result<()> {
    let password = env_or("LF_DEV_PASSWORD", "password123");
    let hash = passwords.hash_async(password).await?;

    let accounts = [
        ("student@learnforge.dev", "Dev Student", UserRole::Student),
        (
            "instructor@learnforge.dev",
            "Dev Instructor",
            UserRole::Instructor,
        ),
        ("admin@learnforge.dev", "Dev Admin", UserRole::Admin),
    ];

    for (email, name, role) in accounts {
        let user = User::new(email, hash.clone(), name).with_role(role);
        match store.insert(&user).await {
            Ok(()) => info!(email = %email, role = %role.as_str(), "seeded dev account"),
            Err(e) => tracing::warn!("Dev data seeding skipped for {}: {}", email, e),
        }
    }
    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn ready_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "READY"
    }))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
