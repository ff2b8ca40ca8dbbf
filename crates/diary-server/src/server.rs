use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use diary_security::{Redactor, TokenSigner};
use diary_storage::Storage;

use crate::error::ApiError;
use crate::{auth, diaries};

/// Shared handler state. Cloning is cheap.
#[derive(Clone, Debug)]
pub struct AppState {
    pub storage: Storage,
    pub tokens: Arc<TokenSigner>,
    pub redactor: Arc<Redactor>,
}

impl AppState {
    pub fn new(storage: Storage, tokens: TokenSigner, redactor: Redactor) -> Self {
        Self {
            storage,
            tokens: Arc::new(tokens),
            redactor: Arc::new(redactor),
        }
    }
}

pub struct DiaryServer {
    state: AppState,
    cors: CorsLayer,
}

impl DiaryServer {
    /// A server allowing any CORS origin
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            cors: CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        }
    }

    /// Restrict CORS to `origins`; an empty list keeps any origin allowed
    pub fn with_cors_origins(mut self, origins: &[String]) -> anyhow::Result<Self> {
        if origins.is_empty() {
            return Ok(self);
        }

        let origins = origins
            .iter()
            .map(|o| HeaderValue::from_str(o))
            .collect::<Result<Vec<_>, _>>()?;
        self.cors = CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any);
        Ok(self)
    }

    pub fn router(&self) -> Router {
        let diaries = Router::new()
            .route("/", get(diaries::list_own).post(diaries::create))
            .route("/public", get(diaries::list_public))
            .route("/search", get(diaries::search))
            .route("/contributions", get(diaries::contributions))
            .route("/share/:id", get(diaries::get_shared))
            .route(
                "/:id",
                get(diaries::get)
                    .put(diaries::update)
                    .delete(diaries::delete),
            );

        let auth = Router::new()
            .route("/register", post(auth::register))
            .route("/login", post(auth::login))
            .route("/me", get(auth::me));

        Router::new()
            .route("/_status/health", get(health))
            .nest("/api/auth", auth)
            .nest("/api/diaries", diaries)
            .fallback(not_found)
            .layer(self.cors.clone())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve until Ctrl+C or SIGTERM, then close the database pool
    pub async fn serve(self, host: &str, port: u16) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr).await?;

        info!("kokodiary server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.state.storage.close().await;
        info!("server stopped");

        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("received Ctrl+C, shutting down"),
            Err(e) => {
                warn!("failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// GET /_status/health - Liveness check
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route not found".to_string())
}
