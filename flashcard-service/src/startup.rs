//! Application startup and lifecycle management.

use crate::config::{FlashcardConfig, GenerationSettings};
use crate::handlers::{self, generate_flashcards, health_check, method_not_allowed, preflight};
use crate::services::extractor::{extractor_for, StructuredExtractor};
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::TextProvider;
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{cors_headers_middleware, make_request_span, request_id_middleware};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::trace::TraceLayer;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider credential is configured.
    pub text_provider: Option<Arc<dyn TextProvider>>,
    pub extractor: Arc<dyn StructuredExtractor>,
    pub generation: GenerationSettings,
}

impl AppState {
    pub fn new(
        text_provider: Option<Arc<dyn TextProvider>>,
        extractor: Arc<dyn StructuredExtractor>,
        generation: GenerationSettings,
    ) -> Self {
        Self {
            text_provider,
            extractor,
            generation,
        }
    }

    /// Wire the Gemini provider and configured extractor.
    pub fn from_config(config: &FlashcardConfig) -> Result<Self, AppError> {
        let text_provider = match GeminiConfig::from_settings(&config.gemini) {
            Some(gemini_config) => {
                let provider = GeminiTextProvider::new(gemini_config)
                    .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
                tracing::info!(model = %config.gemini.model, "Initialized Gemini text provider");
                Some(Arc::new(provider) as Arc<dyn TextProvider>)
            }
            None => {
                tracing::warn!("No Gemini API key configured; serving without a provider");
                None
            }
        };

        Ok(Self::new(
            text_provider,
            extractor_for(config.generation.extractor),
            config.generation.clone(),
        ))
    }
}

pub fn build_router(state: AppState) -> Router {
    let generate_routes = Router::new()
        .route(
            "/api/generate",
            post(generate_flashcards)
                .options(preflight)
                .fallback(method_not_allowed),
        )
        // The handler enforces its own configurable limit.
        .layer(DefaultBodyLimit::disable())
        .layer(from_fn(cors_headers_middleware));

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(generate_routes)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: FlashcardConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config)?;
        Self::with_state(config.common.port, state).await
    }

    /// Bind a listener for an already assembled state (port 0 = random port).
    pub async fn with_state(port: u16, state: AppState) -> Result<Self, AppError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Flashcard service: HTTP on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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

    tracing::info!("Shutdown signal received");
}
