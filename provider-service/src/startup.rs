//! Application startup and lifecycle management.

use crate::config::ProviderServiceConfig;
use crate::handlers::{health_check, metrics_endpoint, resolve_providers};
use crate::models::Channel;
use crate::services::{ConfiguredDefaultProviders, ProviderResolver, StaticPolicyMatcher};
use axum::{
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ProviderServiceConfig,
    pub resolver: ProviderResolver,
}

impl AppState {
    /// Wire the resolver to the configured policies and defaults.
    pub fn from_config(config: ProviderServiceConfig) -> Self {
        let matcher = StaticPolicyMatcher::new(config.policies.clone());
        let defaults = ConfiguredDefaultProviders::from_config(&config.default_providers);

        let configured = defaults.configured_channels();
        for channel in Channel::ALL {
            if !configured.contains(&channel) {
                tracing::warn!(
                    channel = %channel,
                    "No default provider configured; resolution fails unless a policy names one"
                );
            }
        }
        tracing::info!(
            policies = matcher.policies().len(),
            defaults = ?configured,
            "Provider resolver configured"
        );

        Self {
            config,
            resolver: ProviderResolver::new(Arc::new(matcher), Arc::new(defaults)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_endpoint))
        .route("/providers/resolve", post(resolve_providers))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Application wrapper for lifecycle management.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application. Port 0 binds a random port.
    pub async fn build(config: ProviderServiceConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(config.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Provider service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run until `shutdown` completes, then drain in-flight requests.
    pub async fn run_until<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}
