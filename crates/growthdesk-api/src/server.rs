use crate::{create_router, AppState};
use anyhow::{Context, Result};
use growthdesk_core::Settings;
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

pub struct Server {
    state: AppState,
    host: String,
    port: u16,
}

impl Server {
    pub fn new(settings: Settings) -> Result<Self> {
        let host = settings.server.host.clone();
        let port = settings.server.port;
        let state = AppState::new(settings).context("building API clients")?;
        Ok(Self { state, host, port })
    }

    pub fn with_state(state: AppState, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    /// `host` may be an IP literal or a resolvable hostname.
    pub async fn bind(&self) -> Result<TcpListener> {
        TcpListener::bind((self.host.as_str(), self.port))
            .await
            .with_context(|| format!("binding {}:{}", self.host, self.port))
    }

    pub async fn run(self) -> Result<()> {
        if !self.state.email.is_configured() {
            warn!("Email delivery is not configured; reports and notifications will not be sent");
        }
        if !self.state.crm.is_configured() {
            warn!("CRM is not configured; leads will not be submitted");
        }
        if !self.state.payments.is_configured() {
            warn!("Payment processor is not configured; payment endpoints will fail");
        }

        info!("Starting GrowthDesk API server on {}:{}", self.host, self.port);
        let listener = self.bind().await?;
        let addr = listener.local_addr().context("reading bound address")?;
        let router = create_router(self.state);

        info!("Server listening on http://{}", addr);
        info!("API endpoints:");
        info!("  GET  /health - Health check");
        info!("  POST /api/roi-calculator - Project ROI and capture lead");
        info!("  POST /api/test-email - Send a test email");
        info!("  POST /api/create-payment-intent - Start a plan payment");
        info!("  POST /api/confirm-payment - Confirm a setup-fee payment");
        info!("  POST /api/webhook - Payment processor webhook");
        info!("  POST /api/create-checkout-session - Embedded checkout");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("serving HTTP")?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }
}
