use crate::{handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Lead capture
        .route("/api/roi-calculator", post(handlers::roi_calculator))
        .route("/api/test-email", post(handlers::test_email))
        // Payments
        .route(
            "/api/create-payment-intent",
            post(handlers::create_payment_intent),
        )
        .route("/api/confirm-payment", post(handlers::confirm_payment))
        .route("/api/webhook", post(handlers::payment_webhook))
        .route(
            "/api/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .with_state(state)
        // The calculator form posts cross-origin from the marketing site
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
}
