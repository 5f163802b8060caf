//! HTTP surface of the service.
//!
//! Routes, shared state, CORS, and the mapping from [`crate::Error`] to
//! the wire response table. Handlers live in [`handlers`].

mod handlers;

use crate::error::Error;
use crate::mailer::Mailer;
use crate::workflow::PaymentVerificationWorkflow;
use axum::http::{header, HeaderName, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared state for request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The verification workflow.
    pub workflow: Arc<PaymentVerificationWorkflow>,
    /// The transactional mailer.
    pub mailer: Arc<Mailer>,
}

/// Build the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    Router::new()
        .route("/verify-payment", post(handlers::verify_payment))
        .route("/send-bulk-email", post(handlers::send_bulk_email))
        .route(
            "/send-reviewer-reminder",
            post(handlers::send_reviewer_reminder),
        )
        .route("/healthz", get(handlers::healthz))
        .layer(cors)
        .with_state(state)
}

/// Serve the router until ctrl-c.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> crate::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received, shutting down"),
        Err(e) => error!("Failed to listen for shutdown signal: {e}"),
    }
}

/// JSON error body: `{ "error": ..., "code": ... }` with the code omitted
/// where clients have nothing to branch on.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

/// Wrapper mapping workflow errors onto HTTP responses.
pub(crate) struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::MissingCredential | Error::InvalidCredential => StatusCode::UNAUTHORIZED,
            Error::MissingReference | Error::MalformedBody | Error::GatewayVerification => {
                StatusCode::BAD_REQUEST
            }
            Error::OwnershipMismatch => StatusCode::FORBIDDEN,
            Error::PaymentNotFound => StatusCode::NOT_FOUND,
            Error::Storage(_) | Error::Mail(_) | Error::Config(_) | Error::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Internal failures keep their detail in the logs, not the body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            match &self.0 {
                Error::Storage(detail) => {
                    error!("Storage failure: {detail}");
                    "Failed to update payment record".to_string()
                }
                Error::Mail(detail) => {
                    error!("Mail failure: {detail}");
                    "Failed to send email".to_string()
                }
                other => {
                    error!("Unexpected error: {other}");
                    "Internal server error".to_string()
                }
            }
        } else {
            self.0.to_string()
        };

        (
            status,
            Json(ErrorBody {
                error: message,
                code: self.0.code(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;

    fn status_of(err: Error) -> StatusCode {
        ApiError(err).into_response().status()
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(status_of(Error::MissingCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Error::InvalidCredential), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Error::MissingReference), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(Error::MalformedBody), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(Error::GatewayVerification),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::OwnershipMismatch), StatusCode::FORBIDDEN);
        assert_eq!(status_of(Error::PaymentNotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::Storage("boom".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
