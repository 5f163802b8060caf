//! Request handlers.

use crate::error::Error;
use crate::http::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Body of a `POST /verify-payment` request.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Gateway transaction reference.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Body of a successful verification response.
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// Transaction status as the gateway reported it.
    pub status: &'static str,
    /// Amount in major currency units.
    pub amount: f64,
    /// ISO currency code.
    pub currency: String,
    /// When the gateway recorded the payment.
    pub paid_at: Option<DateTime<Utc>>,
    /// Human-readable outcome.
    pub message: &'static str,
}

/// Extract the bearer token from the Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    Some(value.strip_prefix("Bearer ").unwrap_or(value))
}

/// Unwrap a JSON body, keeping parser detail out of the response.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    match body {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => {
            debug!("Rejected request body: {rejection}");
            Err(Error::MalformedBody)
        }
    }
}

/// `POST /verify-payment`
pub async fn verify_payment(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<VerifyRequest>, JsonRejection>,
) -> Result<Json<VerifyResponse>, ApiError> {
    let body = json_body(body)?;
    let outcome = state
        .workflow
        .verify_payment(bearer_token(&headers), body.reference.as_deref())
        .await?;

    Ok(Json(VerifyResponse {
        status: outcome.status.as_str(),
        amount: outcome.amount,
        currency: outcome.currency,
        paid_at: outcome.paid_at,
        message: outcome.message,
    }))
}

/// Body of a `POST /send-bulk-email` request.
#[derive(Debug, Deserialize)]
pub struct BulkEmailRequest {
    /// Email subject.
    pub subject: String,
    /// Plain-text message body; line breaks become `<br>`.
    pub message: String,
    /// Recipient addresses.
    pub emails: Vec<String>,
}

/// Body of a mail dispatch response.
#[derive(Debug, Serialize)]
pub struct MailResponse {
    /// Whether the dispatch was accepted.
    pub success: bool,
    /// Human-readable summary.
    pub message: String,
}

/// `POST /send-bulk-email`
pub async fn send_bulk_email(
    State(state): State<AppState>,
    body: Result<Json<BulkEmailRequest>, JsonRejection>,
) -> Result<Json<MailResponse>, ApiError> {
    let body = json_body(body)?;
    let recipients = body.emails.len();
    state
        .mailer
        .send_bulk(&body.subject, &body.message, &body.emails)
        .await?;

    Ok(Json(MailResponse {
        success: true,
        message: format!("Email queued for {recipients} recipient(s)"),
    }))
}

/// Body of a `POST /send-reviewer-reminder` request.
#[derive(Debug, Deserialize)]
pub struct ReminderRequest {
    /// Identifier of the pending review.
    #[serde(rename = "reviewId")]
    pub review_id: String,
    /// Reviewer's email address.
    #[serde(rename = "reviewerEmail")]
    pub reviewer_email: String,
    /// Title of the manuscript awaiting review.
    #[serde(rename = "manuscriptTitle")]
    pub manuscript_title: String,
}

/// `POST /send-reviewer-reminder`
pub async fn send_reviewer_reminder(
    State(state): State<AppState>,
    body: Result<Json<ReminderRequest>, JsonRejection>,
) -> Result<Json<MailResponse>, ApiError> {
    let body = json_body(body)?;
    state
        .mailer
        .send_reviewer_reminder(&body.review_id, &body.reviewer_email, &body.manuscript_title)
        .await?;

    Ok(Json(MailResponse {
        success: true,
        message: "Reminder sent".to_string(),
    }))
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_strips_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer tok_abc"));
        assert_eq!(bearer_token(&headers), Some("tok_abc"));
    }

    #[test]
    fn test_bearer_token_accepts_raw_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("tok_abc"));
        assert_eq!(bearer_token(&headers), Some("tok_abc"));
    }

    #[test]
    fn test_bearer_token_absent() {
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
