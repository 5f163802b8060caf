//! Payment verification and manuscript submission-state service for the
//! African Journal of Veterinary Sciences.
//!
//! The core of this crate is [`workflow::PaymentVerificationWorkflow`]:
//! given a gateway transaction reference it confirms the charge with the
//! payment gateway, records the outcome on the payment record, and - when
//! the charge succeeded and the caller owns the payment - advances the
//! owning manuscript from `draft` to `submitted` exactly once. The
//! draft-to-submitted transition is an atomic conditional write at the
//! storage layer, which is the only concurrency control the workflow needs.
//!
//! Around the core: an axum HTTP surface ([`http`]), a Paystack gateway
//! client ([`gateway`]), PostgreSQL and in-memory store backends
//! ([`store`]), bearer-token identity resolution ([`auth`]), and a
//! transactional mailer ([`mailer`]).

pub mod auth;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod http;
pub mod mailer;
pub mod store;
pub mod workflow;

pub use config::ServiceConfig;
pub use error::{Error, Result};
pub use workflow::{PaymentVerificationWorkflow, VerificationOutcome};
