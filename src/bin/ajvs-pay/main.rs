//! ajvs-pay service entry point.

mod cli;

use ajvs_pay::auth::HttpIdentityProvider;
use ajvs_pay::event::{create_event_channel, ServiceEvent};
use ajvs_pay::gateway::PaystackClient;
use ajvs_pay::http::{serve, AppState};
use ajvs_pay::mailer::Mailer;
use ajvs_pay::store::PgStore;
use ajvs_pay::PaymentVerificationWorkflow;
use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("ajvs-pay v{}", env!("CARGO_PKG_VERSION"));

    // Build configuration
    let config = cli.into_config()?;

    // Wire up collaborators; everything the workflow touches is injected here.
    let (events, mut events_rx) = create_event_channel();

    let store = Arc::new(PgStore::connect(&config.database).await?);
    let gateway = Arc::new(PaystackClient::new(config.gateway.clone())?);
    let identity = Arc::new(HttpIdentityProvider::new(config.auth.clone())?);
    let mailer = Arc::new(Mailer::new(config.mailer.clone(), events.clone())?);

    let workflow = Arc::new(PaymentVerificationWorkflow::new(
        identity,
        gateway,
        store,
        events,
    ));

    // Surface operational alerts from the event bus.
    tokio::spawn(async move {
        while let Ok(event) = events_rx.recv().await {
            if let ServiceEvent::PaymentRecordMissing { reference } = event {
                warn!("Operational alert: confirmed payment {reference} has no payment record");
            }
        }
    });

    serve(AppState { workflow, mailer }, config.listen_addr).await?;

    info!("Goodbye!");
    Ok(())
}
