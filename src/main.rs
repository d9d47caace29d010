//! Demo: one live session, two captures merged, a checkout filled in and confirmed.

use chrono::{Duration, Local};
use live_checkout::checkout::CheckoutEdit;
use live_checkout::config::CheckoutConfig;
use live_checkout::lifecycle::{setup_tracing, CheckoutSystem};
use live_checkout::model::{DeliveryMode, PaymentMethod, SessionKind};
use live_checkout::reconciler::{CaptureIdentity, FixedDecision, LineDraft, MergeDecision};
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    let config = CheckoutConfig::from_env().map_err(|e| e.to_string())?;
    setup_tracing(&config.log_filter);

    info!("Starting live checkout demo");
    let system = CheckoutSystem::with_config(config);

    let session = system
        .sessions
        .open_session(SessionKind::Live, None)
        .await
        .map_err(|e| e.to_string())?;
    info!(name = %session.name, "Session open");

    let reconciler = system.reconciler(FixedDecision(MergeDecision::Merge));
    let amy = CaptureIdentity::Alias("@amy".to_string());

    let span = tracing::info_span!("live_capture");
    let captured = async {
        reconciler
            .capture_line(
                &session.capture(),
                &amy,
                &LineDraft::new("JP1", "Red dress", 15000.0, 1),
            )
            .await?;
        reconciler
            .capture_line(
                &session.capture(),
                &amy,
                &LineDraft::new("JP1", "Red dress", 15000.0, 2),
            )
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;
    info!(
        order = %captured.order_number,
        quantity = captured.line.quantity,
        total = captured.line.line_total,
        "Lines merged"
    );

    let form = system.checkout_form(captured.order_id);
    let checkout = system.checkout();
    checkout
        .load_checkout_context(captured.order_id)
        .await
        .map_err(|e| e.to_string())?;

    for edit in [
        CheckoutEdit::RealName("Amy Rasoa".to_string()),
        CheckoutEdit::Phone("034 12 345 67".to_string()),
        CheckoutEdit::Address("Lot II A 12, Antananarivo".to_string()),
        CheckoutEdit::DeliveryMode(Some(DeliveryMode::CarrierDelivery)),
        CheckoutEdit::DeliveryDate(Some((Local::now() + Duration::days(1)).date_naive())),
        CheckoutEdit::PaymentMethod(Some(PaymentMethod::Cash)),
    ] {
        form.edit(edit);
    }

    match form.finalize().await {
        Ok(order) => info!(number = %order.number, status = %order.status, "Checkout confirmed"),
        Err(e) => error!(kind = %e.kind(), error = %e, "Checkout refused"),
    }

    let feed = system.orders.confirmed_feed().await.map_err(|e| e.to_string())?;
    info!(confirmed = feed.len(), "Preparation feed");

    drop(form);
    drop(checkout);
    drop(reconciler);
    system.shutdown().await?;

    info!("Demo completed");
    Ok(())
}
