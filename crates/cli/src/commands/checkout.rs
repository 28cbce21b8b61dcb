//! Checkout with a terminal stand-in for the payment widget.
//!
//! The widget shows the provider order and reads the payment id and
//! signature the provider issued back from stdin.

use akario_storefront::Storefront;
use akario_storefront::api::types::PaymentConfirmation;
use akario_storefront::checkout::{PaymentWidget, WidgetRequest};
use clap::Args;

use super::{CliError, read_line};
use crate::output;

#[derive(Args)]
pub struct CheckoutArgs {
    /// Defaults to the account name
    #[arg(long)]
    name: Option<String>,
    /// Defaults to the account email
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: String,
    #[arg(long)]
    address: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    zip: String,
}

/// Payment widget that talks to the person at the terminal.
pub struct TerminalWidget;

impl PaymentWidget for TerminalWidget {
    async fn collect(&self, request: &WidgetRequest) -> Result<PaymentConfirmation, String> {
        output::widget(request);
        let payment_id = read_line("razorpay_payment_id")
            .await
            .map_err(|e| e.to_string())?;
        let signature = read_line("razorpay_signature")
            .await
            .map_err(|e| e.to_string())?;
        Ok(PaymentConfirmation {
            razorpay_order_id: request.order.id.to_string(),
            razorpay_payment_id: payment_id,
            razorpay_signature: signature,
        })
    }
}

pub async fn run(storefront: &Storefront, args: CheckoutArgs) -> Result<(), CliError> {
    let checkout = storefront.checkout(TerminalWidget);

    let mut details = checkout.prefilled_details();
    if let Some(name) = args.name {
        details.full_name = name;
    }
    if let Some(email) = args.email {
        details.email = email;
    }
    details.phone = args.phone;
    details.address = args.address;
    details.city = args.city;
    details.state = args.state;
    details.zip_code = args.zip;

    output::cart(&storefront.cart().lines(), storefront.cart().total().amount());
    output::summary(&checkout.summary());

    let placed = checkout.submit(&details).await?;
    output::placed(&placed);
    Ok(())
}
