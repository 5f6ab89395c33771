//! Payment command handlers.

use anyhow::Result;
use comfy_table::{ContentArrangement, Table};
use karigar_core::api::ApiClient;
use karigar_core::api::payments::{Payment, PaymentLookup, PaymentMethod};

use super::{describe, parse_uuid, short_id};

pub async fn create(client: &ApiClient, booking: &str, method: &str) -> Result<()> {
    let booking_id = parse_uuid(booking, "booking")?;
    let method: PaymentMethod = method.parse()?;

    let intent = client
        .create_payment(booking_id, method)
        .await
        .map_err(describe)?;

    println!("Payment {} created for {:.2}", intent.payment_id, intent.amount);
    println!("Confirm with: karigar payments confirm {}", intent.payment_id);
    Ok(())
}

pub async fn confirm(client: &ApiClient, id: &str) -> Result<()> {
    let payment_id = parse_uuid(id, "payment")?;
    let confirmation = client.confirm_payment(payment_id).await.map_err(describe)?;

    let payment = &confirmation.payment;
    println!("{}", confirmation.message);
    println!(
        "Paid {} via {} ({})",
        payment.amount,
        payment.payment_method_display,
        payment.transaction_id.as_deref().unwrap_or("no transaction id")
    );
    Ok(())
}

pub async fn list(client: &ApiClient) -> Result<()> {
    let payments = client.my_payments().await.map_err(describe)?;

    if payments.is_empty() {
        println!("No payments found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Payment", "Booking", "Method", "Status", "Amount", "Date"]);
    for payment in &payments {
        table.add_row(vec![
            short_id(&payment.payment_id),
            payment.booking.to_string(),
            payment.payment_method_display.clone(),
            payment.payment_status_display.clone(),
            payment.amount.clone(),
            payment.payment_date.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn status(client: &ApiClient, id: &str) -> Result<()> {
    let booking_id = parse_uuid(id, "booking")?;
    match client.payment_status(booking_id).await.map_err(describe)? {
        PaymentLookup::Found(payment) => print_detail(&payment),
        PaymentLookup::Missing { message, .. } => println!("{message}"),
    }
    Ok(())
}

fn print_detail(payment: &Payment) {
    println!("Payment {}", payment.payment_id);
    println!("Booking:  #{}", payment.booking);
    println!("Method:   {}", payment.payment_method_display);
    println!("Status:   {}", payment.payment_status_display);
    println!("Amount:   {}", payment.amount);
    if let Some(transaction_id) = &payment.transaction_id {
        println!("Txn:      {transaction_id}");
    }
    if let Some(processed_at) = &payment.processed_at {
        println!("Settled:  {processed_at}");
    }
}
