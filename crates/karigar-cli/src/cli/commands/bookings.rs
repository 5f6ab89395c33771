//! Booking command handlers.

use anyhow::{Context, Result};
use comfy_table::{ContentArrangement, Table};
use karigar_core::api::ApiClient;
use karigar_core::api::bookings::{Booking, BookingCreate, BookingFilter, BookingStatus};

use super::{describe, parse_uuid, short_id};

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Service id to book
    #[arg(long)]
    pub service: i64,

    /// Service date (YYYY-MM-DD)
    #[arg(long)]
    pub date: String,

    /// Hourly slot between 08:00 and 18:00
    #[arg(long)]
    pub time_slot: String,

    /// Number of hours
    #[arg(long, default_value_t = 1)]
    pub hours: u32,

    /// Service address
    #[arg(long)]
    pub address: String,

    /// Contact number for this booking
    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub instructions: Option<String>,
}

pub async fn create(client: &ApiClient, args: CreateArgs) -> Result<()> {
    // Shape-check locally; the server owns the real availability rules.
    let date = chrono::NaiveDate::parse_from_str(&args.date, "%Y-%m-%d")
        .context("booking date must be YYYY-MM-DD")?;
    let slot = chrono::NaiveTime::parse_from_str(&args.time_slot, "%H:%M")
        .context("time slot must be HH:MM")?;

    let request = BookingCreate {
        service: args.service,
        booking_date: date.format("%Y-%m-%d").to_string(),
        time_slot: slot.format("%H:%M").to_string(),
        hours_requested: args.hours,
        special_instructions: args.instructions,
        customer_address: args.address,
        customer_phone: args.phone,
    };
    let booking = client.create_booking(&request).await.map_err(describe)?;

    println!(
        "Booked '{}' on {} at {} for {} hour(s)",
        booking.service_details.name,
        booking.booking_date,
        booking.time_slot_display,
        booking.hours_requested
    );
    println!("Booking id: {}", booking.booking_id);
    println!("Total:      {}", booking.total_amount);
    Ok(())
}

pub async fn list(client: &ApiClient, status: Option<&str>) -> Result<()> {
    let filter = BookingFilter {
        status: status.map(str::parse).transpose()?,
        ordering: None,
    };
    let bookings = client.my_bookings(&filter).await.map_err(describe)?;

    if bookings.is_empty() {
        println!("No bookings found.");
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID", "Booking", "Service", "Date", "Slot", "Hours", "Status", "Amount",
        ]);
    for booking in &bookings {
        table.add_row(vec![
            booking.id.to_string(),
            short_id(&booking.booking_id),
            booking.service_details.name.clone(),
            booking.booking_date.clone(),
            booking.time_slot.clone(),
            booking.hours_requested.to_string(),
            booking.status_display.clone(),
            booking.total_amount.clone(),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub async fn show(client: &ApiClient, id: &str) -> Result<()> {
    let booking_id = parse_uuid(id, "booking")?;
    let booking = client.booking(booking_id).await.map_err(describe)?;
    print_detail(&booking);
    Ok(())
}

pub async fn set_status(client: &ApiClient, id: i64, status: &str) -> Result<()> {
    let status: BookingStatus = status.parse()?;
    let update = client
        .set_booking_status(id, status)
        .await
        .map_err(describe)?;
    println!(
        "Booking {} is now {}",
        short_id(&update.booking.booking_id),
        update.booking.status_display
    );
    Ok(())
}

pub async fn stats(client: &ApiClient) -> Result<()> {
    let stats = client.booking_stats().await.map_err(describe)?;
    println!("Total:      {}", stats.total_bookings);
    println!("Completed:  {}", stats.completed_bookings);
    println!("Pending:    {}", stats.pending_bookings);
    println!("Completion: {:.1}%", stats.completion_rate);
    Ok(())
}

fn print_detail(booking: &Booking) {
    println!("Booking {}", booking.booking_id);
    println!("Service:   {}", booking.service_details.name);
    println!(
        "Provider:  {}",
        booking.service_details.provider_details.full_name()
    );
    println!("Customer:  {}", booking.customer_details.full_name());
    println!(
        "When:      {} at {}",
        booking.booking_date, booking.time_slot_display
    );
    println!("Hours:     {}", booking.hours_requested);
    println!("Status:    {}", booking.status_display);
    println!("Amount:    {}", booking.total_amount);
    println!("Address:   {}", booking.customer_address);
    println!("Phone:     {}", booking.customer_phone);
    if let Some(instructions) = &booking.special_instructions {
        println!("Notes:     {instructions}");
    }
    if let Some(rating) = booking.rating {
        println!("Rating:    {rating}/5");
    }
    if let Some(feedback) = &booking.feedback {
        println!("Feedback:  {feedback}");
    }
}
