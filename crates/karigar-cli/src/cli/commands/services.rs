//! Service command handlers.

use anyhow::Result;
use comfy_table::{ContentArrangement, Table};
use karigar_core::api::ApiClient;
use karigar_core::api::services::{Service, ServiceCreate, ServiceFilter};

use super::describe;

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Free-text search over name, description, category and area
    #[arg(long)]
    pub search: Option<String>,

    /// Filter by category (see `karigar services categories`)
    #[arg(long)]
    pub category: Option<String>,

    /// Minimum hourly price
    #[arg(long)]
    pub min_price: Option<String>,

    /// Maximum hourly price
    #[arg(long)]
    pub max_price: Option<String>,

    /// Ordering field, e.g. "price_per_hour" or "-rating"
    #[arg(long)]
    pub ordering: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub description: String,

    #[arg(long)]
    pub category: String,

    /// Hourly price, e.g. "450.00"
    #[arg(long)]
    pub price_per_hour: String,

    #[arg(long, default_value_t = 1)]
    pub minimum_hours: u32,

    #[arg(long, default_value_t = 8)]
    pub maximum_hours: u32,

    #[arg(long)]
    pub service_area: Option<String>,
}

pub async fn list(client: &ApiClient, args: ListArgs) -> Result<()> {
    let filter = ServiceFilter {
        search: args.search,
        category: args.category,
        min_price: args.min_price,
        max_price: args.max_price,
        ordering: args.ordering,
    };
    let services = client.services(&filter).await.map_err(describe)?;

    if services.is_empty() {
        println!("No services found.");
        return Ok(());
    }
    print_table(&services);
    Ok(())
}

pub async fn show(client: &ApiClient, id: i64) -> Result<()> {
    let service = client.service(id).await.map_err(describe)?;

    println!("{} (#{})", service.name, service.id);
    println!("Category:  {}", service.category_display);
    println!("Provider:  {}", service.provider_details.full_name());
    println!("Price/hr:  {}", service.price_per_hour);
    println!(
        "Hours:     {}-{}",
        service.minimum_hours, service.maximum_hours
    );
    if let Some(area) = &service.service_area {
        println!("Area:      {area}");
    }
    println!(
        "Rating:    {} ({} bookings)",
        service.rating, service.total_bookings
    );
    println!(
        "Available: {}",
        if service.is_available { "yes" } else { "no" }
    );
    println!();
    println!("{}", service.description);
    Ok(())
}

pub async fn create(client: &ApiClient, args: CreateArgs) -> Result<()> {
    let request = ServiceCreate {
        name: args.name,
        description: args.description,
        category: args.category,
        price_per_hour: args.price_per_hour,
        minimum_hours: args.minimum_hours,
        maximum_hours: args.maximum_hours,
        service_area: args.service_area,
        is_available: true,
    };
    let service = client.create_service(&request).await.map_err(describe)?;
    println!("Created service '{}' (#{})", service.name, service.id);
    Ok(())
}

pub async fn mine(client: &ApiClient) -> Result<()> {
    let services = client.my_services().await.map_err(describe)?;
    if services.is_empty() {
        println!("No services yet.");
        return Ok(());
    }
    print_table(&services);
    Ok(())
}

pub async fn categories(client: &ApiClient) -> Result<()> {
    let categories = client.service_categories().await.map_err(describe)?;
    for category in categories {
        println!("{}  {}", category.value, category.label);
    }
    Ok(())
}

pub async fn stats(client: &ApiClient) -> Result<()> {
    let stats = client.service_stats().await.map_err(describe)?;
    println!("Services:  {}", stats.total_services);
    println!("Providers: {}", stats.total_providers);
    println!("Avg price: {:.2}", stats.average_price);
    Ok(())
}

fn print_table(services: &[Service]) {
    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID", "Name", "Category", "Price/hr", "Rating", "Provider", "Available",
        ]);
    for service in services {
        table.add_row(vec![
            service.id.to_string(),
            service.name.clone(),
            service.category_display.clone(),
            service.price_per_hour.clone(),
            service.rating.clone(),
            service.provider_details.full_name(),
            if service.is_available { "yes" } else { "no" }.to_string(),
        ]);
    }
    println!("{table}");
}
