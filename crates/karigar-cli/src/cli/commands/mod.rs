//! Command handlers and shared plumbing.

pub mod auth;
pub mod bookings;
pub mod config;
pub mod payments;
pub mod services;

use anyhow::{Context, Result};
use karigar_core::api::{ApiClient, ApiError};
use karigar_core::config::Config;
use karigar_core::session::SessionStore;

/// Builds the API client from config: base URL, timeout, injected session
/// store.
pub fn client(config: &Config) -> Result<ApiClient> {
    let base_url = config.effective_base_url();
    url::Url::parse(&base_url).with_context(|| format!("invalid base URL '{base_url}'"))?;

    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    let http = builder.build().context("build HTTP client")?;
    Ok(ApiClient::with_http(http, base_url, SessionStore::new()))
}

/// Converts an API error into a display-ready one, expanding validation
/// field errors line by line.
pub fn describe(err: ApiError) -> anyhow::Error {
    let fields = err.field_errors();
    if !fields.is_empty() {
        let mut lines = vec!["validation failed:".to_string()];
        for (field, messages) in fields {
            for message in messages {
                lines.push(format!("  {field}: {message}"));
            }
        }
        return anyhow::anyhow!(lines.join("\n"));
    }
    err.into()
}

/// First segment of a UUID for compact table display.
pub fn short_id(id: &uuid::Uuid) -> String {
    let rendered = id.to_string();
    rendered[..8].to_string()
}

/// Parses a UUID argument with a readable error.
pub fn parse_uuid(value: &str, what: &str) -> Result<uuid::Uuid> {
    value
        .parse()
        .with_context(|| format!("invalid {what} id '{value}' (expected a UUID)"))
}
