//! Booking endpoints.
//!
//! The server owns the booking lifecycle (amount calculation, slot conflict
//! checks, status transitions); this module only carries its results.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::services::Service;
use super::{ApiClient, ApiError, ListResponse, decimal};
use crate::session::UserRecord;

/// Booking lifecycle states, as the server defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::InProgress => "in_progress",
            BookingStatus::Completed => "completed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn all() -> &'static [BookingStatus] {
        &[
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ]
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookingStatus::all()
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown booking status '{s}' (expected pending, confirmed, in_progress, completed or cancelled)"
                )
            })
    }
}

/// A booking as returned by the server.
#[derive(Debug, Clone, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub booking_id: Uuid,
    pub customer: i64,
    pub customer_details: UserRecord,
    pub service: i64,
    pub service_details: Service,
    pub booking_date: String,
    pub time_slot: String,
    pub time_slot_display: String,
    pub hours_requested: u32,
    pub status: BookingStatus,
    pub status_display: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub total_amount: String,
    #[serde(default)]
    pub special_instructions: Option<String>,
    pub customer_address: String,
    pub customer_phone: String,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub confirmed_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// New-booking payload (customers only).
#[derive(Debug, Serialize)]
pub struct BookingCreate {
    pub service: i64,
    /// YYYY-MM-DD
    pub booking_date: String,
    /// Hourly slot between "08:00" and "18:00"
    pub time_slot: String,
    pub hours_requested: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_instructions: Option<String>,
    pub customer_address: String,
    pub customer_phone: String,
}

/// Query filters for the booking list.
#[derive(Debug, Default)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub ordering: Option<String>,
}

impl BookingFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering", ordering.clone()));
        }
        pairs
    }
}

#[derive(Debug, Serialize)]
struct StatusUpdateRequest {
    status: BookingStatus,
}

/// Response to a status update.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub message: String,
    pub booking: Booking,
}

/// Aggregate booking statistics for the current user.
#[derive(Debug, Deserialize)]
pub struct BookingStats {
    pub total_bookings: u64,
    pub completed_bookings: u64,
    pub pending_bookings: u64,
    pub completion_rate: f64,
}

impl ApiClient {
    /// Creates a booking (customers only; 403 otherwise). Validation
    /// failures — past dates, far-future dates, taken slots — surface as
    /// 400 field errors.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn create_booking(&self, request: &BookingCreate) -> Result<Booking, ApiError> {
        self.post("/bookings/", request).await
    }

    /// Lists the current user's bookings (as customer or provider).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn my_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, ApiError> {
        let response: ListResponse<Booking> = self.get("/bookings/my/", &filter.query()).await?;
        Ok(response.into_vec())
    }

    /// Fetches one booking by its public booking id.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn booking(&self, booking_id: Uuid) -> Result<Booking, ApiError> {
        self.get(&format!("/bookings/{booking_id}/"), &[]).await
    }

    /// Updates a booking's status by numeric id (providers only).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn set_booking_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> Result<StatusUpdate, ApiError> {
        self.put(
            &format!("/bookings/{id}/status/"),
            &StatusUpdateRequest { status },
        )
        .await
    }

    /// Fetches aggregate booking statistics for the current user.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn booking_stats(&self) -> Result<BookingStats, ApiError> {
        self.get("/bookings/stats/", &[]).await
    }
}
