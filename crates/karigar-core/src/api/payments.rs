//! Payment endpoints.
//!
//! Two-step flow: create an intent for a booking, then confirm it. The
//! server marks the booking confirmed once payment succeeds.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiClient, ApiError, ListResponse, decimal};

/// Accepted payment methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Upi,
    Wallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Wallet => "wallet",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(PaymentMethod::Card),
            "upi" => Ok(PaymentMethod::Upi),
            "wallet" => Ok(PaymentMethod::Wallet),
            _ => anyhow::bail!("unknown payment method '{s}' (expected card, upi or wallet)"),
        }
    }
}

/// Payment processing states, as the server defines them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Processing,
    Success,
    Failed,
    Refunded,
}

#[derive(Debug, Serialize)]
struct PaymentCreateRequest {
    booking_id: Uuid,
    payment_method: PaymentMethod,
}

/// A freshly created payment intent.
#[derive(Debug, Deserialize)]
pub struct PaymentIntent {
    pub payment_id: Uuid,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
struct PaymentConfirmRequest {
    payment_id: Uuid,
}

/// A payment record.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub payment_id: Uuid,
    pub booking: i64,
    pub payment_method: PaymentMethod,
    pub payment_method_display: String,
    pub payment_status: PaymentStatus,
    pub payment_status_display: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub amount: String,
    #[serde(default)]
    pub transaction_id: Option<String>,
    pub payment_date: String,
    #[serde(default)]
    pub processed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Response to a payment confirmation.
#[derive(Debug, Deserialize)]
pub struct PaymentConfirmation {
    pub message: String,
    pub payment: Payment,
}

/// Payment status lookup for a booking: the server answers with either the
/// payment record or a "nothing yet" message.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PaymentLookup {
    Found(Box<Payment>),
    Missing { message: String, booking_id: Uuid },
}

impl ApiClient {
    /// Initializes a payment intent for a booking.
    ///
    /// # Errors
    /// Returns an error if the operation fails (including a 400 when the
    /// booking is already paid).
    pub async fn create_payment(
        &self,
        booking_id: Uuid,
        payment_method: PaymentMethod,
    ) -> Result<PaymentIntent, ApiError> {
        self.post(
            "/payments/create/",
            &PaymentCreateRequest {
                booking_id,
                payment_method,
            },
        )
        .await
    }

    /// Confirms a pending payment.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn confirm_payment(
        &self,
        payment_id: Uuid,
    ) -> Result<PaymentConfirmation, ApiError> {
        self.post("/payments/confirm/", &PaymentConfirmRequest { payment_id })
            .await
    }

    /// Lists the current user's payments.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn my_payments(&self) -> Result<Vec<Payment>, ApiError> {
        let response: ListResponse<Payment> = self.get("/payments/my/", &[]).await?;
        Ok(response.into_vec())
    }

    /// Looks up the payment state for a booking.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn payment_status(&self, booking_id: Uuid) -> Result<PaymentLookup, ApiError> {
        self.get(&format!("/payments/booking/{booking_id}/"), &[])
            .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn payment_json() -> serde_json::Value {
        json!({
            "id": 1,
            "payment_id": "7f8a2c44-30a1-4f6e-9a36-0d2c4a8b9f10",
            "booking": 5,
            "payment_method": "upi",
            "payment_method_display": "UPI",
            "payment_status": "success",
            "payment_status_display": "Success",
            "amount": "900.00",
            "transaction_id": "DEMO-TXN-1a2b3c4d5e",
            "payment_date": "2025-08-01T09:30:00Z",
            "processed_at": "2025-08-01T09:31:00Z",
            "created_at": "2025-08-01T09:30:00Z",
            "updated_at": "2025-08-01T09:31:00Z"
        })
    }

    /// Test: the status lookup decodes both server answers.
    #[test]
    fn test_payment_lookup_shapes() {
        let found: PaymentLookup = serde_json::from_value(payment_json()).unwrap();
        assert!(matches!(found, PaymentLookup::Found(_)));

        let missing: PaymentLookup = serde_json::from_value(json!({
            "message": "No payment found for this booking",
            "booking_id": "7f8a2c44-30a1-4f6e-9a36-0d2c4a8b9f10"
        }))
        .unwrap();
        assert!(matches!(missing, PaymentLookup::Missing { .. }));
    }

    /// Test: payment method round-trips through its string form.
    #[test]
    fn test_payment_method_roundtrip() {
        for method in [PaymentMethod::Card, PaymentMethod::Upi, PaymentMethod::Wallet] {
            let parsed: PaymentMethod = method.as_str().parse().unwrap();
            assert_eq!(parsed, method);
        }
        assert!("cash".parse::<PaymentMethod>().is_err());
    }

    /// Test: intent creation serializes the expected body.
    #[test]
    fn test_payment_create_body() {
        let booking_id: Uuid = "7f8a2c44-30a1-4f6e-9a36-0d2c4a8b9f10".parse().unwrap();
        let body = serde_json::to_value(PaymentCreateRequest {
            booking_id,
            payment_method: PaymentMethod::Wallet,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({
                "booking_id": "7f8a2c44-30a1-4f6e-9a36-0d2c4a8b9f10",
                "payment_method": "wallet"
            })
        );
    }
}
