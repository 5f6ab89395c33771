//! Service catalog endpoints.

use serde::{Deserialize, Serialize};

use super::{ApiClient, ApiError, ListResponse, decimal};
use crate::session::UserRecord;

/// A bookable service as listed in the catalog.
#[derive(Debug, Clone, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub category_display: String,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub price_per_hour: String,
    pub provider: i64,
    pub provider_details: UserRecord,
    pub is_available: bool,
    pub minimum_hours: u32,
    pub maximum_hours: u32,
    #[serde(default)]
    pub service_area: Option<String>,
    #[serde(deserialize_with = "decimal::deserialize")]
    pub rating: String,
    pub total_bookings: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// New-service payload (providers only).
#[derive(Debug, Serialize)]
pub struct ServiceCreate {
    pub name: String,
    pub description: String,
    pub category: String,
    pub price_per_hour: String,
    pub minimum_hours: u32,
    pub maximum_hours: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_area: Option<String>,
    pub is_available: bool,
}

/// Query filters for the service catalog.
#[derive(Debug, Default)]
pub struct ServiceFilter {
    /// Free-text search over name, description, category and area.
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Server-side ordering field, e.g. "price_per_hour" or "-rating".
    pub ordering: Option<String>,
}

impl ServiceFilter {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(min_price) = &self.min_price {
            pairs.push(("min_price", min_price.clone()));
        }
        if let Some(max_price) = &self.max_price {
            pairs.push(("max_price", max_price.clone()));
        }
        if let Some(ordering) = &self.ordering {
            pairs.push(("ordering", ordering.clone()));
        }
        pairs
    }
}

/// A service category choice.
#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub value: String,
    pub label: String,
}

/// Aggregate catalog statistics.
#[derive(Debug, Deserialize)]
pub struct ServiceStats {
    pub total_services: u64,
    pub total_providers: u64,
    pub average_price: f64,
}

impl ApiClient {
    /// Lists available services, optionally filtered.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn services(&self, filter: &ServiceFilter) -> Result<Vec<Service>, ApiError> {
        let response: ListResponse<Service> = self.get("/services/", &filter.query()).await?;
        Ok(response.into_vec())
    }

    /// Fetches one service by id.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn service(&self, id: i64) -> Result<Service, ApiError> {
        self.get(&format!("/services/{id}/"), &[]).await
    }

    /// Publishes a new service (providers only; 403 otherwise).
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn create_service(&self, request: &ServiceCreate) -> Result<Service, ApiError> {
        self.post("/services/create/", request).await
    }

    /// Lists the authenticated provider's own services.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn my_services(&self) -> Result<Vec<Service>, ApiError> {
        let response: ListResponse<Service> = self.get("/services/my/", &[]).await?;
        Ok(response.into_vec())
    }

    /// Enumerates service categories.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn service_categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get("/services/categories/", &[]).await
    }

    /// Fetches aggregate catalog statistics.
    ///
    /// # Errors
    /// Returns an error if the operation fails.
    pub async fn service_stats(&self) -> Result<ServiceStats, ApiError> {
        self.get("/services/stats/", &[]).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    /// Test: decimal fields decode from both strings and numbers.
    #[test]
    fn test_service_decodes_decimal_shapes() {
        let raw = json!({
            "id": 3,
            "name": "Deep Cleaning",
            "description": "Full home deep clean",
            "category": "cleaning",
            "category_display": "Cleaning",
            "price_per_hour": "450.00",
            "provider": 9,
            "provider_details": {"id": 9, "username": "meera", "user_type": "provider"},
            "is_available": true,
            "minimum_hours": 2,
            "maximum_hours": 8,
            "service_area": "Indiranagar",
            "rating": 4.5,
            "total_bookings": 12,
            "created_at": "2025-07-01T10:00:00Z",
            "updated_at": "2025-07-20T10:00:00Z"
        });

        let service: Service = serde_json::from_value(raw).unwrap();
        assert_eq!(service.price_per_hour, "450.00");
        assert_eq!(service.rating, "4.50");
        assert!(service.provider_details.is_provider());
    }

    /// Test: only set filters become query pairs.
    #[test]
    fn test_filter_query_pairs() {
        let filter = ServiceFilter {
            category: Some("plumbing".to_string()),
            max_price: Some("500".to_string()),
            ..Default::default()
        };
        assert_eq!(
            filter.query(),
            vec![
                ("category", "plumbing".to_string()),
                ("max_price", "500".to_string()),
            ]
        );
        assert!(ServiceFilter::default().query().is_empty());
    }
}
