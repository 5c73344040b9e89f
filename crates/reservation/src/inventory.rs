//! Inventory collaborator port.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReservationError;

/// A car in the rental fleet, as reported by the inventory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Car {
    pub id: i64,
    pub license_plate: String,
    pub manufacturer: String,
    pub model: String,
}

impl Car {
    pub fn new(
        id: i64,
        license_plate: impl Into<String>,
        manufacturer: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id,
            license_plate: license_plate.into(),
            manufacturer: manufacturer.into(),
            model: model.into(),
        }
    }
}

/// Read-only client for the external inventory service.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Lists the full fleet.
    async fn list_all_cars(&self) -> Result<Vec<Car>, ReservationError>;
}

#[derive(Debug, Default)]
struct InMemoryInventoryState {
    cars: Vec<Car>,
    fail_on_list: bool,
}

/// In-memory inventory client for testing and the single-process demo.
#[derive(Debug, Clone, Default)]
pub struct InMemoryInventoryClient {
    state: Arc<RwLock<InMemoryInventoryState>>,
}

impl InMemoryInventoryClient {
    /// Creates an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an inventory seeded with the given cars.
    pub fn with_cars(cars: Vec<Car>) -> Self {
        let client = Self::default();
        client.state.write().unwrap().cars = cars;
        client
    }

    /// Adds a car to the fleet.
    pub fn add_car(&self, car: Car) {
        self.state.write().unwrap().cars.push(car);
    }

    /// Configures the client to fail on the next list call.
    pub fn set_fail_on_list(&self, fail: bool) {
        self.state.write().unwrap().fail_on_list = fail;
    }
}

#[async_trait]
impl InventoryClient for InMemoryInventoryClient {
    async fn list_all_cars(&self) -> Result<Vec<Car>, ReservationError> {
        let state = self.state.read().unwrap();
        if state.fail_on_list {
            return Err(ReservationError::Inventory(
                "Inventory service unavailable".to_string(),
            ));
        }
        Ok(state.cars.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeded_inventory_lists_cars() {
        let inventory = InMemoryInventoryClient::with_cars(vec![
            Car::new(1, "ABC-123", "Toyota", "Corolla"),
            Car::new(2, "DEF-456", "Skoda", "Octavia"),
        ]);
        let cars = inventory.list_all_cars().await.unwrap();
        assert_eq!(cars.len(), 2);
    }

    #[tokio::test]
    async fn fail_on_list() {
        let inventory = InMemoryInventoryClient::new();
        inventory.set_fail_on_list(true);
        assert!(matches!(
            inventory.list_all_cars().await,
            Err(ReservationError::Inventory(_))
        ));
    }
}
