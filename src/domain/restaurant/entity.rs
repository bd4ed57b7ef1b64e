use serde::{Deserialize, Serialize};

use crate::domain::common::{Money, ProductId, RestaurantId};

// ============================================================================
// Restaurant Snapshot
// ============================================================================

/// Product as offered by a restaurant at lookup time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub available: bool,
}

impl Product {
    pub fn new(id: ProductId, name: impl Into<String>, price: Money, available: bool) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            available,
        }
    }
}

/// Read-only view of a restaurant for one validation pass.
///
/// Owned by the restaurant subsystem. `products` holds only the products the
/// lookup was asked about, in catalog order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub active: bool,
    pub products: Vec<Product>,
}

impl Restaurant {
    pub fn new(id: RestaurantId, active: bool, products: Vec<Product>) -> Self {
        Self {
            id,
            active,
            products,
        }
    }

    pub fn product(&self, product_id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == product_id)
    }
}

/// Partial restaurant used to ask the restaurant lookup for a snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestaurantQuery {
    pub restaurant_id: RestaurantId,
    pub product_ids: Vec<ProductId>,
}

impl RestaurantQuery {
    pub fn includes(&self, product_id: ProductId) -> bool {
        self.product_ids.contains(&product_id)
    }
}
