use std::fmt;

use uuid::Uuid;

use crate::domain::common::{Money, ProductId, RestaurantId};
use crate::utils::IsTransient;
use super::ports::RepositoryError;
use super::value_objects::OrderStatus;

// ============================================================================
// Order Creation Errors
// ============================================================================

/// Aggregate that a lookup failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    Restaurant,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Customer => f.write_str("customer"),
            EntityKind::Restaurant => f.write_str("restaurant"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Could not find {entity} with id: {id}")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("Restaurant with id {0} is currently not active")]
    RestaurantNotActive(RestaurantId),

    #[error("Product {0} is not offered or not available")]
    ProductUnavailable(ProductId),

    #[error("Order item quantity must be positive for product {product_id}, got {quantity}")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    #[error("Order must contain at least one item")]
    EmptyOrder,

    #[error("Order item price {actual} is not valid for product {product_id}, expected {expected}")]
    PriceMismatch {
        product_id: ProductId,
        expected: Money,
        actual: Money,
    },

    #[error("Order item price for product {0} exceeds the supported range")]
    ItemPriceOutOfRange(ProductId),

    #[error("Order items total exceeds the supported range")]
    TotalPriceOutOfRange,

    #[error("Total price {declared} is not equal to order items total {computed}")]
    TotalPriceMismatch { declared: Money, computed: Money },

    #[error("Order is not in correct state for initialization: {0}")]
    InvalidInitialState(OrderStatus),

    #[error("Order could not be saved: {0}")]
    PersistenceFailure(String),

    #[error("Order store unavailable: {0}")]
    StoreUnavailable(#[source] RepositoryError),
}

impl OrderError {
    pub fn customer_not_found(id: impl Into<Uuid>) -> Self {
        OrderError::NotFound {
            entity: EntityKind::Customer,
            id: id.into(),
        }
    }

    pub fn restaurant_not_found(id: impl Into<Uuid>) -> Self {
        OrderError::NotFound {
            entity: EntityKind::Restaurant,
            id: id.into(),
        }
    }

    /// Stable label for metrics and structured logs
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::NotFound {
                entity: EntityKind::Customer,
                ..
            } => "customer_not_found",
            OrderError::NotFound {
                entity: EntityKind::Restaurant,
                ..
            } => "restaurant_not_found",
            OrderError::RestaurantNotActive(_) => "restaurant_not_active",
            OrderError::ProductUnavailable(_) => "product_unavailable",
            OrderError::InvalidQuantity { .. } => "invalid_quantity",
            OrderError::EmptyOrder => "empty_order",
            OrderError::PriceMismatch { .. } => "price_mismatch",
            OrderError::TotalPriceMismatch { .. } => "total_price_mismatch",
            OrderError::ItemPriceOutOfRange(_) => "item_price_out_of_range",
            OrderError::TotalPriceOutOfRange => "total_price_out_of_range",
            OrderError::InvalidInitialState(_) => "invalid_initial_state",
            OrderError::PersistenceFailure(_) => "persistence_failure",
            OrderError::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

/// Storage failures leave no partial state behind, so the whole request can
/// be replayed. Rejections would fail the same way again.
impl IsTransient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            OrderError::PersistenceFailure(_) | OrderError::StoreUnavailable(_)
        )
    }
}
