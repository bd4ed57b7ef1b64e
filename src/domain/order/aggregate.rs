use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{CustomerId, Money, OrderId, ProductId, RestaurantId, TrackingId};
use crate::domain::restaurant::Restaurant;
use super::errors::OrderError;
use super::value_objects::{OrderItemId, OrderStatus, StreetAddress};

// ============================================================================
// Order Aggregate
// ============================================================================
//
// Two shapes of the same aggregate:
// - NewOrder: translated from a request, unvalidated, no identity
// - Order: validated, identified, ready to be persisted
//
// Only `NewOrder::initialize` turns the first into the second.
//
// ============================================================================

/// Order item as claimed by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price claimed by the caller
    pub price: Money,
    /// Line price claimed by the caller
    pub sub_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub delivery_address: StreetAddress,
    pub price: Money,
    pub items: Vec<NewOrderItem>,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub sub_total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub tracking_id: TrackingId,
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub delivery_address: StreetAddress,
    pub price: Money,
    pub items: Vec<OrderItem>,
    pub status: OrderStatus,
    pub failure_messages: Vec<String>,
}

impl NewOrder {
    pub fn new(
        customer_id: CustomerId,
        restaurant_id: RestaurantId,
        delivery_address: StreetAddress,
        price: Money,
        items: Vec<NewOrderItem>,
    ) -> Self {
        Self {
            customer_id,
            restaurant_id,
            delivery_address,
            price,
            items,
            status: OrderStatus::Pending,
        }
    }

    pub fn validate_initial_state(&self) -> Result<(), OrderError> {
        match self.status {
            OrderStatus::Pending => Ok(()),
            other => Err(OrderError::InvalidInitialState(other)),
        }
    }

    /// Every item must name a product the restaurant offers right now
    pub fn validate_products(&self, restaurant: &Restaurant) -> Result<(), OrderError> {
        if self.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        for item in &self.items {
            match restaurant.product(item.product_id) {
                Some(product) if product.available => {}
                _ => return Err(OrderError::ProductUnavailable(item.product_id)),
            }

            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity {
                    product_id: item.product_id,
                    quantity: item.quantity,
                });
            }
        }

        Ok(())
    }

    /// Claimed unit and line prices must match the restaurant's catalog exactly
    pub fn validate_item_prices(&self, restaurant: &Restaurant) -> Result<(), OrderError> {
        for item in &self.items {
            let product = restaurant
                .product(item.product_id)
                .ok_or(OrderError::ProductUnavailable(item.product_id))?;

            if item.price != product.price {
                return Err(OrderError::PriceMismatch {
                    product_id: item.product_id,
                    expected: product.price,
                    actual: item.price,
                });
            }

            let expected_sub_total = product
                .price
                .checked_mul(item.quantity)
                .ok_or(OrderError::ItemPriceOutOfRange(item.product_id))?;

            if item.sub_total != expected_sub_total {
                return Err(OrderError::PriceMismatch {
                    product_id: item.product_id,
                    expected: expected_sub_total,
                    actual: item.sub_total,
                });
            }
        }

        Ok(())
    }

    pub fn validate_total_price(&self) -> Result<(), OrderError> {
        let computed = Money::checked_sum(self.items.iter().map(|item| item.sub_total))
            .ok_or(OrderError::TotalPriceOutOfRange)?;

        if computed != self.price {
            return Err(OrderError::TotalPriceMismatch {
                declared: self.price,
                computed,
            });
        }

        Ok(())
    }

    /// Assign identities and enter the lifecycle at `PENDING`
    pub fn initialize(self) -> Order {
        let items = self
            .items
            .into_iter()
            .zip(1u32..)
            .map(|(item, position)| OrderItem {
                id: OrderItemId(position),
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                sub_total: item.sub_total,
            })
            .collect();

        Order {
            id: OrderId::new(Uuid::now_v7()),
            tracking_id: TrackingId::new(Uuid::new_v4()),
            customer_id: self.customer_id,
            restaurant_id: self.restaurant_id,
            delivery_address: self.delivery_address,
            price: self.price,
            items,
            status: OrderStatus::Pending,
            failure_messages: Vec::new(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::restaurant::Product;
    use rust_decimal::Decimal;

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    fn address() -> StreetAddress {
        StreetAddress::new(Uuid::new_v4(), "1 Main St", "10115", "Berlin")
    }

    fn new_order(items: Vec<NewOrderItem>, total: Money) -> NewOrder {
        NewOrder::new(
            CustomerId::new(Uuid::new_v4()),
            RestaurantId::new(Uuid::new_v4()),
            address(),
            total,
            items,
        )
    }

    #[test]
    fn test_new_order_starts_pending() {
        let order = new_order(vec![], money(0));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.validate_initial_state().is_ok());
    }

    #[test]
    fn test_non_pending_candidate_is_rejected() {
        let mut order = new_order(vec![], money(0));
        order.status = OrderStatus::Approved;

        let result = order.validate_initial_state();
        assert!(matches!(
            result,
            Err(OrderError::InvalidInitialState(OrderStatus::Approved))
        ));
    }

    #[test]
    fn test_empty_order_is_rejected() {
        let restaurant = Restaurant::new(RestaurantId::new(Uuid::new_v4()), true, vec![]);
        let order = new_order(vec![], money(0));

        assert!(matches!(
            order.validate_products(&restaurant),
            Err(OrderError::EmptyOrder)
        ));
    }

    #[test]
    fn test_zero_quantity_is_rejected() {
        let product = Product::new(ProductId::new(Uuid::new_v4()), "soup", money(500), true);
        let restaurant = Restaurant::new(
            RestaurantId::new(Uuid::new_v4()),
            true,
            vec![product.clone()],
        );
        let order = new_order(
            vec![NewOrderItem {
                product_id: product.id,
                quantity: 0,
                price: money(500),
                sub_total: money(0),
            }],
            money(0),
        );

        assert!(matches!(
            order.validate_products(&restaurant),
            Err(OrderError::InvalidQuantity { quantity: 0, .. })
        ));
    }

    #[test]
    fn test_unit_price_must_match_catalog() {
        let product = Product::new(ProductId::new(Uuid::new_v4()), "soup", money(500), true);
        let restaurant = Restaurant::new(
            RestaurantId::new(Uuid::new_v4()),
            true,
            vec![product.clone()],
        );
        // Line price is consistent with the claimed unit price, but the unit price is wrong
        let order = new_order(
            vec![NewOrderItem {
                product_id: product.id,
                quantity: 2,
                price: money(400),
                sub_total: money(800),
            }],
            money(800),
        );

        match order.validate_item_prices(&restaurant) {
            Err(OrderError::PriceMismatch {
                product_id,
                expected,
                actual,
            }) => {
                assert_eq!(product_id, product.id);
                assert_eq!(expected, money(500));
                assert_eq!(actual, money(400));
            }
            other => panic!("expected PriceMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_initialize_assigns_sequential_item_ids() {
        let items = (0..3)
            .map(|_| NewOrderItem {
                product_id: ProductId::new(Uuid::new_v4()),
                quantity: 1,
                price: money(100),
                sub_total: money(100),
            })
            .collect();
        let order = new_order(items, money(300)).initialize();

        let ids: Vec<u32> = order.items.iter().map(|item| item.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.id.value().is_nil());
        assert!(!order.tracking_id.value().is_nil());
        assert!(order.failure_messages.is_empty());
    }
}
