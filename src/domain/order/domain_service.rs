use chrono::Utc;

use crate::domain::restaurant::Restaurant;
use super::aggregate::{NewOrder, Order};
use super::errors::OrderError;
use super::events::OrderCreatedEvent;

// ============================================================================
// Order Domain Service - Validation & Initiation
// ============================================================================
//
// Enforces the invariants that span the order and the restaurant snapshot.
// No I/O and no shared state: safe to call from any number of tasks.
//
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderDomainService;

impl OrderDomainService {
    pub fn new() -> Self {
        Self
    }

    /// Validate a candidate order against the restaurant and assign identity.
    ///
    /// Checks run in a fixed order and the first failure wins:
    /// initial state, restaurant active, products offered, item prices,
    /// total price.
    pub fn validate_and_initiate(
        &self,
        order: NewOrder,
        restaurant: &Restaurant,
    ) -> Result<(Order, OrderCreatedEvent), OrderError> {
        order.validate_initial_state()?;
        Self::validate_restaurant(restaurant)?;
        order.validate_products(restaurant)?;
        order.validate_item_prices(restaurant)?;
        order.validate_total_price()?;

        let order = order.initialize();
        let event = OrderCreatedEvent::new(order.clone(), Utc::now());

        Ok((order, event))
    }

    fn validate_restaurant(restaurant: &Restaurant) -> Result<(), OrderError> {
        if !restaurant.active {
            return Err(OrderError::RestaurantNotActive(restaurant.id));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::common::{CustomerId, Money, ProductId, RestaurantId};
    use crate::domain::order::events::DomainEvent;
    use crate::domain::order::value_objects::{OrderStatus, StreetAddress};
    use crate::domain::order::NewOrderItem;
    use crate::domain::restaurant::Product;
    use rust_decimal::Decimal;
    use std::collections::HashSet;
    use uuid::Uuid;

    fn money(cents: i64) -> Money {
        Money::new(Decimal::new(cents, 2))
    }

    struct Fixture {
        restaurant: Restaurant,
        pizza: ProductId,
        salad: ProductId,
    }

    fn fixture() -> Fixture {
        let pizza = ProductId::new(Uuid::new_v4());
        let salad = ProductId::new(Uuid::new_v4());
        let restaurant = Restaurant::new(
            RestaurantId::new(Uuid::new_v4()),
            true,
            vec![
                Product::new(pizza, "pizza", money(1000), true),
                Product::new(salad, "salad", money(750), true),
            ],
        );
        Fixture {
            restaurant,
            pizza,
            salad,
        }
    }

    fn item(product_id: ProductId, quantity: u32, unit_cents: i64, line_cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id,
            quantity,
            price: money(unit_cents),
            sub_total: money(line_cents),
        }
    }

    fn candidate(restaurant: &Restaurant, items: Vec<NewOrderItem>, total_cents: i64) -> NewOrder {
        NewOrder::new(
            CustomerId::new(Uuid::new_v4()),
            restaurant.id,
            StreetAddress::new(Uuid::new_v4(), "Baker Street 221B", "NW1 6XE", "London"),
            money(total_cents),
            items,
        )
    }

    #[test]
    fn test_valid_order_is_initiated() {
        let f = fixture();
        let order = candidate(&f.restaurant, vec![item(f.pizza, 2, 1000, 2000)], 2000);

        let (order, event) = OrderDomainService::new()
            .validate_and_initiate(order, &f.restaurant)
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].id.0, 1);
        assert!(!order.id.value().is_nil());
        assert_eq!(event.order(), &order);
        assert_eq!(event.event_type(), "OrderCreated");
        assert_eq!(event.aggregate_id(), order.id.value());
    }

    #[test]
    fn test_item_ids_are_unique() {
        let f = fixture();
        let order = candidate(
            &f.restaurant,
            vec![
                item(f.pizza, 1, 1000, 1000),
                item(f.salad, 2, 750, 1500),
                item(f.pizza, 3, 1000, 3000),
            ],
            5500,
        );

        let (order, _) = OrderDomainService::new()
            .validate_and_initiate(order, &f.restaurant)
            .unwrap();

        let ids: HashSet<_> = order.items.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_inactive_restaurant_is_rejected_regardless_of_items() {
        let mut f = fixture();
        f.restaurant.active = false;
        let order = candidate(&f.restaurant, vec![item(f.pizza, 2, 1000, 2000)], 2000);

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);

        match result {
            Err(OrderError::RestaurantNotActive(id)) => assert_eq!(id, f.restaurant.id),
            other => panic!("expected RestaurantNotActive, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_state_is_checked_before_restaurant() {
        let mut f = fixture();
        f.restaurant.active = false;
        let mut order = candidate(&f.restaurant, vec![item(f.pizza, 1, 1000, 1000)], 1000);
        order.status = OrderStatus::Cancelled;

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);
        assert!(matches!(result, Err(OrderError::InvalidInitialState(_))));
    }

    #[test]
    fn test_unknown_product_is_rejected() {
        let f = fixture();
        let unknown = ProductId::new(Uuid::new_v4());
        let order = candidate(
            &f.restaurant,
            vec![item(f.pizza, 1, 1000, 1000), item(unknown, 1, 100, 100)],
            1100,
        );

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);

        match result {
            Err(OrderError::ProductUnavailable(id)) => assert_eq!(id, unknown),
            other => panic!("expected ProductUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_unavailable_product_is_rejected() {
        let mut f = fixture();
        f.restaurant.products[1].available = false;
        let order = candidate(&f.restaurant, vec![item(f.salad, 1, 750, 750)], 750);

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);
        assert!(matches!(result, Err(OrderError::ProductUnavailable(id)) if id == f.salad));
    }

    #[test]
    fn test_line_price_mismatch_is_rejected() {
        let f = fixture();
        let order = candidate(&f.restaurant, vec![item(f.pizza, 2, 1000, 1500)], 1500);

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);

        match result {
            Err(OrderError::PriceMismatch {
                product_id,
                expected,
                actual,
            }) => {
                assert_eq!(product_id, f.pizza);
                assert_eq!(expected, money(2000));
                assert_eq!(actual, money(1500));
            }
            other => panic!("expected PriceMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_price_mismatch_wins_even_when_total_adds_up() {
        let f = fixture();
        // Pizza is 1 cent short and salad 1 cent over: the total still matches
        let order = candidate(
            &f.restaurant,
            vec![item(f.pizza, 1, 1000, 999), item(f.salad, 1, 750, 751)],
            1750,
        );

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);
        assert!(matches!(
            result,
            Err(OrderError::PriceMismatch { product_id, .. }) if product_id == f.pizza
        ));
    }

    #[test]
    fn test_total_price_mismatch_is_rejected() {
        let f = fixture();
        let order = candidate(
            &f.restaurant,
            vec![item(f.pizza, 2, 1000, 2000), item(f.salad, 1, 750, 750)],
            2800,
        );

        let result = OrderDomainService::new().validate_and_initiate(order, &f.restaurant);

        match result {
            Err(OrderError::TotalPriceMismatch { declared, computed }) => {
                assert_eq!(declared, money(2800));
                assert_eq!(computed, money(2750));
            }
            other => panic!("expected TotalPriceMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        let f = fixture();
        let order = candidate(
            &f.restaurant,
            vec![item(f.pizza, 2, 1000, 2000), item(f.salad, 1, 750, 750)],
            2750,
        );
        let service = OrderDomainService::new();

        let (_, first) = service
            .validate_and_initiate(order.clone(), &f.restaurant)
            .unwrap();
        let (_, second) = service.validate_and_initiate(order, &f.restaurant).unwrap();

        let (a, b) = (first.order(), second.order());
        assert_ne!(a.id, b.id);
        assert_eq!(a.customer_id, b.customer_id);
        assert_eq!(a.restaurant_id, b.restaurant_id);
        assert_eq!(a.delivery_address, b.delivery_address);
        assert_eq!(a.price, b.price);
        assert_eq!(a.status, b.status);
        assert_eq!(a.items, b.items);
    }

    #[test]
    fn test_rejection_is_idempotent() {
        let f = fixture();
        let order = candidate(&f.restaurant, vec![item(f.pizza, 2, 1000, 1500)], 1500);
        let service = OrderDomainService::new();

        let first = service.validate_and_initiate(order.clone(), &f.restaurant);
        let second = service.validate_and_initiate(order, &f.restaurant);

        assert_eq!(first.unwrap_err().kind(), second.unwrap_err().kind());
    }

    fn restaurant_with_price(amount: Decimal) -> (Restaurant, ProductId) {
        let product_id = ProductId::new(Uuid::new_v4());
        let restaurant = Restaurant::new(
            RestaurantId::new(Uuid::new_v4()),
            true,
            vec![Product::new(product_id, "caviar", Money::new(amount), true)],
        );
        (restaurant, product_id)
    }

    #[test]
    fn test_line_price_overflow_is_rejected() {
        let half_max = Decimal::MAX / Decimal::from(2);
        let (restaurant, product_id) = restaurant_with_price(half_max);
        let order = candidate(
            &restaurant,
            vec![NewOrderItem {
                product_id,
                quantity: 3,
                price: Money::new(half_max),
                sub_total: Money::new(Decimal::MAX),
            }],
            0,
        );

        let result = OrderDomainService::new().validate_and_initiate(order, &restaurant);

        assert!(matches!(
            result,
            Err(OrderError::ItemPriceOutOfRange(id)) if id == product_id
        ));
    }

    #[test]
    fn test_total_overflow_is_rejected() {
        let half_max = Decimal::MAX / Decimal::from(2);
        let (restaurant, product_id) = restaurant_with_price(half_max);
        let line = NewOrderItem {
            product_id,
            quantity: 1,
            price: Money::new(half_max),
            sub_total: Money::new(half_max),
        };
        let order = candidate(&restaurant, vec![line.clone(), line.clone(), line], 0);

        let result = OrderDomainService::new().validate_and_initiate(order, &restaurant);

        match result {
            Err(e) => assert_eq!(e.kind(), "total_price_out_of_range"),
            Ok(_) => panic!("expected the order total to be out of range"),
        }
    }
}
