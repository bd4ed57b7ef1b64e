use uuid::Uuid;

use crate::domain::restaurant::RestaurantQuery;
use super::aggregate::{NewOrder, NewOrderItem, Order};
use super::commands::{CreateOrderCommand, CreateOrderResponse, OrderAddress};
use super::value_objects::StreetAddress;

// ============================================================================
// Order Data Mapper - request/response <-> domain translation
// ============================================================================
//
// Plain field mapping, no business rules.
//
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct OrderDataMapper;

impl OrderDataMapper {
    pub fn new() -> Self {
        Self
    }

    pub fn create_order_command_to_restaurant_query(
        &self,
        command: &CreateOrderCommand,
    ) -> RestaurantQuery {
        let mut product_ids = Vec::with_capacity(command.items.len());
        for item in &command.items {
            if !product_ids.contains(&item.product_id) {
                product_ids.push(item.product_id);
            }
        }

        RestaurantQuery {
            restaurant_id: command.restaurant_id,
            product_ids,
        }
    }

    pub fn create_order_command_to_order(&self, command: &CreateOrderCommand) -> NewOrder {
        let items = command
            .items
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                sub_total: item.sub_total,
            })
            .collect();

        NewOrder::new(
            command.customer_id,
            command.restaurant_id,
            Self::order_address_to_street_address(&command.address),
            command.price,
            items,
        )
    }

    pub fn order_to_create_order_response(&self, order: &Order) -> CreateOrderResponse {
        CreateOrderResponse {
            order_id: order.id,
            order_tracking_id: order.tracking_id,
            order_status: order.status,
            message: None,
        }
    }

    fn order_address_to_street_address(address: &OrderAddress) -> StreetAddress {
        StreetAddress::new(
            Uuid::new_v4(),
            address.street.clone(),
            address.postal_code.clone(),
            address.city.clone(),
        )
    }
}
