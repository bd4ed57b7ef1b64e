use serde::{Deserialize, Serialize};

use crate::domain::common::{CustomerId, Money, OrderId, ProductId, RestaurantId, TrackingId};
use super::value_objects::OrderStatus;

// ============================================================================
// Order Commands - Represent user intent, and the caller-facing result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderCommand {
    pub customer_id: CustomerId,
    pub restaurant_id: RestaurantId,
    pub price: Money,
    pub items: Vec<OrderItemRequest>,
    pub address: OrderAddress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Money,
    pub sub_total: Money,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub order_id: OrderId,
    pub order_tracking_id: TrackingId,
    pub order_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
