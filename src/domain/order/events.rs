use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::aggregate::Order;

// ============================================================================
// Order Events
// ============================================================================

/// Base trait for all domain events
pub trait DomainEvent {
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> Uuid;
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Order Created - validated and identified order, ready for downstream
/// workflows such as payment initiation
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrderCreatedEvent {
    order: Order,
    created_at: DateTime<Utc>,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, created_at: DateTime<Utc>) -> Self {
        Self { order, created_at }
    }

    pub fn order(&self) -> &Order {
        &self.order
    }
}

impl DomainEvent for OrderCreatedEvent {
    fn event_type(&self) -> &'static str {
        "OrderCreated"
    }

    fn aggregate_id(&self) -> Uuid {
        self.order.id.value()
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.created_at
    }
}
