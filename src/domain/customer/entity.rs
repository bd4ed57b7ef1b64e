use serde::{Deserialize, Serialize};

use crate::domain::common::CustomerId;

// ============================================================================
// Customer - identity as seen by the ordering context
// ============================================================================

/// Snapshot of a customer resolved through the customer lookup.
///
/// Only existence matters when placing an order, so the identity is the
/// whole entity here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
}

impl Customer {
    pub fn new(id: CustomerId) -> Self {
        Self { id }
    }
}
