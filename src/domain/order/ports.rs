use async_trait::async_trait;

use crate::domain::common::CustomerId;
use crate::domain::customer::Customer;
use crate::domain::restaurant::{Restaurant, RestaurantQuery};
use super::aggregate::Order;

// ============================================================================
// Output Ports - Storage seen from the order creation workflow
// ============================================================================
//
// The three repositories are only reachable through a `Transaction`, so every
// read and write of one request shares a single transaction boundary.
//
// Adapters: src/db/
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

impl RepositoryError {
    pub fn backend(error: impl std::fmt::Display) -> Self {
        RepositoryError::Backend(error.to_string())
    }

    pub fn corrupt(error: impl std::fmt::Display) -> Self {
        RepositoryError::Corrupt(error.to_string())
    }
}

#[async_trait]
pub trait CustomerRepository: Send {
    /// `None` when the customer is unknown
    async fn find_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError>;
}

#[async_trait]
pub trait RestaurantRepository: Send {
    /// Snapshot holding the active flag and only the queried products,
    /// or `None` when the restaurant is unknown
    async fn find_restaurant_information(
        &mut self,
        query: &RestaurantQuery,
    ) -> Result<Option<Restaurant>, RepositoryError>;
}

#[async_trait]
pub trait OrderRepository: Send {
    /// Stage the order for the enclosing transaction.
    ///
    /// Returns the representation the store will hold, or `None` if the
    /// store refuses the order.
    async fn save(&mut self, order: &Order) -> Result<Option<Order>, RepositoryError>;
}

/// Scoped unit of work.
///
/// Nothing staged becomes visible until `commit`. Dropping an uncommitted
/// transaction rolls it back.
#[async_trait]
pub trait Transaction: CustomerRepository + RestaurantRepository + OrderRepository + Send {
    async fn commit(self) -> Result<(), RepositoryError>
    where
        Self: Sized;
}

#[async_trait]
pub trait TransactionManager: Send + Sync {
    type Transaction: Transaction;

    async fn begin(&self) -> Result<Self::Transaction, RepositoryError>;
}
