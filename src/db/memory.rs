use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::domain::common::{CustomerId, RestaurantId};
use crate::domain::customer::Customer;
use crate::domain::order::{
    CustomerRepository, Order, OrderRepository, RepositoryError, RestaurantRepository,
    Transaction, TransactionManager,
};
use crate::domain::restaurant::{Restaurant, RestaurantQuery};

// ============================================================================
// In-Memory Store
// ============================================================================
//
// A transaction holds the store lock for its whole lifetime, so concurrent
// transactions are serialised. Saved orders are staged inside the
// transaction and only appended to the store on commit.
//
// ============================================================================

#[derive(Debug, Default)]
struct StoreState {
    customers: HashMap<CustomerId, Customer>,
    restaurants: HashMap<RestaurantId, Restaurant>,
    orders: Vec<Order>,
}

#[derive(Debug, Default)]
struct Counters {
    customer_lookups: AtomicUsize,
    restaurant_lookups: AtomicUsize,
    saves: AtomicUsize,
    commits: AtomicUsize,
    rollbacks: AtomicUsize,
}

/// Point-in-time copy of the store's call counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub customer_lookups: usize,
    pub restaurant_lookups: usize,
    pub saves: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<StoreState>>,
    counters: Arc<Counters>,
    refuse_saves: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_customer(&self, customer: Customer) {
        self.state.lock().await.customers.insert(customer.id, customer);
    }

    /// Register a restaurant with its full catalog
    pub async fn register_restaurant(&self, restaurant: Restaurant) {
        self.state
            .lock()
            .await
            .restaurants
            .insert(restaurant.id, restaurant);
    }

    /// Committed orders, in commit order
    pub async fn orders(&self) -> Vec<Order> {
        self.state.lock().await.orders.clone()
    }

    /// Make every subsequent `save` report that nothing was stored
    #[cfg(test)]
    pub fn refuse_saves(&self, refuse: bool) {
        self.refuse_saves.store(refuse, Ordering::SeqCst);
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            customer_lookups: self.counters.customer_lookups.load(Ordering::SeqCst),
            restaurant_lookups: self.counters.restaurant_lookups.load(Ordering::SeqCst),
            saves: self.counters.saves.load(Ordering::SeqCst),
            commits: self.counters.commits.load(Ordering::SeqCst),
            rollbacks: self.counters.rollbacks.load(Ordering::SeqCst),
        }
    }
}

#[async_trait]
impl TransactionManager for InMemoryStore {
    type Transaction = InMemoryTransaction;

    async fn begin(&self) -> Result<Self::Transaction, RepositoryError> {
        let state = self.state.clone().lock_owned().await;

        Ok(InMemoryTransaction {
            state,
            counters: self.counters.clone(),
            refuse_saves: self.refuse_saves.load(Ordering::SeqCst),
            staged: Vec::new(),
            finished: false,
        })
    }
}

pub struct InMemoryTransaction {
    state: OwnedMutexGuard<StoreState>,
    counters: Arc<Counters>,
    refuse_saves: bool,
    staged: Vec<Order>,
    finished: bool,
}

#[async_trait]
impl CustomerRepository for InMemoryTransaction {
    async fn find_customer(
        &mut self,
        customer_id: CustomerId,
    ) -> Result<Option<Customer>, RepositoryError> {
        self.counters.customer_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.customers.get(&customer_id).cloned())
    }
}

#[async_trait]
impl RestaurantRepository for InMemoryTransaction {
    async fn find_restaurant_information(
        &mut self,
        query: &RestaurantQuery,
    ) -> Result<Option<Restaurant>, RepositoryError> {
        self.counters.restaurant_lookups.fetch_add(1, Ordering::SeqCst);

        Ok(self
            .state
            .restaurants
            .get(&query.restaurant_id)
            .map(|restaurant| Restaurant {
                id: restaurant.id,
                active: restaurant.active,
                products: restaurant
                    .products
                    .iter()
                    .filter(|product| query.includes(product.id))
                    .cloned()
                    .collect(),
            }))
    }
}

#[async_trait]
impl OrderRepository for InMemoryTransaction {
    async fn save(&mut self, order: &Order) -> Result<Option<Order>, RepositoryError> {
        self.counters.saves.fetch_add(1, Ordering::SeqCst);

        if self.refuse_saves {
            return Ok(None);
        }

        self.staged.push(order.clone());
        Ok(Some(order.clone()))
    }
}

#[async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(mut self) -> Result<(), RepositoryError> {
        let staged = std::mem::take(&mut self.staged);
        self.state.orders.extend(staged);
        self.finished = true;
        self.counters.commits.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.counters.rollbacks.fetch_add(1, Ordering::SeqCst);
            tracing::debug!(
                discarded_orders = self.staged.len(),
                "Rolled back in-memory transaction"
            );
        }
    }
}
