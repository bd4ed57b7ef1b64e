use std::sync::Arc;
use std::time::Instant;

use crate::domain::common::CustomerId;
use crate::domain::restaurant::Restaurant;
use crate::metrics::OrderMetrics;
use crate::utils::{retry_on_transient, IsTransient, RetryConfig};

use super::aggregate::Order;
use super::commands::{CreateOrderCommand, CreateOrderResponse};
use super::domain_service::OrderDomainService;
use super::errors::OrderError;
use super::events::{DomainEvent, OrderCreatedEvent};
use super::mapper::OrderDataMapper;
use super::ports::{
    CustomerRepository, OrderRepository, RestaurantRepository, Transaction, TransactionManager,
};

// ============================================================================
// Order Create Command Handler
// ============================================================================
//
// Orchestrates: Command → Lookups → Validation → Order Store → Response
//
// Everything from the first lookup to the write runs in one transaction.
// Any early return drops the transaction, which rolls it back.
//
// ============================================================================

pub struct OrderCreateCommandHandler<M: TransactionManager> {
    transactions: M,
    domain_service: OrderDomainService,
    mapper: OrderDataMapper,
    metrics: Option<Arc<OrderMetrics>>,
}

impl<M: TransactionManager> OrderCreateCommandHandler<M> {
    pub fn new(transactions: M) -> Self {
        Self {
            transactions,
            domain_service: OrderDomainService::new(),
            mapper: OrderDataMapper::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<OrderMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Validate and persist a new order
    #[tracing::instrument(
        name = "create_order",
        skip_all,
        fields(customer_id = %command.customer_id, restaurant_id = %command.restaurant_id)
    )]
    pub async fn create_order(
        &self,
        command: &CreateOrderCommand,
    ) -> Result<CreateOrderResponse, OrderError> {
        let started = Instant::now();

        let result = self.create_order_in_transaction(command).await;

        match &result {
            Ok(response) => tracing::info!(
                order_id = %response.order_id,
                tracking_id = %response.order_tracking_id,
                status = %response.order_status,
                "✅ Order created"
            ),
            Err(e) if e.is_transient() => tracing::error!(
                reason = e.kind(),
                error = %e,
                "Order creation failed"
            ),
            Err(e) => tracing::warn!(
                reason = e.kind(),
                error = %e,
                "Order rejected"
            ),
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_outcome(&result, started.elapsed().as_secs_f64());
        }

        result
    }

    /// Same as `create_order`, replaying the whole request on storage failures
    pub async fn create_order_with_retry(
        &self,
        command: &CreateOrderCommand,
        retry: &RetryConfig,
    ) -> Result<CreateOrderResponse, OrderError> {
        retry_on_transient(retry, move |attempt| {
            tracing::debug!(attempt = attempt, "Submitting order creation");
            self.create_order(command)
        })
        .await
        .into_result()
    }

    async fn create_order_in_transaction(
        &self,
        command: &CreateOrderCommand,
    ) -> Result<CreateOrderResponse, OrderError> {
        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(OrderError::StoreUnavailable)?;

        Self::check_customer(&mut tx, command.customer_id).await?;
        let restaurant = self.check_restaurant(&mut tx, command).await?;

        let order = self.mapper.create_order_command_to_order(command);
        let (order, event) = self.domain_service.validate_and_initiate(order, &restaurant)?;

        let saved = Self::save_order(&mut tx, &order).await?;

        tx.commit().await.map_err(|e| {
            tracing::error!(order_id = %order.id, error = %e, "Could not commit order");
            OrderError::PersistenceFailure(e.to_string())
        })?;

        Self::emit(&event);

        Ok(self.mapper.order_to_create_order_response(&saved))
    }

    async fn check_customer(
        tx: &mut M::Transaction,
        customer_id: CustomerId,
    ) -> Result<(), OrderError> {
        match tx
            .find_customer(customer_id)
            .await
            .map_err(OrderError::StoreUnavailable)?
        {
            Some(_) => Ok(()),
            None => {
                tracing::warn!(customer_id = %customer_id, "Could not find customer");
                Err(OrderError::customer_not_found(customer_id))
            }
        }
    }

    async fn check_restaurant(
        &self,
        tx: &mut M::Transaction,
        command: &CreateOrderCommand,
    ) -> Result<Restaurant, OrderError> {
        let query = self.mapper.create_order_command_to_restaurant_query(command);

        match tx
            .find_restaurant_information(&query)
            .await
            .map_err(OrderError::StoreUnavailable)?
        {
            Some(restaurant) => Ok(restaurant),
            None => {
                tracing::warn!(
                    restaurant_id = %command.restaurant_id,
                    "Could not find restaurant"
                );
                Err(OrderError::restaurant_not_found(command.restaurant_id))
            }
        }
    }

    async fn save_order(tx: &mut M::Transaction, order: &Order) -> Result<Order, OrderError> {
        match tx.save(order).await {
            Ok(Some(saved)) => {
                tracing::debug!(order_id = %saved.id, "Order is saved");
                Ok(saved)
            }
            Ok(None) => {
                tracing::error!(order_id = %order.id, "Order store returned no record");
                Err(OrderError::PersistenceFailure(format!(
                    "store returned no record for order {}",
                    order.id
                )))
            }
            Err(e) => {
                tracing::error!(order_id = %order.id, error = %e, "Could not save order");
                Err(OrderError::PersistenceFailure(e.to_string()))
            }
        }
    }

    fn emit(event: &OrderCreatedEvent) {
        match serde_json::to_string(event) {
            Ok(payload) => tracing::info!(
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                tracking_id = %event.order().tracking_id,
                timestamp = %event.timestamp(),
                payload = %payload,
                "Created order event"
            ),
            Err(e) => tracing::warn!(
                event_type = event.event_type(),
                aggregate_id = %event.aggregate_id(),
                error = %e,
                "Could not serialize order event"
            ),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
