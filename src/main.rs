use rust_decimal::Decimal;
use scylla::client::session::Session;
use scylla::client::session_builder::SessionBuilder;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

mod config;
mod db;
mod domain;
mod metrics;
mod utils;

use config::{AppConfig, DEFAULT_LOG_FILTER};
use db::{InMemoryStore, ScyllaStore};
use domain::common::{CustomerId, Money, ProductId, RestaurantId};
use domain::customer::Customer;
use domain::order::{
    CreateOrderCommand, OrderAddress, OrderCreateCommandHandler, OrderItemRequest,
    TransactionManager,
};
use domain::restaurant::{Product, Restaurant};
use metrics::{OrderMetrics, ServiceStatus};
use utils::RetryConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;

    // Structured logging, filter from RUST_LOG
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_new(&config.log_filter)
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    tracing::info!("🚀 Starting food order service");

    // === 1. Prometheus metrics ===
    let metrics = Arc::new(OrderMetrics::new()?);
    let status = ServiceStatus::new(if config.scylla_node.is_some() {
        "scylla"
    } else {
        "memory"
    });

    if let Some(port) = config.metrics_port {
        let registry = metrics.registry().clone();
        let status = status.clone();
        std::thread::spawn(move || {
            let system = actix_web::rt::System::new();
            if let Err(e) = system.block_on(metrics::start_metrics_server(registry, status, port)) {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 2. Order store ===
    let demo = DemoData::new();

    match &config.scylla_node {
        Some(node) => {
            tracing::info!(node = %node, "Connecting to ScyllaDB...");
            let session: Session = SessionBuilder::new().known_node(node).build().await?;

            let store = ScyllaStore::new(Arc::new(session));
            store.ensure_schema(&config.keyspace).await?;
            store.register_customer(&demo.customer).await?;
            store.register_restaurant(&demo.restaurant).await?;
            status.mark_ready();

            let handler = OrderCreateCommandHandler::new(store).with_metrics(metrics.clone());
            run_demo(&handler, &demo, &config.retry).await;
        }
        None => {
            tracing::info!("No ScyllaDB node configured, using in-memory store");
            let store = InMemoryStore::new();
            store.register_customer(demo.customer.clone()).await;
            store.register_restaurant(demo.restaurant.clone()).await;
            status.mark_ready();

            let handler =
                OrderCreateCommandHandler::new(store.clone()).with_metrics(metrics.clone());
            run_demo(&handler, &demo, &config.retry).await;

            let stats = store.stats();
            tracing::info!(
                committed_orders = store.orders().await.len(),
                customer_lookups = stats.customer_lookups,
                restaurant_lookups = stats.restaurant_lookups,
                saves = stats.saves,
                commits = stats.commits,
                rollbacks = stats.rollbacks,
                "📊 In-memory store activity"
            );
        }
    }

    if config.metrics_port.is_some() {
        tracing::info!("⏳ Metrics available, press Ctrl+C to exit");
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("🎉 Done");
    Ok(())
}

struct DemoData {
    customer: Customer,
    restaurant: Restaurant,
}

impl DemoData {
    fn new() -> Self {
        let restaurant = Restaurant::new(
            RestaurantId::new(Uuid::new_v4()),
            true,
            vec![
                Product::new(
                    ProductId::new(Uuid::new_v4()),
                    "margherita",
                    Money::new(Decimal::new(1000, 2)),
                    true,
                ),
                Product::new(
                    ProductId::new(Uuid::new_v4()),
                    "lasagne",
                    Money::new(Decimal::new(1250, 2)),
                    false,
                ),
            ],
        );

        Self {
            customer: Customer::new(CustomerId::new(Uuid::new_v4())),
            restaurant,
        }
    }

    fn command(&self, quantity: u32, sub_total: Money) -> CreateOrderCommand {
        let product = &self.restaurant.products[0];
        CreateOrderCommand {
            customer_id: self.customer.id,
            restaurant_id: self.restaurant.id,
            price: sub_total,
            items: vec![OrderItemRequest {
                product_id: product.id,
                quantity,
                price: product.price,
                sub_total,
            }],
            address: OrderAddress {
                street: "Schönhauser Allee 10".to_string(),
                postal_code: "10119".to_string(),
                city: "Berlin".to_string(),
            },
        }
    }
}

/// Place one valid order and one with a wrong line price
async fn run_demo<M: TransactionManager>(
    handler: &OrderCreateCommandHandler<M>,
    demo: &DemoData,
    retry: &RetryConfig,
) {
    tracing::info!("📝 Placing order: 2 x margherita at 10.00");
    let valid = demo.command(2, Money::new(Decimal::new(2000, 2)));
    match handler.create_order_with_retry(&valid, retry).await {
        Ok(response) => match serde_json::to_string(&response) {
            Ok(json) => tracing::info!(response = %json, "Order accepted"),
            Err(e) => tracing::warn!(error = %e, "Could not render response"),
        },
        Err(e) => tracing::error!(error = %e, "Order unexpectedly failed"),
    }

    tracing::info!("📝 Placing order with a wrong line price: 2 x margherita for 15.00");
    let mismatched = demo.command(2, Money::new(Decimal::new(1500, 2)));
    if let Err(e) = handler.create_order_with_retry(&mismatched, retry).await {
        tracing::info!(reason = e.kind(), error = %e, "Order rejected as expected");
    }
}
