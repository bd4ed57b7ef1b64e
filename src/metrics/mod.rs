// Private module declaration
mod server;

use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

use crate::domain::order::OrderError;

// Re-export for public API
pub use server::{start_metrics_server, ServiceStatus};

// ============================================================================
// Metrics Module - Prometheus metrics for order creation
// ============================================================================
//
// - orders_created_total: orders committed
// - orders_rejected_total{reason}: requests that failed, by OrderError kind
// - create_order_duration_seconds: end-to-end latency of the workflow
//
// Scraped via /metrics (see server.rs)
// ============================================================================

pub struct OrderMetrics {
    registry: Registry,

    pub orders_created: IntCounter,
    pub orders_rejected: IntCounterVec,
    pub create_order_duration: Histogram,
}

impl OrderMetrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_created = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created.clone()))?;

        let orders_rejected = IntCounterVec::new(
            Opts::new("orders_rejected_total", "Total order creation requests that failed"),
            &["reason"],
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let create_order_duration = Histogram::with_opts(
            HistogramOpts::new(
                "create_order_duration_seconds",
                "Order creation workflow duration",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0]),
        )?;
        registry.register(Box::new(create_order_duration.clone()))?;

        Ok(Self {
            registry,
            orders_created,
            orders_rejected,
            create_order_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_outcome<T>(&self, result: &Result<T, OrderError>, duration_secs: f64) {
        match result {
            Ok(_) => self.orders_created.inc(),
            Err(e) => self.orders_rejected.with_label_values(&[e.kind()]).inc(),
        }
        self.create_order_duration.observe(duration_secs);
    }
}
