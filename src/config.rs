use anyhow::{Context, Result};

use crate::utils::RetryConfig;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Read from the environment, with defaults suitable for a local run:
//
//   RUST_LOG                        log filter (default: info,food_order_service=debug)
//   ORDER_SERVICE_SCYLLA_NODE       ScyllaDB contact point; unset = in-memory store
//   ORDER_SERVICE_KEYSPACE          keyspace name (default: orders_ks)
//   ORDER_SERVICE_METRICS_PORT      /metrics port, 0 disables (default: 9090)
//   ORDER_SERVICE_RETRY_ATTEMPTS    attempts per order request (default: 3)
//
// ============================================================================

pub const DEFAULT_LOG_FILTER: &str = "info,food_order_service=debug";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub log_filter: String,
    pub scylla_node: Option<String>,
    pub keyspace: String,
    pub metrics_port: Option<u16>,
    pub retry: RetryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            scylla_node: None,
            keyspace: "orders_ks".to_string(),
            metrics_port: Some(9090),
            retry: RetryConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(filter) = lookup("RUST_LOG") {
            config.log_filter = filter;
        }

        config.scylla_node = lookup("ORDER_SERVICE_SCYLLA_NODE").filter(|node| !node.is_empty());

        if let Some(keyspace) = lookup("ORDER_SERVICE_KEYSPACE") {
            config.keyspace = keyspace;
        }

        if let Some(port) = lookup("ORDER_SERVICE_METRICS_PORT") {
            let port: u16 = port
                .parse()
                .with_context(|| format!("invalid ORDER_SERVICE_METRICS_PORT: {}", port))?;
            config.metrics_port = (port != 0).then_some(port);
        }

        if let Some(attempts) = lookup("ORDER_SERVICE_RETRY_ATTEMPTS") {
            let attempts: u32 = attempts
                .parse()
                .with_context(|| format!("invalid ORDER_SERVICE_RETRY_ATTEMPTS: {}", attempts))?;
            config.retry.max_attempts = attempts.max(1);
        }

        Ok(config)
    }
}
