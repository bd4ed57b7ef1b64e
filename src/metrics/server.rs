use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use prometheus::{Encoder, Registry, TextEncoder};

// ============================================================================
// Operational HTTP endpoints
// ============================================================================
//
// - /metrics: Prometheus text exposition
// - /health: liveness, always 200 while the process serves requests
// - /ready: 200 once the order store is set up, 503 before
//
// ============================================================================

/// Readiness of the order store, shared between `main` and the endpoints
#[derive(Clone, Debug)]
pub struct ServiceStatus {
    store: &'static str,
    ready: Arc<AtomicBool>,
}

impl ServiceStatus {
    pub fn new(store: &'static str) -> Self {
        Self {
            store,
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Called once the store schema and seed data are in place
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        tracing::info!(store = self.store, "Order store ready");
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Start the metrics HTTP server
/// This should be called in a separate thread/runtime to avoid conflicts
pub async fn start_metrics_server(
    registry: Registry,
    status: ServiceStatus,
    port: u16,
) -> std::io::Result<()> {
    tracing::info!("📊 Starting metrics server on http://0.0.0.0:{}/metrics", port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(registry.clone()))
            .app_data(web::Data::new(status.clone()))
            .route("/metrics", web::get().to(metrics_handler))
            .route("/health", web::get().to(health_handler))
            .route("/ready", web::get().to(ready_handler))
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}

async fn metrics_handler(registry: web::Data<Registry>) -> impl Responder {
    let encoder = TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return HttpResponse::InternalServerError().finish();
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}

async fn health_handler(status: web::Data<ServiceStatus>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "food-order-service",
        "store": status.store,
    }))
}

async fn ready_handler(status: web::Data<ServiceStatus>) -> impl Responder {
    let body = serde_json::json!({
        "ready": status.is_ready(),
        "store": status.store,
    });

    if status.is_ready() {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{body::to_bytes, test};
    use prometheus::IntCounter;

    #[actix_web::test]
    async fn test_metrics_endpoint_renders_registry() {
        let registry = Registry::new();
        let counter = IntCounter::new("orders_created_total", "Total orders created").unwrap();
        registry.register(Box::new(counter.clone())).unwrap();
        counter.inc();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(registry))
                .route("/metrics", web::get().to(metrics_handler)),
        )
        .await;

        let req = test::TestRequest::get().uri("/metrics").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = to_bytes(resp.into_body()).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("orders_created_total 1"));
    }

    #[actix_web::test]
    async fn test_health_endpoint_names_the_store() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ServiceStatus::new("memory")))
                .route("/health", web::get().to(health_handler)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["status"], "healthy");
        assert_eq!(resp["store"], "memory");
    }

    #[actix_web::test]
    async fn test_ready_endpoint_follows_store_status() {
        let status = ServiceStatus::new("scylla");
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(status.clone()))
                .route("/ready", web::get().to(ready_handler)),
        )
        .await;

        let req = test::TestRequest::get().uri("/ready").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

        status.mark_ready();

        let req = test::TestRequest::get().uri("/ready").to_request();
        let resp: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(resp["ready"], true);
        assert_eq!(resp["store"], "scylla");
    }
}
