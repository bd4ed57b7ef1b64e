// ============================================================================
// Storage Adapters
// ============================================================================
//
// Implementations of the order creation ports (domain/order/ports.rs):
// - memory: process-local store, used by tests and the local demo
// - scylla: ScyllaDB-backed store
//
// ============================================================================

mod memory;
mod scylla;

pub use memory::InMemoryStore;
pub use scylla::ScyllaStore;
