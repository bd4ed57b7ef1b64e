// ============================================================================
// Order Domain - Order creation workflow
// ============================================================================
//
// - Value objects (OrderStatus, StreetAddress, OrderItemId)
// - Aggregate (NewOrder -> Order) with its invariants
// - Events (OrderCreatedEvent)
// - Commands (CreateOrderCommand / CreateOrderResponse)
// - Errors (OrderError)
// - Domain service (validation & initiation, pure)
// - Mapper (command <-> domain translation)
// - Ports (repositories and the transaction boundary)
// - Command handler (orchestrates the workflow)
//
// ============================================================================

pub mod value_objects;
pub mod aggregate;
pub mod events;
pub mod commands;
pub mod errors;
pub mod domain_service;
pub mod mapper;
pub mod ports;
pub mod command_handler;

// Re-export for convenience
pub use aggregate::*;
pub use commands::*;
pub use errors::*;
pub use ports::*;
pub use command_handler::*;
