// ============================================================================
// Customer Domain
// ============================================================================
//
// Customers are owned by the customer subsystem. The ordering context only
// needs to know that a customer exists.
//
// ============================================================================

pub mod entity;

pub use entity::*;
