// ============================================================================
// Domain Layer - Business Logic
// ============================================================================
//
// Each aggregate has its own subdirectory. `order` owns the creation
// workflow; `customer` and `restaurant` hold the snapshots it reads.
//
// Storage adapters live outside this layer, in src/db/.
//
// ============================================================================

pub mod common;
pub mod customer;
pub mod order;
pub mod restaurant;
