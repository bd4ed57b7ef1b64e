// ============================================================================
// Shared Kernel - Types referenced by more than one aggregate
// ============================================================================

pub mod value_objects;

pub use value_objects::*;
