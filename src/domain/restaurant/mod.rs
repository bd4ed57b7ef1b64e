// ============================================================================
// Restaurant Domain
// ============================================================================
//
// Restaurants are referenced, never owned, by the ordering context. The
// snapshot types here are what the restaurant lookup hands back.
//
// ============================================================================

pub mod entity;

pub use entity::*;
