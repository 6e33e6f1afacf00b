//! Inventory registry: rentable items and their availability state.

pub mod registry;
pub mod types;

pub use registry::InventoryRegistry;
pub use types::{
    InventoryItem, InventoryStats, ItemCondition, ItemFilter, ItemPatch, ItemStatus, NewItem,
    Ownership,
};
