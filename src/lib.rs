pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Operation};

pub use adapters::{memory_catalog::InMemoryCatalog, memory_store::InMemoryCartStore};
pub use config::{BundleConfig, TomlConfig};
pub use crate::core::{allocation::allocate, cart::CartService, reconcile::ReconciliationEngine};
pub use domain::model::{Cart, CartId, ContainerChoice, EditScript, LineItem, LineItemId, OrderDraft, VariantId};
pub use utils::error::{CartError, Result};
