pub mod allocation;
pub mod cart;
pub mod classifier;
pub mod pricing;
pub mod reconcile;
pub mod volume_catalog;

pub use crate::domain::model::{Cart, ContainerChoice, EditScript, LineItem};
pub use crate::domain::ports::{BundleRules, CartStore, Catalog};
pub use crate::utils::error::Result;
