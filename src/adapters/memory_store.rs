use crate::core::CartStore;
use crate::domain::model::{Cart, CartId, LineItem, LineItemId, UnitOfWork};
use crate::utils::error::{CartError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<Mutex<HashMap<CartId, Cart>>>,
}

impl InMemoryCartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.carts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.carts.lock().await.is_empty()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    async fn create(&self, cart_id: CartId) -> Result<Cart> {
        let mut carts = self.carts.lock().await;
        if carts.contains_key(&cart_id) {
            return Err(CartError::StoreError {
                message: format!("cart {} already exists", cart_id),
            });
        }

        let cart = Cart::new(cart_id);
        carts.insert(cart_id, cart.clone());
        Ok(cart)
    }

    async fn load(&self, cart_id: CartId) -> Result<Cart> {
        let carts = self.carts.lock().await;
        carts
            .get(&cart_id)
            .cloned()
            .ok_or(CartError::CartNotFound { cart_id })
    }

    async fn companions_of(&self, cart_id: CartId, parent_id: LineItemId) -> Result<Vec<LineItem>> {
        let carts = self.carts.lock().await;
        let cart = carts
            .get(&cart_id)
            .ok_or(CartError::CartNotFound { cart_id })?;

        Ok(cart.companions_of(parent_id).cloned().collect())
    }

    async fn commit(&self, cart_id: CartId, unit: UnitOfWork) -> Result<Cart> {
        let mut carts = self.carts.lock().await;
        let stored = carts
            .get_mut(&cart_id)
            .ok_or(CartError::CartNotFound { cart_id })?;

        // 先套用在副本上，全部成功才替換
        let mut working = stored.clone();
        if let Err(e) = working.apply_unit(&unit) {
            tracing::warn!("Rolled back unit of work on cart {}: {}", cart_id, e);
            return Err(e);
        }

        *stored = working.clone();
        Ok(working)
    }
}
