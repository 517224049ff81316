use crate::core::classifier::TriggerClassifier;
use crate::core::pricing::{calculate_total_price, order_lines};
use crate::core::reconcile::{index_companions, CompanionIndex, ReconciliationEngine};
use crate::core::volume_catalog::VolumeCatalog;
use crate::core::{BundleRules, CartStore, Catalog};
use crate::domain::model::{
    Cart, CartId, LineItem, LineItemChange, OrderDraft, UnitOfWork, VariantId,
};
use crate::utils::error::{CartError, Result};
use chrono::{DateTime, Utc};

/// 購物車聚合：每個異動都在同一個提交內完成品項異動、附屬品項重算與總價重算
pub struct CartService<C: Catalog, S: CartStore, R: BundleRules> {
    catalog: C,
    store: S,
    rules: R,
    volumes: VolumeCatalog,
}

impl<C: Catalog, S: CartStore, R: BundleRules> CartService<C, S, R> {
    pub fn new(catalog: C, store: S, rules: R) -> Self {
        Self {
            catalog,
            store,
            rules,
            volumes: VolumeCatalog::new(),
        }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub async fn create_cart(&self) -> Result<Cart> {
        let cart = self.store.create(CartId::new()).await?;
        tracing::info!("Created cart {}", cart.id);
        Ok(cart)
    }

    pub async fn get_cart(&self, cart_id: CartId) -> Result<Cart> {
        self.store.load(cart_id).await
    }

    pub async fn is_empty(&self, cart_id: CartId) -> Result<bool> {
        Ok(self.store.load(cart_id).await?.is_empty())
    }

    /// 加入商品；已存在時累加數量
    pub async fn add_item(&self, cart_id: CartId, variant_id: VariantId, quantity: i64) -> Result<Cart> {
        let quantity = positive_quantity(quantity)?;
        self.catalog.unit_price(variant_id)?;

        let cart = self.store.load(cart_id).await?;
        let now = Utc::now();
        let mut changes = Vec::new();

        let (parent, is_new_parent) = match cart.find_primary(variant_id) {
            Some(existing) => {
                let total = existing
                    .quantity
                    .checked_add(quantity)
                    .ok_or(CartError::QuantityOverflow { variant_id })?;
                changes.push(LineItemChange::Update {
                    id: existing.id,
                    quantity: total,
                });
                (
                    LineItem {
                        quantity: total,
                        ..existing.clone()
                    },
                    false,
                )
            }
            None => {
                let item = LineItem::new(variant_id, quantity, now);
                changes.push(LineItemChange::Insert(item.clone()));
                (item, true)
            }
        };

        changes.extend(self.companion_changes(cart_id, &parent, is_new_parent, now).await?);

        tracing::debug!(
            "add_item cart={} variant={} quantity={} new={}",
            cart_id,
            variant_id,
            parent.quantity,
            is_new_parent
        );
        self.commit(cart, changes, now).await
    }

    /// 直接設定數量；小於等於 0 時等同移除
    pub async fn update_item_quantity(
        &self,
        cart_id: CartId,
        variant_id: VariantId,
        quantity: i64,
    ) -> Result<Cart> {
        if quantity <= 0 {
            return self.remove_item(cart_id, variant_id).await;
        }
        let quantity =
            u32::try_from(quantity).map_err(|_| CartError::QuantityOverflow { variant_id })?;

        let cart = self.store.load(cart_id).await?;
        let existing = cart
            .find_primary(variant_id)
            .ok_or(CartError::LineItemNotFound { variant_id })?
            .clone();

        let now = Utc::now();
        let mut changes = Vec::new();
        if existing.quantity != quantity {
            changes.push(LineItemChange::Update {
                id: existing.id,
                quantity,
            });
        }

        let parent = LineItem {
            quantity,
            ..existing
        };
        changes.extend(self.companion_changes(cart_id, &parent, false, now).await?);

        self.commit(cart, changes, now).await
    }

    /// 移除商品及其附屬品項；不存在時原樣回傳
    pub async fn remove_item(&self, cart_id: CartId, variant_id: VariantId) -> Result<Cart> {
        let cart = self.store.load(cart_id).await?;

        let Some(item) = cart.find_primary(variant_id) else {
            tracing::debug!("remove_item: variant {} not in cart {}", variant_id, cart_id);
            return Ok(cart);
        };

        let changes = vec![LineItemChange::Delete { id: item.id }];
        self.commit(cart, changes, Utc::now()).await
    }

    pub async fn clear(&self, cart_id: CartId) -> Result<Cart> {
        let cart = self.store.load(cart_id).await?;
        self.commit(cart, vec![LineItemChange::Clear], Utc::now())
            .await
    }

    /// 下單前的購物車快照，總價重新計算
    pub async fn order_draft(&self, cart_id: CartId) -> Result<OrderDraft> {
        let cart = self.store.load(cart_id).await?;
        if cart.is_empty() {
            return Err(CartError::EmptyCartOperation { cart_id });
        }

        Ok(OrderDraft {
            cart_id,
            lines: order_lines(&self.catalog, &cart.items)?,
            total_price: calculate_total_price(&self.catalog, &cart.items)?,
        })
    }

    async fn companion_changes(
        &self,
        cart_id: CartId,
        parent: &LineItem,
        is_new_parent: bool,
        now: DateTime<Utc>,
    ) -> Result<Vec<LineItemChange>> {
        let classifier = TriggerClassifier::new(&self.catalog, &self.rules);
        if !classifier.is_trigger(parent) {
            return Ok(Vec::new());
        }

        let containers = self.volumes.containers(&self.catalog, &self.rules)?;
        let engine = ReconciliationEngine::new(containers, self.rules.large_item_threshold());

        let (current, duplicates) = if is_new_parent {
            (CompanionIndex::new(), Vec::new())
        } else {
            index_companions(self.store.companions_of(cart_id, parent.id).await?)
        };

        let script = engine.reconcile(parent, &current, parent.quantity, is_new_parent);
        let mut changes = script.into_changes(now);

        for duplicate in duplicates {
            tracing::warn!(
                "Dropping duplicate companion {} (variant {}) of {}",
                duplicate.id,
                duplicate.variant_id,
                parent.id
            );
            changes.push(LineItemChange::Delete { id: duplicate.id });
        }

        Ok(changes)
    }

    /// 在副本上套用異動以計算總價，再整批交給儲存層
    async fn commit(&self, cart: Cart, changes: Vec<LineItemChange>, now: DateTime<Utc>) -> Result<Cart> {
        let mut working = cart.clone();
        for change in &changes {
            working.apply(change, now)?;
        }
        let total_price = calculate_total_price(&self.catalog, &working.items)?;

        let change_count = changes.len();
        let unit = UnitOfWork {
            expected_version: cart.version,
            changes,
            total_price,
            at: now,
        };

        let committed = self.store.commit(cart.id, unit).await?;
        tracing::info!(
            "Cart {} committed {} changes (version {}, {} items, total {})",
            committed.id,
            change_count,
            committed.version,
            committed.items.len(),
            committed.total_price
        );

        Ok(committed)
    }
}

fn positive_quantity(quantity: i64) -> Result<u32> {
    if quantity < 1 {
        return Err(CartError::InvalidQuantity { quantity });
    }
    u32::try_from(quantity).map_err(|_| CartError::InvalidQuantity { quantity })
}
