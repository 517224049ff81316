use crate::utils::error::{CartError, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantId(pub u64);

impl fmt::Display for VariantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineItemId(pub Uuid);

impl LineItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for LineItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CartId(pub Uuid);

impl CartId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CartId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 商品規格的描述屬性 (例如 `volume = 1 l`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// 一個可供拆分的容器尺寸，對應到目錄中代表該尺寸的商品規格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerChoice {
    pub size: u32,
    pub variant_id: VariantId,
}

impl ContainerChoice {
    pub fn new(size: u32, variant_id: VariantId) -> Self {
        Self { size, variant_id }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub variant_id: VariantId,
    pub quantity: u32,
    pub parent_id: Option<LineItemId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LineItem {
    pub fn new(variant_id: VariantId, quantity: u32, at: DateTime<Utc>) -> Self {
        Self {
            id: LineItemId::new(),
            variant_id,
            quantity,
            parent_id: None,
            created_at: at,
            updated_at: at,
        }
    }

    pub fn companion(
        parent_id: LineItemId,
        variant_id: VariantId,
        quantity: u32,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id),
            ..Self::new(variant_id, quantity, at)
        }
    }

    pub fn is_companion(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// 單一購物車異動，由 [`Cart::apply`] 套用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LineItemChange {
    Insert(LineItem),
    Update { id: LineItemId, quantity: u32 },
    Delete { id: LineItemId },
    Clear,
}

/// 一次原子性提交：所有異動加上重新計算後的總價
#[derive(Debug, Clone, PartialEq)]
pub struct UnitOfWork {
    pub expected_version: u64,
    pub changes: Vec<LineItemChange>,
    pub total_price: Decimal,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionInsert {
    pub parent_id: LineItemId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionUpdate {
    pub id: LineItemId,
    pub variant_id: VariantId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionDelete {
    pub id: LineItemId,
    pub variant_id: VariantId,
}

/// 讓現有附屬品項收斂到目標狀態所需的最小異動
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditScript {
    pub inserts: Vec<CompanionInsert>,
    pub updates: Vec<CompanionUpdate>,
    pub deletes: Vec<CompanionDelete>,
}

impl EditScript {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inserts.len() + self.updates.len() + self.deletes.len()
    }

    /// 轉成可提交的異動；新增的附屬品項在此取得 id
    pub fn into_changes(self, at: DateTime<Utc>) -> Vec<LineItemChange> {
        let mut changes = Vec::with_capacity(self.len());

        for insert in self.inserts {
            changes.push(LineItemChange::Insert(LineItem::companion(
                insert.parent_id,
                insert.variant_id,
                insert.quantity,
                at,
            )));
        }
        for update in self.updates {
            changes.push(LineItemChange::Update {
                id: update.id,
                quantity: update.quantity,
            });
        }
        for delete in self.deletes {
            changes.push(LineItemChange::Delete { id: delete.id });
        }

        changes
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub items: Vec<LineItem>,
    pub total_price: Decimal,
    pub version: u64,
}

impl Cart {
    pub fn new(id: CartId) -> Self {
        Self {
            id,
            items: Vec::new(),
            total_price: Decimal::ZERO,
            version: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: LineItemId) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// 依規格找出非附屬的品項 (一般品項或觸發品項)
    pub fn find_primary(&self, variant_id: VariantId) -> Option<&LineItem> {
        self.items
            .iter()
            .find(|item| !item.is_companion() && item.variant_id == variant_id)
    }

    pub fn companions_of(&self, parent_id: LineItemId) -> impl Iterator<Item = &LineItem> {
        self.items
            .iter()
            .filter(move |item| item.parent_id == Some(parent_id))
    }

    pub fn apply(&mut self, change: &LineItemChange, at: DateTime<Utc>) -> Result<()> {
        match change {
            LineItemChange::Insert(item) => self.insert(item.clone()),
            LineItemChange::Update { id, quantity } => {
                if *quantity == 0 {
                    return Err(CartError::InvalidQuantity { quantity: 0 });
                }
                let item = self
                    .items
                    .iter_mut()
                    .find(|item| item.id == *id)
                    .ok_or_else(|| CartError::StoreError {
                        message: format!("update of unknown line item {}", id),
                    })?;
                item.quantity = *quantity;
                item.updated_at = at;
                Ok(())
            }
            LineItemChange::Delete { id } => {
                if self.get(*id).is_none() {
                    return Err(CartError::StoreError {
                        message: format!("delete of unknown line item {}", id),
                    });
                }
                // 刪除父品項時一併刪除其附屬品項
                self.items
                    .retain(|item| item.id != *id && item.parent_id != Some(*id));
                Ok(())
            }
            LineItemChange::Clear => {
                self.items.clear();
                Ok(())
            }
        }
    }

    /// 依序套用整個提交；任何一筆失敗時呼叫端應丟棄這份副本
    pub fn apply_unit(&mut self, unit: &UnitOfWork) -> Result<()> {
        if unit.expected_version != self.version {
            return Err(CartError::ConcurrentModification {
                cart_id: self.id,
                expected: unit.expected_version,
                actual: self.version,
            });
        }

        for change in &unit.changes {
            self.apply(change, unit.at)?;
        }

        self.total_price = unit.total_price;
        self.version += 1;
        Ok(())
    }

    fn insert(&mut self, item: LineItem) -> Result<()> {
        if item.quantity == 0 {
            return Err(CartError::InvalidQuantity { quantity: 0 });
        }
        if self.get(item.id).is_some() {
            return Err(CartError::StoreError {
                message: format!("duplicate line item id {}", item.id),
            });
        }

        match item.parent_id {
            Some(parent_id) => {
                let parent = self.get(parent_id).ok_or_else(|| CartError::StoreError {
                    message: format!("companion references unknown parent {}", parent_id),
                })?;
                if parent.is_companion() {
                    return Err(CartError::StoreError {
                        message: format!("line item {} is already a companion", parent_id),
                    });
                }
            }
            None => {
                if self.find_primary(item.variant_id).is_some() {
                    return Err(CartError::StoreError {
                        message: format!("duplicate line item for variant {}", item.variant_id),
                    });
                }
            }
        }

        self.items.push(item);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub variant_id: VariantId,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub is_companion: bool,
}

/// 下單流程讀取的購物車快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    pub cart_id: CartId,
    pub lines: Vec<OrderLine>,
    pub total_price: Decimal,
}
