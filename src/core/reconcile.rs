use crate::core::allocation::{allocate, Allocation};
use crate::domain::model::{
    CompanionDelete, CompanionInsert, CompanionUpdate, ContainerChoice, EditScript, LineItem, VariantId,
};
use std::collections::BTreeMap;

/// 附屬品項依規格索引
pub type CompanionIndex = BTreeMap<VariantId, LineItem>;

/// 比對目標容器組合與現有附屬品項，產生最小的異動清單。
///
/// 不做任何 I/O；套用由呼叫端在同一個交易內完成。
pub struct ReconciliationEngine<'a> {
    containers: &'a [ContainerChoice],
    threshold: u32,
}

impl<'a> ReconciliationEngine<'a> {
    pub fn new(containers: &'a [ContainerChoice], threshold: u32) -> Self {
        Self {
            containers,
            threshold,
        }
    }

    pub fn target(&self, target_quantity: u32) -> Allocation {
        allocate(target_quantity, self.containers, self.threshold)
    }

    pub fn reconcile(
        &self,
        parent: &LineItem,
        current: &CompanionIndex,
        target_quantity: u32,
        is_new_parent: bool,
    ) -> EditScript {
        let target = self.target(target_quantity);

        // 新建立的父品項不可能已有附屬品項
        let mut unclaimed = if is_new_parent {
            CompanionIndex::new()
        } else {
            current.clone()
        };

        let mut script = EditScript::default();

        for (variant_id, count) in target {
            match unclaimed.remove(&variant_id) {
                Some(existing) => {
                    if existing.quantity != count {
                        script.updates.push(CompanionUpdate {
                            id: existing.id,
                            variant_id,
                            quantity: count,
                        });
                    }
                }
                None => script.inserts.push(CompanionInsert {
                    parent_id: parent.id,
                    variant_id,
                    quantity: count,
                }),
            }
        }

        script.deletes.extend(unclaimed.into_values().map(|existing| CompanionDelete {
            id: existing.id,
            variant_id: existing.variant_id,
        }));

        tracing::debug!(
            parent = %parent.id,
            target_quantity,
            inserts = script.inserts.len(),
            updates = script.updates.len(),
            deletes = script.deletes.len(),
            "reconciled companions"
        );

        script
    }
}

/// 建立附屬品項索引；同規格重複出現的多餘品項另外回傳，應予刪除
pub fn index_companions(companions: Vec<LineItem>) -> (CompanionIndex, Vec<LineItem>) {
    let mut index = CompanionIndex::new();
    let mut duplicates = Vec::new();

    for companion in companions {
        if index.contains_key(&companion.variant_id) {
            duplicates.push(companion);
        } else {
            index.insert(companion.variant_id, companion);
        }
    }

    (index, duplicates)
}
