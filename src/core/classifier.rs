use crate::domain::model::{LineItem, VariantId};
use crate::domain::ports::{BundleRules, Catalog};

/// 判斷品項是否需要自動附加容器
pub struct TriggerClassifier<'a, C: Catalog, R: BundleRules> {
    catalog: &'a C,
    rules: &'a R,
}

impl<'a, C: Catalog, R: BundleRules> TriggerClassifier<'a, C, R> {
    pub fn new(catalog: &'a C, rules: &'a R) -> Self {
        Self { catalog, rules }
    }

    pub fn is_trigger(&self, item: &LineItem) -> bool {
        !item.is_companion() && self.is_trigger_variant(item.variant_id)
    }

    /// 目錄資料缺漏時回傳 false，不視為錯誤
    pub fn is_trigger_variant(&self, variant_id: VariantId) -> bool {
        let family = match self.catalog.family_of(variant_id) {
            Ok(Some(family)) => family,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!("Cannot classify variant {}: {}", variant_id, e);
                return false;
            }
        };

        if family != self.rules.trigger_family() {
            return false;
        }

        let attributes = match self.catalog.attributes_of(variant_id) {
            Ok(attributes) => attributes,
            Err(e) => {
                tracing::warn!("Cannot read attributes of variant {}: {}", variant_id, e);
                return false;
            }
        };

        attributes.iter().any(|attribute| {
            attribute.name == self.rules.trigger_attribute()
                && self.is_base_unit(&attribute.value)
        })
    }

    fn is_base_unit(&self, value: &str) -> bool {
        let value = normalize(value);
        self.rules
            .base_unit_values()
            .iter()
            .any(|spelling| normalize(spelling) == value)
    }
}

fn normalize(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
