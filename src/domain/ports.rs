use crate::domain::model::{Attribute, Cart, CartId, ContainerChoice, LineItem, LineItemId, UnitOfWork, VariantId};
use crate::utils::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;

/// 唯讀的商品目錄；未知的規格一律回傳 `VariantNotFound`
pub trait Catalog: Send + Sync {
    fn unit_price(&self, variant_id: VariantId) -> Result<Decimal>;
    fn family_of(&self, variant_id: VariantId) -> Result<Option<String>>;
    fn attributes_of(&self, variant_id: VariantId) -> Result<Vec<Attribute>>;
    fn variants_in_family(&self, family: &str) -> Result<Vec<VariantId>>;
}

pub trait BundleRules: Send + Sync {
    fn trigger_family(&self) -> &str;
    fn trigger_attribute(&self) -> &str;
    fn base_unit_values(&self) -> &[String];
    fn container_family(&self) -> &str;
    fn container_size_attribute(&self) -> &str;
    fn large_item_threshold(&self) -> u32;
    /// 固定的容器清單；有設定時不查目錄
    fn static_containers(&self) -> Option<&[ContainerChoice]>;
}

#[async_trait]
pub trait CartStore: Send + Sync {
    async fn create(&self, cart_id: CartId) -> Result<Cart>;
    async fn load(&self, cart_id: CartId) -> Result<Cart>;
    async fn companions_of(&self, cart_id: CartId, parent_id: LineItemId) -> Result<Vec<LineItem>>;
    /// 全部異動一起成功或一起失敗
    async fn commit(&self, cart_id: CartId, unit: UnitOfWork) -> Result<Cart>;
}
