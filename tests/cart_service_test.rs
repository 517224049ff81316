use cart_bundle::adapters::memory_catalog::CatalogVariant;
use cart_bundle::core::pricing::calculate_total_price;
use cart_bundle::core::Catalog;
use cart_bundle::{
    BundleConfig, Cart, CartError, CartService, ContainerChoice, InMemoryCartStore, InMemoryCatalog, LineItem,
    VariantId,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const BEER: VariantId = VariantId(1);
const HALF_LITRE: VariantId = VariantId(2);
const SNACK: VariantId = VariantId(3);
const KEG_L: VariantId = VariantId(115);
const KEG_M: VariantId = VariantId(110);
const KEG_S: VariantId = VariantId(105);

type Service = CartService<InMemoryCatalog, InMemoryCartStore, BundleConfig>;

fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::from_variants(vec![
        CatalogVariant::new(BEER, Some("draft-beer"), Decimal::new(250, 2)).with_attribute("volume", "1 l"),
        CatalogVariant::new(HALF_LITRE, Some("draft-beer"), Decimal::new(150, 2))
            .with_attribute("volume", "0.5 l"),
        CatalogVariant::new(SNACK, Some("snacks"), Decimal::new(399, 2)),
        CatalogVariant::new(KEG_L, Some("kegs"), Decimal::from(12)).with_attribute("volume", "15 l"),
        CatalogVariant::new(KEG_M, Some("kegs"), Decimal::from(9)).with_attribute("volume", "10 l"),
        CatalogVariant::new(KEG_S, Some("kegs"), Decimal::from(6)).with_attribute("volume", "5 l"),
    ])
}

fn service() -> Service {
    CartService::new(catalog(), InMemoryCartStore::new(), BundleConfig::default())
}

fn companions(cart: &Cart, parent: VariantId) -> BTreeMap<VariantId, LineItem> {
    let parent = cart.find_primary(parent).expect("parent in cart");
    cart.companions_of(parent.id)
        .map(|item| (item.variant_id, item.clone()))
        .collect()
}

fn picks(cart: &Cart, parent: VariantId) -> BTreeMap<VariantId, u32> {
    companions(cart, parent)
        .into_iter()
        .map(|(variant_id, item)| (variant_id, item.quantity))
        .collect()
}

fn assert_price_invariant(service: &Service, cart: &Cart) {
    let expected = calculate_total_price(service.catalog(), &cart.items).unwrap();
    assert_eq!(cart.total_price, expected);

    let mut manual = Decimal::ZERO;
    for item in &cart.items {
        manual += service.catalog().unit_price(item.variant_id).unwrap() * Decimal::from(item.quantity);
    }
    assert_eq!(cart.total_price, manual);
}

#[tokio::test]
async fn test_scenario_a_greedy_then_best_fit() {
    let service = service();
    let cart = service.create_cart().await.unwrap();

    let cart = service.add_item(cart.id, BEER, 37).await.unwrap();

    assert_eq!(picks(&cart, BEER), BTreeMap::from([(KEG_L, 2), (KEG_M, 1)]));
    assert_price_invariant(&service, &cart);
}

#[tokio::test]
async fn test_scenario_b_below_threshold() {
    let service = service();
    let cart = service.create_cart().await.unwrap();

    let cart = service.add_item(cart.id, BEER, 12).await.unwrap();

    assert_eq!(picks(&cart, BEER), BTreeMap::from([(KEG_L, 1)]));
}

#[tokio::test]
async fn test_scenario_c_zero_quantity_removes_parent_and_companions() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    service.add_item(cart.id, BEER, 12).await.unwrap();
    service.add_item(cart.id, SNACK, 2).await.unwrap();

    let cart = service.update_item_quantity(cart.id, BEER, 0).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].variant_id, SNACK);
    assert_eq!(cart.total_price, Decimal::new(798, 2));
}

#[tokio::test]
async fn test_scenario_d_only_missing_companion_is_inserted() {
    let catalog = catalog();
    let rules = BundleConfig {
        containers: Some(vec![
            ContainerChoice::new(10, KEG_M),
            ContainerChoice::new(5, KEG_S),
        ]),
        ..BundleConfig::default()
    };
    let service = CartService::new(catalog, InMemoryCartStore::new(), rules);
    let cart = service.create_cart().await.unwrap();

    let before = service.add_item(cart.id, BEER, 20).await.unwrap();
    assert_eq!(picks(&before, BEER), BTreeMap::from([(KEG_M, 2)]));
    let keg_m = companions(&before, BEER)[&KEG_M].clone();

    let after = service.add_item(cart.id, BEER, 5).await.unwrap();

    assert_eq!(picks(&after, BEER), BTreeMap::from([(KEG_M, 2), (KEG_S, 1)]));
    // 未變動的附屬品項保留原本的 id 與時間戳
    assert_eq!(companions(&after, BEER)[&KEG_M], keg_m);
    assert_price_invariant(&service, &after);
}

#[tokio::test]
async fn test_scenario_e_remove_parent_cascades() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    service.add_item(cart.id, BEER, 37).await.unwrap();
    service.add_item(cart.id, SNACK, 1).await.unwrap();

    let cart = service.remove_item(cart.id, BEER).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert!(cart.items.iter().all(|item| !item.is_companion()));
    assert_eq!(cart.total_price, Decimal::new(399, 2));
}

#[tokio::test]
async fn test_quantity_change_keeps_companion_identity() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    let before = service.add_item(cart.id, BEER, 30).await.unwrap();
    let keg_l = companions(&before, BEER)[&KEG_L].clone();
    assert_eq!(keg_l.quantity, 2);

    let after = service.update_item_quantity(cart.id, BEER, 45).await.unwrap();

    let updated = &companions(&after, BEER)[&KEG_L];
    assert_eq!(updated.id, keg_l.id);
    assert_eq!(updated.created_at, keg_l.created_at);
    assert_eq!(updated.quantity, 3);
    assert_eq!(picks(&after, BEER).len(), 1);
}

#[tokio::test]
async fn test_shrinking_quantity_deletes_unneeded_companions() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    service.add_item(cart.id, BEER, 37).await.unwrap();

    let cart = service.update_item_quantity(cart.id, BEER, 4).await.unwrap();

    assert_eq!(picks(&cart, BEER), BTreeMap::from([(KEG_S, 1)]));
    assert_price_invariant(&service, &cart);
}

#[tokio::test]
async fn test_repeated_update_is_churn_free() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    let first = service.update_item_quantity(cart.id, BEER, 61).await;
    assert!(matches!(first, Err(CartError::LineItemNotFound { .. })));

    let added = service.add_item(cart.id, BEER, 61).await.unwrap();
    let again = service.update_item_quantity(cart.id, BEER, 61).await.unwrap();

    assert_eq!(again.items, added.items);
    assert_eq!(again.version, added.version + 1);
}

#[tokio::test]
async fn test_non_base_unit_variant_is_not_bundled() {
    let service = service();
    let cart = service.create_cart().await.unwrap();

    let cart = service.add_item(cart.id, HALF_LITRE, 30).await.unwrap();

    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.total_price, Decimal::from(45));
}

#[tokio::test]
async fn test_remove_absent_item_is_noop() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    let before = service.add_item(cart.id, SNACK, 1).await.unwrap();

    let after = service.remove_item(cart.id, BEER).await.unwrap();

    assert_eq!(after, before);
}

#[tokio::test]
async fn test_clear_resets_total() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    service.add_item(cart.id, BEER, 37).await.unwrap();
    assert!(!service.is_empty(cart.id).await.unwrap());

    let cart = service.clear(cart.id).await.unwrap();

    assert!(cart.is_empty());
    assert_eq!(cart.total_price, Decimal::ZERO);
    assert!(service.is_empty(cart.id).await.unwrap());
}

#[tokio::test]
async fn test_price_invariant_holds_across_mutations() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    let id = cart.id;

    let steps: Vec<Cart> = vec![
        service.add_item(id, BEER, 7).await.unwrap(),
        service.add_item(id, SNACK, 3).await.unwrap(),
        service.add_item(id, BEER, 30).await.unwrap(),
        service.update_item_quantity(id, BEER, 16).await.unwrap(),
        service.add_item(id, KEG_L, 1).await.unwrap(),
        service.update_item_quantity(id, SNACK, 1).await.unwrap(),
        service.remove_item(id, BEER).await.unwrap(),
        service.update_item_quantity(id, KEG_L, -1).await.unwrap(),
    ];

    for cart in &steps {
        assert_price_invariant(&service, cart);
    }
    let last = steps.last().unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].variant_id, SNACK);
}

#[tokio::test]
async fn test_standalone_container_is_independent_of_companions() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    service.add_item(cart.id, KEG_L, 1).await.unwrap();

    let cart = service.add_item(cart.id, BEER, 15).await.unwrap();

    assert_eq!(cart.find_primary(KEG_L).unwrap().quantity, 1);
    assert_eq!(picks(&cart, BEER), BTreeMap::from([(KEG_L, 1)]));
    assert_eq!(cart.items.len(), 3);
}

#[tokio::test]
async fn test_unknown_variant_and_cart() {
    let service = service();
    let cart = service.create_cart().await.unwrap();

    let result = service.add_item(cart.id, VariantId(999), 1).await;
    assert!(matches!(result, Err(CartError::VariantNotFound { .. })));

    let result = service.get_cart(cart_bundle::CartId::new()).await;
    assert!(matches!(result, Err(CartError::CartNotFound { .. })));
}

#[tokio::test]
async fn test_order_draft_snapshot() {
    let service = service();
    let cart = service.create_cart().await.unwrap();
    assert!(matches!(
        service.order_draft(cart.id).await,
        Err(CartError::EmptyCartOperation { .. })
    ));

    let cart = service.add_item(cart.id, BEER, 37).await.unwrap();
    let draft = service.order_draft(cart.id).await.unwrap();

    assert_eq!(draft.lines.len(), cart.items.len());
    assert_eq!(draft.total_price, cart.total_price);
    assert_eq!(draft.lines.iter().filter(|line| line.is_companion).count(), 2);
    // 下單快照不會清空購物車
    assert!(!service.is_empty(cart.id).await.unwrap());
}
