//! Integration tests for the catalog domain
//!
//! These tests drive the services end-to-end over the in-memory repository
//! to ensure:
//! - Stock adjustments propagate through combinations, bundles, and linkages
//! - Low-stock business rules derive the publish/button flags correctly
//! - Relation graph completion is symmetric and idempotent
//! - Recycle-bin restore and permanent delete preserve referential rules

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use domain_catalog::*;

fn simple_product(name: &str) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.to_string(),
        sku: None,
        kind: ProductKind::Simple,
        parent_grouped_product_id: None,
        inventory_tracking: InventoryTracking::Untracked,
        stock_quantity: 0,
        min_stock_quantity: 0,
        notify_admin_below_quantity: 0,
        low_stock_action: LowStockAction::Nothing,
        published: true,
        disable_buy_button: false,
        disable_wishlist_button: false,
        bundle_per_item_shopping_cart: false,
        required_product_ids: None,
        deleted: false,
        delivery_time_id: None,
        quantity_unit_id: None,
        sample_download_id: None,
        country_of_origin_id: None,
        compare_price_label_id: None,
        main_picture_id: None,
        created_at: now,
        updated_at: now,
    }
}

fn stocked_product(name: &str, stock: i32) -> Product {
    let mut product = simple_product(name);
    product.inventory_tracking = InventoryTracking::TrackByProduct;
    product.stock_quantity = stock;
    product
}

fn category(name: &str, parent_id: Option<Uuid>, deleted: bool) -> Category {
    Category {
        id: Uuid::new_v4(),
        name: name.to_string(),
        parent_id,
        deleted,
    }
}

fn inventory_service(
    repo: &InMemoryCatalogRepository,
) -> InventoryService<InMemoryCatalogRepository, NoopLowStockNotifier> {
    InventoryService::new(repo.clone(), NoopLowStockNotifier, InventorySettings::default())
}

/// Notifier that records every dispatch together with the stock level
/// observed on the passed entity.
#[derive(Clone, Default)]
struct RecordingNotifier {
    dispatches: Arc<Mutex<Vec<(Uuid, i32, Uuid)>>>,
}

#[async_trait]
impl LowStockNotifier for RecordingNotifier {
    async fn notify_low_stock(&self, product: &Product, language_id: Uuid) -> CatalogResult<()> {
        self.dispatches
            .lock()
            .await
            .push((product.id, product.stock_quantity, language_id));
        Ok(())
    }
}

/// Cache hook that counts invalidations.
#[derive(Clone, Default)]
struct CountingTagCache {
    invalidations: Arc<AtomicUsize>,
}

#[async_trait]
impl ProductTagCache for CountingTagCache {
    async fn invalidate(&self) -> CatalogResult<()> {
        self.invalidations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// ============================================================================
// Inventory Tests
// ============================================================================

#[tokio::test]
async fn test_stock_round_trip_restores_the_original_quantity() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);
    let mut product = stocked_product("round-trip", 10);
    repo.insert_product(product.clone()).await;

    service
        .adjust_inventory(&mut product, None, &StockAdjustment::decrease(7))
        .await
        .unwrap();
    assert_eq!(product.stock_quantity, 3);

    let result = service
        .adjust_inventory(&mut product, None, &StockAdjustment::increase(7))
        .await
        .unwrap();

    assert_eq!(result.stock_quantity_old, 3);
    assert_eq!(result.stock_quantity_new, 10);
    assert_eq!(
        repo.get_product(product.id).await.unwrap().unwrap().stock_quantity,
        10,
        "persisted counter should match the entity"
    );
}

#[tokio::test]
async fn test_unpublish_low_stock_rule_crossing_the_floor() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);

    let mut product = stocked_product("low-stock", 10);
    product.min_stock_quantity = 5;
    product.low_stock_action = LowStockAction::Unpublish;
    repo.insert_product(product.clone()).await;

    let result = service
        .adjust_inventory(&mut product, None, &StockAdjustment::decrease(6))
        .await
        .unwrap();

    assert_eq!(result.stock_quantity_new, 4);
    assert!(!product.published, "crossing the floor should unpublish");

    service
        .adjust_inventory(&mut product, None, &StockAdjustment::increase(6))
        .await
        .unwrap();
    assert!(product.published, "crossing back should republish");
}

#[tokio::test]
async fn test_disable_buy_button_rule_suppresses_buttons() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);

    let mut product = stocked_product("buttons", 6);
    product.min_stock_quantity = 5;
    product.low_stock_action = LowStockAction::DisableBuyButton;
    repo.insert_product(product.clone()).await;

    service
        .adjust_inventory(&mut product, None, &StockAdjustment::decrease(1))
        .await
        .unwrap();

    assert!(product.disable_buy_button);
    assert!(product.disable_wishlist_button);
    assert!(product.published, "buy-button rule must not unpublish");

    service
        .adjust_inventory(&mut product, None, &StockAdjustment::increase(10))
        .await
        .unwrap();
    assert!(!product.disable_buy_button);
    assert!(!product.disable_wishlist_button);
}

#[tokio::test]
async fn test_attribute_tracked_stock_moves_only_the_combination() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);

    let mut product = simple_product("variant");
    product.inventory_tracking = InventoryTracking::TrackByAttributes;
    product.stock_quantity = 42;
    repo.insert_product(product.clone()).await;

    let mut selection = AttributeSelection::new();
    selection.add(Uuid::new_v4(), Uuid::new_v4());
    repo.insert_attribute_combination(AttributeCombination {
        id: Uuid::new_v4(),
        product_id: product.id,
        selection: selection.clone(),
        stock_quantity: 9,
    })
    .await;

    let result = service
        .adjust_inventory(&mut product, Some(&selection), &StockAdjustment::decrease(4))
        .await
        .unwrap();
    assert_eq!(result.stock_quantity_old, 9);
    assert_eq!(result.stock_quantity_new, 5);
    assert_eq!(product.stock_quantity, 42, "product counter is independent");

    let result = service
        .adjust_inventory(&mut product, Some(&selection), &StockAdjustment::increase(4))
        .await
        .unwrap();
    assert_eq!(result.stock_quantity_new, 9, "round trip restores the combination");
}

#[tokio::test]
async fn test_linked_products_follow_the_host_adjustment() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);

    let linked = stocked_product("linked", 100);
    repo.insert_product(linked.clone()).await;

    let attribute_id = Uuid::new_v4();
    let value = AttributeValue {
        id: Uuid::new_v4(),
        attribute_id,
        value_type: AttributeValueKind::ProductLinkage,
        linked_product_id: Some(linked.id),
        quantity: 3,
    };
    repo.insert_attribute_value(value.clone()).await;

    let mut selection = AttributeSelection::new();
    selection.add(attribute_id, value.id);

    let mut host = stocked_product("host", 50);
    repo.insert_product(host.clone()).await;

    service
        .adjust_inventory(&mut host, Some(&selection), &StockAdjustment::decrease(2))
        .await
        .unwrap();

    assert_eq!(host.stock_quantity, 48);
    let linked_after = repo.get_product(linked.id).await.unwrap().unwrap();
    assert_eq!(linked_after.stock_quantity, 94, "2 x multiplier 3 = 6 units");
}

#[tokio::test]
async fn test_per_item_bundle_order_adjusts_components_only() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);

    let component_a = stocked_product("component-a", 30);
    let component_b = stocked_product("component-b", 30);
    let mut bundle = stocked_product("bundle", 99);
    bundle.kind = ProductKind::Bundle;
    bundle.bundle_per_item_shopping_cart = true;

    repo.insert_product(component_a.clone()).await;
    repo.insert_product(component_b.clone()).await;
    repo.insert_product(bundle.clone()).await;

    let bundle_data = vec![
        BundleItemOrderData { product_id: component_a.id, quantity: 2 },
        BundleItemOrderData { product_id: component_b.id, quantity: 1 },
    ];
    let order_item = OrderItem {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        product_id: bundle.id,
        quantity: 4,
        attributes_json: None,
        bundle_data_json: Some(serde_json::to_string(&bundle_data).unwrap()),
    };

    let result = service
        .adjust_inventory_for_order_item(&order_item, &StockAdjustment::decrease(4))
        .await
        .unwrap();

    assert_eq!(result, AdjustInventoryResult::default(), "bundle parent reports no change");

    let a = repo.get_product(component_a.id).await.unwrap().unwrap();
    let b = repo.get_product(component_b.id).await.unwrap().unwrap();
    let parent = repo.get_product(bundle.id).await.unwrap().unwrap();
    assert_eq!(a.stock_quantity, 22, "4 x 2 units off component a");
    assert_eq!(b.stock_quantity, 26, "4 x 1 units off component b");
    assert_eq!(parent.stock_quantity, 99, "parent counter is never touched");
}

#[tokio::test]
async fn test_order_item_for_a_plain_product_uses_the_recorded_selection() {
    let repo = InMemoryCatalogRepository::new();
    let service = inventory_service(&repo);

    let mut product = simple_product("ordered-variant");
    product.inventory_tracking = InventoryTracking::TrackByAttributes;
    repo.insert_product(product.clone()).await;

    let mut selection = AttributeSelection::new();
    selection.add(Uuid::new_v4(), Uuid::new_v4());
    repo.insert_attribute_combination(AttributeCombination {
        id: Uuid::new_v4(),
        product_id: product.id,
        selection: selection.clone(),
        stock_quantity: 20,
    })
    .await;

    let order_item = OrderItem {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        product_id: product.id,
        quantity: 5,
        attributes_json: Some(serde_json::to_string(&selection).unwrap()),
        bundle_data_json: None,
    };

    let result = service
        .adjust_inventory_for_order_item(&order_item, &StockAdjustment::decrease(5))
        .await
        .unwrap();

    assert_eq!(result.stock_quantity_old, 20);
    assert_eq!(result.stock_quantity_new, 15);
}

#[tokio::test]
async fn test_low_stock_notification_carries_the_mutated_entity() {
    let repo = InMemoryCatalogRepository::new();
    let notifier = RecordingNotifier::default();
    let language_id = Uuid::new_v4();
    let service = InventoryService::new(
        repo.clone(),
        notifier.clone(),
        InventorySettings { notification_language_id: language_id },
    );

    let mut product = stocked_product("notify", 10);
    product.notify_admin_below_quantity = 5;
    repo.insert_product(product.clone()).await;

    // Down to 6: threshold not crossed.
    service
        .adjust_inventory(&mut product, None, &StockAdjustment::decrease(4))
        .await
        .unwrap();
    assert!(notifier.dispatches.lock().await.is_empty());

    // Down to 2: crossed.
    service
        .adjust_inventory(&mut product, None, &StockAdjustment::decrease(4))
        .await
        .unwrap();

    let dispatches = notifier.dispatches.lock().await;
    assert_eq!(dispatches.len(), 1);
    assert_eq!(dispatches[0], (product.id, 2, language_id));
}

// ============================================================================
// Relation Graph Tests
// ============================================================================

#[tokio::test]
async fn test_single_edge_is_completed_with_its_reciprocal() {
    let repo = InMemoryCatalogRepository::new();
    let service = RelationService::new(repo.clone());

    let a = simple_product("a");
    let b = simple_product("b");
    repo.insert_product(a.clone()).await;
    repo.insert_product(b.clone()).await;

    // B already recommends an unrelated product at order 4.
    let other = simple_product("other");
    repo.insert_product(other.clone()).await;
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: b.id, product_id2: other.id, display_order: 4 },
    )
    .await;
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: a.id, product_id2: b.id, display_order: 1 },
    )
    .await;

    let created = service
        .ensure_mutual_relations(a.id, RelationKind::Related)
        .await
        .unwrap();
    assert_eq!(created, 1);

    let edges = repo.edges(RelationKind::Related).await;
    let reciprocal = edges
        .iter()
        .find(|e| e.product_id1 == b.id && e.product_id2 == a.id)
        .expect("reciprocal edge should exist");
    assert_eq!(reciprocal.display_order, 5, "previous max for B + 1");
}

#[tokio::test]
async fn test_cluster_completion_is_symmetric_and_idempotent() {
    let repo = InMemoryCatalogRepository::new();
    let service = RelationService::new(repo.clone());

    let a = simple_product("a");
    let b = simple_product("b");
    let c = simple_product("c");
    for p in [&a, &b, &c] {
        repo.insert_product(p.clone()).await;
    }
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: a.id, product_id2: b.id, display_order: 1 },
    )
    .await;
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: a.id, product_id2: c.id, display_order: 2 },
    )
    .await;

    let created = service
        .ensure_mutual_relations(a.id, RelationKind::Related)
        .await
        .unwrap();
    assert_eq!(created, 4, "b->a, b->c, c->a, c->b");

    let edges = repo.edges(RelationKind::Related).await;
    let cluster = [a.id, b.id, c.id];
    for source in cluster {
        for target in cluster {
            if source == target {
                continue;
            }
            assert!(
                edges
                    .iter()
                    .any(|e| e.product_id1 == source && e.product_id2 == target),
                "edge {source} -> {target} should exist"
            );
        }
    }
    assert!(
        edges.iter().all(|e| e.product_id1 != e.product_id2),
        "no self links"
    );

    let created_again = service
        .ensure_mutual_relations(a.id, RelationKind::Related)
        .await
        .unwrap();
    assert_eq!(created_again, 0, "second run creates nothing");
    assert_eq!(repo.edges(RelationKind::Related).await.len(), edges.len());
}

#[tokio::test]
async fn test_new_edges_for_one_source_have_increasing_display_orders() {
    let repo = InMemoryCatalogRepository::new();
    let service = RelationService::new(repo.clone());

    let a = simple_product("a");
    let b = simple_product("b");
    let c = simple_product("c");
    for p in [&a, &b, &c] {
        repo.insert_product(p.clone()).await;
    }
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: a.id, product_id2: b.id, display_order: 1 },
    )
    .await;
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: a.id, product_id2: c.id, display_order: 2 },
    )
    .await;

    service
        .ensure_mutual_relations(a.id, RelationKind::Related)
        .await
        .unwrap();

    let edges = repo.edges(RelationKind::Related).await;
    let mut b_orders: Vec<i32> = edges
        .iter()
        .filter(|e| e.product_id1 == b.id)
        .map(|e| e.display_order)
        .collect();
    b_orders.sort();
    assert_eq!(b_orders, vec![1, 2], "fresh source starts at 1 and increments");
}

#[tokio::test]
async fn test_hidden_products_stay_out_of_the_cluster() {
    let repo = InMemoryCatalogRepository::new();
    let service = RelationService::new(repo.clone());

    let a = simple_product("a");
    let mut hidden = simple_product("hidden");
    hidden.published = false;
    repo.insert_product(a.clone()).await;
    repo.insert_product(hidden.clone()).await;
    repo.insert_edge(
        RelationKind::Related,
        RelationEdge { product_id1: a.id, product_id2: hidden.id, display_order: 1 },
    )
    .await;

    let created = service
        .ensure_mutual_relations(a.id, RelationKind::Related)
        .await
        .unwrap();

    assert_eq!(created, 0, "a cluster of hidden targets needs no edges");
}

#[tokio::test]
async fn test_cross_sell_completion_has_no_ordering() {
    let repo = InMemoryCatalogRepository::new();
    let service = RelationService::new(repo.clone());

    let a = simple_product("a");
    let b = simple_product("b");
    repo.insert_product(a.clone()).await;
    repo.insert_product(b.clone()).await;
    repo.insert_edge(
        RelationKind::CrossSell,
        RelationEdge { product_id1: a.id, product_id2: b.id, display_order: 0 },
    )
    .await;

    let created = service
        .ensure_mutual_relations(a.id, RelationKind::CrossSell)
        .await
        .unwrap();
    assert_eq!(created, 1);

    let edges = repo.edges(RelationKind::CrossSell).await;
    assert!(edges.iter().all(|e| e.display_order == 0));
    assert!(repo.edges(RelationKind::Related).await.is_empty(), "graphs are independent");
}

// ============================================================================
// Recycle Bin Tests
// ============================================================================

#[tokio::test]
async fn test_restore_brings_back_the_dependency_closure() {
    let repo = InMemoryCatalogRepository::new();
    let cache = CountingTagCache::default();
    let service = RecycleBinService::new(repo.clone(), cache.clone());

    // Category tree: root -> mid -> leaf, all binned.
    let root_category = category("root", None, true);
    let mid_category = category("mid", Some(root_category.id), true);
    let leaf_category = category("leaf", Some(mid_category.id), true);
    let unrelated_category = category("unrelated", None, true);
    for c in [&root_category, &mid_category, &leaf_category, &unrelated_category] {
        repo.insert_category(c.clone()).await;
    }

    let manufacturer = Manufacturer { id: Uuid::new_v4(), name: "acme".to_string(), deleted: true };
    repo.insert_manufacturer(manufacturer.clone()).await;

    let mut required = simple_product("required");
    required.deleted = true;
    repo.insert_product(required.clone()).await;

    let mut product = simple_product("binned");
    product.deleted = true;
    product.required_product_ids = Some(required.id.to_string());
    repo.insert_product(product.clone()).await;
    repo.assign_category(product.id, leaf_category.id).await;
    repo.assign_manufacturer(product.id, manufacturer.id).await;

    let result = service.restore_products(&[product.id]).await.unwrap();
    assert_eq!(result.success_count(), 1);

    assert!(!repo.get_product(product.id).await.unwrap().unwrap().deleted);
    assert!(!repo.get_product(required.id).await.unwrap().unwrap().deleted, "required product restored");
    let categories = repo
        .get_categories(&[root_category.id, mid_category.id, leaf_category.id])
        .await
        .unwrap();
    assert!(categories.iter().all(|c| !c.deleted), "whole ancestry restored");
    let unrelated = repo.get_categories(&[unrelated_category.id]).await.unwrap();
    assert!(unrelated[0].deleted, "categories no restored product references stay binned");
    assert_eq!(cache.invalidations.load(Ordering::SeqCst), 1, "tag cache hit once per batch");
}

#[tokio::test]
async fn test_restore_of_a_bundle_brings_back_deleted_components() {
    let repo = InMemoryCatalogRepository::new();
    let service = RecycleBinService::new(repo.clone(), NoopProductTagCache);

    let mut binned_component = simple_product("binned-component");
    binned_component.deleted = true;
    let live_component = simple_product("live-component");
    repo.insert_product(binned_component.clone()).await;
    repo.insert_product(live_component.clone()).await;

    let mut bundle = simple_product("bundle");
    bundle.kind = ProductKind::Bundle;
    bundle.deleted = true;
    repo.insert_product(bundle.clone()).await;
    repo.insert_bundle_item(BundleItem {
        id: Uuid::new_v4(),
        bundle_product_id: bundle.id,
        product_id: binned_component.id,
        quantity: 1,
    })
    .await;
    repo.insert_bundle_item(BundleItem {
        id: Uuid::new_v4(),
        bundle_product_id: bundle.id,
        product_id: live_component.id,
        quantity: 2,
    })
    .await;

    let result = service.restore_products(&[bundle.id]).await.unwrap();
    assert_eq!(result.success_count(), 1);

    assert!(!repo.get_product(bundle.id).await.unwrap().unwrap().deleted);
    assert!(!repo.get_product(binned_component.id).await.unwrap().unwrap().deleted);
    assert!(!repo.get_product(live_component.id).await.unwrap().unwrap().deleted);
}

#[tokio::test]
async fn test_restore_survives_mutual_requirements() {
    let repo = InMemoryCatalogRepository::new();
    let service = RecycleBinService::new(repo.clone(), NoopProductTagCache);

    let mut a = simple_product("a");
    let mut b = simple_product("b");
    a.deleted = true;
    b.deleted = true;
    a.required_product_ids = Some(b.id.to_string());
    b.required_product_ids = Some(a.id.to_string());
    repo.insert_product(a.clone()).await;
    repo.insert_product(b.clone()).await;

    let result = service.restore_products(&[a.id]).await.unwrap();

    assert_eq!(result.success_count(), 1);
    assert!(!repo.get_product(a.id).await.unwrap().unwrap().deleted);
    assert!(!repo.get_product(b.id).await.unwrap().unwrap().deleted);
}

#[tokio::test]
async fn test_restoring_a_live_product_fails_the_whole_call() {
    let repo = InMemoryCatalogRepository::new();
    let cache = CountingTagCache::default();
    let service = RecycleBinService::new(repo.clone(), cache.clone());

    let live = simple_product("live");
    let mut binned = simple_product("binned");
    binned.deleted = true;
    repo.insert_product(live.clone()).await;
    repo.insert_product(binned.clone()).await;

    let result = service.restore_products(&[binned.id, live.id]).await;

    assert!(matches!(result, Err(CatalogError::ProductNotInRecycleBin(id)) if id == live.id));
    assert!(
        repo.get_product(binned.id).await.unwrap().unwrap().deleted,
        "precondition failure aborts before any restore"
    );
    assert_eq!(cache.invalidations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_permanent_delete_excludes_order_referenced_products() {
    let repo = InMemoryCatalogRepository::new();
    let service = RecycleBinService::new(repo.clone(), NoopProductTagCache);

    let mut ordered = simple_product("ordered");
    ordered.deleted = true;
    let mut purgeable = simple_product("purgeable");
    purgeable.deleted = true;
    repo.insert_product(ordered.clone()).await;
    repo.insert_product(purgeable.clone()).await;
    repo.insert_order_item(OrderItem {
        id: Uuid::new_v4(),
        order_id: Uuid::new_v4(),
        product_id: ordered.id,
        quantity: 1,
        attributes_json: None,
        bundle_data_json: None,
    })
    .await;

    let result = service
        .delete_products_permanently(&[ordered.id, purgeable.id])
        .await
        .unwrap();

    assert_eq!(result.succeeded, vec![purgeable.id]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].product_id, ordered.id);
    assert!(
        repo.get_product(ordered.id).await.unwrap().is_some(),
        "order-referenced product survives"
    );
    assert!(repo.get_product(purgeable.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_permanent_delete_of_a_bundle_cleans_up_cart_lines() {
    let repo = InMemoryCatalogRepository::new();
    let service = RecycleBinService::new(repo.clone(), NoopProductTagCache);

    let component = simple_product("component");
    repo.insert_product(component.clone()).await;

    let mut bundle = simple_product("bundle");
    bundle.kind = ProductKind::Bundle;
    bundle.deleted = true;
    repo.insert_product(bundle.clone()).await;

    let bundle_item = BundleItem {
        id: Uuid::new_v4(),
        bundle_product_id: bundle.id,
        product_id: component.id,
        quantity: 1,
    };
    repo.insert_bundle_item(bundle_item.clone()).await;
    repo.insert_cart_item(ShoppingCartItem {
        id: Uuid::new_v4(),
        product_id: component.id,
        bundle_item_id: Some(bundle_item.id),
    })
    .await;
    // An unrelated cart line stays.
    repo.insert_cart_item(ShoppingCartItem {
        id: Uuid::new_v4(),
        product_id: component.id,
        bundle_item_id: None,
    })
    .await;

    let result = service.delete_products_permanently(&[bundle.id]).await.unwrap();
    assert_eq!(result.success_count(), 1);

    let cart = repo.cart_items().await;
    assert_eq!(cart.len(), 1);
    assert!(cart[0].bundle_item_id.is_none());
}

#[tokio::test]
async fn test_permanent_delete_removes_review_helpfulness() {
    let repo = InMemoryCatalogRepository::new();
    let service = RecycleBinService::new(repo.clone(), NoopProductTagCache);

    let mut product = simple_product("reviewed");
    product.deleted = true;
    product.sample_download_id = Some(Uuid::new_v4());
    repo.insert_product(product.clone()).await;

    let review = ProductReview { id: Uuid::new_v4(), product_id: product.id };
    repo.insert_review(review.clone()).await;
    repo.insert_review_helpfulness(Uuid::new_v4(), review.id).await;
    repo.insert_review_helpfulness(Uuid::new_v4(), review.id).await;

    let result = service.delete_products_permanently(&[product.id]).await.unwrap();

    assert_eq!(result.success_count(), 1);
    assert_eq!(repo.review_helpfulness_count().await, 0);
    assert!(repo.get_product(product.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_permanent_delete_of_a_grouped_parent_orphans_children() {
    let repo = InMemoryCatalogRepository::new();
    let service = RecycleBinService::new(repo.clone(), NoopProductTagCache);

    let mut parent = simple_product("group");
    parent.kind = ProductKind::Grouped;
    parent.deleted = true;
    repo.insert_product(parent.clone()).await;

    let mut child = simple_product("child");
    child.parent_grouped_product_id = Some(parent.id);
    repo.insert_product(child.clone()).await;

    let result = service.delete_products_permanently(&[parent.id]).await.unwrap();
    assert_eq!(result.success_count(), 1);

    let orphan = repo.get_product(child.id).await.unwrap().unwrap();
    assert!(orphan.parent_grouped_product_id.is_none(), "child stays, orphaned");
}
