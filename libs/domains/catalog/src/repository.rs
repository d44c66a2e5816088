use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{
    AttributeCombination, AttributeSelection, AttributeValue, BundleItem, Category, Manufacturer,
    OrderItem, Product, ProductReview, RelationEdge, RelationKind, ShoppingCartItem,
};

/// Repository trait for catalog persistence
///
/// This trait defines the data access interface consumed by the catalog
/// services. Implementations can use different storage backends; atomicity
/// is per call, there is no transactional envelope across calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Get a product by ID, including soft-deleted ones
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>>;

    /// Get many products by ID; missing ids are silently omitted
    async fn get_products(&self, ids: &[Uuid]) -> CatalogResult<Vec<Product>>;

    /// Persist a mutated product entity
    async fn update_product(&self, product: &Product) -> CatalogResult<()>;

    /// Remove a product row; owned collections (reviews, bundle items,
    /// mappings, edges) are removed by the storage layer's cascade
    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool>;

    /// Clear the group parent pointer on all children of a grouped product
    async fn clear_grouped_children(&self, parent_id: Uuid) -> CatalogResult<u64>;

    /// Find the attribute combination matching a selection, if any
    async fn find_attribute_combination(
        &self,
        product_id: Uuid,
        selection: &AttributeSelection,
    ) -> CatalogResult<Option<AttributeCombination>>;

    /// Persist a mutated attribute combination
    async fn update_attribute_combination(
        &self,
        combination: &AttributeCombination,
    ) -> CatalogResult<()>;

    /// Get attribute values by ID; missing ids are silently omitted
    async fn get_attribute_values(&self, ids: &[Uuid]) -> CatalogResult<Vec<AttributeValue>>;

    /// Components of a bundle product
    async fn get_bundle_items(&self, bundle_product_id: Uuid) -> CatalogResult<Vec<BundleItem>>;

    /// Targets of forward edges from a product, restricted to targets that
    /// pass the standard visibility filter, ordered by display order
    async fn related_product_ids(
        &self,
        kind: RelationKind,
        product_id: Uuid,
    ) -> CatalogResult<Vec<Uuid>>;

    /// All edges whose target lies in the given set
    async fn edges_into(
        &self,
        kind: RelationKind,
        target_ids: &[Uuid],
    ) -> CatalogResult<Vec<RelationEdge>>;

    /// Highest display order among edges originating at a product
    async fn max_display_order(
        &self,
        kind: RelationKind,
        source_id: Uuid,
    ) -> CatalogResult<Option<i32>>;

    /// Insert new edges in one commit; returns the number inserted
    async fn insert_edges(
        &self,
        kind: RelationKind,
        edges: Vec<RelationEdge>,
    ) -> CatalogResult<usize>;

    /// Ids of categories directly assigned to a product
    async fn get_product_category_ids(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>>;

    /// Get categories by ID, including soft-deleted ones
    async fn get_categories(&self, ids: &[Uuid]) -> CatalogResult<Vec<Category>>;

    /// Ids of soft-deleted manufacturers linked to a product
    async fn deleted_manufacturer_ids(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>>;

    /// Bulk-clear the soft-delete flag on categories; returns rows affected
    async fn restore_categories(&self, ids: &[Uuid]) -> CatalogResult<u64>;

    /// Bulk-clear the soft-delete flag on manufacturers; returns rows affected
    async fn restore_manufacturers(&self, ids: &[Uuid]) -> CatalogResult<u64>;

    /// Subset of the given ids that appear as the product of an order line
    async fn product_ids_with_order_lines(&self, ids: &[Uuid]) -> CatalogResult<Vec<Uuid>>;

    /// Delete cart lines referencing any of the given bundle items; the
    /// storage layer has no cascade for this relation
    async fn delete_cart_items_for_bundle_items(
        &self,
        bundle_item_ids: &[Uuid],
    ) -> CatalogResult<u64>;

    /// Ids of a product's own reviews
    async fn get_product_review_ids(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>>;

    /// Delete helpfulness rows for the given reviews; the storage layer has
    /// no cascade for this relation
    async fn delete_review_helpfulness(&self, review_ids: &[Uuid]) -> CatalogResult<u64>;
}

#[derive(Debug, Default)]
struct CatalogStore {
    products: HashMap<Uuid, Product>,
    combinations: Vec<AttributeCombination>,
    attribute_values: HashMap<Uuid, AttributeValue>,
    bundle_items: Vec<BundleItem>,
    related_edges: Vec<RelationEdge>,
    cross_sell_edges: Vec<RelationEdge>,
    categories: HashMap<Uuid, Category>,
    manufacturers: HashMap<Uuid, Manufacturer>,
    product_categories: Vec<(Uuid, Uuid)>,
    product_manufacturers: Vec<(Uuid, Uuid)>,
    order_items: Vec<OrderItem>,
    cart_items: Vec<ShoppingCartItem>,
    reviews: Vec<ProductReview>,
    review_helpfulness: Vec<(Uuid, Uuid)>,
}

impl CatalogStore {
    fn edges(&self, kind: RelationKind) -> &Vec<RelationEdge> {
        match kind {
            RelationKind::Related => &self.related_edges,
            RelationKind::CrossSell => &self.cross_sell_edges,
        }
    }

    fn edges_mut(&mut self, kind: RelationKind) -> &mut Vec<RelationEdge> {
        match kind {
            RelationKind::Related => &mut self.related_edges,
            RelationKind::CrossSell => &mut self.cross_sell_edges,
        }
    }
}

/// In-memory implementation of CatalogRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalogRepository {
    store: Arc<RwLock<CatalogStore>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        let mut store = self.store.write().await;
        store.products.insert(product.id, product);
    }

    pub async fn insert_category(&self, category: Category) {
        let mut store = self.store.write().await;
        store.categories.insert(category.id, category);
    }

    pub async fn insert_manufacturer(&self, manufacturer: Manufacturer) {
        let mut store = self.store.write().await;
        store.manufacturers.insert(manufacturer.id, manufacturer);
    }

    pub async fn assign_category(&self, product_id: Uuid, category_id: Uuid) {
        let mut store = self.store.write().await;
        store.product_categories.push((product_id, category_id));
    }

    pub async fn assign_manufacturer(&self, product_id: Uuid, manufacturer_id: Uuid) {
        let mut store = self.store.write().await;
        store.product_manufacturers.push((product_id, manufacturer_id));
    }

    pub async fn insert_attribute_value(&self, value: AttributeValue) {
        let mut store = self.store.write().await;
        store.attribute_values.insert(value.id, value);
    }

    pub async fn insert_attribute_combination(&self, combination: AttributeCombination) {
        let mut store = self.store.write().await;
        store.combinations.push(combination);
    }

    pub async fn insert_bundle_item(&self, item: BundleItem) {
        let mut store = self.store.write().await;
        store.bundle_items.push(item);
    }

    pub async fn insert_edge(&self, kind: RelationKind, edge: RelationEdge) {
        let mut store = self.store.write().await;
        store.edges_mut(kind).push(edge);
    }

    pub async fn insert_order_item(&self, item: OrderItem) {
        let mut store = self.store.write().await;
        store.order_items.push(item);
    }

    pub async fn insert_cart_item(&self, item: ShoppingCartItem) {
        let mut store = self.store.write().await;
        store.cart_items.push(item);
    }

    pub async fn insert_review(&self, review: ProductReview) {
        let mut store = self.store.write().await;
        store.reviews.push(review);
    }

    pub async fn insert_review_helpfulness(&self, id: Uuid, review_id: Uuid) {
        let mut store = self.store.write().await;
        store.review_helpfulness.push((id, review_id));
    }

    /// Snapshot of all edges of a kind, for inspection in tests
    pub async fn edges(&self, kind: RelationKind) -> Vec<RelationEdge> {
        let store = self.store.read().await;
        store.edges(kind).clone()
    }

    /// Snapshot of all cart lines, for inspection in tests
    pub async fn cart_items(&self) -> Vec<ShoppingCartItem> {
        let store = self.store.read().await;
        store.cart_items.clone()
    }

    /// Count of helpfulness rows, for inspection in tests
    pub async fn review_helpfulness_count(&self) -> usize {
        let store = self.store.read().await;
        store.review_helpfulness.len()
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn get_product(&self, id: Uuid) -> CatalogResult<Option<Product>> {
        let store = self.store.read().await;
        Ok(store.products.get(&id).cloned())
    }

    async fn get_products(&self, ids: &[Uuid]) -> CatalogResult<Vec<Product>> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.products.get(id).cloned()).collect())
    }

    async fn update_product(&self, product: &Product) -> CatalogResult<()> {
        let mut store = self.store.write().await;
        store.products.insert(product.id, product.clone());
        Ok(())
    }

    async fn delete_product(&self, id: Uuid) -> CatalogResult<bool> {
        let mut store = self.store.write().await;
        let existed = store.products.remove(&id).is_some();
        if existed {
            // Stand-in for the storage layer's cascade over owned rows.
            store.combinations.retain(|c| c.product_id != id);
            store.bundle_items.retain(|b| b.bundle_product_id != id);
            store.product_categories.retain(|(p, _)| *p != id);
            store.product_manufacturers.retain(|(p, _)| *p != id);
            store.cart_items.retain(|c| c.product_id != id);
            let review_ids: Vec<Uuid> = store
                .reviews
                .iter()
                .filter(|r| r.product_id == id)
                .map(|r| r.id)
                .collect();
            store.reviews.retain(|r| r.product_id != id);
            store
                .review_helpfulness
                .retain(|(_, review_id)| !review_ids.contains(review_id));
            store
                .related_edges
                .retain(|e| e.product_id1 != id && e.product_id2 != id);
            store
                .cross_sell_edges
                .retain(|e| e.product_id1 != id && e.product_id2 != id);
            tracing::info!(product_id = %id, "Removed product");
        }
        Ok(existed)
    }

    async fn clear_grouped_children(&self, parent_id: Uuid) -> CatalogResult<u64> {
        let mut store = self.store.write().await;
        let mut affected = 0;
        for product in store.products.values_mut() {
            if product.parent_grouped_product_id == Some(parent_id) {
                product.parent_grouped_product_id = None;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn find_attribute_combination(
        &self,
        product_id: Uuid,
        selection: &AttributeSelection,
    ) -> CatalogResult<Option<AttributeCombination>> {
        let store = self.store.read().await;
        Ok(store
            .combinations
            .iter()
            .find(|c| c.product_id == product_id && &c.selection == selection)
            .cloned())
    }

    async fn update_attribute_combination(
        &self,
        combination: &AttributeCombination,
    ) -> CatalogResult<()> {
        let mut store = self.store.write().await;
        if let Some(existing) = store.combinations.iter_mut().find(|c| c.id == combination.id) {
            *existing = combination.clone();
        } else {
            store.combinations.push(combination.clone());
        }
        Ok(())
    }

    async fn get_attribute_values(&self, ids: &[Uuid]) -> CatalogResult<Vec<AttributeValue>> {
        let store = self.store.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| store.attribute_values.get(id).cloned())
            .collect())
    }

    async fn get_bundle_items(&self, bundle_product_id: Uuid) -> CatalogResult<Vec<BundleItem>> {
        let store = self.store.read().await;
        Ok(store
            .bundle_items
            .iter()
            .filter(|b| b.bundle_product_id == bundle_product_id)
            .cloned()
            .collect())
    }

    async fn related_product_ids(
        &self,
        kind: RelationKind,
        product_id: Uuid,
    ) -> CatalogResult<Vec<Uuid>> {
        let store = self.store.read().await;
        let mut edges: Vec<&RelationEdge> = store
            .edges(kind)
            .iter()
            .filter(|e| e.product_id1 == product_id)
            .collect();
        edges.sort_by_key(|e| e.display_order);

        let mut ids = Vec::new();
        for edge in edges {
            let visible = store
                .products
                .get(&edge.product_id2)
                .is_some_and(|p| p.is_visible());
            if visible && !ids.contains(&edge.product_id2) {
                ids.push(edge.product_id2);
            }
        }
        Ok(ids)
    }

    async fn edges_into(
        &self,
        kind: RelationKind,
        target_ids: &[Uuid],
    ) -> CatalogResult<Vec<RelationEdge>> {
        let store = self.store.read().await;
        Ok(store
            .edges(kind)
            .iter()
            .filter(|e| target_ids.contains(&e.product_id2))
            .copied()
            .collect())
    }

    async fn max_display_order(
        &self,
        kind: RelationKind,
        source_id: Uuid,
    ) -> CatalogResult<Option<i32>> {
        let store = self.store.read().await;
        Ok(store
            .edges(kind)
            .iter()
            .filter(|e| e.product_id1 == source_id)
            .map(|e| e.display_order)
            .max())
    }

    async fn insert_edges(
        &self,
        kind: RelationKind,
        edges: Vec<RelationEdge>,
    ) -> CatalogResult<usize> {
        let mut store = self.store.write().await;
        let created = edges.len();
        store.edges_mut(kind).extend(edges);
        Ok(created)
    }

    async fn get_product_category_ids(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>> {
        let store = self.store.read().await;
        Ok(store
            .product_categories
            .iter()
            .filter(|(p, _)| *p == product_id)
            .map(|(_, c)| *c)
            .collect())
    }

    async fn get_categories(&self, ids: &[Uuid]) -> CatalogResult<Vec<Category>> {
        let store = self.store.read().await;
        Ok(ids.iter().filter_map(|id| store.categories.get(id).cloned()).collect())
    }

    async fn deleted_manufacturer_ids(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>> {
        let store = self.store.read().await;
        Ok(store
            .product_manufacturers
            .iter()
            .filter(|(p, _)| *p == product_id)
            .filter_map(|(_, m)| store.manufacturers.get(m))
            .filter(|m| m.deleted)
            .map(|m| m.id)
            .collect())
    }

    async fn restore_categories(&self, ids: &[Uuid]) -> CatalogResult<u64> {
        let mut store = self.store.write().await;
        let mut affected = 0;
        for id in ids {
            if let Some(category) = store.categories.get_mut(id) {
                if category.deleted {
                    category.deleted = false;
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    async fn restore_manufacturers(&self, ids: &[Uuid]) -> CatalogResult<u64> {
        let mut store = self.store.write().await;
        let mut affected = 0;
        for id in ids {
            if let Some(manufacturer) = store.manufacturers.get_mut(id) {
                if manufacturer.deleted {
                    manufacturer.deleted = false;
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    async fn product_ids_with_order_lines(&self, ids: &[Uuid]) -> CatalogResult<Vec<Uuid>> {
        let store = self.store.read().await;
        let mut referenced = Vec::new();
        for item in &store.order_items {
            if ids.contains(&item.product_id) && !referenced.contains(&item.product_id) {
                referenced.push(item.product_id);
            }
        }
        Ok(referenced)
    }

    async fn delete_cart_items_for_bundle_items(
        &self,
        bundle_item_ids: &[Uuid],
    ) -> CatalogResult<u64> {
        let mut store = self.store.write().await;
        let before = store.cart_items.len();
        store.cart_items.retain(|item| {
            item.bundle_item_id
                .is_none_or(|id| !bundle_item_ids.contains(&id))
        });
        Ok((before - store.cart_items.len()) as u64)
    }

    async fn get_product_review_ids(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>> {
        let store = self.store.read().await;
        Ok(store
            .reviews
            .iter()
            .filter(|r| r.product_id == product_id)
            .map(|r| r.id)
            .collect())
    }

    async fn delete_review_helpfulness(&self, review_ids: &[Uuid]) -> CatalogResult<u64> {
        let mut store = self.store.write().await;
        let before = store.review_helpfulness.len();
        store
            .review_helpfulness
            .retain(|(_, review_id)| !review_ids.contains(review_id));
        Ok((before - store.review_helpfulness.len()) as u64)
    }
}
