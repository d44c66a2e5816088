//! Recycle Bin Service - restore and permanent purge of soft-deleted products
//!
//! Restore brings a product back together with its dependency closure
//! (soft-deleted manufacturers, category ancestry, required and bundled
//! products). Permanent delete severs the non-cascading relations and hands
//! the row to the storage layer. Both operate on batches with per-item
//! isolation; partial completion of the steps inside one item is an
//! accepted state, each step is idempotent.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{BatchResult, Product, ProductKind};
use crate::notifications::ProductTagCache;
use crate::repository::CatalogRepository;

/// Recycle bin service for soft-deleted catalog entities
pub struct RecycleBinService<R: CatalogRepository, C: ProductTagCache> {
    repository: Arc<R>,
    tag_cache: Arc<C>,
}

impl<R: CatalogRepository, C: ProductTagCache> RecycleBinService<R, C> {
    /// Create a new RecycleBinService with the given repository and cache hook
    pub fn new(repository: R, tag_cache: C) -> Self {
        Self {
            repository: Arc::new(repository),
            tag_cache: Arc::new(tag_cache),
        }
    }

    /// Restore soft-deleted products together with their dependency closure.
    ///
    /// Requesting a product that is not soft-deleted is a precondition
    /// violation and fails the whole call. Ids with no matching product are
    /// skipped. Each remaining root is processed independently; a failure is
    /// logged and reported without aborting the batch.
    #[instrument(skip(self, product_ids), fields(roots = product_ids.len()))]
    pub async fn restore_products(&self, product_ids: &[Uuid]) -> CatalogResult<BatchResult> {
        let roots = self.repository.get_products(product_ids).await?;
        for root in &roots {
            if !root.deleted {
                return Err(CatalogError::ProductNotInRecycleBin(root.id));
            }
        }

        let mut result = BatchResult::default();
        for root in roots {
            let root_id = root.id;
            match self.restore_closure(root).await {
                Ok(()) => {
                    info!(product_id = %root_id, "Restored product");
                    result.succeeded.push(root_id);
                }
                Err(err) => {
                    error!(product_id = %root_id, error = %err, "Failed to restore product");
                    result.record_failure(root_id, err.to_string());
                }
            }
        }

        if !result.succeeded.is_empty() {
            if let Err(err) = self.tag_cache.invalidate().await {
                warn!(error = %err, "Product tag cache invalidation failed");
            }
        }

        Ok(result)
    }

    /// Permanently purge soft-deleted products.
    ///
    /// Products referenced by an existing order line are excluded up front
    /// and reported as failures; they can never be purged. The remaining
    /// candidates must be soft-deleted (precondition, fails the whole call).
    /// Final removal of each row and its owned collections is the storage
    /// layer's cascade; this service severs the relations that have none.
    #[instrument(skip(self, product_ids), fields(roots = product_ids.len()))]
    pub async fn delete_products_permanently(
        &self,
        product_ids: &[Uuid],
    ) -> CatalogResult<BatchResult> {
        let mut result = BatchResult::default();

        let ordered: HashSet<Uuid> = self
            .repository
            .product_ids_with_order_lines(product_ids)
            .await?
            .into_iter()
            .collect();

        let mut candidates = Vec::new();
        for product in self.repository.get_products(product_ids).await? {
            if ordered.contains(&product.id) {
                warn!(product_id = %product.id, "Skipping purge, product has order lines");
                result.record_failure(product.id, "referenced by existing order lines");
            } else if !product.deleted {
                return Err(CatalogError::ProductNotInRecycleBin(product.id));
            } else {
                candidates.push(product);
            }
        }

        for mut product in candidates {
            let product_id = product.id;
            match self.purge(&mut product).await {
                Ok(()) => {
                    info!(product_id = %product_id, "Permanently deleted product");
                    result.succeeded.push(product_id);
                }
                Err(err) => {
                    error!(product_id = %product_id, error = %err, "Failed to purge product");
                    result.record_failure(product_id, err.to_string());
                }
            }
        }

        Ok(result)
    }

    /// Restore one root and everything it pulls back in.
    ///
    /// The required-product graph may contain cycles (products mutually
    /// requiring each other), so the traversal runs over an explicit
    /// worklist with a visited set; ids seen twice are silently skipped.
    async fn restore_closure(&self, root: Product) -> CatalogResult<()> {
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut worklist: VecDeque<Product> = VecDeque::from([root]);

        while let Some(mut product) = worklist.pop_front() {
            if !visited.insert(product.id) {
                continue;
            }

            let manufacturer_ids = self.repository.deleted_manufacturer_ids(product.id).await?;
            let category_ids = self.collect_category_ancestry(product.id).await?;

            let mut dependent_ids = product.required_product_id_list();
            if product.kind == ProductKind::Bundle {
                for item in self.repository.get_bundle_items(product.id).await? {
                    if !dependent_ids.contains(&item.product_id) {
                        dependent_ids.push(item.product_id);
                    }
                }
            }

            // The root comes back first so dependents that reference it
            // are not rejected on foreign keys.
            product.deleted = false;
            product.updated_at = Utc::now();
            self.repository.update_product(&product).await?;

            if !manufacturer_ids.is_empty() {
                self.repository.restore_manufacturers(&manufacturer_ids).await?;
            }
            if !category_ids.is_empty() {
                self.repository.restore_categories(&category_ids).await?;
            }

            dependent_ids.retain(|id| !visited.contains(id));
            if !dependent_ids.is_empty() {
                for dependent in self.repository.get_products(&dependent_ids).await? {
                    if dependent.deleted {
                        worklist.push_back(dependent);
                    }
                }
            }
        }

        Ok(())
    }

    /// Categories assigned to the product plus all their ancestors,
    /// walked over the parent-pointer tree with a visited set.
    async fn collect_category_ancestry(&self, product_id: Uuid) -> CatalogResult<Vec<Uuid>> {
        let mut visited: HashSet<Uuid> = HashSet::new();
        let mut pending = self.repository.get_product_category_ids(product_id).await?;

        while !pending.is_empty() {
            pending.retain(|id| !visited.contains(id));
            if pending.is_empty() {
                break;
            }

            let categories = self.repository.get_categories(&pending).await?;
            visited.extend(pending.drain(..));

            for category in categories {
                if let Some(parent_id) = category.parent_id {
                    if !visited.contains(&parent_id) {
                        pending.push(parent_id);
                    }
                }
            }
        }

        Ok(visited.into_iter().collect())
    }

    async fn purge(&self, product: &mut Product) -> CatalogResult<()> {
        // Sever the nullable references the storage layer would reject
        // deleting under.
        product.delivery_time_id = None;
        product.quantity_unit_id = None;
        product.sample_download_id = None;
        product.country_of_origin_id = None;
        product.compare_price_label_id = None;
        product.main_picture_id = None;
        product.updated_at = Utc::now();
        self.repository.update_product(product).await?;

        match product.kind {
            ProductKind::Grouped => {
                // Children stay, orphaned from the group.
                self.repository.clear_grouped_children(product.id).await?;
            }
            ProductKind::Bundle => {
                let bundle_item_ids: Vec<Uuid> = self
                    .repository
                    .get_bundle_items(product.id)
                    .await?
                    .iter()
                    .map(|item| item.id)
                    .collect();
                if !bundle_item_ids.is_empty() {
                    self.repository
                        .delete_cart_items_for_bundle_items(&bundle_item_ids)
                        .await?;
                }
            }
            ProductKind::Simple => {}
        }

        let review_ids = self.repository.get_product_review_ids(product.id).await?;
        if !review_ids.is_empty() {
            self.repository.delete_review_helpfulness(&review_ids).await?;
        }

        self.repository.delete_product(product.id).await?;
        Ok(())
    }
}

impl<R: CatalogRepository, C: ProductTagCache> Clone for RecycleBinService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            tag_cache: Arc::clone(&self.tag_cache),
        }
    }
}
