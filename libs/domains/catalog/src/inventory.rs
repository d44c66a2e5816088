//! Inventory Service - stock adjustment engine
//!
//! Propagates a single stock change through the product itself, its
//! attribute combinations, bundle composition, and attribute-linked
//! products, applying the low-stock business rules along the way.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tracing::{instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::error::{CatalogError, CatalogResult};
use crate::models::{
    AdjustInventoryResult, AttributeSelection, AttributeValueKind, InventoryTracking,
    LowStockAction, OrderItem, Product, ProductKind, StockAdjustment,
};
use crate::notifications::LowStockNotifier;
use crate::repository::CatalogRepository;

/// Linked products are loaded in batches of this size to bound query fan-out.
const LINKED_PRODUCT_CHUNK_SIZE: usize = 100;

/// Settings for the inventory service
#[derive(Debug, Clone, Deserialize)]
pub struct InventorySettings {
    /// Language passed to the low-stock notification collaborator
    pub notification_language_id: Uuid,
}

impl Default for InventorySettings {
    fn default() -> Self {
        Self {
            notification_language_id: Uuid::nil(),
        }
    }
}

/// Inventory service providing the stock adjustment operations
///
/// Mutated entities are written back through the repository before the
/// call returns; there is no transactional envelope across the writes.
pub struct InventoryService<R: CatalogRepository, N: LowStockNotifier> {
    repository: Arc<R>,
    notifier: Arc<N>,
    settings: InventorySettings,
}

impl<R: CatalogRepository, N: LowStockNotifier> InventoryService<R, N> {
    /// Create a new InventoryService with the given repository and notifier
    pub fn new(repository: R, notifier: N, settings: InventorySettings) -> Self {
        Self {
            repository: Arc::new(repository),
            notifier: Arc::new(notifier),
            settings,
        }
    }

    /// Adjust the stock of a product for an attribute selection.
    ///
    /// Returns the old and new counter values of `product` itself (or of its
    /// matching attribute combination when stock is tracked by attributes).
    /// Linked products referenced by the selection are adjusted as a side
    /// effect, scaled by each value's quantity multiplier, and are not
    /// aggregated into the returned result.
    #[instrument(skip(self, product, selection, adjustment), fields(product_id = %product.id))]
    pub async fn adjust_inventory(
        &self,
        product: &mut Product,
        selection: Option<&AttributeSelection>,
        adjustment: &StockAdjustment,
    ) -> CatalogResult<AdjustInventoryResult> {
        adjustment
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let result = self.apply_adjustment(product, selection, adjustment).await?;

        if let Some(selection) = selection {
            self.adjust_linked_products(selection, adjustment).await?;
        }

        Ok(result)
    }

    /// Adjust stock for an order item.
    ///
    /// For a bundle ordered with per-item shopping-cart behavior, the change
    /// is propagated to each component recorded in the order item's bundle
    /// data, scaled by the recorded per-component quantity; the bundle parent
    /// carries no counter of its own in this mode and the returned result is
    /// empty. All other products are adjusted directly, using the attribute
    /// selection recorded at order time.
    #[instrument(skip(self, order_item, adjustment), fields(order_item_id = %order_item.id))]
    pub async fn adjust_inventory_for_order_item(
        &self,
        order_item: &OrderItem,
        adjustment: &StockAdjustment,
    ) -> CatalogResult<AdjustInventoryResult> {
        adjustment
            .validate()
            .map_err(|e| CatalogError::Validation(e.to_string()))?;

        let mut product = self
            .repository
            .get_product(order_item.product_id)
            .await?
            .ok_or(CatalogError::ProductNotFound(order_item.product_id))?;

        if product.kind == ProductKind::Bundle && product.bundle_per_item_shopping_cart {
            let bundle_data = order_item.bundle_data();
            if !bundle_data.is_empty() {
                let component_ids: Vec<Uuid> =
                    bundle_data.iter().map(|d| d.product_id).collect();
                let components = self.repository.get_products(&component_ids).await?;
                let mut by_id: HashMap<Uuid, Product> =
                    components.into_iter().map(|p| (p.id, p)).collect();

                for data in &bundle_data {
                    if let Some(component) = by_id.get_mut(&data.product_id) {
                        self.apply_adjustment(component, None, &adjustment.scaled_by(data.quantity))
                            .await?;
                    }
                }
            }
            // The bundle parent never carries its own counter in this mode.
            Ok(AdjustInventoryResult::default())
        } else {
            let selection = order_item.attribute_selection();
            self.adjust_inventory(&mut product, selection.as_ref(), adjustment)
                .await
        }
    }

    /// Move the counter of a single product (or its matching combination)
    /// and derive the product-level flags. Never follows linkages.
    async fn apply_adjustment(
        &self,
        product: &mut Product,
        selection: Option<&AttributeSelection>,
        adjustment: &StockAdjustment,
    ) -> CatalogResult<AdjustInventoryResult> {
        let mut result = AdjustInventoryResult::default();

        match product.inventory_tracking {
            InventoryTracking::Untracked => {}
            InventoryTracking::TrackByProduct => {
                result.stock_quantity_old = product.stock_quantity;
                result.stock_quantity_new = adjustment.apply_to(product.stock_quantity);
                product.stock_quantity = result.stock_quantity_new;

                match product.low_stock_action {
                    LowStockAction::DisableBuyButton => {
                        let low = product.min_stock_quantity >= result.stock_quantity_new;
                        product.disable_buy_button = low;
                        product.disable_wishlist_button = low;
                    }
                    LowStockAction::Unpublish => {
                        product.published =
                            product.min_stock_quantity <= result.stock_quantity_new;
                    }
                    LowStockAction::Nothing => {}
                }
                product.updated_at = Utc::now();

                if adjustment.decrease
                    && product.notify_admin_below_quantity > result.stock_quantity_new
                {
                    // Fire-and-forget: the dispatched entity is the mutated
                    // in-memory one, independent of the pending write below.
                    if let Err(err) = self
                        .notifier
                        .notify_low_stock(product, self.settings.notification_language_id)
                        .await
                    {
                        warn!(
                            product_id = %product.id,
                            error = %err,
                            "Low stock notification failed"
                        );
                    }
                }

                self.repository.update_product(product).await?;
            }
            InventoryTracking::TrackByAttributes => {
                let Some(selection) = selection else {
                    return Ok(result);
                };
                // A missing combination is not an error, just nothing to move.
                if let Some(mut combination) = self
                    .repository
                    .find_attribute_combination(product.id, selection)
                    .await?
                {
                    result.stock_quantity_old = combination.stock_quantity;
                    result.stock_quantity_new =
                        adjustment.apply_to(combination.stock_quantity);
                    combination.stock_quantity = result.stock_quantity_new;
                    self.repository
                        .update_attribute_combination(&combination)
                        .await?;
                }
            }
        }

        Ok(result)
    }

    /// Adjust every product linked by the selection's attribute values,
    /// scaled by the linking value's quantity multiplier.
    async fn adjust_linked_products(
        &self,
        selection: &AttributeSelection,
        adjustment: &StockAdjustment,
    ) -> CatalogResult<()> {
        let value_ids = selection.value_ids();
        if value_ids.is_empty() {
            return Ok(());
        }

        let values = self.repository.get_attribute_values(&value_ids).await?;

        let mut linked_ids: Vec<Uuid> = Vec::new();
        for value in &values {
            if value.value_type == AttributeValueKind::ProductLinkage {
                if let Some(id) = value.linked_product_id {
                    if !linked_ids.contains(&id) {
                        linked_ids.push(id);
                    }
                }
            }
        }

        for chunk in linked_ids.chunks(LINKED_PRODUCT_CHUNK_SIZE) {
            let mut linked_products = self.repository.get_products(chunk).await?;
            for linked in &mut linked_products {
                let multiplier = values
                    .iter()
                    .find(|v| v.linked_product_id == Some(linked.id))
                    .map(|v| v.quantity)
                    .unwrap_or(1);
                self.apply_adjustment(linked, None, &adjustment.scaled_by(multiplier))
                    .await?;
            }
        }

        Ok(())
    }
}

impl<R: CatalogRepository, N: LowStockNotifier> Clone for InventoryService<R, N> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
            settings: self.settings.clone(),
        }
    }
}
