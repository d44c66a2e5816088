use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;
use validator::Validate;

/// How stock is tracked for a product
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InventoryTracking {
    /// Stock counters are not maintained at all
    #[default]
    Untracked,
    /// One counter on the product itself
    TrackByProduct,
    /// An independent counter per attribute combination
    TrackByAttributes,
}

/// What happens when stock falls to or below the minimum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LowStockAction {
    #[default]
    Nothing,
    /// Suppress the buy and wishlist buttons
    DisableBuyButton,
    /// Take the product off the storefront
    Unpublish,
}

/// Product kind
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ProductKind {
    #[default]
    Simple,
    /// Parent of a group of child products
    Grouped,
    /// Composed of bundle items with quantity multipliers
    Bundle,
}

/// Product entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    /// Product name
    pub name: String,
    /// Stock Keeping Unit
    pub sku: Option<String>,
    pub kind: ProductKind,
    /// Parent product when this product belongs to a group
    #[serde(default)]
    pub parent_grouped_product_id: Option<Uuid>,
    pub inventory_tracking: InventoryTracking,
    /// Current stock quantity (meaningful for `TrackByProduct`)
    pub stock_quantity: i32,
    /// Floor that triggers the low-stock action
    pub min_stock_quantity: i32,
    /// Decreases below this quantity notify the store owner
    pub notify_admin_below_quantity: i32,
    pub low_stock_action: LowStockAction,
    pub published: bool,
    #[serde(default)]
    pub disable_buy_button: bool,
    #[serde(default)]
    pub disable_wishlist_button: bool,
    /// For bundles: components are carted and stocked individually
    #[serde(default)]
    pub bundle_per_item_shopping_cart: bool,
    /// Comma-separated ids of products this product requires
    #[serde(default)]
    pub required_product_ids: Option<String>,
    /// Soft-delete flag; cleared only by a recycle-bin restore
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub delivery_time_id: Option<Uuid>,
    #[serde(default)]
    pub quantity_unit_id: Option<Uuid>,
    #[serde(default)]
    pub sample_download_id: Option<Uuid>,
    #[serde(default)]
    pub country_of_origin_id: Option<Uuid>,
    #[serde(default)]
    pub compare_price_label_id: Option<Uuid>,
    #[serde(default)]
    pub main_picture_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Standard visibility filter: published and not soft-deleted
    pub fn is_visible(&self) -> bool {
        self.published && !self.deleted
    }

    /// Parse the required-products declaration into ids.
    ///
    /// The declaration is free-form admin input; tokens that do not parse
    /// as ids are skipped.
    pub fn required_product_id_list(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        if let Some(raw) = &self.required_product_ids {
            for token in raw.split(',') {
                if let Ok(id) = token.trim().parse::<Uuid>() {
                    if id != self.id && !ids.contains(&id) {
                        ids.push(id);
                    }
                }
            }
        }
        ids
    }
}

/// A concrete attribute choice: attribute id -> chosen value ids.
///
/// Decoding from the serialized form is a pure step; nothing is touched
/// until the adjustment that consumes the selection commits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSelection {
    selections: BTreeMap<Uuid, Vec<Uuid>>,
}

impl AttributeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a serialized selection. Returns `None` when the raw value
    /// is not a valid selection document.
    pub fn from_json(raw: &str) -> Option<Self> {
        serde_json::from_str(raw).ok()
    }

    pub fn add(&mut self, attribute_id: Uuid, value_id: Uuid) {
        self.selections.entry(attribute_id).or_default().push(value_id);
    }

    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    /// All chosen value ids, deduplicated, in attribute order.
    pub fn value_ids(&self) -> Vec<Uuid> {
        let mut ids = Vec::new();
        for values in self.selections.values() {
            for id in values {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
        ids
    }
}

/// Kind of an attribute value
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttributeValueKind {
    #[default]
    Simple,
    /// The value stands for another product whose stock moves in lockstep
    ProductLinkage,
}

/// A selectable attribute value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: Uuid,
    pub attribute_id: Uuid,
    pub value_type: AttributeValueKind,
    /// Target product for `ProductLinkage` values
    #[serde(default)]
    pub linked_product_id: Option<Uuid>,
    /// Stock multiplier applied when adjusting the linked product
    pub quantity: i32,
}

/// Per-variant stock counter, keyed by product and attribute selection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCombination {
    pub id: Uuid,
    pub product_id: Uuid,
    pub selection: AttributeSelection,
    pub stock_quantity: i32,
}

/// Component of a bundle product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleItem {
    pub id: Uuid,
    pub bundle_product_id: Uuid,
    pub product_id: Uuid,
    /// How many units of the component one bundle contains
    pub quantity: i32,
}

/// Per-component purchase data captured on an order item at order time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleItemOrderData {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Order line referencing a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    /// Serialized attribute selection chosen at order time
    #[serde(default)]
    pub attributes_json: Option<String>,
    /// Serialized `Vec<BundleItemOrderData>` for per-item bundles
    #[serde(default)]
    pub bundle_data_json: Option<String>,
}

impl OrderItem {
    /// Decode the recorded bundle data. Absent or undecodable data yields
    /// an empty list, which callers treat as "nothing to propagate".
    pub fn bundle_data(&self) -> Vec<BundleItemOrderData> {
        self.bundle_data_json
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
            .unwrap_or_default()
    }

    /// Decode the attribute selection recorded at order time.
    pub fn attribute_selection(&self) -> Option<AttributeSelection> {
        self.attributes_json.as_deref().and_then(AttributeSelection::from_json)
    }
}

/// Which recommendation graph an edge belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RelationKind {
    Related,
    CrossSell,
}

/// Directed recommendation edge `product_id1 -> product_id2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub product_id1: Uuid,
    pub product_id2: Uuid,
    /// Sort position among edges sharing `product_id1`; unused for cross-sells
    pub display_order: i32,
}

/// Category node in a parent-pointer tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    #[serde(default)]
    pub deleted: bool,
}

/// Manufacturer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub deleted: bool,
}

/// Product review (carrier for helpfulness cleanup on permanent delete)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductReview {
    pub id: Uuid,
    pub product_id: Uuid,
}

/// Shopping cart line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingCartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    /// Set when the line was added as part of a bundle
    #[serde(default)]
    pub bundle_item_id: Option<Uuid>,
}

/// Stock adjustment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StockAdjustment {
    /// Whether stock moves down (`true`) or up (`false`)
    pub decrease: bool,
    /// Units to move; direction is carried solely by `decrease`
    #[validate(range(min = 0))]
    pub quantity: i32,
}

impl StockAdjustment {
    pub fn decrease(quantity: i32) -> Self {
        Self { decrease: true, quantity }
    }

    pub fn increase(quantity: i32) -> Self {
        Self { decrease: false, quantity }
    }

    /// The same movement scaled by a multiplier (bundle or linkage quantity).
    pub fn scaled_by(&self, multiplier: i32) -> Self {
        Self {
            decrease: self.decrease,
            quantity: self.quantity * multiplier,
        }
    }

    pub fn apply_to(&self, stock: i32) -> i32 {
        if self.decrease {
            stock - self.quantity
        } else {
            stock + self.quantity
        }
    }
}

/// Old and new counter values observed at the primary adjustment target.
///
/// Propagation into bundle components or linked products is not aggregated
/// here; both fields stay zero when no counter was touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdjustInventoryResult {
    pub stock_quantity_old: i32,
    pub stock_quantity_new: i32,
}

/// A batch item that could not be processed
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub product_id: Uuid,
    pub reason: String,
}

/// Per-item outcome report for recycle-bin batches
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    pub succeeded: Vec<Uuid>,
    pub failed: Vec<BatchFailure>,
}

impl BatchResult {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn record_failure(&mut self, product_id: Uuid, reason: impl Into<String>) {
        self.failed.push(BatchFailure {
            product_id,
            reason: reason.into(),
        });
    }
}
