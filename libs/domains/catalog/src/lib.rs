//! Catalog Domain
//!
//! Catalog management for a storefront platform: keeps inventory counts
//! consistent across simple, attribute-variant, bundled, and linked
//! products; completes the "related product" and "cross-sell" recommendation
//! graphs into mutually symmetric edge sets; and runs the recycle bin that
//! restores or permanently purges soft-deleted products while preserving
//! referential consistency with categories, manufacturers, bundles, and
//! orders.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │  Services                            │  ← inventory / relations / recycle bin
//! └──────┬───────────────────────┬───────┘
//!        │                       │
//! ┌──────▼──────┐         ┌──────▼──────────┐
//! │ Repository  │         │ Collaborators   │  ← low-stock notifier, tag cache
//! └──────┬──────┘         └─────────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← entities, DTOs
//! └─────────────┘
//! ```
//!
//! Persistence, notification delivery, and cache invalidation are abstract
//! collaborators; callers wire in concrete implementations. Every operation
//! runs to completion on the invoking call path: no background workers, no
//! cross-statement transaction (partial completion of a multi-step restore
//! or purge is an accepted intermediate state).
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_catalog::{
//!     InMemoryCatalogRepository, InventoryService, InventorySettings,
//!     NoopLowStockNotifier, RecycleBinService, RelationService,
//!     NoopProductTagCache,
//! };
//!
//! let repository = InMemoryCatalogRepository::new();
//!
//! let inventory = InventoryService::new(
//!     repository.clone(),
//!     NoopLowStockNotifier,
//!     InventorySettings::default(),
//! );
//! let relations = RelationService::new(repository.clone());
//! let recycle_bin = RecycleBinService::new(repository, NoopProductTagCache);
//! ```

pub mod error;
pub mod inventory;
pub mod models;
pub mod notifications;
pub mod recycle_bin;
pub mod relations;
pub mod repository;

// Re-export commonly used types
pub use error::{CatalogError, CatalogResult};
pub use inventory::{InventoryService, InventorySettings};
pub use models::{
    AdjustInventoryResult, AttributeCombination, AttributeSelection, AttributeValue,
    AttributeValueKind, BatchFailure, BatchResult, BundleItem, BundleItemOrderData, Category,
    InventoryTracking, LowStockAction, Manufacturer, OrderItem, Product, ProductKind,
    ProductReview, RelationEdge, RelationKind, ShoppingCartItem, StockAdjustment,
};
pub use notifications::{
    LowStockNotifier, NoopLowStockNotifier, NoopProductTagCache, ProductTagCache,
};
pub use recycle_bin::RecycleBinService;
pub use relations::RelationService;
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
