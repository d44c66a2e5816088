use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::Product;

/// Outbound low-stock notification collaborator.
///
/// Dispatch is fire-and-forget: callers pass the already-mutated in-memory
/// entity, so implementations must not reload the product, and a failed
/// dispatch never fails the inventory adjustment that triggered it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LowStockNotifier: Send + Sync {
    async fn notify_low_stock(&self, product: &Product, language_id: Uuid) -> CatalogResult<()>;
}

/// Notifier that drops all notifications
#[derive(Debug, Default, Clone)]
pub struct NoopLowStockNotifier;

#[async_trait]
impl LowStockNotifier for NoopLowStockNotifier {
    async fn notify_low_stock(&self, _product: &Product, _language_id: Uuid) -> CatalogResult<()> {
        Ok(())
    }
}

/// Product-tag cache invalidation collaborator, invoked once after a
/// restore batch with at least one success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductTagCache: Send + Sync {
    async fn invalidate(&self) -> CatalogResult<()>;
}

/// Cache hook that does nothing
#[derive(Debug, Default, Clone)]
pub struct NoopProductTagCache;

#[async_trait]
impl ProductTagCache for NoopProductTagCache {
    async fn invalidate(&self) -> CatalogResult<()> {
        Ok(())
    }
}
