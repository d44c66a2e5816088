//! Relation Service - mutual recommendation graph completion
//!
//! Makes an asymmetric "A recommends B" edge set mutually symmetric:
//! every two products in a cluster end up linked in both directions,
//! and a product never links to itself.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::CatalogResult;
use crate::models::{RelationEdge, RelationKind};
use crate::repository::CatalogRepository;

/// Relation service completing related-product and cross-sell graphs
pub struct RelationService<R: CatalogRepository> {
    repository: Arc<R>,
}

impl<R: CatalogRepository> RelationService<R> {
    /// Create a new RelationService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Insert the edges missing for the seed's cluster to be mutually
    /// connected. Returns the number of edges created.
    ///
    /// Idempotent: a second run over a completed cluster creates nothing.
    /// Existing edges are never removed or reordered.
    #[instrument(skip(self))]
    pub async fn ensure_mutual_relations(
        &self,
        seed_product_id: Uuid,
        kind: RelationKind,
    ) -> CatalogResult<usize> {
        let mut cluster = self
            .repository
            .related_product_ids(kind, seed_product_id)
            .await?;
        if cluster.is_empty() {
            return Ok(0);
        }
        if !cluster.contains(&seed_product_id) {
            cluster.push(seed_product_id);
        }
        if cluster.len() <= 1 {
            return Ok(0);
        }

        let existing = self.repository.edges_into(kind, &cluster).await?;
        let mut sources_by_target: HashMap<Uuid, HashSet<Uuid>> = HashMap::new();
        for edge in existing {
            sources_by_target
                .entry(edge.product_id2)
                .or_default()
                .insert(edge.product_id1);
        }

        // Per-source running display order, initialized from storage once.
        let mut display_orders: HashMap<Uuid, i32> = HashMap::new();
        let mut new_edges = Vec::new();

        for &target in &cluster {
            let sources = sources_by_target.get(&target);
            for &source in &cluster {
                if source == target {
                    continue;
                }
                if sources.is_some_and(|s| s.contains(&source)) {
                    continue;
                }

                let display_order = match kind {
                    RelationKind::Related => {
                        let next = match display_orders.get(&source) {
                            Some(current) => current + 1,
                            None => {
                                self.repository
                                    .max_display_order(kind, source)
                                    .await?
                                    .unwrap_or(0)
                                    + 1
                            }
                        };
                        display_orders.insert(source, next);
                        next
                    }
                    RelationKind::CrossSell => 0,
                };

                new_edges.push(RelationEdge {
                    product_id1: source,
                    product_id2: target,
                    display_order,
                });
            }
        }

        if new_edges.is_empty() {
            return Ok(0);
        }

        let created = self.repository.insert_edges(kind, new_edges).await?;
        info!(seed_product_id = %seed_product_id, %kind, created, "Completed mutual relations");
        Ok(created)
    }
}

impl<R: CatalogRepository> Clone for RelationService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}
