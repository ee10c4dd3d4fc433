//! Executes mutation plans against the store and the cache.
//!
//! Counter updates and cascades run first, invalidations second. The first
//! failing call aborts the plan; nothing is rolled back and nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::application::repos::{DocumentStore, RepoError};

use super::backend::CacheError;
use super::client::Cache;
use super::planner::{Mutation, MutationPlan, StoreAction};

const METRIC_ENGINE_APPLY_MS: &str = "snapshare_engine_apply_ms";
const METRIC_COUNTER_MISS: &str = "snapshare_counter_target_missing_total";

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Cache(#[from] CacheError),
}

#[derive(Clone)]
pub struct InvalidationEngine {
    store: Arc<dyn DocumentStore>,
    cache: Cache,
}

impl InvalidationEngine {
    pub fn new(store: Arc<dyn DocumentStore>, cache: Cache) -> Self {
        Self { store, cache }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Applies the side effects of a completed primary write.
    #[instrument(skip(self), fields(kind = mutation.kind()))]
    pub async fn apply(&self, mutation: &Mutation) -> Result<MutationPlan, EngineError> {
        let started_at = Instant::now();
        let plan = MutationPlan::for_mutation(mutation);
        debug!(plan = %plan, "Applying mutation plan");

        for action in &plan.store_actions {
            self.run(action).await?;
        }
        for key in &plan.invalidations {
            self.cache.delete(key).await?;
        }

        histogram!(METRIC_ENGINE_APPLY_MS, "kind" => mutation.kind())
            .record(started_at.elapsed().as_secs_f64() * 1000.0);
        debug!(
            store_actions = plan.store_actions.len(),
            invalidated = plan.invalidations.len(),
            "Mutation plan applied"
        );

        Ok(plan)
    }

    async fn run(&self, action: &StoreAction) -> Result<(), RepoError> {
        match action {
            StoreAction::Increment { id, counter, delta } => {
                let touched = self.store.increment_field(*id, *counter, *delta).await?;
                if !touched {
                    counter!(METRIC_COUNTER_MISS, "counter" => counter.field_name()).increment(1);
                    warn!(
                        target = "snapshare::engine",
                        id = %id,
                        counter = counter.field_name(),
                        delta,
                        "Counter target missing; increment skipped"
                    );
                }
            }
            StoreAction::DeleteMany { collection, filter } => {
                let result = self.store.delete_many_by_query(*collection, filter).await?;
                debug!(
                    collection = collection.as_str(),
                    deleted = result.deleted_count,
                    "Cascade delete"
                );
            }
            StoreAction::DeleteOne { collection, id } => {
                self.store.delete_by_id(*collection, *id).await?;
            }
        }
        Ok(())
    }
}
