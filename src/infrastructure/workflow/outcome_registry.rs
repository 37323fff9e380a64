//! In-memory registry of terminal execution outcomes using moka

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;

use crate::config::WorkflowConfig;
use crate::domain::{ExecutionId, ExecutionOutcome};

/// Configuration for the outcome registry
#[derive(Debug, Clone)]
pub struct OutcomeRegistryConfig {
    /// Maximum number of outcomes kept
    pub max_capacity: u64,
    /// How long an outcome stays queryable
    pub retention: Duration,
}

impl Default for OutcomeRegistryConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
            retention: Duration::from_secs(3600),
        }
    }
}

impl From<&WorkflowConfig> for OutcomeRegistryConfig {
    fn from(config: &WorkflowConfig) -> Self {
        Self {
            max_capacity: config.outcome_capacity,
            retention: Duration::from_secs(config.outcome_retention_secs),
        }
    }
}

/// Bounded, TTL-evicted store of terminal outcomes.
///
/// Holds finished executions only; running executions are never visible here.
#[derive(Debug, Clone)]
pub struct OutcomeRegistry {
    outcomes: MokaCache<ExecutionId, Arc<ExecutionOutcome>>,
}

impl OutcomeRegistry {
    pub fn new() -> Self {
        Self::with_config(OutcomeRegistryConfig::default())
    }

    pub fn with_config(config: OutcomeRegistryConfig) -> Self {
        let outcomes = MokaCache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(config.retention)
            .build();

        Self { outcomes }
    }

    pub async fn record(&self, outcome: ExecutionOutcome) {
        self.outcomes
            .insert(outcome.execution_id.clone(), Arc::new(outcome))
            .await;
    }

    pub async fn get(&self, execution_id: &ExecutionId) -> Option<Arc<ExecutionOutcome>> {
        self.outcomes.get(execution_id).await
    }

    /// Approximate number of retained outcomes
    pub fn entry_count(&self) -> u64 {
        self.outcomes.entry_count()
    }
}

impl Default for OutcomeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
